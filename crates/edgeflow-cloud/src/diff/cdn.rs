//! Distribution comparison
//!
//! Order matters: the first mismatching field is reported. When no path
//! entries are declared, the classic origin is checked against the default
//! cache behavior instead of the per-path behaviors.

use crate::builder::error_responses;
use crate::diff::{Comparator, first_mismatch};
use crate::model::cdn::{CustomErrorResponse, DistributionConfig, DistributionSpec};
use std::collections::BTreeMap;

const COMPARATORS: [Comparator<DistributionSpec, DistributionConfig>; 9] = [
    ("alias", alias),
    ("certificate", certificate),
    ("comment", comment),
    ("forward_query_string", forward_query_string),
    ("viewer_protocol_policy", viewer_protocol_policy),
    ("cache_behaviors", cache_behaviors),
    ("origins", origins),
    ("logging", logging),
    ("error_responses", error_pages),
];

/// Name of the first field that differs
pub fn first_difference(
    spec: &DistributionSpec,
    observed: &DistributionConfig,
) -> Option<&'static str> {
    first_mismatch(&COMPARATORS, spec, observed)
}

pub fn is_up_to_date(spec: &DistributionSpec, observed: &DistributionConfig) -> bool {
    first_difference(spec, observed).is_none()
}

fn alias(spec: &DistributionSpec, observed: &DistributionConfig) -> bool {
    observed
        .aliases
        .iter()
        .any(|a| a.eq_ignore_ascii_case(&spec.alias))
}

fn certificate(spec: &DistributionSpec, observed: &DistributionConfig) -> bool {
    spec.certificate.as_deref() == observed.certificate_arn.as_deref()
}

fn comment(spec: &DistributionSpec, observed: &DistributionConfig) -> bool {
    spec.comment == observed.comment
}

fn forward_query_string(spec: &DistributionSpec, observed: &DistributionConfig) -> bool {
    spec.effective_forward_query_string() == observed.default_cache_behavior.query_string
}

fn viewer_protocol_policy(spec: &DistributionSpec, observed: &DistributionConfig) -> bool {
    spec.effective_viewer_policy().as_str()
        == observed.default_cache_behavior.viewer_protocol_policy
}

fn cache_behaviors(spec: &DistributionSpec, observed: &DistributionConfig) -> bool {
    if spec.paths.is_empty() {
        return match &spec.origin {
            Some(origin) => observed.default_cache_behavior.target_origin_id == origin.name,
            None => true,
        };
    }

    spec.paths.iter().all(|path| {
        observed
            .cache_behaviors
            .iter()
            .find(|b| b.target_origin_id == path.origin.name)
            .is_some_and(|b| {
                b.path_pattern == path.path_pattern
                    && b.viewer_protocol_policy == path.effective_viewer_policy().as_str()
            })
    })
}

fn origins(spec: &DistributionSpec, observed: &DistributionConfig) -> bool {
    spec.declared_origins().into_iter().all(|declared| {
        observed
            .origins
            .iter()
            .find(|o| o.id == declared.name)
            .is_some_and(|o| {
                o.domain_name == declared.domain
                    && o.origin_path == declared.path
                    && o.origin_protocol_policy == declared.effective_protocol().as_str()
            })
    })
}

fn logging(spec: &DistributionSpec, observed: &DistributionConfig) -> bool {
    spec.logging == observed.logging.enabled
}

fn error_pages(spec: &DistributionSpec, observed: &DistributionConfig) -> bool {
    keyed_by_code(&error_responses(spec)) == keyed_by_code(&observed.custom_error_responses)
}

fn keyed_by_code(responses: &[CustomErrorResponse]) -> BTreeMap<i32, &CustomErrorResponse> {
    responses.iter().map(|r| (r.error_code, r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::distribution_config;
    use crate::model::cdn::{
        CacheBehavior, CachePathSpec, ErrorResponseSpec, OriginProtocolPolicy, OriginSpec,
        ViewerProtocolPolicy,
    };

    fn classic() -> DistributionSpec {
        let mut spec = DistributionSpec::new("dev.example.net");
        spec.comment = "Dev".to_string();
        spec.origin = Some(
            OriginSpec::new("API", "api.example.com").with_protocol(OriginProtocolPolicy::HttpOnly),
        );
        spec
    }

    fn observed(spec: &DistributionSpec) -> DistributionConfig {
        distribution_config(spec, "ref-1").unwrap()
    }

    #[test]
    fn test_built_config_is_up_to_date() {
        let spec = classic();
        assert!(is_up_to_date(&spec, &observed(&spec)));
    }

    #[test]
    fn test_verdict_is_deterministic() {
        let spec = classic();
        let mut config = observed(&spec);
        config.comment = "Prod".to_string();

        let first = first_difference(&spec, &config);
        let second = first_difference(&spec, &config);
        assert_eq!(first, Some("comment"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_alias() {
        let spec = classic();
        let mut config = observed(&spec);
        config.aliases = vec!["prod.example.net".to_string()];
        assert_eq!(first_difference(&spec, &config), Some("alias"));
    }

    #[test]
    fn test_alias_matches_case_insensitively() {
        let spec = classic();
        let mut config = observed(&spec);
        config.aliases = vec!["DEV.example.net".to_string()];
        assert!(is_up_to_date(&spec, &config));
    }

    #[test]
    fn test_first_mismatch_wins() {
        let spec = classic();
        let mut config = observed(&spec);
        config.certificate_arn = Some("arn:aws:acm:us-east-1:1:certificate/x".to_string());
        config.comment = "Other".to_string();
        config.logging.enabled = true;
        assert_eq!(first_difference(&spec, &config), Some("certificate"));
    }

    #[test]
    fn test_default_viewer_policy_inference() {
        let spec = classic();
        let mut config = observed(&spec);

        config.default_cache_behavior.viewer_protocol_policy = "allow-all".to_string();
        assert!(is_up_to_date(&spec, &config));

        config.default_cache_behavior.viewer_protocol_policy = "https-only".to_string();
        assert_eq!(first_difference(&spec, &config), Some("viewer_protocol_policy"));
    }

    #[test]
    fn test_query_string_defaults_to_false() {
        let spec = classic();
        let mut config = observed(&spec);
        config.default_cache_behavior.query_string = true;
        assert_eq!(first_difference(&spec, &config), Some("forward_query_string"));
    }

    #[test]
    fn test_classic_origin_target_checked() {
        let spec = classic();
        let mut config = observed(&spec);
        config.default_cache_behavior.target_origin_id = "Other".to_string();
        assert_eq!(first_difference(&spec, &config), Some("cache_behaviors"));
    }

    #[test]
    fn test_origin_protocol_defaults_to_match_viewer() {
        let mut spec = classic();
        spec.origin = Some(OriginSpec::new("API", "api.example.com"));
        let mut config = observed(&spec);
        assert_eq!(config.origins[0].origin_protocol_policy, "match-viewer");

        config.origins[0].origin_protocol_policy = "http-only".to_string();
        assert_eq!(first_difference(&spec, &config), Some("origins"));
    }

    #[test]
    fn test_origin_domain_change() {
        let spec = classic();
        let mut config = observed(&spec);
        config.origins[0].domain_name = "api2.example.com".to_string();
        assert_eq!(first_difference(&spec, &config), Some("origins"));
    }

    fn with_paths() -> DistributionSpec {
        let mut spec = DistributionSpec::new("dev.example.net");
        spec.paths = vec![
            CachePathSpec {
                origin: OriginSpec::new("API", "api.example.com"),
                path_pattern: "/api/*".to_string(),
                viewer_protocol_policy: Some(ViewerProtocolPolicy::HttpsOnly),
                forward_query_string: Some(true),
            },
            CachePathSpec {
                origin: OriginSpec::new("Static", "static.example.com"),
                path_pattern: "/static/*".to_string(),
                viewer_protocol_policy: None,
                forward_query_string: None,
            },
        ];
        spec
    }

    #[test]
    fn test_cache_path_pattern_change() {
        let spec = with_paths();
        let mut config = observed(&spec);
        assert!(is_up_to_date(&spec, &config));

        config.cache_behaviors[1].path_pattern = "/assets/*".to_string();
        assert_eq!(first_difference(&spec, &config), Some("cache_behaviors"));
    }

    #[test]
    fn test_cache_path_missing_behavior() {
        let spec = with_paths();
        let mut config = observed(&spec);
        config.cache_behaviors.retain(|b| b.target_origin_id != "Static");
        assert_eq!(first_difference(&spec, &config), Some("cache_behaviors"));
    }

    #[test]
    fn test_cache_path_viewer_policy_defaults_to_allow_all() {
        let spec = with_paths();
        let mut config = observed(&spec);
        config.cache_behaviors[1] = CacheBehavior {
            viewer_protocol_policy: "redirect-to-https".to_string(),
            ..config.cache_behaviors[1].clone()
        };
        assert_eq!(first_difference(&spec, &config), Some("cache_behaviors"));
    }

    #[test]
    fn test_logging_toggle() {
        let spec = classic();
        let mut config = observed(&spec);
        config.logging.enabled = true;
        assert_eq!(first_difference(&spec, &config), Some("logging"));
    }

    #[test]
    fn test_error_responses_order_independent() {
        let mut spec = classic();
        spec.error_responses = vec![
            ErrorResponseSpec {
                status: 404,
                ttl: 10,
                response_code: Some(200),
                response_path: Some("/index.html".to_string()),
            },
            ErrorResponseSpec {
                status: 503,
                ttl: 0,
                response_code: None,
                response_path: None,
            },
        ];
        let mut config = observed(&spec);
        config.custom_error_responses.reverse();
        assert!(is_up_to_date(&spec, &config));

        config.custom_error_responses[0].error_caching_min_ttl = 60;
        assert_eq!(first_difference(&spec, &config), Some("error_responses"));
    }

    #[test]
    fn test_extra_observed_error_response() {
        let spec = classic();
        let mut config = observed(&spec);
        config.custom_error_responses.push(CustomErrorResponse {
            error_code: 500,
            error_caching_min_ttl: 5,
            response_code: None,
            response_page_path: None,
        });
        assert_eq!(first_difference(&spec, &config), Some("error_responses"));
    }
}
