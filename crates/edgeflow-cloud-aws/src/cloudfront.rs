//! CloudFront implementation of `CdnApi`

use crate::clients::AwsClients;
use crate::sdk::{built, convergence, lookup, mutation, opt, required};
use async_trait::async_trait;
use aws_sdk_cloudfront::client::Waiters;
use aws_sdk_cloudfront::types as cf;
use edgeflow_cloud::model::cdn::{
    CacheBehavior, CustomErrorResponse, DefaultCacheBehavior, Distribution, DistributionConfig,
    DistributionSummary, LoggingConfig, Origin,
};
use edgeflow_cloud::{CdnApi, Result};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound for one deployment wait
pub const DEPLOY_WAIT: Duration = Duration::from_secs(30 * 60);

const HTTP_PORT: i32 = 80;
const HTTPS_PORT: i32 = 443;
const MINIMUM_TLS: &str = "TLSv1.2_2021";

pub struct CloudFrontProvider {
    clients: Arc<AwsClients>,
}

impl CloudFrontProvider {
    pub fn new(clients: Arc<AwsClients>) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl CdnApi for CloudFrontProvider {
    async fn list_distributions(&self) -> Result<Vec<DistributionSummary>> {
        let client = self.clients.cloudfront().await;
        let mut summaries = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let output = client
                .list_distributions()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(lookup("ListDistributions"))?;
            let Some(list) = output.distribution_list() else {
                break;
            };

            summaries.extend(list.items().iter().map(|item| DistributionSummary {
                id: item.id().to_string(),
                aliases: item
                    .aliases()
                    .map(|a| a.items().to_vec())
                    .unwrap_or_default(),
            }));

            match list.next_marker() {
                Some(next) if list.is_truncated() => marker = Some(next.to_string()),
                _ => break,
            }
        }

        tracing::debug!("Listed {} distributions", summaries.len());
        Ok(summaries)
    }

    async fn get_distribution(&self, id: &str) -> Result<Distribution> {
        let output = self
            .clients
            .cloudfront()
            .await
            .get_distribution_config()
            .id(id)
            .send()
            .await
            .map_err(lookup("GetDistributionConfig"))?;

        let config = required(
            output.distribution_config(),
            "GetDistributionConfig",
            "DistributionConfig",
        )?;
        let e_tag = required(output.e_tag(), "GetDistributionConfig", "ETag")?;

        Ok(Distribution {
            id: id.to_string(),
            e_tag: e_tag.to_string(),
            config: from_sdk(config),
        })
    }

    async fn create_distribution(&self, config: &DistributionConfig) -> Result<Distribution> {
        let output = self
            .clients
            .cloudfront()
            .await
            .create_distribution()
            .distribution_config(to_sdk(config)?)
            .send()
            .await
            .map_err(mutation("CreateDistribution"))?;

        let distribution = required(output.distribution(), "CreateDistribution", "Distribution")?;
        tracing::info!("CloudFront accepted distribution {}", distribution.id());
        Ok(Distribution {
            id: distribution.id().to_string(),
            e_tag: output.e_tag().unwrap_or_default().to_string(),
            config: distribution
                .distribution_config()
                .map(from_sdk)
                .unwrap_or_else(|| config.clone()),
        })
    }

    async fn update_distribution(
        &self,
        id: &str,
        config: &DistributionConfig,
        e_tag: &str,
    ) -> Result<Distribution> {
        let output = self
            .clients
            .cloudfront()
            .await
            .update_distribution()
            .id(id)
            .if_match(e_tag)
            .distribution_config(to_sdk(config)?)
            .send()
            .await
            .map_err(mutation("UpdateDistribution"))?;

        Ok(Distribution {
            id: id.to_string(),
            e_tag: output.e_tag().unwrap_or_default().to_string(),
            config: output
                .distribution()
                .and_then(|d| d.distribution_config())
                .map(from_sdk)
                .unwrap_or_else(|| config.clone()),
        })
    }

    async fn wait_until_deployed(&self, id: &str) -> Result<()> {
        self.clients
            .cloudfront()
            .await
            .wait_until_distribution_deployed()
            .id(id)
            .wait(DEPLOY_WAIT)
            .await
            .map_err(convergence(id))?;
        Ok(())
    }
}

/// Provider-neutral config into the CloudFront request shape
pub fn to_sdk(config: &DistributionConfig) -> Result<cf::DistributionConfig> {
    let aliases = built(
        cf::Aliases::builder()
            .quantity(config.aliases.len() as i32)
            .set_items(Some(config.aliases.clone()))
            .build(),
    )?;

    let origins = config
        .origins
        .iter()
        .map(origin_to_sdk)
        .collect::<Result<Vec<_>>>()?;
    let origins = built(
        cf::Origins::builder()
            .quantity(origins.len() as i32)
            .set_items(Some(origins))
            .build(),
    )?;

    let default = &config.default_cache_behavior;
    let default_cache_behavior = built(
        cf::DefaultCacheBehavior::builder()
            .target_origin_id(&default.target_origin_id)
            .viewer_protocol_policy(cf::ViewerProtocolPolicy::from(
                default.viewer_protocol_policy.as_str(),
            ))
            .forwarded_values(forwarded_values(default.query_string)?)
            .min_ttl(0)
            .build(),
    )?;

    let behaviors = config
        .cache_behaviors
        .iter()
        .map(|b| {
            built(
                cf::CacheBehavior::builder()
                    .path_pattern(&b.path_pattern)
                    .target_origin_id(&b.target_origin_id)
                    .viewer_protocol_policy(cf::ViewerProtocolPolicy::from(
                        b.viewer_protocol_policy.as_str(),
                    ))
                    .forwarded_values(forwarded_values(b.query_string)?)
                    .min_ttl(0)
                    .build(),
            )
        })
        .collect::<Result<Vec<_>>>()?;
    let cache_behaviors = built(
        cf::CacheBehaviors::builder()
            .quantity(behaviors.len() as i32)
            .set_items(Some(behaviors))
            .build(),
    )?;

    let responses = config
        .custom_error_responses
        .iter()
        .map(|r| {
            built(
                cf::CustomErrorResponse::builder()
                    .error_code(r.error_code)
                    .error_caching_min_ttl(r.error_caching_min_ttl)
                    .set_response_code(r.response_code.clone())
                    .set_response_page_path(r.response_page_path.clone())
                    .build(),
            )
        })
        .collect::<Result<Vec<_>>>()?;
    let custom_error_responses = built(
        cf::CustomErrorResponses::builder()
            .quantity(responses.len() as i32)
            .set_items(Some(responses))
            .build(),
    )?;

    let logging = built(
        cf::LoggingConfig::builder()
            .enabled(config.logging.enabled)
            .include_cookies(false)
            .bucket(&config.logging.bucket)
            .prefix(&config.logging.prefix)
            .build(),
    )?;

    let viewer_certificate = match &config.certificate_arn {
        Some(arn) => cf::ViewerCertificate::builder()
            .acm_certificate_arn(arn)
            .ssl_support_method(cf::SslSupportMethod::from("sni-only"))
            .minimum_protocol_version(cf::MinimumProtocolVersion::from(MINIMUM_TLS))
            .build(),
        None => cf::ViewerCertificate::builder()
            .cloud_front_default_certificate(true)
            .build(),
    };

    built(
        cf::DistributionConfig::builder()
            .caller_reference(&config.caller_reference)
            .aliases(aliases)
            .comment(&config.comment)
            .origins(origins)
            .default_cache_behavior(default_cache_behavior)
            .cache_behaviors(cache_behaviors)
            .custom_error_responses(custom_error_responses)
            .logging(logging)
            .viewer_certificate(viewer_certificate)
            .enabled(config.enabled)
            .build(),
    )
}

fn origin_to_sdk(origin: &Origin) -> Result<cf::Origin> {
    let custom = built(
        cf::CustomOriginConfig::builder()
            .http_port(HTTP_PORT)
            .https_port(HTTPS_PORT)
            .origin_protocol_policy(cf::OriginProtocolPolicy::from(
                origin.origin_protocol_policy.as_str(),
            ))
            .build(),
    )?;

    built(
        cf::Origin::builder()
            .id(&origin.id)
            .domain_name(&origin.domain_name)
            .origin_path(&origin.origin_path)
            .custom_origin_config(custom)
            .build(),
    )
}

fn forwarded_values(query_string: bool) -> Result<cf::ForwardedValues> {
    let cookies = built(
        cf::CookiePreference::builder()
            .forward(cf::ItemSelection::from("none"))
            .build(),
    )?;
    built(
        cf::ForwardedValues::builder()
            .query_string(query_string)
            .cookies(cookies)
            .build(),
    )
}

/// CloudFront config back into the provider-neutral shape
pub fn from_sdk(config: &cf::DistributionConfig) -> DistributionConfig {
    let default = config.default_cache_behavior();
    let logging = config.logging();

    DistributionConfig {
        caller_reference: config.caller_reference().to_string(),
        aliases: config
            .aliases()
            .map(|a| a.items().to_vec())
            .unwrap_or_default(),
        comment: config.comment().to_string(),
        certificate_arn: config
            .viewer_certificate()
            .and_then(|c| c.acm_certificate_arn())
            .map(str::to_string),
        origins: config
            .origins()
            .map(|o| o.items())
            .unwrap_or_default()
            .iter()
            .map(|o| Origin {
                id: o.id().to_string(),
                domain_name: o.domain_name().to_string(),
                origin_path: o.origin_path().unwrap_or_default().to_string(),
                origin_protocol_policy: o
                    .custom_origin_config()
                    .map(|c| c.origin_protocol_policy().as_str().to_string())
                    .unwrap_or_default(),
            })
            .collect(),
        default_cache_behavior: DefaultCacheBehavior {
            target_origin_id: default
                .map(|d| d.target_origin_id().to_string())
                .unwrap_or_default(),
            viewer_protocol_policy: default
                .map(|d| d.viewer_protocol_policy().as_str().to_string())
                .unwrap_or_default(),
            query_string: default
                .and_then(|d| d.forwarded_values())
                .is_some_and(|f| f.query_string()),
        },
        cache_behaviors: config
            .cache_behaviors()
            .map(|b| b.items())
            .unwrap_or_default()
            .iter()
            .map(|b| CacheBehavior {
                path_pattern: b.path_pattern().to_string(),
                target_origin_id: b.target_origin_id().to_string(),
                viewer_protocol_policy: b.viewer_protocol_policy().as_str().to_string(),
                query_string: b.forwarded_values().is_some_and(|f| f.query_string()),
            })
            .collect(),
        custom_error_responses: config
            .custom_error_responses()
            .map(|r| r.items())
            .unwrap_or_default()
            .iter()
            .map(|r| CustomErrorResponse {
                error_code: r.error_code(),
                error_caching_min_ttl: r.error_caching_min_ttl().unwrap_or_default(),
                response_code: r.response_code().map(str::to_string),
                response_page_path: r.response_page_path().map(str::to_string),
            })
            .collect(),
        logging: LoggingConfig {
            enabled: logging
                .and_then(|l| opt::<bool>(l.enabled()))
                .unwrap_or(false),
            bucket: logging
                .and_then(|l| opt::<&str>(l.bucket()))
                .unwrap_or_default()
                .to_string(),
            prefix: logging
                .and_then(|l| opt::<&str>(l.prefix()))
                .unwrap_or_default()
                .to_string(),
        },
        enabled: opt::<bool>(config.enabled()).unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeflow_cloud::builder::distribution_config;
    use edgeflow_cloud::diff::cdn::is_up_to_date;
    use edgeflow_cloud::model::cdn::{CachePathSpec, ErrorResponseSpec};
    use edgeflow_cloud::{DistributionSpec, OriginSpec, ViewerProtocolPolicy};

    #[test]
    fn test_request_shape_keeps_compared_fields() {
        let mut spec = DistributionSpec::new("assets.example.net");
        spec.certificate = Some("arn:aws:acm:us-east-1:123456789012:certificate/abc".to_string());
        spec.logging = true;
        spec.log_bucket = Some("logs.s3.amazonaws.com".to_string());
        spec.paths = vec![CachePathSpec {
            origin: OriginSpec::new("web", "web.example.com"),
            path_pattern: "/*".to_string(),
            viewer_protocol_policy: Some(ViewerProtocolPolicy::RedirectToHttps),
            forward_query_string: Some(true),
        }];
        spec.error_responses = vec![ErrorResponseSpec {
            status: 403,
            ttl: 10,
            response_code: Some(200),
            response_path: Some("/index.html".to_string()),
        }];

        let config = distribution_config(&spec, "prod-assets-1").unwrap();
        let request = to_sdk(&config).unwrap();

        assert_eq!(request.aliases().unwrap().quantity(), 1);
        assert_eq!(request.caller_reference(), "prod-assets-1");
        assert!(is_up_to_date(&spec, &from_sdk(&request)));
    }

    #[test]
    fn test_default_certificate_without_arn() {
        let mut spec = DistributionSpec::new("dev.example.net");
        spec.origin = Some(OriginSpec::new("API", "api.example.com"));
        let config = distribution_config(&spec, "dev-1").unwrap();

        let request = to_sdk(&config).unwrap();
        let certificate = request.viewer_certificate().unwrap();

        assert_eq!(certificate.cloud_front_default_certificate(), Some(true));
        assert!(certificate.acm_certificate_arn().is_none());
        assert_eq!(from_sdk(&request).certificate_arn, None);
    }
}
