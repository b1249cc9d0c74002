//! Alias record comparison
//!
//! Providers report record and target names with a trailing root dot (and
//! sometimes a `dualstack.` style qualifier), so targets are matched
//! case-insensitively with "starts with" semantics.

use crate::diff::{Comparator, first_mismatch};
use crate::model::dns::{AliasSpec, RecordSet, RecordType, normalize_name};

const COMPARATORS: [Comparator<AliasSpec, [RecordSet]>; 3] = [
    ("ipv4_alias", ipv4_alias),
    ("ipv6_alias", ipv6_alias),
    ("health_check", health_check),
];

pub fn first_difference(spec: &AliasSpec, observed: &[RecordSet]) -> Option<&'static str> {
    first_mismatch(&COMPARATORS, spec, observed)
}

pub fn is_up_to_date(spec: &AliasSpec, observed: &[RecordSet]) -> bool {
    first_difference(spec, observed).is_none()
}

/// The observed alias of the given type that points at the desired target
pub fn matching_record<'a>(
    spec: &AliasSpec,
    observed: &'a [RecordSet],
    record_type: RecordType,
) -> Option<&'a RecordSet> {
    let domain = normalize_name(&spec.domain);
    let target = normalize_name(&spec.target);

    observed.iter().find(|record| {
        normalize_name(&record.name) == domain
            && record.record_type == record_type.as_str()
            && record.alias_target.as_ref().is_some_and(|alias| {
                alias.hosted_zone_id.eq_ignore_ascii_case(&spec.target_zone_id)
                    && alias.dns_name.to_ascii_lowercase().starts_with(&target)
            })
    })
}

fn ipv4_alias(spec: &AliasSpec, observed: &[RecordSet]) -> bool {
    matching_record(spec, observed, RecordType::A).is_some()
}

fn ipv6_alias(spec: &AliasSpec, observed: &[RecordSet]) -> bool {
    matching_record(spec, observed, RecordType::Aaaa).is_some()
}

fn health_check(spec: &AliasSpec, observed: &[RecordSet]) -> bool {
    if spec.health_check_path.is_none() {
        return true;
    }
    RecordType::ALIAS_PAIR.iter().all(|t| {
        matching_record(spec, observed, *t).is_some_and(|record| {
            record.health_check_id.is_some()
                && record
                    .alias_target
                    .as_ref()
                    .is_some_and(|a| a.evaluate_target_health)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::dns::AliasTarget;

    fn spec() -> AliasSpec {
        AliasSpec::new("api.example.net", "d123.cloudfront.net", "Z2FDTNDATAQYW2")
    }

    fn record(record_type: &str, dns_name: &str) -> RecordSet {
        RecordSet {
            name: "api.example.net.".to_string(),
            record_type: record_type.to_string(),
            alias_target: Some(AliasTarget {
                hosted_zone_id: "Z2FDTNDATAQYW2".to_string(),
                dns_name: dns_name.to_string(),
                evaluate_target_health: false,
            }),
            health_check_id: None,
        }
    }

    #[test]
    fn test_both_aliases_present() {
        let observed = vec![
            record("A", "d123.cloudfront.net."),
            record("AAAA", "D123.CloudFront.net."),
        ];
        assert!(is_up_to_date(&spec(), &observed));
    }

    #[test]
    fn test_missing_ipv6() {
        let observed = vec![record("A", "d123.cloudfront.net.")];
        assert_eq!(first_difference(&spec(), &observed), Some("ipv6_alias"));
    }

    #[test]
    fn test_no_records() {
        assert_eq!(first_difference(&spec(), &[]), Some("ipv4_alias"));
    }

    #[test]
    fn test_wrong_target() {
        let observed = vec![
            record("A", "d999.cloudfront.net."),
            record("AAAA", "d123.cloudfront.net."),
        ];
        assert_eq!(first_difference(&spec(), &observed), Some("ipv4_alias"));
    }

    #[test]
    fn test_wrong_zone() {
        let mut a = record("A", "d123.cloudfront.net.");
        if let Some(target) = a.alias_target.as_mut() {
            target.hosted_zone_id = "ZOTHER".to_string();
        }
        let observed = vec![a, record("AAAA", "d123.cloudfront.net.")];
        assert_eq!(first_difference(&spec(), &observed), Some("ipv4_alias"));
    }

    #[test]
    fn test_other_name_ignored() {
        let mut a = record("A", "d123.cloudfront.net.");
        a.name = "www.example.net.".to_string();
        let observed = vec![a, record("AAAA", "d123.cloudfront.net.")];
        assert!(!is_up_to_date(&spec(), &observed));
    }

    #[test]
    fn test_health_check_required() {
        let spec = spec().with_health_check("/health");
        let mut observed = vec![
            record("A", "d123.cloudfront.net."),
            record("AAAA", "d123.cloudfront.net."),
        ];
        assert_eq!(first_difference(&spec, &observed), Some("health_check"));

        for r in observed.iter_mut() {
            r.health_check_id = Some("hc-1".to_string());
        }
        assert_eq!(first_difference(&spec, &observed), Some("health_check"));

        for r in observed.iter_mut() {
            if let Some(target) = r.alias_target.as_mut() {
                target.evaluate_target_health = true;
            }
        }
        assert!(is_up_to_date(&spec, &observed));
    }
}
