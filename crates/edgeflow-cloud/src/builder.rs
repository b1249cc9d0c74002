//! Desired state to provider payload translation
//!
//! Everything here is mechanical: no lookups, no I/O. The diff engine reuses
//! [`error_responses`] so both sides of a comparison share one field spelling.

use crate::error::Result;
use crate::model::cdn::{
    CacheBehavior, CustomErrorResponse, DefaultCacheBehavior, DistributionConfig,
    DistributionSpec, LoggingConfig, Origin,
};
use crate::model::dns::{
    AliasSpec, AliasTarget, Change, ChangeAction, ChangeBatch, HealthCheckRequest, RecordSet,
    RecordType,
};
use crate::model::network::Tag;
use chrono::Utc;

/// Fresh idempotency token for a create call
pub fn caller_reference(label: &str, key: &str) -> String {
    format!("{}-{}-{}", label, key, Utc::now().timestamp_millis())
}

/// Builds the full distribution config for a create or update call
///
/// Updates must pass the caller reference of the observed distribution.
pub fn distribution_config(
    spec: &DistributionSpec,
    caller_reference: &str,
) -> Result<DistributionConfig> {
    spec.validate()?;

    let origins = spec
        .declared_origins()
        .into_iter()
        .map(|o| Origin {
            id: o.name.clone(),
            domain_name: o.domain.clone(),
            origin_path: o.path.clone(),
            origin_protocol_policy: o.effective_protocol().as_str().to_string(),
        })
        .collect();

    // validate() guarantees an origin exists
    let target_origin_id = spec
        .default_origin()
        .map(|o| o.name.clone())
        .unwrap_or_default();

    let cache_behaviors = spec
        .paths
        .iter()
        .map(|p| CacheBehavior {
            path_pattern: p.path_pattern.clone(),
            target_origin_id: p.origin.name.clone(),
            viewer_protocol_policy: p.effective_viewer_policy().as_str().to_string(),
            query_string: p.forward_query_string.unwrap_or(false),
        })
        .collect();

    let logging = if spec.logging {
        LoggingConfig {
            enabled: true,
            bucket: spec.log_bucket.clone().unwrap_or_default(),
            prefix: spec
                .log_prefix
                .clone()
                .unwrap_or_else(|| format!("{}/", spec.alias)),
        }
    } else {
        LoggingConfig::default()
    };

    Ok(DistributionConfig {
        caller_reference: caller_reference.to_string(),
        aliases: vec![spec.alias.clone()],
        comment: spec.comment.clone(),
        certificate_arn: spec.certificate.clone(),
        origins,
        default_cache_behavior: DefaultCacheBehavior {
            target_origin_id,
            viewer_protocol_policy: spec.effective_viewer_policy().as_str().to_string(),
            query_string: spec.effective_forward_query_string(),
        },
        cache_behaviors,
        custom_error_responses: error_responses(spec),
        logging,
        enabled: true,
    })
}

/// Renames desired error pages into the provider's field spelling
pub fn error_responses(spec: &DistributionSpec) -> Vec<CustomErrorResponse> {
    spec.error_responses
        .iter()
        .map(|e| CustomErrorResponse {
            error_code: i32::from(e.status),
            error_caching_min_ttl: i64::try_from(e.ttl).unwrap_or(i64::MAX),
            response_code: e.response_code.map(|c| c.to_string()),
            response_page_path: e.response_path.clone(),
        })
        .collect()
}

pub fn health_check_request(spec: &AliasSpec, label: &str) -> Option<HealthCheckRequest> {
    spec.health_check_path.as_ref().map(|path| HealthCheckRequest {
        caller_reference: caller_reference(label, &spec.domain),
        domain: spec.domain.clone(),
        path: path.clone(),
    })
}

/// Alias record of one type, as it should exist after reconciliation
pub fn alias_record(
    spec: &AliasSpec,
    record_type: RecordType,
    health_check_id: Option<&str>,
) -> RecordSet {
    RecordSet {
        name: spec.domain.clone(),
        record_type: record_type.as_str().to_string(),
        alias_target: Some(AliasTarget {
            hosted_zone_id: spec.target_zone_id.clone(),
            dns_name: spec.target.clone(),
            evaluate_target_health: health_check_id.is_some(),
        }),
        health_check_id: health_check_id.map(str::to_string),
    }
}

/// Upserts the A and AAAA aliases together in one atomic batch
pub fn alias_change_batch(
    spec: &AliasSpec,
    health_check_id: Option<&str>,
    label: &str,
) -> ChangeBatch {
    ChangeBatch {
        comment: Some(format!("edgeflow {}: {}", label, spec.domain)),
        changes: RecordType::ALIAS_PAIR
            .iter()
            .map(|t| Change {
                action: ChangeAction::Upsert,
                record_set: alias_record(spec, *t, health_check_id),
            })
            .collect(),
    }
}

/// `Name` and `Environment` tags applied to every network resource
pub fn resource_tags(name: &str, label: &str) -> Vec<Tag> {
    vec![Tag::new("Name", name), Tag::new("Environment", label)]
}
