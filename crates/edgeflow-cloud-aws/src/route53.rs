//! Route 53 implementation of `DnsApi`

use crate::clients::AwsClients;
use crate::sdk::{built, convergence, lookup, mutation, required};
use async_trait::async_trait;
use aws_sdk_route53::client::Waiters;
use aws_sdk_route53::types as r53;
use edgeflow_cloud::model::dns::{
    AliasTarget, ChangeBatch, ChangeInfo, HealthCheckRequest, HostedZone, RecordSet,
};
use edgeflow_cloud::{DnsApi, Result};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound for one change propagation wait
pub const CHANGE_WAIT: Duration = Duration::from_secs(10 * 60);

const HEALTH_CHECK_PORT: i32 = 443;
const HEALTH_CHECK_INTERVAL: i32 = 30;
const HEALTH_CHECK_FAILURES: i32 = 3;

/// Records requested per lookup; only the names at the start are inspected
const RECORD_PAGE: i32 = 10;

pub struct Route53Provider {
    clients: Arc<AwsClients>,
}

impl Route53Provider {
    pub fn new(clients: Arc<AwsClients>) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl DnsApi for Route53Provider {
    async fn list_hosted_zones_by_name(&self) -> Result<Vec<HostedZone>> {
        let client = self.clients.route53().await;
        let mut zones = Vec::new();
        let mut next: Option<(String, Option<String>)> = None;

        loop {
            let (dns_name, zone_id) = match next.take() {
                Some((name, id)) => (Some(name), id),
                None => (None, None),
            };
            let output = client
                .list_hosted_zones_by_name()
                .set_dns_name(dns_name)
                .set_hosted_zone_id(zone_id)
                .send()
                .await
                .map_err(lookup("ListHostedZonesByName"))?;

            zones.extend(output.hosted_zones().iter().map(|z| HostedZone {
                id: trim_id(z.id(), "/hostedzone/"),
                name: z.name().to_string(),
            }));

            match output.next_dns_name() {
                Some(name) if output.is_truncated() => {
                    next = Some((
                        name.to_string(),
                        output.next_hosted_zone_id().map(str::to_string),
                    ))
                }
                _ => break,
            }
        }

        tracing::debug!("Listed {} hosted zones", zones.len());
        Ok(zones)
    }

    async fn list_record_sets(&self, zone_id: &str, start_name: &str) -> Result<Vec<RecordSet>> {
        let output = self
            .clients
            .route53()
            .await
            .list_resource_record_sets()
            .hosted_zone_id(zone_id)
            .start_record_name(start_name)
            .max_items(RECORD_PAGE)
            .send()
            .await
            .map_err(lookup("ListResourceRecordSets"))?;

        Ok(output
            .resource_record_sets()
            .iter()
            .map(|r| RecordSet {
                name: r.name().to_string(),
                record_type: r.r#type().as_str().to_string(),
                alias_target: r.alias_target().map(|a| AliasTarget {
                    hosted_zone_id: a.hosted_zone_id().to_string(),
                    dns_name: a.dns_name().to_string(),
                    evaluate_target_health: a.evaluate_target_health(),
                }),
                health_check_id: r.health_check_id().map(str::to_string),
            })
            .collect())
    }

    async fn change_record_sets(&self, zone_id: &str, batch: &ChangeBatch) -> Result<ChangeInfo> {
        let output = self
            .clients
            .route53()
            .await
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(batch_to_sdk(batch)?)
            .send()
            .await
            .map_err(mutation("ChangeResourceRecordSets"))?;

        let info = required(
            output.change_info(),
            "ChangeResourceRecordSets",
            "ChangeInfo",
        )?;
        tracing::info!("Route 53 accepted change {} in {}", info.id(), zone_id);
        Ok(ChangeInfo {
            id: trim_id(info.id(), "/change/"),
        })
    }

    async fn create_health_check(&self, request: &HealthCheckRequest) -> Result<String> {
        let config = built(
            r53::HealthCheckConfig::builder()
                .r#type(r53::HealthCheckType::from("HTTPS"))
                .fully_qualified_domain_name(&request.domain)
                .resource_path(&request.path)
                .port(HEALTH_CHECK_PORT)
                .request_interval(HEALTH_CHECK_INTERVAL)
                .failure_threshold(HEALTH_CHECK_FAILURES)
                .build(),
        )?;

        let output = self
            .clients
            .route53()
            .await
            .create_health_check()
            .caller_reference(&request.caller_reference)
            .health_check_config(config)
            .send()
            .await
            .map_err(mutation("CreateHealthCheck"))?;

        let check = required(output.health_check(), "CreateHealthCheck", "HealthCheck")?;
        Ok(check.id().to_string())
    }

    async fn wait_until_change_propagated(&self, change_id: &str) -> Result<()> {
        self.clients
            .route53()
            .await
            .wait_until_resource_record_sets_changed()
            .id(change_id)
            .wait(CHANGE_WAIT)
            .await
            .map_err(convergence(change_id))?;
        Ok(())
    }
}

/// Provider-neutral change batch into the Route 53 request shape
pub fn batch_to_sdk(batch: &ChangeBatch) -> Result<r53::ChangeBatch> {
    let changes = batch
        .changes
        .iter()
        .map(|change| {
            let record = &change.record_set;
            let alias = record
                .alias_target
                .as_ref()
                .map(|a| {
                    built(
                        r53::AliasTarget::builder()
                            .hosted_zone_id(&a.hosted_zone_id)
                            .dns_name(&a.dns_name)
                            .evaluate_target_health(a.evaluate_target_health)
                            .build(),
                    )
                })
                .transpose()?;

            let record_set = built(
                r53::ResourceRecordSet::builder()
                    .name(&record.name)
                    .r#type(r53::RrType::from(record.record_type.as_str()))
                    .set_alias_target(alias)
                    .set_health_check_id(record.health_check_id.clone())
                    .build(),
            )?;

            built(
                r53::Change::builder()
                    .action(r53::ChangeAction::from(change.action.as_str()))
                    .resource_record_set(record_set)
                    .build(),
            )
        })
        .collect::<Result<Vec<_>>>()?;

    built(
        r53::ChangeBatch::builder()
            .set_comment(batch.comment.clone())
            .set_changes(Some(changes))
            .build(),
    )
}

fn trim_id(id: &str, prefix: &str) -> String {
    id.trim_start_matches(prefix).to_string()
}
