//! DNS alias controller
//!
//! Keeps an A + AAAA alias pair pointed at a target (typically a CDN
//! distribution). Both records are always written together in one change
//! batch so they never point at different targets.

use crate::action::{Action, ActionType, Reconciled};
use crate::builder;
use crate::diff;
use crate::error::{CloudError, Result};
use crate::model::dns::{AliasSpec, HostedZone, RecordSet, RecordType, normalize_name};
use crate::provider::DnsApi;
use crate::waiter;
use std::sync::Arc;

pub const RESOURCE_TYPE: &str = "dns-alias";

pub struct DnsController {
    api: Arc<dyn DnsApi>,
}

impl DnsController {
    pub fn new(api: Arc<dyn DnsApi>) -> Self {
        Self { api }
    }

    /// Most specific hosted zone that contains `domain`
    pub async fn find_zone(&self, domain: &str) -> Result<HostedZone> {
        let domain = normalize_name(domain);
        let zones = self.api.list_hosted_zones_by_name().await?;

        zones
            .into_iter()
            .filter(|zone| {
                let zone_name = normalize_name(&zone.name);
                domain == zone_name || domain.ends_with(&format!(".{}", zone_name))
            })
            .max_by_key(|zone| normalize_name(&zone.name).len())
            .ok_or_else(|| CloudError::ResourceNotFound(format!("hosted zone for {}", domain)))
    }

    /// Record sets currently published under `domain`
    pub async fn observed_records(
        &self,
        zone: &HostedZone,
        domain: &str,
    ) -> Result<Vec<RecordSet>> {
        let wanted = normalize_name(domain);
        let records = self.api.list_record_sets(&zone.id, domain).await?;
        Ok(records
            .into_iter()
            .filter(|r| normalize_name(&r.name) == wanted)
            .collect())
    }

    /// Lookup and diff only; never mutates
    pub async fn plan(&self, spec: &AliasSpec) -> Result<Action> {
        spec.validate()?;
        let zone = self.find_zone(&spec.domain).await?;
        let observed = self.observed_records(&zone, &spec.domain).await?;

        let action = match diff::dns::first_difference(spec, &observed) {
            None => Action::new(RESOURCE_TYPE, &spec.domain, ActionType::NoOp),
            Some(field) => Action::new(RESOURCE_TYPE, &spec.domain, mutation_type(&observed))
                .with_reason(field),
        };
        Ok(action)
    }

    /// Ensures both alias records exist and point at `spec.target`
    pub async fn reconcile(
        &self,
        spec: &AliasSpec,
        label: &str,
    ) -> Result<Reconciled<Vec<RecordSet>>> {
        spec.validate()?;

        let zone = self.find_zone(&spec.domain).await?;
        let observed = self.observed_records(&zone, &spec.domain).await?;

        let Some(field) = diff::dns::first_difference(spec, &observed) else {
            tracing::debug!("Alias records for {} are up to date", spec.domain);
            return Ok(Reconciled::new(ActionType::NoOp, observed));
        };
        let action = mutation_type(&observed);
        tracing::info!(
            "Alias records for {} differ in {}, upserting ({})",
            spec.domain,
            field,
            action
        );

        let health_check_id = match builder::health_check_request(spec, label) {
            None => None,
            Some(request) => match attached_health_check(&observed) {
                Some(id) => {
                    tracing::debug!("Reusing health check {} for {}", id, spec.domain);
                    Some(id)
                }
                None => {
                    let id = self.api.create_health_check(&request).await?;
                    tracing::info!("Created health check {} for {}", id, spec.domain);
                    Some(id)
                }
            },
        };

        let batch = builder::alias_change_batch(spec, health_check_id.as_deref(), label);
        let change = self.api.change_record_sets(&zone.id, &batch).await?;

        let change_id = change.id.as_str();
        waiter::converge(&format!("change {}", change_id), move || {
            self.api.wait_until_change_propagated(change_id)
        })
        .await?;

        tracing::info!("Alias records for {} are in sync", spec.domain);
        let records = batch.changes.into_iter().map(|c| c.record_set).collect();
        Ok(Reconciled::new(action, records))
    }
}

/// Health check already referenced by one of the observed alias records
fn attached_health_check(observed: &[RecordSet]) -> Option<String> {
    observed
        .iter()
        .filter(|r| {
            RecordType::ALIAS_PAIR
                .iter()
                .any(|t| t.as_str() == r.record_type)
        })
        .find_map(|r| r.health_check_id.clone())
}

fn mutation_type(observed: &[RecordSet]) -> ActionType {
    if observed.is_empty() {
        ActionType::Create
    } else {
        ActionType::Update
    }
}
