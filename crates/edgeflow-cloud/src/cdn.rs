//! CDN distribution controller

use crate::action::{Action, ActionType, Reconciled};
use crate::builder;
use crate::diff;
use crate::error::Result;
use crate::model::cdn::{Distribution, DistributionSpec};
use crate::provider::CdnApi;
use crate::waiter;
use std::sync::Arc;

pub const RESOURCE_TYPE: &str = "distribution";

/// Reconciles distributions addressed by their alias hostname
pub struct CdnController {
    api: Arc<dyn CdnApi>,
}

impl CdnController {
    pub fn new(api: Arc<dyn CdnApi>) -> Self {
        Self { api }
    }

    /// Finds the distribution serving `alias`, with its current entity tag
    pub async fn find_by_alias(&self, alias: &str) -> Result<Option<Distribution>> {
        let summaries = self.api.list_distributions().await?;
        match summaries.iter().find(|s| s.has_alias(alias)) {
            Some(summary) => {
                tracing::debug!("Found distribution {} for {}", summary.id, alias);
                Ok(Some(self.api.get_distribution(&summary.id).await?))
            }
            None => {
                tracing::debug!("No distribution serves {}", alias);
                Ok(None)
            }
        }
    }

    /// Lookup and diff only; never mutates
    pub async fn plan(&self, spec: &DistributionSpec) -> Result<Action> {
        spec.validate()?;
        let action = match self.find_by_alias(&spec.alias).await? {
            None => Action::new(RESOURCE_TYPE, &spec.alias, ActionType::Create),
            Some(existing) => match diff::cdn::first_difference(spec, &existing.config) {
                None => Action::new(RESOURCE_TYPE, &spec.alias, ActionType::NoOp),
                Some(field) => {
                    Action::new(RESOURCE_TYPE, &spec.alias, ActionType::Update).with_reason(field)
                }
            },
        };
        Ok(action)
    }

    /// Creates, updates or leaves alone the distribution for `spec.alias`
    pub async fn reconcile(
        &self,
        spec: &DistributionSpec,
        label: &str,
    ) -> Result<Reconciled<Distribution>> {
        spec.validate()?;

        let Some(existing) = self.find_by_alias(&spec.alias).await? else {
            return self.create(spec, label).await;
        };

        match diff::cdn::first_difference(spec, &existing.config) {
            None => {
                tracing::debug!("Distribution {} is up to date", existing.id);
                Ok(Reconciled::new(ActionType::NoOp, existing))
            }
            Some(field) => {
                tracing::info!(
                    "Distribution {} for {} differs in {}, updating",
                    existing.id,
                    spec.alias,
                    field
                );
                self.update(spec, existing).await
            }
        }
    }

    async fn create(
        &self,
        spec: &DistributionSpec,
        label: &str,
    ) -> Result<Reconciled<Distribution>> {
        let reference = builder::caller_reference(label, &spec.alias);
        let config = builder::distribution_config(spec, &reference)?;

        tracing::info!("Creating distribution for {}", spec.alias);
        let created = self.api.create_distribution(&config).await?;
        self.wait_deployed(&created.id).await?;

        tracing::info!("Distribution {} deployed for {}", created.id, spec.alias);
        Ok(Reconciled::new(ActionType::Create, created))
    }

    async fn update(
        &self,
        spec: &DistributionSpec,
        existing: Distribution,
    ) -> Result<Reconciled<Distribution>> {
        let config = builder::distribution_config(spec, &existing.config.caller_reference)?;

        let updated = self
            .api
            .update_distribution(&existing.id, &config, &existing.e_tag)
            .await?;
        self.wait_deployed(&updated.id).await?;

        tracing::info!("Distribution {} updated for {}", updated.id, spec.alias);
        Ok(Reconciled::new(ActionType::Update, updated))
    }

    async fn wait_deployed(&self, id: &str) -> Result<()> {
        waiter::converge(&format!("distribution {}", id), move || {
            self.api.wait_until_deployed(id)
        })
        .await
    }
}
