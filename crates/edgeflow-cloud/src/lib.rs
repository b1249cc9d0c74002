//! EdgeFlow Cloud Reconciliation
//!
//! This crate keeps CDN distributions, DNS aliases and virtual network
//! topologies in line with a declarative desired state. Each entry point
//! looks the resource up by its natural key, decides whether anything has
//! to change, performs the mutation and blocks until the provider reports
//! the resource as converged.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │            edge CLI / manifest loader            │
//! └─────────────────┬───────────────────────────────┘
//!                   │ DistributionSpec / AliasSpec / NetworkSpec
//! ┌─────────────────▼───────────────────────────────┐
//! │                 edgeflow-cloud                   │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────┐ │
//! │  │CdnController │ │DnsController │ │ Network  │ │
//! │  │              │ │              │ │Orchestr. │ │
//! │  └──────┬───────┘ └──────┬───────┘ └────┬─────┘ │
//! │   diff · builder · waiter (retry once)   │       │
//! │  ┌──────▼────────────────▼──────────────▼─────┐ │
//! │  │   trait CdnApi / DnsApi / NetworkApi        │ │
//! │  └────────────────────────────────────────────┘ │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!         ┌─────────▼─────────┐
//!         │ edgeflow-cloud-aws │
//!         └───────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use edgeflow_cloud::{CdnController, DistributionSpec, OriginSpec};
//!
//! let controller = CdnController::new(cdn_api);
//! let mut spec = DistributionSpec::new("dev.example.net");
//! spec.origin = Some(OriginSpec::new("API", "api.example.com"));
//!
//! let outcome = controller.reconcile(&spec, "dev").await?;
//! println!("{} {}", outcome.action, outcome.resource.id);
//! ```

pub mod action;
pub mod builder;
pub mod cdn;
pub mod diff;
pub mod dns;
pub mod error;
pub mod model;
pub mod network;
pub mod provider;
pub mod waiter;

// Re-exports
pub use action::{Action, ActionType, Plan, PlanSummary, Reconciled};
pub use cdn::CdnController;
pub use dns::DnsController;
pub use error::{CloudError, Result};
pub use model::cdn::{
    CachePathSpec, Distribution, DistributionConfig, DistributionSpec, ErrorResponseSpec,
    OriginProtocolPolicy, OriginSpec, ViewerProtocolPolicy,
};
pub use model::dns::{AliasSpec, RecordSet};
pub use model::network::{AclRule, AclSpec, NetworkSpec, PeeringSpec, SubnetSpec};
pub use network::NetworkOrchestrator;
pub use provider::{CdnApi, DnsApi, NetworkApi};
