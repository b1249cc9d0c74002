//! Provider API traits
//!
//! Controllers only talk to the provider through these traits, so any backend
//! (the AWS adapters, or an in-memory fake in tests) can be injected.
//! Adapters report read failures as [`CloudError::Lookup`], rejected writes as
//! [`CloudError::Mutation`] and failed waits as [`CloudError::Convergence`].
//!
//! [`CloudError::Lookup`]: crate::CloudError::Lookup
//! [`CloudError::Mutation`]: crate::CloudError::Mutation
//! [`CloudError::Convergence`]: crate::CloudError::Convergence

use crate::error::Result;
use crate::model::cdn::{Distribution, DistributionConfig, DistributionSummary};
use crate::model::dns::{ChangeBatch, ChangeInfo, HealthCheckRequest, HostedZone, RecordSet};
use crate::model::network::{
    AclRule, Network, NetworkAcl, PeeringConnection, RouteTable, RouteTarget, Subnet,
    SubnetRequest, Tag,
};
use async_trait::async_trait;

/// CDN distribution API
#[async_trait]
pub trait CdnApi: Send + Sync {
    async fn list_distributions(&self) -> Result<Vec<DistributionSummary>>;

    async fn get_distribution(&self, id: &str) -> Result<Distribution>;

    async fn create_distribution(&self, config: &DistributionConfig) -> Result<Distribution>;

    /// Update guarded by the entity tag returned from the last read
    async fn update_distribution(
        &self,
        id: &str,
        config: &DistributionConfig,
        e_tag: &str,
    ) -> Result<Distribution>;

    /// Blocks until the distribution reports `Deployed`
    async fn wait_until_deployed(&self, id: &str) -> Result<()>;
}

/// DNS record set API
#[async_trait]
pub trait DnsApi: Send + Sync {
    async fn list_hosted_zones_by_name(&self) -> Result<Vec<HostedZone>>;

    /// Record sets of a zone, starting at `start_name` in the provider's sort order
    async fn list_record_sets(&self, zone_id: &str, start_name: &str) -> Result<Vec<RecordSet>>;

    async fn change_record_sets(&self, zone_id: &str, batch: &ChangeBatch) -> Result<ChangeInfo>;

    /// Returns the id of the new health check
    async fn create_health_check(&self, request: &HealthCheckRequest) -> Result<String>;

    /// Blocks until the change reports `INSYNC`
    async fn wait_until_change_propagated(&self, change_id: &str) -> Result<()>;
}

/// Virtual network API
#[async_trait]
pub trait NetworkApi: Send + Sync {
    /// Networks whose `Name` tag equals `name`
    async fn describe_networks(&self, name: &str) -> Result<Vec<Network>>;

    async fn create_network(&self, cidr_block: &str) -> Result<Network>;

    /// Blocks until the network reports `available`
    async fn wait_until_available(&self, network_id: &str) -> Result<()>;

    async fn create_tags(&self, resource_ids: &[String], tags: &[Tag]) -> Result<()>;

    /// Returns the new ACL id
    async fn create_acl(&self, network_id: &str) -> Result<String>;

    async fn create_acl_rule(&self, acl_id: &str, rule: &AclRule) -> Result<()>;

    async fn describe_acls(&self, network_id: &str) -> Result<Vec<NetworkAcl>>;

    /// Replaces an existing ACL association; returns the new association id
    async fn associate_acl(&self, association_id: &str, acl_id: &str) -> Result<String>;

    /// Returns the new subnet id
    async fn create_subnet(&self, request: &SubnetRequest) -> Result<String>;

    async fn describe_subnets(&self, network_id: &str) -> Result<Vec<Subnet>>;

    async fn modify_subnet_attribute(&self, subnet_id: &str, map_public_ip_on_launch: bool)
    -> Result<()>;

    /// Returns the new gateway id
    async fn create_gateway(&self) -> Result<String>;

    async fn attach_gateway(&self, gateway_id: &str, network_id: &str) -> Result<()>;

    /// Returns the new route table id
    async fn create_route_table(&self, network_id: &str) -> Result<String>;

    async fn describe_route_tables(&self, network_id: &str) -> Result<Vec<RouteTable>>;

    async fn create_route(
        &self,
        route_table_id: &str,
        destination_cidr_block: &str,
        target: &RouteTarget,
    ) -> Result<()>;

    /// Returns the association id
    async fn associate_route_table(&self, route_table_id: &str, subnet_id: &str)
    -> Result<String>;

    async fn describe_peering_connections(
        &self,
        connection_id: &str,
    ) -> Result<Vec<PeeringConnection>>;

    async fn accept_peering_connection(&self, connection_id: &str) -> Result<()>;
}
