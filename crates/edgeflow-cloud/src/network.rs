//! Network topology orchestrator
//!
//! Creates a network and wires it up stage by stage:
//!
//! ```text
//! network ─┬─ ACLs (+ rules) ─┐
//!          └─ subnets ────────┴─ subnet→ACL associations
//!                                 └─ gateway → route table ─┬─ default route
//!                                                           └─ subnet associations
//!                                                               └─ peering (optional)
//! ```
//!
//! Independent creations inside a stage run concurrently and the stage ends
//! when all of them have finished; the first failure fails the stage. Each
//! concurrent task returns its `(name, id)` pair and the maps are assembled
//! after the barrier. Nothing is rolled back on failure.
//!
//! A network that already exists (matched by its `Name` tag) is treated as
//! fully wired: only the peering step runs against it. The network is tagged
//! before its availability wait so a run that fails there still leaves it
//! findable by name.

use crate::action::{Action, ActionType, Reconciled};
use crate::builder::resource_tags;
use crate::error::{CloudError, Result};
use crate::model::network::{
    AclSpec, Network, NetworkSpec, PeeringSpec, RouteTarget, SubnetRequest, SubnetSpec, name_tag,
};
use crate::provider::NetworkApi;
use crate::waiter;
use futures_util::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;

pub const RESOURCE_TYPE: &str = "network";

/// Destination of the default route through the gateway
pub const DEFAULT_ROUTE: &str = "0.0.0.0/0";

type IdMap = HashMap<String, String>;

pub struct NetworkOrchestrator {
    api: Arc<dyn NetworkApi>,
}

impl NetworkOrchestrator {
    pub fn new(api: Arc<dyn NetworkApi>) -> Self {
        Self { api }
    }

    pub async fn find_network(&self, name: &str) -> Result<Option<Network>> {
        let networks = self.api.describe_networks(name).await?;
        Ok(networks
            .into_iter()
            .find(|n| name_tag(&n.tags) == Some(name)))
    }

    /// Lookup only; existing networks are never re-diffed
    pub async fn plan(&self, spec: &NetworkSpec) -> Result<Action> {
        spec.validate()?;
        let action_type = match self.find_network(&spec.name).await? {
            Some(_) => ActionType::NoOp,
            None => ActionType::Create,
        };
        Ok(Action::new(RESOURCE_TYPE, &spec.name, action_type))
    }

    /// Builds (or finds) the network for `spec`; the resource is the network id
    ///
    /// An existing network reports `Update` only when the peering step
    /// changed something, `NoOp` otherwise.
    pub async fn reconcile(
        &self,
        spec: &NetworkSpec,
        label: &str,
    ) -> Result<Reconciled<String>> {
        spec.validate()?;

        let existing = self.find_network(&spec.name).await?;
        let created = existing.is_none();
        let (network_id, route_table_id) = match existing {
            Some(network) => {
                tracing::info!(
                    "Network {} already exists as {}, leaving topology as is",
                    spec.name,
                    network.id
                );
                let subnets = self.api.describe_subnets(&network.id).await?;
                tracing::debug!("Network {} has {} subnets", network.id, subnets.len());
                let route_table_id = self.find_route_table(&network.id, &spec.name).await?;
                (network.id, route_table_id)
            }
            None => {
                let (network_id, route_table_id) = self.create_topology(spec, label).await?;
                (network_id, Some(route_table_id))
            }
        };

        let mut peered = false;
        if let Some(peering) = &spec.peering {
            let route_table_id = route_table_id.ok_or_else(|| {
                CloudError::ResourceNotFound(format!("route table for network {}", spec.name))
            })?;
            peered = self
                .reconcile_peering(peering, &network_id, &route_table_id)
                .await?;
        }

        let action = if created {
            ActionType::Create
        } else if peered {
            ActionType::Update
        } else {
            ActionType::NoOp
        };
        Ok(Reconciled::new(action, network_id))
    }

    /// Returns the new network and route table ids
    async fn create_topology(
        &self,
        spec: &NetworkSpec,
        label: &str,
    ) -> Result<(String, String)> {
        let network_id = self.create_network(spec, label).await?;

        let acl_ids = self.create_acls(&spec.acls, &network_id, label).await?;
        tracing::info!("Created {} ACLs in {}", acl_ids.len(), network_id);

        let subnet_ids = self.create_subnets(&spec.subnets, &network_id, label).await?;
        tracing::info!("Created {} subnets in {}", subnet_ids.len(), network_id);

        self.associate_acls(&spec.subnets, &network_id, &subnet_ids, &acl_ids)
            .await?;

        let route_table_id = self
            .create_routing(spec, &network_id, &subnet_ids, label)
            .await?;

        Ok((network_id, route_table_id))
    }

    async fn create_network(&self, spec: &NetworkSpec, label: &str) -> Result<String> {
        tracing::info!("Creating network {} ({})", spec.name, spec.cidr_block);
        let network = self.api.create_network(&spec.cidr_block).await?;
        let network_id = network.id;
        self.api
            .create_tags(&[network_id.clone()], &resource_tags(&spec.name, label))
            .await?;

        let id = network_id.as_str();
        waiter::converge(&format!("network {}", id), move || {
            self.api.wait_until_available(id)
        })
        .await?;
        Ok(network_id)
    }

    async fn create_acls(&self, acls: &[AclSpec], network_id: &str, label: &str) -> Result<IdMap> {
        let tasks = acls.iter().map(|acl| async move {
            let acl_id = self.api.create_acl(network_id).await?;
            self.api
                .create_tags(&[acl_id.clone()], &resource_tags(&acl.name, label))
                .await?;
            for rule in &acl.rules {
                self.api.create_acl_rule(&acl_id, rule).await?;
            }
            tracing::debug!("ACL {} -> {} ({} rules)", acl.name, acl_id, acl.rules.len());
            Ok::<_, CloudError>((acl.name.clone(), acl_id))
        });

        Ok(try_join_all(tasks).await?.into_iter().collect())
    }

    async fn create_subnets(
        &self,
        subnets: &[SubnetSpec],
        network_id: &str,
        label: &str,
    ) -> Result<IdMap> {
        let tasks = subnets.iter().map(|subnet| async move {
            let request = SubnetRequest {
                network_id: network_id.to_string(),
                cidr_block: subnet.cidr_block.clone(),
                availability_zone: subnet.availability_zone.clone(),
            };
            let subnet_id = self.api.create_subnet(&request).await?;
            self.api
                .create_tags(&[subnet_id.clone()], &resource_tags(&subnet.name, label))
                .await?;
            if subnet.map_public_ip_on_launch {
                self.api.modify_subnet_attribute(&subnet_id, true).await?;
            }
            tracing::debug!("Subnet {} -> {}", subnet.name, subnet_id);
            Ok::<_, CloudError>((subnet.name.clone(), subnet_id))
        });

        Ok(try_join_all(tasks).await?.into_iter().collect())
    }

    /// Moves every subnet off the network's default ACL onto its declared one
    async fn associate_acls(
        &self,
        subnets: &[SubnetSpec],
        network_id: &str,
        subnet_ids: &IdMap,
        acl_ids: &IdMap,
    ) -> Result<()> {
        let acls = self.api.describe_acls(network_id).await?;
        let default_associations: HashMap<&str, &str> = acls
            .iter()
            .filter(|acl| acl.is_default)
            .flat_map(|acl| acl.associations.iter())
            .map(|a| (a.subnet_id.as_str(), a.association_id.as_str()))
            .collect();

        let default_associations = &default_associations;
        let tasks = subnets.iter().map(|subnet| async move {
            let subnet_id = id_of(subnet_ids, &subnet.name, "subnet")?;
            let acl_id = id_of(acl_ids, &subnet.acl, "ACL")?;
            let association_id = default_associations
                .get(subnet_id)
                .copied()
                .ok_or_else(|| {
                    CloudError::ResourceNotFound(format!(
                        "default ACL association for subnet {}",
                        subnet_id
                    ))
                })?;
            self.api.associate_acl(association_id, acl_id).await?;
            tracing::debug!("Subnet {} guarded by ACL {}", subnet.name, subnet.acl);
            Ok::<_, CloudError>(())
        });

        try_join_all(tasks).await?;
        Ok(())
    }

    async fn create_routing(
        &self,
        spec: &NetworkSpec,
        network_id: &str,
        subnet_ids: &IdMap,
        label: &str,
    ) -> Result<String> {
        let gateway_id = self.api.create_gateway().await?;
        self.api
            .create_tags(&[gateway_id.clone()], &resource_tags(&spec.name, label))
            .await?;
        self.api.attach_gateway(&gateway_id, network_id).await?;
        tracing::info!("Gateway {} attached to {}", gateway_id, network_id);

        let route_table_id = self.api.create_route_table(network_id).await?;
        self.api
            .create_tags(&[route_table_id.clone()], &resource_tags(&spec.name, label))
            .await?;
        self.api
            .create_route(
                &route_table_id,
                DEFAULT_ROUTE,
                &RouteTarget::Gateway(gateway_id.clone()),
            )
            .await?;

        let table = route_table_id.as_str();
        let tasks = spec.subnets.iter().map(|subnet| async move {
            let subnet_id = id_of(subnet_ids, &subnet.name, "subnet")?;
            self.api.associate_route_table(table, subnet_id).await
        });
        try_join_all(tasks).await?;

        tracing::info!(
            "Route table {} serves {} subnets",
            route_table_id,
            spec.subnets.len()
        );
        Ok(route_table_id)
    }

    /// Route table tagged with the network's name
    async fn find_route_table(&self, network_id: &str, name: &str) -> Result<Option<String>> {
        let tables = self.api.describe_route_tables(network_id).await?;
        Ok(tables
            .into_iter()
            .find(|t| name_tag(&t.tags) == Some(name))
            .map(|t| t.id))
    }

    /// Accepts a pending peering request and makes sure a route to it exists;
    /// returns whether anything changed
    async fn reconcile_peering(
        &self,
        peering: &PeeringSpec,
        network_id: &str,
        route_table_id: &str,
    ) -> Result<bool> {
        let connections = self
            .api
            .describe_peering_connections(&peering.connection_id)
            .await?;
        let pending = connections
            .iter()
            .find(|c| c.id == peering.connection_id && c.is_pending());
        let accepted = pending.is_some();
        if let Some(connection) = pending {
            tracing::info!("Accepting peering connection {}", connection.id);
            self.api.accept_peering_connection(&connection.id).await?;
        }

        let tables = self.api.describe_route_tables(network_id).await?;
        let table = tables
            .iter()
            .find(|t| t.id == route_table_id)
            .ok_or_else(|| {
                CloudError::ResourceNotFound(format!("route table {}", route_table_id))
            })?;

        if table.has_route_to(&peering.cidr_block) {
            tracing::debug!(
                "Route to {} already present in {}",
                peering.cidr_block,
                route_table_id
            );
            return Ok(accepted);
        }

        tracing::info!(
            "Routing {} through peering connection {}",
            peering.cidr_block,
            peering.connection_id
        );
        self.api
            .create_route(
                route_table_id,
                &peering.cidr_block,
                &RouteTarget::Peering(peering.connection_id.clone()),
            )
            .await?;
        Ok(true)
    }
}

fn id_of<'a>(ids: &'a IdMap, name: &str, kind: &str) -> Result<&'a str> {
    ids.get(name)
        .map(String::as_str)
        .ok_or_else(|| CloudError::ResourceNotFound(format!("{} {}", kind, name)))
}
