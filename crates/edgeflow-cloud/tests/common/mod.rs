#![allow(dead_code)]

use async_trait::async_trait;
use edgeflow_cloud::model::cdn::{Distribution, DistributionConfig, DistributionSummary};
use edgeflow_cloud::model::dns::{
    ChangeBatch, ChangeInfo, HealthCheckRequest, HostedZone, RecordSet, normalize_name,
};
use edgeflow_cloud::model::network::{
    AclAssociation, AclRule, Network, NetworkAcl, PeeringConnection, Route, RouteTable,
    RouteTarget, Subnet, SubnetRequest, Tag,
};
use edgeflow_cloud::{CdnApi, CloudError, DnsApi, NetworkApi, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

/// Position of the first call starting with `prefix`
pub fn position(calls: &[String], prefix: &str) -> usize {
    calls
        .iter()
        .position(|c| c.starts_with(prefix))
        .unwrap_or_else(|| panic!("no call starting with {:?} in {:?}", prefix, calls))
}

/// Position of the last call starting with `prefix`
pub fn last_position(calls: &[String], prefix: &str) -> usize {
    calls
        .iter()
        .rposition(|c| c.starts_with(prefix))
        .unwrap_or_else(|| panic!("no call starting with {:?} in {:?}", prefix, calls))
}

pub fn count(calls: &[String], prefix: &str) -> usize {
    calls.iter().filter(|c| c.starts_with(prefix)).count()
}

// ============ CDN ============

#[derive(Default)]
struct CdnState {
    distributions: Vec<Distribution>,
    calls: Vec<String>,
    wait_failures: u32,
    fail_list: bool,
    next_id: u32,
}

/// In-memory distribution store that records every call
#[derive(Default)]
pub struct FakeCdn {
    state: Mutex<CdnState>,
}

impl FakeCdn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// The next `n` wait calls fail with a convergence error
    pub fn fail_waits(&self, n: u32) {
        self.state.lock().unwrap().wait_failures = n;
    }

    pub fn fail_list(&self) {
        self.state.lock().unwrap().fail_list = true;
    }

    pub fn insert(&self, id: &str, config: DistributionConfig) {
        self.state.lock().unwrap().distributions.push(Distribution {
            id: id.to_string(),
            e_tag: "ETAG-1".to_string(),
            config,
        });
    }

    pub fn get(&self, id: &str) -> Option<Distribution> {
        let state = self.state.lock().unwrap();
        state.distributions.iter().find(|d| d.id == id).cloned()
    }
}

#[async_trait]
impl CdnApi for FakeCdn {
    async fn list_distributions(&self) -> Result<Vec<DistributionSummary>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("list_distributions".to_string());
        if state.fail_list {
            return Err(CloudError::lookup("ListDistributions", "AccessDenied"));
        }
        Ok(state
            .distributions
            .iter()
            .map(|d| DistributionSummary {
                id: d.id.clone(),
                aliases: d.config.aliases.clone(),
            })
            .collect())
    }

    async fn get_distribution(&self, id: &str) -> Result<Distribution> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("get_distribution {}", id));
        state
            .distributions
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| CloudError::lookup("GetDistributionConfig", "NoSuchDistribution"))
    }

    async fn create_distribution(&self, config: &DistributionConfig) -> Result<Distribution> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("create_distribution".to_string());
        state.next_id += 1;
        let distribution = Distribution {
            id: format!("E{:03}", state.next_id),
            e_tag: "ETAG-1".to_string(),
            config: config.clone(),
        };
        state.distributions.push(distribution.clone());
        Ok(distribution)
    }

    async fn update_distribution(
        &self,
        id: &str,
        config: &DistributionConfig,
        e_tag: &str,
    ) -> Result<Distribution> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(format!("update_distribution {} {}", id, e_tag));
        let existing = state
            .distributions
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| CloudError::mutation("UpdateDistribution", "NoSuchDistribution"))?;
        if existing.e_tag != e_tag {
            return Err(CloudError::mutation("UpdateDistribution", "PreconditionFailed"));
        }
        existing.config = config.clone();
        existing.e_tag = "ETAG-2".to_string();
        Ok(existing.clone())
    }

    async fn wait_until_deployed(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("wait_until_deployed {}", id));
        if state.wait_failures > 0 {
            state.wait_failures -= 1;
            return Err(CloudError::convergence(id, "max wait time exceeded"));
        }
        Ok(())
    }
}

// ============ DNS ============

#[derive(Default)]
struct DnsState {
    zones: Vec<HostedZone>,
    records: Vec<(String, RecordSet)>,
    calls: Vec<String>,
    batches: Vec<ChangeBatch>,
    wait_failures: u32,
    next_id: u32,
    health_checks: u32,
}

#[derive(Default)]
pub struct FakeDns {
    state: Mutex<DnsState>,
}

impl FakeDns {
    pub fn with_zones(zones: &[(&str, &str)]) -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().zones = zones
            .iter()
            .map(|(id, name)| HostedZone {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect();
        fake
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn batches(&self) -> Vec<ChangeBatch> {
        self.state.lock().unwrap().batches.clone()
    }

    pub fn fail_waits(&self, n: u32) {
        self.state.lock().unwrap().wait_failures = n;
    }

    pub fn insert(&self, zone_id: &str, record: RecordSet) {
        self.state
            .lock()
            .unwrap()
            .records
            .push((zone_id.to_string(), record));
    }
}

#[async_trait]
impl DnsApi for FakeDns {
    async fn list_hosted_zones_by_name(&self) -> Result<Vec<HostedZone>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("list_hosted_zones_by_name".to_string());
        Ok(state.zones.clone())
    }

    async fn list_record_sets(&self, zone_id: &str, start_name: &str) -> Result<Vec<RecordSet>> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(format!("list_record_sets {} {}", zone_id, start_name));
        Ok(state
            .records
            .iter()
            .filter(|(zone, _)| zone == zone_id)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn change_record_sets(&self, zone_id: &str, batch: &ChangeBatch) -> Result<ChangeInfo> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("change_record_sets {}", zone_id));
        for change in &batch.changes {
            let incoming = &change.record_set;
            state.records.retain(|(zone, r)| {
                !(zone == zone_id
                    && normalize_name(&r.name) == normalize_name(&incoming.name)
                    && r.record_type == incoming.record_type)
            });
            let mut stored = incoming.clone();
            stored.name = format!("{}.", normalize_name(&incoming.name));
            state.records.push((zone_id.to_string(), stored));
        }
        state.batches.push(batch.clone());
        state.next_id += 1;
        Ok(ChangeInfo {
            id: format!("C{:03}", state.next_id),
        })
    }

    async fn create_health_check(&self, request: &HealthCheckRequest) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(format!("create_health_check {} {}", request.domain, request.path));
        state.health_checks += 1;
        Ok(format!("hc-{}", state.health_checks))
    }

    async fn wait_until_change_propagated(&self, change_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(format!("wait_until_change_propagated {}", change_id));
        if state.wait_failures > 0 {
            state.wait_failures -= 1;
            return Err(CloudError::convergence(change_id, "max wait time exceeded"));
        }
        Ok(())
    }
}

// ============ Network ============

#[derive(Default)]
struct NetworkState {
    networks: Vec<Network>,
    subnets: Vec<Subnet>,
    acls: Vec<NetworkAcl>,
    route_tables: Vec<RouteTable>,
    peerings: Vec<PeeringConnection>,
    calls: Vec<String>,
    fail_prefix: Option<String>,
    wait_failures: u32,
    next_id: u32,
}

impl NetworkState {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn record(&mut self, call: String) -> Result<()> {
        let fail = self
            .fail_prefix
            .as_ref()
            .is_some_and(|p| call.starts_with(p.as_str()));
        self.calls.push(call);
        if fail {
            return Err(CloudError::mutation("fake", "injected failure"));
        }
        Ok(())
    }
}

/// In-memory network provider mimicking default ACL / association behaviour
#[derive(Default)]
pub struct FakeNetwork {
    state: Mutex<NetworkState>,
    gates: Mutex<HashMap<&'static str, Arc<Barrier>>>,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Every call starting with `prefix` fails
    pub fn fail_on(&self, prefix: &str) {
        self.state.lock().unwrap().fail_prefix = Some(prefix.to_string());
    }

    /// The next `n` availability waits time out
    pub fn fail_waits(&self, n: u32) {
        self.state.lock().unwrap().wait_failures = n;
    }

    /// `operation` (`create_acl` or `create_subnet`) only proceeds once `n`
    /// calls to it are in flight at the same time
    pub fn gate(&self, operation: &'static str, n: usize) {
        self.gates
            .lock()
            .unwrap()
            .insert(operation, Arc::new(Barrier::new(n)));
    }

    async fn rendezvous(&self, operation: &str) {
        let gate = self.gates.lock().unwrap().get(operation).cloned();
        if let Some(barrier) = gate {
            barrier.wait().await;
        }
    }

    pub fn add_peering(&self, id: &str, status: &str) {
        self.state.lock().unwrap().peerings.push(PeeringConnection {
            id: id.to_string(),
            status: status.to_string(),
        });
    }

    pub fn peering_status(&self, id: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .peerings
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.status.clone())
    }

    pub fn route_tables(&self) -> Vec<RouteTable> {
        self.state.lock().unwrap().route_tables.clone()
    }

    pub fn acl_of(&self, subnet_id: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .acls
            .iter()
            .find(|acl| acl.associations.iter().any(|a| a.subnet_id == subnet_id))
            .map(|acl| acl.id.clone())
    }

    pub fn subnet_ids(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.subnets.iter().map(|s| s.id.clone()).collect()
    }
}

#[async_trait]
impl NetworkApi for FakeNetwork {
    async fn describe_networks(&self, name: &str) -> Result<Vec<Network>> {
        let mut state = self.state.lock().unwrap();
        state.record(format!("describe_networks {}", name))?;
        Ok(state
            .networks
            .iter()
            .filter(|n| n.tags.iter().any(|t| t.key == "Name" && t.value == name))
            .cloned()
            .collect())
    }

    async fn create_network(&self, cidr_block: &str) -> Result<Network> {
        let mut state = self.state.lock().unwrap();
        state.record(format!("create_network {}", cidr_block))?;
        let id = state.id("vpc");
        let network = Network {
            id: id.clone(),
            cidr_block: cidr_block.to_string(),
            tags: vec![],
        };
        state.networks.push(network.clone());
        let default_acl = state.id("acl-default");
        state.acls.push(NetworkAcl {
            id: default_acl,
            network_id: id,
            is_default: true,
            associations: vec![],
        });
        Ok(network)
    }

    async fn wait_until_available(&self, network_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.record(format!("wait_until_available {}", network_id))?;
        if state.wait_failures > 0 {
            state.wait_failures -= 1;
            return Err(CloudError::convergence(network_id, "max wait time exceeded"));
        }
        Ok(())
    }

    async fn create_tags(&self, resource_ids: &[String], tags: &[Tag]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.record(format!("create_tags {}", resource_ids.join(",")))?;
        for id in resource_ids {
            if let Some(n) = state.networks.iter_mut().find(|n| &n.id == id) {
                n.tags.extend(tags.iter().cloned());
            }
            if let Some(s) = state.subnets.iter_mut().find(|s| &s.id == id) {
                s.tags.extend(tags.iter().cloned());
            }
            if let Some(t) = state.route_tables.iter_mut().find(|t| &t.id == id) {
                t.tags.extend(tags.iter().cloned());
            }
        }
        Ok(())
    }

    async fn create_acl(&self, network_id: &str) -> Result<String> {
        self.rendezvous("create_acl").await;
        let mut state = self.state.lock().unwrap();
        state.record(format!("create_acl {}", network_id))?;
        let id = state.id("acl");
        state.acls.push(NetworkAcl {
            id: id.clone(),
            network_id: network_id.to_string(),
            is_default: false,
            associations: vec![],
        });
        Ok(id)
    }

    async fn create_acl_rule(&self, acl_id: &str, rule: &AclRule) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.record(format!("create_acl_rule {} {}", acl_id, rule.rule_number))
    }

    async fn describe_acls(&self, network_id: &str) -> Result<Vec<NetworkAcl>> {
        let mut state = self.state.lock().unwrap();
        state.record(format!("describe_acls {}", network_id))?;
        Ok(state
            .acls
            .iter()
            .filter(|a| a.network_id == network_id)
            .cloned()
            .collect())
    }

    async fn associate_acl(&self, association_id: &str, acl_id: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.record(format!("associate_acl {} {}", association_id, acl_id))?;
        let mut moved = None;
        for acl in state.acls.iter_mut() {
            if let Some(pos) = acl
                .associations
                .iter()
                .position(|a| a.association_id == association_id)
            {
                moved = Some(acl.associations.remove(pos));
            }
        }
        let moved = moved.ok_or_else(|| {
            CloudError::mutation("ReplaceNetworkAclAssociation", "InvalidAssociationID.NotFound")
        })?;
        let new_id = state.id("aclassoc");
        let target = state
            .acls
            .iter_mut()
            .find(|a| a.id == acl_id)
            .ok_or_else(|| {
                CloudError::mutation("ReplaceNetworkAclAssociation", "InvalidNetworkAclID")
            })?;
        target.associations.push(AclAssociation {
            association_id: new_id.clone(),
            subnet_id: moved.subnet_id,
        });
        Ok(new_id)
    }

    async fn create_subnet(&self, request: &SubnetRequest) -> Result<String> {
        self.rendezvous("create_subnet").await;
        let mut state = self.state.lock().unwrap();
        state.record(format!("create_subnet {}", request.cidr_block))?;
        let id = state.id("subnet");
        state.subnets.push(Subnet {
            id: id.clone(),
            network_id: request.network_id.clone(),
            cidr_block: request.cidr_block.clone(),
            tags: vec![],
        });
        let association_id = state.id("aclassoc");
        if let Some(default_acl) = state
            .acls
            .iter_mut()
            .find(|a| a.network_id == request.network_id && a.is_default)
        {
            default_acl.associations.push(AclAssociation {
                association_id,
                subnet_id: id.clone(),
            });
        }
        Ok(id)
    }

    async fn describe_subnets(&self, network_id: &str) -> Result<Vec<Subnet>> {
        let mut state = self.state.lock().unwrap();
        state.record(format!("describe_subnets {}", network_id))?;
        Ok(state
            .subnets
            .iter()
            .filter(|s| s.network_id == network_id)
            .cloned()
            .collect())
    }

    async fn modify_subnet_attribute(
        &self,
        subnet_id: &str,
        map_public_ip_on_launch: bool,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.record(format!(
            "modify_subnet_attribute {} {}",
            subnet_id, map_public_ip_on_launch
        ))
    }

    async fn create_gateway(&self) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.record("create_gateway".to_string())?;
        Ok(state.id("igw"))
    }

    async fn attach_gateway(&self, gateway_id: &str, network_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.record(format!("attach_gateway {} {}", gateway_id, network_id))
    }

    async fn create_route_table(&self, network_id: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.record(format!("create_route_table {}", network_id))?;
        let id = state.id("rtb");
        state.route_tables.push(RouteTable {
            id: id.clone(),
            network_id: network_id.to_string(),
            routes: vec![],
            tags: vec![],
        });
        Ok(id)
    }

    async fn describe_route_tables(&self, network_id: &str) -> Result<Vec<RouteTable>> {
        let mut state = self.state.lock().unwrap();
        state.record(format!("describe_route_tables {}", network_id))?;
        Ok(state
            .route_tables
            .iter()
            .filter(|t| t.network_id == network_id)
            .cloned()
            .collect())
    }

    async fn create_route(
        &self,
        route_table_id: &str,
        destination_cidr_block: &str,
        target: &RouteTarget,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.record(format!(
            "create_route {} {}",
            route_table_id, destination_cidr_block
        ))?;
        let table = state
            .route_tables
            .iter_mut()
            .find(|t| t.id == route_table_id)
            .ok_or_else(|| CloudError::mutation("CreateRoute", "InvalidRouteTableID.NotFound"))?;
        table.routes.push(Route {
            destination_cidr_block: Some(destination_cidr_block.to_string()),
            target: Some(target.clone()),
        });
        Ok(())
    }

    async fn associate_route_table(&self, route_table_id: &str, subnet_id: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.record(format!(
            "associate_route_table {} {}",
            route_table_id, subnet_id
        ))?;
        Ok(state.id("rtbassoc"))
    }

    async fn describe_peering_connections(
        &self,
        connection_id: &str,
    ) -> Result<Vec<PeeringConnection>> {
        let mut state = self.state.lock().unwrap();
        state.record(format!("describe_peering_connections {}", connection_id))?;
        Ok(state
            .peerings
            .iter()
            .filter(|p| p.id == connection_id)
            .cloned()
            .collect())
    }

    async fn accept_peering_connection(&self, connection_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.record(format!("accept_peering_connection {}", connection_id))?;
        if let Some(p) = state.peerings.iter_mut().find(|p| p.id == connection_id) {
            p.status = "active".to_string();
        }
        Ok(())
    }
}
