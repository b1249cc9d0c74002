//! Network topology model

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Desired state of a network and everything wired into it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub name: String,
    pub cidr_block: String,
    #[serde(default)]
    pub subnets: Vec<SubnetSpec>,
    #[serde(default)]
    pub acls: Vec<AclSpec>,
    #[serde(default)]
    pub peering: Option<PeeringSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetSpec {
    pub name: String,
    pub cidr_block: String,
    pub availability_zone: String,
    #[serde(default)]
    pub map_public_ip_on_launch: bool,
    /// Name of the ACL guarding this subnet
    pub acl: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclSpec {
    pub name: String,
    #[serde(default)]
    pub rules: Vec<AclRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ingress,
    Egress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    All,
    Tcp,
    Udp,
    Icmp,
}

impl Protocol {
    /// IANA protocol number as the provider expects it
    pub fn number(&self) -> &'static str {
        match self {
            Protocol::All => "-1",
            Protocol::Tcp => "6",
            Protocol::Udp => "17",
            Protocol::Icmp => "1",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Deny,
}

impl RuleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleAction::Allow => "allow",
            RuleAction::Deny => "deny",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    pub from: i32,
    pub to: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRule {
    pub cidr_block: String,
    pub direction: Direction,
    pub protocol: Protocol,
    pub action: RuleAction,
    pub rule_number: i32,
    #[serde(default)]
    pub port_range: Option<PortRange>,
}

/// Pending peering connection to accept and route to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeeringSpec {
    pub connection_id: String,
    pub cidr_block: String,
}

impl NetworkSpec {
    /// Checks that every subnet names a declared ACL and that names are unique
    pub fn validate(&self) -> Result<()> {
        let mut acl_names = HashSet::new();
        for acl in &self.acls {
            if !acl_names.insert(acl.name.as_str()) {
                return Err(CloudError::InvalidConfig(format!(
                    "network {}: duplicate ACL name {}",
                    self.name, acl.name
                )));
            }
        }

        let mut subnet_names = HashSet::new();
        for subnet in &self.subnets {
            if !subnet_names.insert(subnet.name.as_str()) {
                return Err(CloudError::InvalidConfig(format!(
                    "network {}: duplicate subnet name {}",
                    self.name, subnet.name
                )));
            }
            if !acl_names.contains(subnet.acl.as_str()) {
                return Err(CloudError::InvalidConfig(format!(
                    "network {}: subnet {} references undeclared ACL {}",
                    self.name, subnet.name, subnet.acl
                )));
            }
        }

        for acl in &self.acls {
            for rule in &acl.rules {
                let needs_ports = matches!(rule.protocol, Protocol::Tcp | Protocol::Udp);
                if needs_ports && rule.port_range.is_none() {
                    return Err(CloudError::InvalidConfig(format!(
                        "network {}: ACL {} rule {} needs a port_range",
                        self.name, acl.name, rule.rule_number
                    )));
                }
            }
        }
        Ok(())
    }
}

// ============ Provider-shaped types ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Looks up the `Name` tag
pub fn name_tag(tags: &[Tag]) -> Option<&str> {
    tags.iter()
        .find(|t| t.key == "Name")
        .map(|t| t.value.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    pub cidr_block: String,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    pub network_id: String,
    pub cidr_block: String,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetRequest {
    pub network_id: String,
    pub cidr_block: String,
    pub availability_zone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclAssociation {
    pub association_id: String,
    pub subnet_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAcl {
    pub id: String,
    pub network_id: String,
    pub is_default: bool,
    pub associations: Vec<AclAssociation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteTarget {
    Gateway(String),
    Peering(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub destination_cidr_block: Option<String>,
    pub target: Option<RouteTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    pub id: String,
    pub network_id: String,
    pub routes: Vec<Route>,
    pub tags: Vec<Tag>,
}

impl RouteTable {
    pub fn has_route_to(&self, cidr_block: &str) -> bool {
        self.routes
            .iter()
            .any(|r| r.destination_cidr_block.as_deref() == Some(cidr_block))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeeringConnection {
    pub id: String,
    /// Status code as reported by the provider (e.g. "pending-acceptance")
    pub status: String,
}

impl PeeringConnection {
    pub const PENDING_ACCEPTANCE: &'static str = "pending-acceptance";

    pub fn is_pending(&self) -> bool {
        self.status == Self::PENDING_ACCEPTANCE
    }
}
