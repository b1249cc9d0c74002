//! DNS alias model

use crate::error::Result;
use crate::model::validate_domain;
use serde::{Deserialize, Serialize};

/// Desired state of an alias pair (A + AAAA) for one domain name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasSpec {
    pub domain: String,
    /// DNS name the alias points at (e.g. a CDN or load balancer hostname)
    pub target: String,
    /// Canonical hosted zone of the target
    pub target_zone_id: String,
    #[serde(default)]
    pub health_check_path: Option<String>,
}

impl AliasSpec {
    pub fn new(
        domain: impl Into<String>,
        target: impl Into<String>,
        target_zone_id: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            target: target.into(),
            target_zone_id: target_zone_id.into(),
            health_check_path: None,
        }
    }

    pub fn with_health_check(mut self, path: impl Into<String>) -> Self {
        self.health_check_path = Some(path.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_domain(&self.domain)
    }
}

/// Record types managed for an alias
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    A,
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    pub const ALIAS_PAIR: [RecordType; 2] = [RecordType::A, RecordType::Aaaa];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

// ============ Provider-shaped types ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedZone {
    pub id: String,
    /// Zone name as the provider reports it, usually with a trailing dot
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasTarget {
    pub hosted_zone_id: String,
    pub dns_name: String,
    pub evaluate_target_health: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    pub name: String,
    /// Wire spelling of the record type ("A", "AAAA", "CNAME", ...)
    pub record_type: String,
    pub alias_target: Option<AliasTarget>,
    pub health_check_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    Upsert,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Upsert => "UPSERT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub action: ChangeAction,
    pub record_set: RecordSet,
}

/// Record changes the provider applies atomically
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBatch {
    pub comment: Option<String>,
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeInfo {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckRequest {
    pub caller_reference: String,
    pub domain: String,
    pub path: String,
}

/// Strip the trailing root dot and lowercase a DNS name for comparison
pub fn normalize_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}
