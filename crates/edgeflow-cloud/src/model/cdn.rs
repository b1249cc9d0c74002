//! CDN distribution model
//!
//! `DistributionSpec` is the desired state a caller declares. The remaining
//! types mirror the provider's distribution config shape and are what the
//! provider adapters read from and write to the wire.

use crate::error::{CloudError, Result};
use crate::model::validate_domain;
use serde::{Deserialize, Serialize};

/// How viewers may reach the distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewerProtocolPolicy {
    #[default]
    AllowAll,
    HttpsOnly,
    RedirectToHttps,
}

impl ViewerProtocolPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewerProtocolPolicy::AllowAll => "allow-all",
            ViewerProtocolPolicy::HttpsOnly => "https-only",
            ViewerProtocolPolicy::RedirectToHttps => "redirect-to-https",
        }
    }
}

/// How the CDN reaches an origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OriginProtocolPolicy {
    HttpOnly,
    HttpsOnly,
    #[default]
    MatchViewer,
}

impl OriginProtocolPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OriginProtocolPolicy::HttpOnly => "http-only",
            OriginProtocolPolicy::HttpsOnly => "https-only",
            OriginProtocolPolicy::MatchViewer => "match-viewer",
        }
    }
}

/// An origin server, referenced by name from cache behaviors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginSpec {
    pub name: String,
    pub domain: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub protocol: Option<OriginProtocolPolicy>,
}

impl OriginSpec {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            path: String::new(),
            protocol: None,
        }
    }

    pub fn with_protocol(mut self, protocol: OriginProtocolPolicy) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn effective_protocol(&self) -> OriginProtocolPolicy {
        self.protocol.unwrap_or_default()
    }
}

/// One origin routed by a URL path pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePathSpec {
    #[serde(flatten)]
    pub origin: OriginSpec,
    pub path_pattern: String,
    #[serde(default)]
    pub viewer_protocol_policy: Option<ViewerProtocolPolicy>,
    #[serde(default)]
    pub forward_query_string: Option<bool>,
}

impl CachePathSpec {
    pub fn effective_viewer_policy(&self) -> ViewerProtocolPolicy {
        self.viewer_protocol_policy.unwrap_or_default()
    }
}

/// A custom error page keyed by HTTP status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponseSpec {
    pub status: u16,
    #[serde(default)]
    pub ttl: u64,
    #[serde(default)]
    pub response_code: Option<u16>,
    #[serde(default)]
    pub response_path: Option<String>,
}

/// Desired state of one CDN distribution, addressed by its alias hostname
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSpec {
    pub alias: String,
    #[serde(default)]
    pub comment: String,
    /// Certificate ARN served for the alias
    #[serde(default)]
    pub certificate: Option<String>,
    #[serde(default)]
    pub logging: bool,
    #[serde(default)]
    pub log_bucket: Option<String>,
    #[serde(default)]
    pub log_prefix: Option<String>,
    /// Classic single origin, used when `paths` is empty
    #[serde(default)]
    pub origin: Option<OriginSpec>,
    #[serde(default)]
    pub viewer_protocol_policy: Option<ViewerProtocolPolicy>,
    #[serde(default)]
    pub forward_query_string: Option<bool>,
    #[serde(default)]
    pub paths: Vec<CachePathSpec>,
    #[serde(default)]
    pub error_responses: Vec<ErrorResponseSpec>,
}

impl DistributionSpec {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            comment: String::new(),
            certificate: None,
            logging: false,
            log_bucket: None,
            log_prefix: None,
            origin: None,
            viewer_protocol_policy: None,
            forward_query_string: None,
            paths: Vec::new(),
            error_responses: Vec::new(),
        }
    }

    /// Viewer policy of the default behavior: explicit, else the first path's, else allow-all
    pub fn effective_viewer_policy(&self) -> ViewerProtocolPolicy {
        self.viewer_protocol_policy
            .or_else(|| self.paths.first().and_then(|p| p.viewer_protocol_policy))
            .unwrap_or_default()
    }

    pub fn effective_forward_query_string(&self) -> bool {
        self.forward_query_string.unwrap_or(false)
    }

    /// Origin the default cache behavior targets
    pub fn default_origin(&self) -> Option<&OriginSpec> {
        self.origin
            .as_ref()
            .or_else(|| self.paths.first().map(|p| &p.origin))
    }

    /// Every declared origin, first declaration wins per name
    pub fn declared_origins(&self) -> Vec<&OriginSpec> {
        let mut origins: Vec<&OriginSpec> = Vec::new();
        let candidates = self.origin.iter().chain(self.paths.iter().map(|p| &p.origin));
        for origin in candidates {
            if !origins.iter().any(|o| o.name == origin.name) {
                origins.push(origin);
            }
        }
        origins
    }

    pub fn validate(&self) -> Result<()> {
        validate_domain(&self.alias)?;
        if self.default_origin().is_none() {
            return Err(CloudError::InvalidConfig(format!(
                "distribution {} declares no origin",
                self.alias
            )));
        }
        if self.logging && self.log_bucket.is_none() {
            return Err(CloudError::InvalidConfig(format!(
                "distribution {} enables logging without log_bucket",
                self.alias
            )));
        }
        Ok(())
    }
}

// ============ Provider-shaped types ============

/// Listing entry: just enough to match a distribution by alias
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub id: String,
    pub aliases: Vec<String>,
}

impl DistributionSummary {
    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases.iter().any(|a| a.eq_ignore_ascii_case(alias))
    }
}

/// A distribution together with the entity tag needed to update it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub id: String,
    pub e_tag: String,
    pub config: DistributionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionConfig {
    pub caller_reference: String,
    pub aliases: Vec<String>,
    pub comment: String,
    pub certificate_arn: Option<String>,
    pub origins: Vec<Origin>,
    pub default_cache_behavior: DefaultCacheBehavior,
    pub cache_behaviors: Vec<CacheBehavior>,
    pub custom_error_responses: Vec<CustomErrorResponse>,
    pub logging: LoggingConfig,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub id: String,
    pub domain_name: String,
    pub origin_path: String,
    pub origin_protocol_policy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultCacheBehavior {
    pub target_origin_id: String,
    pub viewer_protocol_policy: String,
    pub query_string: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheBehavior {
    pub path_pattern: String,
    pub target_origin_id: String,
    pub viewer_protocol_policy: String,
    pub query_string: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomErrorResponse {
    pub error_code: i32,
    pub error_caching_min_ttl: i64,
    pub response_code: Option<String>,
    pub response_page_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub bucket: String,
    pub prefix: String,
}
