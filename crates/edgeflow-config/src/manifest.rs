//! edge.yaml の読み込みと検証

use crate::error::{ConfigError, Result};
use edgeflow_cloud::{AliasSpec, DistributionSpec, NetworkSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// AWS 接続設定 (CLI 引数・環境変数が優先)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsSettings {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
}

/// マニフェスト全体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub aws: AwsSettings,
    #[serde(default)]
    pub cdn: Vec<DistributionSpec>,
    #[serde(default)]
    pub dns: Vec<AliasSpec>,
    #[serde(default)]
    pub network: Vec<NetworkSpec>,
}

impl Manifest {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // 空ファイルは空のマニフェストとして扱う
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn is_empty(&self) -> bool {
        self.cdn.is_empty() && self.dns.is_empty() && self.network.is_empty()
    }

    /// 自然キーの重複と各リソース定義の妥当性を検証
    pub fn validate(&self) -> Result<()> {
        unique(
            "cdn",
            self.cdn.iter().map(|d| d.alias.to_ascii_lowercase()),
        )?;
        unique(
            "dns",
            self.dns
                .iter()
                .map(|a| a.domain.trim_end_matches('.').to_ascii_lowercase()),
        )?;
        unique("network", self.network.iter().map(|n| n.name.clone()))?;

        for spec in &self.cdn {
            spec.validate().map_err(invalid)?;
        }
        for spec in &self.dns {
            spec.validate().map_err(invalid)?;
        }
        for spec in &self.network {
            spec.validate().map_err(invalid)?;
        }
        Ok(())
    }
}

fn unique(section: &str, keys: impl Iterator<Item = String>) -> Result<()> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key.clone()) {
            return Err(ConfigError::InvalidManifest(format!(
                "{} に同じキー '{}' が複数定義されています",
                section, key
            )));
        }
    }
    Ok(())
}

fn invalid(err: edgeflow_cloud::CloudError) -> ConfigError {
    ConfigError::InvalidManifest(err.to_string())
}
