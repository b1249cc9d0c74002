pub mod error;
pub mod manifest;

pub use error::*;
pub use manifest::{AwsSettings, Manifest};

use std::path::{Path, PathBuf};

/// マニフェストのパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "EDGEFLOW_CONFIG_PATH";

const CANDIDATES: [&str; 3] = ["edge.local.yaml", "edge.yaml", ".edge.yaml"];

/// プロジェクトのedge.yamlを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 EDGEFLOW_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: edge.local.yaml, edge.yaml, .edge.yaml
/// 3. ./.edgeflow/ ディレクトリ内: 同様の順序
/// 4. ~/.config/edgeflow/edge.yaml (グローバル設定)
pub fn find_manifest() -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;

    // 2. カレントディレクトリ
    if let Some(path) = first_existing(&current_dir) {
        return Ok(path);
    }

    // 3. ./.edgeflow/
    let project_dir = current_dir.join(".edgeflow");
    if project_dir.is_dir()
        && let Some(path) = first_existing(&project_dir)
    {
        return Ok(path);
    }

    // 4. グローバル設定
    if let Some(global) = global_manifest_path()
        && global.exists()
    {
        return Ok(global);
    }

    Err(ConfigError::ManifestNotFound)
}

/// ~/.config/edgeflow/edge.yaml
pub fn global_manifest_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("edgeflow").join("edge.yaml"))
}

fn first_existing(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// 明示パスがあればそれを、なければ探索したマニフェストを読み込む
pub fn load(explicit: Option<&Path>) -> Result<(PathBuf, Manifest)> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => find_manifest()?,
    };
    let manifest = Manifest::from_file(&path)?;
    Ok((path, manifest))
}
