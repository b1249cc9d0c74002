use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "マニフェストが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: edge.local.yaml, edge.yaml, .edge.yaml\n\
        - ./.edgeflow/ ディレクトリ\n\
        - ~/.config/edgeflow/edge.yaml\n\
        または EDGEFLOW_CONFIG_PATH 環境変数で直接指定できます"
    )]
    ManifestNotFound,

    #[error("マニフェストの解析に失敗しました ({path}): {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("マニフェストが不正です: {0}")]
    InvalidManifest(String),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
