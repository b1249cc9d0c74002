mod commands;
mod context;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "edge")]
#[command(about = "宣言した通りに、エッジが揃う。", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 環境ラベル (dev, stg, prod)。タグやコメントに使われる
    #[arg(short = 'e', long = "env", env = "EDGE_ENV", global = true, default_value = "dev")]
    env: String,

    /// AWSリージョン（マニフェストの aws.region より優先）
    #[arg(long, env = "AWS_REGION", global = true)]
    region: Option<String>,

    /// AWSプロファイル（マニフェストの aws.profile より優先）
    #[arg(long, env = "AWS_PROFILE", global = true)]
    profile: Option<String>,

    /// マニフェストのパス（省略時は edge.yaml を探索）
    #[arg(short = 'f', long = "file", global = true)]
    file: Option<PathBuf>,

    /// デバッグログを出力
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// マニフェストを検証
    Validate,
    /// 変更内容を表示（リソースは変更しない）
    Plan {
        /// 対象のリソース種別
        #[arg(long, value_enum)]
        only: Option<Target>,
        /// JSON形式で出力
        #[arg(long)]
        json: bool,
    },
    /// マニフェストを適用し、反映完了まで待つ
    Apply {
        /// 対象のリソース種別
        #[arg(long, value_enum)]
        only: Option<Target>,
        /// 確認なしで実行
        #[arg(short, long)]
        yes: bool,
    },
    /// バージョン情報を表示
    Version,
}

/// リソース種別
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Target {
    Cdn,
    Dns,
    Network,
}

impl Target {
    /// `only` が未指定なら全種別が対象
    pub fn selected(only: Option<Target>, target: Target) -> bool {
        only.is_none_or(|o| o == target)
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout は結果表示に使うので、ログは stderr に出力
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Versionコマンドはマニフェスト不要
    if matches!(cli.command, Commands::Version) {
        println!("edgeflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let (path, manifest) = edgeflow_config::load(cli.file.as_deref())?;
    tracing::debug!("Loaded manifest from {}", path.display());

    match cli.command {
        Commands::Validate => {
            commands::validate::handle(&path, &manifest);
        }
        Commands::Plan { only, json } => {
            manifest.validate()?;
            let ctx = context::Context::new(&cli.env, cli.region, cli.profile, &manifest.aws);
            commands::plan::handle(&ctx, &manifest, only, json).await?;
        }
        Commands::Apply { only, yes } => {
            manifest.validate()?;
            let ctx = context::Context::new(&cli.env, cli.region, cli.profile, &manifest.aws);
            commands::apply::handle(&ctx, &manifest, only, yes).await?;
        }
        Commands::Version => {
            unreachable!("Version is handled before manifest loading");
        }
    }

    Ok(())
}
