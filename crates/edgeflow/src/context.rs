use edgeflow_cloud::{CdnController, DnsController, NetworkOrchestrator};
use edgeflow_cloud_aws::{AwsClients, CloudFrontProvider, Ec2Provider, Route53Provider};
use edgeflow_config::AwsSettings;
use std::sync::Arc;

/// コマンド実行に必要なコントローラー一式
pub struct Context {
    pub label: String,
    pub region: Option<String>,
    pub cdn: CdnController,
    pub dns: DnsController,
    pub network: NetworkOrchestrator,
}

impl Context {
    /// CLI引数（環境変数を含む）をマニフェストの aws 設定より優先する
    pub fn new(
        label: &str,
        region: Option<String>,
        profile: Option<String>,
        settings: &AwsSettings,
    ) -> Self {
        let region = region.or_else(|| settings.region.clone());
        let profile = profile.or_else(|| settings.profile.clone());
        let clients = Arc::new(AwsClients::new(region.clone(), profile));

        Self {
            label: label.to_string(),
            region,
            cdn: CdnController::new(Arc::new(CloudFrontProvider::new(clients.clone()))),
            dns: DnsController::new(Arc::new(Route53Provider::new(clients.clone()))),
            network: NetworkOrchestrator::new(Arc::new(Ec2Provider::new(clients))),
        }
    }
}
