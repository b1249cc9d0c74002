//! Lazily built AWS service clients

use aws_config::{BehaviorVersion, Region, SdkConfig};
use tokio::sync::OnceCell;

/// CloudFront and Route 53 are global services homed in this region
pub const GLOBAL_REGION: &str = "us-east-1";

/// Per-service client handles, each built on first use and reused afterwards.
///
/// Credentials and region resolve through the standard AWS chain; `region`
/// and `profile` override it when set.
#[derive(Debug, Default)]
pub struct AwsClients {
    region: Option<String>,
    profile: Option<String>,
    sdk_config: OnceCell<SdkConfig>,
    cloudfront: OnceCell<aws_sdk_cloudfront::Client>,
    route53: OnceCell<aws_sdk_route53::Client>,
    ec2: OnceCell<aws_sdk_ec2::Client>,
}

impl AwsClients {
    pub fn new(region: Option<String>, profile: Option<String>) -> Self {
        Self {
            region,
            profile,
            ..Default::default()
        }
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    async fn sdk_config(&self) -> &SdkConfig {
        self.sdk_config
            .get_or_init(|| async {
                let mut loader = aws_config::defaults(BehaviorVersion::latest());
                if let Some(region) = &self.region {
                    loader = loader.region(Region::new(region.clone()));
                }
                if let Some(profile) = &self.profile {
                    loader = loader.profile_name(profile);
                }
                let config = loader.load().await;
                tracing::debug!(
                    "Loaded AWS config (region: {:?}, profile: {:?})",
                    config.region(),
                    self.profile
                );
                config
            })
            .await
    }

    pub async fn cloudfront(&self) -> &aws_sdk_cloudfront::Client {
        self.cloudfront
            .get_or_init(|| async {
                let config = aws_sdk_cloudfront::config::Builder::from(self.sdk_config().await)
                    .region(Region::new(GLOBAL_REGION))
                    .build();
                aws_sdk_cloudfront::Client::from_conf(config)
            })
            .await
    }

    pub async fn route53(&self) -> &aws_sdk_route53::Client {
        self.route53
            .get_or_init(|| async {
                let config = aws_sdk_route53::config::Builder::from(self.sdk_config().await)
                    .region(Region::new(GLOBAL_REGION))
                    .build();
                aws_sdk_route53::Client::from_conf(config)
            })
            .await
    }

    pub async fn ec2(&self) -> &aws_sdk_ec2::Client {
        self.ec2
            .get_or_init(|| async { aws_sdk_ec2::Client::new(self.sdk_config().await) })
            .await
    }
}
