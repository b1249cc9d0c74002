//! AWS provider for EdgeFlow
//!
//! Implements the `edgeflow-cloud` provider traits on top of the AWS SDK:
//!
//! - [`CloudFrontProvider`]: `CdnApi` (distributions)
//! - [`Route53Provider`]: `DnsApi` (alias records, health checks)
//! - [`Ec2Provider`]: `NetworkApi` (VPC, subnets, ACLs, routing, peering)
//!
//! All three share one [`AwsClients`], which resolves credentials through
//! the standard AWS chain and builds each service client on first use.
//!
//! # Example
//!
//! ```ignore
//! use edgeflow_cloud::CdnController;
//! use edgeflow_cloud_aws::{AwsClients, CloudFrontProvider};
//! use std::sync::Arc;
//!
//! let clients = Arc::new(AwsClients::new(Some("ap-northeast-1".into()), None));
//! let controller = CdnController::new(Arc::new(CloudFrontProvider::new(clients)));
//! ```

pub mod clients;
pub mod cloudfront;
pub mod ec2;
pub mod route53;
mod sdk;

pub use clients::{AwsClients, GLOBAL_REGION};
pub use cloudfront::CloudFrontProvider;
pub use ec2::Ec2Provider;
pub use route53::Route53Provider;
