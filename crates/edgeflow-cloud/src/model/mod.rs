//! Desired-state and provider-shaped resource models

pub mod cdn;
pub mod dns;
pub mod network;

use crate::error::{CloudError, Result};

/// Checks that a hostname carries at least a host label and a TLD
///
/// A leading `*` label (wildcard) and `_` inside labels (service names such
/// as `_dmarc`) are accepted.
pub fn validate_domain(domain: &str) -> Result<()> {
    let trimmed = domain.trim_end_matches('.');
    let labels: Vec<&str> = trimmed.split('.').collect();

    if labels.len() < 2 {
        return Err(CloudError::InvalidConfig(format!(
            "domain name {:?} needs at least a host and a TLD",
            domain
        )));
    }

    let valid_label = |label: &str| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    };
    let valid = labels
        .iter()
        .enumerate()
        .all(|(i, &label)| (i == 0 && label == "*") || valid_label(label));
    if !valid {
        return Err(CloudError::InvalidConfig(format!(
            "domain name {:?} contains an invalid label",
            domain
        )));
    }
    Ok(())
}
