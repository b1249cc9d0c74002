//! Convergence waiting
//!
//! Provider mutations return before the resource is usable. After every
//! create/update the controllers block on the provider's wait call through
//! [`converge`], which gives the wait exactly one second chance.

use crate::error::Result;
use std::future::Future;

/// Attempts granted to a wait-for-ready call
pub const CONVERGENCE_ATTEMPTS: u32 = 2;

/// Runs `op` up to `attempts` times, returning the first success or the last error
///
/// `attempts` below 1 is treated as 1.
pub async fn retry<T, F, Fut>(attempts: u32, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                tracing::warn!(
                    "{} failed (attempt {}/{}), retrying: {}",
                    what,
                    attempt,
                    attempts,
                    e
                );
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Blocks on a provider wait call, retrying it once on failure
pub async fn converge<F, Fut>(resource: &str, op: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    tracing::debug!("Waiting for {} to converge", resource);
    retry(CONVERGENCE_ATTEMPTS, &format!("wait for {}", resource), op).await
}
