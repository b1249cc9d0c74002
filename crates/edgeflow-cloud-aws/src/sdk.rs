//! Small glue between SDK results and `CloudError`

use aws_smithy_types::error::display::DisplayErrorContext;
use aws_smithy_types::error::operation::BuildError;
use edgeflow_cloud::{CloudError, Result};
use std::error::Error;

/// Maps a failed describe/list/get call
pub(crate) fn lookup<E: Error>(operation: &'static str) -> impl FnOnce(E) -> CloudError {
    move |err| CloudError::lookup(operation, DisplayErrorContext(err))
}

/// Maps a failed create/update/associate call
pub(crate) fn mutation<E: Error>(operation: &'static str) -> impl FnOnce(E) -> CloudError {
    move |err| CloudError::mutation(operation, DisplayErrorContext(err))
}

/// Maps a waiter that gave up
pub(crate) fn convergence<E: Error>(resource: &str) -> impl FnOnce(E) -> CloudError {
    move |err| CloudError::convergence(resource, DisplayErrorContext(err))
}

/// Request payload that failed client-side validation
pub(crate) fn invalid(err: BuildError) -> CloudError {
    CloudError::InvalidConfig(DisplayErrorContext(err).to_string())
}

/// A builder output that is either infallible or a `Result<T, BuildError>`
pub(crate) trait Built<T> {
    fn into_result(self) -> Result<T>;
}

impl<T> Built<T> for std::result::Result<T, BuildError> {
    fn into_result(self) -> Result<T> {
        self.map_err(invalid)
    }
}

impl Built<aws_sdk_cloudfront::types::LoggingConfig> for aws_sdk_cloudfront::types::LoggingConfig {
    fn into_result(self) -> Result<Self> {
        Ok(self)
    }
}

pub(crate) fn built<T>(output: impl Built<T>) -> Result<T> {
    output.into_result()
}

/// Normalizes SDK getters that return either `T` or `Option<T>`
pub(crate) fn opt<T>(value: impl Into<Option<T>>) -> Option<T> {
    value.into()
}

/// Response field the provider documents as always present
pub(crate) fn required<T>(value: Option<T>, operation: &'static str, field: &str) -> Result<T> {
    value.ok_or_else(|| CloudError::lookup(operation, format!("response is missing {}", field)))
}
