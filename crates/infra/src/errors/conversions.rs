//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use syncbridge_domain::SyncError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SyncError);

impl From<InfraError> for SyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SyncError> for InfraError {
    fn from(value: SyncError) -> Self {
        Self(value)
    }
}

impl From<HttpError> for InfraError {
    fn from(err: HttpError) -> Self {
        let mapped = if err.is_timeout() {
            SyncError::Network(format!("HTTP request timed out: {err}"))
        } else if err.is_connect() {
            SyncError::Network(format!("HTTP connection failed: {err}"))
        } else if err.is_decode() {
            SyncError::Serialization(format!("HTTP response body could not be decoded: {err}"))
        } else if err.is_builder() {
            SyncError::Internal(format!("HTTP request could not be built: {err}"))
        } else {
            SyncError::Network(format!("HTTP request failed: {err}"))
        };
        Self(mapped)
    }
}
