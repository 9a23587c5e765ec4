//! Error types for the account cache.

use thiserror::Error;

/// Errors surfaced by the fetch pipeline.
///
/// Planning and merging are total and never produce errors; the only
/// failure source is the remote gateway.
#[derive(Debug, Error)]
pub enum AccountsError {
    /// The remote fetch gateway failed to serve a batch.
    #[error("gateway error: {0}")]
    Gateway(String),

    /// A gateway payload could not be decoded.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}
