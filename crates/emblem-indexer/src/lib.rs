//! HTTP client for the Emblem indexing API.
//!
//! Implements the account cache's [`FetchGateway`] contract over the
//! indexer's batched account route: one POST per planning cycle, partial
//! records in the response, bounded retry on transient failures.
//!
//! [`FetchGateway`]: emblem_accounts::FetchGateway

mod client;
mod error;
pub mod wire;

pub use client::IndexerClient;
pub use error::IndexerError;
pub use wire::{AccountPayload, BatchAccountsRequest, BatchAccountsResponse};
