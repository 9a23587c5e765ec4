//! Account cache and view-pagination reconciliation engine.
//!
//! This crate is the client-side state layer of the Emblem badge platform:
//! it keeps one normalized record per account, plans batched fetches so the
//! remote indexer is only asked for data the cache is missing, merges
//! partial responses without losing previously fetched sub-resources, and
//! suppresses subscriber signals when a merge changes nothing.
//!
//! ## Features
//!
//! - **Store**: thread-safe record cache with a username alias table
//! - **Planner**: per-field and per-view fetch deduplication against cache
//! - **Merge**: deterministic field precedence and list/view reconciliation
//! - **Service**: plan -> fetch -> merge -> commit cycles over a gateway trait

pub mod diff;
mod error;
pub mod merge;
pub mod planner;
pub mod resolver;
mod service;
pub mod store;
pub mod types;

pub use diff::should_commit;
pub use error::AccountsError;
pub use merge::merge;
pub use planner::plan;
pub use resolver::{AddressCodec, HexAddressCodec, Resolved};
pub use service::{AccountService, FetchGateway};
pub use store::{AccountStore, AccountUpdate};
pub use types::*;
