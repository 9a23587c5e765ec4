//! Fetch-cycle orchestration: plan, fetch, merge, commit.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, trace, warn};

use crate::error::AccountsError;
use crate::planner::plan;
use crate::resolver::Resolved;
use crate::store::AccountStore;
use crate::types::{AccountRecord, FetchRequest};

/// Remote fetch gateway: one batched call per planning cycle.
///
/// Implementations receive canonicalized, filtered requests and return one
/// (possibly partial) record per requested key. An absent field means "not
/// fetched this cycle", never "cleared".
#[async_trait]
pub trait FetchGateway: Send + Sync {
    async fn fetch_batch(
        &self,
        requests: Vec<FetchRequest>,
    ) -> Result<Vec<AccountRecord>, AccountsError>;
}

/// Drives fetch cycles against a store and a gateway.
pub struct AccountService<G> {
    store: Arc<AccountStore>,
    gateway: G,
}

impl<G: FetchGateway> AccountService<G> {
    pub fn new(store: Arc<AccountStore>, gateway: G) -> Self {
        Self { store, gateway }
    }

    /// The store this service commits into.
    pub fn store(&self) -> Arc<AccountStore> {
        Arc::clone(&self.store)
    }

    /// Run one fetch cycle: plan against the cache, call the gateway for
    /// the surviving subset, merge and commit each returned payload.
    ///
    /// A gateway failure resolves the cycle as a no-op: it is logged, no
    /// partial merge happens, and cached data stays visible. Callers must
    /// not assume the cache was updated.
    pub async fn fetch_accounts(&self, requests: Vec<FetchRequest>) {
        let planned = plan(&self.store, &requests);
        if planned.is_empty() {
            trace!(
                requested = requests.len(),
                "all requests satisfied from cache"
            );
            return;
        }

        debug!(
            requested = requests.len(),
            planned = planned.len(),
            "dispatching fetch cycle"
        );

        match self.gateway.fetch_batch(planned).await {
            Ok(payloads) => {
                let fetched = payloads.len();
                let mut committed = 0;
                for payload in payloads {
                    if self.store.apply(payload) {
                        committed += 1;
                    }
                }
                debug!(fetched, committed, "fetch cycle merged");
            }
            Err(e) => {
                warn!(error = %e, "fetch cycle failed, keeping cached data");
            }
        }
    }

    /// Forceful refresh: invalidate the targets' cached records, then run a
    /// fetch cycle that treats them as fully uncached.
    pub async fn force_fetch_accounts(&self, requests: Vec<FetchRequest>) {
        let keys: Vec<String> = requests
            .iter()
            .filter_map(|request| request.target())
            .filter_map(|target| match self.store.resolve(target) {
                Resolved::Key(key) => Some(key),
                Resolved::Reserved(_) | Resolved::Unresolved => None,
            })
            .collect();

        self.store.invalidate(&keys);
        self.fetch_accounts(requests).await;
    }
}
