//! Fetch planner: diffs requested data against the cache so the gateway is
//! only asked for what is still missing.

use tracing::{debug, trace};

use crate::resolver::Resolved;
use crate::store::AccountStore;
use crate::types::{AccountRecord, EXHAUSTED_BOOKMARK, FetchRequest, ViewRequest};

/// Reduce a batch of fetch requests to the subset that still needs the
/// network, consulting current store state.
///
/// Planning never errors: malformed requests (no target) are skipped,
/// reserved-account targets are dropped unconditionally, and requests that
/// reduce to nothing are dropped from the output.
pub fn plan(store: &AccountStore, requests: &[FetchRequest]) -> Vec<FetchRequest> {
    requests
        .iter()
        .filter_map(|request| plan_one(store, request))
        .collect()
}

fn plan_one(store: &AccountStore, request: &FetchRequest) -> Option<FetchRequest> {
    let Some(target) = request.target() else {
        debug!("skipping malformed fetch request with no target");
        return None;
    };

    match store.resolve(target) {
        Resolved::Reserved(name) => {
            trace!(target = %name, "dropping fetch for reserved account");
            None
        }
        Resolved::Key(key) => match store.record(&key) {
            // Nothing cached: the full request stands.
            None => Some(request.clone()),
            Some(cached) => reduce_against(&cached, request),
        },
        // Unknown username: treat as not yet cached, full fetch needed.
        Resolved::Unresolved => Some(request.clone()),
    }
}

/// Rewrite a request against its cached record: canonical identifiers for
/// the gateway, views filtered to those that can still produce data, and
/// the whole request dropped when nothing remains to fetch.
fn reduce_against(cached: &AccountRecord, request: &FetchRequest) -> Option<FetchRequest> {
    let mut reduced = request.clone();
    reduced.address = Some(cached.address.clone());
    reduced.username = cached.username.clone();
    reduced
        .views_to_fetch
        .retain(|view| view_needed(cached, view));

    let needed = (request.fetch_sequence && cached.sequence.is_none())
        || (request.fetch_balance && cached.balance.is_none())
        || !reduced.views_to_fetch.is_empty()
        || !cached.fetched_profile;

    if !needed {
        trace!(address = %cached.address, "fetch request fully satisfied from cache");
    }
    needed.then_some(reduced)
}

/// Whether a requested view still needs a network page.
fn view_needed(cached: &AccountRecord, view: &ViewRequest) -> bool {
    match cached.views.get(&view.view_id) {
        // Never fetched under this id.
        None => true,
        Some(cached_view) => {
            cached_view.pagination.bookmark != EXHAUSTED_BOOKMARK
                && cached_view.pagination.has_more
        }
    }
}
