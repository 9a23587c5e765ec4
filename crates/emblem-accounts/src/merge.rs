//! Merge reducer: combines a fetched account payload with the cached record.
//!
//! The merge is total. Scalar fields follow per-field precedence rules,
//! sub-resource lists deduplicate by identifier with the cached copy winning
//! on conflict, and view pagination is replaced wholesale by the incoming
//! fetch's state.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, hash_map};

use crate::types::{
    AccountRecord, AccountView, Announcement, AuthCode, ClaimAlert, CollectedBalance,
    ListActivity, ListMembership, Review, TransferActivity,
};

/// A sub-resource entry with a stable identifier.
pub(crate) trait SubResource {
    fn id(&self) -> &str;
}

/// A feed-like sub-resource entry, ordered by descending timestamp.
pub(crate) trait Feed: SubResource {
    /// Unix milliseconds used for feed ordering.
    fn ordering_key(&self) -> i64;
}

macro_rules! impl_feed {
    ($ty:ty, $key:ident) => {
        impl SubResource for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        }

        impl Feed for $ty {
            fn ordering_key(&self) -> i64 {
                self.$key
            }
        }
    };
}

impl_feed!(TransferActivity, timestamp);
impl_feed!(Review, timestamp);
impl_feed!(Announcement, timestamp);
impl_feed!(ListActivity, timestamp);
impl_feed!(ClaimAlert, timestamp);
impl_feed!(AuthCode, created_at);
impl_feed!(ListMembership, updated_at);

impl SubResource for CollectedBalance {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Merge a fetched payload into the cached record for the same key.
///
/// An absent cached record merges against the empty record, so a first
/// fetch still gets its lists deduplicated and ordered.
pub fn merge(cached: Option<&AccountRecord>, incoming: AccountRecord) -> AccountRecord {
    let empty = AccountRecord::default();
    let cached = cached.unwrap_or(&empty);

    AccountRecord {
        address: pick_identifier(&cached.address, incoming.address),
        cosmos_address: pick_identifier(&cached.cosmos_address, incoming.cosmos_address),
        username: incoming.username.or_else(|| cached.username.clone()),
        // Cached key preferred: a profile fetch may omit the key a prior
        // transaction fetch already resolved.
        public_key: cached.public_key.clone().or(incoming.public_key),
        airdropped: cached.airdropped || incoming.airdropped,
        // Sequence fetches are explicit and monotonic, so the incoming
        // value is authoritative when present.
        sequence: incoming.sequence.or(cached.sequence),
        // A known account number never regresses to unset.
        account_number: incoming.account_number.or(cached.account_number),
        balance: incoming.balance.or_else(|| cached.balance.clone()),
        resolved_name: incoming
            .resolved_name
            .filter(|name| !name.is_empty())
            .or_else(|| cached.resolved_name.clone()),
        fetched_profile: cached.fetched_profile || incoming.fetched_profile,
        activity: merge_feed(&cached.activity, incoming.activity),
        reviews: merge_feed(&cached.reviews, incoming.reviews),
        announcements: merge_feed(&cached.announcements, incoming.announcements),
        list_activity: merge_feed(&cached.list_activity, incoming.list_activity),
        claim_alerts: merge_feed(&cached.claim_alerts, incoming.claim_alerts),
        auth_codes: merge_feed(&cached.auth_codes, incoming.auth_codes),
        collected_balances: merge_keyed(&cached.collected_balances, incoming.collected_balances),
        address_lists: merge_feed(&cached.address_lists, incoming.address_lists),
        views: merge_views(&cached.views, incoming.views),
    }
}

/// Incoming identifier if non-empty, else the cached one.
fn pick_identifier(cached: &str, incoming: String) -> String {
    if incoming.is_empty() {
        cached.to_string()
    } else {
        incoming
    }
}

/// Dedup-by-id union of cached and incoming entries, cached first.
///
/// On an id conflict the cached copy wins: the first occurrence in the
/// cached-then-incoming concatenation is kept.
fn merge_keyed<T: SubResource + Clone>(cached: &[T], incoming: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(cached.len() + incoming.len());
    let mut out = Vec::with_capacity(cached.len() + incoming.len());
    for entry in cached.iter().cloned().chain(incoming) {
        if seen.insert(entry.id().to_string()) {
            out.push(entry);
        }
    }
    out
}

/// Keyed union followed by descending-timestamp ordering.
fn merge_feed<T: Feed + Clone>(cached: &[T], incoming: Vec<T>) -> Vec<T> {
    let mut out = merge_keyed(cached, incoming);
    out.sort_by(compare_feed);
    out
}

/// Three-way feed comparator: newest first, ties broken by ascending id so
/// equal-timestamp entries still have one deterministic order.
fn compare_feed<T: Feed>(a: &T, b: &T) -> Ordering {
    b.ordering_key()
        .cmp(&a.ordering_key())
        .then_with(|| a.id().cmp(b.id()))
}

/// Per-view merge: union the id sequences (cached ids first, first-seen
/// order), but replace pagination and kind wholesale with the incoming
/// view's values. Views untouched by this fetch pass through unchanged.
fn merge_views(
    cached: &HashMap<String, AccountView>,
    incoming: HashMap<String, AccountView>,
) -> HashMap<String, AccountView> {
    let mut out = cached.clone();
    for (view_id, view) in incoming {
        match out.entry(view_id) {
            hash_map::Entry::Occupied(mut entry) => {
                let ids = union_ids(&entry.get().ids, view.ids);
                entry.insert(AccountView {
                    kind: view.kind,
                    ids,
                    pagination: view.pagination,
                });
            }
            hash_map::Entry::Vacant(entry) => {
                entry.insert(AccountView {
                    kind: view.kind,
                    ids: union_ids(&[], view.ids),
                    pagination: view.pagination,
                });
            }
        }
    }
    out
}

/// Set-semantics union preserving first-seen order.
fn union_ids(cached: &[String], incoming: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(cached.len() + incoming.len());
    let mut out = Vec::with_capacity(cached.len() + incoming.len());
    for id in cached.iter().cloned().chain(incoming) {
        if seen.insert(id.clone()) {
            out.push(id);
        }
    }
    out
}
