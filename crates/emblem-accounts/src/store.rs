//! In-memory account cache.
//!
//! Thread-safe store for account records keyed by chain-canonical address,
//! with a username alias table as secondary index. All mutation funnels
//! through [`AccountStore::apply`] and [`AccountStore::invalidate`];
//! subscribers receive key-level signals and re-read by key.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use crate::diff::should_commit;
use crate::merge::merge;
use crate::resolver::{AddressCodec, Resolved, resolve_with};
use crate::types::{AccountRecord, reserved_name, reserved_record};

/// Broadcast channel capacity for store updates. Sized for bursts of
/// batched fetch cycles without lagging slow subscribers.
const BROADCAST_CHANNEL_CAPACITY: usize = 1024;

/// Update event for store subscribers. Carries the key only; subscribers
/// re-read the record through [`AccountStore::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountUpdate {
    /// A record was committed (created or changed by a merge).
    Committed { key: String },
    /// A record was removed by an explicit invalidation.
    Invalidated { key: String },
}

/// In-memory cache of account records.
pub struct AccountStore {
    /// Records by canonical key.
    accounts: DashMap<String, AccountRecord>,
    /// Username -> canonical key alias table.
    aliases: DashMap<String, String>,
    /// Address syntax and canonicalization, injected by the embedder.
    codec: Arc<dyn AddressCodec>,
    /// Broadcast channel for store updates.
    updates_tx: broadcast::Sender<AccountUpdate>,
}

impl AccountStore {
    /// Create a new empty store around the given address codec.
    pub fn new(codec: Arc<dyn AddressCodec>) -> Arc<Self> {
        let (updates_tx, _) = broadcast::channel(BROADCAST_CHANNEL_CAPACITY);
        Arc::new(Self {
            accounts: DashMap::new(),
            aliases: DashMap::new(),
            codec,
            updates_tx,
        })
    }

    /// Resolve an address-or-username to a canonical key.
    pub fn resolve(&self, input: &str) -> Resolved {
        resolve_with(
            self.codec.as_ref(),
            |username| self.aliases.get(username).map(|key| key.value().clone()),
            input,
        )
    }

    /// Get a record by canonical key. Reserved pseudo-accounts return their
    /// fixed synthetic record.
    pub fn get(&self, key: &str) -> Option<AccountRecord> {
        if let Some(name) = reserved_name(key) {
            return Some(reserved_record(name));
        }
        self.record(key)
    }

    /// Get a record by username via the alias table.
    pub fn get_by_username(&self, username: &str) -> Option<AccountRecord> {
        let key = self.aliases.get(username)?.value().clone();
        self.record(&key)
    }

    /// Raw cache read without the reserved-account synthesis.
    pub(crate) fn record(&self, key: &str) -> Option<AccountRecord> {
        self.accounts.get(key).map(|r| r.value().clone())
    }

    /// Whether a record is cached under the key.
    pub fn contains(&self, key: &str) -> bool {
        self.accounts.contains_key(key)
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Subscribe to store updates.
    pub fn subscribe(&self) -> broadcast::Receiver<AccountUpdate> {
        self.updates_tx.subscribe()
    }

    /// Merge an incoming payload into the cache.
    ///
    /// The merge and the commit decision run under the key's map entry
    /// guard, so two overlapping fetch cycles cannot tear a single record:
    /// the later one merges against the earlier one's result. Returns true
    /// if the record changed and was committed.
    pub fn apply(&self, incoming: AccountRecord) -> bool {
        use dashmap::mapref::entry::Entry;

        let Some(key) = self.canonical_key(&incoming) else {
            warn!(address = %incoming.address, "dropping payload with no canonical key");
            return false;
        };

        // Reserved accounts are never merged or diffed.
        if reserved_name(&key).is_some() {
            trace!(key = %key, "ignoring payload for reserved account");
            return false;
        }

        let (committed, username) = match self.accounts.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                let before = entry.get().clone();
                let merged = merge(Some(&before), incoming);
                if should_commit(Some(&before), &merged) {
                    let username = merged.username.clone();
                    entry.insert(merged);
                    (true, username)
                } else {
                    (false, None)
                }
            }
            Entry::Vacant(entry) => {
                let merged = merge(None, incoming);
                let username = merged.username.clone();
                entry.insert(merged);
                (true, username)
            }
        };

        if committed {
            if let Some(username) = username.filter(|u| !u.is_empty()) {
                self.aliases.insert(username, key.clone());
            }
            self.broadcast(AccountUpdate::Committed { key: key.clone() });
            trace!(key = %key, "store: record committed");
        } else {
            trace!(key = %key, "store: merge produced no change, suppressed");
        }
        committed
    }

    /// Remove records and their username aliases, forcing the next fetch
    /// cycle to treat the keys as fully uncached.
    pub fn invalidate(&self, keys: &[String]) {
        for key in keys {
            let Some((_, record)) = self.accounts.remove(key) else {
                continue;
            };
            if let Some(username) = record.username.as_deref() {
                // Only drop the alias if it still points at this key.
                self.aliases
                    .remove_if(username, |_, aliased| aliased == key);
            }
            self.broadcast(AccountUpdate::Invalidated { key: key.clone() });
            debug!(key = %key, "store: record invalidated");
        }
    }

    /// Clear all cached records and aliases.
    pub fn clear(&self) {
        self.accounts.clear();
        self.aliases.clear();
        debug!("store cleared");
    }

    /// The canonical key for an incoming payload: its chain-canonical
    /// address when supplied, else derived from the plain address.
    fn canonical_key(&self, incoming: &AccountRecord) -> Option<String> {
        if !incoming.cosmos_address.is_empty() {
            return Some(incoming.cosmos_address.clone());
        }
        self.codec.canonicalize(&incoming.address)
    }

    fn broadcast(&self, update: AccountUpdate) {
        if self.updates_tx.send(update).is_err() {
            trace!("no subscribers for store update");
        }
    }
}
