//! Core types for account records, views and fetch requests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Reserved pseudo-account for the minting address.
pub const RESERVED_MINT: &str = "Mint";
/// Reserved pseudo-account for collection totals.
pub const RESERVED_TOTAL: &str = "Total";
/// Reserved pseudo-account matching every address.
pub const RESERVED_ALL: &str = "All";

/// All reserved pseudo-accounts. These never participate in fetch planning
/// or merging; reads return a fixed synthetic record.
pub const RESERVED_ACCOUNTS: [&str; 3] = [RESERVED_MINT, RESERVED_TOTAL, RESERVED_ALL];

/// Bookmark sentinel meaning a view is exhausted and must never be refetched.
/// Distinct from the empty string, which means "never fetched".
pub const EXHAUSTED_BOOKMARK: &str = "nil";

/// Returns the reserved name if the input is a reserved pseudo-account.
pub fn reserved_name(input: &str) -> Option<&'static str> {
    RESERVED_ACCOUNTS.iter().find(|r| **r == input).copied()
}

/// The sub-resource list a view's ids index into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewKind {
    Activity,
    Reviews,
    Announcements,
    ListActivity,
    ClaimAlerts,
    AuthCodes,
    CollectedBalances,
    AddressLists,
}

/// Pagination state for one view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Opaque cursor for the next page. Empty means never fetched,
    /// [`EXHAUSTED_BOOKMARK`] means permanently exhausted.
    pub bookmark: String,
    pub has_more: bool,
}

/// A named, independently paginated feed over one sub-resource list,
/// scoped to one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub kind: ViewKind,
    /// Ordered sub-resource identifiers, newest page last.
    pub ids: Vec<String>,
    pub pagination: Pagination,
}

/// Native token balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub amount: u64,
    pub denom: String,
}

/// A badge balance over an id range within one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeBalance {
    pub amount: u64,
    pub start: u64,
    pub end: u64,
}

/// A badge transfer involving this account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferActivity {
    pub id: String,
    /// Unix milliseconds.
    pub timestamp: i64,
    pub collection_id: u64,
    pub from: String,
    pub to: Vec<String>,
    pub initiated_by: String,
}

/// A review left on this account's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub timestamp: i64,
    pub from: String,
    pub stars: u8,
    pub review: String,
}

/// An announcement from a collection this account follows or collects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub timestamp: i64,
    pub collection_id: u64,
    pub announcement: String,
}

/// Activity on an address list this account belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListActivity {
    pub id: String,
    pub timestamp: i64,
    pub list_id: String,
    pub added_to_list: bool,
    pub addresses: Vec<String>,
}

/// A claim alert directed at this account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimAlert {
    pub id: String,
    pub timestamp: i64,
    pub collection_id: u64,
    pub message: String,
}

/// An authorization code issued by this account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCode {
    pub id: String,
    /// Unix milliseconds.
    pub created_at: i64,
    pub name: String,
    pub description: String,
}

/// Badge balances this account holds in one collection.
///
/// Keyed by `id` but not feed-ordered: entries have no timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedBalance {
    pub id: String,
    pub collection_id: u64,
    pub balances: Vec<BadgeBalance>,
}

/// Membership of this account in an address list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMembership {
    pub id: String,
    /// Unix milliseconds of the last membership change.
    pub updated_at: i64,
    pub list_id: String,
    pub private: bool,
}

/// One cached account, keyed by its chain-canonical address.
///
/// Scalar fields use `Option` for "not yet fetched"; absence on an incoming
/// payload means "not fetched this cycle", never "cleared".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub address: String,
    /// Chain-canonical address; the primary cache key.
    pub cosmos_address: String,
    /// Unique secondary index into the cache.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub sequence: Option<u64>,
    #[serde(default)]
    pub account_number: Option<u64>,
    #[serde(default)]
    pub balance: Option<Coin>,
    #[serde(default)]
    pub resolved_name: Option<String>,
    #[serde(default)]
    pub airdropped: bool,
    /// True once a full profile fetch has completed for this account.
    #[serde(default)]
    pub fetched_profile: bool,
    #[serde(default)]
    pub activity: Vec<TransferActivity>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub announcements: Vec<Announcement>,
    #[serde(default)]
    pub list_activity: Vec<ListActivity>,
    #[serde(default)]
    pub claim_alerts: Vec<ClaimAlert>,
    #[serde(default)]
    pub auth_codes: Vec<AuthCode>,
    #[serde(default)]
    pub collected_balances: Vec<CollectedBalance>,
    #[serde(default)]
    pub address_lists: Vec<ListMembership>,
    #[serde(default)]
    pub views: HashMap<String, AccountView>,
}

impl AccountRecord {
    /// An empty record for the given addresses, nothing fetched yet.
    pub fn empty(address: impl Into<String>, cosmos_address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            cosmos_address: cosmos_address.into(),
            ..Self::default()
        }
    }
}

/// The fixed synthetic record returned for a reserved pseudo-account.
pub fn reserved_record(name: &str) -> AccountRecord {
    AccountRecord {
        address: name.to_string(),
        cosmos_address: name.to_string(),
        resolved_name: Some(name.to_string()),
        fetched_profile: true,
        ..AccountRecord::default()
    }
}

/// Server-side filters for one view fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

/// One page request for a named view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRequest {
    pub view_id: String,
    pub kind: ViewKind,
    /// Cursor to continue from; empty for the first page.
    pub bookmark: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<ViewFilters>,
}

/// A single account fetch request. Transient: consumed by the planner and
/// the gateway, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    /// Target by address. Mutually exclusive with `username`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Target by username. Mutually exclusive with `address`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub fetch_sequence: bool,
    #[serde(default)]
    pub fetch_balance: bool,
    #[serde(default)]
    pub views_to_fetch: Vec<ViewRequest>,
}

impl FetchRequest {
    /// A full profile fetch for an address.
    pub fn for_address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::default()
        }
    }

    /// A full profile fetch for a username.
    pub fn for_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    /// The address-or-username target, if the request has one.
    pub fn target(&self) -> Option<&str> {
        self.address.as_deref().or(self.username.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_names_are_recognized() {
        assert_eq!(reserved_name("Mint"), Some(RESERVED_MINT));
        assert_eq!(reserved_name("Total"), Some(RESERVED_TOTAL));
        assert_eq!(reserved_name("All"), Some(RESERVED_ALL));
        assert_eq!(reserved_name("mint"), None);
        assert_eq!(reserved_name("0xabc"), None);
    }

    #[test]
    fn reserved_record_is_fixed() {
        let a = reserved_record(RESERVED_MINT);
        let b = reserved_record(RESERVED_MINT);
        assert_eq!(a, b);
        assert!(a.fetched_profile);
        assert_eq!(a.address, "Mint");
    }

    #[test]
    fn fetch_request_target_prefers_address() {
        let req = FetchRequest {
            address: Some("0xabc".into()),
            username: Some("alice".into()),
            ..FetchRequest::default()
        };
        assert_eq!(req.target(), Some("0xabc"));

        let req = FetchRequest::for_username("alice");
        assert_eq!(req.target(), Some("alice"));

        assert_eq!(FetchRequest::default().target(), None);
    }

    #[test]
    fn record_deserializes_with_missing_fields() {
        let record: AccountRecord =
            serde_json::from_str(r#"{"address":"0xabc","cosmosAddress":"0xabc"}"#).unwrap();
        assert_eq!(record.sequence, None);
        assert_eq!(record.account_number, None);
        assert!(record.activity.is_empty());
        assert!(record.views.is_empty());
        assert!(!record.fetched_profile);
    }
}
