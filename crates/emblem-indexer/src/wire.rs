//! Wire types for the indexing API's batched account route.
//!
//! The wire shape differs from the cache's record type in one place: the
//! indexer encodes an unknown account number as the sentinel `-1` rather
//! than omitting the field. The conversion into [`AccountRecord`] maps the
//! sentinel (and any other negative value) to `None`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use emblem_accounts::{
    AccountRecord, AccountView, Announcement, AuthCode, ClaimAlert, Coin, CollectedBalance,
    FetchRequest, ListActivity, ListMembership, Review, TransferActivity,
};

/// The indexer's "unset" sentinel for account numbers.
pub const UNSET_ACCOUNT_NUMBER: i64 = -1;

fn unset_account_number() -> i64 {
    UNSET_ACCOUNT_NUMBER
}

/// Request body for `POST /api/v0/accounts/batch`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAccountsRequest {
    pub accounts_to_fetch: Vec<FetchRequest>,
}

/// Response body for `POST /api/v0/accounts/batch`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAccountsResponse {
    pub accounts: Vec<AccountPayload>,
}

/// Typed error body returned by the API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

/// One account as returned by the indexer. Partial: an absent field means
/// "not fetched this cycle", never "cleared".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPayload {
    pub address: String,
    #[serde(default)]
    pub cosmos_address: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub sequence: Option<u64>,
    #[serde(default = "unset_account_number")]
    pub account_number: i64,
    #[serde(default)]
    pub balance: Option<Coin>,
    #[serde(default)]
    pub resolved_name: Option<String>,
    #[serde(default)]
    pub airdropped: bool,
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

impl From<AccountPayload> for AccountRecord {
    fn from(payload: AccountPayload) -> Self {
        AccountRecord {
            address: payload.address,
            cosmos_address: payload.cosmos_address,
            username: payload.username,
            public_key: payload.public_key,
            sequence: payload.sequence,
            // -1 (or any negative) wire value means unset.
            account_number: u64::try_from(payload.account_number).ok(),
            balance: payload.balance,
            resolved_name: payload.resolved_name,
            airdropped: payload.airdropped,
            fetched_profile: payload.fetched_profile,
            activity: payload.activity,
            reviews: payload.reviews,
            announcements: payload.announcements,
            list_activity: payload.list_activity,
            claim_alerts: payload.claim_alerts,
            auth_codes: payload.auth_codes,
            collected_balances: payload.collected_balances,
            address_lists: payload.address_lists,
            views: payload.views,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_account_number_maps_to_none() {
        let payload: AccountPayload = serde_json::from_str(
            r#"{"address":"0xabc","cosmosAddress":"0xabc","accountNumber":-1}"#,
        )
        .unwrap();
        let record = AccountRecord::from(payload);
        assert_eq!(record.account_number, None);
    }

    #[test]
    fn valid_account_number_survives() {
        let payload: AccountPayload = serde_json::from_str(
            r#"{"address":"0xabc","cosmosAddress":"0xabc","accountNumber":7}"#,
        )
        .unwrap();
        let record = AccountRecord::from(payload);
        assert_eq!(record.account_number, Some(7));
    }

    #[test]
    fn missing_account_number_defaults_to_sentinel() {
        let payload: AccountPayload =
            serde_json::from_str(r#"{"address":"0xabc","cosmosAddress":"0xabc"}"#).unwrap();
        assert_eq!(payload.account_number, UNSET_ACCOUNT_NUMBER);
        assert_eq!(AccountRecord::from(payload).account_number, None);
    }

    #[test]
    fn batch_request_serializes_camel_case() {
        let body = BatchAccountsRequest {
            accounts_to_fetch: vec![FetchRequest {
                fetch_sequence: true,
                ..FetchRequest::for_address("0xabc")
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json["accountsToFetch"][0]["fetchSequence"].as_bool().unwrap());
        assert_eq!(json["accountsToFetch"][0]["address"], "0xabc");
    }
}
