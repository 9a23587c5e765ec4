//! Integration tests for the indexer client against a mock API.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use emblem_accounts::{FetchGateway, FetchRequest};
use emblem_indexer::{IndexerClient, IndexerError};

const ADDR: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

fn sequence_request() -> FetchRequest {
    FetchRequest {
        fetch_sequence: true,
        ..FetchRequest::for_address(ADDR)
    }
}

#[tokio::test]
async fn fetch_accounts_decodes_partial_records() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/accounts/batch"))
        .and(body_partial_json(json!({
            "accountsToFetch": [{"address": ADDR, "fetchSequence": true}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accounts": [{
                "address": ADDR,
                "cosmosAddress": ADDR,
                "sequence": 5,
                "accountNumber": -1
            }]
        })))
        .mount(&server)
        .await;

    let client = IndexerClient::new(server.uri());
    let payloads = client.fetch_accounts(&[sequence_request()]).await.unwrap();

    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].sequence, Some(5));
    assert_eq!(payloads[0].account_number, -1);
    assert!(payloads[0].activity.is_empty());
}

#[tokio::test]
async fn gateway_impl_maps_wire_sentinels() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/accounts/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accounts": [
                {"address": ADDR, "cosmosAddress": ADDR, "accountNumber": -1},
                {"address": ADDR, "cosmosAddress": ADDR, "accountNumber": 42}
            ]
        })))
        .mount(&server)
        .await;

    let client = IndexerClient::new(server.uri());
    let records = client.fetch_batch(vec![sequence_request()]).await.unwrap();

    assert_eq!(records[0].account_number, None);
    assert_eq!(records[1].account_number, Some(42));
}

#[tokio::test]
async fn api_errors_are_typed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/accounts/batch"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "InvalidRequest",
            "message": "no such view kind"
        })))
        .mount(&server)
        .await;

    let client = IndexerClient::new(server.uri());
    let err = client
        .fetch_accounts(&[sequence_request()])
        .await
        .unwrap_err();

    match err {
        IndexerError::Api { error, message } => {
            assert_eq!(error, "InvalidRequest");
            assert_eq!(message, "no such view kind");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn rate_limit_carries_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v0/accounts/batch"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    let client = IndexerClient::new(server.uri());
    let err = client
        .fetch_accounts(&[sequence_request()])
        .await
        .unwrap_err();

    match err {
        IndexerError::RateLimited { retry_after_secs } => {
            assert_eq!(retry_after_secs, Some(30));
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn transient_errors_are_retried() {
    let server = MockServer::start().await;

    // First attempt hits a 503, the retry succeeds.
    Mock::given(method("POST"))
        .and(path("/api/v0/accounts/batch"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v0/accounts/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accounts": [{"address": ADDR, "cosmosAddress": ADDR, "sequence": 9}]
        })))
        .mount(&server)
        .await;

    let client = IndexerClient::new(server.uri());
    let payloads = client.fetch_accounts(&[sequence_request()]).await.unwrap();

    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].sequence, Some(9));
}
