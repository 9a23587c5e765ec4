//! HTTP client for the indexing API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};

use emblem_accounts::{AccountRecord, AccountsError, FetchGateway, FetchRequest};

use crate::error::IndexerError;
use crate::wire::{AccountPayload, ApiErrorBody, BatchAccountsRequest, BatchAccountsResponse};

/// Client for the Emblem indexing API.
pub struct IndexerClient {
    http: Client,
    api_url: String,
}

impl IndexerClient {
    /// Create a new client for the given API base URL.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_timeout(api_url, Duration::from_secs(30))
    }

    /// Create a new client with a custom request timeout.
    pub fn with_timeout(api_url: impl Into<String>, timeout: Duration) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            api_url: api_url.into(),
        }
    }

    /// Fetch a batch of accounts. One request per planning cycle.
    pub async fn fetch_accounts(
        &self,
        requests: &[FetchRequest],
    ) -> Result<Vec<AccountPayload>, IndexerError> {
        let url = format!("{}/api/v0/accounts/batch", self.api_url);
        let body = BatchAccountsRequest {
            accounts_to_fetch: requests.to_vec(),
        };

        debug!(url = %url, accounts = body.accounts_to_fetch.len(), "fetching account batch");

        // Retry up to 4 times: initial + 3 retries with backoff
        let mut last_error = None;
        for attempt in 0..4 {
            match self.post_batch(&url, &body).await {
                Ok(response) => return Ok(response.accounts),
                Err(e) if Self::is_transient_error(&e) && attempt < 3 => {
                    let backoff_ms = 500 * (1 << attempt); // 500ms, 1s, 2s
                    warn!(
                        attempt = attempt + 1,
                        backoff_ms,
                        error = %e,
                        "transient indexer error, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| IndexerError::InvalidResponse("retry exhausted".to_string())))
    }

    async fn post_batch(
        &self,
        url: &str,
        body: &BatchAccountsRequest,
    ) -> Result<BatchAccountsResponse, IndexerError> {
        let response = self.http.post(url).json(body).send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response(response: Response) -> Result<BatchAccountsResponse, IndexerError> {
        let status = response.status();

        if status.is_success() {
            let text = response.text().await?;
            return Ok(serde_json::from_str(&text)?);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(IndexerError::RateLimited { retry_after_secs });
        }

        if status.is_server_error() {
            return Err(IndexerError::Unavailable {
                status: status.as_u16(),
            });
        }

        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiErrorBody>(&text) {
            Ok(body) => Err(IndexerError::Api {
                error: body.error,
                message: body.message,
            }),
            Err(_) => Err(IndexerError::InvalidResponse(format!(
                "HTTP {}: {}",
                status, text
            ))),
        }
    }

    /// Whether an error is worth retrying within the same fetch cycle.
    fn is_transient_error(err: &IndexerError) -> bool {
        match err {
            IndexerError::Http(e) => e.is_timeout() || e.is_connect(),
            IndexerError::Unavailable { .. } => true,
            _ => false,
        }
    }
}

#[async_trait]
impl FetchGateway for IndexerClient {
    async fn fetch_batch(
        &self,
        requests: Vec<FetchRequest>,
    ) -> Result<Vec<AccountRecord>, AccountsError> {
        let payloads = self.fetch_accounts(&requests).await.map_err(|e| match e {
            IndexerError::Json(e) => AccountsError::InvalidPayload(e.to_string()),
            other => AccountsError::Gateway(other.to_string()),
        })?;
        Ok(payloads.into_iter().map(AccountRecord::from).collect())
    }
}
