use std::future::Future;

use serde_json::Value;

use crate::data_models::{SearchResult, StoredQuery};

/// Path of the store endpoint, relative to the API base URL.
pub const STORE_PATH: &str = "/store_query_and_results";

/// Opaque acknowledgement returned by the persistence API.
pub type Ack = Value;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("persistence request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("persistence endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("result rejected: {0}")]
    Rejected(String),
}

/// Durable store for accepted results.
pub trait PersistenceGateway: Send + Sync {
    fn store_result(
        &self,
        query: &str,
        result: &SearchResult,
    ) -> impl Future<Output = Result<Ack, PersistenceError>> + Send;
}

/// Persistence over the backend's JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpPersistence {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPersistence {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), STORE_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl PersistenceGateway for HttpPersistence {
    async fn store_result(
        &self,
        query: &str,
        result: &SearchResult,
    ) -> Result<Ack, PersistenceError> {
        let body = StoredQuery::new(query.to_string(), vec![result.clone()]);
        let res = self.client.post(&self.endpoint).json(&body).send().await?;

        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(PersistenceError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        // the ack is opaque; keep non-JSON bodies as a plain string
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

#[test]
fn test_endpoint_joins_base_url() {
    let gateway = HttpPersistence::new("http://localhost:8000/");
    assert_eq!(
        gateway.endpoint(),
        "http://localhost:8000/store_query_and_results"
    );
}
