use async_trait::async_trait;
use perma_crypto::ContentHasher;
use perma_types::ContentId;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ServiceConfig;
use crate::error::{StoreError, StoreResult};
use crate::traits::ContentStore;

/// Content store backed by the remote permastore HTTP API.
///
/// Uploads go to the API host as hex-encoded JSON; downloads come from the
/// read mirror as raw bytes.
#[derive(Debug, Clone)]
pub struct HttpContentStore {
    config: ServiceConfig,
    client: Client,
}

#[derive(Serialize)]
struct StoreRequest<'a> {
    data: &'a str,
}

#[derive(Deserialize)]
struct StoreResponse {
    multihash: Option<String>,
    error: Option<serde_json::Value>,
}

impl HttpContentStore {
    pub fn new(config: ServiceConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("perma-store/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(config, client))
    }

    /// Share an existing `reqwest` client (connection pool) with this store.
    pub fn with_client(config: ServiceConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn put(&self, data: &[u8]) -> StoreResult<ContentId> {
        let encoded = hex::encode(data);
        debug!(bytes = data.len(), url = %self.config.store_endpoint(), "uploading object");

        let response = self
            .client
            .post(self.config.store_endpoint())
            .json(&StoreRequest { data: &encoded })
            .send()
            .await?;

        let body: StoreResponse = response.json().await?;
        if let Some(error) = body.error {
            return Err(StoreError::Remote(remote_message(error)));
        }
        let multihash = body
            .multihash
            .ok_or_else(|| StoreError::Serialization("response carries no multihash".into()))?;
        Ok(ContentId::parse(&multihash)?)
    }

    async fn get(&self, id: &ContentId) -> StoreResult<Vec<u8>> {
        let url = self.config.fetch_endpoint(&id.to_base58());
        debug!(cid = %id, %url, "downloading object");

        let response = self.client.get(url).send().await?;
        match response.status() {
            status if status.is_success() => {
                let data = response.bytes().await?.to_vec();
                // The mirror reports some failures as a 200 with a JSON error body.
                if !ContentHasher::verify(&data, id) {
                    if let Some(error) = error_payload(&data) {
                        return Err(StoreError::Remote(remote_message(error)));
                    }
                }
                Ok(data)
            }
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(*id)),
            status => {
                let text = response.text().await.unwrap_or_default();
                Err(StoreError::Remote(format!("{status}: {text}")))
            }
        }
    }
}

/// Render an `"error"` payload from the permastore API as a message.
///
/// Error payloads are passed through verbatim; strings lose their quotes.
pub fn remote_message(error: serde_json::Value) -> String {
    match error {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

fn error_payload(data: &[u8]) -> Option<serde_json::Value> {
    match serde_json::from_slice(data).ok()? {
        serde_json::Value::Object(mut map) => map.remove("error"),
        _ => None,
    }
}
