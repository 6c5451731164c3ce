use async_trait::async_trait;
use perma_crypto::PublicKey;
use perma_store::{remote_message, ServiceConfig};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{InsertAck, InsertRequest};
use crate::error::{IndexError, IndexResult};
use crate::traits::IndexService;

/// Index service reached over the permastore HTTP API.
#[derive(Debug, Clone)]
pub struct HttpIndexService {
    config: ServiceConfig,
    client: Client,
}

#[derive(Serialize)]
struct ListRequest {
    pubkey: String,
}

#[derive(Deserialize)]
struct ListResponse {
    response: Vec<String>,
}

impl HttpIndexService {
    pub fn new(config: ServiceConfig) -> IndexResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("perma-index/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: ServiceConfig, client: Client) -> Self {
        Self { config, client }
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        url: String,
        body: &B,
    ) -> IndexResult<R> {
        let value: serde_json::Value = self
            .client
            .post(url)
            .json(body)
            .send()
            .await?
            .json()
            .await?;
        if let Some(error) = value.get("error") {
            return Err(IndexError::Remote(remote_message(error.clone())));
        }
        serde_json::from_value(value).map_err(|e| IndexError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl IndexService for HttpIndexService {
    async fn list(&self, pubkey: &PublicKey) -> IndexResult<Vec<String>> {
        debug!(%pubkey, "listing index");
        let body: ListResponse = self
            .post(
                self.config.list_endpoint(),
                &ListRequest {
                    pubkey: pubkey.to_hex(),
                },
            )
            .await?;
        Ok(body.response)
    }

    async fn insert(&self, request: &InsertRequest) -> IndexResult<InsertAck> {
        debug!(cid = %request.cid, timestamp = request.timestamp.offset(), "submitting insert");
        self.post(self.config.insert_endpoint(), request).await
    }
}
