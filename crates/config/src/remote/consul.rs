//! Consul KV backend.

use async_trait::async_trait;
use reqwest::Client;

use super::{RemoteBackend, RemoteError, check_status};

/// Reads keys with `GET /v1/kv/<key>?raw`.
pub struct ConsulBackend {
    client: Client,
    endpoint: String,
}

impl ConsulBackend {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl RemoteBackend for ConsulBackend {
    fn provider(&self) -> &str {
        "consul"
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, RemoteError> {
        let url = format!("{}/v1/kv/{}", self.endpoint, key.trim_start_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[("raw", "true")])
            .send()
            .await?;
        let response = check_status(response, key)?;

        Ok(response.bytes().await?.to_vec())
    }
}
