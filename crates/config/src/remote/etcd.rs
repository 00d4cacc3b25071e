//! etcd v3 backend over the JSON gRPC gateway.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{RemoteBackend, RemoteError, check_status};

/// Reads keys with `POST /v3/kv/range`.
pub struct EtcdBackend {
    client: Client,
    endpoint: String,
}

#[derive(Serialize)]
struct RangeRequest {
    key: String,
}

#[derive(Deserialize)]
struct RangeResponse {
    #[serde(default)]
    kvs: Vec<KeyValue>,
}

#[derive(Deserialize)]
struct KeyValue {
    #[serde(default)]
    value: String,
}

impl EtcdBackend {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl RemoteBackend for EtcdBackend {
    fn provider(&self) -> &str {
        "etcd"
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, RemoteError> {
        let url = format!("{}/v3/kv/range", self.endpoint);
        let body = RangeRequest {
            key: STANDARD.encode(key),
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let response = check_status(response, key)?;
        let range: RangeResponse = response.json().await?;

        // The gateway omits `kvs` entirely when nothing matched.
        let kv = range
            .kvs
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::KeyNotFound(key.to_string()))?;

        STANDARD
            .decode(kv.value.as_bytes())
            .map_err(|e| RemoteError::InvalidResponse(format!("value is not base64: {}", e)))
    }
}
