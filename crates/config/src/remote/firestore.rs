//! Firestore backend over the REST documents API.
//!
//! The endpoint is the documents root, e.g.
//! `https://firestore.googleapis.com/v1/projects/<project>/databases/(default)/documents`,
//! and the key is `<collection>/<document>`. The configuration text lives in
//! the document's `content` string field.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use super::{RemoteBackend, RemoteError, check_status};
use crate::constants::FIRESTORE_CONTENT_FIELD;

pub struct FirestoreBackend {
    client: Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    fields: HashMap<String, FieldValue>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldValue {
    string_value: Option<String>,
}

impl FirestoreBackend {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl RemoteBackend for FirestoreBackend {
    fn provider(&self) -> &str {
        "firestore"
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, RemoteError> {
        let url = format!("{}/{}", self.endpoint, key.trim_start_matches('/'));

        let response = self.client.get(&url).send().await?;
        let response = check_status(response, key)?;
        let document: Document = response.json().await?;

        document
            .fields
            .get(FIRESTORE_CONTENT_FIELD)
            .and_then(|field| field.string_value.clone())
            .map(String::into_bytes)
            .ok_or_else(|| {
                RemoteError::InvalidResponse(format!(
                    "document has no string field \"{}\"",
                    FIRESTORE_CONTENT_FIELD
                ))
            })
    }
}
