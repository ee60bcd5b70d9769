//! Product image storage.
//!
//! Images go to the remote blob store when a token is configured. Without one,
//! the image is kept inline as a `data:` URL so the catalogue still works in
//! development.

use std::{sync::Arc, time::Duration};

use base64::{Engine, engine::general_purpose::STANDARD};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use crate::config::BlobConfig;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Blob store error: {status} - {message}")]
    Api { status: u16, message: String },
}

#[derive(Deserialize)]
struct PutResponse {
    url: String,
}

#[derive(Clone)]
pub struct BlobStore {
    remote: Option<Arc<RemoteBlobs>>,
}

struct RemoteBlobs {
    client: reqwest::Client,
    api_url: String,
    token: SecretString,
}

impl BlobStore {
    pub fn new(config: Option<&BlobConfig>) -> Result<Self, BlobError> {
        let remote = match config {
            Some(cfg) => {
                let client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(30))
                    .build()?;
                Some(Arc::new(RemoteBlobs {
                    client,
                    api_url: cfg.api_url.clone(),
                    token: cfg.token.clone(),
                }))
            }
            None => None,
        };
        Ok(Self { remote })
    }

    /// Store that never leaves the process; used when no token is configured.
    pub fn inline() -> Self {
        Self { remote: None }
    }

    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Store `bytes` under `pathname` and return the public URL.
    pub async fn put(
        &self,
        pathname: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BlobError> {
        let Some(remote) = &self.remote else {
            return Ok(data_url(content_type, &bytes));
        };

        let url = format!("{}/{}", remote.api_url, pathname.trim_start_matches('/'));
        let response = remote
            .client
            .put(&url)
            .bearer_auth(remote.token.expose_secret())
            .header("x-content-type", content_type)
            .header("x-add-random-suffix", "1")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BlobError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: PutResponse = response.json().await?;
        tracing::debug!(url = %body.url, "image uploaded");
        Ok(body.url)
    }

    /// Remove a previously stored blob. Inline images need no cleanup.
    pub async fn delete(&self, url: &str) -> Result<(), BlobError> {
        let Some(remote) = &self.remote else {
            return Ok(());
        };
        if url.starts_with("data:") {
            return Ok(());
        }

        let response = remote
            .client
            .post(format!("{}/delete", remote.api_url))
            .bearer_auth(remote.token.expose_secret())
            .json(&serde_json::json!({ "urls": [url] }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BlobError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

fn data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inline_store_returns_data_url() {
        let store = BlobStore::inline();
        assert!(!store.is_remote());

        let url = store
            .put("products/p1/photo.png", "image/png", b"png-bytes".to_vec())
            .await
            .expect("inline put");
        assert_eq!(url, "data:image/png;base64,cG5nLWJ5dGVz");

        store.delete(&url).await.expect("inline delete");
    }
}
