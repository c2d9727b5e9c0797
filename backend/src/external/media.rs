//! Media service client
//!
//! Item images are stored elsewhere; this service only holds references to
//! them. When an item is deleted or its image replaced, the old reference is
//! released so the media service can drop the asset.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::Sha256;

use crate::config::MediaConfig;
use crate::error::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the request signature
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Client for the external media service
#[derive(Clone)]
pub struct MediaClient {
    base_url: Option<String>,
    signing_secret: String,
    http_client: Client,
}

impl MediaClient {
    /// Create a media client. Without a base URL, releases are only logged.
    pub fn new(config: &MediaConfig) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config
                .base_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            signing_secret: config.signing_secret.clone(),
            http_client,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// base64(HMAC-SHA256(secret, reference))
    pub fn sign(&self, reference: &str) -> AppResult<String> {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .map_err(|e| AppError::Internal(format!("Invalid signing key: {}", e)))?;
        mac.update(reference.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }

    /// Ask the media service to drop an asset
    pub async fn release(&self, reference: &str) -> AppResult<()> {
        let Some(base_url) = &self.base_url else {
            tracing::info!(reference, "No media endpoint configured; release skipped");
            return Ok(());
        };

        let url = format!("{}/assets", base_url);
        let signature = self.sign(reference)?;

        let response = self
            .http_client
            .delete(&url)
            .query(&[("reference", reference)])
            .header(SIGNATURE_HEADER, signature)
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("Request failed: {}", e)))?;

        // already gone is as good as released
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(reference, "Media asset already released");
            return Ok(());
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::StorageError(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        tracing::info!(reference, "Media asset released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: Option<&str>) -> MediaConfig {
        MediaConfig {
            base_url: base_url.map(str::to_string),
            signing_secret: "key".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn signature_matches_known_vector() {
        let client = MediaClient::new(&config(None)).unwrap();
        // HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog")
        assert_eq!(
            client
                .sign("The quick brown fox jumps over the lazy dog")
                .unwrap(),
            "97yD9DBThCSxMpjmqm+xQ+9NWaFJRhdZl0edvC0aPNg="
        );
    }

    #[test]
    fn blank_base_url_counts_as_unconfigured() {
        assert!(!MediaClient::new(&config(Some(""))).unwrap().is_configured());
        assert!(MediaClient::new(&config(Some("http://media.local/")))
            .unwrap()
            .is_configured());
    }

    #[test]
    fn release_without_endpoint_is_a_no_op() {
        let client = MediaClient::new(&config(None)).unwrap();
        let result = tokio_test::block_on(client.release("uploads/mug.png"));
        assert!(result.is_ok());
    }
}
