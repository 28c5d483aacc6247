//! HTTP client for a remote text-recognition service.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::ChallengeResolver;

/// Recognition service configuration.
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    /// Service endpoint; empty disables the resolver.
    pub endpoint: String,
    /// API key sent with every request.
    pub api_key: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Service response: `code == 0` carries recognized text.
#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    code: i64,
    #[serde(default)]
    text: String,
}

/// Resolver backed by a remote recognition endpoint.
///
/// The image travels base64-encoded in a form field; the service answers
/// `{"code": 0, "text": "..."}` on success.
pub struct RemoteResolver {
    config: RecognizerConfig,
    client: Client,
}

impl RemoteResolver {
    pub fn new(config: RecognizerConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    pub fn is_enabled(&self) -> bool {
        !self.config.endpoint.is_empty()
    }

    async fn recognize(&self, image: &[u8]) -> Result<RecognizeResponse, reqwest::Error> {
        let form = [
            ("key", self.config.api_key.clone()),
            ("method", "base64".to_string()),
            ("body", BASE64.encode(image)),
        ];
        let response = self
            .client
            .post(&self.config.endpoint)
            .form(&form)
            .send()
            .await?;
        response.json().await
    }
}

#[async_trait]
impl ChallengeResolver for RemoteResolver {
    async fn resolve(&self, image: &[u8]) -> Option<String> {
        if !self.is_enabled() {
            debug!("challenge resolver disabled, skipping recognition");
            return None;
        }

        match self.recognize(image).await {
            Ok(response) if response.code == 0 && !response.text.trim().is_empty() => {
                debug!(text = %response.text, "challenge recognized");
                Some(response.text)
            }
            Ok(response) => {
                warn!(code = response.code, "recognition service rejected the image");
                None
            }
            Err(e) => {
                warn!(error = %e, "recognition request failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_without_endpoint() {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
        let resolver = RemoteResolver::new(RecognizerConfig::default());
        assert!(!resolver.is_enabled());
    }

    #[tokio::test]
    async fn test_disabled_resolver_answers_none() {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
        let resolver = RemoteResolver::new(RecognizerConfig::default());
        assert_eq!(resolver.resolve(b"png bytes").await, None);
    }

    #[test]
    fn test_response_parsing() {
        let ok: RecognizeResponse = serde_json::from_str(r#"{"code":0,"text":"abcd"}"#).unwrap();
        assert_eq!(ok.code, 0);
        assert_eq!(ok.text, "abcd");

        let rejected: RecognizeResponse = serde_json::from_str(r#"{"code":-2}"#).unwrap();
        assert_eq!(rejected.code, -2);
        assert!(rejected.text.is_empty());
    }
}
