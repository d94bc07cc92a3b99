use async_trait::async_trait;
use log::{debug, error, warn};
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::Range;
use std::time::Duration;

use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;
use crate::hashing::fingerprint_text;
use crate::providers::Translator;

/// Public endpoint of the general translation API
pub const DEFAULT_ENDPOINT: &str = "https://fanyi-api.baidu.com/api/trans/vip/translate";

/// Salts are drawn from this range for every request
pub const SALT_RANGE: Range<u32> = 32768..65536;

/// Application credentials for the translation API
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Application id issued by the service
    pub app_id: String,
    /// Shared secret used to sign requests
    pub secret: String,
}

impl Credentials {
    /// Create credentials from an app id and secret
    pub fn new(app_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            secret: secret.into(),
        }
    }

    /// Whether either part is missing
    pub fn is_empty(&self) -> bool {
        self.app_id.is_empty() || self.secret.is_empty()
    }
}

/// Signed form body sent to the API
#[derive(Debug, Clone, Serialize)]
pub struct TranslationRequest {
    /// Signature: md5(appid + q + salt + secret)
    pub sign: String,
    /// Per-request random salt
    pub salt: u32,
    /// Application id
    pub appid: String,
    /// Source language, always auto-detected
    pub from: String,
    /// Target language
    pub to: String,
    /// Text to translate
    pub q: String,
}

impl TranslationRequest {
    /// Build a request signed with `credentials` and the given `salt`
    pub fn signed(credentials: &Credentials, text: &str, target_language: &str, salt: u32) -> Self {
        Self {
            sign: sign(credentials, text, salt),
            salt,
            appid: credentials.app_id.clone(),
            from: "auto".to_string(),
            to: target_language.to_string(),
            q: text.to_string(),
        }
    }
}

/// Compute the request signature
pub fn sign(credentials: &Credentials, text: &str, salt: u32) -> String {
    fingerprint_text(&format!(
        "{}{}{}{}",
        credentials.app_id, text, salt, credentials.secret
    ))
}

/// One translated segment
#[derive(Debug, Clone, Deserialize)]
pub struct TranslatedSegment {
    /// Source text of the segment
    #[serde(default)]
    pub src: Option<String>,
    /// Translated text of the segment
    #[serde(default)]
    pub dst: Option<String>,
}

/// The `trans_result` field comes in more than one shape
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TransResult {
    /// A list of segments, one per source line
    Segments(Vec<TranslatedSegment>),
    /// A single object instead of a list
    Single(Map<String, Value>),
    /// Anything else the service may send
    Other(Value),
}

/// Response body of the API
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationResponse {
    /// Detected source language
    #[serde(default)]
    pub from: Option<String>,
    /// Target language
    #[serde(default)]
    pub to: Option<String>,
    /// Translation result
    #[serde(default)]
    pub trans_result: Option<TransResult>,
    /// Error code, present on failure (string or number)
    #[serde(default)]
    pub error_code: Option<Value>,
    /// Error message, present on failure
    #[serde(default)]
    pub error_msg: Option<String>,
}

impl TranslationResponse {
    /// Normalize both result shapes into one string
    ///
    /// Segments are concatenated in order without separator. Missing `dst`
    /// values or an empty result yield `None`.
    pub fn text(&self) -> Option<String> {
        let text = match self.trans_result.as_ref()? {
            TransResult::Segments(segments) => segments
                .iter()
                .map(|segment| segment.dst.as_deref())
                .collect::<Option<String>>()?,
            TransResult::Single(object) => object
                .get("dst")
                .or_else(|| object.get("0").and_then(|first| first.get("dst")))
                .and_then(Value::as_str)?
                .to_string(),
            TransResult::Other(_) => return None,
        };

        if text.is_empty() { None } else { Some(text) }
    }
}

/// Client for the Baidu general translation API
#[derive(Debug)]
pub struct BaiduTranslator {
    /// HTTP client for API requests
    client: Client,
    /// API endpoint URL
    endpoint: String,
    /// Application credentials
    credentials: Credentials,
}

impl BaiduTranslator {
    /// Create a new client
    pub fn new(credentials: Credentials, endpoint: impl Into<String>, timeout: Duration) -> Self {
        if credentials.is_empty() {
            warn!("Translation credentials are empty; requests will fail authentication");
        }

        let endpoint = endpoint.into();
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            endpoint: if endpoint.is_empty() {
                DEFAULT_ENDPOINT.to_string()
            } else {
                endpoint
            },
            credentials,
        }
    }

    /// Create a client from the translation section of the configuration
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self::new(
            Credentials::new(config.app_id.clone(), config.secret.clone()),
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Endpoint requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a prepared request and decode the response body
    pub async fn send(&self, request: &TranslationRequest) -> Result<TranslationResponse, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Translation API error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<TranslationResponse>(&body)
            .map_err(|e| ProviderError::ParseError(format!("{}: {}", e, body)))
    }
}

#[async_trait]
impl Translator for BaiduTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<Option<String>, ProviderError> {
        let salt = rand::rng().random_range(SALT_RANGE);
        let request = TranslationRequest::signed(&self.credentials, text, target_language, salt);
        debug!(
            "Requesting translation of {} chars into '{}'",
            text.chars().count(),
            target_language
        );

        let response = self.send(&request).await?;
        if let Some(code) = &response.error_code {
            warn!(
                "Translation API returned error {}: {}",
                code,
                response.error_msg.as_deref().unwrap_or("no message")
            );
        }

        Ok(response.text())
    }

    fn name(&self) -> &str {
        "baidu"
    }
}
