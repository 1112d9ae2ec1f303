#![warn(missing_docs)]
//! # paper-analyzer-client
//!
//! ## Purpose
//! Submits encoded paper images to the remote generative model and returns
//! the analysis text.
//!
//! ## Responsibilities
//! - Hold the fixed model id and instruction prompt.
//! - Build exactly one [`AnalysisRequest`] per call and send it through an
//!   injectable [`GenerativeTransport`].
//! - Log the original failure cause, then hand callers a generic
//!   [`AnalysisError`].
//! - Validate startup configuration (credential, API base URL).
//!
//! ## Data flow
//! View controller -> [`AnalysisService::analyze`] -> [`AnalysisRequest`] ->
//! [`GenerativeTransport::generate`] -> markup text.
//!
//! ## Ownership and lifetimes
//! The credential is moved into the transport at construction and never read
//! from the environment mid-call.
//!
//! ## Error model
//! Missing credentials and bad endpoints are [`ConfigurationError`] and stop
//! startup. Everything that goes wrong during a call becomes
//! [`AnalysisError`]. There is no retry and no timeout: one call, one request.
//!
//! ## Security and privacy notes
//! [`ApiCredential`] never prints its value. Failure causes pass through
//! [`redact_sensitive`] before they are logged.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use paper_analyzer_analysis_contract::{
    ContractError, GenerateContentRequest, parse_generate_response,
};
use paper_analyzer_core::{AnalysisRequest, CoreError, ImagePart, Part};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{error, info};
use url::Url;

/// Model used for every analysis.
pub const DEFAULT_MODEL_ID: &str = "gemini-2.5-pro";

/// Default API base URL.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "API_KEY";

/// Header carrying the API credential.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Instruction sent ahead of the paper images.
pub const ANALYSIS_PROMPT: &str = include_str!("../prompts/analysis.md");

/// Secret API credential.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential(String);

impl ApiCredential {
    /// Builds a credential from an optional raw value.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::MissingCredential`] when the value is
    /// absent or blank.
    pub fn from_value(value: Option<String>) -> Result<Self, ConfigurationError> {
        match value {
            Some(value) if !value.trim().is_empty() => Ok(Self(value.trim().to_string())),
            _ => Err(ConfigurationError::MissingCredential {
                variable: API_KEY_ENV,
            }),
        }
    }

    /// Returns the secret for use in a request header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(<redacted>)")
    }
}

/// Validates the API base URL.
///
/// `https` is required; plain `http` is accepted only for loopback hosts.
///
/// # Errors
/// Returns [`ConfigurationError::InvalidApiBase`] for unparsable URLs or
/// disallowed schemes.
pub fn validate_api_base(raw: &str) -> Result<Url, ConfigurationError> {
    let parsed = Url::parse(raw)
        .map_err(|error| ConfigurationError::InvalidApiBase(format!("invalid url: {error}")))?;

    match parsed.scheme() {
        "https" => Ok(parsed),
        "http" if is_loopback(&parsed) => Ok(parsed),
        "http" => Err(ConfigurationError::InvalidApiBase(
            "api base must use https".to_string(),
        )),
        other => Err(ConfigurationError::InvalidApiBase(format!(
            "unsupported scheme {other}"
        ))),
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain == "localhost",
        Some(url::Host::Ipv4(address)) => address.is_loopback(),
        Some(url::Host::Ipv6(address)) => address.is_loopback(),
        None => false,
    }
}

const REDACTED: &str = "<redacted>";

// `bearer` runs first so an `Authorization: Bearer <secret>` pair loses both
// words.
const SECRET_MARKERS: [&str; 5] = ["bearer", API_KEY_HEADER, "authorization", "key=", "token"];

/// Redacts credential values in log-safe output.
///
/// Only the value after a marker is replaced, up to the next delimiter; the
/// rest of the message is kept. Markers embedded in longer identifiers
/// (`input_token_count`) are left alone.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for marker in SECRET_MARKERS {
        redacted = redact_values_after(&redacted, marker);
    }
    redacted
}

fn redact_values_after(input: &str, marker: &str) -> String {
    let lower = input.to_ascii_lowercase();
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut copied = 0;
    let mut search = 0;

    while let Some(found) = lower[search..].find(marker) {
        let start = search + found;
        let mut cursor = start + marker.len();
        search = cursor;
        if start > 0 && is_word_byte(bytes[start - 1]) {
            continue;
        }

        if !marker.ends_with('=') {
            cursor = skip_while(bytes, cursor, |byte| matches!(byte, b'"' | b'\''));
            let spaced = skip_while(bytes, cursor, |byte| matches!(byte, b' ' | b'\t'));
            if marker == "bearer" {
                if spaced == cursor {
                    continue;
                }
                cursor = spaced;
            } else if matches!(bytes.get(spaced), Some(b':' | b'=')) {
                cursor = skip_while(bytes, spaced + 1, |byte| {
                    matches!(byte, b' ' | b'\t' | b'"' | b'\'')
                });
            } else {
                continue;
            }
        }

        let end = skip_while(bytes, cursor, |byte| !is_value_delimiter(byte));
        if end == cursor {
            continue;
        }
        out.push_str(&input[copied..cursor]);
        out.push_str(REDACTED);
        copied = end;
        search = end;
    }

    out.push_str(&input[copied..]);
    out
}

fn skip_while(bytes: &[u8], mut at: usize, predicate: impl Fn(u8) -> bool) -> usize {
    while at < bytes.len() && predicate(bytes[at]) {
        at += 1;
    }
    at
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

fn is_value_delimiter(byte: u8) -> bool {
    byte.is_ascii_whitespace()
        || matches!(byte, b'&' | b'"' | b'\'' | b',' | b';' | b')' | b']' | b'}')
}

/// Stable SHA-256 fingerprint of a request, used to correlate log events.
pub fn request_fingerprint(request: &AnalysisRequest) -> String {
    let mut hasher = Sha256::new();
    for part in request.parts() {
        match part {
            Part::Text(text) => {
                hasher.update(b"text\0");
                hasher.update(text.as_bytes());
            }
            Part::Image(image) => {
                hasher.update(b"image\0");
                hasher.update(image.mime_type.as_bytes());
                hasher.update(b"\0");
                hasher.update(image.data.as_bytes());
            }
        }
        hasher.update(b"\0");
    }
    hex::encode(hasher.finalize())
}

/// Remote text-generation operation.
#[async_trait]
pub trait GenerativeTransport: Send + Sync {
    /// Sends `request` to `model_id` and returns the answer text.
    async fn generate(
        &self,
        model_id: &str,
        request: &AnalysisRequest,
    ) -> Result<String, TransportError>;
}

/// HTTP transport for the `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    api_base: Url,
    credential: ApiCredential,
}

impl ReqwestTransport {
    /// Creates a transport. No request timeout is configured.
    ///
    /// # Errors
    /// Returns [`TransportError::Http`] when the HTTP client cannot be built.
    pub fn new(api_base: Url, credential: ApiCredential) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|error| TransportError::Http(error.to_string()))?;
        Ok(Self {
            client,
            api_base,
            credential,
        })
    }

    fn endpoint(&self, model_id: &str) -> Result<Url, TransportError> {
        ensure_slash(&self.api_base)
            .join(&format!("v1beta/models/{model_id}:generateContent"))
            .map_err(|error| TransportError::Http(format!("invalid endpoint url: {error}")))
    }
}

/// Makes sure a url has a trailing slash so `join` appends instead of
/// replacing the last segment.
fn ensure_slash(url: &Url) -> Url {
    if url.path().ends_with('/') {
        url.clone()
    } else {
        let mut new_url = url.clone();
        let path = format!("{}/", url.path());
        new_url.set_path(&path);
        new_url
    }
}

#[async_trait]
impl GenerativeTransport for ReqwestTransport {
    async fn generate(
        &self,
        model_id: &str,
        request: &AnalysisRequest,
    ) -> Result<String, TransportError> {
        let endpoint = self.endpoint(model_id)?;
        let body = GenerateContentRequest::from(request);

        let response = self
            .client
            .post(endpoint)
            .header(API_KEY_HEADER, self.credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|error| TransportError::Http(error.to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|error| TransportError::Http(error.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: raw,
            });
        }

        parse_generate_response(&raw).map_err(TransportError::Contract)
    }
}

/// Analysis operation used by the view controller.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Analyzes the supplied images and returns markup text.
    ///
    /// Callers guarantee `parts` is non-empty.
    async fn analyze(&self, parts: Vec<ImagePart>) -> Result<String, AnalysisError>;
}

/// Client that pairs the fixed prompt and model with a transport.
#[derive(Clone)]
pub struct AnalysisClient {
    model_id: &'static str,
    transport: Arc<dyn GenerativeTransport>,
}

impl AnalysisClient {
    /// Creates a client for [`DEFAULT_MODEL_ID`].
    pub fn new(transport: Arc<dyn GenerativeTransport>) -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID,
            transport,
        }
    }

    /// Model used for every call.
    pub fn model_id(&self) -> &str {
        self.model_id
    }
}

impl fmt::Debug for AnalysisClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisClient")
            .field("model_id", &self.model_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AnalysisService for AnalysisClient {
    async fn analyze(&self, parts: Vec<ImagePart>) -> Result<String, AnalysisError> {
        let request = AnalysisRequest::new(ANALYSIS_PROMPT, parts).map_err(|cause| {
            error!(%cause, "analysis request could not be built");
            AnalysisError::Request(cause)
        })?;

        let fingerprint = request_fingerprint(&request);
        info!(
            model = self.model_id,
            images = request.image_count(),
            %fingerprint,
            "submitting analysis request"
        );

        match self.transport.generate(self.model_id, &request).await {
            Ok(text) => {
                info!(%fingerprint, chars = text.chars().count(), "analysis received");
                Ok(text)
            }
            Err(cause) => {
                error!(
                    %fingerprint,
                    cause = %redact_sensitive(&cause.to_string()),
                    "analysis request failed"
                );
                Err(AnalysisError::Transport(cause))
            }
        }
    }
}

/// Startup configuration errors. Fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Credential is missing or blank.
    #[error("{variable} environment variable is not set")]
    MissingCredential {
        /// Environment variable name.
        variable: &'static str,
    },
    /// API base URL is unusable.
    #[error("invalid api base: {0}")]
    InvalidApiBase(String),
}

/// Transport-level failures. Logged, never shown to users.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS, or body read failure.
    #[error("http failure: {0}")]
    Http(String),
    /// Remote returned a non-success status.
    #[error("remote returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
    /// Response violated the wire contract.
    #[error("unexpected response: {0}")]
    Contract(#[from] ContractError),
}

/// Failure of one analysis call. The display text is deliberately generic;
/// the cause is available through [`std::error::Error::source`].
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Request could not be assembled.
    #[error("failed to get analysis from the model API")]
    Request(#[source] CoreError),
    /// Remote call failed.
    #[error("failed to get analysis from the model API")]
    Transport(#[source] TransportError),
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration and redaction helpers.

    use super::*;

    #[test]
    fn credential_requires_non_blank_value() {
        assert_eq!(
            ApiCredential::from_value(None),
            Err(ConfigurationError::MissingCredential {
                variable: API_KEY_ENV
            })
        );
        assert!(ApiCredential::from_value(Some("   ".to_string())).is_err());

        let credential =
            ApiCredential::from_value(Some(" secret ".to_string())).expect("credential is set");
        assert_eq!(credential.expose(), "secret");
        assert_eq!(format!("{credential:?}"), "ApiCredential(<redacted>)");
    }

    #[test]
    fn api_base_policy() {
        validate_api_base(DEFAULT_API_BASE).expect("default base should pass");
        validate_api_base("http://127.0.0.1:8080").expect("loopback http should pass");
        assert!(validate_api_base("http://api.example.test").is_err());
        assert!(validate_api_base("ftp://api.example.test").is_err());
        assert!(validate_api_base("not a url").is_err());
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let transport = ReqwestTransport::new(
            Url::parse("https://proxy.example.test/gemini").unwrap(),
            ApiCredential::from_value(Some("k".to_string())).unwrap(),
        )
        .expect("transport should build");
        let endpoint = transport.endpoint(DEFAULT_MODEL_ID).unwrap();
        assert_eq!(
            endpoint.as_str(),
            "https://proxy.example.test/gemini/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn prompt_names_all_four_sections() {
        for section in [
            "Comprehensive Comparison of Papers",
            "Research Field Viability Analysis",
            "Strategic Path to a Q1 Publication",
            "Novel Model Proposal for Societal Impact",
        ] {
            assert!(ANALYSIS_PROMPT.contains(section), "missing {section}");
        }
    }
}
