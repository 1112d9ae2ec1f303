#![warn(missing_docs)]
//! # paper-analyzer-analysis-contract
//!
//! ## Purpose
//! Defines the JSON wire schema of the remote `generateContent` operation.
//!
//! ## Responsibilities
//! - Serialize an [`AnalysisRequest`] into the request body.
//! - Parse the response body and extract the model's answer text.
//! - Tolerate part kinds this client does not use, for forward compatibility.
//!
//! ## Data flow
//! [`AnalysisRequest`] -> [`GenerateContentRequest`] -> HTTP body.
//! HTTP body -> [`parse_generate_response`] -> markup text.
//!
//! ## Error model
//! Invalid JSON, a response without candidates, or a blocked prompt return
//! [`ContractError`]. The answer text itself is never validated.

use paper_analyzer_core::{AnalysisRequest, ImagePart, Part};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    /// Conversation turns; this client always sends exactly one.
    pub contents: Vec<Content>,
}

impl From<&AnalysisRequest> for GenerateContentRequest {
    fn from(request: &AnalysisRequest) -> Self {
        let parts = request
            .parts()
            .iter()
            .map(|part| match part {
                Part::Text(text) => WirePart::Text {
                    text: text.clone(),
                    thought: None,
                },
                Part::Image(image) => WirePart::InlineData {
                    inline_data: image.clone(),
                },
            })
            .collect();

        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
        }
    }
}

impl GenerateContentRequest {
    /// Serializes the body to compact JSON bytes.
    ///
    /// # Errors
    /// Returns [`ContractError::Codec`] when serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ContractError> {
        serde_json::to_vec(self).map_err(ContractError::Codec)
    }
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Author role (`user` or `model`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Ordered parts of the turn.
    #[serde(default)]
    pub parts: Vec<WirePart>,
}

/// One wire part.
///
/// Variant order matters for untagged decoding: unknown shapes land in
/// [`WirePart::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WirePart {
    /// Text part.
    Text {
        /// Text content.
        text: String,
        /// Set on reasoning parts, which are not part of the answer.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thought: Option<bool>,
    },
    /// Base64 inline media part.
    InlineData {
        /// Media payload.
        #[serde(rename = "inlineData")]
        inline_data: ImagePart,
    },
    /// Any other part kind, kept verbatim.
    Other(serde_json::Value),
}

/// Response body of `generateContent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidate answers; the first one is used.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Present when the prompt itself was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// One candidate answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Candidate content; absent when generation stopped early.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// Why generation stopped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Prompt-level safety feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Block reason, when the prompt was blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenates the non-reasoning text parts of the first candidate.
    ///
    /// Returns `None` when there is no candidate.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text = candidate
            .content
            .iter()
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| match part {
                WirePart::Text { text, thought } if *thought != Some(true) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        Some(text)
    }
}

/// Parses a raw response body into the answer text.
///
/// The text is returned exactly as the model produced it.
///
/// # Errors
/// Returns [`ContractError::Codec`] for invalid JSON,
/// [`ContractError::Blocked`] when the prompt was blocked, and
/// [`ContractError::NoCandidates`] when no answer was returned.
pub fn parse_generate_response(raw: &str) -> Result<String, ContractError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(raw).map_err(ContractError::Codec)?;

    if let Some(text) = parsed.text() {
        return Ok(text);
    }

    match parsed
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        Some(reason) => Err(ContractError::Blocked(reason)),
        None => Err(ContractError::NoCandidates),
    }
}

/// Wire contract errors.
#[derive(Debug, Error)]
pub enum ContractError {
    /// JSON encode/decode failure.
    #[error("generate-content codec failure: {0}")]
    Codec(#[from] serde_json::Error),
    /// Response carried no candidate.
    #[error("response contained no candidates")]
    NoCandidates,
    /// Prompt was blocked by the remote service.
    #[error("prompt blocked: {0}")]
    Blocked(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for wire mapping.

    use super::*;

    #[test]
    fn request_body_uses_camel_case_inline_data() {
        let request = AnalysisRequest::new("prompt", vec![ImagePart::new("image/png", "AAEC")])
            .expect("request should build");
        let body = GenerateContentRequest::from(&request);
        let json = serde_json::to_value(&body).expect("body should serialize");

        assert_eq!(json["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(json["contents"][0]["parts"][1]["inlineData"]["data"], "AAEC");
    }

    #[test]
    fn unknown_parts_do_not_break_parsing() {
        let raw = r##"{"candidates":[{"content":{"parts":[
            {"functionCall":{"name":"noop","args":{}}},
            {"text":"# Result"}
        ]}}]}"##;
        assert_eq!(parse_generate_response(raw).unwrap(), "# Result");
    }
}
