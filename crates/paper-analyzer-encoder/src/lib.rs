#![warn(missing_docs)]
//! # paper-analyzer-encoder
//!
//! ## Purpose
//! Converts selected files into base64 [`ImagePart`] values for the request.
//!
//! ## Responsibilities
//! - Encode arbitrary bytes deterministically ([`encode_bytes`]).
//! - Read a file's source and encode it ([`encode_file`]).
//! - Encode a whole submission concurrently, failing as a unit
//!   ([`encode_all`]).
//!
//! ## Data flow
//! [`RawFile`] snapshot -> [`encode_all`] -> `Vec<ImagePart>` -> analysis
//! client.
//!
//! ## Error model
//! A file whose bytes cannot be read yields [`ReadError`]; the caller treats
//! it as the whole batch failing.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use futures::future::try_join_all;
use paper_analyzer_core::{FileSource, ImagePart, RawFile};
use thiserror::Error;
use tracing::debug;

/// Encodes bytes as standard padded base64.
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes standard padded base64.
///
/// # Errors
/// Returns [`EncoderError::Decode`] for malformed input.
pub fn decode(text: &str) -> Result<Vec<u8>, EncoderError> {
    STANDARD.decode(text).map_err(EncoderError::Decode)
}

/// Reads and encodes one file.
///
/// # Errors
/// Returns [`ReadError`] when a disk-backed file can no longer be read.
pub async fn encode_file(file: &RawFile) -> Result<ImagePart, ReadError> {
    let data = match &file.source {
        FileSource::Memory(bytes) => encode_bytes(bytes),
        FileSource::Disk(path) => {
            let bytes = tokio::fs::read(path).await.map_err(|error| ReadError {
                name: file.name.clone(),
                reason: error.to_string(),
            })?;
            encode_bytes(&bytes)
        }
    };

    Ok(ImagePart::new(file.mime_type.clone(), data))
}

/// Encodes every file concurrently, preserving input order.
///
/// All encodings complete before this returns. The first unreadable file
/// fails the whole batch.
///
/// # Errors
/// Returns the [`ReadError`] of the first file that could not be read.
pub async fn encode_all(files: &[RawFile]) -> Result<Vec<ImagePart>, ReadError> {
    let parts = try_join_all(files.iter().map(encode_file)).await?;
    debug!(
        files = parts.len(),
        encoded_bytes = parts.iter().map(|part| part.data.len()).sum::<usize>(),
        "encoded submission files"
    );
    Ok(parts)
}

/// A selected file could not be read for encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not read {name}: {reason}")]
pub struct ReadError {
    /// Display name of the unreadable file.
    pub name: String,
    /// Underlying failure description.
    pub reason: String,
}

/// Codec errors.
#[derive(Debug, Error)]
pub enum EncoderError {
    /// Input is not valid base64.
    #[error("invalid base64: {0}")]
    Decode(#[from] base64::DecodeError),
}
