#![warn(missing_docs)]
//! # paper-analyzer-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `paper-analyzer` workspace.
//!
//! ## Responsibilities
//! - Represent user-selected files and where their bytes live.
//! - Represent encoded image parts and the ordered multi-part analysis request.
//!
//! ## Data flow
//! The selection surface produces [`RawFile`] values. Before submission each
//! file is encoded into an [`ImagePart`], and the instruction text plus all
//! image parts are frozen into one [`AnalysisRequest`].
//!
//! ## Ownership and lifetimes
//! In-memory payloads are held as `Arc<[u8]>` so the store, preview backend and
//! an in-flight submission can share them without copying. Disk-backed files
//! keep only their path; bytes are read at submission time.
//!
//! ## Error model
//! Construction failures (blank names, missing instruction, empty image set,
//! unreadable metadata) return [`CoreError`].
//!
//! ## Example
//! ```rust
//! use paper_analyzer_core::{AnalysisRequest, ImagePart, Part, RawFile};
//!
//! let file = RawFile::from_bytes("page-1.png", "image/png", vec![1, 2, 3]).unwrap();
//! assert!(file.is_image());
//!
//! let request = AnalysisRequest::new(
//!     "Compare these papers.",
//!     vec![ImagePart::new("image/png", "AQID")],
//! )
//! .unwrap();
//! assert!(matches!(request.parts()[0], Part::Text(_)));
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// MIME type used when a file's type cannot be determined.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Location of a selected file's bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Bytes already held in memory.
    Memory(Arc<[u8]>),
    /// Bytes read from this path when the file is encoded.
    Disk(PathBuf),
}

/// One file chosen by the user, before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    /// Display name (file name without directories).
    pub name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Size in bytes at selection time.
    pub size: u64,
    /// Backing bytes or path.
    pub source: FileSource,
}

impl RawFile {
    /// Creates an in-memory file.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyFileName`] when `name` is blank.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::EmptyFileName);
        }

        let bytes = bytes.into();
        Ok(Self {
            name,
            mime_type: normalize_mime(mime_type.into()),
            size: bytes.len() as u64,
            source: FileSource::Memory(bytes),
        })
    }

    /// Creates a disk-backed file, guessing the MIME type from the extension.
    ///
    /// Only metadata is read here; content is read when the file is encoded.
    ///
    /// # Errors
    /// Returns [`CoreError::Io`] when metadata cannot be read and
    /// [`CoreError::NotAFile`] for directories and other non-regular entries.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(CoreError::NotAFile(path.to_path_buf()));
        }

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.trim().is_empty())
            .ok_or(CoreError::EmptyFileName)?;
        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(FALLBACK_MIME_TYPE)
            .to_string();

        Ok(Self {
            name,
            mime_type,
            size: metadata.len(),
            source: FileSource::Disk(path.to_path_buf()),
        })
    }

    /// Returns `true` when the declared MIME type is `image/*`.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

fn normalize_mime(mime_type: String) -> String {
    let trimmed = mime_type.trim();
    if trimmed.is_empty() {
        FALLBACK_MIME_TYPE.to_string()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

/// Transport-safe encoding of one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePart {
    /// MIME type copied from the source file.
    pub mime_type: String,
    /// Base64 text of the file content.
    pub data: String,
}

impl ImagePart {
    /// Creates an image part from already encoded data.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// One unit of a multi-modal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Instruction text.
    Text(String),
    /// One encoded image.
    Image(ImagePart),
}

/// Ordered request sent to the model: instruction first, then images.
///
/// There is no mutating API; a request is frozen once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    parts: Vec<Part>,
}

impl AnalysisRequest {
    /// Builds a request from the instruction and the images in supplied order.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyInstruction`] for blank instruction text and
    /// [`CoreError::EmptyImageSet`] when no images are supplied.
    pub fn new(instruction: impl Into<String>, images: Vec<ImagePart>) -> Result<Self, CoreError> {
        let instruction = instruction.into();
        if instruction.trim().is_empty() {
            return Err(CoreError::EmptyInstruction);
        }
        if images.is_empty() {
            return Err(CoreError::EmptyImageSet);
        }

        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(Part::Text(instruction));
        parts.extend(images.into_iter().map(Part::Image));
        Ok(Self { parts })
    }

    /// Returns all parts in wire order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Returns the image parts in wire order.
    pub fn images(&self) -> impl Iterator<Item = &ImagePart> {
        self.parts.iter().filter_map(|part| match part {
            Part::Image(image) => Some(image),
            Part::Text(_) => None,
        })
    }

    /// Returns the number of image parts.
    pub fn image_count(&self) -> usize {
        self.parts.len() - 1
    }
}

/// Error type for core model construction.
#[derive(Debug, Error)]
pub enum CoreError {
    /// File name is blank.
    #[error("file name is empty")]
    EmptyFileName,
    /// Path does not point at a regular file.
    #[error("not a regular file: {}", .0.display())]
    NotAFile(PathBuf),
    /// File metadata could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Instruction text is blank.
    #[error("instruction text is empty")]
    EmptyInstruction,
    /// A request needs at least one image.
    #[error("analysis request has no images")]
    EmptyImageSet,
}
