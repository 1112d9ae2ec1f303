#![warn(missing_docs)]
//! # paper-analyzer-files
//!
//! ## Purpose
//! Holds the user's selected files and the preview handles derived from them.
//!
//! ## Responsibilities
//! - Append selections in insertion order, applying the [`SelectionPolicy`].
//! - Allocate one preview handle per accepted file through a
//!   [`PreviewBackend`].
//! - Release a preview handle exactly once: on removal, or when the store is
//!   dropped.
//!
//! ## Data flow
//! Selection surface -> [`FileStore::add`] -> view controller re-reads
//! [`FileStore::entries`] to project the upload list. On submit the controller
//! takes a [`FileStore::snapshot`] for encoding.
//!
//! ## Ownership and lifetimes
//! Each file and its preview live in one [`UploadedFile`] pair, so the file
//! list and the preview list cannot drift apart. [`PreviewHandle`] is not
//! `Clone`; releasing consumes it.
//!
//! ## Error model
//! Out-of-range removals return [`FilesError`] and leave the store untouched.
//! Policy rejections are reported in [`SelectionReport`], not as errors, so
//! one bad file does not discard the rest of a batch.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use paper_analyzer_core::{FileSource, RawFile};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, warn};

/// Default per-file size limit (10 MiB), matching the upload guidance shown
/// to users.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// URL scheme used for preview handles.
pub const PREVIEW_SCHEME: &str = "preview";

/// Acceptance rules applied when files are added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    /// Largest accepted file size in bytes.
    pub max_file_bytes: u64,
    /// Accept only `image/*` MIME types.
    pub images_only: bool,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            images_only: true,
        }
    }
}

impl SelectionPolicy {
    /// Checks one file against the policy.
    ///
    /// # Errors
    /// Returns the first [`RejectReason`] that applies.
    pub fn check(&self, file: &RawFile) -> Result<(), RejectReason> {
        if self.images_only && !file.is_image() {
            return Err(RejectReason::NotAnImage {
                mime_type: file.mime_type.clone(),
            });
        }
        if file.size > self.max_file_bytes {
            return Err(RejectReason::TooLarge {
                size: file.size,
                limit: self.max_file_bytes,
            });
        }
        Ok(())
    }
}

/// Why a file was not added to the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// MIME type is not `image/*`.
    #[error("unsupported type {mime_type}, only images are accepted")]
    NotAnImage {
        /// Declared MIME type.
        mime_type: String,
    },
    /// File exceeds the configured size limit.
    #[error("file is {size} bytes, limit is {limit} bytes")]
    TooLarge {
        /// File size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },
}

/// One rejected file from an [`FileStore::add`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    /// File display name.
    pub name: String,
    /// Rejection reason.
    pub reason: RejectReason,
}

/// Outcome of one [`FileStore::add`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionReport {
    /// Number of files appended.
    pub accepted: usize,
    /// Files that were not appended.
    pub rejected: Vec<RejectedFile>,
}

/// Owned reference to a preview resource.
///
/// Not `Clone`: the only way to give it up is [`PreviewBackend::release`].
#[derive(Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    id: u64,
    url: String,
}

impl PreviewHandle {
    /// Creates a handle. Intended for [`PreviewBackend`] implementations.
    pub fn new(id: u64, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
        }
    }

    /// Backend-assigned identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Display URL (`preview://<token>`).
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// What a live preview handle points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewResource {
    /// File display name.
    pub name: String,
    /// File MIME type.
    pub mime_type: String,
    /// File size in bytes.
    pub size: u64,
    /// Shared reference to the file bytes or path; never re-read here.
    pub source: FileSource,
}

impl From<&RawFile> for PreviewResource {
    fn from(file: &RawFile) -> Self {
        Self {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size: file.size,
            source: file.source.clone(),
        }
    }
}

/// Allocator for preview handles.
pub trait PreviewBackend: Send + Sync {
    /// Allocates a new handle for `file`.
    fn create(&self, file: &RawFile) -> PreviewHandle;

    /// Resolves a live handle. Released handles resolve to `None`.
    fn resolve(&self, handle: &PreviewHandle) -> Option<PreviewResource>;

    /// Releases the resource behind `handle`.
    fn release(&self, handle: PreviewHandle);
}

/// Process-local preview backend with unguessable handle URLs.
pub struct InMemoryPreviewBackend {
    state: Mutex<BackendState>,
}

struct BackendState {
    next_id: u64,
    rng: StdRng,
    live: HashMap<u64, PreviewResource>,
    released: u64,
}

impl InMemoryPreviewBackend {
    /// Creates a backend seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Creates a backend with deterministic URL tokens.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: Mutex::new(BackendState {
                next_id: 1,
                rng,
                live: HashMap::new(),
                released: 0,
            }),
        }
    }

    /// Number of handles created and not yet released.
    pub fn live_count(&self) -> usize {
        self.lock().live.len()
    }

    /// Number of handles released so far.
    pub fn released_count(&self) -> u64 {
        self.lock().released
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        // State stays consistent across a panic: every mutation is a single
        // map insert/remove plus a counter bump.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryPreviewBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryPreviewBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("InMemoryPreviewBackend")
            .field("live", &state.live.len())
            .field("released", &state.released)
            .finish()
    }
}

impl PreviewBackend for InMemoryPreviewBackend {
    fn create(&self, file: &RawFile) -> PreviewHandle {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;

        let mut token = [0_u8; 16];
        state.rng.fill(&mut token);
        state.live.insert(id, PreviewResource::from(file));

        PreviewHandle::new(id, format!("{PREVIEW_SCHEME}://{}", hex::encode(token)))
    }

    fn resolve(&self, handle: &PreviewHandle) -> Option<PreviewResource> {
        self.lock().live.get(&handle.id).cloned()
    }

    fn release(&self, handle: PreviewHandle) {
        let mut state = self.lock();
        if state.live.remove(&handle.id).is_some() {
            state.released += 1;
        } else {
            warn!(preview_id = handle.id, "release requested for unknown preview handle");
        }
    }
}

/// A selected file paired with its preview handle.
#[derive(Debug)]
pub struct UploadedFile {
    file: RawFile,
    preview: PreviewHandle,
}

impl UploadedFile {
    /// The selected file.
    pub fn file(&self) -> &RawFile {
        &self.file
    }

    /// The file's preview handle.
    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }
}

/// Ordered selection of files with their preview handles.
pub struct FileStore {
    entries: Vec<UploadedFile>,
    backend: Arc<dyn PreviewBackend>,
    policy: SelectionPolicy,
}

impl FileStore {
    /// Creates an empty store.
    pub fn new(backend: Arc<dyn PreviewBackend>, policy: SelectionPolicy) -> Self {
        Self {
            entries: Vec::new(),
            backend,
            policy,
        }
    }

    /// Appends files that pass the policy, allocating one preview each.
    ///
    /// Existing entries are kept; duplicates by name are distinct entries.
    pub fn add(&mut self, files: Vec<RawFile>) -> SelectionReport {
        let mut report = SelectionReport::default();

        for file in files {
            if let Err(reason) = self.policy.check(&file) {
                debug!(file = %file.name, %reason, "file rejected by selection policy");
                report.rejected.push(RejectedFile {
                    name: file.name,
                    reason,
                });
                continue;
            }

            let preview = self.backend.create(&file);
            self.entries.push(UploadedFile { file, preview });
            report.accepted += 1;
        }

        report
    }

    /// Removes the entry at `index` and releases its preview handle before
    /// returning.
    ///
    /// # Errors
    /// Returns [`FilesError::IndexOutOfRange`] when `index >= len()`; the
    /// store is left unchanged.
    pub fn remove(&mut self, index: usize) -> Result<RawFile, FilesError> {
        if index >= self.entries.len() {
            return Err(FilesError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }

        let UploadedFile { file, preview } = self.entries.remove(index);
        self.backend.release(preview);
        Ok(file)
    }

    /// Removes every entry, releasing all preview handles. Returns the number
    /// of entries removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        for entry in self.entries.drain(..) {
            self.backend.release(entry.preview);
        }
        removed
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[UploadedFile] {
        &self.entries
    }

    /// Selected files in insertion order.
    pub fn files(&self) -> impl Iterator<Item = &RawFile> {
        self.entries.iter().map(UploadedFile::file)
    }

    /// Preview handles, index-aligned with [`FileStore::files`].
    pub fn previews(&self) -> impl Iterator<Item = &PreviewHandle> {
        self.entries.iter().map(UploadedFile::preview)
    }

    /// Preview handle at `index`.
    pub fn preview(&self, index: usize) -> Option<&PreviewHandle> {
        self.entries.get(index).map(UploadedFile::preview)
    }

    /// Resolves the preview resource at `index` through the backend.
    pub fn resolve_preview(&self, index: usize) -> Option<PreviewResource> {
        self.preview(index)
            .and_then(|handle| self.backend.resolve(handle))
    }

    /// Owned copy of the selected files for one submission.
    pub fn snapshot(&self) -> Vec<RawFile> {
        self.files().cloned().collect()
    }

    /// Number of selected files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Active selection policy.
    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }
}

impl fmt::Debug for FileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStore")
            .field("entries", &self.entries)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        let released = self.clear();
        if released > 0 {
            debug!(released, "released remaining previews at session teardown");
        }
    }
}

/// File store precondition errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilesError {
    /// Removal index does not name a selected file.
    #[error("no file at index {index} (selection has {len} files)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Current selection length.
        len: usize,
    },
}

#[cfg(test)]
mod tests {
    //! Unit tests for selection policy and handle minting.

    use super::*;

    #[test]
    fn policy_rejects_non_images_before_size() {
        let policy = SelectionPolicy {
            max_file_bytes: 1,
            images_only: true,
        };
        let file = RawFile::from_bytes("notes.txt", "text/plain", vec![0_u8; 4])
            .expect("file should build");
        assert!(matches!(
            policy.check(&file),
            Err(RejectReason::NotAnImage { .. })
        ));
    }

    #[test]
    fn handle_urls_are_distinct() {
        let backend = InMemoryPreviewBackend::with_seed(7);
        let file =
            RawFile::from_bytes("a.png", "image/png", vec![1_u8]).expect("file should build");
        let first = backend.create(&file);
        let second = backend.create(&file);

        assert_ne!(first.url(), second.url());
        assert!(first.url().starts_with("preview://"));
        backend.release(first);
        backend.release(second);
        assert_eq!(backend.live_count(), 0);
    }
}
