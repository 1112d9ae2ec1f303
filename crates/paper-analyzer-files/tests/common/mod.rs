//! Shared fixtures for file store tests.

use std::collections::HashMap;
use std::sync::Mutex;

use paper_analyzer_core::RawFile;
use paper_analyzer_files::{PreviewBackend, PreviewHandle, PreviewResource};

/// Creates a small in-memory PNG-typed file.
#[allow(dead_code)]
pub fn image(name: &str) -> RawFile {
    RawFile::from_bytes(name, "image/png", name.as_bytes().to_vec())
        .expect("fixture file should be valid")
}

/// Backend that records every release per handle id.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    inner: Mutex<Recorded>,
}

#[derive(Debug, Default)]
struct Recorded {
    next_id: u64,
    live: HashMap<u64, PreviewResource>,
    releases: HashMap<u64, u32>,
}

#[allow(dead_code)]
impl RecordingBackend {
    pub fn releases_of(&self, id: u64) -> u32 {
        let inner = self.inner.lock().expect("recording lock should work");
        inner.releases.get(&id).copied().unwrap_or(0)
    }

    pub fn created(&self) -> u64 {
        self.inner.lock().expect("recording lock should work").next_id
    }

    pub fn live(&self) -> usize {
        self.inner.lock().expect("recording lock should work").live.len()
    }
}

impl PreviewBackend for RecordingBackend {
    fn create(&self, file: &RawFile) -> PreviewHandle {
        let mut inner = self.inner.lock().expect("recording lock should work");
        let id = inner.next_id;
        inner.next_id += 1;
        inner.live.insert(id, PreviewResource::from(file));
        PreviewHandle::new(id, format!("preview://{id}"))
    }

    fn resolve(&self, handle: &PreviewHandle) -> Option<PreviewResource> {
        let inner = self.inner.lock().expect("recording lock should work");
        inner.live.get(&handle.id()).cloned()
    }

    fn release(&self, handle: PreviewHandle) {
        let mut inner = self.inner.lock().expect("recording lock should work");
        inner.live.remove(&handle.id());
        *inner.releases.entry(handle.id()).or_insert(0) += 1;
    }
}
