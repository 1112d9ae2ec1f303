//! Shared fixtures for controller tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use paper_analyzer_app::ViewController;
use paper_analyzer_client::{AnalysisError, AnalysisService, TransportError};
use paper_analyzer_core::{ImagePart, RawFile};
use paper_analyzer_files::{FileStore, InMemoryPreviewBackend, SelectionPolicy};

/// Service stub that counts calls and replays a fixed answer.
#[derive(Debug)]
pub struct SpyService {
    calls: AtomicUsize,
    received: Mutex<Vec<Vec<ImagePart>>>,
    answer: Mutex<Result<String, u16>>,
}

#[allow(dead_code)]
impl SpyService {
    pub fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
            answer: Mutex::new(Ok(text.to_string())),
        })
    }

    pub fn failing_with_status(status: u16) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
            answer: Mutex::new(Err(status)),
        })
    }

    pub fn fail_with_status(&self, status: u16) {
        *self.answer.lock().expect("answer lock should work") = Err(status);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_parts(&self) -> Vec<ImagePart> {
        self.received
            .lock()
            .expect("received lock should work")
            .last()
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl AnalysisService for SpyService {
    async fn analyze(&self, parts: Vec<ImagePart>) -> Result<String, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received
            .lock()
            .expect("received lock should work")
            .push(parts);
        let answer = self.answer.lock().expect("answer lock should work").clone();
        answer.map_err(|status| {
            AnalysisError::Transport(TransportError::Status {
                status,
                body: "upstream failure".to_string(),
            })
        })
    }
}

/// Creates a small in-memory PNG-typed file.
#[allow(dead_code)]
pub fn image(name: &str) -> RawFile {
    RawFile::from_bytes(name, "image/png", name.as_bytes().to_vec())
        .expect("fixture file should be valid")
}

/// Creates a controller over an empty store with the default policy.
#[allow(dead_code)]
pub fn controller(service: Arc<SpyService>) -> ViewController {
    let store = FileStore::new(
        Arc::new(InMemoryPreviewBackend::with_seed(7)),
        SelectionPolicy::default(),
    );
    ViewController::new(store, service)
}
