#![warn(missing_docs)]
//! # paper-analyzer-app
//!
//! ## Purpose
//! Wires file selection, encoding, the analysis service and the view state
//! machine into one controller for `paper-analyzer`.
//!
//! ## Responsibilities
//! - Own the [`FileStore`] and the [`ViewStateMachine`].
//! - Guard submission: no files means no service call, and only one request
//!   may be in flight.
//! - Turn every failure into a user-facing message while logging the cause.
//!
//! ## Data flow
//! `select_files` / `remove_file` -> `trigger_analyze` snapshots the
//! selection into a [`PendingAnalysis`] -> `run` encodes every file and calls
//! the [`AnalysisService`] -> `complete` applies the [`AnalysisOutcome`] ->
//! `view` projects the result.
//!
//! ## Ownership and lifetimes
//! A [`PendingAnalysis`] owns a snapshot of the selection and a clone of the
//! service handle, so it does not borrow the controller while awaiting. The
//! controller stays in `Analyzing` until `complete` is called, which is what
//! rejects selection changes and repeated triggers in the meantime.
//!
//! ## Error model
//! Controller preconditions and submission failures are [`SubmissionError`].
//! Failures of a started submission end up as `Failed(message)` in the view.
//!
//! ## Security and privacy notes
//! File bytes and encoded payloads are never logged; failure causes are
//! logged through the client's redaction helper.

use std::sync::Arc;

use paper_analyzer_client::{AnalysisError, AnalysisService, redact_sensitive};
use paper_analyzer_core::RawFile;
use paper_analyzer_encoder::{ReadError, encode_all};
use paper_analyzer_files::{FileStore, FilesError, SelectionReport};
use paper_analyzer_ui::{
    TransitionError, Trigger, ViewModel, ViewState, ViewStateMachine, project_view,
};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Build-time application version loaded from the root `VERSION` file.
pub const APP_VERSION: &str = env!("PAPER_ANALYZER_VERSION");

/// Banner shown after a failed remote call.
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "An error occurred during analysis. Please check the log for details and try again.";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Installs the global `tracing` subscriber.
///
/// Reads `RUST_LOG`, defaults to `info`, and writes to stderr so stdout stays
/// free for the rendered view. Calling it twice is harmless.
pub fn init_telemetry() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Result of one submission.
#[derive(Debug)]
pub enum AnalysisOutcome {
    /// Markup text returned by the model.
    Succeeded(String),
    /// The submission failed.
    Failed(SubmissionError),
}

/// Submission that has been accepted and is ready to run.
///
/// Holds its own copy of the selection taken when it was triggered.
pub struct PendingAnalysis {
    files: Vec<RawFile>,
    service: Arc<dyn AnalysisService>,
}

impl PendingAnalysis {
    /// Number of files in the submission.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Encodes every file, then makes exactly one service call.
    ///
    /// An unreadable file fails the whole submission before the service is
    /// called.
    pub async fn run(self) -> AnalysisOutcome {
        let parts = match encode_all(&self.files).await {
            Ok(parts) => parts,
            Err(cause) => {
                warn!(%cause, "submission aborted while encoding files");
                return AnalysisOutcome::Failed(SubmissionError::Read(cause));
            }
        };

        match self.service.analyze(parts).await {
            Ok(text) => AnalysisOutcome::Succeeded(text),
            Err(cause) => AnalysisOutcome::Failed(SubmissionError::Analysis(cause)),
        }
    }
}

impl std::fmt::Debug for PendingAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingAnalysis")
            .field("files", &self.files.len())
            .finish_non_exhaustive()
    }
}

/// Single owner of the selection and the view state.
pub struct ViewController {
    store: FileStore,
    machine: ViewStateMachine,
    service: Arc<dyn AnalysisService>,
}

impl ViewController {
    /// Creates a controller in `Idle` over an empty or pre-filled store.
    pub fn new(store: FileStore, service: Arc<dyn AnalysisService>) -> Self {
        let mut machine = ViewStateMachine::new();
        // A fresh machine is never analyzing, so this cannot fail.
        let _ = machine.on_selection_changed(store.len());
        Self {
            store,
            machine,
            service,
        }
    }

    /// Appends files to the selection.
    ///
    /// When at least one file is accepted, any previous result or error is
    /// cleared.
    ///
    /// # Errors
    /// Returns [`SubmissionError::Busy`] while a request is in flight.
    pub fn select_files(
        &mut self,
        files: Vec<RawFile>,
    ) -> Result<SelectionReport, SubmissionError> {
        if self.machine.is_analyzing() {
            return Err(SubmissionError::Busy);
        }

        let report = self.store.add(files);
        for rejected in &report.rejected {
            warn!(file = %rejected.name, reason = %rejected.reason, "file not added");
        }
        if report.accepted > 0 {
            self.machine.on_selection_changed(self.store.len())?;
        }
        Ok(report)
    }

    /// Removes the file at `index` and releases its preview.
    ///
    /// # Errors
    /// Returns [`SubmissionError::Busy`] while a request is in flight and
    /// [`SubmissionError::Files`] for an index past the end.
    pub fn remove_file(&mut self, index: usize) -> Result<RawFile, SubmissionError> {
        if self.machine.is_analyzing() {
            return Err(SubmissionError::Busy);
        }

        let removed = self.store.remove(index)?;
        self.machine.on_selection_changed(self.store.len())?;
        Ok(removed)
    }

    /// Attempts to start a submission.
    ///
    /// Returns `None` when a request is already in flight or when there are
    /// no files; in the latter case the view already shows the validation
    /// message and the service is never called.
    pub fn trigger_analyze(&mut self) -> Option<PendingAnalysis> {
        match self.machine.begin_analysis(self.store.len()) {
            Trigger::Started => {
                info!(files = self.store.len(), "analysis started");
                Some(PendingAnalysis {
                    files: self.store.snapshot(),
                    service: Arc::clone(&self.service),
                })
            }
            Trigger::Ignored => {
                warn!("analysis already in progress; trigger ignored");
                None
            }
            Trigger::Rejected => {
                info!("analysis requested without files");
                None
            }
        }
    }

    /// Applies the outcome of a [`PendingAnalysis`].
    ///
    /// # Errors
    /// Returns [`TransitionError::NotAnalyzing`] when no submission is in
    /// flight.
    pub fn complete(&mut self, outcome: AnalysisOutcome) -> Result<(), TransitionError> {
        match outcome {
            AnalysisOutcome::Succeeded(text) => {
                info!(chars = text.chars().count(), "analysis complete");
                self.machine.on_analysis_succeeded(text)
            }
            AnalysisOutcome::Failed(cause) => {
                error!(
                    cause = %redact_sensitive(&error_chain(&cause)),
                    "analysis failed"
                );
                self.machine.on_analysis_failed(cause.user_message())
            }
        }
    }

    /// Triggers, runs and completes one submission.
    ///
    /// Returns the resulting state. When the trigger is ignored or rejected
    /// the state is returned unchanged from that decision.
    pub async fn analyze(&mut self) -> &ViewState {
        if let Some(pending) = self.trigger_analyze() {
            let outcome = pending.run().await;
            // The machine is in `Analyzing` until this call.
            let _ = self.complete(outcome);
        }
        self.machine.state()
    }

    /// Current view state.
    pub fn state(&self) -> &ViewState {
        self.machine.state()
    }

    /// Current selection.
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Display-ready projection of the current state.
    pub fn view(&self) -> ViewModel {
        project_view(&self.machine, &self.store)
    }
}

impl std::fmt::Debug for ViewController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewController")
            .field("store", &self.store)
            .field("machine", &self.machine)
            .finish_non_exhaustive()
    }
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Controller and submission failures.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// A request is in flight, so the selection cannot change.
    #[error("an analysis is in progress; wait for it to finish")]
    Busy,
    /// Store precondition failed.
    #[error(transparent)]
    Files(#[from] FilesError),
    /// A selected file could not be read.
    #[error(transparent)]
    Read(ReadError),
    /// The remote call failed.
    #[error(transparent)]
    Analysis(AnalysisError),
}

impl From<TransitionError> for SubmissionError {
    fn from(_: TransitionError) -> Self {
        Self::Busy
    }
}

impl SubmissionError {
    /// Text shown in the error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Analysis(_) => ANALYSIS_FAILED_MESSAGE.to_string(),
            Self::Read(cause) => format!(
                "An error occurred during analysis: {cause}. Please re-select the file and try again."
            ),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for error presentation.

    use super::*;

    #[test]
    fn read_failures_name_the_file() {
        let error = SubmissionError::Read(ReadError {
            name: "page-2.png".to_string(),
            reason: "No such file or directory".to_string(),
        });
        assert!(error.user_message().contains("page-2.png"));
    }

    #[test]
    fn busy_is_shown_as_is() {
        assert_eq!(
            SubmissionError::Busy.user_message(),
            "an analysis is in progress; wait for it to finish"
        );
    }
}
