#![warn(missing_docs)]
//! # paper-analyzer-ui
//!
//! ## Purpose
//! Defines the view state machine and the display-ready projection of it.
//!
//! ## Responsibilities
//! - Model `Idle -> Ready -> Analyzing -> Done | Failed` with explicit legal
//!   transitions.
//! - Refuse selection changes and re-entry while a request is in flight.
//! - Project state plus the current file selection into a [`ViewModel`].
//!
//! ## Data flow
//! Controller events drive [`ViewStateMachine`]; the rendering layer reads
//! only [`project_view`] output.
//!
//! ## Error model
//! Illegal transitions return [`TransitionError`] and leave state untouched.
//! A zero-file trigger is not an error: it moves to `Failed` with
//! [`VALIDATION_MESSAGE`] and reports [`Trigger::Rejected`].

use paper_analyzer_files::FileStore;
use thiserror::Error;

/// Application title.
pub const APP_TITLE: &str = "Academic Paper Analyzer";

/// Application tagline.
pub const APP_SUBTITLE: &str = "Deep, comparative analysis of research papers to uncover insights for future work.";

/// Message stored when analysis is triggered without files.
pub const VALIDATION_MESSAGE: &str = "Please upload at least one paper image to analyze.";

/// Message shown while a request is in flight.
pub const LOADING_MESSAGE: &str = "AI is reading and comparing the papers... this may take a moment.";

/// Submit control label when idle.
pub const SUBMIT_LABEL: &str = "Analyze Papers";

/// Submit control label while analyzing.
pub const SUBMIT_LABEL_BUSY: &str = "Analyzing...";

/// Current view state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// No files selected.
    Idle,
    /// Files selected, nothing submitted since the last change.
    Ready,
    /// A request is in flight.
    Analyzing,
    /// Last request succeeded with this markup text.
    Done(String),
    /// Last attempt failed with this user-facing message.
    Failed(String),
}

/// Result of asking the machine to start an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// State moved to `Analyzing`; the caller must run the request.
    Started,
    /// A request is already in flight; nothing changed.
    Ignored,
    /// No files; state moved to `Failed` with the validation message.
    Rejected,
}

/// View state machine with explicit legal transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewStateMachine {
    state: ViewState,
}

impl ViewStateMachine {
    /// Creates a machine in `Idle`.
    pub fn new() -> Self {
        Self {
            state: ViewState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Returns `true` while a request is in flight.
    pub fn is_analyzing(&self) -> bool {
        self.state == ViewState::Analyzing
    }

    /// Applies a selection change, clearing any result or error.
    ///
    /// # Errors
    /// Returns [`TransitionError::Busy`] while analyzing.
    pub fn on_selection_changed(&mut self, file_count: usize) -> Result<(), TransitionError> {
        if self.is_analyzing() {
            return Err(TransitionError::Busy);
        }

        self.state = if file_count == 0 {
            ViewState::Idle
        } else {
            ViewState::Ready
        };
        Ok(())
    }

    /// Attempts to start an analysis over `file_count` files.
    ///
    /// `Done` and `Failed` with files behave like `Ready`: the submit control
    /// is enabled there, and starting discards the previous outcome.
    pub fn begin_analysis(&mut self, file_count: usize) -> Trigger {
        if self.is_analyzing() {
            return Trigger::Ignored;
        }
        if file_count == 0 {
            self.state = ViewState::Failed(VALIDATION_MESSAGE.to_string());
            return Trigger::Rejected;
        }

        self.state = ViewState::Analyzing;
        Trigger::Started
    }

    /// Stores a successful result.
    ///
    /// # Errors
    /// Returns [`TransitionError::NotAnalyzing`] outside `Analyzing`.
    pub fn on_analysis_succeeded(&mut self, text: String) -> Result<(), TransitionError> {
        self.finish(ViewState::Done(text))
    }

    /// Stores a failure message.
    ///
    /// # Errors
    /// Returns [`TransitionError::NotAnalyzing`] outside `Analyzing`.
    pub fn on_analysis_failed(&mut self, message: String) -> Result<(), TransitionError> {
        self.finish(ViewState::Failed(message))
    }

    fn finish(&mut self, next: ViewState) -> Result<(), TransitionError> {
        if !self.is_analyzing() {
            return Err(TransitionError::NotAnalyzing);
        }
        self.state = next;
        Ok(())
    }
}

impl Default for ViewStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Illegal view transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Selection cannot change while a request is in flight.
    #[error("an analysis is in progress")]
    Busy,
    /// Completion arrived without a request in flight.
    #[error("no analysis is in progress")]
    NotAnalyzing,
}

/// One upload tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTile {
    /// Position used by removal controls.
    pub index: usize,
    /// File display name.
    pub name: String,
    /// File MIME type.
    pub mime_type: String,
    /// Human-readable size.
    pub size_label: String,
    /// Preview handle URL.
    pub preview_url: String,
}

/// Display-ready snapshot of the whole screen, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    /// Header title.
    pub title: String,
    /// Header tagline.
    pub subtitle: String,
    /// Upload guidance derived from the selection policy.
    pub upload_hint: String,
    /// Selected files with previews.
    pub files: Vec<FileTile>,
    /// Whether the submit control accepts input.
    pub submit_enabled: bool,
    /// Submit control label.
    pub submit_label: String,
    /// Loading indicator text while analyzing.
    pub loading_message: Option<String>,
    /// Error banner text after a failure.
    pub error_banner: Option<String>,
    /// Prompt shown when files are ready and nothing has run yet.
    pub ready_hint: Option<String>,
    /// Markup text of the last successful analysis.
    pub analysis: Option<String>,
}

/// Projects state and selection into a [`ViewModel`].
pub fn project_view(machine: &ViewStateMachine, store: &FileStore) -> ViewModel {
    let files = store
        .files()
        .zip(store.previews())
        .enumerate()
        .map(|(index, (file, preview))| FileTile {
            index,
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size_label: format_size(file.size),
            preview_url: preview.url().to_string(),
        })
        .collect();

    let analyzing = machine.is_analyzing();
    let policy = store.policy();
    let upload_hint = if policy.images_only {
        format!("PNG, JPG, GIF up to {}", format_size(policy.max_file_bytes))
    } else {
        format!("Any file up to {}", format_size(policy.max_file_bytes))
    };

    let (error_banner, analysis) = match machine.state() {
        ViewState::Failed(message) => (Some(message.clone()), None),
        ViewState::Done(text) => (None, Some(text.clone())),
        _ => (None, None),
    };

    let ready_hint = (*machine.state() == ViewState::Ready).then(|| {
        format!(
            "Ready to analyze {} paper(s). Run \"{SUBMIT_LABEL}\" to begin.",
            store.len()
        )
    });

    ViewModel {
        title: APP_TITLE.to_string(),
        subtitle: APP_SUBTITLE.to_string(),
        upload_hint,
        files,
        submit_enabled: !analyzing && !store.is_empty(),
        submit_label: if analyzing {
            SUBMIT_LABEL_BUSY.to_string()
        } else {
            SUBMIT_LABEL.to_string()
        },
        loading_message: analyzing.then(|| LOADING_MESSAGE.to_string()),
        error_banner,
        ready_hint,
        analysis,
    }
}

/// Formats a byte count with binary units (`512 B`, `1.5 KB`, `10 MB`).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else if value.fract() == 0.0 {
        format!("{value:.0} {}", UNITS[unit])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for transitions and formatting.

    use super::*;

    #[test]
    fn completion_requires_in_flight_request() {
        let mut machine = ViewStateMachine::new();
        assert_eq!(
            machine.on_analysis_succeeded("text".to_string()),
            Err(TransitionError::NotAnalyzing)
        );
        assert_eq!(machine.state(), &ViewState::Idle);
    }

    #[test]
    fn formats_sizes() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(10 * 1024 * 1024), "10 MB");
    }
}
