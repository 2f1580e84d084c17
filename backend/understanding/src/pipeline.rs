//! Image-to-search pipeline.
//!
//! A paste starts a run: the image is previewed, sent for OCR, and the
//! extracted text is fed to a grounded search. Only the most recent run may
//! write state; starting a run cancels the one before it.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use logging::{PipelineEvent, PipelineEventLogger};
use media::{copy_text, ClipboardWriter, CopyStatus, ImageBlob, MediaError, PasteEvent, PreviewHandle};
use serde::{Deserialize, Serialize};
use simpledo_core::ValidationError;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::gemini::GenerativeClient;
use crate::ocr::{extract_text, OcrOutcome};
use crate::retry::{with_retry, RetryError, RetryPolicy, Sleeper, TokioSleeper};
use crate::search::{grounded_search, SearchOutcome, Source};

pub const NO_TEXT_MESSAGE: &str = "No meaningful result: no legible text was found in the image.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Idle,
    Extracting,
    Searching,
    Done,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Idle => "idle",
            RunStatus::Extracting => "extracting",
            RunStatus::Searching => "searching",
            RunStatus::Done => "done",
            RunStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a front end needs to draw the current run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSnapshot {
    pub run_id: u64,
    pub status: RunStatus,
    pub mime_type: Option<String>,
    pub preview_path: Option<PathBuf>,
    pub extracted_text: String,
    pub search_result: String,
    pub sources: Vec<Source>,
    pub error_message: Option<String>,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("{0}")]
    Remote(String),

    #[error("cancelled")]
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub retry: RetryPolicy,
    /// Where preview files go; the system temp dir when unset.
    pub preview_dir: Option<PathBuf>,
    /// Stop after OCR when false.
    pub search_after_ocr: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { retry: RetryPolicy::default(), preview_dir: None, search_after_ocr: true }
    }
}

/// Permission for one run to do its remote work.
#[derive(Debug)]
pub struct RunTicket {
    run_id: u64,
    image: ImageBlob,
    cancel: CancellationToken,
}

impl RunTicket {
    pub fn run_id(&self) -> u64 {
        self.run_id
    }
}

struct CurrentRun {
    snapshot: RunSnapshot,
    preview: Option<PreviewHandle>,
    cancel: CancellationToken,
}

impl Default for CurrentRun {
    fn default() -> Self {
        Self { snapshot: RunSnapshot::default(), preview: None, cancel: CancellationToken::new() }
    }
}

/// Shared handle; clones drive the same state.
#[derive(Clone)]
pub struct ImageSearchPipeline {
    client: Arc<dyn GenerativeClient>,
    sleeper: Arc<dyn Sleeper>,
    options: PipelineOptions,
    state: Arc<Mutex<CurrentRun>>,
}

impl ImageSearchPipeline {
    pub fn new(client: Arc<dyn GenerativeClient>) -> Self {
        Self {
            client,
            sleeper: Arc::new(TokioSleeper),
            options: PipelineOptions::default(),
            state: Arc::new(Mutex::new(CurrentRun::default())),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.lock().snapshot.clone()
    }

    fn lock(&self) -> MutexGuard<'_, CurrentRun> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Handle a paste: cancel the previous run, swap the preview and move
    /// to `Extracting`.
    ///
    /// A paste with no image item is ignored and leaves state untouched.
    /// An unreadable image starts a run that is immediately `Failed`.
    pub fn begin(&self, paste: PasteEvent) -> Result<RunTicket, PipelineError> {
        if paste.first_image().is_none() {
            debug!(items = paste.items.len(), "paste without an image ignored");
            return Err(MediaError::NoImage.into());
        }
        let image = paste.into_image();

        let mut current = self.lock();
        current.cancel.cancel();
        if let Some(old) = current.preview.take() {
            old.release();
        }

        let previous = current.snapshot.status;
        let run_id = current.snapshot.run_id + 1;
        let cancel = CancellationToken::new();
        current.cancel = cancel.clone();
        current.snapshot = RunSnapshot { run_id, ..RunSnapshot::default() };

        let started = image.and_then(|image| {
            let preview = PreviewHandle::create(&image, self.options.preview_dir.as_deref())?;
            Ok((image, preview))
        });

        match started {
            Ok((image, preview)) => {
                current.snapshot.status = RunStatus::Extracting;
                current.snapshot.mime_type = Some(image.mime_type().to_string());
                current.snapshot.preview_path = Some(preview.path().to_path_buf());
                current.preview = Some(preview);
                log_transition(run_id, previous, RunStatus::Extracting);
                info!(run_id, mime = %image.mime_type(), bytes = image.len(), "image pasted");
                Ok(RunTicket { run_id, image, cancel })
            }
            Err(e) => {
                current.snapshot.status = RunStatus::Failed;
                current.snapshot.error_message = Some(e.to_string());
                log_transition(run_id, previous, RunStatus::Failed);
                Err(e.into())
            }
        }
    }

    /// Do the remote work for `ticket` and return the resulting snapshot.
    ///
    /// If a newer run has started meanwhile, nothing is written and the
    /// newer run's snapshot is returned.
    pub async fn process(&self, ticket: RunTicket) -> RunSnapshot {
        let RunTicket { run_id, image, cancel } = ticket;
        let client = self.client.as_ref();
        let image = &image;

        let ocr = with_retry("ocr", &self.options.retry, self.sleeper.as_ref(), &cancel, move |attempt| async move {
            let result = extract_text(client, image).await;
            if let Err(e) = &result {
                log_call_failure(run_id, "ocr", attempt, e);
            }
            result
        })
        .await;

        let text = match ocr {
            Ok(OcrOutcome::Text(text)) => text,
            Ok(OcrOutcome::Empty) => {
                self.fail(run_id, NO_TEXT_MESSAGE.to_string());
                return self.snapshot();
            }
            Err(RetryError::Cancelled { .. }) => return self.snapshot(),
            Err(RetryError::Exhausted { attempts, last_error }) => {
                self.fail(run_id, format!("Failed to process image after {attempts} attempts. Error: {last_error}"));
                return self.snapshot();
            }
        };

        let next = if self.options.search_after_ocr { RunStatus::Searching } else { RunStatus::Done };
        let applied = self.update(run_id, |s| {
            s.extracted_text = text.clone();
            s.status = next;
        });
        if !applied || next == RunStatus::Done {
            return self.snapshot();
        }

        let query = text.as_str();
        let search = with_retry("search", &self.options.retry, self.sleeper.as_ref(), &cancel, move |attempt| async move {
            let result = grounded_search(client, query).await;
            if let Err(e) = &result {
                log_call_failure(run_id, "search", attempt, e);
            }
            result
        })
        .await;

        match search {
            Ok(outcome) => {
                self.update(run_id, |s| {
                    s.search_result = outcome.text;
                    s.sources = outcome.sources;
                    s.status = RunStatus::Done;
                });
            }
            Err(RetryError::Cancelled { .. }) => {}
            Err(RetryError::Exhausted { attempts, last_error }) => {
                self.fail(run_id, format!("Failed to perform search after {attempts} attempts. Error: {last_error}"));
            }
        }
        self.snapshot()
    }

    /// [`begin`](Self::begin) followed by [`process`](Self::process).
    pub async fn paste(&self, paste: PasteEvent) -> Result<RunSnapshot, PipelineError> {
        let ticket = self.begin(paste)?;
        Ok(self.process(ticket).await)
    }

    /// Query-only search, independent of any image run.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, PipelineError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::EmptyQuery.into());
        }

        let client = self.client.as_ref();
        let cancel = CancellationToken::new();
        with_retry("search", &self.options.retry, self.sleeper.as_ref(), &cancel, move |_| grounded_search(client, query))
            .await
            .map_err(|e| match e {
                RetryError::Cancelled { .. } => PipelineError::Cancelled,
                RetryError::Exhausted { attempts, last_error } => PipelineError::Remote(format!(
                    "Failed to perform search after {attempts} attempts. Error: {last_error}"
                )),
            })
    }

    /// Copy the extracted text, if there is any yet.
    pub fn copy_extracted(&self, writer: &dyn ClipboardWriter) -> Option<CopyStatus> {
        let text = self.lock().snapshot.extracted_text.clone();
        if text.is_empty() {
            return None;
        }
        Some(copy_text(writer, &text))
    }

    /// Apply `change` if `run_id` is still the current run.
    fn update(&self, run_id: u64, change: impl FnOnce(&mut RunSnapshot)) -> bool {
        let mut current = self.lock();
        if current.snapshot.run_id != run_id {
            PipelineEventLogger::log_event(
                run_id,
                PipelineEvent::StaleCompletion { current_run: current.snapshot.run_id },
            );
            return false;
        }
        let from = current.snapshot.status;
        change(&mut current.snapshot);
        log_transition(run_id, from, current.snapshot.status);
        true
    }

    fn fail(&self, run_id: u64, message: String) {
        self.update(run_id, |s| {
            s.status = RunStatus::Failed;
            s.error_message = Some(message);
        });
    }
}

fn log_transition(run_id: u64, from: RunStatus, to: RunStatus) {
    if from != to {
        PipelineEventLogger::log_event(
            run_id,
            PipelineEvent::Transition { from: from.to_string(), to: to.to_string() },
        );
    }
}

fn log_call_failure(run_id: u64, call: &str, attempt: u32, error: &impl fmt::Display) {
    PipelineEventLogger::log_event(
        run_id,
        PipelineEvent::CallFailed { call: call.to_string(), attempt, error_msg: error.to_string() },
    );
}
