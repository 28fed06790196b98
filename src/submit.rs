//! Submission lifecycle for one analysis cycle.
//!
//! The lifecycle is an explicit state machine rather than a bag of
//! `loading`/`progress`/`error` flags, so invalid combinations (an error while
//! still loading, progress outside a request) cannot be represented. One cycle
//! owns its own progress channel and result buffer; nothing carries over into
//! the next cycle.

use tokio::sync::watch;

use crate::catalog::DrugSelection;
use crate::error::PharmaGuardError;
use crate::report::BatchView;
use crate::risk::OverallRisk;
use crate::sources::pharmaguard::AnalysisClient;
use crate::validate::validate_upload;

const EMPTY_SELECTION_MSG: &str = "Please select at least one drug";
const EMPTY_SELECTION_DEMO_MSG: &str = "Please select at least one drug for demo";
const ANALYZE_FALLBACK_MSG: &str = "Analysis failed. Please check your file and try again.";
const DEMO_FALLBACK_MSG: &str = "Demo failed. Is the backend running?";

/// Upload share of perceived progress; the remaining 40% is server-side
/// processing with no intermediate signal.
const UPLOAD_PROGRESS_CEILING: u64 = 60;

/// A candidate VCF upload. Held by the caller until the submission cycle
/// resolves, then discarded.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl UploadFile {
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// What to submit. File presence is tied to the mode by construction.
#[derive(Debug)]
pub enum AnalysisRequest {
    FileUpload {
        file: UploadFile,
        drugs: DrugSelection,
        patient_id: Option<String>,
    },
    Demo {
        drugs: DrugSelection,
    },
}

impl AnalysisRequest {
    fn validate_local(&self) -> Result<(), String> {
        match self {
            AnalysisRequest::FileUpload { file, drugs, .. } => {
                validate_upload(file).map_err(|rejection| rejection.to_string())?;
                if drugs.is_empty() {
                    return Err(EMPTY_SELECTION_MSG.to_string());
                }
                Ok(())
            }
            AnalysisRequest::Demo { drugs } => {
                if drugs.is_empty() {
                    return Err(EMPTY_SELECTION_DEMO_MSG.to_string());
                }
                Ok(())
            }
        }
    }

    fn fallback_message(&self) -> &'static str {
        match self {
            AnalysisRequest::FileUpload { .. } => ANALYZE_FALLBACK_MSG,
            AnalysisRequest::Demo { .. } => DEMO_FALLBACK_MSG,
        }
    }
}

/// Everything a successful cycle produces. `raw` is the untouched server
/// payload; exports reproduce it exactly.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub raw: serde_json::Value,
    pub report: BatchView,
    pub overall: OverallRisk,
}

#[derive(Debug)]
pub enum SubmissionState {
    Idle,
    Validating,
    InFlight,
    Success(Box<AnalysisOutcome>),
    Failed(String),
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::Success(_) | SubmissionState::Failed(_))
    }
}

/// Monotonic progress reporter for one submission cycle, 0..=100.
///
/// Upload callbacks can arrive out of order relative to each other; a stale
/// value never lowers the published progress within a cycle. Only the
/// cycle-ending [`ProgressSink::clear`] moves it back to zero.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: watch::Sender<u8>,
}

impl ProgressSink {
    pub fn channel() -> (Self, watch::Receiver<u8>) {
        let (tx, rx) = watch::channel(0);
        (Self { tx }, rx)
    }

    /// Publishes the byte-upload ratio, rescaled into the upload share of
    /// overall progress.
    pub fn observe_upload(&self, sent: u64, total: u64) {
        let capped = sent.min(total);
        let pct = (capped * UPLOAD_PROGRESS_CEILING) / total.max(1);
        self.advance_to(pct as u8);
    }

    /// Response received; jump to 100.
    fn complete(&self) {
        self.advance_to(100);
    }

    /// Leaving `InFlight`: progress is meaningless outside it.
    fn clear(&self) {
        let _ = self.tx.send(0);
    }

    fn advance_to(&self, pct: u8) {
        self.tx.send_if_modified(|current| {
            if pct > *current {
                *current = pct;
                true
            } else {
                false
            }
        });
    }
}

/// Orchestrates a submission: local validation, one HTTP exchange, then
/// normalization and aggregate classification.
pub struct SubmissionCycle {
    client: AnalysisClient,
    progress: ProgressSink,
    progress_rx: watch::Receiver<u8>,
    state: SubmissionState,
}

impl SubmissionCycle {
    pub fn new(client: AnalysisClient) -> Self {
        let (progress, progress_rx) = ProgressSink::channel();
        Self {
            client,
            progress,
            progress_rx,
            state: SubmissionState::Idle,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Watch side of the progress channel; meaningful only while `InFlight`.
    pub fn progress(&self) -> watch::Receiver<u8> {
        self.progress_rx.clone()
    }

    /// Runs one full submission cycle and lands in a terminal state.
    ///
    /// Submit controls are expected to be disabled while a request is in
    /// flight; the `&mut self` receiver makes a concurrent second submission
    /// unrepresentable on top of that. A submit from a terminal state starts
    /// a fresh cycle.
    pub async fn submit(&mut self, request: AnalysisRequest) -> &SubmissionState {
        if matches!(self.state, SubmissionState::InFlight) {
            return &self.state;
        }

        self.state = SubmissionState::Validating;
        if let Err(message) = request.validate_local() {
            // No network call for local failures.
            self.state = SubmissionState::Failed(message);
            return &self.state;
        }

        self.progress.clear();
        self.state = SubmissionState::InFlight;

        let fallback = request.fallback_message();
        let exchange = match &request {
            AnalysisRequest::FileUpload {
                file,
                drugs,
                patient_id,
            } => {
                self.client
                    .analyze(file, drugs, patient_id.as_deref(), &self.progress)
                    .await
            }
            AnalysisRequest::Demo { drugs } => self.client.analyze_demo(drugs).await,
        };
        drop(request);

        self.state = match exchange {
            Ok(raw) => {
                self.progress.complete();
                match Self::interpret(raw) {
                    Ok(outcome) => SubmissionState::Success(Box::new(outcome)),
                    Err(_) => SubmissionState::Failed(fallback.to_string()),
                }
            }
            Err(err) => {
                let message = err
                    .service_detail()
                    .map(str::to_string)
                    .unwrap_or_else(|| fallback.to_string());
                SubmissionState::Failed(message)
            }
        };

        self.progress.clear();
        &self.state
    }

    /// Back to `Idle` for a new analysis; the outcome is dropped in full.
    pub fn reset(&mut self) {
        self.state = SubmissionState::Idle;
        self.progress.clear();
    }

    fn interpret(raw: serde_json::Value) -> Result<AnalysisOutcome, PharmaGuardError> {
        let report = crate::report::normalize(&raw)?;
        let overall = crate::risk::aggregate(&report.results);
        Ok(AnalysisOutcome {
            raw,
            report,
            overall,
        })
    }
}
