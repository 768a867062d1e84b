//! The submission state machine behind the detection screen.
//!
//! ```text
//! idle --select--> selected --submit--> submitting --resolve--> success | empty | error
//!  ^                  |                                               |
//!  +------reset-------+-------------------reset-----------------------+
//! ```
//!
//! `submitting` is the only guard against double submission. While a
//! request is in flight, `begin_submit` returns `None` and no second
//! request is issued.

use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::{
    client::{DetectionOutcome, DetectionService},
    error::SelectError,
    intake::{FileCandidate, FileIntake},
    models::{DetectionResult, PendingImage},
    normalize::normalize,
};

/// Observable state. Each variant carries exactly the data valid in it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Selected(PendingImage),
    Submitting(PendingImage),
    Success {
        image: PendingImage,
        result: DetectionResult,
    },
    Empty {
        image: PendingImage,
        result: DetectionResult,
    },
    Error {
        image: PendingImage,
        message: String,
    },
}

/// Payload-free discriminant of [`SubmissionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Idle,
    Selected,
    Submitting,
    Success,
    Empty,
    Error,
}

impl StateKind {
    pub fn is_terminal(self) -> bool {
        matches!(self, StateKind::Success | StateKind::Empty | StateKind::Error)
    }
}

impl std::fmt::Display for StateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StateKind::Idle => "idle",
            StateKind::Selected => "selected",
            StateKind::Submitting => "submitting",
            StateKind::Success => "success",
            StateKind::Empty => "empty",
            StateKind::Error => "error",
        };
        f.write_str(name)
    }
}

impl SubmissionState {
    pub fn kind(&self) -> StateKind {
        match self {
            SubmissionState::Idle => StateKind::Idle,
            SubmissionState::Selected(_) => StateKind::Selected,
            SubmissionState::Submitting(_) => StateKind::Submitting,
            SubmissionState::Success { .. } => StateKind::Success,
            SubmissionState::Empty { .. } => StateKind::Empty,
            SubmissionState::Error { .. } => StateKind::Error,
        }
    }

    pub fn image(&self) -> Option<&PendingImage> {
        match self {
            SubmissionState::Idle => None,
            SubmissionState::Selected(image) | SubmissionState::Submitting(image) => Some(image),
            SubmissionState::Success { image, .. }
            | SubmissionState::Empty { image, .. }
            | SubmissionState::Error { image, .. } => Some(image),
        }
    }

    pub fn result(&self) -> Option<&DetectionResult> {
        match self {
            SubmissionState::Success { result, .. } | SubmissionState::Empty { result, .. } => {
                Some(result)
            }
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SubmissionState::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Ticket for one in-flight request, returned by
/// [`SubmissionSession::begin_submit`] and handed back to
/// [`SubmissionSession::resolve`].
#[derive(Debug, Clone)]
pub struct Submission {
    id: Uuid,
    image: PendingImage,
}

impl Submission {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn image(&self) -> &PendingImage {
        &self.image
    }

    /// Run this submission against a service, inside a span tagged with its id.
    pub fn run<S: DetectionService>(
        &self,
        service: &S,
    ) -> impl std::future::Future<Output = DetectionOutcome> + Send + 'static {
        let span = info_span!("submission", id = %self.id, file = %self.image.name());
        service.detect(&self.image).instrument(span)
    }
}

/// Owns the held image and drives intake, submission and normalization.
#[derive(Debug, Default)]
pub struct SubmissionSession {
    intake: FileIntake,
    state: SubmissionState,
    in_flight: Option<Uuid>,
    notice: Option<String>,
}

impl SubmissionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn kind(&self) -> StateKind {
        self.state.kind()
    }

    pub fn pending_image(&self) -> Option<&PendingImage> {
        self.state.image()
    }

    pub fn result(&self) -> Option<&DetectionResult> {
        self.state.result()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.state.error_message()
    }

    /// Transient message from the last rejected selection.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Accept a dropped or picked file. Allowed while idle or selected; a
    /// new valid file replaces the held one. An invalid file leaves the
    /// state untouched and sets [`Self::notice`].
    pub fn select(&mut self, candidate: FileCandidate) -> Result<(), SelectError> {
        self.notice = None;
        let kind = self.kind();
        if !matches!(kind, StateKind::Idle | StateKind::Selected) {
            warn!(state = %kind, name = %candidate.name, "Ignoring selection");
            return Err(SelectError::Busy(kind));
        }

        match self.intake.select(candidate) {
            Ok(image) => {
                let image = image.clone();
                self.transition(SubmissionState::Selected(image));
                Ok(())
            }
            Err(e) => {
                self.notice = Some(e.to_string());
                Err(SelectError::Invalid(e))
            }
        }
    }

    /// Move `selected -> submitting`. Returns `None` from any other state,
    /// which is how a double submit becomes a no-op.
    pub fn begin_submit(&mut self) -> Option<Submission> {
        self.notice = None;
        let SubmissionState::Selected(image) = &self.state else {
            debug!(state = %self.kind(), "Submit ignored");
            return None;
        };

        let submission = Submission {
            id: Uuid::new_v4(),
            image: image.clone(),
        };
        info!(
            id = %submission.id,
            name = submission.image.name(),
            size_bytes = submission.image.size_bytes(),
            "Submitting image"
        );
        self.in_flight = Some(submission.id);
        self.transition(SubmissionState::Submitting(submission.image.clone()));
        Some(submission)
    }

    /// Land the outcome of an in-flight submission. Tickets that do not
    /// match the request in flight are dropped. Returns the new state.
    pub fn resolve(&mut self, submission: Submission, outcome: DetectionOutcome) -> StateKind {
        if self.in_flight != Some(submission.id) || self.kind() != StateKind::Submitting {
            debug!(id = %submission.id, "Discarding outcome of a stale submission");
            return self.kind();
        }
        self.in_flight = None;

        let result = normalize(outcome, submission.image.name());
        let next = if !result.succeeded {
            let message = result
                .error_message
                .unwrap_or_else(|| "Detection failed".to_string());
            warn!(id = %submission.id, "Submission failed: {}", message);
            SubmissionState::Error {
                image: submission.image,
                message,
            }
        } else if result.item_count > 0 {
            info!(
                id = %submission.id,
                items = result.item_count,
                provider = %result.provider_label,
                "Submission succeeded"
            );
            SubmissionState::Success {
                image: submission.image,
                result,
            }
        } else {
            info!(id = %submission.id, "Submission succeeded with no detections");
            SubmissionState::Empty {
                image: submission.image,
                result,
            }
        };
        self.transition(next);
        self.kind()
    }

    /// Run the whole `submit` cycle against a service. Returns `None`
    /// without touching the service when not in `selected`.
    pub async fn submit_with<S: DetectionService>(&mut self, service: &S) -> Option<StateKind> {
        let submission = self.begin_submit()?;
        let outcome = submission.run(service).await;
        Some(self.resolve(submission, outcome))
    }

    /// Back to idle from `selected` or a terminal state, dropping the held
    /// image. Idempotent. Ignored while submitting: requests cannot be
    /// cancelled, so the outcome has to land first.
    pub fn reset(&mut self) {
        self.notice = None;
        match self.kind() {
            StateKind::Idle => {}
            StateKind::Submitting => {
                debug!("Reset ignored while a request is in flight");
            }
            _ => {
                self.intake.reset();
                self.transition(SubmissionState::Idle);
            }
        }
    }

    fn transition(&mut self, next: SubmissionState) {
        debug!(from = %self.kind(), to = %next.kind(), "State transition");
        self.state = next;
    }
}
