pub mod client;
pub mod config;
pub mod error;
pub mod intake;
pub mod models;
pub mod normalize;
pub mod session;

pub use client::{
    ApiClient, DetectionClient, DetectionOutcome, DetectionService, FailureKind, TransportFailure,
};
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, IntakeError, SelectError, ValidationError};
pub use intake::{FileCandidate, FileIntake};
pub use models::{BoundingBox, DetectedItem, DetectionResult, IntakeSource, PendingImage};
pub use normalize::{RawDetectionPayload, normalize};
pub use session::{StateKind, Submission, SubmissionSession, SubmissionState};

#[cfg(feature = "gui")]
pub mod gui;
