#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from shelfscan for tests
pub use shelfscan::{
    DetectionOutcome, DetectionResult, FailureKind, FileCandidate, FileIntake, IntakeSource,
    SelectError, StateKind, SubmissionSession, SubmissionState, TransportFailure, ValidationError,
};
