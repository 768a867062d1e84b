mod api;
mod detection;

pub use api::{ApiClient, HealthStatus};
pub use detection::{
    DETECT_PATH, DetectionClient, DetectionOutcome, DetectionService, FILE_FIELD, FailureKind,
    TransportFailure,
};
