use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use image::{ImageBuffer, Rgb};
use shelfscan::{
    ClientConfig, DetectionClient, DetectionOutcome, DetectionService, FileCandidate, IntakeSource,
    PendingImage, RawDetectionPayload, TransportFailure,
};
use tempfile::NamedTempFile;
use wiremock::MockServer;

/// Creates a 100x100 red test image and returns the temp file.
/// The file will be automatically cleaned up when dropped.
pub fn create_test_image() -> NamedTempFile {
    let img = ImageBuffer::from_fn(100, 100, |_, _| Rgb([255u8, 0u8, 0u8]));
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// A `photo.png` candidate with text bytes, so multipart bodies stay readable in matchers.
pub fn photo_candidate() -> FileCandidate {
    FileCandidate::new("photo.png", b"fake png bytes".to_vec(), IntakeSource::Picked)
        .with_media_type("image/png")
}

pub fn pdf_candidate() -> FileCandidate {
    FileCandidate::new(
        "document.pdf",
        b"%PDF-1.4 not an image".to_vec(),
        IntakeSource::Dropped,
    )
    .with_media_type("application/pdf")
}

/// Validated `photo.png`, for driving the client directly.
pub fn photo_image() -> PendingImage {
    shelfscan::FileIntake::validate(photo_candidate()).expect("photo.png is an image")
}

/// Mock server mounted under `/api/v1`, like the real backend.
pub async fn start_backend() -> (MockServer, DetectionClient) {
    let server = MockServer::start().await;
    let config = ClientConfig::new(&format!("{}/api/v1", server.uri()))
        .expect("mock server URL is valid")
        .with_timeout(Duration::from_secs(5));
    let client = DetectionClient::from_config(&config).expect("Failed to build client");
    (server, client)
}

/// Client pointed at a port nothing listens on.
pub fn unreachable_client() -> DetectionClient {
    let config = ClientConfig::new("http://127.0.0.1:1/api/v1")
        .expect("static URL is valid")
        .with_timeout(Duration::from_secs(2));
    DetectionClient::from_config(&config).expect("Failed to build client")
}

pub const TWO_PRODUCTS: &str = r#"{
    "success": true,
    "detected_products": [
        {"product_id": 11, "detected_count": 3, "confidence_score": 0.9,
         "message": "Cola 330ml", "category": "Beverages", "bbox": [10, 20, 110, 220]},
        {"product_id": 12, "detected_count": 1, "confidence_score": 0.4,
         "message": "Crisps", "category": "Snacks"}
    ],
    "total_products_detected": 4,
    "processing_time": 1.25,
    "api_source": "YOLOv8"
}"#;

pub const NO_PRODUCTS: &str = r#"{
    "success": true,
    "detected_products": [],
    "total_products_detected": 0,
    "processing_time": 0.4,
    "api_source": "YOLOv8"
}"#;

pub fn payload(json: &str) -> RawDetectionPayload {
    serde_json::from_str(json).expect("fixture payload parses")
}

/// Detection service that answers with a canned outcome and counts calls.
#[derive(Debug, Clone)]
pub struct ScriptedService {
    outcome: DetectionOutcome,
    calls: Arc<AtomicUsize>,
}

impl ScriptedService {
    pub fn succeeding(json: &str) -> Self {
        Self::new(DetectionOutcome::Success(payload(json)))
    }

    pub fn failing(failure: TransportFailure) -> Self {
        Self::new(failure.into())
    }

    pub fn new(outcome: DetectionOutcome) -> Self {
        Self {
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DetectionService for ScriptedService {
    fn detect(
        &self,
        _image: &PendingImage,
    ) -> impl Future<Output = DetectionOutcome> + Send + 'static {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcome.clone();
        async move { outcome }
    }
}
