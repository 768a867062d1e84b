use std::{future::Future, time::Instant};

use reqwest::multipart::{Form, Part};
use tracing::{error, info, warn};

use crate::{
    client::api::ApiClient,
    config::ClientConfig,
    error::ConfigError,
    models::PendingImage,
    normalize::RawDetectionPayload,
};

/// Detection endpoint, relative to the API base.
pub const DETECT_PATH: &str = "vision/detect";
/// Multipart field carrying the image bytes.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The service answered with a non-2xx status.
    HttpStatus,
    /// Connection refused, DNS failure, timeout.
    Unreachable,
    /// A 2xx answer whose body could not be parsed.
    MalformedResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub kind: FailureKind,
    pub message: String,
    pub status_code: Option<u16>,
}

impl TransportFailure {
    pub fn http_status(status: u16) -> Self {
        Self {
            kind: FailureKind::HttpStatus,
            message: format!("Backend API Error: {}", status),
            status_code: Some(status),
        }
    }

    pub fn unreachable(detail: impl std::fmt::Display) -> Self {
        Self {
            kind: FailureKind::Unreachable,
            message: format!(
                "Unable to connect to AI backend: {}. Please ensure the backend server is reachable.",
                detail
            ),
            status_code: None,
        }
    }

    pub fn malformed(detail: impl std::fmt::Display) -> Self {
        Self {
            kind: FailureKind::MalformedResponse,
            message: format!("Failed to parse AI backend response: {}", detail),
            status_code: None,
        }
    }
}

/// What one submission attempt produced. Consumed by
/// [`crate::normalize::normalize`] and not kept afterwards.
#[derive(Debug, Clone)]
pub enum DetectionOutcome {
    Success(RawDetectionPayload),
    TransportFailure(TransportFailure),
}

impl From<TransportFailure> for DetectionOutcome {
    fn from(failure: TransportFailure) -> Self {
        DetectionOutcome::TransportFailure(failure)
    }
}

/// Anything that can run a detection on a pending image.
///
/// The returned future owns everything it needs, so it can be handed to an
/// event loop while the caller keeps its state.
pub trait DetectionService {
    fn detect(
        &self,
        image: &PendingImage,
    ) -> impl Future<Output = DetectionOutcome> + Send + 'static;
}

/// Submits images to `POST {base}/vision/detect`. One attempt per call,
/// no retries, and every failure comes back as a [`TransportFailure`].
#[derive(Debug, Clone)]
pub struct DetectionClient {
    api: ApiClient,
}

impl DetectionClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(ApiClient::new(config)?))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn submit(&self, image: &PendingImage) -> DetectionOutcome {
        submit_detection(self.api.clone(), image.clone()).await
    }
}

impl DetectionService for DetectionClient {
    fn detect(
        &self,
        image: &PendingImage,
    ) -> impl Future<Output = DetectionOutcome> + Send + 'static {
        submit_detection(self.api.clone(), image.clone())
    }
}

fn image_part(image: &PendingImage) -> Part {
    let part = || Part::bytes(image.bytes().to_vec()).file_name(image.name().to_string());
    match part().mime_str(image.media_type()) {
        Ok(part) => part,
        Err(e) => {
            warn!(media_type = image.media_type(), "Unusable media type, sending without it: {}", e);
            part()
        }
    }
}

async fn submit_detection(api: ApiClient, image: PendingImage) -> DetectionOutcome {
    let url = match api.endpoint(DETECT_PATH) {
        Ok(url) => url,
        Err(e) => return TransportFailure::unreachable(e).into(),
    };

    info!(
        %url,
        name = image.name(),
        size_bytes = image.size_bytes(),
        "Sending image to detection service"
    );
    let start = Instant::now();

    let form = Form::new().part(FILE_FIELD, image_part(&image));
    let response = match api.send(api.post(url).multipart(form)).await {
        Ok(response) => response,
        Err(e) => {
            let detail = if e.is_timeout() {
                format!("request timed out after {:?}", api.timeout())
            } else {
                e.to_string()
            };
            error!(elapsed = ?start.elapsed(), "Detection request failed: {}", detail);
            return TransportFailure::unreachable(detail).into();
        }
    };

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        warn!(status = status.as_u16(), %body, "Detection service returned an error");
        return TransportFailure::http_status(status.as_u16()).into();
    }

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to read detection response body: {}", e);
            return TransportFailure::malformed(e).into();
        }
    };

    match serde_json::from_slice::<RawDetectionPayload>(&body) {
        Ok(payload) => {
            info!(
                elapsed = ?start.elapsed(),
                entries = payload.entries.as_ref().map_or(0, Vec::len),
                "Detection service responded"
            );
            DetectionOutcome::Success(payload)
        }
        Err(e) => {
            warn!("Malformed detection response: {}", e);
            TransportFailure::malformed(e).into()
        }
    }
}
