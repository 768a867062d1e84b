use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;

/// Provider label used when the service does not name itself.
pub const DEFAULT_PROVIDER_LABEL: &str = "Backend AI Service";
/// Provider label attached to failed results.
pub const ERROR_PROVIDER_LABEL: &str = "Error";
pub const DEFAULT_CATEGORY: &str = "General Merchandise";
pub const DEFAULT_CONFIDENCE: f32 = 0.5;

/// Guidance shown when a detection succeeds but finds nothing.
pub const NO_DETECTION_TIPS: [&str; 4] = [
    "Upload clear images with recognizable objects",
    "Ensure good lighting and focus",
    "Try retail products, household items, or common objects",
    "The AI can detect 80+ object categories",
];

/// Which surface a file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IntakeSource {
    Dropped,
    Picked,
}

/// A validated image waiting to be submitted.
///
/// Only [`crate::intake::FileIntake::select`] builds one, so `media_type`
/// always starts with `image/`. The bytes are shared, so cloning is cheap.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingImage {
    pub(crate) bytes: Arc<[u8]>,
    pub(crate) name: String,
    pub(crate) media_type: String,
    pub(crate) source: IntakeSource,
}

impl PendingImage {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn size_mb(&self) -> f64 {
        self.size_bytes() as f64 / 1024.0 / 1024.0
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn source(&self) -> IntakeSource {
        self.source
    }
}

impl std::fmt::Debug for PendingImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingImage")
            .field("name", &self.name)
            .field("size_bytes", &self.size_bytes())
            .field("media_type", &self.media_type)
            .field("source", &self.source)
            .finish()
    }
}

/// Bounding box in the submitted image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Build from two corners, in either order.
    pub fn from_corners(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1.min(x2),
            y: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedItem {
    pub id: u64,
    pub count: u32,
    /// Always within `0.0..=1.0`.
    pub confidence: f32,
    pub label: String,
    pub category: String,
    pub bounding_box: Option<BoundingBox>,
}

/// Canonical, default-filled detection result used by every renderer.
///
/// Invariants: `item_count == items.len()`, and a failed result has no items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    pub source_file_name: String,
    pub item_count: usize,
    pub processing_seconds: f64,
    pub items: Vec<DetectedItem>,
    pub provider_label: String,
    pub succeeded: bool,
    pub error_message: Option<String>,
    /// Total as reported by the service, which may count grouped units.
    pub reported_total: Option<u64>,
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
}

impl DetectionResult {
    pub fn failed(source_file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_file_name: source_file_name.into(),
            item_count: 0,
            processing_seconds: 0.0,
            items: Vec::new(),
            provider_label: ERROR_PROVIDER_LABEL.to_string(),
            succeeded: false,
            error_message: Some(message.into()),
            reported_total: None,
            completed_at: OffsetDateTime::now_utc(),
        }
    }

    /// Successful but nothing found.
    pub fn is_empty(&self) -> bool {
        self.succeeded && self.item_count == 0
    }

    /// Distinct categories among detected items, in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for item in &self.items {
            if !seen.contains(&item.category.as_str()) {
                seen.push(&item.category);
            }
        }
        seen
    }

    /// Sum of per-item counts.
    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|item| item.count as u64).sum()
    }
}
