//! Result normalization.
//!
//! The detection service answers with loosely shaped JSON: any field may be
//! missing or carry the wrong type, and several providers name fields
//! differently. A field of the wrong type is read as absent, and everything
//! is defaulted here so renderers never branch on an absent field.
//!
//! | field          | default                        |
//! |----------------|--------------------------------|
//! | `id`           | position + 1                   |
//! | `count`        | 1 (clamped to at least 1)      |
//! | `confidence`   | 0.5, clamped into `0.0..=1.0`  |
//! | `label`        | `Detected product {position+1}`|
//! | `category`     | `General Merchandise`          |
//! | `bounding_box` | none                           |
//! | processing     | 0 seconds                      |
//! | provider       | `Backend AI Service`           |

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::debug;

use crate::{
    client::{DetectionOutcome, TransportFailure},
    models::{
        BoundingBox, DEFAULT_CATEGORY, DEFAULT_CONFIDENCE, DEFAULT_PROVIDER_LABEL, DetectedItem,
        DetectionResult,
    },
};

const REPORTED_FAILURE: &str = "Detection service reported a failure";

/// Detection response as sent by the service, before defaults.
///
/// Every field is read leniently: a value of the wrong type or shape is
/// treated as absent instead of failing the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawDetectionPayload {
    #[serde(
        default,
        alias = "detected_products",
        alias = "items",
        deserialize_with = "lenient_entries"
    )]
    pub entries: Option<Vec<RawDetectedEntry>>,
    #[serde(
        default,
        alias = "total_products_detected",
        deserialize_with = "lenient_unsigned"
    )]
    pub total: Option<u64>,
    #[serde(default, alias = "processing_time", deserialize_with = "lenient")]
    pub processing_seconds: Option<f64>,
    #[serde(default, alias = "api_source", deserialize_with = "lenient")]
    pub provider: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub success: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawDetectedEntry {
    #[serde(default, alias = "product_id", deserialize_with = "lenient_unsigned")]
    pub id: Option<u64>,
    /// Signed on the wire: upstream arithmetic can produce zero or less.
    #[serde(default, alias = "detected_count", deserialize_with = "lenient_signed")]
    pub count: Option<i64>,
    #[serde(default, alias = "confidence_score", deserialize_with = "lenient")]
    pub confidence: Option<f32>,
    #[serde(default, alias = "message", deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub category: Option<String>,
    #[serde(
        default,
        alias = "bbox",
        alias = "boundingBox",
        deserialize_with = "lenient"
    )]
    pub bounding_box: Option<RawBoundingBox>,
}

/// Either `[x1, y1, x2, y2]` corners or an explicit rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawBoundingBox {
    Corners([f32; 4]),
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            debug!(%value, "Ignoring field with unexpected shape: {}", e);
            Ok(None)
        }
    }
}

/// Whole number from an integer or a float, rounded.
fn whole_number(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .filter(|number| number.is_finite())
        .map(f64::round)
}

fn lenient_unsigned<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = value.as_u64().or_else(|| {
        whole_number(&value)
            .filter(|number| *number >= 0.0)
            .map(|number| number as u64)
    });
    if parsed.is_none() && !value.is_null() {
        debug!(%value, "Ignoring non-numeric or negative value");
    }
    Ok(parsed)
}

fn lenient_signed<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = value
        .as_i64()
        .or_else(|| whole_number(&value).map(|number| number as i64));
    if parsed.is_none() && !value.is_null() {
        debug!(%value, "Ignoring non-numeric value");
    }
    Ok(parsed)
}

/// Entries that are not objects are skipped; a non-list is treated as absent.
fn lenient_entries<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<RawDetectedEntry>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(values) => Ok(Some(
            values
                .into_iter()
                .filter_map(|value| match RawDetectedEntry::deserialize(&value) {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        debug!(%value, "Skipping detection entry: {}", e);
                        None
                    }
                })
                .collect(),
        )),
        Value::Null => Ok(None),
        other => {
            debug!(value = %other, "Ignoring entries that are not a list");
            Ok(None)
        }
    }
}

impl From<RawBoundingBox> for BoundingBox {
    fn from(raw: RawBoundingBox) -> Self {
        match raw {
            RawBoundingBox::Corners([x1, y1, x2, y2]) => BoundingBox::from_corners(x1, y1, x2, y2),
            RawBoundingBox::Rect {
                x,
                y,
                width,
                height,
            } => BoundingBox {
                x,
                y,
                width: width.max(0.0),
                height: height.max(0.0),
            },
        }
    }
}

/// Turn one submission outcome into a canonical result.
pub fn normalize(outcome: DetectionOutcome, file_name: &str) -> DetectionResult {
    match outcome {
        DetectionOutcome::Success(payload) => normalize_payload(payload, file_name),
        DetectionOutcome::TransportFailure(failure) => normalize_failure(failure, file_name),
    }
}

pub fn normalize_failure(failure: TransportFailure, file_name: &str) -> DetectionResult {
    DetectionResult::failed(file_name, failure.message)
}

pub fn normalize_payload(payload: RawDetectionPayload, file_name: &str) -> DetectionResult {
    if payload.success == Some(false) {
        let message = payload
            .error
            .unwrap_or_else(|| REPORTED_FAILURE.to_string());
        return DetectionResult::failed(file_name, message);
    }

    let items: Vec<DetectedItem> = payload
        .entries
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, entry)| normalize_entry(index, entry))
        .collect();

    DetectionResult {
        source_file_name: file_name.to_string(),
        item_count: items.len(),
        processing_seconds: normalize_seconds(payload.processing_seconds),
        items,
        provider_label: payload
            .provider
            .unwrap_or_else(|| DEFAULT_PROVIDER_LABEL.to_string()),
        succeeded: true,
        error_message: None,
        reported_total: payload.total,
        completed_at: OffsetDateTime::now_utc(),
    }
}

fn normalize_entry(index: usize, entry: RawDetectedEntry) -> DetectedItem {
    let position = index as u64 + 1;
    DetectedItem {
        id: entry.id.unwrap_or(position),
        count: entry.count.unwrap_or(1).clamp(1, i64::from(u32::MAX)) as u32,
        confidence: normalize_confidence(entry.confidence),
        label: entry
            .label
            .unwrap_or_else(|| format!("Detected product {}", position)),
        category: entry
            .category
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        bounding_box: entry.bounding_box.map(BoundingBox::from),
    }
}

fn normalize_confidence(raw: Option<f32>) -> f32 {
    match raw {
        Some(value) if !value.is_nan() => value.clamp(0.0, 1.0),
        _ => DEFAULT_CONFIDENCE,
    }
}

fn normalize_seconds(raw: Option<f64>) -> f64 {
    match raw {
        Some(value) if !value.is_nan() => value.max(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(normalize_confidence(Some(1.7)), 1.0);
        assert_eq!(normalize_confidence(Some(-0.2)), 0.0);
        assert_eq!(normalize_confidence(Some(f32::NAN)), DEFAULT_CONFIDENCE);
        assert_eq!(normalize_confidence(None), DEFAULT_CONFIDENCE);
        assert_eq!(normalize_confidence(Some(0.0)), 0.0);
    }

    #[test]
    fn zero_count_is_raised_to_one() {
        let item = normalize_entry(
            0,
            RawDetectedEntry {
                count: Some(0),
                ..Default::default()
            },
        );
        assert_eq!(item.count, 1);
    }

    #[test]
    fn negative_processing_time_becomes_zero() {
        assert_eq!(normalize_seconds(Some(-3.0)), 0.0);
        assert_eq!(normalize_seconds(Some(f64::NAN)), 0.0);
        assert_eq!(normalize_seconds(Some(2.5)), 2.5);
    }
}
