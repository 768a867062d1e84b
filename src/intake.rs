//! File intake: turns a dropped or picked file into a validated [`PendingImage`].

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use image::ImageFormat;
use tracing::{debug, warn};

use crate::{
    error::{IntakeError, ValidationError},
    models::{IntakeSource, PendingImage},
};

const IMAGE_PREFIX: &str = "image/";
const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// A file offered by the user, not yet validated.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub name: String,
    pub bytes: Arc<[u8]>,
    /// Declared media type, if the surface supplied one.
    pub media_type: Option<String>,
    pub source: IntakeSource,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>, source: IntakeSource) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            media_type: None,
            source,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Read a candidate from disk. The media type is left to inference.
    pub async fn from_path<P: AsRef<Path>>(
        path: P,
        source: IntakeSource,
    ) -> Result<Self, IntakeError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| IntakeError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(display_name(path), bytes, source))
    }

    /// The declared media type, or one inferred from content then extension.
    pub fn resolved_media_type(&self) -> String {
        if let Some(declared) = self.media_type.as_deref().filter(|m| !m.trim().is_empty()) {
            return declared.trim().to_string();
        }
        infer_media_type(&self.name, &self.bytes).to_string()
    }
}

/// Infer a media type with the `image` crate: magic bytes first, then extension.
pub fn infer_media_type(name: &str, bytes: &[u8]) -> &'static str {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type();
    }
    Path::new(name)
        .extension()
        .and_then(ImageFormat::from_extension)
        .map(|format| format.to_mime_type())
        .unwrap_or(UNKNOWN_MEDIA_TYPE)
}

fn is_image_media_type(media_type: &str) -> bool {
    media_type
        .get(..IMAGE_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(IMAGE_PREFIX))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Holds at most one validated image. Drop and picker events both go
/// through [`FileIntake::select`].
#[derive(Debug, Default)]
pub struct FileIntake {
    current: Option<PendingImage>,
}

impl FileIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a candidate without holding it.
    pub fn validate(candidate: FileCandidate) -> Result<PendingImage, ValidationError> {
        let media_type = candidate.resolved_media_type();
        if !is_image_media_type(&media_type) {
            warn!(
                name = %candidate.name,
                media_type = %media_type,
                "Rejected non-image file"
            );
            return Err(ValidationError::NotAnImage {
                name: candidate.name,
                media_type,
            });
        }

        debug!(
            name = %candidate.name,
            media_type = %media_type,
            size_bytes = candidate.bytes.len(),
            source = ?candidate.source,
            "Accepted image"
        );
        Ok(PendingImage {
            bytes: candidate.bytes,
            name: candidate.name,
            media_type,
            source: candidate.source,
        })
    }

    /// Validate and hold a candidate, replacing any previous image.
    /// On failure the previously held image is kept.
    pub fn select(&mut self, candidate: FileCandidate) -> Result<&PendingImage, ValidationError> {
        let image = Self::validate(candidate)?;
        let held = self.current.insert(image);
        Ok(&*held)
    }

    pub fn current(&self) -> Option<&PendingImage> {
        self.current.as_ref()
    }

    pub fn take(&mut self) -> Option<PendingImage> {
        self.current.take()
    }

    /// Discard the held image. Idempotent.
    pub fn reset(&mut self) {
        self.current = None;
    }
}

/// Read a path and validate it in one step.
pub async fn load_image(path: PathBuf, source: IntakeSource) -> Result<PendingImage, IntakeError> {
    let candidate = FileCandidate::from_path(&path, source).await?;
    Ok(FileIntake::validate(candidate)?)
}
