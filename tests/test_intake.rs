mod common;

use common::*;
use shelfscan::intake::load_image;

#[tokio::test]
async fn test_png_from_disk_is_accepted() -> anyhow::Result<()> {
    let img_file = create_test_image();
    let image = load_image(img_file.path().to_path_buf(), IntakeSource::Dropped).await?;

    assert_eq!(image.media_type(), "image/png");
    assert_eq!(image.source(), IntakeSource::Dropped);
    assert!(image.name().ends_with(".png"));
    assert_eq!(
        image.size_bytes(),
        std::fs::metadata(img_file.path())?.len()
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_file_is_a_read_error() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let result = FileCandidate::from_path(dir.path().join("gone.png"), IntakeSource::Dropped).await;

    assert!(matches!(result, Err(shelfscan::IntakeError::Read { .. })));
    Ok(())
}

#[test]
fn test_non_image_is_rejected_and_previous_kept() {
    let mut intake = FileIntake::new();
    intake.select(photo_candidate()).expect("photo is valid");

    let err = intake.select(pdf_candidate()).unwrap_err();
    assert!(matches!(err, ValidationError::NotAnImage { ref name, .. } if name == "document.pdf"));
    assert_eq!(err.to_string(), "Please select a valid image file.");
    assert_eq!(intake.current().map(|image| image.name()), Some("photo.png"));
}

#[test]
fn test_declared_media_type_wins_over_extension() {
    // Declared type says text even though the name looks like an image.
    let candidate = FileCandidate::new("shelf.jpg", b"plain".to_vec(), IntakeSource::Picked)
        .with_media_type("text/plain");
    assert!(FileIntake::validate(candidate).is_err());

    let candidate = FileCandidate::new("scan.bin", b"raw".to_vec(), IntakeSource::Picked)
        .with_media_type("Image/WebP");
    let image = FileIntake::validate(candidate).expect("declared image type is accepted");
    assert_eq!(image.media_type(), "Image/WebP");
}

#[test]
fn test_select_replaces_held_image() {
    let mut intake = FileIntake::new();
    intake.select(photo_candidate()).expect("photo is valid");
    let second = FileCandidate::new("aisle.jpg", b"jpeg".to_vec(), IntakeSource::Dropped);
    intake.select(second).expect("jpg is valid by extension");

    let held = intake.current().expect("an image is held");
    assert_eq!(held.name(), "aisle.jpg");
    assert_eq!(held.media_type(), "image/jpeg");
}

#[test]
fn test_reset_is_idempotent() {
    let mut intake = FileIntake::new();
    intake.select(photo_candidate()).expect("photo is valid");
    intake.reset();
    intake.reset();
    assert!(intake.current().is_none());
    assert!(intake.take().is_none());
}

#[tokio::test]
async fn test_drop_and_picker_produce_the_same_image() -> anyhow::Result<()> {
    let img_file = create_test_image();
    let name = img_file
        .path()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .expect("temp file has a name");

    let dropped = FileCandidate::from_path(img_file.path(), IntakeSource::Dropped).await?;
    // The file dialog hands over a name and bytes, with no declared type.
    let picked = FileCandidate::new(name, std::fs::read(img_file.path())?, IntakeSource::Picked);

    let dropped = FileIntake::validate(dropped)?;
    let picked = FileIntake::validate(picked)?;

    assert_eq!(dropped.name(), picked.name());
    assert_eq!(dropped.size_bytes(), picked.size_bytes());
    assert_eq!(dropped.media_type(), picked.media_type());
    assert_eq!(dropped.bytes(), picked.bytes());
    assert_eq!(dropped.source(), IntakeSource::Dropped);
    assert_eq!(picked.source(), IntakeSource::Picked);
    Ok(())
}
