/// Upload boundary
///
/// Turns a file on disk into the `ImageAsset` a session starts from.
/// The declared content type comes from the file extension; anything that
/// does not map to an `image/*` type is rejected before the file is read.

use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::error::{UploadError, ValidationError};
use crate::state::ImageAsset;

/// Extensions offered by the file picker
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp"];

/// MIME type declared by a file's extension, if it is an image type
pub fn declared_mime_type(path: &Path) -> Result<&'static str, ValidationError> {
    let not_an_image = |detected: String| ValidationError::NotAnImage {
        path: path.to_path_buf(),
        detected,
    };

    let format = ImageFormat::from_path(path).map_err(|_| {
        let detected = path
            .extension()
            .map(|ext| format!("a .{} file", ext.to_string_lossy()))
            .unwrap_or_else(|| "a file without extension".to_string());
        not_an_image(detected)
    })?;

    let mime_type = format.to_mime_type();
    if mime_type.starts_with("image/") {
        Ok(mime_type)
    } else {
        Err(not_an_image(mime_type.to_string()))
    }
}

/// Read an image file into an asset
pub async fn load_image(path: PathBuf) -> Result<ImageAsset, UploadError> {
    let mime_type = declared_mime_type(&path)?;

    let bytes = tokio::fs::read(&path).await.map_err(|source| UploadError::Io {
        path: path.clone(),
        source,
    })?;

    if bytes.is_empty() {
        return Err(ValidationError::NotAnImage {
            path,
            detected: "an empty file".to_string(),
        }
        .into());
    }

    tracing::info!(
        path = %path.display(),
        mime_type,
        size = bytes.len(),
        "loaded image"
    );
    Ok(ImageAsset::new(bytes, mime_type))
}

/// Show the native file picker
pub async fn pick_image() -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title("Select an Image to Edit")
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_mime_type() {
        assert_eq!(declared_mime_type(Path::new("cat.png")), Ok("image/png"));
        assert_eq!(declared_mime_type(Path::new("cat.JPG")), Ok("image/jpeg"));
        assert_eq!(declared_mime_type(Path::new("cat.webp")), Ok("image/webp"));
    }

    #[test]
    fn test_non_image_rejected() {
        let err = declared_mime_type(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, ValidationError::NotAnImage { .. }));
        assert!(err.to_string().starts_with("Please upload a valid image file"));

        assert!(declared_mime_type(Path::new("Makefile")).is_err());
    }

    #[tokio::test]
    async fn test_load_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        std::fs::write(&path, b"\x89PNG fake").unwrap();

        let asset = load_image(path).await.unwrap();
        assert_eq!(asset.mime_type(), "image/png");
        assert_eq!(asset.raw_bytes(), b"\x89PNG fake");
        assert!(asset.display_form().starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_load_rejects_before_reading() {
        // file does not exist: validation must fail first, not I/O
        let result = load_image(PathBuf::from("/nonexistent/notes.txt")).await;
        assert!(matches!(result, Err(UploadError::Validation(_))));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = load_image(PathBuf::from("/nonexistent/cat.png")).await;
        assert!(matches!(result, Err(UploadError::Io { .. })));
    }

    #[tokio::test]
    async fn test_load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        std::fs::write(&path, b"").unwrap();

        let result = load_image(path).await;
        assert!(matches!(result, Err(UploadError::Validation(_))));
    }
}
