/// Download boundary
///
/// Writes the displayed result to disk as `nanoedit-<unix millis>.<ext>`.
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::ImageFormat;

use crate::error::DownloadError;
use crate::state::ImageAsset;

const FILE_PREFIX: &str = "nanoedit";
const FALLBACK_EXTENSION: &str = "png";

/// File extension for a MIME type, `png` when unknown
pub fn extension_for(mime_type: &str) -> &'static str {
    ImageFormat::from_mime_type(mime_type)
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or(FALLBACK_EXTENSION)
}

/// Timestamped file name for a download
pub fn download_file_name(mime_type: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}-{}.{}",
        FILE_PREFIX,
        now.timestamp_millis(),
        extension_for(mime_type)
    )
}

/// Save an asset into `dir`, returning the written path
pub async fn save_asset(asset: Arc<ImageAsset>, dir: PathBuf) -> Result<PathBuf, DownloadError> {
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|source| DownloadError::Io {
            path: dir.clone(),
            source,
        })?;

    let path = dir.join(download_file_name(asset.mime_type(), Utc::now()));
    tokio::fs::write(&path, asset.raw_bytes())
        .await
        .map_err(|source| DownloadError::Io {
            path: path.clone(),
            source,
        })?;

    tracing::info!(path = %path.display(), size = asset.raw_bytes().len(), "saved image");
    Ok(path)
}
