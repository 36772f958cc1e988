/// Shared data structures for the editing state
///
/// These structs represent the data model that flows between
/// the session, the history log and the UI layer. All of them
/// are immutable once built and shared through `Arc`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::codec::{self, InlineImage};
use crate::error::DecodeError;

static NEXT_ASSET_ID: AtomicU64 = AtomicU64::new(1);

/// A single immutable image instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Process-unique identity, used by the UI to cache decoded previews
    id: u64,
    /// Encoded file bytes (PNG, JPEG, ...)
    raw_bytes: Vec<u8>,
    /// MIME type (e.g., "image/png")
    mime_type: String,
    /// Data URL derived from `raw_bytes` + `mime_type`
    display_form: String,
}

impl ImageAsset {
    /// Build an asset from raw file bytes
    pub fn new(raw_bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        let display_form = codec::encode(&raw_bytes, &mime_type);
        Self {
            id: NEXT_ASSET_ID.fetch_add(1, Ordering::Relaxed),
            raw_bytes,
            mime_type,
            display_form,
        }
    }

    /// Build an asset from a base64 payload returned by the image model
    ///
    /// The payload is already base64, so the display form wraps it as-is
    /// instead of encoding the decoded bytes a second time.
    pub fn from_inline(inline: &InlineImage) -> Result<Self, DecodeError> {
        let raw_bytes = inline.to_bytes()?;
        Ok(Self {
            id: NEXT_ASSET_ID.fetch_add(1, Ordering::Relaxed),
            raw_bytes,
            mime_type: inline.mime_type.clone(),
            display_form: inline.to_display_form(),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn display_form(&self) -> &str {
        &self.display_form
    }

    /// Payload in the shape the image model expects
    pub fn to_inline(&self) -> Result<InlineImage, DecodeError> {
        codec::decode(&self.display_form)
    }
}

/// Immutable record of one completed edit
#[derive(Debug, Clone)]
pub struct EditHistoryEntry {
    /// Unique, increasing in creation order
    pub id: u64,
    /// Display form of the image the edit was applied to
    pub source_display_form: String,
    /// The image the model produced
    pub result: Arc<ImageAsset>,
    /// The instruction that produced `result`
    pub instruction: String,
    pub created_at: DateTime<Utc>,
}
