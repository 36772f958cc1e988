/// Error taxonomy for the editor
///
/// Every failure is recovered at the session boundary and turned into
/// user-visible state. Nothing here is fatal to the process.

use std::path::PathBuf;
use thiserror::Error;

/// Fallback message when a failed edit carries no message of its own
pub const GENERIC_EDIT_FAILURE: &str = "Failed to generate image. Please try again.";

/// Input rejected before any I/O happens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please upload a valid image file ({} is {detected})", .path.display())]
    NotAnImage { path: PathBuf, detected: String },

    #[error("Please describe the edit you want to make")]
    EmptyInstruction,
}

/// A display form that cannot be taken apart again
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("display form has no payload separator")]
    MissingSeparator,

    #[error("display form has no MIME type")]
    MissingMimeType,

    #[error("display form payload is not valid base64: {0}")]
    InvalidPayload(String),
}

/// Failure of a single call to the image generation endpoint
///
/// Cloneable so it can travel inside UI messages; transport errors are
/// therefore kept as their rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("No API key configured. Set GEMINI_API_KEY to enable editing.")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Image model returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid request or response: {0}")]
    InvalidResponse(String),

    #[error("No content returned from the image model.")]
    NoContent,

    #[error("No image data found in the response.")]
    NoImage { text: Option<String> },
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RequestError::InvalidResponse(err.to_string())
        } else {
            RequestError::Transport(err.to_string())
        }
    }
}

/// Why a submit did not dispatch a request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("An edit is already in progress")]
    Busy,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unable to process source image.")]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("There is no edited image to download")]
    NothingToSave,

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
