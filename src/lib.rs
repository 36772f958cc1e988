//! NanoEdit core
//!
//! Everything below the presentation layer: the data URL codec, the image
//! model client, the edit session state machine with its history log, and
//! the upload/download file boundaries.

pub mod codec;
pub mod config;
pub mod error;
pub mod files;
pub mod gemini;
pub mod state;
