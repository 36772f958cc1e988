/// Image model integration module
///
/// This module handles:
/// - The `ImageEditor` seam the session dispatches edits through
/// - The Gemini `generateContent` client behind it
/// - The JSON wire types of that call
///
/// Architecture:
/// - `client.rs` - trait, HTTP client and response interpretation
/// - `types.rs` - serde request/response structs

pub mod client;
pub mod types;

pub use client::{GeminiClient, ImageEditor};
