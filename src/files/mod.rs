/// File boundary module
///
/// This module handles:
/// - Picking and reading an image to start a session (upload.rs)
/// - Writing the displayed result to the downloads folder (download.rs)

pub mod download;
pub mod upload;
