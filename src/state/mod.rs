/// State management module
///
/// This module handles all editing state, including:
/// - Image assets and history records (data.rs)
/// - The append-only edit log (history.rs)
/// - The edit session lifecycle and single-flight guard (session.rs)

pub mod data;
pub mod history;
pub mod session;

pub use data::{EditHistoryEntry, ImageAsset};
pub use history::HistoryStore;
pub use session::{EditRequest, EditSession, EditStatus, RequestTicket, SessionId};
