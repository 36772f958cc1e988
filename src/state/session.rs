/// Edit session state machine
///
/// Owns the original upload, the currently displayed result and the edit
/// log. A submit is split in two so the presentation layer can run the
/// request on its own executor:
///
/// 1. `begin_submit` checks the guards, picks the source image and flips the
///    session to `Processing`, returning the request to dispatch.
/// 2. `complete` takes the outcome back, tagged with the request's ticket.
///
/// Only the ticket of the one outstanding request is accepted, so a response
/// that arrives after the session was closed (or from another session) is
/// dropped instead of being applied.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::data::{EditHistoryEntry, ImageAsset};
use super::history::HistoryStore;
use crate::codec::InlineImage;
use crate::error::{RequestError, SessionError, ValidationError, GENERIC_EDIT_FAILURE};
use crate::gemini::ImageEditor;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

/// Identifies one dispatched request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub session: SessionId,
    seq: u64,
}

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditStatus {
    #[default]
    Idle,
    Processing,
    Success,
    Error,
}

/// Everything needed to run one edit outside the session
#[derive(Debug, Clone)]
pub struct EditRequest {
    pub ticket: RequestTicket,
    pub source: InlineImage,
    pub instruction: String,
}

/// What `complete` did with an outcome
#[derive(Debug, Clone)]
pub enum Completion {
    /// The result is now displayed and logged
    Applied(Arc<EditHistoryEntry>),
    /// The session is in `Error` with this message
    Failed(String),
    /// The ticket was not the outstanding request; nothing changed
    Discarded,
}

#[derive(Debug)]
struct InFlight {
    ticket: RequestTicket,
    source_display_form: String,
    instruction: String,
}

#[derive(Debug)]
pub struct EditSession {
    id: SessionId,
    original: Arc<ImageAsset>,
    /// `None` means the original is shown
    current: Option<Arc<ImageAsset>>,
    status: EditStatus,
    pending_instruction: String,
    last_error: Option<String>,
    history: HistoryStore,
    in_flight: Option<InFlight>,
    next_seq: u64,
}

impl EditSession {
    /// Start a session on a freshly uploaded image
    pub fn new(original: ImageAsset) -> Self {
        let id = SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(session = id.0, mime_type = %original.mime_type(), "session started");
        Self {
            id,
            original: Arc::new(original),
            current: None,
            status: EditStatus::Idle,
            pending_instruction: String::new(),
            last_error: None,
            history: HistoryStore::new(),
            in_flight: None,
            next_seq: 0,
        }
    }

    // ========== Queries ==========

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn status(&self) -> EditStatus {
        self.status
    }

    pub fn original(&self) -> &Arc<ImageAsset> {
        &self.original
    }

    pub fn current(&self) -> Option<&Arc<ImageAsset>> {
        self.current.as_ref()
    }

    /// The image on screen: the current result, or the original
    pub fn displayed_asset(&self) -> &Arc<ImageAsset> {
        self.current.as_ref().unwrap_or(&self.original)
    }

    pub fn is_showing_original(&self) -> bool {
        self.current.is_none()
    }

    /// True when `entry`'s result is what is currently displayed
    pub fn is_entry_displayed(&self, entry: &EditHistoryEntry) -> bool {
        self.current
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &entry.result))
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn pending_instruction(&self) -> &str {
        &self.pending_instruction
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_processing(&self) -> bool {
        self.status == EditStatus::Processing
    }

    /// Whether a submit would dispatch right now
    pub fn can_submit(&self) -> bool {
        !self.is_processing() && !self.pending_instruction.trim().is_empty()
    }

    // ========== Transitions ==========

    pub fn set_instruction(&mut self, instruction: impl Into<String>) {
        self.pending_instruction = instruction.into();
    }

    /// Guard, pick the source image and enter `Processing`.
    ///
    /// Rejected (with no state change) while another request is outstanding
    /// or when the instruction is blank. The source is the current result if
    /// there is one, otherwise the original.
    pub fn begin_submit(&mut self) -> Result<EditRequest, SessionError> {
        if self.is_processing() {
            tracing::debug!(session = self.id.0, "submit rejected, request already in flight");
            return Err(SessionError::Busy);
        }

        if self.pending_instruction.trim().is_empty() {
            return Err(ValidationError::EmptyInstruction.into());
        }
        // Sent and recorded exactly as typed
        let instruction = self.pending_instruction.clone();

        let source_asset = Arc::clone(self.displayed_asset());
        let source = match source_asset.to_inline() {
            Ok(source) => source,
            Err(e) => {
                let err = SessionError::from(e);
                tracing::warn!(session = self.id.0, error = ?err, "source image could not be decoded");
                self.status = EditStatus::Error;
                self.last_error = Some(err.to_string());
                return Err(err);
            }
        };

        self.next_seq += 1;
        let ticket = RequestTicket {
            session: self.id,
            seq: self.next_seq,
        };

        self.status = EditStatus::Processing;
        self.last_error = None;
        self.in_flight = Some(InFlight {
            ticket,
            source_display_form: source_asset.display_form().to_string(),
            instruction: instruction.clone(),
        });

        tracing::debug!(
            session = self.id.0,
            seq = ticket.seq,
            from_original = self.current.is_none(),
            "edit dispatched"
        );

        Ok(EditRequest {
            ticket,
            source,
            instruction,
        })
    }

    /// Apply the outcome of the request identified by `ticket`
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<InlineImage, RequestError>,
    ) -> Completion {
        let matches = self
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.ticket == ticket);
        if !matches {
            tracing::warn!(
                session = self.id.0,
                ticket_session = ticket.session.0,
                seq = ticket.seq,
                "discarding stale edit response"
            );
            return Completion::Discarded;
        }
        let Some(in_flight) = self.in_flight.take() else {
            return Completion::Discarded;
        };

        let result = outcome.and_then(|inline| {
            ImageAsset::from_inline(&inline)
                .map_err(|e| RequestError::InvalidResponse(e.to_string()))
        });

        match result {
            Ok(asset) => {
                let asset = Arc::new(asset);
                let entry = self.history.new_entry(
                    in_flight.source_display_form,
                    Arc::clone(&asset),
                    in_flight.instruction,
                );
                let entry = self.history.append(entry);
                self.current = Some(asset);
                self.status = EditStatus::Success;

                tracing::info!(
                    session = self.id.0,
                    entry = entry.id,
                    history_len = self.history.len(),
                    "edit applied"
                );
                Completion::Applied(entry)
            }
            Err(err) => {
                let mut message = err.to_string();
                if message.trim().is_empty() {
                    message = GENERIC_EDIT_FAILURE.to_string();
                }
                tracing::warn!(session = self.id.0, error = ?err, "edit failed");

                self.status = EditStatus::Error;
                self.last_error = Some(message.clone());
                Completion::Failed(message)
            }
        }
    }

    /// Run one full submit against `editor`
    pub async fn submit(&mut self, editor: &dyn ImageEditor) -> Result<Completion, SessionError> {
        let request = self.begin_submit()?;
        let outcome = editor
            .request_edit(&request.source, &request.instruction)
            .await;
        Ok(self.complete(request.ticket, outcome))
    }

    /// Show the original again and clear the instruction.
    ///
    /// Not forbidden while a request is in flight; callers should disable it.
    pub fn restore_original(&mut self) {
        tracing::debug!(session = self.id.0, "restored original");
        self.current = None;
        self.pending_instruction.clear();
    }

    /// Show a past result and load its instruction. The log is untouched.
    pub fn restore_entry(&mut self, entry_id: u64) -> bool {
        let Some(entry) = self.history.get(entry_id) else {
            return false;
        };
        self.current = Some(Arc::clone(&entry.result));
        self.pending_instruction = entry.instruction.clone();
        tracing::debug!(session = self.id.0, entry = entry_id, "restored history entry");
        true
    }

    /// End the session. Any outstanding response will no longer match.
    pub fn close(self) {
        tracing::debug!(
            session = self.id.0,
            history_len = self.history.len(),
            abandoned_request = self.in_flight.is_some(),
            "session closed"
        );
    }
}
