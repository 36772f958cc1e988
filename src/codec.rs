/// Binary-to-text codec for image payloads
///
/// Images travel through the editor in two shapes:
/// - raw base64 payload + MIME type (what the image model consumes and returns)
/// - a data URL (`data:<mime>;base64,<payload>`), the self-describing display form
///
/// `decode(encode(bytes, mime))` always yields the base64 of `bytes` and `mime`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::DecodeError;

/// MIME type assumed when the model omits one
pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// Base64 payload plus its MIME type, the form the image model speaks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// Base64 text of the raw bytes (no data URL header)
    pub data: String,
    pub mime_type: String,
}

impl InlineImage {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Decode the payload back into raw bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, DecodeError> {
        BASE64
            .decode(self.data.as_bytes())
            .map_err(|e| DecodeError::InvalidPayload(e.to_string()))
    }

    /// Display form of this payload
    pub fn to_display_form(&self) -> String {
        wrap_payload(&self.data, &self.mime_type)
    }
}

/// Encode raw bytes into base64 text
pub fn text_encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Encode raw bytes and a MIME type into a display form
pub fn encode(bytes: &[u8], mime_type: &str) -> String {
    wrap_payload(&text_encode(bytes), mime_type)
}

/// Build a display form around an already-encoded payload
fn wrap_payload(data: &str, mime_type: &str) -> String {
    format!("data:{mime_type};base64,{data}")
}

/// Split a display form into its base64 payload and MIME type
///
/// Fails when there is no `,` separating header and payload, or when the
/// header carries no `:<mime>;` marker. An empty payload is a valid
/// zero-length image, and MIME parameters such as `;charset=utf-8` are kept
/// so that `encode` round-trips them.
pub fn decode(display_form: &str) -> Result<InlineImage, DecodeError> {
    let (header, payload) = display_form
        .split_once(',')
        .ok_or(DecodeError::MissingSeparator)?;

    let mime_type = mime_type_of(header).ok_or(DecodeError::MissingMimeType)?;

    Ok(InlineImage::new(payload, mime_type))
}

/// Decode a display form all the way down to raw bytes
pub fn decode_bytes(display_form: &str) -> Result<(Vec<u8>, String), DecodeError> {
    let inline = decode(display_form)?;
    let bytes = inline.to_bytes()?;
    Ok((bytes, inline.mime_type))
}

/// Extract the MIME type from a display form (or just its header)
///
/// The MIME type sits between the first `:` and the last `;` of the header,
/// which is the one introducing the encoding marker.
pub fn mime_type_of(display_form: &str) -> Option<&str> {
    let header = display_form
        .split_once(',')
        .map_or(display_form, |(header, _)| header);
    let (_, rest) = header.split_once(':')?;
    let (mime, _) = rest.rsplit_once(';')?;
    if mime.is_empty() {
        None
    } else {
        Some(mime)
    }
}
