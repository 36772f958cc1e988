/// Edit request client
///
/// One call, no retries, no local state: send the source image plus an
/// instruction to the model and pull the first inline image out of the reply.

use async_trait::async_trait;
use reqwest::StatusCode;

use super::types::{ApiErrorBody, GenerateContentRequest, GenerateContentResponse};
use crate::codec::{InlineImage, DEFAULT_MIME_TYPE};
use crate::config::Config;
use crate::error::RequestError;

/// Anything that can turn (image, instruction) into an edited image.
///
/// The session only talks to this trait, so tests can script the model.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    async fn request_edit(
        &self,
        source: &InlineImage,
        instruction: &str,
    ) -> Result<InlineImage, RequestError>;
}

/// Gemini `generateContent` client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, RequestError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

#[async_trait]
impl ImageEditor for GeminiClient {
    async fn request_edit(
        &self,
        source: &InlineImage,
        instruction: &str,
    ) -> Result<InlineImage, RequestError> {
        check_preconditions(source, instruction)?;
        let api_key = self.api_key.as_deref().ok_or(RequestError::MissingApiKey)?;

        let request = GenerateContentRequest::edit(source, instruction);

        tracing::info!(
            model = %self.model,
            mime_type = %source.mime_type,
            payload_len = source.data.len(),
            "sending edit request"
        );

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "edit request failed in transport");
                RequestError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(error = %e, "could not read error body");
                    String::new()
                }
            };
            let err = api_error(status, &body);
            tracing::warn!(status = status.as_u16(), error = %err, "image model rejected request");
            return Err(err);
        }

        let body: GenerateContentResponse = response.json().await?;
        let image = extract_image(body).map_err(|err| {
            tracing::warn!(error = ?err, "response carried no usable image");
            err
        })?;

        tracing::info!(
            mime_type = %image.mime_type,
            payload_len = image.data.len(),
            "received edited image"
        );
        Ok(image)
    }
}

/// Reject empty inputs before any I/O
pub fn check_preconditions(source: &InlineImage, instruction: &str) -> Result<(), RequestError> {
    if source.data.is_empty() {
        return Err(RequestError::InvalidResponse("source image payload is empty".into()));
    }
    if source.mime_type.is_empty() {
        return Err(RequestError::InvalidResponse("source image has no MIME type".into()));
    }
    if instruction.trim().is_empty() {
        return Err(RequestError::InvalidResponse("edit instruction is empty".into()));
    }
    Ok(())
}

/// Find the first inline image in a model response
///
/// No candidate content (or an empty part list) is `NoContent`; parts
/// without any image payload are `NoImage`, carrying whatever text the
/// model said instead.
pub fn extract_image(response: GenerateContentResponse) -> Result<InlineImage, RequestError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(RequestError::NoContent);
    };
    let finish_reason = candidate.finish_reason;
    let parts = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default();

    if parts.is_empty() {
        tracing::debug!(finish_reason = ?finish_reason, "candidate has no parts");
        return Err(RequestError::NoContent);
    }

    let mut texts = Vec::new();
    for part in parts {
        if let Some(blob) = part.inline_data {
            if !blob.data.is_empty() {
                let mime_type = if blob.mime_type.is_empty() {
                    DEFAULT_MIME_TYPE.to_string()
                } else {
                    blob.mime_type
                };
                return Ok(InlineImage::new(blob.data, mime_type));
            }
        }
        if let Some(text) = part.text {
            if !text.trim().is_empty() {
                texts.push(text);
            }
        }
    }

    let text = if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n"))
    };
    tracing::debug!(finish_reason = ?finish_reason, text = ?text, "candidate has no image part");
    Err(RequestError::NoImage { text })
}

/// Turn a non-2xx reply into a readable error
pub fn api_error(status: StatusCode, body: &str) -> RequestError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    RequestError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_first_image_part_wins() {
        let body = response(json!({
            "candidates": [{ "content": { "parts": [
                { "text": "Here you go" },
                { "inlineData": { "mimeType": "image/jpeg", "data": "Zmlyc3Q=" } },
                { "inlineData": { "mimeType": "image/png", "data": "c2Vjb25k" } }
            ] } }]
        }));

        let image = extract_image(body).unwrap();
        assert_eq!(image, InlineImage::new("Zmlyc3Q=", "image/jpeg"));
    }

    #[test]
    fn test_missing_mime_defaults_to_png() {
        let body = response(json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "AA==" } }] } }]
        }));
        assert_eq!(extract_image(body).unwrap().mime_type, DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_no_candidates_is_no_content() {
        assert_eq!(extract_image(response(json!({}))), Err(RequestError::NoContent));
        assert_eq!(
            extract_image(response(json!({ "candidates": [{ "finishReason": "SAFETY" }] }))),
            Err(RequestError::NoContent)
        );
        assert_eq!(
            extract_image(response(json!({ "candidates": [{ "content": { "parts": [] } }] }))),
            Err(RequestError::NoContent)
        );
    }

    #[test]
    fn test_text_only_is_no_image() {
        let body = response(json!({
            "candidates": [{ "content": { "parts": [
                { "text": "I can't edit this image." },
                { "inlineData": { "mimeType": "image/png", "data": "" } }
            ] } }]
        }));
        assert_eq!(
            extract_image(body),
            Err(RequestError::NoImage {
                text: Some("I can't edit this image.".into())
            })
        );
    }

    #[test]
    fn test_api_error_message() {
        let err = api_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#,
        );
        assert_eq!(
            err,
            RequestError::Api {
                status: 400,
                message: "API key not valid".into()
            }
        );

        let err = api_error(StatusCode::SERVICE_UNAVAILABLE, "<html>oops</html>");
        assert_eq!(
            err,
            RequestError::Api {
                status: 503,
                message: "Service Unavailable".into()
            }
        );
    }

    #[test]
    fn test_unreadable_error_body_falls_back_to_reason() {
        // An error body that could not be read arrives here as ""
        assert_eq!(
            api_error(StatusCode::TOO_MANY_REQUESTS, ""),
            RequestError::Api {
                status: 429,
                message: "Too Many Requests".into()
            }
        );
    }

    #[test]
    fn test_no_image_debug_keeps_model_text() {
        let body = response(json!({
            "candidates": [{
                "finishReason": "STOP",
                "content": { "parts": [{ "text": "Sorry, I can only describe it." }] }
            }]
        }));
        let err = extract_image(body).unwrap_err();

        // Display stays generic for the user; Debug (what gets logged) keeps the reply
        assert_eq!(err.to_string(), "No image data found in the response.");
        assert!(format!("{err:?}").contains("Sorry, I can only describe it."));
    }

    #[test]
    fn test_preconditions() {
        let source = InlineImage::new("AA==", "image/png");
        assert!(check_preconditions(&source, "add a hat").is_ok());
        assert!(check_preconditions(&source, "   ").is_err());
        assert!(check_preconditions(&InlineImage::new("", "image/png"), "x").is_err());
        assert!(check_preconditions(&InlineImage::new("AA==", ""), "x").is_err());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let config = Config {
            endpoint: "http://127.0.0.1:9".into(),
            ..Config::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        assert!(!client.has_api_key());

        let result = client
            .request_edit(&InlineImage::new("AA==", "image/png"), "add a hat")
            .await;
        assert_eq!(result, Err(RequestError::MissingApiKey));
    }

    #[test]
    fn test_url() {
        let config = Config {
            endpoint: "http://localhost:1234".into(),
            model: "m".into(),
            ..Config::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(client.url(), "http://localhost:1234/v1beta/models/m:generateContent");
    }
}
