use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("OCR engine returned an unreadable response: {0}")]
    InvalidResponse(String),
}

/// Abstraction over an OCR engine.
/// Implementations accept raw image bytes and return the engine's JSON
/// response (parsed results with word overlays).
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<Value, OcrError>;
}

/// Fail when the engine flags its own response as errored
/// (`IsErroredOnProcessing`), carrying the engine's `ErrorMessage`.
pub fn check_engine_status(response: &Value) -> Result<(), OcrError> {
    if response.get("IsErroredOnProcessing").and_then(Value::as_bool) != Some(true) {
        return Ok(());
    }
    let message = match response.get("ErrorMessage") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("; "),
        _ => String::new(),
    };
    let message = if message.is_empty() { "unknown error".to_string() } else { message };
    Err(OcrError::Engine(message))
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set response regardless of the image.
pub struct MockRecognizer {
    pub response: Value,
}

impl MockRecognizer {
    pub fn new(response: Value) -> Self {
        Self { response }
    }

    /// Build from the JSON text of a saved engine response.
    pub fn from_json_str(json: &str) -> Result<Self, OcrError> {
        let response =
            serde_json::from_str(json).map_err(|e| OcrError::InvalidResponse(e.to_string()))?;
        Ok(Self { response })
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<Value, OcrError> {
        Ok(self.response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mock_returns_preset_response() {
        let r = MockRecognizer::new(json!({ "ParsedResults": [] }));
        assert_eq!(r.recognize(b"fake image data").unwrap(), json!({ "ParsedResults": [] }));
        assert_eq!(r.recognize(b"").unwrap(), json!({ "ParsedResults": [] }));
    }

    #[test]
    fn engine_status_ok_when_not_errored() {
        assert!(check_engine_status(&json!({ "IsErroredOnProcessing": false })).is_ok());
        assert!(check_engine_status(&json!({ "ParsedResults": [] })).is_ok());
    }

    #[test]
    fn engine_status_carries_error_message() {
        let err = check_engine_status(&json!({
            "IsErroredOnProcessing": true,
            "ErrorMessage": ["File failed validation", "Timed out"]
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "OCR engine error: File failed validation; Timed out");

        let err = check_engine_status(&json!({ "IsErroredOnProcessing": true, "ErrorMessage": "" }))
            .unwrap_err();
        assert_eq!(err.to_string(), "OCR engine error: unknown error");
    }

    #[test]
    fn from_json_str_rejects_invalid_json() {
        assert!(matches!(
            MockRecognizer::from_json_str("{not json"),
            Err(OcrError::InvalidResponse(_))
        ));
        assert!(MockRecognizer::from_json_str(r#"{"OCRExitCode": 1}"#).is_ok());
    }
}
