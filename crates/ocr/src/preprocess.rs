use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::keywords::OVERLAY_FIELDS;
use crate::types::WordToken;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("OCR response has no text overlay (TextOverlay/Overlay)")]
    MissingOverlay,
    #[error("Malformed OCR response: {0}")]
    Malformed(String),
    #[error("OCR response contains no words")]
    NoWords,
}

impl ExtractionError {
    /// Message shown to the user when a receipt upload cannot be read.
    pub fn user_message(&self) -> &'static str {
        match self {
            ExtractionError::MissingOverlay => "JSON에 텍스트 데이터(Overlay/TextOverlay)가 없습니다.",
            ExtractionError::Malformed(_) => "데이터 형식이 올바르지 않습니다.",
            ExtractionError::NoWords => "텍스트 데이터가 없습니다.",
        }
    }
}

#[derive(Debug, Deserialize)]
struct OverlayLine {
    #[serde(rename = "Words")]
    words: Vec<WordToken>,
}

/// Flatten an OCR response into one token list, in line order.
///
/// Expects `ParsedResults[0]` to carry `TextOverlay` or `Overlay`, each
/// holding `Lines[].Words[]`.
pub fn flatten_words(response: &Value) -> Result<Vec<WordToken>, ExtractionError> {
    let first = response
        .get("ParsedResults")
        .and_then(|results| results.get(0))
        .ok_or_else(|| ExtractionError::Malformed("missing ParsedResults[0]".into()))?;

    let overlay = OVERLAY_FIELDS
        .iter()
        .find_map(|field| first.get(*field))
        .ok_or(ExtractionError::MissingOverlay)?;

    let lines = overlay
        .get("Lines")
        .ok_or_else(|| ExtractionError::Malformed("overlay has no Lines".into()))?;
    let lines = Vec::<OverlayLine>::deserialize(lines)
        .map_err(|e| ExtractionError::Malformed(e.to_string()))?;

    let words: Vec<WordToken> = lines.into_iter().flat_map(|line| line.words).collect();

    if let Some(bad) = words.iter().find(|w| w.width < 0.0 || w.height < 0.0) {
        return Err(ExtractionError::Malformed(format!(
            "negative box size for word '{}'",
            bad.text
        )));
    }
    if words.is_empty() {
        return Err(ExtractionError::NoWords);
    }
    Ok(words)
}
