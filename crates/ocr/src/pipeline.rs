use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ExtractionConfig;
use crate::extract::extract_items;
use crate::header::locate_header;
use crate::keywords::KeywordSet;
use crate::preprocess::{flatten_words, ExtractionError};
use crate::recognizer::{check_engine_status, OcrBackend, OcrError};
use crate::rows::cluster_rows;
use crate::types::{LineItem, WordToken};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("Receipt extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
}

/// One extraction pass over an OCR response at a fixed row tolerance.
pub fn extract_line_items(
    response: &Value,
    row_tolerance: f64,
    column_tolerance: f64,
    keywords: &KeywordSet,
) -> Result<Vec<LineItem>, ExtractionError> {
    let words = flatten_words(response)?;
    Ok(extract_from_words(words, row_tolerance, column_tolerance, keywords))
}

fn extract_from_words(
    words: Vec<WordToken>,
    row_tolerance: f64,
    column_tolerance: f64,
    keywords: &KeywordSet,
) -> Vec<LineItem> {
    let rows = cluster_rows(words, row_tolerance);
    let header = locate_header(&rows, keywords);
    let items = extract_items(&rows, header.as_ref(), keywords, column_tolerance);
    debug!(
        row_tolerance,
        rows = rows.len(),
        header_row = ?header.as_ref().map(|h| h.row_index),
        items = items.len(),
        "extraction pass"
    );
    items
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutcome {
    pub items: Vec<LineItem>,
    /// Row tolerance of the pass that produced `items`; `None` when every
    /// pass came back empty.
    pub row_tolerance: Option<f64>,
    pub attempts: usize,
}

/// Runs extraction with each configured row tolerance in turn and keeps the
/// first non-empty result.
#[derive(Debug, Clone, Default)]
pub struct ReceiptExtractor {
    config: ExtractionConfig,
}

impl ReceiptExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Structural problems fail before any pass runs. An empty item list is
    /// a valid result, not an error.
    pub fn extract(&self, response: &Value) -> Result<ExtractionOutcome, ExtractionError> {
        let words = flatten_words(response)?;
        let config = &self.config;

        for (attempt, &row_tolerance) in config.row_tolerances.iter().enumerate() {
            let items = extract_from_words(
                words.clone(),
                row_tolerance,
                config.column_tolerance,
                &config.keywords,
            );
            if !items.is_empty() {
                if attempt > 0 {
                    info!(row_tolerance, attempts = attempt + 1, "items found after widening row tolerance");
                }
                return Ok(ExtractionOutcome {
                    items,
                    row_tolerance: Some(row_tolerance),
                    attempts: attempt + 1,
                });
            }
        }

        debug!(attempts = config.row_tolerances.len(), "no items at any row tolerance");
        Ok(ExtractionOutcome {
            items: Vec::new(),
            row_tolerance: None,
            attempts: config.row_tolerances.len(),
        })
    }
}

/// The result of scanning one receipt image.
#[derive(Debug)]
pub struct ReceiptScan {
    /// Raw OCR engine response.
    pub response: Value,
    pub items: Vec<LineItem>,
    pub row_tolerance: Option<f64>,
}

/// Orchestrates: read → OCR → engine status check → item extraction.
pub struct ReceiptPipeline<R: OcrBackend> {
    recognizer: R,
    extractor: ReceiptExtractor,
}

impl<R: OcrBackend> ReceiptPipeline<R> {
    pub fn new(recognizer: R, config: ExtractionConfig) -> Self {
        Self { recognizer, extractor: ReceiptExtractor::new(config) }
    }

    /// Process a receipt image on disk.
    pub async fn process_file(&self, path: &Path) -> Result<ReceiptScan, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(&bytes)
    }

    /// Process raw image bytes (camera capture or upload body).
    pub fn process_bytes(&self, data: &[u8]) -> Result<ReceiptScan, PipelineError> {
        let response = self.recognizer.recognize(data)?;
        check_engine_status(&response)?;

        let outcome = self.extractor.extract(&response).map_err(|e| {
            warn!(error = %e, "receipt could not be read");
            e
        })?;

        Ok(ReceiptScan {
            response,
            items: outcome.items,
            row_tolerance: outcome.row_tolerance,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::MockRecognizer;
    use serde_json::json;

    fn word(text: &str, left: f64, top: f64) -> Value {
        json!({ "WordText": text, "Left": left, "Top": top, "Width": 40, "Height": 12 })
    }

    fn response(words: Vec<Value>) -> Value {
        json!({
            "ParsedResults": [{ "TextOverlay": { "Lines": [{ "Words": words }] } }],
            "IsErroredOnProcessing": false
        })
    }

    fn item(name: &str, price: i64, quantity: i64, total: i64) -> LineItem {
        LineItem { name: name.into(), price, quantity, total }
    }

    /// Price sits 8px below its name and 5px above the card line: a 5px
    /// tolerance pairs it with the terminator, 8px pairs it with the name.
    fn skewed_receipt() -> Value {
        response(vec![word("우유", 0.0, 100.0), word("2500", 150.0, 108.0), word("카드", 0.0, 113.0)])
    }

    fn config(row_tolerances: &[f64]) -> ExtractionConfig {
        ExtractionConfig { row_tolerances: row_tolerances.to_vec(), ..ExtractionConfig::default() }
    }

    #[test]
    fn header_guided_receipt() {
        let r = response(vec![
            word("상품명", 0.0, 10.0),
            word("단가", 100.0, 10.0),
            word("수량", 200.0, 10.0),
            word("금액", 300.0, 10.0),
            word("사과", 0.0, 40.0),
            word("1000", 100.0, 40.0),
            word("2", 200.0, 40.0),
            word("2000", 300.0, 40.0),
        ]);
        let items = extract_line_items(&r, 16.0, 150.0, &KeywordSet::default()).unwrap();
        assert_eq!(items, vec![item("사과", 1000, 2, 2000)]);
    }

    #[test]
    fn single_pass_can_come_back_empty() {
        let items = extract_line_items(&skewed_receipt(), 5.0, 150.0, &KeywordSet::default()).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn retries_with_wider_tolerance() {
        let outcome = ReceiptExtractor::new(config(&[5.0, 8.0])).extract(&skewed_receipt()).unwrap();
        assert_eq!(outcome.items, vec![item("우유", 2500, 1, 2500)]);
        assert_eq!(outcome.row_tolerance, Some(8.0));
        assert_eq!(outcome.attempts, 2);
    }

    #[test]
    fn wider_is_not_always_better() {
        // From 10px up the card line merges into the item row and ends it.
        let outcome = ReceiptExtractor::default().extract(&skewed_receipt()).unwrap();
        assert!(outcome.items.is_empty());
        assert_eq!(outcome.attempts, 4);
    }

    #[test]
    fn all_empty_attempts_give_empty_list() {
        let outcome = ReceiptExtractor::new(config(&[5.0])).extract(&skewed_receipt()).unwrap();
        assert!(outcome.items.is_empty());
        assert_eq!(outcome.row_tolerance, None);
        assert_eq!(outcome.attempts, 1);
    }

    #[test]
    fn no_tolerances_still_validates_structure() {
        let extractor = ReceiptExtractor::new(config(&[]));
        assert!(extractor.extract(&skewed_receipt()).unwrap().items.is_empty());
        assert_eq!(
            extractor.extract(&json!({ "ParsedResults": [{}] })),
            Err(ExtractionError::MissingOverlay)
        );
    }

    #[test]
    fn structural_error_short_circuits_retries() {
        let empty = json!({ "ParsedResults": [{ "Overlay": { "Lines": [] } }] });
        assert_eq!(ReceiptExtractor::default().extract(&empty), Err(ExtractionError::NoWords));
    }

    #[test]
    fn process_bytes_returns_items_and_response() {
        let pipeline = ReceiptPipeline::new(MockRecognizer::new(skewed_receipt()), config(&[5.0, 8.0]));
        let scan = pipeline.process_bytes(b"jpeg").unwrap();
        assert_eq!(scan.items, vec![item("우유", 2500, 1, 2500)]);
        assert_eq!(scan.row_tolerance, Some(8.0));
        assert_eq!(scan.response, skewed_receipt());
    }

    #[test]
    fn process_bytes_surfaces_engine_failure() {
        let pipeline = ReceiptPipeline::new(
            MockRecognizer::new(json!({ "IsErroredOnProcessing": true, "ErrorMessage": ["bad image"] })),
            ExtractionConfig::default(),
        );
        assert!(matches!(
            pipeline.process_bytes(b"jpeg"),
            Err(PipelineError::Ocr(OcrError::Engine(_)))
        ));
    }

    #[test]
    fn process_bytes_surfaces_extraction_error() {
        let pipeline = ReceiptPipeline::new(
            MockRecognizer::new(json!({ "ParsedResults": [{ "ParsedText": "" }] })),
            ExtractionConfig::default(),
        );
        assert!(matches!(
            pipeline.process_bytes(b"jpeg"),
            Err(PipelineError::Extraction(ExtractionError::MissingOverlay))
        ));
    }

    #[tokio::test]
    async fn process_file_reads_image_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();

        let pipeline = ReceiptPipeline::new(MockRecognizer::new(skewed_receipt()), config(&[5.0, 8.0]));
        let scan = pipeline.process_file(&path).await.unwrap();
        assert_eq!(scan.items.len(), 1);
    }

    #[tokio::test]
    async fn process_file_missing_is_io_error() {
        let pipeline = ReceiptPipeline::new(
            MockRecognizer::new(skewed_receipt()),
            ExtractionConfig::default(),
        );
        let err = pipeline.process_file(Path::new("/nonexistent/receipt.jpg")).await.unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
