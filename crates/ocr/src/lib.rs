pub mod config;
pub mod extract;
pub mod header;
pub mod keywords;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod rows;
pub mod types;

pub use config::{ConfigError, ExtractionConfig};
pub use extract::{extract_items, ItemExtractor};
pub use header::{locate_header, Header};
pub use keywords::KeywordSet;
pub use pipeline::{
    extract_line_items, ExtractionOutcome, PipelineError, ReceiptExtractor, ReceiptPipeline,
    ReceiptScan,
};
pub use preprocess::{flatten_words, ExtractionError};
pub use recognizer::{check_engine_status, MockRecognizer, OcrBackend, OcrError};
pub use rows::cluster_rows;
pub use types::{ColumnMap, ColumnRole, LineItem, Row, WordToken};
