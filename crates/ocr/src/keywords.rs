//! Keyword lists and numeric thresholds used to read Korean receipts.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::types::ColumnRole;

/// Any of these in a row marks it as the column header line.
pub const HEADER_KEYWORDS: &[&str] = &["상품", "품명", "단가", "수량", "금액"];
pub const PRICE_COLUMN_KEYWORDS: &[&str] = &["단가", "가격"];
pub const QUANTITY_COLUMN_KEYWORDS: &[&str] = &["수량", "개수"];
pub const TOTAL_COLUMN_KEYWORDS: &[&str] = &["금액", "합계", "가액"];
/// Totals, payment and tax lines. Item rows end at the first of these.
pub const TERMINATOR_KEYWORDS: &[&str] = &["합계", "카드", "부가세", "과세", "면세", "결제", "거스름"];

/// Dashed rule printed between receipt sections.
pub const SEPARATOR: &str = "----";

/// Overlay field names, tried in order.
pub const OVERLAY_FIELDS: &[&str] = &["TextOverlay", "Overlay"];

/// Bare numbers in this range are read as years (timestamps), not amounts.
pub const YEAR_RANGE: RangeInclusive<i64> = 2000..=2030;

/// Unclassified numbers up to this value are taken as quantities.
pub const QUANTITY_CEILING: i64 = 100;

/// The keyword groups the extractor matches against, overridable from config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordSet {
    pub header: Vec<String>,
    pub price: Vec<String>,
    pub quantity: Vec<String>,
    pub total_price: Vec<String>,
    pub terminators: Vec<String>,
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self {
            header: owned(HEADER_KEYWORDS),
            price: owned(PRICE_COLUMN_KEYWORDS),
            quantity: owned(QUANTITY_COLUMN_KEYWORDS),
            total_price: owned(TOTAL_COLUMN_KEYWORDS),
            terminators: owned(TERMINATOR_KEYWORDS),
        }
    }
}

impl KeywordSet {
    pub fn is_header(&self, compact_text: &str) -> bool {
        contains_any(compact_text, &self.header)
    }

    pub fn is_terminator(&self, compact_text: &str) -> bool {
        contains_any(compact_text, &self.terminators)
    }

    pub fn column_keywords(&self, role: ColumnRole) -> &[String] {
        match role {
            ColumnRole::Price => &self.price,
            ColumnRole::Quantity => &self.quantity,
            ColumnRole::TotalPrice => &self.total_price,
        }
    }

    pub fn matches_column(&self, role: ColumnRole, compact_text: &str) -> bool {
        contains_any(compact_text, self.column_keywords(role))
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| text.contains(k.as_str()))
}

pub fn is_year_like(value: i64) -> bool {
    YEAR_RANGE.contains(&value)
}
