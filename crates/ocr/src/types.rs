use chrono::{DateTime, Utc};
use pantry_core::{MaterialDraft, Won};
use serde::{Deserialize, Serialize};

/// One recognized word and its bounding box, as reported by the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordToken {
    #[serde(rename = "WordText")]
    pub text: String,
    #[serde(rename = "Left")]
    pub left: f64,
    #[serde(rename = "Top")]
    pub top: f64,
    #[serde(rename = "Width")]
    pub width: f64,
    #[serde(rename = "Height")]
    pub height: f64,
}

impl WordToken {
    pub fn new(text: impl Into<String>, left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { text: text.into(), left, top, width, height }
    }

    /// Horizontal center of the bounding box.
    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }
}

/// Tokens judged to sit on the same printed line, ordered left to right.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub tokens: Vec<WordToken>,
}

impl Row {
    pub fn new(tokens: Vec<WordToken>) -> Self {
        Self { tokens }
    }

    /// Token texts concatenated as-is.
    pub fn joined_text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Token texts concatenated with all whitespace removed.
    pub fn compact_text(&self) -> String {
        strip_whitespace(&self.joined_text())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

pub(crate) fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Price,
    Quantity,
    TotalPrice,
}

impl ColumnRole {
    /// Evaluation order for keyword matching and nearest-column ties.
    pub const ALL: [ColumnRole; 3] = [ColumnRole::Price, ColumnRole::Quantity, ColumnRole::TotalPrice];
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnRole::Price => write!(f, "price"),
            ColumnRole::Quantity => write!(f, "quantity"),
            ColumnRole::TotalPrice => write!(f, "total_price"),
        }
    }
}

/// Horizontal centers of the price / quantity / total columns, taken from
/// the header row. Unset columns are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub price: Option<f64>,
    pub quantity: Option<f64>,
    pub total_price: Option<f64>,
}

impl ColumnMap {
    pub fn get(&self, role: ColumnRole) -> Option<f64> {
        match role {
            ColumnRole::Price => self.price,
            ColumnRole::Quantity => self.quantity,
            ColumnRole::TotalPrice => self.total_price,
        }
    }

    pub fn set(&mut self, role: ColumnRole, center: f64) {
        match role {
            ColumnRole::Price => self.price = Some(center),
            ColumnRole::Quantity => self.quantity = Some(center),
            ColumnRole::TotalPrice => self.total_price = Some(center),
        }
    }

    pub fn is_empty(&self) -> bool {
        ColumnRole::ALL.iter().all(|r| self.get(*r).is_none())
    }

    /// The set column whose center is closest to `x`, with its distance.
    /// Ties go to the column that comes first in [`ColumnRole::ALL`].
    pub fn nearest(&self, x: f64) -> Option<(ColumnRole, f64)> {
        let mut best: Option<(ColumnRole, f64)> = None;
        for role in ColumnRole::ALL {
            if let Some(center) = self.get(role) {
                let dist = (x - center).abs();
                if best.map_or(true, |(_, d)| dist < d) {
                    best = Some((role, dist));
                }
            }
        }
        best
    }
}

/// A purchased item reconstructed from the receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    /// Unit price.
    pub price: i64,
    pub quantity: i64,
    /// Line total.
    pub total: i64,
}

impl LineItem {
    pub fn to_material(&self, purchased_at: DateTime<Utc>) -> MaterialDraft {
        MaterialDraft::new(&self.name, Won::new(self.price), self.quantity, purchased_at)
    }
}
