use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::money::Won;

pub const DEFAULT_CURRENCY: &str = "KRW";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaterialError {
    #[error("material name is empty")]
    EmptyName,
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),
    #[error("price cannot be negative: {0}")]
    NegativePrice(Won),
}

/// A purchased material that has not been stored yet.
///
/// Receipt scans produce these; category, unit and expiry are filled in by
/// later stages (user edit or expiry estimation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDraft {
    pub name: String,
    /// Unit price.
    pub price: Won,
    pub currency: String,
    pub quantity: i64,
    pub quantity_unit: Option<String>,
    pub category: Option<String>,
    pub purchased_at: DateTime<Utc>,
    pub expired_at: Option<DateTime<Utc>>,
}

impl MaterialDraft {
    pub fn new(name: &str, price: Won, quantity: i64, purchased_at: DateTime<Utc>) -> Self {
        MaterialDraft {
            name: name.to_string(),
            price,
            currency: DEFAULT_CURRENCY.to_string(),
            quantity,
            quantity_unit: None,
            category: None,
            purchased_at,
            expired_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), MaterialError> {
        if self.name.trim().is_empty() {
            return Err(MaterialError::EmptyName);
        }
        if self.quantity < 1 {
            return Err(MaterialError::InvalidQuantity(self.quantity));
        }
        if self.price < Won::zero() {
            return Err(MaterialError::NegativePrice(self.price));
        }
        Ok(())
    }
}
