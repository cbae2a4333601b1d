use serde::{Deserialize, Serialize};
use std::fmt;

/// Whole-won amount. KRW has no minor unit, so receipts print plain integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Won(i64);

impl Won {
    pub const fn new(amount: i64) -> Self {
        Won(amount)
    }

    pub const fn zero() -> Self {
        Won(0)
    }

    pub const fn amount(self) -> i64 {
        self.0
    }

    /// Parse an amount as printed on a receipt (`"3,300"`, `"27,000원"`).
    ///
    /// Every `,` and `원` is removed; what remains must be a non-empty run of
    /// ASCII digits that fits in an `i64`.
    pub fn parse_receipt_text(text: &str) -> Option<Won> {
        let cleaned: String = text.chars().filter(|c| *c != ',' && *c != '원').collect();
        if cleaned.is_empty() || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        cleaned.parse::<i64>().ok().map(Won)
    }

    pub fn saturating_mul(self, factor: i64) -> Won {
        Won(self.0.saturating_mul(factor))
    }
}

impl fmt::Display for Won {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}₩{grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_and_grouped() {
        assert_eq!(Won::parse_receipt_text("1000"), Some(Won(1000)));
        assert_eq!(Won::parse_receipt_text("3,300"), Some(Won(3300)));
        assert_eq!(Won::parse_receipt_text("27,000원"), Some(Won(27000)));
    }

    #[test]
    fn parse_rejects_non_numeric() {
        assert_eq!(Won::parse_receipt_text(""), None);
        assert_eq!(Won::parse_receipt_text("원"), None);
        assert_eq!(Won::parse_receipt_text(",,"), None);
        assert_eq!(Won::parse_receipt_text("27.1"), None);
        assert_eq!(Won::parse_receipt_text("250g"), None);
        assert_eq!(Won::parse_receipt_text("-500"), None);
    }

    #[test]
    fn parse_rejects_overflowing_digits() {
        assert_eq!(Won::parse_receipt_text("99999999999999999999999"), None);
    }

    #[test]
    fn display_groups_thousands() {
        assert_eq!(Won(0).to_string(), "₩0");
        assert_eq!(Won(950).to_string(), "₩950");
        assert_eq!(Won(1000).to_string(), "₩1,000");
        assert_eq!(Won(1234567).to_string(), "₩1,234,567");
        assert_eq!(Won(-27000).to_string(), "-₩27,000");
    }

    #[test]
    fn saturating_mul_clamps() {
        assert_eq!(Won(1500).saturating_mul(2), Won(3000));
        assert_eq!(Won(i64::MAX).saturating_mul(2), Won(i64::MAX));
    }

    #[test]
    fn serializes_as_bare_integer() {
        assert_eq!(serde_json::to_string(&Won(3300)).unwrap(), "3300");
        let w: Won = serde_json::from_str("27000").unwrap();
        assert_eq!(w, Won(27000));
    }
}
