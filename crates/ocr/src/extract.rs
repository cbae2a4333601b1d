use std::sync::OnceLock;

use pantry_core::Won;
use regex::Regex;
use tracing::trace;

use crate::header::Header;
use crate::keywords::{is_year_like, KeywordSet, QUANTITY_CEILING, SEPARATOR};
use crate::types::{ColumnMap, ColumnRole, LineItem, Row, WordToken};

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// A name token needs at least one Hangul syllable or Latin letter.
re!(re_name_letter, r"[가-힣a-zA-Z]");

/// Walk item rows and rebuild the purchased items.
///
/// Starts after the header row when there is one, otherwise at the first row.
pub fn extract_items(
    rows: &[Row],
    header: Option<&Header>,
    keywords: &KeywordSet,
    column_tolerance: f64,
) -> Vec<LineItem> {
    let start = header.map_or(0, Header::item_start);
    let item_rows = rows.get(start..).unwrap_or(&[]);
    ItemExtractor::new(keywords, header, column_tolerance).extract(item_rows)
}

/// Row-by-row state machine over the item section of a receipt.
pub struct ItemExtractor<'a> {
    keywords: &'a KeywordSet,
    /// Only present when a header was found and at least one center is set.
    columns: Option<&'a ColumnMap>,
    column_tolerance: f64,
}

impl<'a> ItemExtractor<'a> {
    pub fn new(keywords: &'a KeywordSet, header: Option<&'a Header>, column_tolerance: f64) -> Self {
        let columns = header.map(|h| &h.columns).filter(|c| !c.is_empty());
        Self { keywords, columns, column_tolerance }
    }

    pub fn extract(&self, rows: &[Row]) -> Vec<LineItem> {
        let mut items = Vec::new();
        let mut pending = PendingItem::default();

        for row in rows {
            if self.keywords.is_terminator(&row.compact_text()) {
                if pending.is_priced() {
                    items.push(pending.finalize());
                }
                trace!(row = %row.joined_text(), "terminator row, stopping");
                return items;
            }
            if row.joined_text().contains(SEPARATOR) {
                continue;
            }

            pending = match pending.absorb(row, self) {
                done if done.is_priced() => {
                    items.push(done.finalize());
                    PendingItem::default()
                }
                open => open,
            };
        }
        items
    }

    /// Decide which field a number belongs to: the nearest header column
    /// within tolerance, else by magnitude.
    fn classify(&self, value: i64, token: &WordToken, price_so_far: i64) -> ColumnRole {
        self.nearest_column(token)
            .unwrap_or_else(|| classify_by_magnitude(value, price_so_far))
    }

    fn nearest_column(&self, token: &WordToken) -> Option<ColumnRole> {
        let (role, distance) = self.columns?.nearest(token.center_x())?;
        (distance <= self.column_tolerance).then_some(role)
    }
}

/// Small numbers are quantities. Large ones are the unit price, or the line
/// total once a price has been seen.
fn classify_by_magnitude(value: i64, price_so_far: i64) -> ColumnRole {
    if value <= QUANTITY_CEILING {
        ColumnRole::Quantity
    } else if price_so_far == 0 {
        ColumnRole::Price
    } else {
        ColumnRole::TotalPrice
    }
}

/// The item being assembled. Name text may span rows; the first row that
/// yields a price or total completes it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingItem {
    name: String,
    price: i64,
    quantity: i64,
    total: i64,
}

impl Default for PendingItem {
    fn default() -> Self {
        Self { name: String::new(), price: 0, quantity: 1, total: 0 }
    }
}

impl PendingItem {
    fn absorb(mut self, row: &Row, extractor: &ItemExtractor<'_>) -> Self {
        for token in &row.tokens {
            match Won::parse_receipt_text(&token.text) {
                Some(won) => {
                    let value = won.amount();
                    if is_year_like(value) {
                        trace!(value, "skipping year-like number");
                        continue;
                    }
                    let role = extractor.classify(value, token, self.price);
                    self.assign(role, value);
                }
                None => {
                    if re_name_letter().is_match(&token.text) {
                        self.name.push_str(&token.text);
                        self.name.push(' ');
                    }
                }
            }
        }
        self
    }

    fn assign(&mut self, role: ColumnRole, value: i64) {
        match role {
            ColumnRole::Price => self.price = value,
            ColumnRole::Quantity => self.quantity = value,
            ColumnRole::TotalPrice => self.total = value,
        }
    }

    fn is_priced(&self) -> bool {
        self.price > 0 || self.total > 0
    }

    fn finalize(self) -> LineItem {
        let quantity = if self.quantity > 0 { self.quantity } else { 1 };
        let mut price = self.price;
        let mut total = self.total;

        if total == 0 && price > 0 {
            total = price.saturating_mul(quantity);
        }
        if price == 0 && total > 0 {
            price = total / quantity;
        }

        LineItem { name: self.name.trim().to_string(), price, quantity, total }
    }
}
