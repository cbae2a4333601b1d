use crate::keywords::KeywordSet;
use crate::types::{strip_whitespace, ColumnMap, ColumnRole, Row};

/// The column header line of a receipt and the column centers read from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub row_index: usize,
    pub columns: ColumnMap,
}

impl Header {
    /// First row that can hold an item.
    pub fn item_start(&self) -> usize {
        self.row_index + 1
    }
}

/// Find the first header row and record the horizontal center of each
/// price / quantity / total label on it. Later header-like rows are ignored.
pub fn locate_header(rows: &[Row], keywords: &KeywordSet) -> Option<Header> {
    let (row_index, row) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| keywords.is_header(&row.compact_text()))?;

    let mut columns = ColumnMap::default();
    for token in &row.tokens {
        let text = strip_whitespace(&token.text);
        for role in ColumnRole::ALL {
            if keywords.matches_column(role, &text) {
                columns.set(role, token.center_x());
            }
        }
    }

    Some(Header { row_index, columns })
}
