use std::cmp::Ordering;

use crate::types::{Row, WordToken};

/// Group tokens into printed lines.
///
/// Tokens are taken in ascending `top` order. A token joins the open row
/// when its `top` is within `row_tolerance` of the row's running average
/// `top`; otherwise the row is closed and a new one starts. Closed rows are
/// never revisited. Each row is then ordered by `left`. Both sorts are
/// stable.
pub fn cluster_rows(mut tokens: Vec<WordToken>, row_tolerance: f64) -> Vec<Row> {
    tokens.sort_by(|a, b| a.top.partial_cmp(&b.top).unwrap_or(Ordering::Equal));

    let mut rows = Vec::new();
    let mut current: Vec<WordToken> = Vec::new();
    let mut top_sum = 0.0;

    for token in tokens {
        if !current.is_empty() {
            let average = top_sum / current.len() as f64;
            if (token.top - average).abs() > row_tolerance {
                rows.push(Row::new(std::mem::take(&mut current)));
                top_sum = 0.0;
            }
        }
        top_sum += token.top;
        current.push(token);
    }
    if !current.is_empty() {
        rows.push(Row::new(current));
    }

    for row in &mut rows {
        row.tokens
            .sort_by(|a, b| a.left.partial_cmp(&b.left).unwrap_or(Ordering::Equal));
    }
    rows
}
