//! Output records and per-row classification.

use crate::amount::Amount;
use crate::layout::Layout;
use serde::Serialize;

/// Literal header text that can reappear in the amount column.
pub const AMOUNT_HEADER: &str = "Amount";

/// One cleaned statement line, written as a single CSV record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    /// Transaction reference
    pub reference: String,

    /// Free-text memo
    pub memo: String,

    /// Amount, never negative
    pub amount: Amount,
}

/// Which output table a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// Money in: the amount was written with a leading `-`.
    Credit,

    /// Everything else.
    Debit,
}

/// Why a row produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The residual header row at index 0.
    HeaderRow,

    /// Fewer cells than the layout's minimum width.
    ShortRow { width: usize },

    /// The amount cell is empty after cleaning.
    EmptyAmount,

    /// The amount cell repeats the column header.
    HeaderToken,

    /// The amount cell is not a number.
    InvalidAmount { value: String, reason: String },
}

/// Result of examining one row: a bucketed record, or a reason to drop it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Record(Bucket, OutputRecord),
    Skip(SkipReason),
}

/// Classifies a trimmed row.
///
/// `index` is the row's position after header/footer trimming; index 0 is
/// always dropped as a header. Column reads happen only after the width
/// check, so a consistent [`Layout`] never indexes out of bounds.
pub fn classify_row(layout: &Layout, index: usize, row: &[String]) -> RowOutcome {
    if index == 0 {
        return RowOutcome::Skip(SkipReason::HeaderRow);
    }
    if row.len() < layout.min_row_width {
        return RowOutcome::Skip(SkipReason::ShortRow { width: row.len() });
    }

    let (Some(raw_amount), Some(reference), Some(memo)) = (
        row.get(layout.amount_column),
        row.get(layout.reference_column),
        row.get(layout.memo_column),
    ) else {
        return RowOutcome::Skip(SkipReason::ShortRow { width: row.len() });
    };

    let cleaned = Amount::clean(raw_amount);
    if cleaned.is_empty() {
        return RowOutcome::Skip(SkipReason::EmptyAmount);
    }
    if cleaned == AMOUNT_HEADER {
        return RowOutcome::Skip(SkipReason::HeaderToken);
    }

    let amount = match Amount::parse(&cleaned) {
        Ok(amount) => amount,
        Err(e) => {
            return RowOutcome::Skip(SkipReason::InvalidAmount {
                value: cleaned,
                reason: e.to_string(),
            })
        }
    };

    let (bucket, amount) = if Amount::is_negative_token(&cleaned) {
        (Bucket::Credit, amount.negate())
    } else {
        (Bucket::Debit, amount)
    };

    RowOutcome::Record(
        bucket,
        OutputRecord {
            reference: reference.clone(),
            memo: memo.clone(),
            amount,
        },
    )
}
