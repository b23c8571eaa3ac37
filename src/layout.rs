//! Positional layout of the statement report.
//!
//! The report format is fixed: a block of title/metadata rows, the
//! transaction table, then a block of totals and footnotes. Columns are
//! addressed by zero-based index.

/// Row and column positions the cleaner relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Rows dropped from the top of every sheet.
    pub header_rows: usize,

    /// Rows dropped from the bottom of every sheet, after the header rows.
    pub footer_rows: usize,

    /// Column holding the transaction reference.
    pub reference_column: usize,

    /// Column holding the free-text memo.
    pub memo_column: usize,

    /// Column holding the signed, comma-grouped amount.
    pub amount_column: usize,

    /// Rows with fewer cells than this are skipped.
    pub min_row_width: usize,
}

impl Layout {
    /// The bank report layout the service was built for.
    pub const STATEMENT: Layout = Layout {
        header_rows: 25,
        footer_rows: 14,
        reference_column: 0,
        memo_column: 24,
        amount_column: 37,
        min_row_width: 39,
    };

    /// Returns `true` if every addressed column lies below `min_row_width`,
    /// so the width guard alone makes column reads safe.
    pub fn is_consistent(&self) -> bool {
        self.reference_column < self.min_row_width
            && self.memo_column < self.min_row_width
            && self.amount_column < self.min_row_width
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::STATEMENT
    }
}
