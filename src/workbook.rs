//! In-memory workbook model.
//!
//! A [`Sheet`] is an explicit, mutable sequence of rows. Row removal
//! re-indexes everything below the removed row immediately, so a series of
//! removals depends on the order it is applied in.

use crate::error::{CleanerError, Result};
use std::fmt;

/// Rows a worksheet can hold.
pub const MAX_ROWS: usize = 1_048_576;

/// Columns a worksheet can hold (`A` through `XFD`).
pub const MAX_COLUMNS: usize = 16_384;

/// Zero-based cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    /// Creates a coordinate, or `None` if it lies outside the worksheet grid.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        if row < MAX_ROWS && col < MAX_COLUMNS {
            Some(CellRef { row, col })
        } else {
            None
        }
    }

    /// Decodes an A1-style reference such as `"AL27"` or `"$B$3"`.
    ///
    /// References past `XFD1048576` are rejected.
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        let bytes = reference.as_bytes();
        let mut pos = 0;

        let mut col = 0usize;
        let mut letters = 0;
        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }
        while let Some(&byte) = bytes.get(pos) {
            if !byte.is_ascii_alphabetic() {
                break;
            }
            col = col
                .checked_mul(26)?
                .checked_add((byte.to_ascii_uppercase() - b'A' + 1) as usize)?;
            letters += 1;
            pos += 1;
        }
        if letters == 0 {
            return None;
        }

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }
        let digits = &reference[pos..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let row: usize = digits.parse().ok()?;
        if row == 0 {
            return None;
        }

        CellRef::new(row - 1, col - 1)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut letters = Vec::new();
        let mut n = self.col + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        for c in letters.iter().rev() {
            write!(f, "{}", c)?;
        }
        write!(f, "{}", self.row + 1)
    }
}

/// A rectangular merged range, inclusive on both corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRegion {
    pub start: CellRef,
    pub end: CellRef,
}

impl MergeRegion {
    /// Decodes a range such as `"A1:C2"`. A single reference is a 1x1 region.
    pub fn parse(range: &str) -> Option<Self> {
        let (start, end) = match range.split_once(':') {
            Some((a, b)) => (CellRef::parse(a)?, CellRef::parse(b)?),
            None => {
                let cell = CellRef::parse(range)?;
                (cell, cell)
            }
        };
        // Normalize so that start is the top-left corner.
        Some(MergeRegion {
            start: CellRef {
                row: start.row.min(end.row),
                col: start.col.min(end.col),
            },
            end: CellRef {
                row: start.row.max(end.row),
                col: start.col.max(end.col),
            },
        })
    }
}

impl fmt::Display for MergeRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// One worksheet: a grid of string cells plus its merged ranges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    name: String,
    grid: Vec<Vec<String>>,
    merges: Vec<MergeRegion>,
}

impl Sheet {
    /// Creates an empty sheet.
    pub fn new(name: impl Into<String>) -> Self {
        Sheet {
            name: name.into(),
            grid: Vec::new(),
            merges: Vec::new(),
        }
    }

    /// Creates a sheet from row data.
    pub fn from_rows<I, R, S>(name: impl Into<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Sheet {
            name: name.into(),
            grid: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
            merges: Vec::new(),
        }
    }

    /// Sheet name as shown on its tab.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the value of a cell, growing the grid as needed.
    pub fn set_cell(&mut self, cell: CellRef, value: impl Into<String>) {
        self.ensure_cell(cell);
        self.grid[cell.row][cell.col] = value.into();
    }

    /// Returns a cell value, or `None` if the cell was never written.
    pub fn cell(&self, cell: CellRef) -> Option<&str> {
        self.grid
            .get(cell.row)
            .and_then(|row| row.get(cell.col))
            .map(String::as_str)
    }

    /// Records a merged range.
    pub fn add_merge(&mut self, region: MergeRegion) {
        self.merges.push(region);
    }

    /// Merged ranges currently defined on the sheet.
    pub fn merge_regions(&self) -> &[MergeRegion] {
        &self.merges
    }

    /// Dissolves a merged range.
    ///
    /// The anchor keeps its value and every other cell of the range becomes an
    /// ordinary blank cell. Cells that were never written stay unwritten.
    /// Fails if the range is not defined on this sheet.
    pub fn unmerge(&mut self, region: MergeRegion) -> Result<()> {
        let idx = self
            .merges
            .iter()
            .position(|m| *m == region)
            .ok_or_else(|| CleanerError::InvalidCellRef {
                sheet: self.name.clone(),
                reference: region.to_string(),
            })?;
        self.merges.remove(idx);

        let rows = region.end.row - region.start.row + 1;
        let cols = region.end.col - region.start.col + 1;
        for (row, cells) in self.grid.iter_mut().enumerate().skip(region.start.row).take(rows) {
            for (col, value) in cells.iter_mut().enumerate().skip(region.start.col).take(cols) {
                if (CellRef { row, col }) != region.start {
                    value.clear();
                }
            }
        }
        Ok(())
    }

    /// Number of rows, ignoring trailing rows with no content.
    pub fn row_count(&self) -> usize {
        self.grid
            .iter()
            .rposition(|row| row.iter().any(|c| !c.is_empty()))
            .map_or(0, |last| last + 1)
    }

    /// Removes the row at zero-based `index`; rows below move up by one.
    ///
    /// Merged ranges below the row shift up with it; ranges covering the row
    /// shrink, and disappear once they have no rows left.
    pub fn remove_row(&mut self, index: usize) -> Result<()> {
        if index >= self.grid.len() {
            return Err(CleanerError::RowOutOfRange {
                sheet: self.name.clone(),
                row: index,
                len: self.grid.len(),
            });
        }
        self.grid.remove(index);

        self.merges.retain_mut(|region| {
            if region.end.row < index {
                true
            } else if region.start.row > index {
                region.start.row -= 1;
                region.end.row -= 1;
                true
            } else if region.start.row == region.end.row {
                false
            } else {
                region.end.row -= 1;
                true
            }
        });
        Ok(())
    }

    /// Reads the sheet as rows of cell text.
    ///
    /// Each row stops at its last non-empty cell and the sheet stops at its
    /// last non-empty row; empty rows in between are kept as empty rows.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.grid[..self.row_count()]
            .iter()
            .map(|row| {
                let width = row
                    .iter()
                    .rposition(|c| !c.is_empty())
                    .map_or(0, |last| last + 1);
                row[..width].to_vec()
            })
            .collect()
    }

    fn ensure_cell(&mut self, cell: CellRef) {
        if self.grid.len() <= cell.row {
            self.grid.resize_with(cell.row + 1, Vec::new);
        }
        let row = &mut self.grid[cell.row];
        if row.len() <= cell.col {
            row.resize(cell.col + 1, String::new());
        }
    }
}

/// An ordered collection of sheets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Creates a workbook from sheets in tab order.
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Workbook { sheets }
    }

    /// Sheets in tab order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Mutable access to sheets in tab order.
    pub fn sheets_mut(&mut self) -> &mut [Sheet] {
        &mut self.sheets
    }
}
