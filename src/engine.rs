//! Core statement cleaning engine.
//!
//! Each sheet is normalized in place (merged ranges dissolved, fixed header
//! and footer blocks removed) and its remaining rows are classified into the
//! credit or debit bucket of a single [`Ledger`] shared by all sheets.

use crate::error::Result;
use crate::layout::Layout;
use crate::ledger::Ledger;
use crate::record::{classify_row, RowOutcome, SkipReason};
use crate::workbook::{Sheet, Workbook};
use crate::xlsx;
use log::{debug, info, warn};
use std::path::Path;

/// The statement cleaner.
///
/// Holds only the report [`Layout`]; every call works on its own workbook
/// and produces its own ledger, so one cleaner can serve many requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementCleaner {
    layout: Layout,
}

impl StatementCleaner {
    /// Creates a cleaner for the standard statement layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cleaner for a custom layout.
    pub fn with_layout(layout: Layout) -> Self {
        StatementCleaner { layout }
    }

    /// Opens an `.xlsx` file and cleans it.
    pub fn clean_file<P: AsRef<Path>>(&self, path: P) -> Result<Ledger> {
        let mut workbook = xlsx::open(path)?;
        self.clean_workbook(&mut workbook)
    }

    /// Cleans an `.xlsx` workbook held in memory.
    pub fn clean_bytes(&self, bytes: &[u8]) -> Result<Ledger> {
        let mut workbook = xlsx::from_bytes(bytes)?;
        self.clean_workbook(&mut workbook)
    }

    /// Cleans every sheet of `workbook` in tab order.
    ///
    /// The workbook is modified in place. Structural failures abort the whole
    /// run; bad rows are logged and skipped.
    pub fn clean_workbook(&self, workbook: &mut Workbook) -> Result<Ledger> {
        let mut ledger = Ledger::new();
        for sheet in workbook.sheets_mut() {
            self.clean_sheet(sheet, &mut ledger)?;
        }
        Ok(ledger)
    }

    /// Normalizes one sheet and appends its records to `ledger`.
    fn clean_sheet(&self, sheet: &mut Sheet, ledger: &mut Ledger) -> Result<()> {
        self.unmerge_all(sheet)?;
        self.trim(sheet)?;

        let rows = sheet.rows();
        if rows.is_empty() {
            info!("No rows found in sheet {}.", sheet.name());
            return Ok(());
        }

        let mut kept = 0usize;
        for (index, row) in rows.iter().enumerate() {
            match classify_row(&self.layout, index, row) {
                RowOutcome::Record(bucket, record) => {
                    ledger.push(bucket, record);
                    kept += 1;
                }
                RowOutcome::Skip(SkipReason::InvalidAmount { value, reason }) => {
                    warn!(
                        "Sheet {} row {}: Error parsing amount {:?}: {}",
                        sheet.name(),
                        index,
                        value,
                        reason
                    );
                }
                RowOutcome::Skip(reason) => {
                    debug!("Sheet {} row {}: skipped ({:?})", sheet.name(), index, reason);
                }
            }
        }

        debug!(
            "Sheet {}: {} of {} rows kept",
            sheet.name(),
            kept,
            rows.len()
        );
        Ok(())
    }

    /// Dissolves every merged range on the sheet.
    fn unmerge_all(&self, sheet: &mut Sheet) -> Result<()> {
        let regions = sheet.merge_regions().to_vec();
        for region in regions {
            sheet.unmerge(region)?;
        }
        Ok(())
    }

    /// Removes the header block, then the footer block of what remains.
    ///
    /// Rows go one at a time: the header always from the live top, the
    /// footer always from the live bottom. A sheet shorter than a block
    /// simply runs out of rows.
    fn trim(&self, sheet: &mut Sheet) -> Result<()> {
        for _ in 0..self.layout.header_rows {
            if sheet.row_count() == 0 {
                break;
            }
            sheet.remove_row(0)?;
        }

        for _ in 0..self.layout.footer_rows {
            let count = sheet.row_count();
            if count == 0 {
                break;
            }
            sheet.remove_row(count - 1)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::{CellRef, MergeRegion};

    fn data_row(reference: &str, memo: &str, amount: &str) -> Vec<String> {
        let mut row = vec![String::new(); 39];
        row[0] = reference.to_string();
        row[24] = memo.to_string();
        row[37] = amount.to_string();
        row[38] = "x".to_string();
        row
    }

    fn filler(label: &str) -> Vec<String> {
        vec![label.to_string()]
    }

    /// Builds a statement sheet: 25 boilerplate rows, a header row, the data
    /// rows, then 14 footer rows.
    fn statement_sheet(name: &str, data: Vec<Vec<String>>) -> Sheet {
        let mut rows = Vec::new();
        for i in 0..25 {
            rows.push(filler(&format!("title {}", i)));
        }
        rows.push(data_row("Reference", "Memo", "Amount"));
        rows.extend(data);
        for i in 0..14 {
            rows.push(filler(&format!("footer {}", i)));
        }
        Sheet::from_rows(name, rows)
    }

    fn clean(sheets: Vec<Sheet>) -> Ledger {
        StatementCleaner::new()
            .clean_workbook(&mut Workbook::new(sheets))
            .unwrap()
    }

    #[test]
    fn test_single_credit_row() {
        let ledger = clean(vec![statement_sheet(
            "S1",
            vec![data_row("REF1", "MEMO1", "-100")],
        )]);
        let (credits, debits) = ledger.to_csv_pair().unwrap();
        assert_eq!(credits, "REF1,MEMO1,100\n");
        assert_eq!(debits, "");
    }

    #[test]
    fn test_mixed_rows_keep_order() {
        let ledger = clean(vec![statement_sheet(
            "S1",
            vec![
                data_row("A", "a", "-1,234.50"),
                data_row("B", "b", "500"),
                data_row("C", "c", "-0.10"),
                data_row("D", "d", "2,000.00"),
            ],
        )]);
        let (credits, debits) = ledger.to_csv_pair().unwrap();
        assert_eq!(credits, "A,a,1234.5\nC,c,0.1\n");
        assert_eq!(debits, "B,b,500\nD,d,2000\n");
    }

    #[test]
    fn test_bad_rows_are_skipped_not_fatal() {
        let mut short = data_row("S", "short", "10");
        short.truncate(38);
        let ledger = clean(vec![statement_sheet(
            "S1",
            vec![
                data_row("X", "x", "n/a"),
                data_row("H", "h", "Amount"),
                data_row("E", "e", ""),
                short,
                data_row("OK", "ok", "42"),
            ],
        )]);
        assert!(ledger.credits().is_empty());
        assert_eq!(ledger.debits().len(), 1);
        assert_eq!(ledger.debits()[0].reference, "OK");
    }

    #[test]
    fn test_records_accumulate_across_sheets() {
        let ledger = clean(vec![
            statement_sheet("S1", vec![data_row("A", "a", "-1")]),
            Sheet::new("Empty"),
            statement_sheet("S2", vec![data_row("B", "b", "-2"), data_row("C", "c", "3")]),
        ]);
        let (credits, debits) = ledger.to_csv_pair().unwrap();
        assert_eq!(credits, "A,a,1\nB,b,2\n");
        assert_eq!(debits, "C,c,3\n");
    }

    #[test]
    fn test_short_sheet_contributes_nothing() {
        let rows: Vec<Vec<String>> = (0..39).map(|_| data_row("R", "M", "5")).collect();
        let ledger = clean(vec![Sheet::from_rows("S", rows)]);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_footer_counted_after_trailing_blank_rows_removed() {
        let mut sheet = statement_sheet("S1", vec![data_row("A", "a", "7")]);
        // Blank trailing rows are not part of the sheet.
        sheet.set_cell(CellRef { row: 80, col: 0 }, "");
        let ledger = clean(vec![sheet]);
        assert_eq!(ledger.debits().len(), 1);
    }

    #[test]
    fn test_merged_header_is_dissolved() {
        let mut sheet = statement_sheet("S1", vec![data_row("A", "a", "-9")]);
        let region = MergeRegion::parse("A1:AM3").unwrap();
        sheet.add_merge(region);
        let mut workbook = Workbook::new(vec![sheet]);

        let ledger = StatementCleaner::new()
            .clean_workbook(&mut workbook)
            .unwrap();

        assert!(workbook.sheets()[0].merge_regions().is_empty());
        assert_eq!(ledger.credits().len(), 1);
        assert_eq!(ledger.credits()[0].amount.to_string(), "9");
    }

    #[test]
    fn test_each_valid_row_lands_in_exactly_one_bucket() {
        let amounts = ["-1", "1", "-0", "0", "12.340", "-12.340", "1e2"];
        let data = amounts
            .iter()
            .enumerate()
            .map(|(i, a)| data_row(&format!("R{}", i), "m", a))
            .collect();
        let ledger = clean(vec![statement_sheet("S", data)]);

        assert_eq!(ledger.credits().len() + ledger.debits().len(), amounts.len());
        for record in ledger.credits().iter().chain(ledger.debits()) {
            assert!(!record.amount.is_negative());
            let text = record.amount.to_string();
            assert!(!text.contains(','));
            assert_eq!(crate::Amount::parse(&text).unwrap().to_string(), text);
        }
        let credit_refs: Vec<_> = ledger.credits().iter().map(|r| r.reference.as_str()).collect();
        assert_eq!(credit_refs, vec!["R0", "R2", "R5"]);
    }

    #[test]
    fn test_custom_layout_without_trimming() {
        let layout = Layout {
            header_rows: 0,
            footer_rows: 0,
            reference_column: 0,
            memo_column: 1,
            amount_column: 2,
            min_row_width: 3,
        };
        let sheet = Sheet::from_rows(
            "S",
            vec![
                vec!["Ref", "Memo", "Amount"],
                vec!["A", "a", "-3"],
                vec!["B", "b", "4"],
            ],
        );
        let ledger = StatementCleaner::with_layout(layout)
            .clean_workbook(&mut Workbook::new(vec![sheet]))
            .unwrap();
        assert_eq!(ledger.credits().len(), 1);
        assert_eq!(ledger.debits().len(), 1);
        assert_eq!(ledger.debits()[0].memo, "b");
    }
}
