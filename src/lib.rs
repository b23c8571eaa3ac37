//! # Statement Cleaner
//!
//! Turns a bank statement workbook with a fixed report layout into two CSV
//! files, one for credits and one for debits, packaged as a zip archive.
//!
//! ## Design Principles
//!
//! - **Positional layout**: header/footer blocks and columns are fixed by a
//!   [`Layout`], with the bank report as the default
//! - **Decimal amounts**: amounts go through `rust_decimal`, never `f64`
//! - **Best-effort rows**: bad rows are logged and skipped; only structural
//!   workbook errors abort a run
//! - **Stable output**: records keep their workbook order
//!
//! ## Example
//!
//! ```no_run
//! use statement_cleaner::{archive, StatementCleaner};
//!
//! let ledger = StatementCleaner::new().clean_file("statement.xlsx").unwrap();
//! let zip_bytes = archive::package(&ledger).unwrap();
//! std::fs::write("processed_files.zip", zip_bytes).unwrap();
//! ```

pub mod amount;
pub mod archive;
pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod layout;
pub mod ledger;
pub mod record;
pub mod workbook;
pub mod xlsx;

pub use amount::Amount;
pub use engine::StatementCleaner;
pub use error::{CleanerError, Result};
pub use layout::Layout;
pub use ledger::Ledger;
pub use record::{Bucket, OutputRecord, RowOutcome, SkipReason};
pub use workbook::{CellRef, MergeRegion, Sheet, Workbook};
