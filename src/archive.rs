//! Zip packaging of the cleaned CSV files.

use crate::error::{CleanerError, Result};
use crate::ledger::Ledger;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive member holding the credit records.
pub const CREDITS_ENTRY: &str = "credits.csv";

/// Archive member holding the debit records.
pub const DEBITS_ENTRY: &str = "debits.csv";

/// Suggested download name for the archive.
pub const ARCHIVE_FILENAME: &str = "processed_files.zip";

/// Writes both CSV texts into a new zip archive.
///
/// Both members are always present, even when their text is empty.
pub fn bundle(credits: &str, debits: &str) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(CREDITS_ENTRY, options)?;
    zip.write_all(credits.as_bytes())?;

    zip.start_file(DEBITS_ENTRY, options)?;
    zip.write_all(debits.as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Renders a ledger and bundles it, refusing a ledger with no records.
pub fn package(ledger: &Ledger) -> Result<Vec<u8>> {
    let (credits, debits) = ledger.to_csv_pair()?;
    if credits.is_empty() && debits.is_empty() {
        return Err(CleanerError::EmptyResult);
    }
    bundle(&credits, &debits)
}
