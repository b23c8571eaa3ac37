//! The cleaner's output: credit and debit records in sheet order.

use crate::error::Result;
use crate::record::{Bucket, OutputRecord};
use csv::WriterBuilder;
use std::io::Write;

/// Credit and debit records collected from a workbook.
///
/// # Invariants
///
/// - Every amount is non-negative
/// - Records keep the order their rows had in the workbook
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    credits: Vec<OutputRecord>,
    debits: Vec<OutputRecord>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to the given bucket.
    pub fn push(&mut self, bucket: Bucket, record: OutputRecord) {
        match bucket {
            Bucket::Credit => self.credits.push(record),
            Bucket::Debit => self.debits.push(record),
        }
    }

    pub fn credits(&self) -> &[OutputRecord] {
        &self.credits
    }

    pub fn debits(&self) -> &[OutputRecord] {
        &self.debits
    }

    /// Returns `true` if neither bucket holds a record.
    pub fn is_empty(&self) -> bool {
        self.credits.is_empty() && self.debits.is_empty()
    }

    /// Writes one bucket as header-less CSV.
    pub fn write_csv<W: Write>(&self, bucket: Bucket, writer: W) -> Result<()> {
        let records = match bucket {
            Bucket::Credit => &self.credits,
            Bucket::Debit => &self.debits,
        };

        let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
        for record in records {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Renders one bucket as header-less CSV text. An empty bucket renders as
    /// an empty string.
    pub fn to_csv(&self, bucket: Bucket) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(bucket, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Renders both buckets: `(credits, debits)`.
    pub fn to_csv_pair(&self) -> Result<(String, String)> {
        Ok((self.to_csv(Bucket::Credit)?, self.to_csv(Bucket::Debit)?))
    }
}
