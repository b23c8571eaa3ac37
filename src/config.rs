//! Command-line and environment configuration.

use crate::error::{CleanerError, Result};
use crate::layout::Layout;
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default listen address for the upload service.
pub const DEFAULT_BIND: &str = "0.0.0.0:6666";

/// Default cap on an uploaded workbook, in bytes.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Statement cleaner: turns a statement workbook into credits.csv and debits.csv.
#[derive(Debug, Parser)]
#[command(name = "statement-cleaner", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP upload service
    Serve(ServeArgs),

    /// Clean a local workbook and write the zip archive to disk
    Clean(CleanArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "CLEANER_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Largest accepted upload, in bytes
    #[arg(long, env = "CLEANER_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Directory for uploaded workbooks while they are processed
    /// (defaults to the system temp directory)
    #[arg(long, env = "CLEANER_UPLOAD_DIR")]
    pub upload_dir: Option<PathBuf>,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Workbook to clean (.xlsx)
    pub input: PathBuf,

    /// Where to write the archive
    #[arg(short, long, default_value = "processed_files.zip")]
    pub output: PathBuf,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

/// Layout overrides. Defaults describe the bank statement report.
#[derive(Debug, Clone, Args)]
pub struct LayoutArgs {
    /// Rows dropped from the top of each sheet
    #[arg(long, default_value_t = Layout::STATEMENT.header_rows)]
    pub header_rows: usize,

    /// Rows dropped from the bottom of each sheet
    #[arg(long, default_value_t = Layout::STATEMENT.footer_rows)]
    pub footer_rows: usize,

    /// Zero-based column of the reference field
    #[arg(long, default_value_t = Layout::STATEMENT.reference_column)]
    pub reference_column: usize,

    /// Zero-based column of the memo field
    #[arg(long, default_value_t = Layout::STATEMENT.memo_column)]
    pub memo_column: usize,

    /// Zero-based column of the amount field
    #[arg(long, default_value_t = Layout::STATEMENT.amount_column)]
    pub amount_column: usize,

    /// Rows with fewer cells are skipped
    #[arg(long, default_value_t = Layout::STATEMENT.min_row_width)]
    pub min_row_width: usize,
}

impl LayoutArgs {
    /// Builds a layout, rejecting columns the width guard would not cover.
    pub fn to_layout(&self) -> Result<Layout> {
        let layout = Layout {
            header_rows: self.header_rows,
            footer_rows: self.footer_rows,
            reference_column: self.reference_column,
            memo_column: self.memo_column,
            amount_column: self.amount_column,
            min_row_width: self.min_row_width,
        };
        if layout.is_consistent() {
            Ok(layout)
        } else {
            Err(CleanerError::InvalidLayout {
                min_row_width: layout.min_row_width,
            })
        }
    }
}
