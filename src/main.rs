//! Statement Cleaner CLI
//!
//! Runs the upload service or cleans a single workbook from disk.
//!
//! # Usage
//!
//! ```bash
//! statement-cleaner serve --bind 0.0.0.0:6666
//! statement-cleaner clean statement.xlsx --output processed_files.zip
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity
//! - `CLEANER_BIND`, `CLEANER_MAX_UPLOAD_BYTES`, `CLEANER_UPLOAD_DIR`: defaults for `serve`

use clap::Parser;
use statement_cleaner::config::{CleanArgs, Cli, Command, ServeArgs};
use statement_cleaner::gateway::{self, AppState};
use statement_cleaner::{archive, Result, StatementCleaner};
use std::fs;
use std::process;

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve(args) => serve(args),
        Command::Clean(args) => clean(args),
    }
}

fn serve(args: ServeArgs) -> Result<()> {
    let mut state = AppState::new(StatementCleaner::with_layout(args.layout.to_layout()?));
    if let Some(dir) = args.upload_dir {
        state = state.with_upload_dir(dir);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(gateway::serve(args.bind, state, args.max_upload_bytes))?;
    Ok(())
}

fn clean(args: CleanArgs) -> Result<()> {
    let cleaner = StatementCleaner::with_layout(args.layout.to_layout()?);
    let ledger = cleaner.clean_file(&args.input)?;
    let bytes = archive::package(&ledger)?;
    fs::write(&args.output, bytes)?;

    log::info!(
        "Wrote {} ({} credits, {} debits)",
        args.output.display(),
        ledger.credits().len(),
        ledger.debits().len()
    );
    Ok(())
}
