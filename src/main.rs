//! Stockcount CLI: count per-store stock across every CSV file under a directory.

use anyhow::Result;
use clap::Parser;
use stockcount::engine::arg_parser::Cli;
use stockcount::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::info!(
        "Parsing completed in {:.2} sec",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}
