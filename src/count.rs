//! Run entry points: count a directory tree into a report file or any writer.

use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::pipeline::{
    PipelineOutcome, check_for_initial_error_or_failures, run_pipeline, shutdown_pipeline,
};
use crate::{Opts, RunReport};

/// Count every file under `root` into `sink` and hand the sink back with the report.
///
/// Per-file failures do not fail the run unless `opts.strict`. A sink error, a thread panic, or
/// cancellation does; the sink is flushed before any of these are returned.
pub fn count_into<W>(root: &Path, opts: &Opts, sink: W) -> Result<(RunReport, W)>
where
    W: Write + Send + 'static,
{
    let handles = run_pipeline(root, opts, sink)?;
    let PipelineOutcome {
        mut sink,
        report,
        first_error,
        cancelled,
    } = shutdown_pipeline(handles)?;
    sink.flush().context("flush output")?;

    info!(
        "Wrote {} rows for {} files ({} failed)",
        report.rows_written,
        report.files_written,
        report.failed_files.len()
    );
    if cancelled {
        anyhow::bail!(
            "run cancelled; {} queued files were not processed, output was flushed",
            report.cancelled_files
        );
    }
    check_for_initial_error_or_failures(opts, &report, first_error)?;
    Ok((report, sink))
}

/// Count every file under `root` into the report file at `opts.output` (created or truncated).
pub fn count_dir(root: &Path, opts: &Opts) -> Result<RunReport> {
    let file = File::create(&opts.output)
        .with_context(|| format!("create output file {}", opts.output.display()))?;
    info!("Writing to output file: {}", opts.output.display());
    let (report, sink) = count_into(root, opts, BufWriter::new(file))?;
    let file = sink
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flush output file: {}", e.error()))?;
    file.sync_all().context("sync output file")?;
    Ok(report)
}
