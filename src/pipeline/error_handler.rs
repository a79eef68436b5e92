use anyhow::Result;
use log::{info, warn};

use crate::{Opts, RunReport};

/// Check a drained run. Strict mode turns traversal errors and failed files into a run error;
/// otherwise they are only summarized. Call after the output has been flushed.
pub fn check_for_initial_error_or_failures(
    opts: &Opts,
    report: &RunReport,
    first_error: Option<String>,
) -> Result<()> {
    if opts.strict
        && let Some(msg) = first_error
    {
        return Err(anyhow::anyhow!("strict mode: walk error: {}", msg));
    }

    let skipped = report.skipped_paths.len();
    if skipped > 0 {
        warn!(
            "Skipped {} paths due to permission errors or access issues",
            skipped
        );
        if opts.verbose {
            for (p, msg) in &report.skipped_paths {
                eprintln!("  skipped: {} ({})", p.display(), msg);
            }
        }
    }

    let failed = report.failed_files.len();
    if failed > 0 {
        info!(
            "{} of {} files could not be processed",
            failed, report.paths_discovered
        );
        if opts.strict {
            anyhow::bail!("strict mode: {} files failed", failed);
        }
    }
    Ok(())
}
