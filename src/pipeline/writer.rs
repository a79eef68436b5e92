//! Writer: the single consumer of the Result Queue and sole owner of the output sink.

use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use log::{debug, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::error::FileError;
use crate::utils::config::OUTPUT_HEADER;
use crate::{CompletedTask, Summary};

/// Counters accumulated by the writer.
#[derive(Debug, Default)]
pub struct WriteStats {
    pub files_written: usize,
    pub rows_written: usize,
    pub failed_files: Vec<(PathBuf, String)>,
    pub cancelled_files: usize,
}

/// Write every (key, counts) pair of one file. Rows of a file are written back to back.
fn write_summary<W: Write>(
    out: &mut csv::Writer<W>,
    path: &Path,
    summary: &Summary,
) -> csv::Result<usize> {
    let path = path.display().to_string();
    for (key, counts) in summary {
        out.write_record([
            path.as_str(),
            key.as_str(),
            counts.in_stock.to_string().as_str(),
            counts.out_of_stock.to_string().as_str(),
            counts.total.to_string().as_str(),
        ])?;
    }
    Ok(summary.len())
}

/// Drain `result_rx` until it is closed and empty. Failed tasks are logged and recorded, not written.
///
/// A sink error is fatal: the writer attempts a flush and returns the error, which drops
/// `result_rx` so workers stop. On success the flushed sink is handed back.
pub fn write_results<W: Write>(
    sink: W,
    result_rx: Receiver<CompletedTask>,
    on_written: Option<Box<dyn Fn(usize) + Send>>,
) -> Result<(W, WriteStats)> {
    let mut out = csv::WriterBuilder::new().from_writer(sink);
    out.write_record(OUTPUT_HEADER)
        .context("write output header")?;

    let mut stats = WriteStats::default();
    while let Ok(CompletedTask { path, result }) = result_rx.recv() {
        match result {
            Ok(summary) => {
                let written = match write_summary(&mut out, &path, &summary) {
                    Ok(n) => n,
                    Err(e) => {
                        let _ = out.flush();
                        return Err(e)
                            .with_context(|| format!("write output rows for {}", path.display()));
                    }
                };
                stats.files_written += 1;
                stats.rows_written += written;
            }
            Err(FileError::Cancelled) => {
                debug!("{}: cancelled", path.display());
                stats.cancelled_files += 1;
            }
            Err(e) => {
                warn!("Could not process file {}. Error: {}", path.display(), e);
                stats.failed_files.push((path, e.to_string()));
            }
        }
        if let Some(ref cb) = on_written {
            cb(1);
        }
    }

    let sink = out
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flush output: {}", e.error()))?;
    Ok((sink, stats))
}

/// Spawn the writer thread. It owns the sink until it returns.
pub fn spawn_writer<W>(
    sink: W,
    result_rx: Receiver<CompletedTask>,
    on_written: Option<Box<dyn Fn(usize) + Send>>,
) -> JoinHandle<Result<(W, WriteStats)>>
where
    W: Write + Send + 'static,
{
    thread::spawn(move || write_results(sink, result_rx, on_written))
}
