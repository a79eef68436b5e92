use anyhow::Result;
use log::{debug, info};
use std::io::Write;
use std::path::Path;

use crate::engine::progress::setup_progress;
use crate::engine::tools::canonicalize_paths;
use crate::pipeline::{self, PipelineHandles, PipelineTuning};
use crate::{Opts, RunReport};

/// Start discovery, the worker pool and the writer. Returns handles; the caller must pass them
/// to [`shutdown_pipeline`] to drain and join.
///
/// The writer is spawned first so it is draining before the first result arrives.
pub fn run_pipeline<W>(root: &Path, opts: &Opts, sink: W) -> Result<PipelineHandles<W>>
where
    W: Write + Send + 'static,
{
    let (root, output_canonical) = canonicalize_paths(root, &opts.output)?;
    let tuning = PipelineTuning::from_opts(opts)?;
    let cancel = opts.cancel.clone().unwrap_or_default();
    info!(
        "Input directory: {}. Workers: {}",
        root.display(),
        tuning.num_workers
    );
    debug!("{:?}", tuning);

    let channels =
        pipeline::create_pipeline_channels(&root, &output_canonical, opts, &tuning, &cancel);
    let (progress, on_written) = setup_progress(opts.verbose, channels.path_count_rx);

    let writer_handle = pipeline::spawn_writer(sink, channels.result_rx, on_written);

    let worker_handles = pipeline::spawn_workers(
        channels.task_rx,
        &channels.result_tx,
        &opts.settings,
        &cancel,
        tuning.num_workers,
    );

    let walk_handle = pipeline::spawn_walk_thread(
        channels.task_tx,
        channels.path_count_tx,
        channels.ctx,
        tuning.parallel_walk,
    );

    Ok(PipelineHandles {
        result_tx: channels.result_tx,
        walk_handle,
        worker_handles,
        writer_handle,
        progress,
        cancel,
        first_error: channels.first_error,
        skipped_paths: channels.skipped_paths,
    })
}

/// What a drained run produced: the sink handed back by the writer, the report, and the first
/// traversal error when strict discovery stopped early.
pub struct PipelineOutcome<W> {
    pub sink: W,
    pub report: RunReport,
    pub first_error: Option<String>,
    pub cancelled: bool,
}

/// Three-phase drain:
/// 1. join discovery (its exit closed the Task Queue),
/// 2. join every worker (each exits once the Task Queue is closed and empty),
/// 3. drop the last Result Queue sender and join the writer.
///
/// All threads are joined before any panic or writer error is reported.
pub fn shutdown_pipeline<W>(handles: PipelineHandles<W>) -> Result<PipelineOutcome<W>> {
    let PipelineHandles {
        result_tx,
        walk_handle,
        worker_handles,
        writer_handle,
        progress,
        cancel,
        first_error,
        skipped_paths,
    } = handles;

    let walked = walk_handle.join();
    debug!("shutdown: discovery finished, task queue closed");

    let mut worker_panicked = false;
    for h in worker_handles {
        match h.join() {
            Ok(n) => debug!("shutdown: worker handled {} tasks", n),
            Err(_) => worker_panicked = true,
        }
    }
    debug!("shutdown: workers exited, closing result queue");

    drop(result_tx);
    let written = writer_handle.join();
    drop(progress);

    let paths_discovered = walked.map_err(|_| anyhow::anyhow!("walk thread panicked"))?;
    if worker_panicked {
        anyhow::bail!("worker thread panicked");
    }
    let (sink, stats) = written.map_err(|_| anyhow::anyhow!("writer thread panicked"))??;

    let skipped_paths = std::mem::take(
        &mut *skipped_paths
            .lock()
            .map_err(|_| anyhow::anyhow!("skipped path list poisoned"))?,
    );
    let first_error = first_error
        .lock()
        .map_err(|_| anyhow::anyhow!("first error slot poisoned"))?
        .take();

    Ok(PipelineOutcome {
        sink,
        report: RunReport {
            paths_discovered,
            files_written: stats.files_written,
            rows_written: stats.rows_written,
            failed_files: stats.failed_files,
            cancelled_files: stats.cancelled_files,
            skipped_paths,
        },
        first_error,
        cancelled: cancel.is_cancelled(),
    })
}
