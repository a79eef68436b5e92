//! Pipeline context and tuning: the per-run object holding queue handles, pool size and the
//! shared state the discovery thread reports into.

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender, bounded};
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::engine::progress::ProgressBar;
use crate::pipeline::writer::WriteStats;
use crate::utils::config::WorkerThreadLimits;
use crate::utils::fd_limit::max_workers_by_fd_limit;
use crate::{CancelToken, CompletedTask, Opts, Task};

/// Shared list of (path, message) pairs recorded by discovery.
pub type SharedPathErrors = Arc<Mutex<Vec<(PathBuf, String)>>>;

/// Pool size, queue capacities and walk mode for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineTuning {
    pub num_workers: usize,
    pub task_queue_cap: usize,
    pub result_queue_cap: usize,
    pub parallel_walk: bool,
}

impl PipelineTuning {
    /// Resolve tuning from opts. Worker count defaults to available parallelism capped by the
    /// FD limit; an explicit count is honored as given. Zero values are rejected.
    pub fn from_opts(opts: &Opts) -> Result<Self> {
        if opts.task_queue_cap == 0 || opts.result_queue_cap == 0 {
            anyhow::bail!(
                "queue capacities must be at least 1 (task: {}, result: {})",
                opts.task_queue_cap,
                opts.result_queue_cap
            );
        }
        let num_workers = match opts.num_workers {
            Some(0) => anyhow::bail!("worker count must be at least 1"),
            Some(n) => n,
            None => {
                let avail = WorkerThreadLimits::available();
                match max_workers_by_fd_limit() {
                    Some(fd_cap) if fd_cap < avail => {
                        debug!("Capping workers {} -> {} (FD limit ~80%)", avail, fd_cap);
                        fd_cap.max(WorkerThreadLimits::FLOOR_THREADS)
                    }
                    _ => avail.max(WorkerThreadLimits::FLOOR_THREADS),
                }
            }
        };
        Ok(Self {
            num_workers,
            task_queue_cap: opts.task_queue_cap,
            result_queue_cap: opts.result_queue_cap,
            parallel_walk: opts.parallel_walk,
        })
    }
}

/// What the discovery thread needs: root, filters, strictness, cancel flag and error sinks.
pub struct PipelineContext {
    pub root: PathBuf,
    pub output_canonical: Option<PathBuf>,
    pub exclude: Vec<String>,
    pub strict: bool,
    pub follow_links: bool,
    pub cancel: CancelToken,
    pub first_error: Arc<Mutex<Option<String>>>,
    pub skipped_paths: SharedPathErrors,
}

/// Channels and shared state for one run. Discovery gets `task_tx`, `path_count_tx`, `ctx`;
/// workers get `task_rx` and clones of `result_tx`; the writer gets `result_rx`.
pub struct PipelineChannels {
    pub task_tx: Sender<Task>,
    pub task_rx: Receiver<Task>,
    pub result_tx: Sender<CompletedTask>,
    pub result_rx: Receiver<CompletedTask>,
    pub path_count_tx: Sender<usize>,
    pub path_count_rx: Receiver<usize>,
    pub first_error: Arc<Mutex<Option<String>>>,
    pub skipped_paths: SharedPathErrors,
    pub ctx: PipelineContext,
}

pub fn create_pipeline_channels(
    root: &Path,
    output_canonical: &Option<PathBuf>,
    opts: &Opts,
    tuning: &PipelineTuning,
    cancel: &CancelToken,
) -> PipelineChannels {
    let (task_tx, task_rx) = bounded::<Task>(tuning.task_queue_cap);
    let (result_tx, result_rx) = bounded::<CompletedTask>(tuning.result_queue_cap);
    let (path_count_tx, path_count_rx) = bounded::<usize>(1);
    let first_error: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let skipped_paths: SharedPathErrors = Arc::new(Mutex::new(Vec::new()));

    let mut exclude = crate::utils::config::PackagePaths::get().default_exclude_patterns();
    exclude.extend(opts.exclude.iter().cloned());

    let ctx = PipelineContext {
        root: root.to_path_buf(),
        output_canonical: output_canonical.clone(),
        exclude,
        strict: opts.strict,
        follow_links: opts.follow_links,
        cancel: cancel.clone(),
        first_error: Arc::clone(&first_error),
        skipped_paths: Arc::clone(&skipped_paths),
    };

    PipelineChannels {
        task_tx,
        task_rx,
        result_tx,
        result_rx,
        path_count_tx,
        path_count_rx,
        first_error,
        skipped_paths,
        ctx,
    }
}

/// Handles returned by [`run_pipeline`](super::run_pipeline). Pass to
/// [`shutdown_pipeline`](super::shutdown_pipeline) for the three-phase drain.
///
/// `result_tx` is the orchestrator's own sender: the Result Queue closes only when it is
/// dropped after every worker has exited.
pub struct PipelineHandles<W> {
    pub result_tx: Sender<CompletedTask>,
    pub walk_handle: JoinHandle<usize>,
    pub worker_handles: Vec<JoinHandle<usize>>,
    pub writer_handle: JoinHandle<Result<(W, WriteStats)>>,
    pub progress: Option<ProgressBar>,
    pub cancel: CancelToken,
    pub first_error: Arc<Mutex<Option<String>>>,
    pub skipped_paths: SharedPathErrors,
}
