//! Discovery stage: consumes an external walker and feeds the Task Queue.

use crossbeam_channel::Sender;
use log::debug;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crate::Task;
use crate::engine::tools::should_include_in_walk;

use super::context::PipelineContext;

/// One result from a directory walk: a path to consider or an error with optional path.
pub enum WalkOutcome {
    Ok { path: PathBuf, is_dir: bool },
    Err { msg: String, path: Option<PathBuf> },
}

/// Convert a jwalk result into [`WalkOutcome`].
pub fn to_outcome_jwalk(r: Result<jwalk::DirEntry<((), ())>, jwalk::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => WalkOutcome::Ok {
            is_dir: entry.file_type().is_dir(),
            path: entry.path(),
        },
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        },
    }
}

/// Convert a walkdir result into [`WalkOutcome`].
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => WalkOutcome::Ok {
            is_dir: entry.file_type().is_dir(),
            path: entry.into_path(),
        },
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        },
    }
}

fn jwalk_iter(ctx: &PipelineContext) -> Box<dyn Iterator<Item = WalkOutcome>> {
    Box::new(
        jwalk::WalkDir::new(&ctx.root)
            .follow_links(ctx.follow_links)
            .skip_hidden(false)
            .into_iter()
            .map(to_outcome_jwalk),
    )
}

fn walkdir_iter(ctx: &PipelineContext) -> Box<dyn Iterator<Item = WalkOutcome>> {
    Box::new(
        walkdir::WalkDir::new(&ctx.root)
            .follow_links(ctx.follow_links)
            .into_iter()
            .map(to_outcome_walkdir),
    )
}

/// Spawn the discovery thread. It owns `task_tx`; when it returns, the Task Queue closes.
pub fn spawn_walk_thread(
    task_tx: Sender<Task>,
    path_count_tx: Sender<usize>,
    ctx: PipelineContext,
    parallel_walk: bool,
) -> JoinHandle<usize> {
    thread::spawn(move || {
        let iter: Box<dyn Iterator<Item = WalkOutcome>> = match parallel_walk {
            true => jwalk_iter(&ctx),
            false => walkdir_iter(&ctx),
        };
        run_walk_loop(task_tx, path_count_tx, ctx, iter, !parallel_walk)
    })
}

/// Run the discovery loop: consume `iter`, filter with `should_include_in_walk`, send a [`Task`]
/// per included file. Blocks while the Task Queue is full. Errors: strict → record first_error
/// and stop; otherwise push to skipped_paths and continue. Stops early when cancelled or when
/// every worker has gone away. Sends the count on `path_count_tx`, then drops `task_tx`.
///
/// When `track_last_path` is true (serial walk) the last path seen labels errors that carry no path.
pub fn run_walk_loop<I>(
    task_tx: Sender<Task>,
    path_count_tx: Sender<usize>,
    ctx: PipelineContext,
    iter: I,
    track_last_path: bool,
) -> usize
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut count = 0_usize;
    let mut last_path: Option<PathBuf> = None;
    for outcome in iter {
        if ctx.cancel.is_cancelled() {
            debug!("walk: cancelled after {} paths", count);
            break;
        }
        match outcome {
            WalkOutcome::Ok { path, is_dir } => {
                if track_last_path {
                    last_path = Some(path.clone());
                }
                if should_include_in_walk(
                    &path,
                    is_dir,
                    &ctx.root,
                    &ctx.output_canonical,
                    &ctx.exclude,
                ) {
                    if task_tx.send(Task::new(path)).is_err() {
                        debug!("walk: task queue closed, stopping");
                        break;
                    }
                    count += 1;
                }
            }
            WalkOutcome::Err { msg, path } => {
                let label = path.unwrap_or_else(|| {
                    PathBuf::from(format!(
                        "<no-path, last was {}>",
                        last_path
                            .as_ref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| "<none>".to_string())
                    ))
                });
                if ctx.strict {
                    if let Ok(mut first) = ctx.first_error.lock() {
                        first.get_or_insert_with(|| format!("{} ({})", msg, label.display()));
                    }
                    break;
                }
                if let Ok(mut skipped) = ctx.skipped_paths.lock() {
                    skipped.push((label, msg));
                }
            }
        }
    }
    let _ = path_count_tx.send(count);
    drop(task_tx);
    count
}
