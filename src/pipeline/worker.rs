use crossbeam_channel::{Receiver, Sender};
use log::debug;
use std::thread::{self, JoinHandle};

use crate::engine::processor::process_file;
use crate::error::FileError;
use crate::{CancelToken, CompletedTask, CountSettings, Task};

/// Single worker: take tasks until the Task Queue is closed and empty, process each file, hand the
/// completed task to the writer. Blocks on a full Result Queue. Returns the number of tasks handled.
fn worker_loop(
    task_rx: Receiver<Task>,
    result_tx: Sender<CompletedTask>,
    settings: CountSettings,
    cancel: CancelToken,
) -> usize {
    let mut handled = 0_usize;
    while let Ok(task) = task_rx.recv() {
        let result = if cancel.is_cancelled() {
            Err(FileError::Cancelled)
        } else {
            process_file(&task.path, &settings)
        };
        if result_tx.send(task.complete(result)).is_err() {
            debug!("worker: result queue closed, exiting");
            break;
        }
        handled += 1;
    }
    drop(result_tx);
    handled
}

/// Spawn `num_workers` workers sharing `task_rx`. Each gets its own clone of `result_tx`; the
/// caller keeps the original and drops it once the workers are joined.
pub fn spawn_workers(
    task_rx: Receiver<Task>,
    result_tx: &Sender<CompletedTask>,
    settings: &CountSettings,
    cancel: &CancelToken,
    num_workers: usize,
) -> Vec<JoinHandle<usize>> {
    (0..num_workers)
        .map(|_| {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            let settings = settings.clone();
            let cancel = cancel.clone();
            thread::spawn(move || worker_loop(task_rx, result_tx, settings, cancel))
        })
        .collect()
}
