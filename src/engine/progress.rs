//! Progress bar for written files (verbose mode only).

use crossbeam_channel::Receiver;
use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};
use std::thread;

pub type ProgressBar = Arc<Mutex<Bar>>;

/// Update the bar's total once discovery knows it. Refreshes the display.
pub fn set_bar_total(pb: &ProgressBar, total: usize) {
    if let Ok(mut bar) = pb.try_lock() {
        bar.total = total;
        let _ = bar.refresh();
    }
}

/// Bar with unknown total; the total is filled in when discovery finishes.
pub fn create_progress_bar(desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " files"
    )))
}

/// Non-blocking update: skipped when the lock is contended, the next update catches up.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Callback that advances `bar` by the number of files the writer just finished.
pub fn progress_callback(bar: &Option<ProgressBar>) -> Option<Box<dyn Fn(usize) + Send>> {
    bar.as_ref().map(|bar| {
        let bar = Arc::clone(bar);
        Box::new(move |n: usize| update_progress_bar(&bar, n)) as Box<dyn Fn(usize) + Send>
    })
}

/// Build the bar (when `verbose`) and its writer callback. The discovered-path count arrives on
/// `path_count_rx` when the walk ends; a helper thread sets the total so the writer never blocks on it.
pub fn setup_progress(
    verbose: bool,
    path_count_rx: Receiver<usize>,
) -> (Option<ProgressBar>, Option<Box<dyn Fn(usize) + Send>>) {
    let bar = verbose.then(|| create_progress_bar("Counting"));
    if let Some(bar) = bar.as_ref() {
        let bar = Arc::clone(bar);
        thread::spawn(move || {
            if let Ok(total) = path_count_rx.recv() {
                set_bar_total(&bar, total);
            }
        });
    }
    let on_written = progress_callback(&bar);
    (bar, on_written)
}
