//! End-to-end runs over temp directory trees, plus the discovery, worker and writer stages
//! driven directly over channels.

use crossbeam_channel::bounded;
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use stockcount::pipeline::{
    PipelineContext, WalkOutcome, run_walk_loop, spawn_workers, write_results,
};
use stockcount::{
    CancelToken, CompletedTask, CountSettings, FileError, Opts, StockCounts, Summary, Task,
    count_dir, count_into,
};

const HEADER: &str = "filepath,store_id,inStock,outOfStock,totalProducts";

fn write_file(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

fn canonical(p: &Path) -> String {
    p.canonicalize().unwrap().display().to_string()
}

/// Opts whose output lands outside `root`.
fn opts_for(out_dir: &TempDir) -> Opts {
    Opts {
        output: out_dir.path().join("count_output.csv"),
        ..Opts::default()
    }
}

fn run_to_string(root: &Path, opts: &Opts) -> (stockcount::RunReport, String) {
    let (report, sink) = count_into(root, opts, Vec::new()).unwrap();
    (report, String::from_utf8(sink).unwrap())
}

/// Data rows of a report as a set (row order across files is not defined).
fn row_set(output: &str) -> BTreeSet<String> {
    let mut lines = output.lines();
    assert_eq!(lines.next(), Some(HEADER));
    lines.map(str::to_string).collect()
}

fn rows<const N: usize>(items: [String; N]) -> BTreeSet<String> {
    items.into_iter().collect()
}

fn many_files(root: &Path, n: usize) {
    for i in 0..n {
        let mut body = String::from("sku,store_id,stock\n");
        for j in 0..(i % 7 + 1) {
            let stock = (i as i64 + j as i64) % 4 - 1;
            body.push_str(&format!("{}-{},S{},{}\n", i, j, j % 3, stock));
        }
        write_file(root, &format!("d{}/f{}.csv", i % 5, i), &body);
    }
}

// --- end-to-end ---

#[test]
fn test_valid_and_malformed_file() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let good = write_file(root.path(), "good.csv", "store_id,stock\nA,5\nA,-1\nB,0\n");
    let bad = write_file(root.path(), "bad.csv", "store_id,stock\nA,five\n");

    let (report, output) = run_to_string(root.path(), &opts_for(&out));

    let good = canonical(&good);
    assert_eq!(
        row_set(&output),
        rows([format!("{good},A,1,1,2"), format!("{good},B,0,1,1")])
    );
    assert_eq!(report.paths_discovered, 2);
    assert_eq!(report.files_written, 1);
    assert_eq!(report.rows_written, 2);
    assert_eq!(report.failed_files.len(), 1);
    assert_eq!(report.failed_files[0].0, PathBuf::from(canonical(&bad)));
}

#[test]
fn test_missing_column_file_contributes_no_rows() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_file(root.path(), "qty.csv", "store_id,qty\nA,1\n");

    let (report, output) = run_to_string(root.path(), &opts_for(&out));
    assert!(row_set(&output).is_empty());
    assert_eq!(report.failed_files.len(), 1);
    assert!(report.failed_files[0].1.contains("stock"));
}

#[test]
fn test_empty_and_header_only_files_write_sentinel() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let empty = write_file(root.path(), "empty.csv", "");
    let header_only = write_file(root.path(), "header.csv", "store_id,stock\n");

    let (_, output) = run_to_string(root.path(), &opts_for(&out));
    assert_eq!(
        row_set(&output),
        rows([
            format!("{},NAN,0,0,0", canonical(&empty)),
            format!("{},NAN,0,0,0", canonical(&header_only)),
        ])
    );
}

#[test]
fn test_rows_of_one_file_are_contiguous() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    many_files(root.path(), 30);
    let opts = Opts {
        num_workers: Some(4),
        task_queue_cap: 2,
        result_queue_cap: 1,
        ..opts_for(&out)
    };

    let (_, output) = run_to_string(root.path(), &opts);
    let mut seen = BTreeSet::new();
    let mut current: Option<String> = None;
    for line in output.lines().skip(1) {
        let path = line.split(',').next().unwrap().to_string();
        if current.as_deref() != Some(path.as_str()) {
            assert!(seen.insert(path.clone()), "rows of {} interleaved", path);
            current = Some(path);
        }
    }
    assert_eq!(seen.len(), 30);
}

#[test]
fn test_worker_count_does_not_change_rows() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    many_files(root.path(), 40);

    let single = Opts {
        num_workers: Some(1),
        ..opts_for(&out)
    };
    let pooled = Opts {
        num_workers: Some(4),
        task_queue_cap: 1,
        result_queue_cap: 1,
        ..opts_for(&out)
    };
    let (r1, o1) = run_to_string(root.path(), &single);
    let (r4, o4) = run_to_string(root.path(), &pooled);
    assert_eq!(row_set(&o1), row_set(&o4));
    assert_eq!(r1.files_written, 40);
    assert_eq!(r4.files_written, 40);
    assert_eq!(r1.rows_written, r4.rows_written);
}

#[test]
fn test_parallel_walk_matches_serial_walk() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    many_files(root.path(), 12);

    let serial = opts_for(&out);
    let parallel = Opts {
        parallel_walk: true,
        ..opts_for(&out)
    };
    let (_, a) = run_to_string(root.path(), &serial);
    let (_, b) = run_to_string(root.path(), &parallel);
    assert_eq!(row_set(&a), row_set(&b));
}

#[test]
fn test_discovery_skips_junk_excludes_and_config() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let kept = write_file(root.path(), "a/stock.csv", "store_id,stock\nA,1\n");
    write_file(root.path(), "a/.DS_Store", "junk");
    write_file(root.path(), "a/old.bak", "junk");
    write_file(root.path(), ".stockcount.toml", "[settings]\nstrict = false\n");

    let opts = Opts {
        exclude: vec!["*.bak".to_string()],
        ..opts_for(&out)
    };
    let (report, output) = run_to_string(root.path(), &opts);
    assert_eq!(report.paths_discovered, 1);
    assert!(report.failed_files.is_empty());
    assert_eq!(
        row_set(&output),
        rows([format!("{},A,1,0,1", canonical(&kept))])
    );
}

#[test]
fn test_count_dir_skips_its_own_output() {
    let root = TempDir::new().unwrap();
    write_file(root.path(), "s.csv", "store_id,stock\nA,0\n");
    let opts = Opts {
        output: root.path().join("count_output.csv"),
        ..Opts::default()
    };

    count_dir(root.path(), &opts).unwrap();
    let second = count_dir(root.path(), &opts).unwrap();
    assert_eq!(second.paths_discovered, 1);
    assert!(second.failed_files.is_empty());

    let output = fs::read_to_string(&opts.output).unwrap();
    assert_eq!(
        row_set(&output),
        rows([format!("{},A,0,1,1", canonical(&root.path().join("s.csv")))])
    );
}

#[test]
fn test_strict_mode_fails_on_bad_file() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_file(root.path(), "bad.csv", "store_id,stock\nA,x\n");
    let opts = Opts {
        strict: true,
        ..opts_for(&out)
    };
    let err = count_into(root.path(), &opts, Vec::new()).unwrap_err();
    assert!(err.to_string().contains("strict"));
}

#[test]
fn test_root_must_be_directory() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let file = write_file(root.path(), "s.csv", "store_id,stock\n");
    assert!(count_into(&file, &opts_for(&out), Vec::new()).is_err());
    assert!(count_into(&root.path().join("missing"), &opts_for(&out), Vec::new()).is_err());
}

#[test]
fn test_cancelled_run_returns_error() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    many_files(root.path(), 10);
    let cancel = CancelToken::new();
    cancel.cancel();
    let opts = Opts {
        cancel: Some(cancel),
        ..opts_for(&out)
    };
    let err = count_into(root.path(), &opts, Vec::new()).unwrap_err();
    assert!(err.to_string().contains("cancelled"));
}

/// Sink that rejects every write.
#[derive(Debug)]
struct FailingSink;

impl Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }
}

#[test]
fn test_sink_failure_on_final_flush_is_fatal() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    many_files(root.path(), 20);
    let opts = Opts {
        result_queue_cap: 1,
        ..opts_for(&out)
    };
    assert!(count_into(root.path(), &opts, FailingSink).is_err());
}

#[test]
fn test_sink_failure_mid_run_stops_pipeline() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    // Far more output than the writer buffers, so a row write hits the sink before the end.
    let store = "store-with-a-fairly-long-identifier-".repeat(2);
    for i in 0..300 {
        let mut body = String::from("store_id,stock\n");
        for j in 0..20 {
            body.push_str(&format!("{store}{j},{}\n", j % 3));
        }
        write_file(root.path(), &format!("f{i}.csv"), &body);
    }
    let opts = Opts {
        num_workers: Some(4),
        task_queue_cap: 1,
        result_queue_cap: 1,
        ..opts_for(&out)
    };
    let err = count_into(root.path(), &opts, FailingSink).unwrap_err();
    assert!(
        format!("{err:#}").contains("write output rows"),
        "unexpected error: {err:#}"
    );
}

// --- stages ---

fn walk_ctx(strict: bool, cancel: CancelToken) -> PipelineContext {
    PipelineContext {
        root: PathBuf::from("/data"),
        output_canonical: None,
        exclude: Vec::new(),
        strict,
        follow_links: false,
        cancel,
        first_error: Arc::new(Mutex::new(None)),
        skipped_paths: Arc::new(Mutex::new(Vec::new())),
    }
}

fn ok(path: &str, is_dir: bool) -> WalkOutcome {
    WalkOutcome::Ok {
        path: PathBuf::from(path),
        is_dir,
    }
}

#[test]
fn test_walk_loop_sends_files_and_records_errors() {
    let ctx = walk_ctx(false, CancelToken::new());
    let skipped = Arc::clone(&ctx.skipped_paths);
    let (task_tx, task_rx) = bounded::<Task>(10);
    let (count_tx, count_rx) = bounded::<usize>(1);
    let outcomes = vec![
        ok("/data", true),
        ok("/data/a", true),
        ok("/data/a/1.csv", false),
        WalkOutcome::Err {
            msg: "permission denied".to_string(),
            path: None,
        },
        ok("/data/2.csv", false),
    ];

    let count = run_walk_loop(task_tx, count_tx, ctx, outcomes.into_iter(), true);
    assert_eq!(count, 2);
    assert_eq!(count_rx.recv().unwrap(), 2);
    let paths: Vec<PathBuf> = task_rx.iter().map(|t| t.path).collect();
    assert_eq!(
        paths,
        vec![PathBuf::from("/data/a/1.csv"), PathBuf::from("/data/2.csv")]
    );
    let skipped = skipped.lock().unwrap();
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].0.display().to_string().contains("/data/a/1.csv"));
}

#[test]
fn test_walk_loop_strict_stops_on_first_error() {
    let ctx = walk_ctx(true, CancelToken::new());
    let first_error = Arc::clone(&ctx.first_error);
    let (task_tx, task_rx) = bounded::<Task>(10);
    let (count_tx, _count_rx) = bounded::<usize>(1);
    let outcomes = vec![
        ok("/data/1.csv", false),
        WalkOutcome::Err {
            msg: "boom".to_string(),
            path: Some(PathBuf::from("/data/locked")),
        },
        ok("/data/2.csv", false),
    ];

    assert_eq!(
        run_walk_loop(task_tx, count_tx, ctx, outcomes.into_iter(), true),
        1
    );
    assert_eq!(task_rx.iter().count(), 1);
    assert!(first_error.lock().unwrap().as_deref().unwrap().contains("boom"));
}

#[test]
fn test_walk_loop_stops_when_cancelled() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let (task_tx, task_rx) = bounded::<Task>(10);
    let (count_tx, _count_rx) = bounded::<usize>(1);
    let outcomes = vec![ok("/data/1.csv", false), ok("/data/2.csv", false)];

    let count = run_walk_loop(
        task_tx,
        count_tx,
        walk_ctx(false, cancel),
        outcomes.into_iter(),
        true,
    );
    assert_eq!(count, 0);
    assert!(task_rx.recv().is_err());
}

#[test]
fn test_workers_drain_queue_and_exit() {
    let root = TempDir::new().unwrap();
    let a = write_file(root.path(), "a.csv", "store_id,stock\nA,1\n");
    let b = write_file(root.path(), "b.csv", "store_id\nA\n");
    let (task_tx, task_rx) = bounded::<Task>(4);
    let (result_tx, result_rx) = bounded::<CompletedTask>(4);
    task_tx.send(Task::new(a.clone())).unwrap();
    task_tx.send(Task::new(b.clone())).unwrap();
    drop(task_tx);

    let handles = spawn_workers(
        task_rx,
        &result_tx,
        &CountSettings::default(),
        &CancelToken::new(),
        3,
    );
    let handled: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    drop(result_tx);
    assert_eq!(handled, 2);

    let mut results: Vec<CompletedTask> = result_rx.iter().collect();
    results.sort_by(|x, y| x.path.cmp(&y.path));
    assert_eq!(results[0].path, a);
    assert_eq!(
        results[0].result.as_ref().unwrap()["A"],
        StockCounts {
            total: 1,
            in_stock: 1,
            out_of_stock: 0
        }
    );
    assert!(matches!(
        results[1].result,
        Err(FileError::MissingColumn(_))
    ));
}

#[test]
fn test_workers_mark_tasks_cancelled() {
    let (task_tx, task_rx) = bounded::<Task>(4);
    let (result_tx, result_rx) = bounded::<CompletedTask>(4);
    task_tx.send(Task::new(PathBuf::from("/nonexistent/a.csv"))).unwrap();
    drop(task_tx);
    let cancel = CancelToken::new();
    cancel.cancel();

    for h in spawn_workers(task_rx, &result_tx, &CountSettings::default(), &cancel, 2) {
        h.join().unwrap();
    }
    drop(result_tx);
    let results: Vec<CompletedTask> = result_rx.iter().collect();
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0].result, Err(FileError::Cancelled)));
}

#[test]
fn test_writer_serializes_and_reports() {
    let (tx, rx) = bounded::<CompletedTask>(4);
    let mut summary = Summary::new();
    summary.insert(
        "B".to_string(),
        StockCounts {
            total: 3,
            in_stock: 2,
            out_of_stock: 1,
        },
    );
    summary.insert(
        "A".to_string(),
        StockCounts {
            total: 1,
            in_stock: 0,
            out_of_stock: 1,
        },
    );
    tx.send(Task::new(PathBuf::from("/d/x.csv")).complete(Ok(summary)))
        .unwrap();
    tx.send(
        Task::new(PathBuf::from("/d/y.csv"))
            .complete(Err(FileError::MissingColumn("stock".to_string()))),
    )
    .unwrap();
    tx.send(Task::new(PathBuf::from("/d/z.csv")).complete(Err(FileError::Cancelled)))
        .unwrap();
    drop(tx);

    let (sink, stats) = write_results(Vec::new(), rx, None).unwrap();
    let output = String::from_utf8(sink).unwrap();
    assert_eq!(
        output,
        format!("{HEADER}\n/d/x.csv,A,0,1,1\n/d/x.csv,B,2,1,3\n")
    );
    assert_eq!(stats.files_written, 1);
    assert_eq!(stats.rows_written, 2);
    assert_eq!(stats.cancelled_files, 1);
    assert_eq!(stats.failed_files.len(), 1);
    assert_eq!(stats.failed_files[0].0, PathBuf::from("/d/y.csv"));
}

#[test]
fn test_writer_sink_error_is_returned() {
    let (tx, rx) = bounded::<CompletedTask>(1);
    drop(tx);
    assert!(write_results(FailingSink, rx, None).is_err());
}
