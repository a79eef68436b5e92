//! Caps the worker pool by the process open-file limit (Unix).
//!
//! Each worker holds one input file open at a time; the walker and the output sink take the rest.

/// Descriptors budgeted per worker: its input file plus a share of the walker's directory handles.
const FDS_PER_WORKER: usize = 2;

/// Share of the soft limit handed to workers. The rest covers the output file, stdio and the walker.
const FD_LIMIT_FRACTION: f64 = 0.8;

#[cfg(unix)]
fn soft_nofile_limit() -> Option<u64> {
    use std::mem::MaybeUninit;
    let mut rlim = MaybeUninit::<libc::rlimit>::uninit();
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, rlim.as_mut_ptr()) } != 0 {
        return None;
    }
    let cur = unsafe { rlim.assume_init() }.rlim_cur;
    (cur != libc::RLIM_INFINITY && cur <= i64::MAX as u64).then_some(cur)
}

#[cfg(not(unix))]
fn soft_nofile_limit() -> Option<u64> {
    None
}

/// Largest worker count whose open input files fit in the usable share of the limit.
/// `None` when the platform reports no limit; never `Some(0)`.
pub fn max_workers_by_fd_limit() -> Option<usize> {
    let limit = soft_nofile_limit()?;
    let usable = (limit as f64 * FD_LIMIT_FRACTION) as usize;
    Some((usable / FDS_PER_WORKER).max(1))
}
