//! Path and filter utilities

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Check if a file is OS metadata junk rather than data
pub fn is_os_hidden_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    match name {
        // macOS
        ".DS_Store" | ".AppleDouble" | ".LSOverride" => true,
        // Windows
        "Thumbs.db" | "ehthumbs.db" | "Desktop.ini" => true,
        // Linux
        ".directory" => true,
        // macOS resource forks
        _ => name.starts_with("._"),
    }
}

/// Returns true if the walked path should become a task.
/// Directories, the root, the output report, OS junk and exclude matches are skipped.
pub fn should_include_in_walk(
    path: &Path,
    is_dir: bool,
    root: &Path,
    output_canonical: &Option<PathBuf>,
    exclude_patterns: &[String],
) -> bool {
    if is_dir || path == root {
        return false;
    }
    if let Some(out) = output_canonical
        && path == out.as_path()
    {
        return false;
    }
    if is_os_hidden_file(path) {
        return false;
    }
    if exclude_patterns.is_empty() {
        return true;
    }
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return true,
    };
    let path_str = path.to_str().unwrap_or("");
    !exclude_patterns
        .iter()
        .any(|pattern| glob_match(pattern, name) || glob_match(pattern, path_str))
}

/// Simple glob pattern matching (supports * and ?)
///
/// Iterative: on mismatch, retry from the last `*` with one more character consumed.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while ti < t.len() {
        match p.get(pi) {
            Some('*') => {
                star = Some((pi, ti));
                pi += 1;
            }
            Some(&c) if c == '?' || c == t[ti] => {
                pi += 1;
                ti += 1;
            }
            _ => match star {
                Some((sp, st)) => {
                    pi = sp + 1;
                    ti = st + 1;
                    star = Some((sp, st + 1));
                }
                None => return false,
            },
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}

/// Canonicalize the input root and, when it exists, the output path (so discovery can skip it).
pub fn canonicalize_paths(root: &Path, output: &Path) -> Result<(PathBuf, Option<PathBuf>)> {
    let root = root
        .canonicalize()
        .with_context(|| format!("canonicalize input directory {}", root.display()))?;
    if !root.is_dir() {
        anyhow::bail!("input path is not a directory: {}", root.display());
    }
    let output_canonical = output.canonicalize().ok();
    Ok((root, output_canonical))
}
