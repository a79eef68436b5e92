//! Load `.stockcount.toml` from the input directory (CLI only). Lib callers build [`Opts`] directly.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::utils::config::PackagePaths;
use crate::{DuplicateHeaders, Opts};

#[derive(Debug, Default, Deserialize)]
pub struct StockcountToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsSection {
    stock: Option<String>,
    store_id: Option<String>,
    output: Option<String>,
    workers: Option<usize>,
    task_queue_cap: Option<usize>,
    result_queue_cap: Option<usize>,
    delimiter: Option<char>,
    duplicate_headers: Option<DuplicateHeaders>,
    exclude: Option<Vec<String>>,
    follow_links: Option<bool>,
    parallel_walk: Option<bool>,
    verbose: Option<bool>,
    strict: Option<bool>,
}

/// Load the config file from `dir`. Ok(None) when there is none; a file that exists but cannot
/// be read or parsed is an error.
pub fn load_stockcount_toml(dir: &Path) -> Result<Option<StockcountToml>> {
    let path = dir.join(PackagePaths::get().config_filename());
    if !path.is_file() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("read config file {}", path.display()))?;
    let file = parse_stockcount_toml(&s)
        .with_context(|| format!("parse config file {}", path.display()))?;
    Ok(Some(file))
}

/// Parse config file contents.
pub fn parse_stockcount_toml(
    s: &str,
) -> std::result::Result<StockcountToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $field:ident => $($opts_field:ident).+) => {
        if let Some(v) = $section.$field.clone() {
            $opts.$($opts_field).+ = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
/// A non-ASCII delimiter is an error.
pub fn apply_file_to_opts(file: &StockcountToml, opts: &mut Opts) -> Result<()> {
    let s = &file.settings;
    apply_file_opt!(s, opts, stock => settings.columns.stock);
    apply_file_opt!(s, opts, store_id => settings.columns.store);
    if let Some(ref p) = s.output {
        opts.output = PathBuf::from(p);
    }
    if let Some(n) = s.workers {
        opts.num_workers = Some(n);
    }
    apply_file_opt!(s, opts, task_queue_cap => task_queue_cap);
    apply_file_opt!(s, opts, result_queue_cap => result_queue_cap);
    if let Some(c) = s.delimiter {
        if !c.is_ascii() {
            anyhow::bail!("delimiter must be a single ASCII character, got {:?}", c);
        }
        opts.settings.delimiter = c as u8;
    }
    apply_file_opt!(s, opts, duplicate_headers => settings.duplicate_headers);
    apply_file_opt!(s, opts, exclude => exclude);
    apply_file_opt!(s, opts, follow_links => follow_links);
    apply_file_opt!(s, opts, parallel_walk => parallel_walk);
    apply_file_opt!(s, opts, verbose => verbose);
    apply_file_opt!(s, opts, strict => strict);
    Ok(())
}
