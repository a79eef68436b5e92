//! CLI command handler: merge config file and flags, install Ctrl+C, run.

use anyhow::{Context, Result};
use log::debug;

use crate::engine::arg_parser::Cli;
use crate::utils::{apply_file_to_opts, load_stockcount_toml, setup_logging};
use crate::{CancelToken, Opts, count_dir};

/// Overwrite opts field from CLI when the flag was given.
macro_rules! apply_cli_opt {
    ($cli:expr, $opts:expr, $cli_field:ident => $($opts_field:ident).+) => {
        if let Some(v) = $cli.$cli_field.clone() {
            $opts.$($opts_field).+ = v;
        }
    };
}

/// Defaults, then `.stockcount.toml` from the input directory, then CLI flags.
pub fn setup_opts(cli: &Cli) -> Result<Opts> {
    let mut opts = Opts::default();
    if let Some(file) = load_stockcount_toml(&cli.dir)? {
        apply_file_to_opts(&file, &mut opts)?;
    }
    apply_cli_opt!(cli, opts, stock => settings.columns.stock);
    apply_cli_opt!(cli, opts, store_id => settings.columns.store);
    apply_cli_opt!(cli, opts, output => output);
    if cli.workers.is_some() {
        opts.num_workers = cli.workers;
    }
    apply_cli_opt!(cli, opts, task_queue_cap => task_queue_cap);
    apply_cli_opt!(cli, opts, result_queue_cap => result_queue_cap);
    apply_cli_opt!(cli, opts, delimiter => settings.delimiter);
    apply_cli_opt!(cli, opts, duplicate_headers => settings.duplicate_headers);
    if !cli.exclude.is_empty() {
        opts.exclude = cli.exclude.clone();
    }
    apply_cli_opt!(cli, opts, follow_links => follow_links);
    apply_cli_opt!(cli, opts, parallel_walk => parallel_walk);
    apply_cli_opt!(cli, opts, strict => strict);
    apply_cli_opt!(cli, opts, verbose => verbose);
    Ok(opts)
}

/// Run a full count for the CLI. Ctrl+C stops discovery and drains what is already queued.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let mut opts = setup_opts(cli)?;
    setup_logging(opts.verbose);
    debug!("{:#?}", opts);

    let cancel = CancelToken::new();
    let handler_cancel = cancel.clone();
    ctrlc::set_handler(move || {
        log::info!("Cancelling (Ctrl+C); draining queued files...");
        handler_cancel.cancel();
    })
    .context("set Ctrl+C handler")?;
    opts.cancel = Some(cancel);

    count_dir(&cli.dir, &opts)?;
    Ok(())
}
