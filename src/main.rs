//! Marksync - A split-pane terminal markdown view with synchronized scrolling.
//!
//! # Usage
//!
//! ```bash
//! marksync README.md
//! marksync --watch README.md
//! marksync --split 60 --no-sync README.md
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use marksync::app::App;
use marksync::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use marksync::perf;

/// A split-pane terminal markdown view with line-synchronized scrolling
#[derive(Parser, Debug)]
#[command(name = "marksync", version, about, long_about = None)]
struct Cli {
    /// Markdown file to view
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Watch file for changes and auto-reload
    #[arg(short, long)]
    watch: bool,

    /// Start with scroll sync turned off
    #[arg(long)]
    no_sync: bool,

    /// Source pane width in percent (30-70)
    #[arg(long, value_name = "PERCENT")]
    split: Option<u16>,

    /// Minimum gap between two accepted syncs
    #[arg(long, value_name = "MS")]
    min_sync_interval_ms: Option<u64>,

    /// How long a sync blocks syncs in the opposite direction
    #[arg(long, value_name = "MS")]
    suppression_ms: Option<u64>,

    /// Quiet period after a sync before the next one may start
    #[arg(long, value_name = "MS")]
    settle_delay_ms: Option<u64>,

    /// Line height used when the source pane can not report one
    #[arg(long, value_name = "ROWS")]
    fallback_line_height: Option<f64>,

    /// Write sync, reload and resize events to a file
    #[arg(long, value_name = "PATH")]
    sync_debug_log: Option<PathBuf>,

    /// Print timing totals on exit
    #[arg(long)]
    perf: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);
    tracing::debug!(?effective, "effective flags");

    perf::set_enabled(effective.perf);
    let debug_log_path = effective
        .sync_debug_log
        .clone()
        .or_else(|| std::env::var_os("MARKSYNC_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize sync debug log {}: {}",
            debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    // Verify file exists
    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }

    // Run the application
    let mut app = App::new(cli.file)
        .with_watch(effective.watch)
        .with_sync(!effective.no_sync)
        .with_split(effective.split_percent())
        .with_sync_config(effective.sync_config());

    let result = app.run().context("Application error");
    if perf::is_enabled() {
        let summary = perf::summary();
        if !summary.is_empty() {
            eprintln!("{summary}");
        }
    }
    result
}
