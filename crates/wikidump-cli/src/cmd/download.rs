//! Download subcommand - fetch SQL dumps from a Wikimedia mirror

use anyhow::{Context, Result};
use clap::Args;
use wikidump_core::{ProgressContext, fmt_bytes};
use wikidump_tables::DownloadOptions;

use super::{TableArg, Target, print_summary, tables};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Tables to download
    #[arg(value_enum, required = true, num_args = 1..)]
    pub tables: Vec<TableArg>,

    /// Replace dump files that already exist
    #[arg(long)]
    pub overwrite: bool,

    /// Dump mirror root URL
    #[arg(long)]
    pub base_url: Option<String>,
}

pub fn run(
    args: DownloadArgs,
    target: &Target,
    config: &Config,
    progress: &ProgressContext,
) -> Result<()> {
    std::fs::create_dir_all(&target.root)
        .with_context(|| format!("Failed to create root {}", target.root.display()))?;

    let options = DownloadOptions {
        base_url: args
            .base_url
            .unwrap_or_else(|| config.download.base_url.clone()),
        overwrite: args.overwrite,
    };
    log::info!("Downloading from {}", options.base_url);
    log::info!("  Output: {}", target.root.display());

    let outcomes = wikidump_tables::download(
        &target.root,
        &target.dump,
        &tables(&args.tables),
        &options,
        progress,
    );

    let rows = outcomes
        .iter()
        .map(|o| match &o.result {
            Ok(stats) => vec![
                o.table.to_string(),
                fmt_bytes(stats.bytes),
                format!("{:.1}s", stats.elapsed.as_secs_f64()),
                "ok".to_string(),
            ],
            Err(e) => vec![
                o.table.to_string(),
                "-".to_string(),
                "-".to_string(),
                e.to_string(),
            ],
        })
        .collect();
    print_summary(&["Table", "Size", "Time", "Status"], rows);

    if outcomes.iter().any(|o| o.result.is_err()) {
        anyhow::bail!("Some downloads failed");
    }
    Ok(())
}
