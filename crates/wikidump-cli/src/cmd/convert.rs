//! Convert subcommand - local SQL dumps to Parquet

use anyhow::Result;
use clap::Args;
use wikidump_core::{ProgressContext, fmt_num};
use wikidump_tables::PipelineOptions;

use super::{TableArg, Target, print_summary, tables};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Tables to convert
    #[arg(value_enum, required = true, num_args = 1..)]
    pub tables: Vec<TableArg>,

    /// Record batches buffered between parser and writer
    #[arg(long)]
    pub channel_capacity: Option<usize>,

    /// Zstd compression level (1-22)
    #[arg(short, long)]
    pub zstd_level: Option<i32>,
}

pub fn run(
    args: ConvertArgs,
    target: &Target,
    config: &Config,
    progress: &ProgressContext,
) -> Result<()> {
    let root = &target.root;
    if !root.exists() {
        anyhow::bail!("root {} does not exist", root.display());
    }
    if !root.is_dir() {
        anyhow::bail!("root {} is not a directory", root.display());
    }

    let options = PipelineOptions {
        channel_capacity: args
            .channel_capacity
            .unwrap_or(config.convert.channel_capacity),
        progress_every: config.convert.progress_every,
        max_line_bytes: config.convert.max_line_bytes,
        zstd_level: args.zstd_level.unwrap_or(config.convert.compression_level),
    };
    log::debug!("Pipeline options: {options:?}");

    let summary = wikidump_tables::convert(
        root,
        &target.dump,
        &tables(&args.tables),
        &options,
        progress,
    );

    let rows = summary
        .outcomes
        .iter()
        .map(|o| match &o.result {
            Ok(stats) => vec![
                o.table.to_string(),
                fmt_num(stats.statements),
                fmt_num(stats.rows),
                format!("{:.1}s", stats.elapsed.as_secs_f64()),
                "ok".to_string(),
            ],
            Err(e) => vec![
                o.table.to_string(),
                "-".to_string(),
                "-".to_string(),
                "-".to_string(),
                e.to_string(),
            ],
        })
        .collect();
    print_summary(&["Table", "Statements", "Rows", "Time", "Status"], rows);

    if !summary.is_success() {
        anyhow::bail!("Some tables failed");
    }
    Ok(())
}
