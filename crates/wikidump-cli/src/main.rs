//! wikidump - Wikipedia SQL dumps to Parquet
//!
//! Downloads `page`, `pagelinks` and `redirect` dumps from a Wikimedia
//! mirror and converts them into columnar Parquet files.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use wikidump_tables::DumpId;

mod cmd;
mod config;

use cmd::Target;
use config::Config;

#[derive(Parser)]
#[command(name = "wikidump")]
#[command(about = "Convert Wikipedia SQL dumps to Parquet")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./wikidump.toml or ~/.config/wikidump/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding dumps and outputs
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Wiki language code, e.g. en
    #[arg(short, long, global = true)]
    language: Option<String>,

    /// Dump date (YYYYMMDD or latest)
    #[arg(short, long, global = true, value_parser = cmd::parse_date)]
    date: Option<String>,

    /// Read timeout in seconds for stall detection
    #[arg(long, global = true)]
    read_timeout: Option<u64>,

    /// Connect timeout in seconds
    #[arg(long, global = true)]
    connect_timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Convert local dumps to Parquet
    Convert(cmd::convert::ConvertArgs),
    /// Download dumps from a Wikimedia mirror
    Download(cmd::download::DownloadArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = wikidump_core::ProgressContext::new();

    // TTY: warn unless --debug, bars show activity. Otherwise info.
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    wikidump_core::init_logging(quiet, cli.debug, multi);

    let config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    wikidump_core::set_http_config(wikidump_core::HttpConfig {
        read_timeout: Duration::from_secs(
            cli.read_timeout.unwrap_or(config.download.read_timeout),
        ),
        connect_timeout: Duration::from_secs(
            cli.connect_timeout
                .unwrap_or(config.download.connect_timeout),
        ),
    });

    let target = resolve_target(&cli, &config)?;

    match cli.command {
        Command::Convert(args) => cmd::convert::run(args, &target, &config, &progress),
        Command::Download(args) => cmd::download::run(args, &target, &config, &progress),
        Command::Config => {
            let rows = vec![
                vec!["Root".to_string(), target.root.display().to_string()],
                vec!["Language".to_string(), target.dump.language.clone()],
                vec!["Date".to_string(), target.dump.date.clone()],
                vec![
                    "Channel capacity".to_string(),
                    format!("{} batches", config.convert.channel_capacity),
                ],
                vec![
                    "Progress every".to_string(),
                    format!("{} batches", config.convert.progress_every),
                ],
                vec![
                    "Max line".to_string(),
                    wikidump_core::fmt_bytes(config.convert.max_line_bytes as u64),
                ],
                vec![
                    "Compression level".to_string(),
                    config.convert.compression_level.to_string(),
                ],
                vec!["Base URL".to_string(), config.download.base_url.clone()],
                vec![
                    "Read timeout".to_string(),
                    format!("{}s", wikidump_core::http_config().read_timeout.as_secs()),
                ],
                vec![
                    "Connect timeout".to_string(),
                    format!("{}s", wikidump_core::http_config().connect_timeout.as_secs()),
                ],
            ];
            cmd::print_summary(&["Setting", "Value"], rows);
            Ok(())
        }
    }
}

/// CLI flags over config file values
fn resolve_target(cli: &Cli, config: &Config) -> Result<Target> {
    let date = match &cli.date {
        Some(date) => date.clone(),
        None => cmd::parse_date(&config.dump.date).map_err(anyhow::Error::msg)?,
    };
    let language = cli
        .language
        .clone()
        .unwrap_or_else(|| config.dump.language.clone());
    if language.is_empty() {
        anyhow::bail!("language must not be empty");
    }
    Ok(Target {
        root: cli.root.clone().unwrap_or_else(|| config.dump.root.clone()),
        dump: DumpId::new(language, date),
    })
}
