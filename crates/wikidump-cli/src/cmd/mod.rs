//! Subcommands and the argument types they share

pub mod convert;
pub mod download;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use wikidump_tables::DumpId;

/// Table names accepted on the command line
#[derive(Clone, Copy, ValueEnum, Debug, PartialEq, Eq)]
pub enum TableArg {
    Page,
    Pagelinks,
    Redirect,
}

impl From<TableArg> for wikidump_tables::Table {
    fn from(t: TableArg) -> Self {
        match t {
            TableArg::Page => wikidump_tables::Table::Page,
            TableArg::Pagelinks => wikidump_tables::Table::PageLinks,
            TableArg::Redirect => wikidump_tables::Table::Redirect,
        }
    }
}

pub fn tables(args: &[TableArg]) -> Vec<wikidump_tables::Table> {
    wikidump_tables::Table::dedup(&args.iter().map(|&t| t.into()).collect::<Vec<_>>())
}

/// Where dumps live and which dump to use
#[derive(Debug, Clone)]
pub struct Target {
    pub root: PathBuf,
    pub dump: DumpId,
}

/// `YYYYMMDD` or `latest`
pub fn parse_date(s: &str) -> Result<String, String> {
    if s == "latest" {
        return Ok(s.to_string());
    }
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .map(|d| d.format("%Y%m%d").to_string())
        .map_err(|e| format!("Invalid dump date (expected YYYYMMDD or latest): {e}"))
}

/// Print a summary table on stderr
pub fn print_summary(header: &[&str], rows: Vec<Vec<String>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    for row in rows {
        table.add_row(row);
    }
    eprintln!("\n{table}");
}
