//! Convert orchestrator: one pipeline per requested table, run concurrently

use std::path::Path;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use wikidump_core::ProgressContext;

use crate::error::PipelineError;
use crate::naming::DumpId;
use crate::pipeline::{PipelineOptions, TableStats, run_table};
use crate::table::Table;
use crate::transform::{DumpTable, PageLinksTable, PageTable, RedirectTable};

/// Per-table result, collected after every pipeline has finished
#[derive(Debug)]
pub struct TableOutcome {
    pub table: Table,
    pub result: Result<TableStats, PipelineError>,
}

/// All outcomes of one convert invocation
#[derive(Debug)]
pub struct ConvertSummary {
    pub outcomes: Vec<TableOutcome>,
    pub elapsed: Duration,
}

impl ConvertSummary {
    /// True only if every pipeline succeeded
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (Table, &PipelineError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.table, e)))
    }

    pub fn total_rows(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|s| s.rows)
            .sum()
    }
}

/// Convert `{lang}wiki-{date}-{table}.sql.gz` under `root` into Parquet files
/// beside them, one concurrent pipeline per distinct table.
///
/// A failing pipeline does not stop its siblings; inspect the summary.
pub fn convert(
    root: &Path,
    dump: &DumpId,
    tables: &[Table],
    options: &PipelineOptions,
    progress: &ProgressContext,
) -> ConvertSummary {
    let start = Instant::now();
    let tables = Table::dedup(tables);
    log::info!(
        "Converting {} table(s) of {}wiki-{} in {}",
        tables.len(),
        dump.language,
        dump.date,
        root.display()
    );

    let outcomes: Vec<TableOutcome> = tables
        .par_iter()
        .map(|&table| TableOutcome {
            table,
            result: convert_table(root, dump, table, options, progress),
        })
        .collect();

    let summary = ConvertSummary {
        outcomes,
        elapsed: start.elapsed(),
    };
    for (table, err) in summary.failures() {
        log::error!("[{table}] failed: {err}");
    }
    log::info!("Done in {:.1}s", summary.elapsed.as_secs_f64());
    summary
}

/// Fixed table → pipeline dispatch
fn convert_table(
    root: &Path,
    dump: &DumpId,
    table: Table,
    options: &PipelineOptions,
    progress: &ProgressContext,
) -> Result<TableStats, PipelineError> {
    match table {
        Table::Page => run::<PageTable>(root, dump, options, progress),
        Table::PageLinks => run::<PageLinksTable>(root, dump, options, progress),
        Table::Redirect => run::<RedirectTable>(root, dump, options, progress),
    }
}

fn run<T: DumpTable>(
    root: &Path,
    dump: &DumpId,
    options: &PipelineOptions,
    progress: &ProgressContext,
) -> Result<TableStats, PipelineError> {
    let table = T::TABLE;
    let pb = progress.table_bar(table.name());
    pb.set_message("opening...");

    let result = run_table::<T>(
        &dump.dump_path(root, table),
        &dump.output_path(root, table),
        options,
        &pb,
    );
    pb.finish_and_clear();

    if let Ok(stats) = &result {
        log::info!(
            "[{table}] {} rows from {} statements in {:.1}s",
            stats.rows,
            stats.statements,
            stats.elapsed.as_secs_f64()
        );
    }
    result
}
