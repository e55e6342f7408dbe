//! Per-table tuple parsing and Arrow accumulation.
//!
//! Each table variant pairs a regex over one `VALUES` tuple with a record
//! struct and an [`Accumulator`] that turns records into a `RecordBatch`.

pub mod page;
pub mod pagelinks;
pub mod redirect;

use arrow::datatypes::SchemaRef;
use regex::Captures;
use wikidump_core::Accumulator;

use crate::error::PipelineError;
use crate::table::Table;

pub use page::{PageAccumulator, PageRecord, PageTable};
pub use pagelinks::{LinkAccumulator, LinkRecord, PageLinksTable};
pub use redirect::{RedirectAccumulator, RedirectRecord, RedirectTable};

/// Pre-allocation for a statement's records (typical dump statements hold ~1-5k tuples)
pub(crate) const ROWS_PER_STATEMENT: usize = 4096;

/// Everything a pipeline needs to know about one table variant
pub trait DumpTable {
    type Record: Send + 'static;
    type Acc: Accumulator<Row = Self::Record> + Send;

    const TABLE: Table;

    /// Extract all records of one complete statement, in tuple order
    fn parse(statement: &str) -> Result<Vec<Self::Record>, PipelineError>;

    fn accumulator() -> Self::Acc;

    fn schema() -> SchemaRef;
}

/// Text of a named group, empty when the group did not participate
pub(crate) fn group<'h>(caps: &Captures<'h>, name: &str) -> &'h str {
    caps.name(name).map_or("", |m| m.as_str())
}

/// Parse a named group as `i64`; failure aborts the pipeline
pub(crate) fn int_field(
    table: Table,
    caps: &Captures<'_>,
    field: &'static str,
) -> Result<i64, PipelineError> {
    let value = group(caps, field);
    value
        .parse::<i64>()
        .map_err(|_| PipelineError::InvalidInteger {
            table,
            field,
            value: value.to_string(),
        })
}

/// Integer flag: `1` is true, any other integer false
pub(crate) fn flag_field(
    table: Table,
    caps: &Captures<'_>,
    field: &'static str,
) -> Result<bool, PipelineError> {
    int_field(table, caps, field).map(|v| v == 1)
}
