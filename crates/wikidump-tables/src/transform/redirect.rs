//! `redirect` table: (from_id, namespace, title, interwiki, fragment)

use std::sync::{Arc, LazyLock};

use arrow::array::*;
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use regex::Regex;
use wikidump_core::Accumulator;

use super::{DumpTable, ROWS_PER_STATEMENT, group, int_field};
use crate::error::PipelineError;
use crate::schema;
use crate::table::Table;
use crate::unquote::unquote;

static TUPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\((?P<from_id>[^,()']*),(?P<namespace>[^,()']*),'(?P<title>(?:\\.|[^\\'])*)',",
        r"(?:'(?P<interwiki>(?:\\.|[^\\'])*)'|(?P<interwiki_null>NULL)),",
        r"(?:'(?:\\.|[^\\'])*'|NULL)\)",
    ))
    .expect("redirect tuple regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRecord {
    pub from_id: i64,
    pub namespace: i64,
    pub title: String,
    pub interwiki: String,
}

/// Parse one statement. A `NULL` interwiki fails the whole statement.
pub fn parse_statement(statement: &str) -> Result<Vec<RedirectRecord>, PipelineError> {
    let mut redirects = Vec::with_capacity(ROWS_PER_STATEMENT);
    for caps in TUPLE.captures_iter(statement) {
        let from_id = int_field(Table::Redirect, &caps, "from_id")?;
        let namespace = int_field(Table::Redirect, &caps, "namespace")?;
        if caps.name("interwiki_null").is_some() {
            return Err(PipelineError::NullInterwiki { from_id });
        }
        redirects.push(RedirectRecord {
            from_id,
            namespace,
            title: unquote(group(&caps, "title")),
            interwiki: unquote(group(&caps, "interwiki")),
        });
    }
    Ok(redirects)
}

pub struct RedirectAccumulator {
    schema: SchemaRef,
    from_id: Vec<i64>,
    namespace: Vec<i64>,
    title: Vec<String>,
    interwiki: Vec<String>,
}

impl RedirectAccumulator {
    pub fn new() -> Self {
        Self {
            schema: schema::redirect(),
            from_id: Vec::with_capacity(ROWS_PER_STATEMENT),
            namespace: Vec::with_capacity(ROWS_PER_STATEMENT),
            title: Vec::with_capacity(ROWS_PER_STATEMENT),
            interwiki: Vec::with_capacity(ROWS_PER_STATEMENT),
        }
    }
}

impl Default for RedirectAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator for RedirectAccumulator {
    type Row = RedirectRecord;

    fn push(&mut self, row: RedirectRecord) {
        self.from_id.push(row.from_id);
        self.namespace.push(row.namespace);
        self.title.push(row.title);
        self.interwiki.push(row.interwiki);
    }

    fn len(&self) -> usize {
        self.from_id.len()
    }

    fn take_batch(&mut self) -> Result<RecordBatch, ArrowError> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(std::mem::take(&mut self.from_id))),
            Arc::new(Int64Array::from(std::mem::take(&mut self.namespace))),
            Arc::new(StringArray::from(std::mem::take(&mut self.title))),
            Arc::new(StringArray::from(std::mem::take(&mut self.interwiki))),
        ];
        RecordBatch::try_new(self.schema.clone(), columns)
    }
}

/// Marker for the `redirect` pipeline
pub struct RedirectTable;

impl DumpTable for RedirectTable {
    type Record = RedirectRecord;
    type Acc = RedirectAccumulator;

    const TABLE: Table = Table::Redirect;

    fn parse(statement: &str) -> Result<Vec<RedirectRecord>, PipelineError> {
        parse_statement(statement)
    }

    fn accumulator() -> RedirectAccumulator {
        RedirectAccumulator::new()
    }

    fn schema() -> SchemaRef {
        schema::redirect()
    }
}
