//! `page` table: (id, namespace, title, is_redirect, is_new, random, touched,
//! links_updated, latest, len, content_model, lang)

use std::sync::{Arc, LazyLock};

use arrow::array::*;
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use regex::Regex;
use wikidump_core::Accumulator;

use super::{DumpTable, ROWS_PER_STATEMENT, flag_field, group, int_field};
use crate::error::PipelineError;
use crate::schema;
use crate::table::Table;
use crate::unquote::unquote;

static TUPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\((?P<id>[^,()']*),(?P<namespace>[^,()']*),'(?P<title>(?:\\.|[^\\'])*)',",
        r"(?P<is_redirect>[^,()']*),(?P<is_new>[^,()']*),",
        r"[^,()']*,'(?:\\.|[^\\'])*',(?:'(?:\\.|[^\\'])*'|NULL),",
        r"(?P<latest>[^,()']*),[^,()']*,",
        r"(?:'(?:\\.|[^\\'])*'|NULL),(?:'(?:\\.|[^\\'])*'|NULL)\)",
    ))
    .expect("page tuple regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub id: i64,
    pub namespace: i64,
    pub title: String,
    pub is_redirect: bool,
    pub is_new: bool,
    pub latest: i64,
}

pub fn parse_statement(statement: &str) -> Result<Vec<PageRecord>, PipelineError> {
    let mut pages = Vec::with_capacity(ROWS_PER_STATEMENT);
    for caps in TUPLE.captures_iter(statement) {
        pages.push(PageRecord {
            id: int_field(Table::Page, &caps, "id")?,
            namespace: int_field(Table::Page, &caps, "namespace")?,
            title: unquote(group(&caps, "title")),
            is_redirect: flag_field(Table::Page, &caps, "is_redirect")?,
            is_new: flag_field(Table::Page, &caps, "is_new")?,
            latest: int_field(Table::Page, &caps, "latest")?,
        });
    }
    Ok(pages)
}

pub struct PageAccumulator {
    schema: SchemaRef,
    id: Vec<i64>,
    namespace: Vec<i64>,
    title: Vec<String>,
    is_redirect: Vec<bool>,
    is_new: Vec<bool>,
    latest: Vec<i64>,
}

impl PageAccumulator {
    pub fn new() -> Self {
        Self {
            schema: schema::page(),
            id: Vec::with_capacity(ROWS_PER_STATEMENT),
            namespace: Vec::with_capacity(ROWS_PER_STATEMENT),
            title: Vec::with_capacity(ROWS_PER_STATEMENT),
            is_redirect: Vec::with_capacity(ROWS_PER_STATEMENT),
            is_new: Vec::with_capacity(ROWS_PER_STATEMENT),
            latest: Vec::with_capacity(ROWS_PER_STATEMENT),
        }
    }
}

impl Default for PageAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator for PageAccumulator {
    type Row = PageRecord;

    fn push(&mut self, row: PageRecord) {
        self.id.push(row.id);
        self.namespace.push(row.namespace);
        self.title.push(row.title);
        self.is_redirect.push(row.is_redirect);
        self.is_new.push(row.is_new);
        self.latest.push(row.latest);
    }

    fn len(&self) -> usize {
        self.id.len()
    }

    fn take_batch(&mut self) -> Result<RecordBatch, ArrowError> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(std::mem::take(&mut self.id))),
            Arc::new(Int64Array::from(std::mem::take(&mut self.namespace))),
            Arc::new(StringArray::from(std::mem::take(&mut self.title))),
            Arc::new(BooleanArray::from(std::mem::take(&mut self.is_redirect))),
            Arc::new(BooleanArray::from(std::mem::take(&mut self.is_new))),
            Arc::new(Int64Array::from(std::mem::take(&mut self.latest))),
        ];
        RecordBatch::try_new(self.schema.clone(), columns)
    }
}

/// Marker for the `page` pipeline
pub struct PageTable;

impl DumpTable for PageTable {
    type Record = PageRecord;
    type Acc = PageAccumulator;

    const TABLE: Table = Table::Page;

    fn parse(statement: &str) -> Result<Vec<PageRecord>, PipelineError> {
        parse_statement(statement)
    }

    fn accumulator() -> PageAccumulator {
        PageAccumulator::new()
    }

    fn schema() -> SchemaRef {
        schema::page()
    }
}
