//! `pagelinks` table: (from_id, to_namespace, to_title, from_namespace)

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
        r"\((?P<from_id>[^,()']*),(?P<to_namespace>[^,()']*),",
        r"'(?P<to_title>(?:\\.|[^\\'])*)',(?P<from_namespace>[^,()']*)\)",
    ))
    .expect("pagelinks tuple regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub from_id: i64,
    pub from_namespace: i64,
    pub to_namespace: i64,
    pub to_title: String,
}

pub fn parse_statement(statement: &str) -> Result<Vec<LinkRecord>, PipelineError> {
    let mut links = Vec::with_capacity(ROWS_PER_STATEMENT);
    for caps in TUPLE.captures_iter(statement) {
        links.push(LinkRecord {
            from_id: int_field(Table::PageLinks, &caps, "from_id")?,
            from_namespace: int_field(Table::PageLinks, &caps, "from_namespace")?,
            to_namespace: int_field(Table::PageLinks, &caps, "to_namespace")?,
            to_title: unquote(group(&caps, "to_title")),
        });
    }
    Ok(links)
}

pub struct LinkAccumulator {
    schema: SchemaRef,
    from_id: Vec<i64>,
    from_namespace: Vec<i64>,
    to_namespace: Vec<i64>,
    to_title: Vec<String>,
}

impl LinkAccumulator {
    pub fn new() -> Self {
        Self {
            schema: schema::pagelinks(),
            from_id: Vec::with_capacity(ROWS_PER_STATEMENT),
            from_namespace: Vec::with_capacity(ROWS_PER_STATEMENT),
            to_namespace: Vec::with_capacity(ROWS_PER_STATEMENT),
            to_title: Vec::with_capacity(ROWS_PER_STATEMENT),
        }
    }
}

impl Default for LinkAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator for LinkAccumulator {
    type Row = LinkRecord;

    fn push(&mut self, row: LinkRecord) {
        self.from_id.push(row.from_id);
        self.from_namespace.push(row.from_namespace);
        self.to_namespace.push(row.to_namespace);
        self.to_title.push(row.to_title);
    }

    fn len(&self) -> usize {
        self.from_id.len()
    }

    fn take_batch(&mut self) -> Result<RecordBatch, ArrowError> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(std::mem::take(&mut self.from_id))),
            Arc::new(Int64Array::from(std::mem::take(&mut self.from_namespace))),
            Arc::new(Int64Array::from(std::mem::take(&mut self.to_namespace))),
            Arc::new(StringArray::from(std::mem::take(&mut self.to_title))),
        ];
        RecordBatch::try_new(self.schema.clone(), columns)
    }
}

/// Marker for the `pagelinks` pipeline
pub struct PageLinksTable;

impl DumpTable for PageLinksTable {
    type Record = LinkRecord;
    type Acc = LinkAccumulator;

    const TABLE: Table = Table::PageLinks;

    fn parse(statement: &str) -> Result<Vec<LinkRecord>, PipelineError> {
        parse_statement(statement)
    }

    fn accumulator() -> LinkAccumulator {
        LinkAccumulator::new()
    }

    fn schema() -> SchemaRef {
        schema::pagelinks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_field_order() {
        // Dump column order is (from, namespace, title, from_namespace)
        let stmt = "INSERT INTO `pagelinks` VALUES (586,0,'!',0),(4748,0,'!',0),(7,10,'Infobox_person',2);";
        let links = parse_statement(stmt).unwrap();
        assert_eq!(links.len(), 3);
        assert_eq!(
            links[2],
            LinkRecord {
                from_id: 7,
                from_namespace: 2,
                to_namespace: 10,
                to_title: "Infobox_person".to_string(),
            }
        );
        assert_eq!(links[0].from_id, 586);
        assert_eq!(links[1].from_id, 4748);
    }

    #[test]
    fn escaped_title() {
        let stmt = "INSERT INTO `pagelinks` VALUES (1,0,'Ender\\'s_Game',0);";
        let links = parse_statement(stmt).unwrap();
        assert_eq!(links[0].to_title, "Ender's_Game");
    }

    #[test]
    fn empty_title() {
        let stmt = "INSERT INTO `pagelinks` VALUES (1,0,'',0);";
        let links = parse_statement(stmt).unwrap();
        assert_eq!(links[0].to_title, "");
    }

    #[test]
    fn overflowing_namespace_is_an_error() {
        let stmt = "INSERT INTO `pagelinks` VALUES (1,123456789012345678901,'X',0);";
        assert!(matches!(
            parse_statement(stmt),
            Err(PipelineError::InvalidInteger {
                field: "to_namespace",
                ..
            })
        ));
    }

    #[test]
    fn non_numeric_id_is_an_error() {
        let stmt = "INSERT INTO `pagelinks` VALUES (1,0,'A',0),(x7,0,'B',0),(3,0,'C',0);";
        match parse_statement(stmt) {
            Err(PipelineError::InvalidInteger { field, value, .. }) => {
                assert_eq!(field, "from_id");
                assert_eq!(value, "x7");
            }
            other => panic!("expected InvalidInteger, got {other:?}"),
        }
    }

    #[test]
    fn empty_namespace_is_an_error() {
        let stmt = "INSERT INTO `pagelinks` VALUES (1,0,'A',);";
        assert!(matches!(
            parse_statement(stmt),
            Err(PipelineError::InvalidInteger {
                field: "from_namespace",
                ..
            })
        ));
    }

    #[test]
    fn negative_values_parse() {
        let stmt = "INSERT INTO `pagelinks` VALUES (-4,-1,'Special:Search',-2);";
        let links = parse_statement(stmt).unwrap();
        assert_eq!(links[0].from_id, -4);
        assert_eq!(links[0].to_namespace, -1);
        assert_eq!(links[0].from_namespace, -2);
    }

    #[test]
    fn accumulator_batch_columns() {
        let mut acc = LinkAccumulator::new();
        acc.extend(parse_statement("INSERT INTO `pagelinks` VALUES (1,0,'A',0),(2,0,'B',0);").unwrap());
        let batch = acc.take_batch().unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 4);
        let titles = batch
            .column(3)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(titles.value(1), "B");
    }
}
