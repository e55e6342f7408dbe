//! Dump and output file naming

use std::path::{Path, PathBuf};

use crate::table::Table;

/// Extension of the downloaded dumps
pub const DUMP_EXTENSION: &str = "sql.gz";

/// Extension of the converted output
pub const OUTPUT_EXTENSION: &str = "parquet";

/// Public Wikimedia dump mirror
pub const DEFAULT_BASE_URL: &str = "https://dumps.wikimedia.org/";

/// `{language}wiki-{date}-{name}.{extension}`
pub fn file_name(language: &str, date: &str, name: &str, extension: &str) -> String {
    language.to_string() + "wiki-" + date + "-" + name + "." + extension
}

/// One wiki's dump of one date, e.g. `enwiki` on `20230801`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpId {
    pub language: String,
    pub date: String,
}

impl DumpId {
    pub fn new(language: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            date: date.into(),
        }
    }

    pub fn file_name(&self, table: Table, extension: &str) -> String {
        file_name(&self.language, &self.date, table.name(), extension)
    }

    /// Local path of the compressed dump
    pub fn dump_path(&self, root: &Path, table: Table) -> PathBuf {
        root.join(self.file_name(table, DUMP_EXTENSION))
    }

    /// Local path of the Parquet output, beside the dump
    pub fn output_path(&self, root: &Path, table: Table) -> PathBuf {
        root.join(self.file_name(table, OUTPUT_EXTENSION))
    }

    /// Mirror URL: `{base}/{language}wiki/{date}/{file}`
    pub fn url(&self, base_url: &str, table: Table) -> String {
        format!(
            "{}/{}wiki/{}/{}",
            base_url.trim_end_matches('/'),
            self.language,
            self.date,
            self.file_name(table, DUMP_EXTENSION)
        )
    }
}
