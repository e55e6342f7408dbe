//! Error type for a single table pipeline

use std::path::PathBuf;

use wikidump_core::DumpError;

use crate::table::Table;

/// Why a table pipeline failed. All variants are terminal for that table.
#[derive(Debug)]
pub enum PipelineError {
    /// Missing, unreadable or corrupt dump
    Dump(DumpError),
    /// Integer field that does not fit an `i64`
    InvalidInteger {
        table: Table,
        field: &'static str,
        value: String,
    },
    /// Redirect tuple whose interwiki is `NULL`
    NullInterwiki { from_id: i64 },
    /// Output file could not be created, written or committed
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Writer stage stopped receiving before the dump was exhausted
    WriterGone,
    /// Writer stage panicked
    WriterPanicked,
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dump(e) => write!(f, "{e}"),
            Self::InvalidInteger {
                table,
                field,
                value,
            } => write!(f, "{table}: invalid integer in {field}: {value:?}"),
            Self::NullInterwiki { from_id } => {
                write!(f, "redirect: interwiki is NULL for page {from_id}")
            }
            Self::Output { path, source } => write!(f, "{}: {source}", path.display()),
            Self::WriterGone => write!(f, "writer stopped before end of input"),
            Self::WriterPanicked => write!(f, "writer thread panicked"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dump(e) => Some(e),
            Self::Output { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DumpError> for PipelineError {
    fn from(e: DumpError) -> Self {
        Self::Dump(e)
    }
}
