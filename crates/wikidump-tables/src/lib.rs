//! Wikidump Tables - Wikipedia SQL dump → Parquet conversion
//!
//! Streams `page`, `pagelinks` and `redirect` dumps through a
//! parse → bounded channel → write pipeline per table.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use wikidump_core::ProgressContext;
//! use wikidump_tables::{DumpId, PipelineOptions, Table, convert};
//!
//! let dump = DumpId::new("en", "20230801");
//! let summary = convert(
//!     Path::new("data"),
//!     &dump,
//!     &[Table::Page, Table::Redirect],
//!     &PipelineOptions::default(),
//!     &ProgressContext::new(),
//! );
//! assert!(summary.is_success());
//! ```

pub mod convert;
pub mod download;
pub mod error;
pub mod naming;
pub mod pipeline;
pub mod schema;
pub mod table;
pub mod transform;
pub mod unquote;

// Re-exports for convenience
pub use convert::{ConvertSummary, TableOutcome, convert};
pub use download::{DownloadOptions, DownloadOutcome, DownloadStats, download};
pub use error::PipelineError;
pub use naming::{DEFAULT_BASE_URL, DumpId, file_name};
pub use pipeline::{PipelineOptions, TableStats, run_table};
pub use table::{Table, UnknownTable};
pub use unquote::unquote;
