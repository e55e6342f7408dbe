//! Wikidump Core - plumbing for SQL dump → Parquet pipelines
//!
//! Dump reading and statement assembly, the bounded batch writer, the
//! Parquet sink, HTTP streaming, logging and progress reporting.

pub mod accumulator;
pub mod dump;
pub mod error;
pub mod logging;
pub mod progress;
pub mod sink;
pub mod stream;
pub mod writer;

// Re-exports for convenience
pub use accumulator::Accumulator;
pub use dump::{DEFAULT_MAX_LINE_BYTES, DumpFile, StatementAssembler, Statements, insert_prefix};
pub use error::DumpError;
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, fmt_bytes, fmt_num, upgrade_to_bar};
pub use sink::ParquetSink;
pub use stream::{
    ByteCounter, HttpConfig, SHARED_RUNTIME, StreamError, http_config, open_http_reader,
    set_http_config,
};
pub use writer::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_PROGRESS_EVERY, drain_batches};
