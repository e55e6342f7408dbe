//! One table's conversion: reader+parser thread → bounded channel → writer thread

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use wikidump_core::progress::fmt_num;
use wikidump_core::{
    ByteCounter, DEFAULT_CHANNEL_CAPACITY, DEFAULT_MAX_LINE_BYTES, DEFAULT_PROGRESS_EVERY,
    DumpError, DumpFile, ParquetSink, drain_batches, sink, upgrade_to_bar,
};

use crate::error::PipelineError;
use crate::transform::DumpTable;

/// Tuning knobs shared by every table pipeline
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Record batches buffered between parser and writer
    pub channel_capacity: usize,
    /// Log cumulative rows every N batches
    pub progress_every: usize,
    /// Longest physical line the scanner accepts
    pub max_line_bytes: usize,
    /// Zstd compression level for the Parquet output
    pub zstd_level: i32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            progress_every: DEFAULT_PROGRESS_EVERY,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            zstd_level: 3,
        }
    }
}

/// Result of a successful table conversion
#[derive(Debug, Clone)]
pub struct TableStats {
    pub statements: usize,
    pub rows: usize,
    pub output: PathBuf,
    pub elapsed: Duration,
}

/// What the producer stage saw
struct Produced {
    statements: usize,
    rows: usize,
}

/// Convert `input` into `output` for table variant `T`.
///
/// The calling thread reads and parses; a scoped thread writes. Output only
/// appears at `output` when both stages finished cleanly.
pub fn run_table<T: DumpTable>(
    input: &Path,
    output: &Path,
    options: &PipelineOptions,
    pb: &ProgressBar,
) -> Result<TableStats, PipelineError> {
    let start = Instant::now();
    let name = T::TABLE.name();

    let dump = DumpFile::open(input)?;
    upgrade_to_bar(pb, dump.compressed_len());
    let counter = dump.counter();

    let output_err = |source| PipelineError::Output {
        path: output.to_path_buf(),
        source,
    };
    let sink = ParquetSink::create(output, T::schema(), options.zstd_level).map_err(output_err)?;

    let (tx, rx) = batch_channel::<T::Record>(options.channel_capacity);
    let progress_every = options.progress_every;

    let (produced, written) = std::thread::scope(|s| {
        let writer =
            s.spawn(move || drain_batches(name, rx, T::accumulator(), sink, progress_every));
        let statements = dump.statements(name, options.max_line_bytes);
        let produced = produce::<T>(statements, tx, &counter, pb);
        (produced, writer.join())
    });

    let sink = match written {
        Ok(Ok(sink)) => sink,
        Ok(Err(source)) => {
            return Err(match produced {
                Err(e) if !matches!(e, PipelineError::WriterGone) => e,
                _ => output_err(source),
            });
        }
        Err(_) => {
            let _ = std::fs::remove_file(sink::tmp_path(output));
            return Err(PipelineError::WriterPanicked);
        }
    };

    let produced = match produced {
        Ok(p) => p,
        Err(e) => {
            log::error!("[{name}] aborting: {e}");
            sink.abort();
            return Err(e);
        }
    };

    let rows = sink.finalize().map_err(output_err)?;
    debug_assert_eq!(rows, produced.rows);
    log::info!("[{name}] write finished: {}", output.display());

    Ok(TableStats {
        statements: produced.statements,
        rows,
        output: output.to_path_buf(),
        elapsed: start.elapsed(),
    })
}

/// Bounded parser → writer channel; a zero capacity is raised to one.
fn batch_channel<R>(capacity: usize) -> (SyncSender<Vec<R>>, Receiver<Vec<R>>) {
    sync_channel(capacity.max(1))
}

/// Producer stage: parse each statement and hand its records to the writer.
///
/// Blocks on `send` while the channel is full. Dropping `tx` on return is the
/// writer's end-of-stream signal.
fn produce<T: DumpTable>(
    statements: impl Iterator<Item = Result<String, DumpError>>,
    tx: SyncSender<Vec<T::Record>>,
    counter: &ByteCounter,
    pb: &ProgressBar,
) -> Result<Produced, PipelineError> {
    let mut produced = Produced {
        statements: 0,
        rows: 0,
    };

    for statement in statements {
        let records = T::parse(&statement?)?;
        produced.statements += 1;
        produced.rows += records.len();
        tx.send(records).map_err(|_| PipelineError::WriterGone)?;

        pb.set_position(counter.load(Ordering::Relaxed));
        pb.set_message(format!("{} rows", fmt_num(produced.rows)));
    }

    log::debug!(
        "[{}] parsed {} statements",
        T::TABLE,
        fmt_num(produced.statements)
    );
    Ok(produced)
}
