//! Consumer stage of a table pipeline: drain row batches into a Parquet sink

use std::io;
use std::sync::mpsc::Receiver;

use crate::accumulator::Accumulator;
use crate::progress::fmt_num;
use crate::sink::ParquetSink;

/// Batches the bounded channel holds before the producer blocks
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Log cumulative rows every N received batches
pub const DEFAULT_PROGRESS_EVERY: usize = 30;

/// Receive row batches until every sender is dropped, writing each non-empty
/// batch as one `RecordBatch`.
///
/// Returns the sink unfinalized so the caller can commit or discard it
/// depending on how the producer ended. On a write error the sink is aborted
/// and the receiver dropped, which unblocks the producer.
pub fn drain_batches<A: Accumulator>(
    label: &str,
    rx: Receiver<Vec<A::Row>>,
    mut acc: A,
    mut sink: ParquetSink,
    progress_every: usize,
) -> io::Result<ParquetSink> {
    log::info!("[{label}] write started");
    let mut received = 0usize;

    for rows in rx {
        received += 1;
        if !rows.is_empty() {
            acc.extend(rows);
            let written = acc
                .take_batch()
                .map_err(io::Error::other)
                .and_then(|batch| sink.write_batch(&batch));
            if let Err(e) = written {
                log::error!("[{label}] write failed: {e}");
                sink.abort();
                return Err(e);
            }
        }
        if progress_every > 0 && received % progress_every == 0 {
            log::info!("[{label}] wrote {} rows", fmt_num(sink.row_count()));
        }
    }

    log::info!(
        "[{label}] wrote {} rows from {received} batches, end of writing",
        fmt_num(sink.row_count())
    );
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::sync::Arc;
    use std::sync::mpsc::sync_channel;

    use arrow::array::{Int64Array, RecordBatch};
    use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
    use arrow::error::ArrowError;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::TempDir;

    struct IdAccumulator {
        schema: SchemaRef,
        ids: Vec<i64>,
    }

    impl IdAccumulator {
        fn new() -> Self {
            Self {
                schema: Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)])),
                ids: Vec::new(),
            }
        }
    }

    impl Accumulator for IdAccumulator {
        type Row = i64;

        fn push(&mut self, row: i64) {
            self.ids.push(row);
        }

        fn len(&self) -> usize {
            self.ids.len()
        }

        fn take_batch(&mut self) -> Result<RecordBatch, ArrowError> {
            let ids = Int64Array::from(std::mem::take(&mut self.ids));
            RecordBatch::try_new(self.schema.clone(), vec![Arc::new(ids)])
        }
    }

    fn read_ids(path: &std::path::Path) -> Vec<i64> {
        let file = File::open(path).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let mut out = Vec::new();
        for batch in reader {
            let batch = batch.unwrap();
            let col = batch
                .column(0)
                .as_any()
                .downcast_ref::<Int64Array>()
                .unwrap();
            out.extend(col.values().iter().copied());
        }
        out
    }

    #[test]
    fn drains_all_batches_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ids.parquet");
        let acc = IdAccumulator::new();
        let sink = ParquetSink::create(&path, acc.schema.clone(), 3).unwrap();
        let (tx, rx) = sync_channel::<Vec<i64>>(2);

        let writer = std::thread::spawn(move || drain_batches("ids", rx, acc, sink, 2));
        for chunk in [vec![1, 2], vec![], vec![3], vec![4, 5, 6]] {
            tx.send(chunk).unwrap();
        }
        drop(tx);

        let sink = writer.join().unwrap().unwrap();
        assert_eq!(sink.row_count(), 6);
        sink.finalize().unwrap();
        assert_eq!(read_ids(&path), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn closed_channel_without_batches() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("none.parquet");
        let acc = IdAccumulator::new();
        let sink = ParquetSink::create(&path, acc.schema.clone(), 3).unwrap();
        let (tx, rx) = sync_channel::<Vec<i64>>(1);
        drop(tx);

        let sink = drain_batches("none", rx, acc, sink, DEFAULT_PROGRESS_EVERY).unwrap();
        assert_eq!(sink.finalize().unwrap(), 0);
        assert!(read_ids(&path).is_empty());
    }
}
