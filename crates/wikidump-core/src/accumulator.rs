//! Batch accumulator trait: typed rows → Arrow `RecordBatch`

use arrow::array::RecordBatch;
use arrow::error::ArrowError;

/// Column builder for one record type.
///
/// Rows are pushed one at a time and taken out together as a `RecordBatch`
/// whose schema is fixed by the implementor.
pub trait Accumulator {
    type Row;

    /// Push a row into the accumulator
    fn push(&mut self, row: Self::Row);

    /// Number of rows currently buffered
    fn len(&self) -> usize;

    /// Check if buffer is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take buffered rows as a RecordBatch, resetting internal state
    fn take_batch(&mut self) -> Result<RecordBatch, ArrowError>;

    /// Push every row of `rows` in order
    fn extend(&mut self, rows: Vec<Self::Row>) {
        for row in rows {
            self.push(row);
        }
    }
}
