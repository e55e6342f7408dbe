//! Parquet file sink with atomic tmp→rename

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use arrow::array::RecordBatch;
use arrow::datatypes::SchemaRef;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;

/// Rows per Parquet row group
const MAX_ROW_GROUP_SIZE: usize = 1024 * 1024;

/// Temporary path a sink for `path` writes to before finalize
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Parquet writer that only exposes its output once finalized.
///
/// Writes go to `<path>.tmp`; [`finalize`](ParquetSink::finalize) flushes the
/// footer, syncs and renames over `<path>`. [`abort`](ParquetSink::abort)
/// removes the tmp file, so a failed run leaves nothing behind.
pub struct ParquetSink {
    writer: ArrowWriter<File>,
    tmp_path: PathBuf,
    final_path: PathBuf,
    row_count: usize,
}

impl std::fmt::Debug for ParquetSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParquetSink")
            .field("final_path", &self.final_path)
            .field("row_count", &self.row_count)
            .finish_non_exhaustive()
    }
}

impl ParquetSink {
    /// Create a new sink for `path`, truncating any stale tmp file
    pub fn create(path: &Path, schema: SchemaRef, zstd_level: i32) -> io::Result<Self> {
        let final_path = path.to_path_buf();
        let tmp_path = tmp_path(path);

        let level = ZstdLevel::try_new(zstd_level)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let file = File::create(&tmp_path)?;
        let props = WriterProperties::builder()
            .set_compression(Compression::ZSTD(level))
            .set_max_row_group_size(MAX_ROW_GROUP_SIZE)
            .build();

        let writer = ArrowWriter::try_new(file, schema, Some(props)).map_err(io::Error::other)?;

        Ok(Self {
            writer,
            tmp_path,
            final_path,
            row_count: 0,
        })
    }

    /// Write a record batch
    pub fn write_batch(&mut self, batch: &RecordBatch) -> io::Result<()> {
        self.writer.write(batch).map_err(io::Error::other)?;
        self.row_count += batch.num_rows();
        Ok(())
    }

    /// Rows accepted so far
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Flush footer, sync to disk and atomically rename tmp → final
    pub fn finalize(self) -> io::Result<usize> {
        let file = self.writer.into_inner().map_err(io::Error::other)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&self.tmp_path, &self.final_path)?;
        Ok(self.row_count)
    }

    /// Discard everything written so far
    pub fn abort(self) {
        drop(self.writer);
        if let Err(e) = fs::remove_file(&self.tmp_path) {
            log::warn!("failed to remove {}: {e}", self.tmp_path.display());
        }
    }
}
