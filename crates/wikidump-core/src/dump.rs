//! Gzip dump reading: bounded line scan and INSERT statement assembly.
//!
//! A dump may put a whole multi-row `INSERT` on one physical line, or spread a
//! statement over several lines. [`StatementAssembler`] turns the line stream
//! into complete statements; [`Statements`] drives it from a [`LineScanner`].

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::error::DumpError;
use crate::stream::{ByteCounter, CountingReader};

/// Default maximum length of a single physical line (10 MiB)
pub const DEFAULT_MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

/// Buffer size for the decompressed stream (256KB)
const GZIP_BUF_SIZE: usize = 256 * 1024;

/// Buffered, decompressing reader over a dump file with compressed-byte counting
pub type DumpReader = BufReader<MultiGzDecoder<CountingReader<File>>>;

/// SQL prefix every statement of `table` starts with
pub fn insert_prefix(table: &str) -> String {
    format!("INSERT INTO `{table}` VALUES")
}

/// An opened `.sql.gz` dump
pub struct DumpFile {
    path: PathBuf,
    reader: DumpReader,
    counter: ByteCounter,
    compressed_len: u64,
}

impl std::fmt::Debug for DumpFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DumpFile")
            .field("path", &self.path)
            .field("compressed_len", &self.compressed_len)
            .finish_non_exhaustive()
    }
}

impl DumpFile {
    /// Open a dump, distinguishing a missing path from a directory.
    pub fn open(path: &Path) -> Result<Self, DumpError> {
        let meta = match fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(DumpError::Missing(path.to_path_buf()));
            }
            Err(source) => {
                return Err(DumpError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        if meta.is_dir() {
            return Err(DumpError::IsDirectory(path.to_path_buf()));
        }

        let file = File::open(path).map_err(|source| DumpError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (counting, counter) = CountingReader::new(file);
        let reader = BufReader::with_capacity(GZIP_BUF_SIZE, MultiGzDecoder::new(counting));

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            counter,
            compressed_len: meta.len(),
        })
    }

    /// Size of the compressed file on disk
    pub fn compressed_len(&self) -> u64 {
        self.compressed_len
    }

    /// Counter of compressed bytes consumed so far
    pub fn counter(&self) -> ByteCounter {
        self.counter.clone()
    }

    /// Lazy, non-restartable sequence of complete statements for `table`
    pub fn statements(self, table: &str, max_line_bytes: usize) -> Statements<DumpReader> {
        Statements::new(self.reader, table, max_line_bytes, self.path)
    }
}

/// Line reader with a hard cap on physical line length.
///
/// Yields lines without their `\n` / `\r\n` terminator. Invalid UTF-8 is
/// replaced rather than rejected.
pub struct LineScanner<R> {
    reader: R,
    buf: Vec<u8>,
    limit: usize,
    line_no: usize,
    path: PathBuf,
}

impl<R: BufRead> LineScanner<R> {
    pub fn new(reader: R, limit: usize, path: PathBuf) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(64 * 1024),
            limit,
            line_no: 0,
            path,
        }
    }

    /// Read the next line, `None` at end of input
    pub fn next_line(&mut self) -> Result<Option<Cow<'_, str>>, DumpError> {
        self.buf.clear();
        // One byte past the limit tells a full-length line apart from an overlong one
        let n = (&mut self.reader)
            .take(self.limit as u64 + 1)
            .read_until(b'\n', &mut self.buf)
            .map_err(|source| DumpError::Io {
                path: self.path.clone(),
                source,
            })?;
        if n == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        } else if self.buf.len() > self.limit {
            return Err(DumpError::LineTooLong {
                line: self.line_no,
                limit: self.limit,
            });
        }

        Ok(Some(String::from_utf8_lossy(&self.buf)))
    }

    /// Number of lines read so far
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

/// Where the assembler is between statements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    /// Waiting for a line that starts with the insert prefix
    Idle,
    /// Inside a statement that has not reached its `;` yet
    Accumulating,
}

/// Accumulates physical lines into complete `INSERT ... VALUES ...;` statements.
///
/// Lines outside a statement are skipped. A statement opened again before its
/// terminator was seen is discarded and the new one started.
#[derive(Debug)]
pub struct StatementAssembler {
    prefix: String,
    state: AssemblerState,
    buffer: String,
}

impl StatementAssembler {
    pub fn new(table: &str) -> Self {
        Self {
            prefix: insert_prefix(table),
            state: AssemblerState::Idle,
            buffer: String::new(),
        }
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Feed one physical line; returns a statement once its `;` is reached.
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        match self.state {
            AssemblerState::Idle => {
                if !line.starts_with(&self.prefix) {
                    return None;
                }
            }
            AssemblerState::Accumulating => {
                if line.starts_with(&self.prefix) {
                    log::warn!(
                        "discarding unterminated statement ({} bytes)",
                        self.buffer.len()
                    );
                    self.buffer.clear();
                } else {
                    self.buffer.push('\n');
                }
            }
        }
        self.buffer.push_str(line);

        let end = self.buffer.trim_end().len();
        if self.buffer[..end].ends_with(';') {
            self.buffer.truncate(end);
            self.state = AssemblerState::Idle;
            Some(std::mem::take(&mut self.buffer))
        } else {
            self.state = AssemblerState::Accumulating;
            None
        }
    }

    /// Drop any unterminated statement, returning how many bytes were discarded
    pub fn discard_partial(&mut self) -> usize {
        let dropped = self.buffer.len();
        self.buffer.clear();
        self.state = AssemblerState::Idle;
        dropped
    }
}

/// Iterator of complete statements over a line-oriented reader.
///
/// Ends after the first error. A trailing statement without `;` is dropped.
pub struct Statements<R> {
    scanner: LineScanner<R>,
    assembler: StatementAssembler,
    done: bool,
}

impl<R: BufRead> Statements<R> {
    pub fn new(reader: R, table: &str, max_line_bytes: usize, path: PathBuf) -> Self {
        Self {
            scanner: LineScanner::new(reader, max_line_bytes, path),
            assembler: StatementAssembler::new(table),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for Statements<R> {
    type Item = Result<String, DumpError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let line = match self.scanner.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            if let Some(stmt) = self.assembler.push_line(&line) {
                return Some(Ok(stmt));
            }
        }

        self.done = true;
        let dropped = self.assembler.discard_partial();
        if dropped > 0 {
            log::warn!(
                "dump ended inside a statement, dropped {dropped} bytes after line {}",
                self.scanner.line_no()
            );
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempfile::TempDir;

    fn statements(input: &str, limit: usize) -> Vec<Result<String, DumpError>> {
        Statements::new(
            Cursor::new(input.as_bytes().to_vec()),
            "page",
            limit,
            PathBuf::from("test.sql"),
        )
        .collect()
    }

    fn ok_statements(input: &str) -> Vec<String> {
        statements(input, DEFAULT_MAX_LINE_BYTES)
            .into_iter()
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn prefix_format() {
        assert_eq!(insert_prefix("pagelinks"), "INSERT INTO `pagelinks` VALUES");
    }

    #[test]
    fn idle_skips_unrelated_lines() {
        let mut asm = StatementAssembler::new("page");
        assert_eq!(asm.push_line("-- MySQL dump 10.19"), None);
        assert_eq!(asm.push_line("CREATE TABLE `page` ("), None);
        assert_eq!(asm.push_line("INSERT INTO `redirect` VALUES (1);"), None);
        assert_eq!(asm.state(), AssemblerState::Idle);
    }

    #[test]
    fn single_line_statement() {
        let mut asm = StatementAssembler::new("page");
        let stmt = asm.push_line("INSERT INTO `page` VALUES (1),(2);");
        assert_eq!(stmt.as_deref(), Some("INSERT INTO `page` VALUES (1),(2);"));
        assert_eq!(asm.state(), AssemblerState::Idle);
    }

    #[test]
    fn multi_line_statement() {
        let mut asm = StatementAssembler::new("page");
        assert_eq!(asm.push_line("INSERT INTO `page` VALUES (1),"), None);
        assert_eq!(asm.state(), AssemblerState::Accumulating);
        assert_eq!(asm.push_line("(2),"), None);
        let stmt = asm.push_line("(3);").unwrap();
        assert_eq!(stmt, "INSERT INTO `page` VALUES (1),\n(2),\n(3);");
        assert_eq!(asm.state(), AssemblerState::Idle);
    }

    #[test]
    fn trailing_whitespace_after_semicolon() {
        let mut asm = StatementAssembler::new("page");
        let stmt = asm.push_line("INSERT INTO `page` VALUES (1);  ").unwrap();
        assert!(stmt.ends_with(';'));
    }

    #[test]
    fn reopened_statement_discards_partial() {
        let mut asm = StatementAssembler::new("page");
        assert_eq!(asm.push_line("INSERT INTO `page` VALUES (1),"), None);
        let stmt = asm.push_line("INSERT INTO `page` VALUES (9);").unwrap();
        assert_eq!(stmt, "INSERT INTO `page` VALUES (9);");
    }

    #[test]
    fn discard_partial_resets() {
        let mut asm = StatementAssembler::new("page");
        asm.push_line("INSERT INTO `page` VALUES (1),");
        assert!(asm.discard_partial() > 0);
        assert_eq!(asm.state(), AssemblerState::Idle);
        assert_eq!(asm.discard_partial(), 0);
    }

    #[test]
    fn iterator_yields_in_order() {
        let input = "-- header\n\
                     INSERT INTO `page` VALUES (1);\n\
                     /*!40000 ALTER TABLE */;\n\
                     INSERT INTO `page` VALUES (2),\n(3);\n";
        let stmts = ok_statements(input);
        assert_eq!(
            stmts,
            vec![
                "INSERT INTO `page` VALUES (1);".to_string(),
                "INSERT INTO `page` VALUES (2),\n(3);".to_string(),
            ]
        );
    }

    #[test]
    fn unterminated_statement_at_eof_is_dropped() {
        let input = "INSERT INTO `page` VALUES (1);\nINSERT INTO `page` VALUES (2),(3)";
        let stmts = ok_statements(input);
        assert_eq!(stmts, vec!["INSERT INTO `page` VALUES (1);".to_string()]);
    }

    #[test]
    fn crlf_line_endings() {
        let stmts = ok_statements("INSERT INTO `page` VALUES (1);\r\n");
        assert_eq!(stmts, vec!["INSERT INTO `page` VALUES (1);".to_string()]);
    }

    #[test]
    fn line_at_limit_is_accepted() {
        let line = "INSERT INTO `page` VALUES (1);";
        let results = statements(&format!("{line}\n"), line.len());
        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
    }

    #[test]
    fn line_over_limit_is_fatal() {
        let line = "INSERT INTO `page` VALUES (1),(2),(3);";
        let results = statements(&format!("{line}\nINSERT INTO `page` VALUES (4);\n"), 10);
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(DumpError::LineTooLong { line: 1, limit: 10 })
        ));
    }

    #[test]
    fn open_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = DumpFile::open(&dir.path().join("nope.sql.gz")).unwrap_err();
        assert!(matches!(err, DumpError::Missing(_)));
    }

    #[test]
    fn open_directory() {
        let dir = TempDir::new().unwrap();
        let err = DumpFile::open(dir.path()).unwrap_err();
        assert!(matches!(err, DumpError::IsDirectory(_)));
    }

    #[test]
    fn reads_gzip_dump() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("enwiki-20230801-page.sql.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(b"-- dump\nINSERT INTO `page` VALUES (1),(2);\n")
            .unwrap();
        enc.finish().unwrap();

        let dump = DumpFile::open(&path).unwrap();
        assert!(dump.compressed_len() > 0);
        let counter = dump.counter();
        let stmts: Vec<String> = dump
            .statements("page", DEFAULT_MAX_LINE_BYTES)
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(stmts, vec!["INSERT INTO `page` VALUES (1),(2);".to_string()]);
        assert!(counter.load(std::sync::atomic::Ordering::Relaxed) > 0);
    }

    #[test]
    fn corrupt_gzip_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.sql.gz");
        std::fs::write(&path, b"this is not gzip data at all").unwrap();

        let dump = DumpFile::open(&path).unwrap();
        let results: Vec<_> = dump.statements("page", DEFAULT_MAX_LINE_BYTES).collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(DumpError::Io { .. })));
    }
}
