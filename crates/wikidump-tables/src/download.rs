//! Download orchestrator: one concurrent HTTP fetch per requested table

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use rayon::prelude::*;
use wikidump_core::sink::tmp_path;
use wikidump_core::{ProgressContext, StreamError, fmt_bytes, open_http_reader, upgrade_to_bar};

use crate::naming::{DEFAULT_BASE_URL, DumpId};
use crate::table::Table;

/// Copy buffer for response bodies (256KB)
const COPY_BUF_SIZE: usize = 256 * 1024;

#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Dump mirror root
    pub base_url: String,
    /// Replace existing dump files instead of refusing
    pub overwrite: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            overwrite: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadStats {
    pub bytes: u64,
    pub path: PathBuf,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct DownloadOutcome {
    pub table: Table,
    pub result: Result<DownloadStats, StreamError>,
}

/// Fetch every distinct table's dump into `root`, concurrently.
///
/// Outcomes are returned once all fetches ended; a failure does not cancel
/// the others.
pub fn download(
    root: &Path,
    dump: &DumpId,
    tables: &[Table],
    options: &DownloadOptions,
    progress: &ProgressContext,
) -> Vec<DownloadOutcome> {
    let tables = Table::dedup(tables);
    tables
        .par_iter()
        .map(|&table| {
            let url = dump.url(&options.base_url, table);
            let dest = dump.dump_path(root, table);
            let pb = progress.table_bar(table.name());
            pb.set_message("connecting...");
            log::info!("Start downloading: {url}");

            let result = fetch(&url, &dest, options.overwrite, &pb);
            pb.finish_and_clear();
            match &result {
                Ok(stats) => log::info!(
                    "[{table}] {} written to {} in {:.1}s",
                    fmt_bytes(stats.bytes),
                    stats.path.display(),
                    stats.elapsed.as_secs_f64()
                ),
                Err(e) => log::error!("[{table}] download failed: {e}"),
            }
            DownloadOutcome { table, result }
        })
        .collect()
}

/// GET `url` into `dest` via a tmp file; no resume, no retry.
fn fetch(
    url: &str,
    dest: &Path,
    overwrite: bool,
    pb: &ProgressBar,
) -> Result<DownloadStats, StreamError> {
    let start = Instant::now();
    if dest.exists() && !overwrite {
        return Err(StreamError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", dest.display()),
        )));
    }

    let (mut body, counter, total) = open_http_reader(url)?;
    if let Some(total) = total {
        upgrade_to_bar(pb, total);
    }
    pb.set_message("downloading...");

    let tmp = tmp_path(dest);
    let result = copy_body(&mut body, &tmp, pb, || counter.load(Ordering::Relaxed));
    let bytes = match result {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            return Err(StreamError::Io(e));
        }
    };

    if let Some(total) = total {
        if bytes != total {
            let _ = fs::remove_file(&tmp);
            return Err(StreamError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("received {bytes} of {total} bytes"),
            )));
        }
    }
    fs::rename(&tmp, dest)?;

    Ok(DownloadStats {
        bytes,
        path: dest.to_path_buf(),
        elapsed: start.elapsed(),
    })
}

/// Stream `body` into a freshly created file, synced before returning.
fn copy_body(
    body: &mut impl Read,
    path: &Path,
    pb: &ProgressBar,
    position: impl Fn() -> u64,
) -> io::Result<u64> {
    let mut out = BufWriter::new(File::create(path)?);
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    let mut written = 0u64;
    loop {
        let n = match body.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        out.write_all(&buf[..n])?;
        written += n as u64;
        pb.set_position(position());
    }
    let file = out.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_options() {
        let opts = DownloadOptions::default();
        assert_eq!(opts.base_url, "https://dumps.wikimedia.org/");
        assert!(!opts.overwrite);
    }

    #[test]
    fn existing_destination_is_refused() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("enwiki-20230801-page.sql.gz");
        fs::write(&dest, b"already here").unwrap();

        let err = fetch(
            "http://127.0.0.1:9/unused",
            &dest,
            false,
            &ProgressBar::hidden(),
        )
        .unwrap_err();
        assert!(matches!(err, StreamError::Io(ref e) if e.kind() == io::ErrorKind::AlreadyExists));
        assert_eq!(fs::read(&dest).unwrap(), b"already here");
    }

    #[test]
    fn copy_body_writes_everything() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("body.tmp");
        let data = vec![42u8; COPY_BUF_SIZE * 2 + 17];
        let written = copy_body(&mut &data[..], &path, &ProgressBar::hidden(), || 0).unwrap();
        assert_eq!(written, data.len() as u64);
        assert_eq!(fs::read(&path).unwrap(), data);
    }
}
