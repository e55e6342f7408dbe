//! Errors raised while opening and scanning a dump file

use std::path::PathBuf;

/// Error from reading a gzip-compressed SQL dump.
///
/// Every variant is fatal to the pipeline that owns the dump.
#[derive(Debug)]
pub enum DumpError {
    /// The dump path does not exist
    Missing(PathBuf),
    /// The dump path exists but is a directory
    IsDirectory(PathBuf),
    /// A physical line exceeded the scanner's capacity
    LineTooLong { line: usize, limit: usize },
    /// Open, decompression or read failure
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for DumpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "file {} does not exist", path.display()),
            Self::IsDirectory(path) => write!(f, "{} is a directory", path.display()),
            Self::LineTooLong { line, limit } => {
                write!(f, "line {line} is longer than {limit} bytes")
            }
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl std::error::Error for DumpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
