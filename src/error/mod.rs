//! # Error Module
//!
//! Error types for the TikTok origin detector.
//!
//! ## Taxonomy
//! - **Fatal** - the input file cannot be stat'd or read. Nothing meaningful
//!   can be said about it, so the whole analysis aborts.
//! - **Soft** - one metadata source failed (header read, string scan, a
//!   metadata backend). The failure is recorded in the metadata record and
//!   contributes zero evidence; it never escapes its own boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("File access error: {0}")]
    FileAccess(#[from] FileAccessError),

    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to render output: {0}")]
    Output(String),
}

/// Fatal errors raised while probing the input file itself
#[derive(Error, Debug)]
pub enum FileAccessError {
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Not a regular file: {path}")]
    NotAFile { path: PathBuf },

    #[error("Failed to read file metadata for {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Soft errors from a single metadata backend
///
/// These are rendered into the record's backend status and never abort an
/// analysis.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("EXIF parsing failed: {0}")]
    Exif(String),

    #[error("Malformed container data: {0}")]
    Parse(String),

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {code:?}")]
    ExitStatus { program: String, code: Option<i32> },

    #[error("{program} did not finish within {seconds:.1}s")]
    Timeout { program: String, seconds: f64 },
}

/// Errors that occur while walking a folder for media files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to walk {path}: {reason}")]
    Walk { path: PathBuf, reason: String },
}

/// Errors from the scan cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to open cache database at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Cache query failed: {0}")]
    QueryFailed(String),

    #[error("Cache at {path} is corrupted")]
    Corrupted { path: PathBuf },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DetectorError>;
