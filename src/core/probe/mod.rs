//! # Probe Module
//!
//! Filesystem attributes and content hashes for the file under analysis.
//!
//! The file is streamed through both hashers in fixed-size chunks, so memory
//! use stays flat no matter how large the video is. This is the only stage
//! whose failure is fatal: without a readable file there is nothing to score.

use chrono::{DateTime, Utc};
use md5::Context as Md5Context;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File, Metadata};
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

use crate::core::config::ProbeConfig;
use crate::error::FileAccessError;

/// Filesystem attributes and content hashes of one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Final path component
    pub filename: String,
    /// Path as given to the probe
    pub filepath: PathBuf,
    /// Size in bytes
    pub size_bytes: u64,
    /// Size rendered for humans (e.g. "1.50 MB")
    pub size_human: String,
    /// Creation time, when the platform records one
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub accessed: Option<DateTime<Utc>>,
    /// Permission bits as three octal digits (e.g. "644")
    pub permissions: String,
    pub md5_hash: String,
    pub sha256_hash: String,
}

/// The two content digests, hex encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHashes {
    pub md5: String,
    pub sha256: String,
}

/// Computes [`FileInfo`] for a path
#[derive(Debug, Clone)]
pub struct FileProbe {
    chunk_size: usize,
}

impl Default for FileProbe {
    fn default() -> Self {
        Self::new(&ProbeConfig::default())
    }
}

impl FileProbe {
    /// Create a probe from configuration
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            chunk_size: config.chunk_size.max(1),
        }
    }

    /// Stat and hash a file
    ///
    /// Fails when the path does not exist, is not a regular file, or cannot
    /// be read to the end.
    pub fn probe(&self, path: &Path) -> Result<FileInfo, FileAccessError> {
        let metadata = fs::metadata(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => FileAccessError::NotFound {
                path: path.to_path_buf(),
            },
            _ => FileAccessError::Metadata {
                path: path.to_path_buf(),
                source,
            },
        })?;

        if !metadata.is_file() {
            return Err(FileAccessError::NotAFile {
                path: path.to_path_buf(),
            });
        }

        let read_error = |source| FileAccessError::Read {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(read_error)?;
        let hashes = hash_reader(file, self.chunk_size).map_err(read_error)?;

        debug!(path = %path.display(), md5 = %hashes.md5, "Probed file");

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(FileInfo {
            filename,
            filepath: path.to_path_buf(),
            size_bytes: metadata.len(),
            size_human: format_bytes(metadata.len()),
            created: to_utc(metadata.created()),
            modified: to_utc(metadata.modified()),
            accessed: to_utc(metadata.accessed()),
            permissions: permission_bits(&metadata),
            md5_hash: hashes.md5,
            sha256_hash: hashes.sha256,
        })
    }
}

/// Stream a reader through MD5 and SHA-256 in `chunk_size` pieces
pub fn hash_reader<R: Read>(mut reader: R, chunk_size: usize) -> io::Result<ContentHashes> {
    let mut md5 = Md5Context::new();
    let mut sha256 = Sha256::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        md5.consume(&buffer[..read]);
        sha256.update(&buffer[..read]);
    }

    Ok(ContentHashes {
        md5: format!("{:x}", md5.compute()),
        sha256: hex::encode(sha256.finalize()),
    })
}

/// Render a byte count with two decimals and a binary unit
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
    let mut size = bytes as f64;
    let mut unit = 0;

    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", size, UNITS[unit])
}

fn to_utc(time: io::Result<SystemTime>) -> Option<DateTime<Utc>> {
    time.ok().map(DateTime::<Utc>::from)
}

#[cfg(unix)]
fn permission_bits(metadata: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    format!("{:03o}", metadata.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn permission_bits(metadata: &Metadata) -> String {
    if metadata.permissions().readonly() {
        "444".to_string()
    } else {
        "666".to_string()
    }
}
