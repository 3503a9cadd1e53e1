//! # Scanner Module
//!
//! Discovers media files in a directory for the `scan` command.
//!
//! ## Supported Formats
//! - Images: .jpg, .jpeg, .png, .webp, .gif, .bmp, .heic
//! - Video: .mp4, .mov, .avi, .m4v
//!
//! ## Example
//! ```rust,ignore
//! use tiktok_origin::core::scanner::{ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let result = scanner.scan(Path::new("/sdcard/Download"))?;
//! ```

mod filter;
mod walker;

pub use filter::MediaFilter;
pub use walker::{ScanConfig, WalkDirScanner};

use serde::Serialize;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::error::ScanError;

/// A discovered media file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaFile {
    pub path: PathBuf,
    pub size: u64,
    /// Last modification time, when the platform reports one
    pub modified: Option<SystemTime>,
}

/// Result of a scan operation
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Media files in walk order
    pub files: Vec<MediaFile>,
    /// Entries that could not be read (non-fatal)
    pub errors: Vec<ScanError>,
}
