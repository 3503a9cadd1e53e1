//! # Core Module
//!
//! The detection engine.
//!
//! ## Modules
//! - `probe` - filesystem attributes and content hashes
//! - `header` - leading bytes and sniffed content type
//! - `strings` - printable strings and platform keywords
//! - `metadata` - optional metadata backends (EXIF, MP4 atoms, ffprobe)
//! - `aggregate` - merges every stage into one record
//! - `evidence` - weighted rule scoring and verdicts
//! - `image` - extra heuristics for image inputs
//! - `pipeline` - end-to-end detector
//! - `scanner` - discovers media files in folders
//! - `cache` - skips unchanged files that scored UNLIKELY before
//! - `organize` - moves detected files into verdict folders
//! - `config` - analyzer configuration

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod evidence;
pub mod header;
pub mod image;
pub mod metadata;
pub mod organize;
pub mod pipeline;
pub mod probe;
pub mod scanner;
pub mod strings;

// Re-export commonly used types
pub use aggregate::{MediaKind, MetadataRecord};
pub use config::AnalyzerConfig;
pub use evidence::{EvidenceResult, Verdict};
pub use pipeline::{Detection, Detector};
