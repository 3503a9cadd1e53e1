//! # Aggregate Module
//!
//! Merges every extraction stage into one [`MetadataRecord`].
//!
//! ## Stages
//! 1. [`FileProbe`] - filesystem attributes and hashes (fatal on failure)
//! 2. [`HeaderSniffer`] - leading bytes and sniffed content type
//! 3. [`StringScanner`] - printable runs and keyword hits
//! 4. [`BackendRegistry`] - one optional section per metadata backend
//!
//! Stages 2-4 never fail; their problems are recorded inside the record.
//! The record is built once and is read-only afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::core::config::AnalyzerConfig;
use crate::core::header::{HeaderSniffer, HexHeader};
use crate::core::metadata::{BackendKind, BackendRegistry, BackendStatus, ContainerSection, StreamInfo};
use crate::core::probe::{FileInfo, FileProbe};
use crate::core::strings::{StringAnalysis, StringScanner};
use crate::error::Result;

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "bmp", "heic", "heif", "tif", "tiff", "avif",
];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "avi", "mkv", "webm", "3gp"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "aac", "wav", "flac", "ogg", "opus"];

/// Broad kind of media, used to decide which scoring stages apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    #[default]
    Other,
}

impl MediaKind {
    /// Classify from the sniffed MIME type, falling back to the extension
    pub fn classify(header: &HexHeader, path: &Path) -> Self {
        if let Some(mime) = header.detected_mime.as_deref() {
            match mime.split('/').next() {
                Some("image") => return MediaKind::Image,
                Some("video") => return MediaKind::Video,
                Some("audio") => return MediaKind::Audio,
                _ => {}
            }
        }

        match declared_extension(path).as_deref() {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => MediaKind::Image,
            Some(ext) if VIDEO_EXTENSIONS.contains(&ext) => MediaKind::Video,
            Some(ext) if AUDIO_EXTENSIONS.contains(&ext) => MediaKind::Audio,
            _ => MediaKind::Other,
        }
    }
}

/// Lowercased file extension, if any
pub fn declared_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Everything known about one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub extraction_timestamp: DateTime<Utc>,
    pub extractor_version: String,
    pub media_kind: MediaKind,
    pub file_info: FileInfo,
    pub hex_header: HexHeader,
    pub string_analysis: StringAnalysis,
    /// One section per backend that produced data
    pub sections: BTreeMap<BackendKind, ContainerSection>,
    /// Which registered backends were usable
    pub backends_available: BTreeMap<BackendKind, bool>,
    /// What happened in each registered backend
    pub backend_status: BTreeMap<BackendKind, BackendStatus>,
}

impl MetadataRecord {
    /// Sections whose tags and streams feed the container rules
    pub fn evidence_sections(&self) -> impl Iterator<Item = &ContainerSection> {
        self.sections
            .values()
            .filter(|s| s.backend.carries_container_evidence())
    }

    /// Video streams from the evidence sections
    pub fn video_streams(&self) -> impl Iterator<Item = &StreamInfo> {
        self.evidence_sections()
            .flat_map(|s| s.streams.iter())
            .filter(|s| s.is_video())
    }

    /// Pixel size of the first stream that reports one, from any backend
    pub fn primary_dimensions(&self) -> Option<(u32, u32)> {
        self.sections
            .values()
            .flat_map(|s| s.streams.iter())
            .find_map(|s| s.dimensions())
    }

    /// Lowercased extension of the analyzed file
    pub fn declared_extension(&self) -> Option<String> {
        declared_extension(Path::new(&self.file_info.filename))
    }
}

/// Runs every extraction stage against a file
#[derive(Debug)]
pub struct MetadataAggregator {
    probe: FileProbe,
    header: HeaderSniffer,
    strings: StringScanner,
    registry: BackendRegistry,
}

impl MetadataAggregator {
    /// Build an aggregator with the backends enabled in `config`
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self::with_registry(config, BackendRegistry::from_config(&config.backends))
    }

    /// Build an aggregator around an explicit backend registry
    pub fn with_registry(config: &AnalyzerConfig, registry: BackendRegistry) -> Self {
        Self {
            probe: FileProbe::new(&config.probe),
            header: HeaderSniffer::new(&config.header),
            strings: StringScanner::new(&config.strings),
            registry,
        }
    }

    /// Extract all metadata for a file
    ///
    /// Fails only when the file itself cannot be stat'd or read.
    pub fn analyze(&self, path: &Path) -> Result<MetadataRecord> {
        let file_info = self.probe.probe(path)?;
        let hex_header = self.header.sniff(path);
        let string_analysis = self.strings.scan_file(path);
        let extraction = self.registry.extract(path);
        let media_kind = MediaKind::classify(&hex_header, path);

        debug!(
            path = %path.display(),
            ?media_kind,
            sections = extraction.sections.len(),
            "Aggregated metadata"
        );

        Ok(MetadataRecord {
            extraction_timestamp: Utc::now(),
            extractor_version: env!("CARGO_PKG_VERSION").to_string(),
            media_kind,
            file_info,
            hex_header,
            string_analysis,
            sections: extraction.sections,
            backends_available: extraction.available,
            backend_status: extraction.status,
        })
    }
}
