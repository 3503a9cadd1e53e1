//! # Metadata Module
//!
//! Container and tag metadata from independently optional backends.
//!
//! ## Backends
//! - `exif` - EXIF tags plus decoded image dimensions (kamadak-exif, image)
//! - `container_tags` - native MP4/MOV atom reader (ftyp, udta, ilst, trak)
//! - `ffprobe` - the external `ffprobe` tool, run under a timeout
//!
//! Each backend implements [`MetadataBackend`] and contributes at most one
//! [`ContainerSection`]. A backend that is missing, has nothing to say about
//! the file, or fails is recorded in the backend status map and simply
//! contributes no section. One backend never blocks another.
//!
//! ## Example
//! ```rust,ignore
//! use tiktok_origin::core::metadata::BackendRegistry;
//!
//! let registry = BackendRegistry::from_config(&BackendConfig::default());
//! let extraction = registry.extract(&path);
//! ```

mod exif_tags;
mod ffprobe;
mod mp4;

pub use self::exif_tags::ExifBackend;
pub use self::ffprobe::FfprobeBackend;
pub use self::mp4::ContainerTagBackend;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

use crate::core::config::BackendConfig;
use crate::error::BackendError;

/// Identifies a metadata backend; also the section's key in the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Exif,
    ContainerTags,
    Ffprobe,
}

impl BackendKind {
    /// Stable name used in JSON output
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Exif => "exif",
            BackendKind::ContainerTags => "container_tags",
            BackendKind::Ffprobe => "ffprobe",
        }
    }

    /// Whether scoring rules read tags and streams from this backend
    pub fn carries_container_evidence(&self) -> bool {
        matches!(self, BackendKind::ContainerTags | BackendKind::Ffprobe)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One elementary stream (video track, audio track, decoded image)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub index: usize,
    /// "video", "audio", "image", ...
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl StreamInfo {
    pub fn is_video(&self) -> bool {
        self.codec_type.as_deref() == Some("video")
    }

    /// Width and height, when both are known and non-zero
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }

    /// Width divided by height
    pub fn aspect_ratio(&self) -> Option<f64> {
        self.dimensions().map(|(w, h)| w as f64 / h as f64)
    }
}

/// Container-level descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatInfo {
    pub format_name: Option<String>,
    pub format_long_name: Option<String>,
    /// Seconds, as a decimal string
    pub duration: Option<String>,
    pub bit_rate: Option<String>,
}

/// Everything one backend learned about the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSection {
    pub backend: BackendKind,
    #[serde(default)]
    pub format: FormatInfo,
    #[serde(default)]
    pub streams: Vec<StreamInfo>,
    /// Container-level tags (format tags, EXIF fields, udta/ilst items)
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl ContainerSection {
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            format: FormatInfo::default(),
            streams: Vec::new(),
            tags: BTreeMap::new(),
        }
    }

    /// True when the section holds no information
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.streams.is_empty() && self.format == FormatInfo::default()
    }

    /// Container tags followed by every stream's tags
    pub fn all_tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags
            .iter()
            .chain(self.streams.iter().flat_map(|s| s.tags.iter()))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Look up a container tag by case-insensitive key
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// What a single backend probe produced
#[derive(Debug)]
pub enum ProbeOutcome {
    /// The backend produced a section
    Found(ContainerSection),
    /// The backend ran but has nothing to report for this file
    NotApplicable,
    /// The underlying library or tool is not usable right now
    Unavailable(String),
    /// The backend ran and failed
    Failed(BackendError),
}

/// Per-backend status kept in the record for diagnosis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BackendStatus {
    Ok,
    NoData,
    Unavailable { reason: String },
    Failed { error: String },
}

/// A source of container metadata
///
/// Implementations must never panic on user data and must return within a
/// bounded time; anything that goes wrong is reported through the outcome.
pub trait MetadataBackend: Send + Sync {
    /// Which backend this is
    fn kind(&self) -> BackendKind;

    /// Whether the underlying capability is present
    fn is_available(&self) -> bool;

    /// Extract metadata from a file
    fn probe(&self, path: &Path) -> ProbeOutcome;
}

/// Sections and statuses gathered from every registered backend
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub sections: BTreeMap<BackendKind, ContainerSection>,
    pub status: BTreeMap<BackendKind, BackendStatus>,
    pub available: BTreeMap<BackendKind, bool>,
}

/// The set of backends an analyzer consults, fixed at construction time
#[derive(Default)]
pub struct BackendRegistry {
    backends: Vec<Box<dyn MetadataBackend>>,
}

impl BackendRegistry {
    /// A registry with no backends
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register the backends enabled in the configuration
    pub fn from_config(config: &BackendConfig) -> Self {
        let mut registry = Self::empty();
        if config.exif {
            registry = registry.register(Box::new(ExifBackend::new()));
        }
        if config.container_tags {
            registry = registry.register(Box::new(ContainerTagBackend::new()));
        }
        if let Some(ffprobe) = &config.ffprobe {
            registry = registry.register(Box::new(FfprobeBackend::new(ffprobe.clone())));
        }
        registry
    }

    /// Add a backend; a later backend of the same kind replaces an earlier one
    pub fn register(mut self, backend: Box<dyn MetadataBackend>) -> Self {
        self.backends.retain(|b| b.kind() != backend.kind());
        self.backends.push(backend);
        self
    }

    /// Kinds of the registered backends, in registration order
    pub fn kinds(&self) -> Vec<BackendKind> {
        self.backends.iter().map(|b| b.kind()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Run every backend against a file
    pub fn extract(&self, path: &Path) -> Extraction {
        let mut extraction = Extraction::default();

        for backend in &self.backends {
            let kind = backend.kind();
            let available = backend.is_available();
            extraction.available.insert(kind, available);

            if !available {
                extraction.status.insert(
                    kind,
                    BackendStatus::Unavailable {
                        reason: format!("{} backend is not available", kind),
                    },
                );
                continue;
            }

            let status = match backend.probe(path) {
                ProbeOutcome::Found(section) if !section.is_empty() => {
                    debug!(backend = %kind, tags = section.tags.len(), streams = section.streams.len(), "Backend produced a section");
                    extraction.sections.insert(kind, section);
                    BackendStatus::Ok
                }
                ProbeOutcome::Found(_) | ProbeOutcome::NotApplicable => BackendStatus::NoData,
                ProbeOutcome::Unavailable(reason) => {
                    debug!(backend = %kind, %reason, "Backend unavailable for this file");
                    BackendStatus::Unavailable { reason }
                }
                ProbeOutcome::Failed(error) => {
                    warn!(backend = %kind, path = %path.display(), error = %error, "Backend failed");
                    BackendStatus::Failed {
                        error: error.to_string(),
                    }
                }
            };
            extraction.status.insert(kind, status);
        }

        extraction
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.kinds())
            .finish()
    }
}
