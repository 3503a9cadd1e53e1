//! # Pipeline Module
//!
//! `score(aggregate(path))`, plus the image stage for image inputs.
//!
//! ## Example
//! ```rust,ignore
//! use tiktok_origin::core::pipeline::Detector;
//!
//! let detector = Detector::builder().no_ffprobe().build()?;
//! let detection = detector.detect(Path::new("clip.mp4"))?;
//! println!("{}", detection.tiktok_analysis.verdict_label);
//! ```

use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::core::aggregate::{MediaKind, MetadataAggregator, MetadataRecord};
use crate::core::config::{AnalyzerConfig, BackendConfig, FfprobeConfig};
use crate::core::evidence::{EvidenceResult, EvidenceScorer};
use crate::core::image::ImageHeuristics;
use crate::core::metadata::BackendRegistry;
use crate::error::Result;

/// Exit code for a positive verdict
pub const EXIT_POSITIVE: u8 = 0;
/// Exit code for a negative verdict
pub const EXIT_NEGATIVE: u8 = 1;
/// Exit code when the file could not be analyzed
pub const EXIT_FATAL: u8 = 2;

/// A metadata record together with its verdict
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    #[serde(flatten)]
    pub record: MetadataRecord,
    pub tiktok_analysis: EvidenceResult,
}

impl Detection {
    /// Process exit code for this verdict
    pub fn exit_code(&self) -> u8 {
        if self.tiktok_analysis.is_tiktok {
            EXIT_POSITIVE
        } else {
            EXIT_NEGATIVE
        }
    }
}

/// Builder for a [`Detector`]
#[derive(Debug, Default)]
pub struct DetectorBuilder {
    config: AnalyzerConfig,
    registry: Option<BackendRegistry>,
}

impl DetectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    /// Select backends
    pub fn backends(mut self, backends: BackendConfig) -> Self {
        self.config.backends = backends;
        self
    }

    /// Use ffprobe at `program`
    pub fn ffprobe(mut self, program: impl Into<std::path::PathBuf>) -> Self {
        let current = self.config.backends.ffprobe.take().unwrap_or_default();
        self.config.backends.ffprobe = Some(current.program(program));
        self
    }

    /// Set the ffprobe timeout, enabling ffprobe if needed
    pub fn ffprobe_timeout(mut self, timeout: Duration) -> Self {
        let current: FfprobeConfig = self.config.backends.ffprobe.take().unwrap_or_default();
        self.config.backends.ffprobe = Some(current.timeout(timeout));
        self
    }

    /// Disable the ffprobe backend
    pub fn no_ffprobe(mut self) -> Self {
        self.config.backends.ffprobe = None;
        self
    }

    /// Use an explicit backend registry instead of the configured one
    pub fn registry(mut self, registry: BackendRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<Detector> {
        let aggregator = match self.registry {
            Some(registry) => MetadataAggregator::with_registry(&self.config, registry),
            None => MetadataAggregator::new(&self.config),
        };
        Ok(Detector {
            aggregator,
            scorer: EvidenceScorer::new()?,
            image: ImageHeuristics::new(),
        })
    }
}

/// End-to-end analyzer for single files
///
/// Holds no per-file state, so one detector can be shared across threads.
#[derive(Debug)]
pub struct Detector {
    aggregator: MetadataAggregator,
    scorer: EvidenceScorer,
    image: ImageHeuristics,
}

impl Detector {
    pub fn builder() -> DetectorBuilder {
        DetectorBuilder::new()
    }

    /// A detector with default configuration
    pub fn new() -> Result<Self> {
        DetectorBuilder::new().build()
    }

    /// Extract the metadata record for a file
    pub fn analyze(&self, path: &Path) -> Result<MetadataRecord> {
        self.aggregator.analyze(path)
    }

    /// Score a record; image inputs also get the image heuristics
    pub fn score(&self, record: &MetadataRecord) -> EvidenceResult {
        let result = self.scorer.score(record);
        match record.media_kind {
            MediaKind::Image => self.image.apply(record, &result),
            _ => result,
        }
    }

    /// Analyze and score a file
    pub fn detect(&self, path: &Path) -> Result<Detection> {
        let record = self.analyze(path)?;
        let tiktok_analysis = self.score(&record);

        info!(
            path = %path.display(),
            score = tiktok_analysis.confidence_score,
            verdict = %tiktok_analysis.verdict,
            "Analysis complete"
        );

        Ok(Detection {
            record,
            tiktok_analysis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::evidence::{Verdict, VerdictSchema};
    use crate::error::DetectorError;
    use std::fs;
    use tempfile::TempDir;

    fn offline() -> Detector {
        Detector::builder().backends(BackendConfig::none()).build().unwrap()
    }

    #[test]
    fn strings_alone_are_possible() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("clip.mp4");
        fs::write(&path, b"\x00\x00\x00\x18ftypmp42\x00Made with TikTok\x00").unwrap();

        let detection = offline().detect(&path).unwrap();
        assert_eq!(detection.tiktok_analysis.confidence_score, 20);
        assert_eq!(detection.tiktok_analysis.verdict, Verdict::Possible);
        assert_eq!(detection.exit_code(), EXIT_NEGATIVE);
    }

    #[test]
    fn image_inputs_use_image_schema() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("d41d8cd98f00b204e9800998ecf8427e.png");
        fs::write(&path, b"RIFF\x24\x00\x00\x00WEBPVP8L\x18\x00\x00\x00").unwrap();

        let detection = offline().detect(&path).unwrap();
        assert_eq!(detection.record.media_kind, MediaKind::Image);
        assert_eq!(detection.tiktok_analysis.schema, VerdictSchema::Image);
        assert!(detection.tiktok_analysis.confidence_score >= 25);
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = offline().detect(Path::new("/nonexistent/clip.mp4"));
        assert!(matches!(result, Err(DetectorError::FileAccess(_))));
    }

    #[test]
    fn builder_toggles_ffprobe() {
        let builder = DetectorBuilder::new()
            .backends(BackendConfig::none())
            .ffprobe("/opt/ffmpeg/bin/ffprobe")
            .ffprobe_timeout(Duration::from_secs(5));
        let ffprobe = builder.config.backends.ffprobe.clone().unwrap();
        assert_eq!(ffprobe.program, std::path::PathBuf::from("/opt/ffmpeg/bin/ffprobe"));
        assert_eq!(ffprobe.timeout, Duration::from_secs(5));

        assert!(builder.no_ffprobe().config.backends.ffprobe.is_none());
    }

    #[test]
    fn detection_flattens_record_into_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        fs::write(&path, b"plain text").unwrap();

        let detection = offline().detect(&path).unwrap();
        let json = serde_json::to_value(&detection).unwrap();
        assert!(json.get("file_info").is_some());
        assert!(json.get("hex_header").is_some());
        assert_eq!(json["tiktok_analysis"]["verdict"], "UNLIKELY");
        assert_eq!(json["tiktok_analysis"]["confidence_score"], 0);
    }
}
