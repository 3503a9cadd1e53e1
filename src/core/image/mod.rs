//! Image-specific heuristics layered on top of the container rules.
//!
//! Adds screenshot-size, extension-mismatch and hash-filename signals to an
//! existing [`EvidenceResult`] and re-derives the verdict under
//! [`VerdictSchema::Image`].

use std::path::Path;
use tracing::debug;

use crate::core::aggregate::{declared_extension, MetadataRecord};
use crate::core::evidence::{EvidenceBuilder, EvidenceResult, Finding, RuleId, VerdictSchema};

/// Phone screen sizes (width x height) common for app screenshots
const SCREENSHOT_SIZES: &[(u32, u32)] = &[
    (1080, 1920),
    (1080, 1800),
    (1080, 2340),
    (1080, 2400),
    (828, 1792),
    (750, 1334),
    (1125, 2436),
    (1242, 2688),
    (1284, 2778),
    (1170, 2532),
];

/// Image extensions compared by the mismatch check
const IMAGE_FORMATS: &[&str] = &["jpg", "png", "webp", "gif", "bmp", "heic", "tiff", "avif", "ico"];

const HASH_FILENAME_LEN: usize = 36;
const HASH_STEM_LEN: usize = 32;

/// Re-scores image inputs
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageHeuristics;

impl ImageHeuristics {
    pub fn new() -> Self {
        Self
    }

    /// Layer the image signals on top of `base`
    pub fn apply(&self, record: &MetadataRecord, base: &EvidenceResult) -> EvidenceResult {
        let result = EvidenceBuilder::from_result(base)
            .record_if(RuleId::ScreenshotDimensions, screenshot_dimensions(record))
            .record_if(RuleId::FormatMismatch, format_mismatch(record))
            .record_if(RuleId::HashFilename, hash_filename(&record.file_info.filename))
            .finish(VerdictSchema::Image);

        debug!(
            base = base.confidence_score,
            score = result.confidence_score,
            verdict = %result.verdict,
            "Applied image heuristics"
        );
        result
    }
}

fn screenshot_dimensions(record: &MetadataRecord) -> Option<Finding> {
    let (width, height) = record.primary_dimensions()?;
    SCREENSHOT_SIZES.contains(&(width, height)).then(|| {
        Finding::new(
            format!("{}x{}", width, height),
            format!("Mobile screenshot dimensions: {}x{}", width, height),
        )
    })
}

fn format_mismatch(record: &MetadataRecord) -> Option<Finding> {
    let header = &record.hex_header;
    if !header.detected_mime.as_deref()?.starts_with("image/") {
        return None;
    }
    let sniffed = normalize_image_extension(header.detected_extension.as_deref()?);
    let declared = record
        .declared_extension()
        .or_else(|| declared_extension(&record.file_info.filepath))?;
    let declared = normalize_image_extension(&declared);

    if sniffed == declared || !IMAGE_FORMATS.contains(&declared) || !IMAGE_FORMATS.contains(&sniffed) {
        return None;
    }

    Some(Finding::new(
        format!("{}_as_{}", sniffed, declared),
        format!(
            "{} format with {} extension",
            sniffed.to_ascii_uppercase(),
            declared.to_ascii_uppercase()
        ),
    ))
}

fn normalize_image_extension(ext: &str) -> &str {
    match ext {
        "jpeg" | "jpe" => "jpg",
        "tif" => "tiff",
        "heif" => "heic",
        other => other,
    }
}

/// Filenames like `d41d8cd98f00b204e9800998ecf8427e.png`
fn hash_filename(filename: &str) -> Option<Finding> {
    if filename.len() != HASH_FILENAME_LEN || filename.matches('.').count() != 1 {
        return None;
    }
    let stem = Path::new(filename).file_stem()?.to_str()?;
    (stem.len() == HASH_STEM_LEN && stem.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| Finding::new("md5_hash", "Hash-based filename pattern"))
}
