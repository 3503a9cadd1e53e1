//! Container and string rules.

use regex::Regex;
use tracing::debug;

use super::{EvidenceBuilder, EvidenceResult, Finding, RuleId, VerdictSchema};
use crate::core::aggregate::MetadataRecord;
use crate::error::{DetectorError, Result};

/// `vid:` followed by a platform ID token such as `gf0000...` or `v0d00fg10000...`
const VIDEO_ID_PATTERN: &str = r"(?i)vid:[0-9a-z]*?g[0-9a-z]0000[0-9a-z]*";

/// Encoder build seen on platform re-encodes
const ENCODER_SIGNATURE: &str = "Lavf58.76.100";

/// Exact sizes the platform renders vertical video at
const PLATFORM_VIDEO_SIZES: &[(u32, u32)] = &[(576, 1024), (576, 1246), (576, 1280)];

/// Width/height band around 9:16
const VERTICAL_RATIO_BAND: (f64, f64) = (0.55, 0.58);

type Check = fn(&EvidenceScorer, &MetadataRecord) -> Option<Finding>;

struct Rule {
    id: RuleId,
    check: Check,
}

/// Evaluation order is the order of the evidence trail
const RULES: &[Rule] = &[
    Rule { id: RuleId::AigcLabel, check: aigc_label },
    Rule { id: RuleId::VideoId, check: video_id },
    Rule { id: RuleId::ContentHash, check: content_hash },
    Rule { id: RuleId::VideoDimensions, check: video_dimensions },
    Rule { id: RuleId::AspectRatio, check: aspect_ratio },
    Rule { id: RuleId::EncoderSignature, check: encoder_signature },
    Rule { id: RuleId::PlatformStrings, check: platform_strings },
];

/// Applies the rule table to a metadata record
#[derive(Debug, Clone)]
pub struct EvidenceScorer {
    video_id: Regex,
}

impl EvidenceScorer {
    pub fn new() -> Result<Self> {
        let video_id = Regex::new(VIDEO_ID_PATTERN)
            .map_err(|e| DetectorError::Config(format!("invalid video id pattern: {}", e)))?;
        Ok(Self { video_id })
    }

    /// Score a record under the standard schema
    pub fn score(&self, record: &MetadataRecord) -> EvidenceResult {
        self.evaluate(record).finish(VerdictSchema::Standard)
    }

    /// Run every rule, returning the unfinished builder
    pub fn evaluate(&self, record: &MetadataRecord) -> EvidenceBuilder {
        RULES.iter().fold(EvidenceBuilder::new(), |builder, rule| {
            let finding = (rule.check)(self, record);
            if finding.is_some() {
                debug!(rule = ?rule.id, weight = rule.id.weight(), "Rule fired");
            }
            builder.record_if(rule.id, finding)
        })
    }
}

fn aigc_label(_: &EvidenceScorer, record: &MetadataRecord) -> Option<Finding> {
    record
        .evidence_sections()
        .flat_map(|s| s.all_tags())
        .find(|(key, value)| {
            key.to_ascii_lowercase().contains("aigc")
                || value.to_ascii_lowercase().contains("aigc_label_type")
        })
        .map(|(_, value)| Finding::new(value, "AIGC metadata found"))
}

fn video_id(scorer: &EvidenceScorer, record: &MetadataRecord) -> Option<Finding> {
    record
        .evidence_sections()
        .flat_map(|s| s.all_tags())
        .find(|(_, value)| scorer.video_id.is_match(value))
        .map(|(_, value)| Finding::new(value, "TikTok video ID found"))
}

fn content_hash(_: &EvidenceScorer, record: &MetadataRecord) -> Option<Finding> {
    record
        .evidence_sections()
        .flat_map(|s| s.all_tags())
        .find(|(key, _)| key.eq_ignore_ascii_case("vid_md5"))
        .map(|(_, value)| Finding::new(value, "ByteDance content hash found"))
}

fn video_dimensions(_: &EvidenceScorer, record: &MetadataRecord) -> Option<Finding> {
    record
        .video_streams()
        .filter_map(|s| s.dimensions())
        .find(|dims| PLATFORM_VIDEO_SIZES.contains(dims))
        .map(|(w, h)| {
            Finding::new(
                format!("{}x{}", w, h),
                format!("TikTok-typical dimensions: {}x{}", w, h),
            )
        })
}

fn aspect_ratio(_: &EvidenceScorer, record: &MetadataRecord) -> Option<Finding> {
    let (low, high) = VERTICAL_RATIO_BAND;
    record
        .video_streams()
        .filter_map(|s| s.dimensions())
        .find(|&(w, h)| {
            let ratio = w as f64 / h as f64;
            // Platform render sizes are 9:16 content even when padded taller
            (low..=high).contains(&ratio) || PLATFORM_VIDEO_SIZES.contains(&(w, h))
        })
        .map(|(w, h)| Finding::new(format!("{}:{}", w, h), "Vertical mobile video format (9:16)"))
}

fn encoder_signature(_: &EvidenceScorer, record: &MetadataRecord) -> Option<Finding> {
    record
        .evidence_sections()
        .filter_map(|s| s.tag("encoder"))
        .find(|encoder| encoder.contains(ENCODER_SIGNATURE))
        .map(|encoder| Finding::new(encoder, "TikTok-associated encoder version"))
}

fn platform_strings(_: &EvidenceScorer, record: &MetadataRecord) -> Option<Finding> {
    let analysis = &record.string_analysis;
    analysis.has_indicators().then(|| {
        Finding::new(analysis.indicators.join(", "), "TikTok strings found in file")
    })
}
