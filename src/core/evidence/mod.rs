//! # Evidence Module
//!
//! Weighted-rule scoring of a [`MetadataRecord`](crate::core::aggregate::MetadataRecord).
//!
//! ## How It Works
//! 1. [`EvidenceScorer`] walks a fixed, ordered rule table
//! 2. Each rule that fires is recorded in an [`EvidenceBuilder`] as a
//!    [`RuleHit`] (rule id, weight, evidence text) plus one indicator value
//! 3. [`EvidenceBuilder::finish`] folds the hits into an immutable
//!    [`EvidenceResult`], deriving the verdict from the total score
//!
//! Scores only ever grow: no rule subtracts, and the evidence trail is kept
//! in rule-evaluation order.
//!
//! ## Verdict schemas
//! | Score | Standard | Image |
//! |-------|----------|-------|
//! | ≥ 70  | CONFIRMED | CONFIRMED |
//! | 50-69 | LIKELY | LIKELY |
//! | 40-49 | LIKELY | POSSIBLE |
//! | 20-39 | POSSIBLE | POSSIBLE |
//! | < 20  | UNLIKELY | UNLIKELY |

mod rules;

pub use rules::EvidenceScorer;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Final classification of a file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Confirmed,
    Likely,
    Possible,
    #[default]
    Unlikely,
}

impl Verdict {
    /// Whether the verdict counts as a positive detection
    pub fn is_positive(&self) -> bool {
        matches!(self, Verdict::Confirmed | Verdict::Likely)
    }

    /// Short upper-case name
    pub fn name(&self) -> &'static str {
        match self {
            Verdict::Confirmed => "CONFIRMED",
            Verdict::Likely => "LIKELY",
            Verdict::Possible => "POSSIBLE",
            Verdict::Unlikely => "UNLIKELY",
        }
    }

    /// Parse a name produced by [`Verdict::name`]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "CONFIRMED" => Some(Verdict::Confirmed),
            "LIKELY" => Some(Verdict::Likely),
            "POSSIBLE" => Some(Verdict::Possible),
            "UNLIKELY" => Some(Verdict::Unlikely),
            _ => None,
        }
    }

    /// Subfolder name used when organizing detected files
    pub fn folder_name(&self) -> &'static str {
        match self {
            Verdict::Confirmed => "confirmed",
            Verdict::Likely => "likely",
            Verdict::Possible => "possible",
            Verdict::Unlikely => "unlikely",
        }
    }

    /// Human-readable label shown to users
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Confirmed => "CONFIRMED: File is from TikTok",
            Verdict::Likely => "LIKELY: Strong evidence suggests TikTok origin",
            Verdict::Possible => "POSSIBLE: Some TikTok-like characteristics found",
            Verdict::Unlikely => "UNLIKELY: No significant TikTok evidence found",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Threshold bands that map a score to a verdict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSchema {
    /// Container evidence for any file
    #[default]
    Standard,
    /// Container evidence plus image heuristics
    Image,
}

impl VerdictSchema {
    pub fn verdict_for(&self, score: u32) -> Verdict {
        match self {
            VerdictSchema::Standard => match score {
                70.. => Verdict::Confirmed,
                40..=69 => Verdict::Likely,
                20..=39 => Verdict::Possible,
                _ => Verdict::Unlikely,
            },
            VerdictSchema::Image => match score {
                70.. => Verdict::Confirmed,
                50..=69 => Verdict::Likely,
                20..=49 => Verdict::Possible,
                _ => Verdict::Unlikely,
            },
        }
    }
}

/// Identifies a scoring rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    AigcLabel,
    VideoId,
    ContentHash,
    VideoDimensions,
    AspectRatio,
    EncoderSignature,
    PlatformStrings,
    ScreenshotDimensions,
    FormatMismatch,
    HashFilename,
}

impl RuleId {
    /// Points added when the rule fires
    pub fn weight(&self) -> u32 {
        match self {
            RuleId::AigcLabel => 40,
            RuleId::VideoId => 35,
            RuleId::ContentHash => 30,
            RuleId::VideoDimensions => 15,
            RuleId::AspectRatio => 10,
            RuleId::EncoderSignature => 10,
            RuleId::PlatformStrings => 20,
            RuleId::ScreenshotDimensions => 25,
            RuleId::FormatMismatch => 15,
            RuleId::HashFilename => 10,
        }
    }

    /// Key under which the rule's indicator value is stored
    pub fn indicator_key(&self) -> &'static str {
        match self {
            RuleId::AigcLabel => "aigc_info",
            RuleId::VideoId => "tiktok_video_id",
            RuleId::ContentHash => "vid_md5",
            RuleId::VideoDimensions => "video_dimensions",
            RuleId::AspectRatio => "aspect_ratio",
            RuleId::EncoderSignature => "encoder",
            RuleId::PlatformStrings => "string_indicators",
            RuleId::ScreenshotDimensions => "screenshot_dimensions",
            RuleId::FormatMismatch => "format_mismatch",
            RuleId::HashFilename => "filename_pattern",
        }
    }
}

/// Display name for an indicator key, if it has one
pub fn indicator_display_name(key: &str) -> Option<&'static str> {
    match key {
        "tiktok_video_id" => Some("TikTok Video ID"),
        "vid_md5" => Some("Content Hash"),
        "aigc_info" => Some("AIGC Metadata"),
        "video_dimensions" => Some("Dimensions"),
        "aspect_ratio" => Some("Aspect Ratio"),
        "encoder" => Some("Encoder"),
        "string_indicators" => Some("Embedded Strings"),
        "screenshot_dimensions" => Some("Screenshot Size"),
        "format_mismatch" => Some("Format Mismatch"),
        "filename_pattern" => Some("Filename Pattern"),
        _ => None,
    }
}

/// What a fired rule observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Representative value for the indicator map
    pub indicator: String,
    /// Human-readable evidence line
    pub evidence: String,
}

impl Finding {
    pub fn new(indicator: impl Into<String>, evidence: impl Into<String>) -> Self {
        Self {
            indicator: indicator.into(),
            evidence: evidence.into(),
        }
    }
}

/// One fired rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleHit {
    pub rule: RuleId,
    pub weight: u32,
    pub evidence: String,
}

/// Outcome of scoring one record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceResult {
    pub is_tiktok: bool,
    pub confidence_score: u32,
    /// Evidence lines in rule-evaluation order
    pub evidence_found: Vec<String>,
    /// One representative value per signal
    pub indicators: BTreeMap<String, String>,
    pub verdict: Verdict,
    /// Human-readable form of `verdict`
    pub verdict_label: String,
    /// Threshold bands used to derive `verdict`
    pub schema: VerdictSchema,
    pub rules_fired: Vec<RuleHit>,
}

/// Accumulates rule hits and folds them into an [`EvidenceResult`]
///
/// Each rule is recorded at most once; a repeated rule is ignored.
#[derive(Debug, Clone, Default)]
pub struct EvidenceBuilder {
    hits: Vec<RuleHit>,
    indicators: BTreeMap<String, String>,
}

impl EvidenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a finished result, e.g. to layer more rules on top
    pub fn from_result(result: &EvidenceResult) -> Self {
        Self {
            hits: result.rules_fired.clone(),
            indicators: result.indicators.clone(),
        }
    }

    /// Record a fired rule
    pub fn record(mut self, rule: RuleId, finding: Finding) -> Self {
        if self.has_fired(rule) {
            return self;
        }
        self.indicators
            .insert(rule.indicator_key().to_string(), finding.indicator);
        self.hits.push(RuleHit {
            rule,
            weight: rule.weight(),
            evidence: finding.evidence,
        });
        self
    }

    /// Record a rule only when its check produced a finding
    pub fn record_if(self, rule: RuleId, finding: Option<Finding>) -> Self {
        match finding {
            Some(finding) => self.record(rule, finding),
            None => self,
        }
    }

    pub fn has_fired(&self, rule: RuleId) -> bool {
        self.hits.iter().any(|hit| hit.rule == rule)
    }

    /// Sum of the recorded weights
    pub fn score(&self) -> u32 {
        self.hits.iter().map(|hit| hit.weight).sum()
    }

    /// Fold the hits into a result under `schema`
    pub fn finish(self, schema: VerdictSchema) -> EvidenceResult {
        let confidence_score = self.score();
        let verdict = schema.verdict_for(confidence_score);

        EvidenceResult {
            is_tiktok: verdict.is_positive(),
            confidence_score,
            evidence_found: self.hits.iter().map(|hit| hit.evidence.clone()).collect(),
            indicators: self.indicators,
            verdict,
            verdict_label: verdict.label().to_string(),
            schema,
            rules_fired: self.hits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_schema_boundaries() {
        let schema = VerdictSchema::Standard;
        assert_eq!(schema.verdict_for(70), Verdict::Confirmed);
        assert_eq!(schema.verdict_for(69), Verdict::Likely);
        assert_eq!(schema.verdict_for(40), Verdict::Likely);
        assert_eq!(schema.verdict_for(39), Verdict::Possible);
        assert_eq!(schema.verdict_for(20), Verdict::Possible);
        assert_eq!(schema.verdict_for(19), Verdict::Unlikely);
        assert_eq!(schema.verdict_for(0), Verdict::Unlikely);
    }

    #[test]
    fn image_schema_boundaries() {
        let schema = VerdictSchema::Image;
        assert_eq!(schema.verdict_for(70), Verdict::Confirmed);
        assert_eq!(schema.verdict_for(50), Verdict::Likely);
        assert_eq!(schema.verdict_for(49), Verdict::Possible);
        assert_eq!(schema.verdict_for(25), Verdict::Possible);
        assert_eq!(schema.verdict_for(20), Verdict::Possible);
        assert_eq!(schema.verdict_for(19), Verdict::Unlikely);
    }

    #[test]
    fn schemas_disagree_between_forty_and_fifty() {
        for score in 40..50 {
            assert!(VerdictSchema::Standard.verdict_for(score).is_positive());
            assert!(!VerdictSchema::Image.verdict_for(score).is_positive());
        }
    }

    #[test]
    fn only_confirmed_and_likely_are_positive() {
        assert!(Verdict::Confirmed.is_positive());
        assert!(Verdict::Likely.is_positive());
        assert!(!Verdict::Possible.is_positive());
        assert!(!Verdict::Unlikely.is_positive());
    }

    #[test]
    fn builder_sums_weights_in_order() {
        let result = EvidenceBuilder::new()
            .record(RuleId::VideoId, Finding::new("vid:gf0000abc", "TikTok video ID found"))
            .record(RuleId::EncoderSignature, Finding::new("Lavf58.76.100", "TikTok-associated encoder version"))
            .finish(VerdictSchema::Standard);

        assert_eq!(result.confidence_score, 45);
        assert_eq!(result.verdict, Verdict::Likely);
        assert!(result.is_tiktok);
        assert_eq!(
            result.evidence_found,
            vec!["TikTok video ID found", "TikTok-associated encoder version"]
        );
        assert_eq!(result.indicators.get("tiktok_video_id").map(String::as_str), Some("vid:gf0000abc"));
        assert_eq!(result.verdict_label, Verdict::Likely.label());
    }

    #[test]
    fn repeated_rule_counts_once() {
        let result = EvidenceBuilder::new()
            .record(RuleId::ContentHash, Finding::new("first", "ByteDance content hash found"))
            .record(RuleId::ContentHash, Finding::new("second", "ByteDance content hash found"))
            .finish(VerdictSchema::Standard);

        assert_eq!(result.confidence_score, 30);
        assert_eq!(result.evidence_found.len(), 1);
        assert_eq!(result.indicators["vid_md5"], "first");
    }

    #[test]
    fn empty_builder_is_unlikely() {
        let result = EvidenceBuilder::new().finish(VerdictSchema::Standard);
        assert_eq!(result.confidence_score, 0);
        assert_eq!(result.verdict, Verdict::Unlikely);
        assert!(!result.is_tiktok);
    }

    #[test]
    fn resuming_keeps_prior_hits() {
        let base = EvidenceBuilder::new()
            .record(RuleId::AigcLabel, Finding::new("label", "AIGC metadata found"))
            .finish(VerdictSchema::Standard);
        assert_eq!(base.verdict, Verdict::Likely);

        let resumed = EvidenceBuilder::from_result(&base)
            .record_if(RuleId::HashFilename, None)
            .finish(VerdictSchema::Image);
        assert_eq!(resumed.confidence_score, 40);
        assert_eq!(resumed.verdict, Verdict::Possible);
        assert_eq!(resumed.schema, VerdictSchema::Image);
        assert!(resumed.rules_fired.iter().any(|hit| hit.rule == RuleId::AigcLabel));
    }

    #[test]
    fn verdict_names_round_trip() {
        for verdict in [Verdict::Confirmed, Verdict::Likely, Verdict::Possible, Verdict::Unlikely] {
            assert_eq!(Verdict::from_name(verdict.name()), Some(verdict));
        }
        assert_eq!(Verdict::from_name("maybe"), None);
        assert_eq!(Verdict::Likely.folder_name(), "likely");
    }

    #[test]
    fn verdict_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Verdict::Possible).unwrap(), "\"POSSIBLE\"");
        assert_eq!(indicator_display_name("vid_md5"), Some("Content Hash"));
        assert_eq!(indicator_display_name("unknown"), None);
    }
}
