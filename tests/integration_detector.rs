//! Integration tests for the detector.
//!
//! These tests run the full `score(aggregate(path))` pipeline against small
//! files built on the fly. ffprobe is never used, so they run anywhere.

use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use std::path::Path;
use tiktok_origin::core::aggregate::MediaKind;
use tiktok_origin::core::config::BackendConfig;
use tiktok_origin::core::evidence::{Verdict, VerdictSchema};
use tiktok_origin::core::metadata::{
    BackendKind, BackendRegistry, BackendStatus, ContainerSection, MetadataBackend, ProbeOutcome,
};
use tiktok_origin::core::pipeline::{Detector, EXIT_NEGATIVE, EXIT_POSITIVE};
use tiktok_origin::error::{DetectorError, FileAccessError};

fn atom(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
    out
}

fn ftyp() -> Vec<u8> {
    atom(b"ftyp", b"isom\x00\x00\x02\x00isomiso2avc1mp41")
}

/// MP4 with a single iTunes-style comment
fn mp4_with_comment(comment: &str) -> Vec<u8> {
    let mut data = vec![0, 0, 0, 1, 0, 0, 0, 0];
    data.extend_from_slice(comment.as_bytes());
    let ilst = atom(b"ilst", &atom(b"\xA9cmt", &atom(b"data", &data)));
    let mut meta = vec![0u8; 4];
    meta.extend(ilst);

    let mut file = ftyp();
    file.extend(atom(b"moov", &atom(b"udta", &atom(b"meta", &meta))));
    file.extend(atom(b"mdat", &[0u8; 64]));
    file
}

/// MP4 with one video track of the given size
fn mp4_with_video_track(width: u32, height: u32) -> Vec<u8> {
    let mut tkhd = vec![0u8; 76];
    tkhd.extend_from_slice(&(width << 16).to_be_bytes());
    tkhd.extend_from_slice(&(height << 16).to_be_bytes());

    let mut hdlr = vec![0u8; 8];
    hdlr.extend_from_slice(b"vide");
    hdlr.extend_from_slice(&[0u8; 13]);

    let mut trak = atom(b"tkhd", &tkhd);
    trak.extend(atom(b"mdia", &atom(b"hdlr", &hdlr)));

    let mut file = ftyp();
    file.extend(atom(b"moov", &atom(b"trak", &trak)));
    file
}

fn offline() -> Detector {
    Detector::builder()
        .backends(BackendConfig::default().ffprobe(None))
        .build()
        .unwrap()
}

fn bare() -> Detector {
    Detector::builder().backends(BackendConfig::none()).build().unwrap()
}

#[test]
fn video_id_comment_scores_thirty_five() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("clip.mp4");
    file.write_binary(&mp4_with_comment("vid:gf0000abc123")).unwrap();

    let detection = offline().detect(file.path()).unwrap();
    let analysis = &detection.tiktok_analysis;

    assert_eq!(analysis.confidence_score, 35);
    assert_eq!(analysis.verdict, Verdict::Possible);
    assert!(!analysis.is_tiktok);
    assert_eq!(detection.exit_code(), EXIT_NEGATIVE);
    assert!(predicate::str::contains("video ID").eval(&analysis.evidence_found.join("\n")));
    assert_eq!(
        detection.record.backend_status.get(&BackendKind::ContainerTags),
        Some(&BackendStatus::Ok)
    );
}

#[test]
fn platform_video_size_scores_twenty_five() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("clip.mp4");
    file.write_binary(&mp4_with_video_track(576, 1246)).unwrap();

    let detection = offline().detect(file.path()).unwrap();
    assert_eq!(detection.record.media_kind, MediaKind::Video);
    assert_eq!(detection.tiktok_analysis.confidence_score, 25);
    assert_eq!(detection.tiktok_analysis.verdict, Verdict::Possible);
}

#[test]
fn hashed_webp_named_png_scores_at_least_twenty_five() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("d41d8cd98f00b204e9800998ecf8427e.png");
    file.write_binary(b"RIFF\x24\x00\x00\x00WEBPVP8L\x18\x00\x00\x00\x2f\x00\x00\x00")
        .unwrap();

    let detection = offline().detect(file.path()).unwrap();
    let analysis = &detection.tiktok_analysis;

    assert_eq!(detection.record.media_kind, MediaKind::Image);
    assert_eq!(analysis.schema, VerdictSchema::Image);
    assert!(analysis.confidence_score >= 25);
    assert_eq!(analysis.indicators.get("format_mismatch").map(String::as_str), Some("webp_as_png"));
    assert_eq!(analysis.indicators.get("filename_pattern").map(String::as_str), Some("md5_hash"));
}

#[test]
fn no_backends_means_no_sections_and_zero_score() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("clip.mp4");
    file.write_binary(&mp4_with_comment("vid:gf0000abc123")).unwrap();

    let detection = bare().detect(file.path()).unwrap();
    assert!(detection.record.sections.is_empty());
    assert!(detection.record.backends_available.is_empty());
    assert_eq!(detection.tiktok_analysis.confidence_score, 0);
    assert_eq!(detection.tiktok_analysis.verdict, Verdict::Unlikely);
}

#[test]
fn embedded_brand_strings_are_evidence() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("export.mov");
    file.write_binary(b"\x00\x01\x02Douyin Export v1\x00\x03ByteDance Inc\x00").unwrap();

    let detection = bare().detect(file.path()).unwrap();
    let analysis = &detection.tiktok_analysis;
    assert_eq!(analysis.confidence_score, 20);
    assert_eq!(
        analysis.indicators.get("string_indicators").map(String::as_str),
        Some("Douyin Export v1, ByteDance Inc")
    );
}

#[test]
fn repeated_runs_are_identical() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("clip.mp4");
    file.write_binary(&mp4_with_comment("vid:gl0000xyz Made with TikTok")).unwrap();

    let detector = offline();
    let first = detector.detect(file.path()).unwrap();
    let second = detector.detect(file.path()).unwrap();

    assert_eq!(first.record.file_info.md5_hash, second.record.file_info.md5_hash);
    assert_eq!(first.record.file_info.sha256_hash, second.record.file_info.sha256_hash);
    assert_eq!(first.record.hex_header, second.record.hex_header);
    assert_eq!(first.record.sections, second.record.sections);
    assert_eq!(first.tiktok_analysis, second.tiktok_analysis);
}

#[test]
fn missing_file_is_fatal() {
    let temp = TempDir::new().unwrap();
    let missing = temp.child("gone.mp4");

    let result = offline().detect(missing.path());
    assert!(matches!(
        result,
        Err(DetectorError::FileAccess(FileAccessError::NotFound { .. }))
    ));
}

#[test]
fn directory_is_fatal() {
    let temp = TempDir::new().unwrap();
    let result = offline().detect(temp.path());
    assert!(matches!(
        result,
        Err(DetectorError::FileAccess(FileAccessError::NotAFile { .. }))
    ));
}

struct TaggedProber;

impl MetadataBackend for TaggedProber {
    fn kind(&self) -> BackendKind {
        BackendKind::Ffprobe
    }

    fn is_available(&self) -> bool {
        true
    }

    fn probe(&self, _path: &Path) -> ProbeOutcome {
        let mut section = ContainerSection::new(BackendKind::Ffprobe);
        section
            .tags
            .insert("aigc_info".into(), "{\"aigc_label_type\":0}".into());
        section.tags.insert("vid_md5".into(), "0123456789abcdef".into());
        ProbeOutcome::Found(section)
    }
}

#[test]
fn injected_backend_can_confirm() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("clip.mp4");
    file.write_binary(&mp4_with_comment("vid:gf0000abc123")).unwrap();

    let registry = BackendRegistry::empty()
        .register(Box::new(tiktok_origin::core::metadata::ContainerTagBackend::new()))
        .register(Box::new(TaggedProber));
    let detector = Detector::builder().registry(registry).build().unwrap();

    let detection = detector.detect(file.path()).unwrap();
    assert_eq!(detection.tiktok_analysis.confidence_score, 40 + 35 + 30);
    assert_eq!(detection.tiktok_analysis.verdict, Verdict::Confirmed);
    assert_eq!(detection.exit_code(), EXIT_POSITIVE);
}

#[test]
fn json_output_uses_documented_field_names() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("clip.mp4");
    file.write_binary(&mp4_with_comment("vid:gf0000abc123")).unwrap();

    let detection = offline().detect(file.path()).unwrap();
    let json = serde_json::to_string(&detection).unwrap();

    for field in [
        "\"file_info\"",
        "\"hex_header\"",
        "\"string_analysis\"",
        "\"tiktok_indicators\"",
        "\"sections\"",
        "\"container_tags\"",
        "\"backends_available\"",
        "\"tiktok_analysis\"",
        "\"confidence_score\"",
        "\"evidence_found\"",
        "\"verdict\":\"POSSIBLE\"",
    ] {
        assert!(predicate::str::contains(field).eval(&json), "missing {}", field);
    }
}
