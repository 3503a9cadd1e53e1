//! Integration tests for folder scans: cache skipping and organizing.

use assert_fs::prelude::*;
use assert_fs::TempDir;
use tiktok_origin::core::cache::{self, CacheBackend, SqliteCache, CACHE_FILE_NAME};
use tiktok_origin::core::config::BackendConfig;
use tiktok_origin::core::evidence::Verdict;
use tiktok_origin::core::organize::{OrganizeCandidate, OrganizeExecutor, OrganizePlanner, ORGANIZE_DIR_NAME};
use tiktok_origin::core::pipeline::Detector;
use tiktok_origin::core::scanner::{ScanConfig, WalkDirScanner};

fn bare() -> Detector {
    Detector::builder().backends(BackendConfig::none()).build().unwrap()
}

fn scanner(root: &std::path::Path) -> WalkDirScanner {
    WalkDirScanner::new(ScanConfig {
        exclude: vec![root.join(ORGANIZE_DIR_NAME)],
        ..ScanConfig::default()
    })
}

#[test]
fn unchanged_unlikely_files_are_skipped_next_time() {
    let temp = TempDir::new().unwrap();
    temp.child("holiday.mp4").write_binary(b"\x00\x01plain holiday clip\x00").unwrap();
    temp.child("export.mp4").write_binary(b"\x00\x01Made with TikTok\x00").unwrap();

    let cache = SqliteCache::open(&temp.path().join(ORGANIZE_DIR_NAME).join(CACHE_FILE_NAME)).unwrap();
    let detector = bare();

    let files = scanner(temp.path()).scan(temp.path()).unwrap().files;
    assert_eq!(files.len(), 2);
    for file in &files {
        assert!(cache::lookup(&cache, file).unwrap().is_none());
        let detection = detector.detect(&file.path).unwrap();
        cache::record(&cache, file, &detection.tiktok_analysis).unwrap();
    }
    assert_eq!(cache.stats().unwrap().total_entries, 1);

    // The cache lives under the organize folder, which the walk never enters
    let files = scanner(temp.path()).scan(temp.path()).unwrap().files;
    assert_eq!(files.len(), 2);
    let skipped: Vec<_> = files
        .iter()
        .filter(|file| cache::lookup(&cache, file).unwrap().is_some())
        .map(|file| file.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(skipped, vec!["holiday.mp4".to_string()]);
}

#[test]
fn modified_file_is_analyzed_again() {
    let temp = TempDir::new().unwrap();
    let clip = temp.child("clip.mp4");
    clip.write_binary(b"\x00plain\x00").unwrap();

    let cache = cache::InMemoryCache::new();
    let detector = bare();
    let file = scanner(temp.path()).scan(temp.path()).unwrap().files.remove(0);
    let detection = detector.detect(&file.path).unwrap();
    cache::record(&cache, &file, &detection.tiktok_analysis).unwrap();
    assert!(cache::lookup(&cache, &file).unwrap().is_some());

    clip.write_binary(b"\x00plain, but longer now\x00").unwrap();
    let file = scanner(temp.path()).scan(temp.path()).unwrap().files.remove(0);
    assert!(cache::lookup(&cache, &file).unwrap().is_none());
}

#[test]
fn detected_files_are_moved_into_verdict_folders() {
    let temp = TempDir::new().unwrap();
    temp.child("export.mp4").write_binary(b"\x00\x01Made with TikTok\x00").unwrap();
    temp.child("holiday.mp4").write_binary(b"\x00\x01plain holiday clip\x00").unwrap();

    let detector = bare();
    let candidates: Vec<_> = scanner(temp.path())
        .scan(temp.path())
        .unwrap()
        .files
        .into_iter()
        .map(|file| {
            let analysis = detector.detect(&file.path).unwrap().tiktok_analysis;
            OrganizeCandidate {
                path: file.path,
                size_bytes: file.size,
                verdict: analysis.verdict,
                confidence_score: analysis.confidence_score,
            }
        })
        .collect();

    let plan = OrganizePlanner::for_scan_root(temp.path()).plan(candidates);
    assert_eq!(plan.files.len(), 1);
    assert_eq!(plan.files[0].verdict, Verdict::Possible);

    // Planning alone changes nothing
    temp.child("export.mp4").assert(predicates::path::exists());
    temp.child(ORGANIZE_DIR_NAME).assert(predicates::path::missing());

    let result = OrganizeExecutor::execute(&plan, |_, _, _| {});
    assert_eq!(result.files_moved, 1);
    assert!(result.errors.is_empty());
    temp.child("export.mp4").assert(predicates::path::missing());
    temp.child("tiktok_detection/possible/export.mp4")
        .assert(predicates::path::exists());
    temp.child("holiday.mp4").assert(predicates::path::exists());

    // Moved files are not picked up again
    let files = scanner(temp.path()).scan(temp.path()).unwrap().files;
    assert_eq!(files.len(), 1);
}
