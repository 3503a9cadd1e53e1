//! Plan generator for organization operations.

use super::types::*;
use crate::core::evidence::Verdict;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Generates organization plans
#[derive(Debug, Clone)]
pub struct OrganizePlanner {
    target_root: PathBuf,
}

impl OrganizePlanner {
    /// Plan into `<scan_root>/tiktok_detection`
    pub fn for_scan_root(scan_root: &Path) -> Self {
        Self::new(scan_root.join(super::ORGANIZE_DIR_NAME))
    }

    pub fn new(target_root: impl Into<PathBuf>) -> Self {
        Self {
            target_root: target_root.into(),
        }
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    /// Plan a move for every candidate that scored POSSIBLE or higher
    ///
    /// Destinations never overwrite an existing file or another planned
    /// destination; clashing names get a `_N` suffix.
    pub fn plan(&self, candidates: impl IntoIterator<Item = OrganizeCandidate>) -> OrganizePlan {
        let mut plan = OrganizePlan {
            target_root: self.target_root.clone(),
            ..OrganizePlan::default()
        };
        let mut destinations: HashSet<PathBuf> = HashSet::new();

        for candidate in candidates {
            if candidate.verdict == Verdict::Unlikely {
                continue;
            }
            let Some(filename) = candidate.path.file_name() else {
                continue;
            };

            let wanted = self
                .target_root
                .join(candidate.verdict.folder_name())
                .join(filename);
            let taken = |path: &Path| destinations.contains(path) || path.exists();

            let has_conflict = taken(&wanted);
            let destination = if has_conflict {
                Self::unique_path(&wanted, taken)
            } else {
                wanted
            };
            if has_conflict {
                plan.conflict_count += 1;
            }

            destinations.insert(destination.clone());
            plan.total_size_bytes += candidate.size_bytes;
            plan.files.push(PlannedMove {
                source: candidate.path,
                destination,
                verdict: candidate.verdict,
                confidence_score: candidate.confidence_score,
                size_bytes: candidate.size_bytes,
                has_conflict,
            });
        }

        plan
    }

    fn unique_path(path: &Path, taken: impl Fn(&Path) -> bool) -> PathBuf {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let parent = path.parent().unwrap_or(Path::new(""));

        let mut counter = 1;
        loop {
            let new_name = if ext.is_empty() {
                format!("{}_{}", stem, counter)
            } else {
                format!("{}_{}.{}", stem, counter, ext)
            };
            let new_path = parent.join(new_name);
            if !taken(&new_path) {
                return new_path;
            }
            counter += 1;
        }
    }
}
