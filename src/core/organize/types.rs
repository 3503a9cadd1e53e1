//! Types for the organize module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::evidence::Verdict;

/// A scored file offered to the planner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizeCandidate {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub verdict: Verdict,
    pub confidence_score: u32,
}

/// A single planned move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub verdict: Verdict,
    pub confidence_score: u32,
    pub size_bytes: u64,
    /// The destination name was changed to avoid overwriting a file
    pub has_conflict: bool,
}

/// The organization plan (preview)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizePlan {
    /// Folder the verdict subfolders live in
    pub target_root: PathBuf,
    pub files: Vec<PlannedMove>,
    pub total_size_bytes: u64,
    pub conflict_count: usize,
}

/// Result of executing the plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizeResult {
    pub files_moved: usize,
    pub folders_created: usize,
    pub total_size_bytes: u64,
    pub duration_ms: u64,
    pub errors: Vec<String>,
}
