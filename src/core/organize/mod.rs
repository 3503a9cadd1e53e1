//! File organization module.
//!
//! Moves detected files into `tiktok_detection/{confirmed,likely,possible}`
//! under the scanned folder. Planning never touches the filesystem beyond
//! checking for existing names, so a plan doubles as the preview.

mod executor;
mod planner;
mod types;

pub use executor::OrganizeExecutor;
pub use planner::OrganizePlanner;
pub use types::*;

/// Folder created under the scan root
pub const ORGANIZE_DIR_NAME: &str = "tiktok_detection";
