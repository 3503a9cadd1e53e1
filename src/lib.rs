//! # TikTok Origin
//!
//! Estimates whether an image or video file came from TikTok by combining
//! container metadata, raw byte signatures and dimension heuristics into a
//! weighted, explainable score.
//!
//! ## Core Philosophy
//! - **Best effort** - every metadata source is optional; a missing tool or a
//!   broken tag contributes no evidence instead of failing the analysis
//! - **Show WHY** - every point of the score comes with an evidence line
//! - **Read only** - files are inspected, never modified
//!
//! ## Architecture
//! - `core` - extraction, aggregation and scoring engine
//! - `error` - error taxonomy
//! - `cli` (binary only) - command-line interface

pub mod core;
pub mod error;

// Re-export commonly used types at the crate root
pub use crate::core::pipeline::{Detection, Detector};
pub use error::{DetectorError, Result};

/// Initialize tracing for the binary
///
/// Logs go to stderr at `warn` (or `debug` when `verbose`); `RUST_LOG`
/// overrides either default.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    // A subscriber may already be installed (e.g. by a test harness)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
