//! # tiktok-origin CLI
//!
//! Command-line interface for the TikTok origin detector.
//!
//! ## Usage
//! ```bash
//! tiktok-origin analyze clip.mp4
//! tiktok-origin analyze photo.png --output json
//! tiktok-origin scan ~/Downloads --no-ffprobe
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}
