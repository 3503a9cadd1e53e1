//! # Strings Module
//!
//! Extracts runs of printable ASCII from the start of a file and flags the
//! ones that mention TikTok or one of its brand aliases.
//!
//! ## How It Works
//! 1. Read at most `max_search_bytes` from the start of the file
//! 2. Walk the window once, tracking where the current printable run began
//! 3. When a run ends (non-printable byte or end of window) and is at least
//!    `min_length` long, count it, sample it, and test it against the keywords

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, warn};

use super::header::is_printable;
use crate::core::config::StringScanConfig;

/// Result of scanning a file for printable strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringAnalysis {
    /// Number of qualifying runs in the scanned window
    pub total_strings_found: usize,
    /// The first runs found, up to the sample limit
    pub strings: Vec<String>,
    /// Runs that contain a platform keyword
    #[serde(rename = "tiktok_indicators")]
    pub indicators: Vec<String>,
    /// Bytes actually scanned
    pub search_bytes: usize,
    /// Why the file could not be scanned, if it could not
    pub error: Option<String>,
}

impl StringAnalysis {
    fn failed(error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    /// True when at least one keyword matched
    pub fn has_indicators(&self) -> bool {
        !self.indicators.is_empty()
    }
}

/// Single-pass printable string extractor
#[derive(Debug, Clone)]
pub struct StringScanner {
    min_length: usize,
    max_search_bytes: usize,
    sample_limit: usize,
    /// Lowercased once up front
    keywords: Vec<String>,
}

impl Default for StringScanner {
    fn default() -> Self {
        Self::new(&StringScanConfig::default())
    }
}

impl StringScanner {
    pub fn new(config: &StringScanConfig) -> Self {
        Self {
            min_length: config.min_length.max(1),
            max_search_bytes: config.max_search_bytes,
            sample_limit: config.sample_limit,
            keywords: config.keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Scan the leading window of a file; never fails
    pub fn scan_file(&self, path: &Path) -> StringAnalysis {
        match self.read_window(path) {
            Ok(data) => {
                let analysis = self.scan_bytes(&data);
                debug!(
                    path = %path.display(),
                    strings = analysis.total_strings_found,
                    indicators = analysis.indicators.len(),
                    "Scanned strings"
                );
                analysis
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not scan file for strings");
                StringAnalysis::failed(e)
            }
        }
    }

    /// Scan an in-memory buffer, honouring the configured window
    pub fn scan_bytes(&self, data: &[u8]) -> StringAnalysis {
        let window = &data[..data.len().min(self.max_search_bytes)];
        let mut analysis = StringAnalysis {
            search_bytes: window.len(),
            ..StringAnalysis::default()
        };

        let mut run_start: Option<usize> = None;
        for (i, &byte) in window.iter().enumerate() {
            if is_printable(byte) {
                run_start.get_or_insert(i);
            } else if let Some(start) = run_start.take() {
                self.finish_run(&window[start..i], &mut analysis);
            }
        }
        if let Some(start) = run_start {
            self.finish_run(&window[start..], &mut analysis);
        }

        analysis
    }

    fn finish_run(&self, run: &[u8], analysis: &mut StringAnalysis) {
        if run.len() < self.min_length {
            return;
        }

        // Runs are printable ASCII, so this never replaces anything
        let text = String::from_utf8_lossy(run).into_owned();
        analysis.total_strings_found += 1;

        let lower = text.to_ascii_lowercase();
        let is_indicator = self.keywords.iter().any(|k| lower.contains(k.as_str()));

        if analysis.strings.len() < self.sample_limit {
            analysis.strings.push(text.clone());
        }
        if is_indicator {
            analysis.indicators.push(text);
        }
    }

    fn read_window(&self, path: &Path) -> io::Result<Vec<u8>> {
        let file = File::open(path)?;
        let mut data = Vec::new();
        file.take(self.max_search_bytes as u64).read_to_end(&mut data)?;
        Ok(data)
    }
}
