//! Analyzer configuration.
//!
//! Plain structs with sensible defaults and chained setters. The CLI maps its
//! flags onto these; library users build them directly.

use std::path::PathBuf;
use std::time::Duration;

/// Keywords that tie a printable string to TikTok or its parent brands
pub const DEFAULT_KEYWORDS: &[&str] = &["tiktok", "douyin", "bytedance", "musically", "musical.ly"];

/// Configuration for the header sniffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderConfig {
    /// Number of leading bytes to capture
    pub bytes_to_read: usize,
    /// Length of the "magic number" prefix
    pub magic_len: usize,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            bytes_to_read: 512,
            magic_len: 16,
        }
    }
}

/// Configuration for the printable-string scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringScanConfig {
    /// Shortest run of printable bytes that counts as a string
    pub min_length: usize,
    /// Upper bound on bytes scanned from the start of the file
    pub max_search_bytes: usize,
    /// How many strings are kept as a sample in the result
    pub sample_limit: usize,
    /// Case-insensitive keywords flagged as platform indicators
    pub keywords: Vec<String>,
}

impl Default for StringScanConfig {
    fn default() -> Self {
        Self {
            min_length: 4,
            max_search_bytes: 1024 * 1024,
            sample_limit: 50,
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Configuration for filesystem probing and hashing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Read buffer size used while streaming the file through the hashers
    pub chunk_size: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
        }
    }
}

/// Longest accepted ffprobe timeout
pub const MAX_FFPROBE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for the external `ffprobe` backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfprobeConfig {
    /// Executable to run; resolved through `PATH` when not absolute
    pub program: PathBuf,
    /// Wall-clock limit for a single invocation
    pub timeout: Duration,
}

impl Default for FfprobeConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffprobe"),
            timeout: Duration::from_secs(30),
        }
    }
}

impl FfprobeConfig {
    /// Use a specific ffprobe executable
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the per-invocation timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Which optional metadata backends to register
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// EXIF tags and decoded image dimensions
    pub exif: bool,
    /// Native MP4/MOV atom reader
    pub container_tags: bool,
    /// External ffprobe prober (`None` disables it)
    pub ffprobe: Option<FfprobeConfig>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            exif: true,
            container_tags: true,
            ffprobe: Some(FfprobeConfig::default()),
        }
    }
}

impl BackendConfig {
    /// Disable every optional backend
    pub fn none() -> Self {
        Self {
            exif: false,
            container_tags: false,
            ffprobe: None,
        }
    }

    /// Enable or disable the EXIF backend
    pub fn exif(mut self, enabled: bool) -> Self {
        self.exif = enabled;
        self
    }

    /// Enable or disable the container tag reader
    pub fn container_tags(mut self, enabled: bool) -> Self {
        self.container_tags = enabled;
        self
    }

    /// Set (or clear) the ffprobe configuration
    pub fn ffprobe(mut self, config: Option<FfprobeConfig>) -> Self {
        self.ffprobe = config;
        self
    }
}

/// Complete configuration for one analyzer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzerConfig {
    pub header: HeaderConfig,
    pub strings: StringScanConfig,
    pub probe: ProbeConfig,
    pub backends: BackendConfig,
}

impl AnalyzerConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many header bytes are captured
    pub fn header_bytes(mut self, bytes: usize) -> Self {
        self.header.bytes_to_read = bytes;
        self
    }

    /// Set the string scan window
    pub fn max_search_bytes(mut self, bytes: usize) -> Self {
        self.strings.max_search_bytes = bytes;
        self
    }

    /// Set the minimum printable run length
    pub fn min_string_length(mut self, length: usize) -> Self {
        self.strings.min_length = length;
        self
    }

    /// Replace the backend selection
    pub fn backends(mut self, backends: BackendConfig) -> Self {
        self.backends = backends;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AnalyzerConfig::new();
        assert_eq!(config.header.bytes_to_read, 512);
        assert_eq!(config.header.magic_len, 16);
        assert_eq!(config.strings.min_length, 4);
        assert_eq!(config.strings.max_search_bytes, 1_048_576);
        assert_eq!(config.strings.sample_limit, 50);
        assert_eq!(
            config.backends.ffprobe.as_ref().map(|f| f.timeout),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn builder_overrides_values() {
        let config = AnalyzerConfig::new()
            .header_bytes(64)
            .max_search_bytes(4096)
            .min_string_length(6)
            .backends(BackendConfig::none().exif(true));

        assert_eq!(config.header.bytes_to_read, 64);
        assert_eq!(config.strings.max_search_bytes, 4096);
        assert_eq!(config.strings.min_length, 6);
        assert!(config.backends.exif);
        assert!(!config.backends.container_tags);
        assert!(config.backends.ffprobe.is_none());
    }
}
