//! # Header Module
//!
//! Captures the first bytes of a file as hex and ASCII so file signatures can
//! be inspected, and sniffs the real content type from them with `infer`.
//!
//! A read failure here is soft: the returned [`HexHeader`] carries the error
//! text and the rest of the analysis carries on with an empty header.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, warn};

use crate::core::config::HeaderConfig;

/// Hex and ASCII rendering of a file's leading bytes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexHeader {
    /// Lowercase hex of every captured byte
    pub hex: String,
    /// Printable bytes as-is, everything else as `.`
    pub ascii: String,
    /// Hex of the short signature prefix
    pub magic_number: String,
    /// Number of bytes actually captured
    pub bytes_read: usize,
    /// MIME type sniffed from the content
    pub detected_mime: Option<String>,
    /// Canonical extension for the sniffed content (e.g. "webp")
    pub detected_extension: Option<String>,
    /// Why the header could not be read, if it could not
    pub error: Option<String>,
}

impl HexHeader {
    /// Build a header from captured bytes
    pub fn from_bytes(bytes: &[u8], magic_len: usize) -> Self {
        let kind = infer::get(bytes);
        Self {
            hex: hex::encode(bytes),
            ascii: render_ascii(bytes),
            magic_number: hex::encode(&bytes[..bytes.len().min(magic_len)]),
            bytes_read: bytes.len(),
            detected_mime: kind.map(|k| k.mime_type().to_string()),
            detected_extension: kind.map(|k| k.extension().to_string()),
            error: None,
        }
    }

    /// An empty header that records why reading failed
    pub fn failed(error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    /// True when the header was read successfully
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Reads and renders the leading bytes of a file
#[derive(Debug, Clone)]
pub struct HeaderSniffer {
    bytes_to_read: usize,
    magic_len: usize,
}

impl Default for HeaderSniffer {
    fn default() -> Self {
        Self::new(&HeaderConfig::default())
    }
}

impl HeaderSniffer {
    pub fn new(config: &HeaderConfig) -> Self {
        Self {
            bytes_to_read: config.bytes_to_read,
            magic_len: config.magic_len,
        }
    }

    /// Capture the header of a file; never fails
    pub fn sniff(&self, path: &Path) -> HexHeader {
        match self.read_prefix(path) {
            Ok(bytes) => {
                let header = HexHeader::from_bytes(&bytes, self.magic_len);
                debug!(
                    path = %path.display(),
                    bytes = header.bytes_read,
                    mime = header.detected_mime.as_deref().unwrap_or("unknown"),
                    "Sniffed header"
                );
                header
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read file header");
                HexHeader::failed(e)
            }
        }
    }

    fn read_prefix(&self, path: &Path) -> io::Result<Vec<u8>> {
        let file = File::open(path)?;
        let mut bytes = Vec::new();
        file.take(self.bytes_to_read as u64).read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

/// Render bytes as ASCII, replacing anything outside 0x20..=0x7E with `.`
pub fn render_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if is_printable(b) { b as char } else { '.' })
        .collect()
}

/// Printable ASCII, space through tilde
pub fn is_printable(byte: u8) -> bool {
    (0x20..=0x7E).contains(&byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const WEBP_PREFIX: &[u8] = b"RIFF\x24\x00\x00\x00WEBPVP8L\x18\x00\x00\x00";

    #[test]
    fn renders_non_printable_as_dots() {
        assert_eq!(render_ascii(b"\x89PNG\r\n\x1a\n"), ".PNG....");
        assert_eq!(render_ascii(b" ~"), " ~");
    }

    #[test]
    fn header_detects_webp() {
        let header = HexHeader::from_bytes(WEBP_PREFIX, 16);
        assert_eq!(header.detected_extension.as_deref(), Some("webp"));
        assert_eq!(header.detected_mime.as_deref(), Some("image/webp"));
        assert_eq!(header.magic_number.len(), 32);
        assert!(header.ascii.starts_with("RIFF$...WEBP"));
    }

    #[test]
    fn sniff_is_bounded_by_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("big.bin");
        File::create(&path).unwrap().write_all(&[0x41; 2048]).unwrap();

        let header = HeaderSniffer::default().sniff(&path);
        assert_eq!(header.bytes_read, 512);
        assert_eq!(header.hex.len(), 1024);
        assert!(header.is_valid());
    }

    #[test]
    fn short_file_yields_short_header() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tiny.bin");
        File::create(&path).unwrap().write_all(b"abc").unwrap();

        let header = HeaderSniffer::default().sniff(&path);
        assert_eq!(header.bytes_read, 3);
        assert_eq!(header.magic_number, "616263");
        assert_eq!(header.detected_extension, None);
    }

    #[test]
    fn oversized_read_limit_reads_only_the_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tiny.bin");
        File::create(&path).unwrap().write_all(b"abcd").unwrap();

        let sniffer = HeaderSniffer::new(&HeaderConfig {
            bytes_to_read: usize::MAX,
            ..HeaderConfig::default()
        });
        let header = sniffer.sniff(&path);
        assert!(header.is_valid());
        assert_eq!(header.bytes_read, 4);
    }

    #[test]
    fn unreadable_file_is_soft_error() {
        let header = HeaderSniffer::default().sniff(Path::new("/nonexistent/tiny.bin"));
        assert!(!header.is_valid());
        assert_eq!(header.bytes_read, 0);
        assert!(header.hex.is_empty());
    }
}
