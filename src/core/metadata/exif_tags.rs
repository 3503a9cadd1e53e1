//! EXIF backend.
//!
//! Reads EXIF fields with kamadak-exif and the decoded pixel size with the
//! `image` crate. The pixel size is reported as a stream with
//! `codec_type = "image"` so image heuristics work without ffprobe.

use ::exif::{Error as ExifError, In, Reader, Tag};
use image::ImageReader;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use super::{BackendKind, ContainerSection, MetadataBackend, ProbeOutcome, StreamInfo};
use crate::error::BackendError;

/// EXIF fields that are binary blobs rather than useful text
const SKIPPED_TAGS: &[Tag] = &[Tag::MakerNote, Tag::JPEGInterchangeFormat];

/// Longest EXIF value kept verbatim
const MAX_VALUE_LEN: usize = 512;

/// Image EXIF reader
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifBackend;

impl ExifBackend {
    pub fn new() -> Self {
        Self
    }

    fn read_tags(path: &Path) -> Result<BTreeMap<String, String>, BackendError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let exif = match Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(ExifError::NotFound(_)) => return Ok(BTreeMap::new()),
            Err(ExifError::Io(e)) => return Err(BackendError::Io { source: e }),
            Err(e) => return Err(BackendError::Exif(e.to_string())),
        };

        let mut tags = BTreeMap::new();
        for field in exif.fields() {
            if field.ifd_num == In::THUMBNAIL || SKIPPED_TAGS.contains(&field.tag) {
                continue;
            }
            let mut value = field.display_value().to_string();
            if value.len() > MAX_VALUE_LEN {
                let mut cut = MAX_VALUE_LEN;
                while !value.is_char_boundary(cut) {
                    cut -= 1;
                }
                value.truncate(cut);
            }
            tags.entry(field.tag.to_string()).or_insert(value);
        }
        Ok(tags)
    }

    fn read_image_stream(path: &Path) -> Option<StreamInfo> {
        let reader = ImageReader::open(path).ok()?.with_guessed_format().ok()?;
        let codec_name = reader
            .format()
            .and_then(|f| f.extensions_str().first())
            .map(|ext| ext.to_string());
        let (width, height) = reader.into_dimensions().ok()?;

        Some(StreamInfo {
            index: 0,
            codec_type: Some("image".to_string()),
            codec_name,
            width: Some(width),
            height: Some(height),
            tags: BTreeMap::new(),
        })
    }
}

impl MetadataBackend for ExifBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Exif
    }

    fn is_available(&self) -> bool {
        true
    }

    fn probe(&self, path: &Path) -> ProbeOutcome {
        let tags = Self::read_tags(path);
        let stream = Self::read_image_stream(path);

        let tags = match (tags, &stream) {
            (Ok(tags), _) => tags,
            // Pixel size alone is still worth reporting
            (Err(e), Some(_)) => {
                debug!(path = %path.display(), error = %e, "EXIF unreadable, keeping image size");
                BTreeMap::new()
            }
            (Err(BackendError::Exif(reason)), None) => {
                debug!(path = %path.display(), %reason, "Not an EXIF-bearing image");
                return ProbeOutcome::NotApplicable;
            }
            (Err(e), None) => return ProbeOutcome::Failed(e),
        };

        if tags.is_empty() && stream.is_none() {
            return ProbeOutcome::NotApplicable;
        }

        let mut section = ContainerSection::new(BackendKind::Exif);
        section.tags = tags;
        if let Some(stream) = stream {
            section.format.format_name = stream.codec_name.clone();
            section.streams.push(stream);
        }
        ProbeOutcome::Found(section)
    }
}
