//! Container tag backend.
//!
//! A small ISO base media (MP4/MOV) atom walker. It reads:
//! - `ftyp` brands
//! - `moov/mvhd` duration
//! - `moov/udta` QuickTime text atoms (`©cmt`, `©too`, ...)
//! - `moov/udta/meta/ilst` and `moov/meta/ilst` items, including `----`
//!   freeform items and `mdta` keyed items
//! - `moov/trak` dimensions (`tkhd`), handler type (`hdlr`) and codec (`stsd`)
//!
//! Well-known atoms are reported under the tag names ffprobe uses, so the
//! scoring rules see the same keys whichever backend produced them. Only the
//! `moov` box is loaded into memory, and only up to a fixed bound.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

use super::{BackendKind, ContainerSection, MetadataBackend, ProbeOutcome, StreamInfo};
use crate::error::BackendError;

type FourCc = [u8; 4];

/// Largest `moov` box loaded into memory
const MAX_MOOV_BYTES: u64 = 16 * 1024 * 1024;

/// Largest `ftyp` payload read
const MAX_FTYP_BYTES: u64 = 4096;

/// Longest udta payload kept as a raw text tag
const MAX_RAW_TEXT_LEN: usize = 1024;

/// Box types allowed at the top level of an ISO base media file
const TOP_LEVEL_BOXES: &[&FourCc] = &[
    b"ftyp", b"moov", b"mdat", b"free", b"skip", b"wide", b"pdin", b"uuid", b"meta", b"moof",
    b"mfra", b"styp", b"sidx", b"pnot",
];

/// Well-known atoms mapped to ffprobe's tag names
const ATOM_TAG_NAMES: &[(&FourCc, &str)] = &[
    (b"\xA9nam", "title"),
    (b"\xA9ART", "artist"),
    (b"\xA9alb", "album"),
    (b"aART", "album_artist"),
    (b"\xA9cmt", "comment"),
    (b"\xA9day", "date"),
    (b"\xA9too", "encoder"),
    (b"\xA9swr", "encoder"),
    (b"\xA9enc", "encoder"),
    (b"\xA9gen", "genre"),
    (b"\xA9wrt", "composer"),
    (b"\xA9lyr", "lyrics"),
    (b"\xA9des", "description"),
    (b"desc", "description"),
    (b"ldes", "synopsis"),
    (b"cprt", "copyright"),
    (b"\xA9cpy", "copyright"),
    (b"\xA9xyz", "location"),
];

/// Native MP4/MOV tag reader
#[derive(Debug, Default, Clone, Copy)]
pub struct ContainerTagBackend;

impl ContainerTagBackend {
    pub fn new() -> Self {
        Self
    }

    fn read(path: &Path) -> Result<Option<ContainerSection>, BackendError> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let mut section = ContainerSection::new(BackendKind::ContainerTags);
        let mut offset = 0u64;
        let mut first = true;
        let mut seen_moov = false;

        while offset < file_len {
            reader.seek(SeekFrom::Start(offset))?;
            let header = match read_box_header(&mut reader, file_len - offset)? {
                Some(header) => header,
                None => break,
            };

            if first {
                if !TOP_LEVEL_BOXES.contains(&&header.kind) {
                    return Ok(None);
                }
                first = false;
            }
            if header.size < header.header_len || header.size > file_len - offset {
                // A cut-off mdat after a complete moov still leaves usable tags
                if seen_moov {
                    debug!(
                        path = %path.display(),
                        kind = %fourcc_name(&header.kind),
                        declared = header.size,
                        remaining = file_len - offset,
                        "Stopping at truncated box"
                    );
                    break;
                }
                return Err(BackendError::Parse(format!(
                    "box '{}' declares {} bytes with {} remaining",
                    fourcc_name(&header.kind),
                    header.size,
                    file_len - offset
                )));
            }

            let payload_len = header.size - header.header_len;
            match &header.kind {
                b"ftyp" => {
                    let payload = read_payload(&mut reader, payload_len.min(MAX_FTYP_BYTES))?;
                    parse_ftyp(&payload, &mut section);
                }
                b"moov" => {
                    if payload_len > MAX_MOOV_BYTES {
                        return Err(BackendError::Parse(format!(
                            "moov box of {} bytes exceeds the {} byte limit",
                            payload_len, MAX_MOOV_BYTES
                        )));
                    }
                    let payload = read_payload(&mut reader, payload_len)?;
                    parse_moov(&payload, &mut section);
                    seen_moov = true;
                }
                _ => {}
            }

            offset += header.size;
        }

        if !seen_moov && section.tags.is_empty() {
            return Ok(None);
        }

        // HEIF and AVIF share ftyp but carry no moov
        if seen_moov {
            section.format.format_name = Some("mov,mp4,m4a,3gp,3g2,mj2".to_string());
            section.format.format_long_name = Some("QuickTime / MOV".to_string());
        }
        Ok(Some(section))
    }
}

impl MetadataBackend for ContainerTagBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::ContainerTags
    }

    fn is_available(&self) -> bool {
        true
    }

    fn probe(&self, path: &Path) -> ProbeOutcome {
        match Self::read(path) {
            Ok(Some(section)) => ProbeOutcome::Found(section),
            Ok(None) => {
                debug!(path = %path.display(), "Not an ISO base media file");
                ProbeOutcome::NotApplicable
            }
            Err(e) => ProbeOutcome::Failed(e),
        }
    }
}

/// Header of a top-level box read from a file
#[derive(Debug)]
struct BoxHeader {
    kind: FourCc,
    header_len: u64,
    /// Total size including the header
    size: u64,
}

/// Read a box header; `None` at a clean end of file
fn read_box_header<R: Read>(reader: &mut R, remaining: u64) -> Result<Option<BoxHeader>, BackendError> {
    if remaining < 8 {
        return Ok(None);
    }

    let mut raw = [0u8; 8];
    reader.read_exact(&mut raw)?;
    let declared = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]) as u64;
    let kind = [raw[4], raw[5], raw[6], raw[7]];

    let (size, header_len) = match declared {
        0 => (remaining, 8),
        1 if remaining < 16 => return Ok(None),
        1 => {
            let mut large = [0u8; 8];
            reader.read_exact(&mut large)?;
            (u64::from_be_bytes(large), 16)
        }
        n => (n, 8),
    };

    Ok(Some(BoxHeader {
        kind,
        header_len,
        size,
    }))
}

fn read_payload<R: Read>(reader: &mut R, len: u64) -> io::Result<Vec<u8>> {
    let mut payload = Vec::with_capacity(len as usize);
    reader.take(len).read_to_end(&mut payload)?;
    Ok(payload)
}

/// Iterates the child boxes packed in a payload
///
/// Stops quietly at the first malformed child.
struct Boxes<'a> {
    data: &'a [u8],
    pos: usize,
}

fn boxes(data: &[u8]) -> Boxes<'_> {
    Boxes { data, pos: 0 }
}

impl<'a> Iterator for Boxes<'a> {
    type Item = (FourCc, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.data.get(self.pos..)?;
        if rest.len() < 8 {
            return None;
        }

        let declared = be_u32(rest, 0)? as usize;
        let kind = [rest[4], rest[5], rest[6], rest[7]];
        let (size, header_len) = match declared {
            0 => (rest.len(), 8),
            1 => (be_u64(rest, 8)? as usize, 16),
            n => (n, 8),
        };

        if size < header_len || size > rest.len() {
            return None;
        }

        self.pos += size;
        Some((kind, &rest[header_len..size]))
    }
}

fn be_u32(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn be_u64(data: &[u8], at: usize) -> Option<u64> {
    let bytes = data.get(at..at + 8)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    Some(u64::from_be_bytes(raw))
}

/// Printable form of a four-character code (`©` for 0xA9)
fn fourcc_name(kind: &FourCc) -> String {
    kind.iter()
        .map(|&b| match b {
            0xA9 => '©',
            0x20..=0x7E => b as char,
            _ => '?',
        })
        .collect()
}

fn tag_name(kind: &FourCc) -> String {
    ATOM_TAG_NAMES
        .iter()
        .find(|(atom, _)| *atom == kind)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| fourcc_name(kind))
}

fn text(bytes: &[u8]) -> Option<String> {
    let value = String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .trim()
        .to_string();
    (!value.is_empty()).then_some(value)
}

fn parse_ftyp(payload: &[u8], section: &mut ContainerSection) {
    let Some(brand) = payload.get(0..4) else {
        return;
    };
    section.tags.insert("major_brand".into(), fourcc_name(&[brand[0], brand[1], brand[2], brand[3]]));
    if let Some(minor) = be_u32(payload, 4) {
        section.tags.insert("minor_version".into(), minor.to_string());
    }
    let compatible: String = payload
        .get(8..)
        .unwrap_or_default()
        .chunks_exact(4)
        .map(|c| fourcc_name(&[c[0], c[1], c[2], c[3]]))
        .collect();
    if !compatible.is_empty() {
        section.tags.insert("compatible_brands".into(), compatible);
    }
}

fn parse_moov(payload: &[u8], section: &mut ContainerSection) {
    for (kind, child) in boxes(payload) {
        match &kind {
            b"mvhd" => parse_mvhd(child, section),
            b"udta" => parse_udta(child, &mut section.tags),
            b"meta" => parse_meta(child, &mut section.tags),
            b"trak" => {
                if let Some(mut stream) = parse_trak(child) {
                    stream.index = section.streams.len();
                    section.streams.push(stream);
                }
            }
            _ => {}
        }
    }
}

fn parse_mvhd(payload: &[u8], section: &mut ContainerSection) {
    let Some(&version) = payload.first() else {
        return;
    };
    let (timescale, duration) = if version == 1 {
        (be_u32(payload, 20), be_u64(payload, 24))
    } else {
        (be_u32(payload, 12), be_u32(payload, 16).map(u64::from))
    };
    if let (Some(timescale), Some(duration)) = (timescale, duration) {
        if timescale > 0 {
            section.format.duration = Some(format!("{:.6}", duration as f64 / timescale as f64));
        }
    }
}

fn parse_udta(payload: &[u8], tags: &mut BTreeMap<String, String>) {
    for (kind, child) in boxes(payload) {
        if &kind == b"meta" {
            parse_meta(child, tags);
        } else if kind[0] == 0xA9 {
            // QuickTime text atom: u16 length, u16 language, text
            let value = match be_u32(child, 0) {
                Some(_) if child.get(4..8) == Some(&b"data"[..]) => data_value(child),
                _ => quicktime_text(child),
            };
            if let Some(value) = value {
                tags.entry(tag_name(&kind)).or_insert(value);
            }
        } else if !child.is_empty()
            && child.len() <= MAX_RAW_TEXT_LEN
            && child.iter().all(|&b| (0x20..=0x7E).contains(&b))
        {
            if let Some(value) = text(child) {
                tags.entry(tag_name(&kind)).or_insert(value);
            }
        }
    }
}

fn quicktime_text(payload: &[u8]) -> Option<String> {
    let len = u16::from_be_bytes([*payload.first()?, *payload.get(1)?]) as usize;
    text(payload.get(4..4 + len)?)
}

fn parse_meta(payload: &[u8], tags: &mut BTreeMap<String, String>) {
    // ISO meta is a full box (4 bytes of version/flags); QuickTime meta is not
    let children = if payload.get(4..8) == Some(&b"hdlr"[..]) {
        payload
    } else {
        payload.get(4..).unwrap_or_default()
    };

    let mut keys: Vec<String> = Vec::new();
    for (kind, child) in boxes(children) {
        match &kind {
            b"keys" => keys = parse_keys(child),
            b"ilst" => parse_ilst(child, &keys, tags),
            _ => {}
        }
    }
}

/// QuickTime `mdta` key table, 1-based in `ilst`
fn parse_keys(payload: &[u8]) -> Vec<String> {
    let count = be_u32(payload, 4).unwrap_or(0) as usize;
    let mut keys = Vec::with_capacity(count.min(256));
    let mut pos = 8;

    for _ in 0..count {
        let Some(size) = be_u32(payload, pos).map(|s| s as usize) else {
            break;
        };
        if size < 8 {
            break;
        }
        let Some(name) = payload.get(pos + 8..pos + size) else {
            break;
        };
        keys.push(String::from_utf8_lossy(name).into_owned());
        pos += size;
    }
    keys
}

fn parse_ilst(payload: &[u8], keys: &[String], tags: &mut BTreeMap<String, String>) {
    for (kind, item) in boxes(payload) {
        let name = if &kind == b"----" {
            freeform_name(item)
        } else {
            let index = u32::from_be_bytes(kind) as usize;
            if index >= 1 && index <= keys.len() {
                Some(keys[index - 1].clone())
            } else {
                Some(tag_name(&kind))
            }
        };

        let value = boxes(item)
            .find(|(k, _)| k == b"data")
            .and_then(|(_, data)| typed_data(data));

        if let (Some(name), Some(value)) = (name, value) {
            // mdta keys are reverse-DNS ("com.apple.quicktime.comment")
            let name = name.rsplit('.').next().unwrap_or(&name).to_string();
            tags.entry(name).or_insert(value);
        }
    }
}

fn freeform_name(item: &[u8]) -> Option<String> {
    boxes(item)
        .find(|(k, _)| k == b"name")
        .and_then(|(_, name)| text(name.get(4..)?))
}

/// Payload of a `data` box given with its own header
fn data_value(atom: &[u8]) -> Option<String> {
    boxes(atom)
        .find(|(k, _)| k == b"data")
        .and_then(|(_, data)| typed_data(data))
}

/// Decode a `data` payload: u32 type indicator, u32 locale, value
fn typed_data(data: &[u8]) -> Option<String> {
    let type_indicator = be_u32(data, 0)? & 0x00FF_FFFF;
    let value = data.get(8..)?;
    match type_indicator {
        0 | 1 => text(value),
        21 | 22 => {
            let mut number: u64 = 0;
            for &b in value.iter().take(8) {
                number = (number << 8) | u64::from(b);
            }
            Some(number.to_string())
        }
        _ => None,
    }
}

fn parse_trak(payload: &[u8]) -> Option<StreamInfo> {
    let mut stream = StreamInfo::default();
    let mut seen = false;

    for (kind, child) in boxes(payload) {
        match &kind {
            b"tkhd" => {
                // Width and height are the last two 16.16 fixed-point fields
                if child.len() >= 8 {
                    let at = child.len() - 8;
                    stream.width = be_u32(child, at).map(|w| w >> 16).filter(|&w| w > 0);
                    stream.height = be_u32(child, at + 4).map(|h| h >> 16).filter(|&h| h > 0);
                    seen = true;
                }
            }
            b"mdia" => {
                for (kind, grandchild) in boxes(child) {
                    match &kind {
                        b"hdlr" => {
                            stream.codec_type = grandchild.get(8..12).map(handler_codec_type);
                            seen = true;
                        }
                        b"minf" => stream.codec_name = sample_entry_codec(grandchild),
                        _ => {}
                    }
                }
            }
            b"udta" => parse_udta(child, &mut stream.tags),
            _ => {}
        }
    }

    seen.then_some(stream)
}

fn handler_codec_type(handler: &[u8]) -> String {
    match handler {
        b"vide" => "video",
        b"soun" => "audio",
        b"sbtl" | b"text" | b"subt" => "subtitle",
        _ => "data",
    }
    .to_string()
}

/// Codec of the first sample entry in `minf/stbl/stsd`
fn sample_entry_codec(minf: &[u8]) -> Option<String> {
    let (_, stbl) = boxes(minf).find(|(k, _)| k == b"stbl")?;
    let (_, stsd) = boxes(stbl).find(|(k, _)| k == b"stsd")?;
    // Full box header, then u32 entry count, then the first entry
    let entries = stsd.get(8..)?;
    let (format, _) = boxes(entries).next()?;

    let name = match &format {
        b"avc1" | b"avc3" => "h264".to_string(),
        b"hvc1" | b"hev1" => "hevc".to_string(),
        b"av01" => "av1".to_string(),
        b"vp09" => "vp9".to_string(),
        b"mp4a" => "aac".to_string(),
        b"mp4v" => "mpeg4".to_string(),
        other => fourcc_name(other).trim().to_string(),
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn atom(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
        out.extend_from_slice(kind);
        out.extend_from_slice(payload);
        out
    }

    fn data_atom(value: &str) -> Vec<u8> {
        let mut payload = vec![0, 0, 0, 1, 0, 0, 0, 0];
        payload.extend_from_slice(value.as_bytes());
        atom(b"data", &payload)
    }

    fn tkhd(width: u32, height: u32) -> Vec<u8> {
        let mut payload = vec![0u8; 76];
        payload.extend_from_slice(&(width << 16).to_be_bytes());
        payload.extend_from_slice(&(height << 16).to_be_bytes());
        atom(b"tkhd", &payload)
    }

    fn hdlr(handler: &[u8; 4]) -> Vec<u8> {
        let mut payload = vec![0u8; 8];
        payload.extend_from_slice(handler);
        payload.extend_from_slice(&[0u8; 13]);
        atom(b"hdlr", &payload)
    }

    fn ftyp() -> Vec<u8> {
        atom(b"ftyp", b"isom\x00\x00\x02\x00isomiso2avc1mp41")
    }

    fn write(temp: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = temp.path().join(name);
        File::create(&path).unwrap().write_all(bytes).unwrap();
        path
    }

    fn probe_section(bytes: &[u8]) -> ContainerSection {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "clip.mp4", bytes);
        match ContainerTagBackend::new().probe(&path) {
            ProbeOutcome::Found(section) => section,
            other => panic!("expected a section, got {:?}", other),
        }
    }

    #[test]
    fn reads_ilst_comment_and_encoder() {
        let mut ilst = atom(b"\xA9cmt", &data_atom("vid:v0d00fg10000abc"));
        ilst.extend(atom(b"\xA9too", &data_atom("Lavf58.76.100")));
        let mut meta = vec![0u8; 4];
        meta.extend(hdlr(b"mdir"));
        meta.extend(atom(b"ilst", &ilst));
        let moov = atom(b"moov", &atom(b"udta", &atom(b"meta", &meta)));

        let mut file = ftyp();
        file.extend(moov);
        let section = probe_section(&file);

        assert_eq!(section.tag("comment"), Some("vid:v0d00fg10000abc"));
        assert_eq!(section.tag("encoder"), Some("Lavf58.76.100"));
        assert_eq!(section.tag("major_brand"), Some("isom"));
        assert_eq!(section.tag("compatible_brands"), Some("isomiso2avc1mp41"));
    }

    #[test]
    fn reads_freeform_items() {
        let mut mean = vec![0u8; 4];
        mean.extend_from_slice(b"com.apple.iTunes");
        let mut name = vec![0u8; 4];
        name.extend_from_slice(b"vid_md5");
        let mut item = atom(b"mean", &mean);
        item.extend(atom(b"name", &name));
        item.extend(data_atom("0123456789abcdef"));

        let mut meta = vec![0u8; 4];
        meta.extend(atom(b"ilst", &atom(b"----", &item)));
        let mut file = ftyp();
        file.extend(atom(b"moov", &atom(b"udta", &atom(b"meta", &meta))));

        let section = probe_section(&file);
        assert_eq!(section.tag("vid_md5"), Some("0123456789abcdef"));
    }

    #[test]
    fn reads_mdta_keyed_items() {
        let key = b"com.apple.quicktime.aigc_info";
        let mut keys = vec![0, 0, 0, 0, 0, 0, 0, 1];
        keys.extend_from_slice(&((key.len() + 8) as u32).to_be_bytes());
        keys.extend_from_slice(b"mdta");
        keys.extend_from_slice(key);

        let mut meta = hdlr(b"mdta");
        meta.extend(atom(b"keys", &keys));
        meta.extend(atom(b"ilst", &atom(&1u32.to_be_bytes(), &data_atom("{\"aigc_label_type\":0}"))));
        let mut file = ftyp();
        file.extend(atom(b"moov", &atom(b"meta", &meta)));

        let section = probe_section(&file);
        assert_eq!(section.tag("aigc_info"), Some("{\"aigc_label_type\":0}"));
    }

    #[test]
    fn reads_quicktime_text_atoms() {
        let mut payload = 16u16.to_be_bytes().to_vec();
        payload.extend_from_slice(&[0x55, 0xC4]);
        payload.extend_from_slice(b"vid:gf0000abc123");
        let mut file = ftyp();
        file.extend(atom(b"moov", &atom(b"udta", &atom(b"\xA9cmt", &payload))));

        let section = probe_section(&file);
        assert_eq!(section.tag("comment"), Some("vid:gf0000abc123"));
    }

    #[test]
    fn reads_video_track_dimensions() {
        let mut trak = tkhd(576, 1246);
        trak.extend(atom(b"mdia", &hdlr(b"vide")));
        let mut file = ftyp();
        file.extend(atom(b"moov", &atom(b"trak", &trak)));

        let section = probe_section(&file);
        assert_eq!(section.streams.len(), 1);
        assert!(section.streams[0].is_video());
        assert_eq!(section.streams[0].dimensions(), Some((576, 1246)));
    }

    #[test]
    fn audio_track_has_no_dimensions() {
        let mut trak = tkhd(0, 0);
        trak.extend(atom(b"mdia", &hdlr(b"soun")));
        let mut file = ftyp();
        file.extend(atom(b"moov", &atom(b"trak", &trak)));

        let section = probe_section(&file);
        assert_eq!(section.streams[0].codec_type.as_deref(), Some("audio"));
        assert_eq!(section.streams[0].dimensions(), None);
    }

    #[test]
    fn non_mp4_is_not_applicable() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "photo.jpg", b"\xFF\xD8\xFF\xE0\x00\x10JFIF\x00");
        let outcome = ContainerTagBackend::new().probe(&path);
        assert!(matches!(outcome, ProbeOutcome::NotApplicable));
    }

    #[test]
    fn truncated_box_fails_softly() {
        let temp = TempDir::new().unwrap();
        let mut bytes = ftyp();
        bytes.extend_from_slice(&[0x00, 0x00, 0x10, 0x00]);
        bytes.extend_from_slice(b"moov");
        let path = write(&temp, "broken.mp4", &bytes);

        let outcome = ContainerTagBackend::new().probe(&path);
        assert!(matches!(outcome, ProbeOutcome::Failed(BackendError::Parse(_))));
    }

    #[test]
    fn partial_download_keeps_moov_tags() {
        let mut meta = vec![0u8; 4];
        meta.extend(atom(b"ilst", &atom(b"\xA9cmt", &data_atom("vid:gf0000abc123"))));
        let mut bytes = ftyp();
        bytes.extend(atom(b"moov", &atom(b"udta", &atom(b"meta", &meta))));
        bytes.extend_from_slice(&(1u32 << 20).to_be_bytes());
        bytes.extend_from_slice(b"mdat");
        bytes.extend_from_slice(&[0u8; 100]);

        let section = probe_section(&bytes);
        assert_eq!(section.tag("comment"), Some("vid:gf0000abc123"));
        assert_eq!(section.format.format_long_name.as_deref(), Some("QuickTime / MOV"));
    }

    #[test]
    fn heif_brands_are_not_labelled_quicktime() {
        let mut bytes = atom(b"ftyp", b"heic\x00\x00\x00\x00mif1heic");
        bytes.extend(atom(b"meta", &[0u8; 12]));

        let section = probe_section(&bytes);
        assert_eq!(section.tag("major_brand"), Some("heic"));
        assert_eq!(section.format.format_name, None);
        assert_eq!(section.format.format_long_name, None);
    }

    #[test]
    fn fourcc_name_renders_copyright_sign() {
        assert_eq!(fourcc_name(b"\xA9cmt"), "©cmt");
        assert_eq!(tag_name(b"\xA9too"), "encoder");
        assert_eq!(tag_name(b"abcd"), "abcd");
    }
}
