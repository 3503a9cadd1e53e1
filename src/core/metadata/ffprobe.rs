//! ffprobe backend.
//!
//! Runs `ffprobe -v quiet -print_format json -show_format -show_streams` and
//! maps its JSON onto a [`ContainerSection`]. The child's stdout goes to an
//! anonymous temp file rather than a pipe, so a chatty process can never
//! block on a full pipe while we wait for it. The child is polled until the
//! configured deadline and killed once it passes.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{BackendKind, ContainerSection, FormatInfo, MetadataBackend, ProbeOutcome, StreamInfo};
use crate::core::config::{FfprobeConfig, MAX_FFPROBE_TIMEOUT};
use crate::error::BackendError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// External ffprobe prober
#[derive(Debug)]
pub struct FfprobeBackend {
    config: FfprobeConfig,
    /// Resolved on first use by running `ffprobe -version`
    available: OnceLock<bool>,
}

impl FfprobeBackend {
    pub fn new(config: FfprobeConfig) -> Self {
        Self {
            config,
            available: OnceLock::new(),
        }
    }

    fn program_name(&self) -> String {
        self.config.program.display().to_string()
    }

    /// Run the program with `args` under the timeout, returning its stdout
    fn run(&self, args: &[&OsStr]) -> Result<Vec<u8>, BackendError> {
        let program = self.program_name();
        let mut output = tempfile::tempfile()?;

        let mut child = Command::new(&self.config.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(output.try_clone()?))
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| BackendError::Spawn {
                program: program.clone(),
                source,
            })?;

        let started = Instant::now();
        let deadline = started
            .checked_add(self.config.timeout)
            .unwrap_or(started + MAX_FFPROBE_TIMEOUT);
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                if let Err(e) = child.kill() {
                    debug!(program = %program, error = %e, "Could not kill timed out child");
                }
                // Reap so no zombie is left behind
                let _ = child.wait();
                return Err(BackendError::Timeout {
                    program,
                    seconds: self.config.timeout.as_secs_f64(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        if !status.success() {
            return Err(BackendError::ExitStatus {
                program,
                code: status.code(),
            });
        }

        output.seek(SeekFrom::Start(0))?;
        let mut stdout = Vec::new();
        output.read_to_end(&mut stdout)?;
        Ok(stdout)
    }

    fn read(&self, path: &Path) -> Result<ContainerSection, BackendError> {
        let args = [
            OsStr::new("-v"),
            OsStr::new("quiet"),
            OsStr::new("-print_format"),
            OsStr::new("json"),
            OsStr::new("-show_format"),
            OsStr::new("-show_streams"),
            path.as_os_str(),
        ];
        let stdout = self.run(&args)?;
        let parsed: FfprobeOutput =
            serde_json::from_slice(&stdout).map_err(|e| BackendError::Parse(e.to_string()))?;
        Ok(parsed.into_section())
    }
}

impl MetadataBackend for FfprobeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Ffprobe
    }

    fn is_available(&self) -> bool {
        *self.available.get_or_init(|| {
            let available = self.run(&[OsStr::new("-version")]).is_ok();
            if !available {
                debug!(program = %self.program_name(), "ffprobe is not usable");
            }
            available
        })
    }

    fn probe(&self, path: &Path) -> ProbeOutcome {
        match self.read(path) {
            Ok(section) => ProbeOutcome::Found(section),
            Err(BackendError::Spawn { program, source }) if source.kind() == io::ErrorKind::NotFound => {
                ProbeOutcome::Unavailable(format!("{} not found", program))
            }
            Err(e @ BackendError::Timeout { .. }) => {
                warn!(path = %path.display(), error = %e, "ffprobe timed out");
                ProbeOutcome::Unavailable(e.to_string())
            }
            Err(e) => ProbeOutcome::Failed(e),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    #[serde(default)]
    format: FfprobeFormat,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeStream {
    #[serde(default)]
    index: usize,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    format_long_name: Option<String>,
    duration: Option<String>,
    bit_rate: Option<String>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

impl FfprobeOutput {
    fn into_section(self) -> ContainerSection {
        let mut section = ContainerSection::new(BackendKind::Ffprobe);
        section.format = FormatInfo {
            format_name: self.format.format_name,
            format_long_name: self.format.format_long_name,
            duration: self.format.duration,
            bit_rate: self.format.bit_rate,
        };
        section.tags = self.format.tags;
        section.streams = self
            .streams
            .into_iter()
            .map(|s| StreamInfo {
                index: s.index,
                codec_type: s.codec_type,
                codec_name: s.codec_name,
                width: s.width,
                height: s.height,
                tags: s.tags,
            })
            .collect();
        section
    }
}
