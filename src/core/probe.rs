//! ffprobe-based track inspection.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;
use tracing::debug;

use crate::core::error::{FfdropError, Result};
use crate::core::tools;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeResult {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeStream {
    pub codec_type: Option<String>,
    #[serde(default)]
    pub tags: ProbeTags,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeTags {
    pub title: Option<String>,
    pub handler_name: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Video,
    Audio,
    Subtitle,
}

impl MediaType {
    pub fn codec_type(self) -> &'static str {
        match self {
            MediaType::Video => "video",
            MediaType::Audio => "audio",
            MediaType::Subtitle => "subtitle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDescriptor {
    /// Zero-based position among the streams of the same type.
    pub id: u32,
    pub title: String,
    pub language: String,
}

impl std::fmt::Display for TrackDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {} ({})", self.id, self.title, self.language)
    }
}

/// Audio and subtitle tracks of one input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTracks {
    pub audio: Vec<TrackDescriptor>,
    pub subtitles: Vec<TrackDescriptor>,
}

impl FileTracks {
    pub fn from_probe(result: &ProbeResult) -> Self {
        Self {
            audio: extract_tracks(result, MediaType::Audio),
            subtitles: extract_tracks(result, MediaType::Subtitle),
        }
    }

    pub fn has_subtitle(&self, id: u32) -> bool {
        self.subtitles.iter().any(|track| track.id == id)
    }
}

pub struct Inspector {
    program: PathBuf,
}

impl Inspector {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn ensure_available(&self) -> Result<PathBuf> {
        tools::require(&self.program)
    }

    /// Full stream listing as JSON.
    pub fn probe(&self, path: &Path) -> Result<ProbeResult> {
        let output = Command::new(&self.program)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| tools::spawn_error(&self.program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FfdropError::probe_failed(
                path,
                format!("exit status {}: {}", output.status, stderr.trim()),
            ));
        }

        parse_probe_output(path, &output.stdout)
    }

    /// True when ffprobe reports a first video stream. Any failure is `false`.
    pub fn is_video_file(&self, path: &Path) -> bool {
        let output = Command::new(&self.program)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=codec_type",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output();

        match output {
            Ok(output) => {
                output.status.success()
                    && String::from_utf8_lossy(&output.stdout)
                        .to_lowercase()
                        .contains(MediaType::Video.codec_type())
            }
            Err(err) => {
                debug!(path = %path.display(), error = %err, "video check failed");
                false
            }
        }
    }
}

pub fn parse_probe_output(path: &Path, stdout: &[u8]) -> Result<ProbeResult> {
    serde_json::from_slice(stdout)
        .map_err(|e| FfdropError::probe_failed(path, format!("unparseable ffprobe output: {e}")))
}

/// Streams of one type, numbered from zero within that type.
pub fn extract_tracks(result: &ProbeResult, media_type: MediaType) -> Vec<TrackDescriptor> {
    result
        .streams
        .iter()
        .filter(|stream| stream.codec_type.as_deref() == Some(media_type.codec_type()))
        .enumerate()
        .map(|(id, stream)| TrackDescriptor {
            id: id as u32,
            title: stream
                .tags
                .title
                .clone()
                .or_else(|| stream.tags.handler_name.clone())
                .unwrap_or_else(|| "Untitled".to_string()),
            language: stream
                .tags
                .language
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        })
        .collect()
}
