//! Startup configuration: output naming, tool locations and encoding presets.
//!
//! A [`Settings`] value is built once in `main` and only borrowed afterwards.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::core::error::{FfdropError, Result};
use crate::core::tools;

/// A named codec plus encoder flags, applied when reencoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub codec: String,
    /// Encoder flags without the leading dash, in file order.
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl Preset {
    pub fn default_x264() -> Self {
        let mut params = Map::new();
        params.insert("crf".to_string(), Value::from(24));
        params.insert("preset".to_string(), Value::from("veryslow"));
        Self {
            name: "Default x264".to_string(),
            codec: "libx264".to_string(),
            params,
        }
    }

    /// `-c:v <codec>` followed by one `-<key> <value>` pair per parameter.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["-c:v".to_string(), self.codec.clone()];
        for (key, value) in &self.params {
            args.push(format!("-{key}"));
            args.push(render_param(value));
        }
        args
    }

    pub fn describe(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|(key, value)| format!("{key}={}", render_param(value)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} ({}, {params})", self.name, self.codec)
    }
}

/// Parameter value as it appears on the ffmpeg command line.
pub fn render_param(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Added between the input stem and the new extension.
    pub output_suffix: String,
    pub output_extension: String,
    /// Audio codec used for the `amerge` output.
    pub merged_audio_codec: String,
    pub preset_file: String,
    pub ffprobe: PathBuf,
    pub ffmpeg: PathBuf,
    presets: Vec<Preset>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_suffix: "_done".to_string(),
            output_extension: ".mp4".to_string(),
            merged_audio_codec: "aac".to_string(),
            preset_file: ".presets.json".to_string(),
            ffprobe: PathBuf::from("ffprobe"),
            ffmpeg: PathBuf::from("ffmpeg"),
            presets: vec![Preset::default_x264()],
        }
    }
}

impl Settings {
    /// Defaults, tools resolved on `PATH`, plus presets from the preset file
    /// next to the executable.
    pub fn load() -> Self {
        let mut settings = Self {
            ffprobe: tools::resolve("ffprobe"),
            ffmpeg: tools::resolve("ffmpeg"),
            ..Self::default()
        };

        if let Some(dir) = executable_dir() {
            let path = dir.join(&settings.preset_file);
            settings = settings.with_presets_from(&path);
        }

        settings
    }

    /// Append the presets found in `path`; problems never drop the defaults.
    pub fn with_presets_from(mut self, path: &Path) -> Self {
        match read_preset_file(path) {
            Ok(custom) => {
                if !custom.is_empty() {
                    info!(path = %path.display(), count = custom.len(), "loaded custom presets");
                }
                self.presets.extend(custom);
            }
            Err(err) => warn!(path = %path.display(), "{err}"),
        }
        self
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    /// `<stem><suffix><extension>` in the input's directory.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let name = format!("{stem}{}{}", self.output_suffix, self.output_extension);
        match input.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        }
    }
}

fn executable_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Read a JSON array of presets.
///
/// A missing or empty file, invalid JSON syntax, or a document that is not an
/// array all yield no presets. I/O failures and entries of the wrong shape are
/// errors.
pub fn read_preset_file(path: &Path) -> Result<Vec<Preset>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(FfdropError::InvalidPresets {
                path: path.to_path_buf(),
                message: err.to_string(),
            })
        }
    };

    let content = content.trim();
    if content.is_empty() {
        return Ok(Vec::new());
    }

    let document: Value = match serde_json::from_str(content) {
        Ok(document) => document,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "ignoring malformed preset file");
            return Ok(Vec::new());
        }
    };

    if !document.is_array() {
        debug!(path = %path.display(), "preset file is not a list, ignoring");
        return Ok(Vec::new());
    }

    serde_json::from_value(document).map_err(|err| FfdropError::InvalidPresets {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}
