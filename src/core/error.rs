use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FfdropError {
    #[error("{tool} not found. Please ensure ffmpeg is installed and in your PATH")]
    ToolMissing { tool: String },
    #[error("error probing {}: {message}", path.display())]
    ProbeFailed { path: PathBuf, message: String },
    #[error("not a valid video file: {}", path.display())]
    NotAVideoFile { path: PathBuf },
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },
    #[error("not a file: {}", path.display())]
    NotAFile { path: PathBuf },
    #[error("invalid input: {message}")]
    InvalidUserInput { message: String },
    #[error("error loading {}: {message}", path.display())]
    InvalidPresets { path: PathBuf, message: String },
    #[error("input closed while waiting for an answer")]
    InputClosed,
    #[error("ffmpeg process failed (exit_code={exit_code:?}): {stderr}")]
    EncodeFailed {
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FfdropError {
    pub fn tool_missing(tool: impl Into<String>) -> Self {
        Self::ToolMissing { tool: tool.into() }
    }

    pub fn probe_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ProbeFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidUserInput {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FfdropError>;
