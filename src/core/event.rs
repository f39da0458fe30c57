use crate::core::progress::ProgressUpdate;
use crate::core::summary::EncodeSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Progress,
    Summary,
    Warning,
    Error,
    Prompt,
    Noise,
}

/// What the runner reports while ffmpeg is working.
#[derive(Debug, Clone, PartialEq)]
pub enum EncoderEvent {
    Progress(ProgressUpdate),
    Summary(EncodeSummary),
    Warning(String),
    Error(String),
    /// ffmpeg is waiting for an answer on stdin.
    Prompt(String),
}

pub fn is_overwrite_prompt(text: &str) -> bool {
    text.contains("Overwrite?") && text.contains("[y/N]")
}

pub fn classify_log_line(line: &str) -> LogLevel {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LogLevel::Noise;
    }

    if is_overwrite_prompt(trimmed) {
        return LogLevel::Prompt;
    }
    if trimmed.contains("Lsize=") {
        return LogLevel::Summary;
    }
    if trimmed.contains("frame=") && trimmed.contains("time=") {
        return LogLevel::Progress;
    }
    if trimmed.starts_with("size=") && trimmed.contains("time=") {
        // audio-only outputs have no frame counter
        return LogLevel::Progress;
    }

    let lower = trimmed.to_ascii_lowercase();
    let noise_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "libav",
        "libsw",
        "libpostproc",
    ];
    if noise_prefixes.iter().any(|prefix| lower.starts_with(prefix)) {
        return LogLevel::Noise;
    }

    if lower.contains("error") || lower.contains("invalid") || lower.contains("no such file") {
        return LogLevel::Error;
    }

    if lower.contains("warning") || lower.contains("deprecated") {
        return LogLevel::Warning;
    }

    LogLevel::Noise
}
