use std::time::Duration;

use crate::core::command::CommandSpec;
use crate::core::config::render_param;
use crate::core::decision::DecisionRecord;
use crate::core::probe::FileTracks;
use crate::core::progress::ProgressUpdate;
use crate::core::summary::EncodeSummary;

/// The "what is about to happen" block printed before each encode.
pub fn format_plan(
    spec: &CommandSpec,
    decision: &DecisionRecord,
    tracks: &FileTracks,
) -> Vec<String> {
    let mut lines = vec![
        format!("Encoding: {}", spec.input.display()),
        format!("Output to: {}", spec.output.display()),
        "Settings:".to_string(),
    ];

    match (&decision.preset, decision.reencode) {
        (Some(preset), true) => {
            lines.push(format!("  Codec: {}", preset.codec));
            for (key, value) in &preset.params {
                lines.push(format!("  {key}: {}", render_param(value)));
            }
        }
        (None, true) => lines.push("  Video: reencode with ffmpeg defaults".to_string()),
        (_, false) => lines.push("  Video: Copy (no reencoding)".to_string()),
    }

    if decision.reencode {
        if let Some(height) = decision.target_height {
            lines.push(format!("  Resolution: {height}p"));
        }
    }

    if let Some(id) = decision.subtitle_track {
        if let Some(track) = tracks.subtitles.iter().find(|t| t.id == id) {
            lines.push(format!(
                "  Burning subtitle track: [{}] {}",
                track.id, track.title
            ));
        }
    }

    lines
}

pub fn format_summary_line(summary: &EncodeSummary, elapsed: Duration) -> String {
    let size = format_bytes(summary.final_size_bytes);
    let bitrate = if summary.avg_bitrate_kbps > 0.0 {
        format!("{:.1} kbps", summary.avg_bitrate_kbps)
    } else {
        "unknown".to_string()
    };
    let duration = format_duration(summary.duration);
    let elapsed = format_duration(elapsed);
    format!("Final  : size={size} avg_bitrate={bitrate} duration={duration} elapsed={elapsed}")
}

pub fn format_progress_line(update: &ProgressUpdate) -> Option<String> {
    if update.frame.unwrap_or(0) == 0
        && update.speed.unwrap_or(0.0) == 0.0
        && update.time.unwrap_or_default() == Duration::ZERO
    {
        return None;
    }

    let time = update
        .time
        .map(format_duration)
        .unwrap_or_else(|| "--:--:--".to_string());
    let frame = update
        .frame
        .map(|f| f.to_string())
        .unwrap_or_else(|| "-".to_string());
    let speed = update
        .speed
        .map(|s| format!("{s}x"))
        .unwrap_or_else(|| "-".to_string());

    Some(format!("progress: time={time} frame={frame} speed={speed}"))
}

pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    let value = bytes as f64;
    if value >= GB {
        format!("{:.2} GB", value / GB)
    } else if value >= MB {
        format!("{:.2} MB", value / MB)
    } else if value >= KB {
        format!("{:.2} KB", value / KB)
    } else {
        format!("{} B", bytes)
    }
}
