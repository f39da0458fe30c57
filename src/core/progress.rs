use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub time: Option<Duration>,
    pub frame: Option<u64>,
    pub speed: Option<f32>,
}

static RE_FRAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"frame=\s*(\d+)").unwrap());
static RE_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"time=\s*([0-9:\.]+)").unwrap());
static RE_SPEED: Lazy<Regex> = Lazy::new(|| Regex::new(r"speed=\s*([0-9]*\.?[0-9]+)x").unwrap());

/// Parse an ffmpeg stats line such as
/// `frame=  240 fps= 48 q=28.0 size=  1024kB time=00:00:10.00 bitrate= 838.9kbits/s speed=1.99x`.
pub fn parse_progress_line(line: &str) -> Option<ProgressUpdate> {
    let frame = RE_FRAME
        .captures(line)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok());
    let time = RE_TIME
        .captures(line)
        .and_then(|cap| cap.get(1))
        .and_then(|m| parse_ffmpeg_time(m.as_str()));
    let speed = RE_SPEED
        .captures(line)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse::<f32>().ok());

    if time.is_some() || frame.is_some() || speed.is_some() {
        Some(ProgressUpdate { time, frame, speed })
    } else {
        None
    }
}

/// `HH:MM:SS.ms` to a duration.
pub fn parse_ffmpeg_time(value: &str) -> Option<Duration> {
    let mut parts = value.trim().split(':');
    let hours = parts.next()?.parse::<u64>().ok()?;
    let minutes = parts.next()?.parse::<u64>().ok()?;
    let seconds = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() || seconds < 0.0 {
        return None;
    }
    let whole = Duration::from_secs(hours * 3600 + minutes * 60);
    Some(whole + Duration::from_secs_f64(seconds))
}

pub fn parse_size_to_bytes(value: f32, unit: &str) -> Option<u64> {
    let multiplier: f64 = match unit {
        "B" => 1.0,
        "kB" | "KB" | "KiB" => 1024.0,
        "mB" | "MB" | "MiB" => 1024.0 * 1024.0,
        "gB" | "GB" | "GiB" => 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };
    Some((value as f64 * multiplier).round() as u64)
}

pub fn parse_bitrate_to_kbps(value: f32, unit: &str) -> Option<f32> {
    match unit {
        "bits/s" => Some(value / 1000.0),
        "kbits/s" => Some(value),
        "Mbits/s" => Some(value * 1000.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_line_with_padded_values() {
        let update = parse_progress_line(
            "frame=  240 fps= 48 q=28.0 size=    1024kB time=00:01:10.50 bitrate= 838.9kbits/s speed=1.99x",
        )
        .unwrap();
        assert_eq!(update.frame, Some(240));
        assert_eq!(update.time, Some(Duration::from_millis(70_500)));
        assert_eq!(update.speed, Some(1.99));
    }

    #[test]
    fn unrelated_line_is_not_progress() {
        assert_eq!(parse_progress_line("Stream mapping:"), None);
    }

    #[test]
    fn time_parsing() {
        assert_eq!(
            parse_ffmpeg_time("01:02:03.25"),
            Some(Duration::from_millis(3_723_250))
        );
        assert_eq!(parse_ffmpeg_time("N/A"), None);
        assert_eq!(parse_ffmpeg_time("12:00"), None);
    }

    #[test]
    fn size_and_bitrate_units() {
        assert_eq!(parse_size_to_bytes(2.0, "kB"), Some(2048));
        assert_eq!(parse_size_to_bytes(1.5, "MiB"), Some(1_572_864));
        assert_eq!(parse_size_to_bytes(1.0, "parsecs"), None);
        assert_eq!(parse_bitrate_to_kbps(2.5, "Mbits/s"), Some(2500.0));
        assert_eq!(parse_bitrate_to_kbps(64000.0, "bits/s"), Some(64.0));
    }
}
