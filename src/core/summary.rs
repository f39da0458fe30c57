use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::progress::{parse_bitrate_to_kbps, parse_ffmpeg_time, parse_size_to_bytes};

/// Totals from ffmpeg's last stats line.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeSummary {
    pub final_size_bytes: u64,
    pub duration: Duration,
    pub avg_bitrate_kbps: f32,
}

/// `key=value` with an optional unit glued to the value.
static RE_STAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)=\s*([0-9][0-9:.]*)([A-Za-z/]*)").unwrap());

/// Parse the final stats line. Only a line carrying `Lsize=` is a summary.
pub fn parse_summary_line(line: &str) -> Option<EncodeSummary> {
    let mut size = None;
    let mut duration = Duration::ZERO;
    let mut bitrate = 0.0;

    for cap in RE_STAT.captures_iter(line) {
        let (key, value, unit) = (&cap[1], &cap[2], &cap[3]);
        match key {
            "Lsize" => {
                size = value
                    .parse::<f32>()
                    .ok()
                    .and_then(|v| parse_size_to_bytes(v, unit));
            }
            "time" => duration = parse_ffmpeg_time(value).unwrap_or_default(),
            "bitrate" => {
                bitrate = value
                    .parse::<f32>()
                    .ok()
                    .and_then(|v| parse_bitrate_to_kbps(v, unit))
                    .unwrap_or(0.0);
            }
            _ => {}
        }
    }

    Some(EncodeSummary {
        final_size_bytes: size?,
        duration,
        avg_bitrate_kbps: bitrate,
    })
}
