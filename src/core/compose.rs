//! Turns a [`DecisionRecord`] into ffmpeg mapping arguments and a filter graph.

use std::path::Path;

use crate::core::decision::{AudioDecision, AudioMode, DecisionRecord, TrackSelection};
use crate::core::graph::FilterGraph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub video_args: Vec<String>,
    pub audio_args: Vec<String>,
    pub filter_graph: Option<String>,
}

/// Escape a path for use inside a single-quoted filter argument.
///
/// A quote closes the quoting, adds `'` escaped for both the graph and the
/// option parser, then reopens it.
pub fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', r"'\\\''")
}

/// Stage order is fixed: audio merge, subtitle burn-in, then scaling, so
/// subtitles are always rendered at the source resolution.
pub fn compose(
    decision: &DecisionRecord,
    escaped_input: &str,
    merged_audio_codec: &str,
) -> Composition {
    let mut graph = FilterGraph::new();

    let audio_args = audio_args(decision, &mut graph, merged_audio_codec);

    // Video filters only apply when the video is reencoded.
    if decision.reencode {
        if let Some(id) = decision.subtitle_track {
            graph.video(format!("subtitles='{escaped_input}':si={id}"));
        }
        if let Some(height) = decision.target_height {
            graph.video(format!("scale=-1:{height}"));
        }
    }

    let video_args = if decision.reencode {
        let map = graph.video_output().unwrap_or_else(|| "0:v".to_string());
        let mut args = vec!["-map".to_string(), map];
        if let Some(preset) = &decision.preset {
            args.extend(preset.to_args());
        }
        args
    } else {
        strings(&["-map", "0:v", "-c:v", "copy"])
    };

    Composition {
        video_args,
        audio_args,
        filter_graph: graph.render(),
    }
}

fn audio_args(
    decision: &DecisionRecord,
    graph: &mut FilterGraph,
    merged_audio_codec: &str,
) -> Vec<String> {
    let (mode, selection) = match &decision.audio {
        AudioDecision::Disabled => return strings(&["-an"]),
        AudioDecision::Select { mode, selection } => (*mode, selection),
    };

    match (mode, selection) {
        (_, TrackSelection::None) => strings(&["-an"]),
        (AudioMode::Include, TrackSelection::All) => strings(&["-map", "0:a", "-c:a", "copy"]),
        (AudioMode::Include, TrackSelection::Tracks(ids)) => ids
            .iter()
            .flat_map(|id| {
                [
                    "-map".to_string(),
                    format!("0:a:{id}"),
                    "-c:a".to_string(),
                    "copy".to_string(),
                ]
            })
            .collect(),
        (AudioMode::Merge, TrackSelection::Tracks(ids)) if !ids.is_empty() => {
            graph.merge_audio(ids);
            let map = graph.audio_output().unwrap_or_else(|| "[aout]".to_string());
            vec![
                "-map".to_string(),
                map,
                "-c:a".to_string(),
                merged_audio_codec.to_string(),
            ]
        }
        // Nothing chosen to merge: ffmpeg's default stream selection applies.
        (AudioMode::Merge, _) => Vec::new(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
