//! Per-file encoding decisions and the policy that collects them.

use tracing::{debug, warn};

use crate::core::config::Preset;
use crate::core::error::{FfdropError, Result};
use crate::core::probe::{FileTracks, TrackDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioMode {
    /// Stream-copy the selected tracks.
    Include,
    /// Mix the selected tracks into one with `amerge`.
    Merge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSelection {
    All,
    None,
    Tracks(Vec<u32>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioDecision {
    /// The file has no audio tracks.
    Disabled,
    Select {
        mode: AudioMode,
        selection: TrackSelection,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionRecord {
    pub audio: AudioDecision,
    pub subtitle_track: Option<u32>,
    pub reencode: bool,
    pub preset: Option<Preset>,
    pub target_height: Option<u32>,
}

impl DecisionRecord {
    /// Copy of a cached record adjusted to the tracks another file really has.
    pub fn reconcile(&self, tracks: &FileTracks) -> DecisionRecord {
        let mut record = self.clone();

        if tracks.audio.is_empty() {
            record.audio = AudioDecision::Disabled;
        }

        if let Some(id) = record.subtitle_track {
            if !tracks.has_subtitle(id) {
                warn!(subtitle = id, "cached subtitle track not present, skipping burn-in");
                record.subtitle_track = None;
            }
        }

        record
    }
}

/// Where answers come from while collecting a [`DecisionRecord`].
pub trait DecisionSource {
    fn audio_mode(&mut self, tracks: &[TrackDescriptor]) -> Result<AudioMode>;
    fn audio_tracks(&mut self, mode: AudioMode) -> Result<TrackSelection>;
    /// `None` when nothing should be burned in.
    fn subtitle_track(&mut self, tracks: &[TrackDescriptor]) -> Result<Option<u32>>;
    fn reencode(&mut self) -> Result<bool>;
    /// Index into `presets`; only asked when there is more than one.
    fn preset(&mut self, presets: &[Preset]) -> Result<usize>;
    fn target_height(&mut self) -> Result<Option<u32>>;
    fn reuse_for_remaining(&mut self) -> Result<bool>;
}

/// Parse a space-separated list of track ids.
///
/// For [`AudioMode::Include`] an empty answer means every track and `-` means
/// none. For [`AudioMode::Merge`] an empty answer is an empty list.
pub fn parse_track_selection(mode: AudioMode, answer: &str) -> Result<TrackSelection> {
    let answer = answer.trim();
    match (mode, answer) {
        (AudioMode::Include, "") => return Ok(TrackSelection::All),
        (AudioMode::Include, "-") => return Ok(TrackSelection::None),
        _ => {}
    }

    let ids = answer
        .split_whitespace()
        .map(|token| {
            token
                .parse::<u32>()
                .map_err(|_| FfdropError::invalid_input(format!("'{token}' is not a track ID")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TrackSelection::Tracks(ids))
}

/// Ask `source` for everything needed to encode a file with `tracks`.
pub fn decide(
    tracks: &FileTracks,
    presets: &[Preset],
    source: &mut dyn DecisionSource,
) -> Result<DecisionRecord> {
    let audio = if tracks.audio.is_empty() {
        AudioDecision::Disabled
    } else {
        let mode = source.audio_mode(&tracks.audio)?;
        let selection = source.audio_tracks(mode)?;
        AudioDecision::Select { mode, selection }
    };

    let subtitle_track = if tracks.subtitles.is_empty() {
        None
    } else {
        source
            .subtitle_track(&tracks.subtitles)?
            .filter(|id| tracks.has_subtitle(*id))
    };

    // Burning in subtitles re-rasterizes the video.
    let reencode = subtitle_track.is_some() || source.reencode()?;

    let (preset, target_height) = if reencode {
        let preset = select_preset(presets, source)?;
        (Some(preset), source.target_height()?)
    } else {
        (None, None)
    };

    Ok(DecisionRecord {
        audio,
        subtitle_track,
        reencode,
        preset,
        target_height,
    })
}

fn select_preset(presets: &[Preset], source: &mut dyn DecisionSource) -> Result<Preset> {
    match presets {
        [] => Err(FfdropError::invalid_input("no encoding presets configured")),
        [only] => Ok(only.clone()),
        _ => {
            let index = source.preset(presets)?;
            presets.get(index).cloned().ok_or_else(|| {
                FfdropError::invalid_input(format!("preset {index} does not exist"))
            })
        }
    }
}

/// Collects decisions per file and remembers the first file's record.
pub struct DecisionCollector<'a> {
    presets: &'a [Preset],
    cached: Option<DecisionRecord>,
    reuse: bool,
}

impl<'a> DecisionCollector<'a> {
    pub fn new(presets: &'a [Preset]) -> Self {
        Self {
            presets,
            cached: None,
            reuse: false,
        }
    }

    pub fn collect(
        &mut self,
        tracks: &FileTracks,
        source: &mut dyn DecisionSource,
    ) -> Result<DecisionRecord> {
        if let Some(record) = self.reused() {
            debug!("reusing cached decisions");
            return Ok(record.clone());
        }

        let record = decide(tracks, self.presets, source)?;
        if self.cached.is_none() {
            self.cached = Some(record.clone());
        }
        Ok(record)
    }

    pub fn has_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// Reuse the cached record for every later file. No effect before a
    /// record has been cached.
    pub fn set_reuse(&mut self, reuse: bool) {
        self.reuse = reuse && self.cached.is_some();
    }

    pub fn reused(&self) -> Option<&DecisionRecord> {
        if self.reuse {
            self.cached.as_ref()
        } else {
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::test_fixtures::{make_test_tracks, track};
    use std::collections::VecDeque;

    /// Canned answers; asking for something not queued is an error.
    #[derive(Default)]
    pub(crate) struct Scripted {
        pub audio_modes: VecDeque<AudioMode>,
        pub audio_tracks: VecDeque<TrackSelection>,
        pub subtitles: VecDeque<Option<u32>>,
        pub reencode: VecDeque<bool>,
        pub presets: VecDeque<usize>,
        pub heights: VecDeque<Option<u32>>,
        pub reuse: VecDeque<bool>,
        pub asked: usize,
    }

    fn next<T>(queue: &mut VecDeque<T>, what: &str) -> Result<T> {
        queue
            .pop_front()
            .ok_or_else(|| FfdropError::invalid_input(format!("unexpected question: {what}")))
    }

    impl DecisionSource for Scripted {
        fn audio_mode(&mut self, _tracks: &[TrackDescriptor]) -> Result<AudioMode> {
            self.asked += 1;
            next(&mut self.audio_modes, "audio mode")
        }

        fn audio_tracks(&mut self, _mode: AudioMode) -> Result<TrackSelection> {
            self.asked += 1;
            next(&mut self.audio_tracks, "audio tracks")
        }

        fn subtitle_track(&mut self, _tracks: &[TrackDescriptor]) -> Result<Option<u32>> {
            self.asked += 1;
            next(&mut self.subtitles, "subtitle")
        }

        fn reencode(&mut self) -> Result<bool> {
            self.asked += 1;
            next(&mut self.reencode, "reencode")
        }

        fn preset(&mut self, _presets: &[Preset]) -> Result<usize> {
            self.asked += 1;
            next(&mut self.presets, "preset")
        }

        fn target_height(&mut self) -> Result<Option<u32>> {
            self.asked += 1;
            next(&mut self.heights, "height")
        }

        fn reuse_for_remaining(&mut self) -> Result<bool> {
            self.asked += 1;
            next(&mut self.reuse, "reuse")
        }
    }

    fn hevc() -> Preset {
        Preset {
            name: "HEVC".to_string(),
            codec: "libx265".to_string(),
            params: Default::default(),
        }
    }

    #[test]
    fn track_selection_parsing() {
        assert_eq!(
            parse_track_selection(AudioMode::Include, "").unwrap(),
            TrackSelection::All
        );
        assert_eq!(
            parse_track_selection(AudioMode::Include, " - ").unwrap(),
            TrackSelection::None
        );
        assert_eq!(
            parse_track_selection(AudioMode::Include, "2 0").unwrap(),
            TrackSelection::Tracks(vec![2, 0])
        );
        assert_eq!(
            parse_track_selection(AudioMode::Merge, "").unwrap(),
            TrackSelection::Tracks(vec![])
        );
        assert!(matches!(
            parse_track_selection(AudioMode::Merge, "-"),
            Err(FfdropError::InvalidUserInput { .. })
        ));
        assert!(parse_track_selection(AudioMode::Include, "1 two").is_err());
    }

    #[test]
    fn no_audio_tracks_skips_audio_questions() {
        let tracks = FileTracks::default();
        let mut source = Scripted {
            reencode: [false].into(),
            ..Default::default()
        };
        let record = decide(&tracks, &[Preset::default_x264()], &mut source).unwrap();
        assert_eq!(record.audio, AudioDecision::Disabled);
        assert_eq!(record.subtitle_track, None);
        assert!(!record.reencode);
        assert_eq!(record.preset, None);
        assert_eq!(source.asked, 1);
    }

    #[test]
    fn subtitle_burn_in_forces_reencode_without_asking() {
        let mut source = Scripted {
            audio_modes: [AudioMode::Include].into(),
            audio_tracks: [TrackSelection::All].into(),
            subtitles: [Some(0)].into(),
            heights: [None].into(),
            ..Default::default()
        };
        let record = decide(&make_test_tracks(), &[Preset::default_x264()], &mut source).unwrap();
        assert!(record.reencode);
        assert_eq!(record.subtitle_track, Some(0));
        // single preset chosen silently
        assert_eq!(record.preset, Some(Preset::default_x264()));
        assert!(source.reencode.is_empty());
    }

    #[test]
    fn unknown_subtitle_id_means_none() {
        let mut source = Scripted {
            audio_modes: [AudioMode::Include].into(),
            audio_tracks: [TrackSelection::None].into(),
            subtitles: [Some(7)].into(),
            reencode: [false].into(),
            ..Default::default()
        };
        let record = decide(&make_test_tracks(), &[Preset::default_x264()], &mut source).unwrap();
        assert_eq!(record.subtitle_track, None);
        assert!(!record.reencode);
    }

    #[test]
    fn preset_and_height_asked_when_reencoding() {
        let presets = [Preset::default_x264(), hevc()];
        let mut source = Scripted {
            audio_modes: [AudioMode::Merge].into(),
            audio_tracks: [TrackSelection::Tracks(vec![0, 1])].into(),
            subtitles: [None].into(),
            reencode: [true].into(),
            presets: [1].into(),
            heights: [Some(720)].into(),
            ..Default::default()
        };
        let record = decide(&make_test_tracks(), &presets, &mut source).unwrap();
        assert_eq!(record.preset, Some(hevc()));
        assert_eq!(record.target_height, Some(720));
        assert_eq!(
            record.audio,
            AudioDecision::Select {
                mode: AudioMode::Merge,
                selection: TrackSelection::Tracks(vec![0, 1]),
            }
        );
    }

    #[test]
    fn out_of_range_preset_is_invalid_input() {
        let presets = [Preset::default_x264(), hevc()];
        let mut source = Scripted {
            reencode: [true].into(),
            presets: [5].into(),
            ..Default::default()
        };
        let err = decide(&FileTracks::default(), &presets, &mut source).unwrap_err();
        assert!(matches!(err, FfdropError::InvalidUserInput { .. }));
    }

    #[test]
    fn cached_record_is_reused_without_prompts() {
        let presets = [Preset::default_x264()];
        let mut collector = DecisionCollector::new(&presets);
        let mut first = Scripted {
            audio_modes: [AudioMode::Include].into(),
            audio_tracks: [TrackSelection::Tracks(vec![1])].into(),
            subtitles: [Some(0)].into(),
            heights: [Some(1080)].into(),
            ..Default::default()
        };
        let record0 = collector.collect(&make_test_tracks(), &mut first).unwrap();
        assert!(collector.has_cached());

        collector.set_reuse(true);
        let mut silent = Scripted::default();
        let record1 = collector.collect(&make_test_tracks(), &mut silent).unwrap();

        assert_eq!(record0, record1);
        assert_eq!(silent.asked, 0);
    }

    #[test]
    fn without_reuse_each_file_is_asked_again() {
        let presets = [Preset::default_x264()];
        let mut collector = DecisionCollector::new(&presets);
        let tracks = FileTracks::default();

        let mut first = Scripted {
            reencode: [false].into(),
            ..Default::default()
        };
        collector.collect(&tracks, &mut first).unwrap();
        collector.set_reuse(false);

        let mut second = Scripted {
            reencode: [true].into(),
            heights: [None].into(),
            ..Default::default()
        };
        let record = collector.collect(&tracks, &mut second).unwrap();
        assert!(record.reencode);
        assert_eq!(second.asked, 2);
        // the cache still holds the first file's answers
        collector.set_reuse(true);
        assert_eq!(collector.reused().map(|r| r.reencode), Some(false));
    }

    #[test]
    fn reuse_needs_a_cached_record() {
        let presets = [Preset::default_x264()];
        let mut collector = DecisionCollector::new(&presets);
        collector.set_reuse(true);
        assert!(collector.reused().is_none());
    }

    #[test]
    fn reconcile_drops_what_the_file_lacks() {
        let record = DecisionRecord {
            audio: AudioDecision::Select {
                mode: AudioMode::Include,
                selection: TrackSelection::All,
            },
            subtitle_track: Some(1),
            reencode: true,
            preset: Some(Preset::default_x264()),
            target_height: None,
        };

        let sparse = FileTracks {
            audio: vec![],
            subtitles: vec![track(0, "Only", "eng")],
        };
        let adjusted = record.reconcile(&sparse);
        assert_eq!(adjusted.audio, AudioDecision::Disabled);
        assert_eq!(adjusted.subtitle_track, None);
        assert!(adjusted.reencode);

        let rich = FileTracks {
            audio: vec![track(0, "Main", "eng")],
            subtitles: vec![track(0, "A", "eng"), track(1, "B", "eng")],
        };
        assert_eq!(record.reconcile(&rich), record);
    }
}
