use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::core::config::Preset;
use crate::core::decision::{parse_track_selection, AudioMode, DecisionSource, TrackSelection};
use crate::core::error::{FfdropError, Result};
use crate::core::probe::TrackDescriptor;

/// Asks a human on a line-based terminal.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Trimmed answer; end of input is an error so loops cannot spin.
    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        let bytes_read = self.input.read_line(&mut line)?;
        if bytes_read == 0 {
            return Err(FfdropError::InputClosed);
        }
        Ok(line.trim().to_string())
    }

    fn list_tracks(&mut self, heading: &str, tracks: &[TrackDescriptor]) -> Result<()> {
        self.say(heading)?;
        for track in tracks {
            self.say(&track.to_string())?;
        }
        Ok(())
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> DecisionSource for Prompter<R, W> {
    fn audio_mode(&mut self, tracks: &[TrackDescriptor]) -> Result<AudioMode> {
        self.list_tracks("\nAvailable audio tracks:", tracks)?;
        self.say("\nHow would you like to handle audio tracks?")?;
        self.say("[1] Include specific tracks [default]")?;
        self.say("[2] Merge specific tracks")?;

        loop {
            match self.ask("\nEnter your choice (1-2): ")?.as_str() {
                "" | "1" => return Ok(AudioMode::Include),
                "2" => return Ok(AudioMode::Merge),
                _ => self.say("Invalid choice, please try again")?,
            }
        }
    }

    fn audio_tracks(&mut self, mode: AudioMode) -> Result<TrackSelection> {
        let question = match mode {
            AudioMode::Include => {
                "\nEnter space-separated track IDs to include (empty=all, '-'=none): "
            }
            AudioMode::Merge => "\nEnter space-separated track IDs to merge: ",
        };

        loop {
            let answer = self.ask(question)?;
            match parse_track_selection(mode, &answer) {
                Ok(selection) => return Ok(selection),
                Err(err) => self.say(&format!("{err}, please try again"))?,
            }
        }
    }

    fn subtitle_track(&mut self, tracks: &[TrackDescriptor]) -> Result<Option<u32>> {
        self.list_tracks("\nAvailable subtitle tracks:", tracks)?;
        let answer = self.ask("\nEnter subtitle track ID to burn into video (empty=none): ")?;
        if answer.is_empty() {
            return Ok(None);
        }

        match answer.parse::<u32>() {
            Ok(id) if tracks.iter().any(|track| track.id == id) => Ok(Some(id)),
            _ => {
                self.say("Invalid subtitle track ID, proceeding without subtitles")?;
                Ok(None)
            }
        }
    }

    fn reencode(&mut self) -> Result<bool> {
        let answer = self.ask("\nDo you want to reencode the video? (y/N): ")?;
        Ok(answer.eq_ignore_ascii_case("y"))
    }

    fn preset(&mut self, presets: &[Preset]) -> Result<usize> {
        self.say("\nAvailable encoding presets:")?;
        for (index, preset) in presets.iter().enumerate() {
            self.say(&format!("[{index}] {}", preset.describe()))?;
        }

        loop {
            let answer = self.ask("\nSelect encoding preset [0]: ")?;
            let answer = if answer.is_empty() { "0" } else { answer.as_str() };
            match answer.parse::<usize>() {
                Ok(index) if index < presets.len() => return Ok(index),
                _ => self.say("Invalid choice, please try again")?,
            }
        }
    }

    fn target_height(&mut self) -> Result<Option<u32>> {
        let answer = self.ask(
            "\nEnter target vertical resolution (720, 1080, etc.) or leave empty to keep original: ",
        )?;
        Ok(answer.parse::<u32>().ok().filter(|height| *height > 0))
    }

    fn reuse_for_remaining(&mut self) -> Result<bool> {
        self.say("\nMultiple files detected.")?;
        let answer =
            self.ask("Do you want to use the same settings for all remaining files? (y/N): ")?;
        Ok(answer.eq_ignore_ascii_case("y"))
    }
}
