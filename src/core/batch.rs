use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::command::CommandSpec;
use crate::core::config::Settings;
use crate::core::decision::{DecisionCollector, DecisionSource};
use crate::core::error::{FfdropError, Result};
use crate::core::event::EncoderEvent;
use crate::core::formatter::format_plan;
use crate::core::probe::{FileTracks, Inspector};
use crate::core::runner::{Encoded, Encoder};

/// Receives per-file status while a batch runs.
pub trait BatchReporter {
    fn started(&mut self, path: &Path, index: usize, total: usize);
    fn reusing(&mut self, path: &Path);
    fn plan(&mut self, lines: &[String]);
    fn encoder_event(&mut self, event: EncoderEvent);
    fn finished(&mut self, path: &Path, result: &Result<Encoded>);
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, FfdropError)>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Drives files one at a time through probe, decisions, composition and
/// encoding. Owns the decision cache for the whole batch.
pub struct BatchRunner<'a> {
    settings: &'a Settings,
    inspector: Inspector,
    encoder: Encoder,
    decisions: DecisionCollector<'a>,
    reuse_asked: bool,
}

impl<'a> BatchRunner<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            inspector: Inspector::new(settings.ffprobe.clone()),
            encoder: Encoder::new(settings.ffmpeg.clone()),
            decisions: DecisionCollector::new(settings.presets()),
            reuse_asked: false,
        }
    }

    /// A failing file never stops the batch.
    pub fn run(
        &mut self,
        files: &[PathBuf],
        source: &mut dyn DecisionSource,
        reporter: &mut dyn BatchReporter,
    ) -> BatchReport {
        let mut report = BatchReport::default();

        for (index, path) in files.iter().enumerate() {
            reporter.started(path, index, files.len());
            let result = self.process(path, source, reporter);
            reporter.finished(path, &result);

            match result {
                Ok(encoded) => {
                    info!(output = %encoded.output.display(), "file done");
                    report.succeeded.push(path.clone());
                }
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "file failed");
                    report.failed.push((path.clone(), err));
                }
            }

            let remaining = files.len() - index - 1;
            if remaining > 0 && !self.reuse_asked && self.decisions.has_cached() {
                self.reuse_asked = true;
                match source.reuse_for_remaining() {
                    Ok(reuse) => self.decisions.set_reuse(reuse),
                    Err(err) => warn!(error = %err, "asking to reuse settings failed"),
                }
            }
        }

        report
    }

    fn process(
        &mut self,
        path: &Path,
        source: &mut dyn DecisionSource,
        reporter: &mut dyn BatchReporter,
    ) -> Result<Encoded> {
        if !path.exists() {
            return Err(FfdropError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_file() {
            return Err(FfdropError::NotAFile {
                path: path.to_path_buf(),
            });
        }

        self.inspector.ensure_available()?;
        if !self.inspector.is_video_file(path) {
            return Err(FfdropError::NotAVideoFile {
                path: path.to_path_buf(),
            });
        }

        let probe = self.inspector.probe(path)?;
        let tracks = FileTracks::from_probe(&probe);
        debug!(
            audio = tracks.audio.len(),
            subtitles = tracks.subtitles.len(),
            "probed tracks"
        );

        let cached = self
            .decisions
            .reused()
            .map(|record| record.reconcile(&tracks));
        let decision = match cached {
            Some(record) => {
                reporter.reusing(path);
                record
            }
            None => self.decisions.collect(&tracks, source)?,
        };

        let spec = CommandSpec::build(path, &decision, self.settings);
        reporter.plan(&format_plan(&spec, &decision, &tracks));
        self.encoder
            .run(&spec, |event| reporter.encoder_event(event))
    }
}
