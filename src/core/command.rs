use std::path::{Path, PathBuf};

use crate::core::compose::{compose, escape_filter_path};
use crate::core::config::Settings;
use crate::core::decision::DecisionRecord;

/// One ffmpeg invocation for one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub input: PathBuf,
    pub output: PathBuf,
    pub video_args: Vec<String>,
    pub audio_args: Vec<String>,
    pub filter_graph: Option<String>,
}

impl CommandSpec {
    pub fn build(input: &Path, decision: &DecisionRecord, settings: &Settings) -> Self {
        let composition = compose(
            decision,
            &escape_filter_path(input),
            &settings.merged_audio_codec,
        );
        Self {
            input: input.to_path_buf(),
            output: settings.output_path(input),
            video_args: composition.video_args,
            audio_args: composition.audio_args,
            filter_graph: composition.filter_graph,
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-i".to_string(),
            self.input.to_string_lossy().to_string(),
        ];

        if let Some(graph) = &self.filter_graph {
            args.push("-filter_complex".to_string());
            args.push(graph.clone());
        }

        args.extend(self.video_args.iter().cloned());
        args.extend(self.audio_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());

        args
    }

    /// Shell-quoted command line, for logs and copy-paste.
    pub fn command_line(&self, program: &Path) -> String {
        let mut words = vec![program.to_string_lossy().to_string()];
        words.extend(self.to_args());
        shell_words::join(words)
    }
}
