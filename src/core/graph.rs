//! Typed builder for `-filter_complex` expressions.
//!
//! A graph holds at most one video chain and one audio merge. The video chain
//! has a single live output, `[vout]`. Appending a stage renames the previous
//! stage's output to an intermediate label and reads from it, so the rendered
//! graph never has dangling or duplicate named outputs.

use std::fmt;

const VIDEO_OUT: &str = "vout";
const AUDIO_OUT: &str = "aout";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pad {
    /// A stream of the first input, e.g. `0:v` or `0:a:2`.
    Stream(String),
    /// A named link between fragments.
    Label(String),
}

impl fmt::Display for Pad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pad::Stream(spec) => write!(f, "[{spec}]"),
            Pad::Label(name) => write!(f, "[{name}]"),
        }
    }
}

#[derive(Debug, Clone)]
struct Fragment {
    inputs: Vec<Pad>,
    filter: String,
    output: Pad,
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for input in &self.inputs {
            write!(f, "{input}")?;
        }
        write!(f, "{}{}", self.filter, self.output)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterGraph {
    fragments: Vec<Fragment>,
    /// Fragment currently writing `[vout]`.
    video_head: Option<usize>,
    video_stages: usize,
    /// Fragment writing `[aout]`.
    audio_head: Option<usize>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single-input filter to the video chain.
    ///
    /// The first stage reads `[0:v]`.
    pub fn video(&mut self, filter: impl Into<String>) {
        let input = match self.video_head {
            Some(index) => {
                let label = intermediate_label(self.video_stages);
                self.fragments[index].output = Pad::Label(label.clone());
                Pad::Label(label)
            }
            None => Pad::Stream("0:v".to_string()),
        };
        self.video_head = Some(self.push(vec![input], filter.into(), VIDEO_OUT));
        self.video_stages += 1;
    }

    /// Merge audio tracks of the input into `[aout]`.
    pub fn merge_audio(&mut self, tracks: &[u32]) {
        debug_assert!(self.audio_head.is_none(), "audio already merged");
        let inputs = tracks
            .iter()
            .map(|id| Pad::Stream(format!("0:a:{id}")))
            .collect();
        let filter = format!("amerge=inputs={}", tracks.len());
        self.audio_head = Some(self.push(inputs, filter, AUDIO_OUT));
    }

    /// `[vout]` once the video chain has a stage.
    pub fn video_output(&self) -> Option<String> {
        self.head_output(self.video_head)
    }

    /// `[aout]` once audio has been merged.
    pub fn audio_output(&self) -> Option<String> {
        self.head_output(self.audio_head)
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Fragments joined with `;` in the order they were added.
    pub fn render(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(
            self.fragments
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(";"),
        )
    }

    fn head_output(&self, head: Option<usize>) -> Option<String> {
        head.map(|index| self.fragments[index].output.to_string())
    }

    fn push(&mut self, inputs: Vec<Pad>, filter: String, output: &str) -> usize {
        self.fragments.push(Fragment {
            inputs,
            filter,
            output: Pad::Label(output.to_string()),
        });
        self.fragments.len() - 1
    }
}

/// `vtmp` after the first stage, then `vtmp2`, `vtmp3`, ...
fn intermediate_label(stages: usize) -> String {
    if stages <= 1 {
        "vtmp".to_string()
    } else {
        format!("vtmp{stages}")
    }
}
