use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::core::command::CommandSpec;
use crate::core::error::{FfdropError, Result};
use crate::core::event::{classify_log_line, EncoderEvent, LogLevel};
use crate::core::progress::parse_progress_line;
use crate::core::summary::{parse_summary_line, EncodeSummary};
use crate::core::tools;

#[derive(Debug, Clone)]
pub struct Encoded {
    pub output: PathBuf,
    pub elapsed: Duration,
    pub summary: Option<EncodeSummary>,
}

pub struct Encoder {
    program: PathBuf,
}

impl Encoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run ffmpeg to completion, reporting stderr activity to `on_event`.
    ///
    /// stdin stays attached to the terminal so ffmpeg's overwrite prompt can
    /// be answered. Partial output is left in place on failure.
    pub fn run(
        &self,
        spec: &CommandSpec,
        mut on_event: impl FnMut(EncoderEvent),
    ) -> Result<Encoded> {
        debug!(command = %spec.command_line(&self.program), "starting ffmpeg");
        let started = Instant::now();

        let mut child = Command::new(&self.program)
            .args(spec.to_args())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| tools::spawn_error(&self.program, e))?;

        let stderr = child.stderr.take().ok_or_else(|| FfdropError::EncodeFailed {
            exit_code: None,
            stderr: "failed to capture ffmpeg stderr".to_string(),
        })?;

        let mut diagnostics = String::new();
        let mut summary = None;

        read_stderr(stderr, |line| match classify_log_line(line) {
            LogLevel::Progress => {
                if let Some(update) = parse_progress_line(line) {
                    on_event(EncoderEvent::Progress(update));
                }
            }
            LogLevel::Summary => {
                if let Some(parsed) = parse_summary_line(line) {
                    summary = Some(parsed.clone());
                    on_event(EncoderEvent::Summary(parsed));
                }
            }
            level => {
                trace!(target: "ffmpeg", "{line}");
                diagnostics.push_str(line);
                diagnostics.push('\n');
                match level {
                    LogLevel::Warning => on_event(EncoderEvent::Warning(line.to_string())),
                    LogLevel::Error => on_event(EncoderEvent::Error(line.to_string())),
                    LogLevel::Prompt => on_event(EncoderEvent::Prompt(line.to_string())),
                    _ => {}
                }
            }
        });

        let status = child.wait()?;
        let elapsed = started.elapsed();
        debug!(%status, elapsed_ms = elapsed.as_millis() as u64, "ffmpeg exited");

        if status.success() {
            Ok(Encoded {
                output: spec.output.clone(),
                elapsed,
                summary,
            })
        } else {
            Err(FfdropError::EncodeFailed {
                exit_code: status.code(),
                stderr: diagnostics.trim_end().to_string(),
            })
        }
    }
}

/// Split ffmpeg's stderr on `\r` and `\n`.
///
/// The overwrite prompt has no line terminator, so a buffer ending in
/// `[y/N] ` is flushed as soon as it is seen.
fn read_stderr<R: Read>(reader: R, mut handle: impl FnMut(&str)) {
    let mut reader = BufReader::new(reader);
    let mut line_buf: Vec<u8> = Vec::new();
    let mut byte = [0u8; 1];

    loop {
        match reader.read(&mut byte) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        match byte[0] {
            b'\r' | b'\n' => flush_line(&mut line_buf, &mut handle),
            other => {
                line_buf.push(other);
                if other == b' ' && line_buf.ends_with(b"[y/N] ") {
                    flush_line(&mut line_buf, &mut handle);
                }
            }
        }
    }

    flush_line(&mut line_buf, &mut handle);
}

fn flush_line(line_buf: &mut Vec<u8>, handle: &mut impl FnMut(&str)) {
    if line_buf.is_empty() {
        return;
    }
    let line = String::from_utf8_lossy(line_buf).trim().to_string();
    line_buf.clear();
    if !line.is_empty() {
        handle(&line);
    }
}
