use std::io::{self, IsTerminal, Write};
use std::path::Path;

use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::queue;
use crossterm::style::{Print, Stylize};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType};
use tracing::{debug, warn};

use crate::core::batch::BatchReporter;
use crate::core::error::Result;
use crate::core::event::EncoderEvent;
use crate::core::formatter::{format_duration, format_progress_line, format_summary_line};
use crate::core::runner::Encoded;

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Keep a drag-and-drop launched window open until the user reacts.
pub fn wait_for_keypress(message: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{message}")?;
    stdout.flush()?;

    if io::stdin().is_terminal() {
        let guard = RawModeGuard::enter()?;
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    break;
                }
            }
        }
        drop(guard);
        writeln!(stdout)?;
    } else {
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
    }

    Ok(())
}

pub fn success(message: &str) {
    println!("{}", message.green());
}

pub fn failure(message: &str) {
    println!("{}", message.red());
}

pub fn notice(message: &str) {
    println!("{}", message.yellow());
}

pub fn separator() {
    println!("\n{}\n", "=".repeat(50));
}

/// Renders encoder events as one self-overwriting status line.
#[derive(Debug, Default)]
pub struct ProgressDisplay {
    active: bool,
}

impl ProgressDisplay {
    pub fn handle(&mut self, event: EncoderEvent) {
        match event {
            EncoderEvent::Progress(update) => {
                if let Some(line) = format_progress_line(&update) {
                    let mut stdout = io::stdout();
                    let _ = queue!(
                        stdout,
                        MoveToColumn(0),
                        Clear(ClearType::CurrentLine),
                        Print(line)
                    );
                    let _ = stdout.flush();
                    self.active = true;
                }
            }
            EncoderEvent::Summary(_) => self.finish(),
            EncoderEvent::Warning(line) => warn!(target: "ffmpeg", "{line}"),
            EncoderEvent::Error(line) => debug!(target: "ffmpeg", "{line}"),
            EncoderEvent::Prompt(text) => {
                self.finish();
                let mut stdout = io::stdout();
                let _ = write!(stdout, "{} ", text.yellow());
                let _ = stdout.flush();
            }
        }
    }

    /// Move off the status line.
    pub fn finish(&mut self) {
        if self.active {
            println!();
            self.active = false;
        }
    }
}

/// Per-file status on stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    progress: ProgressDisplay,
}

impl BatchReporter for ConsoleReporter {
    fn started(&mut self, path: &Path, index: usize, total: usize) {
        println!("Processing file {}/{total}: {}", index + 1, path.display());
    }

    fn reusing(&mut self, path: &Path) {
        notice(&format!("\nProcessing {} with same settings...", path.display()));
    }

    fn plan(&mut self, lines: &[String]) {
        println!();
        for line in lines {
            println!("{line}");
        }
        println!();
    }

    fn encoder_event(&mut self, event: EncoderEvent) {
        self.progress.handle(event);
    }

    fn finished(&mut self, path: &Path, result: &Result<Encoded>) {
        self.progress.finish();
        match result {
            Ok(encoded) => {
                success("\nEncoding completed successfully!");
                match &encoded.summary {
                    Some(summary) => println!("{}", format_summary_line(summary, encoded.elapsed)),
                    None => println!("Elapsed: {}", format_duration(encoded.elapsed)),
                }
            }
            Err(err) => failure(&format!("\nError processing {}: {err}", path.display())),
        }
        separator();
    }
}
