mod cli;
mod core;
mod prompt;
mod terminal;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::core::batch::BatchRunner;
use crate::core::config::Settings;
use crate::prompt::Prompter;
use crate::terminal::ConsoleReporter;

fn main() {
    init_logging();
    let cli = Cli::parse();

    if cli.files.is_empty() {
        println!("Usage: Drop video files onto this program or provide them as arguments");
        return;
    }

    let settings = Settings::load();
    debug!(presets = settings.presets().len(), "settings loaded");

    // The prompter holds the stdin lock; release it before the final wait.
    let report = {
        let mut prompter = Prompter::stdio();
        let mut reporter = ConsoleReporter::default();
        BatchRunner::new(&settings).run(&cli.files, &mut prompter, &mut reporter)
    };

    if let Err(err) = terminal::wait_for_keypress("\nPress any key to exit...") {
        debug!(error = %err, "waiting for keypress failed");
    }

    if report.has_failures() {
        std::process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
