use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "ffdrop",
    version,
    about = "Drop video files here to remux or reencode them with ffmpeg"
)]
pub struct Cli {
    /// Video files to process, in order
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}
