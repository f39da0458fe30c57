use std::path::{Path, PathBuf};

use crate::core::probe::{FileTracks, TrackDescriptor};

pub fn track(id: u32, title: &str, language: &str) -> TrackDescriptor {
    TrackDescriptor {
        id,
        title: title.to_string(),
        language: language.to_string(),
    }
}

/// Two audio tracks and one subtitle track.
pub fn make_test_tracks() -> FileTracks {
    FileTracks {
        audio: vec![track(0, "Main", "eng"), track(1, "Commentary", "eng")],
        subtitles: vec![track(0, "Full", "eng")],
    }
}

/// Write an executable shell script standing in for ffprobe or ffmpeg.
#[cfg(unix)]
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
