//! Lookup of the external ffprobe/ffmpeg executables.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::error::{FfdropError, Result};

/// Resolve a tool name against `PATH`.
///
/// Falls back to the bare name when the lookup fails; each file that needs the
/// tool then reports [`FfdropError::ToolMissing`].
pub fn resolve(name: &str) -> PathBuf {
    match which::which(name) {
        Ok(path) => {
            debug!(tool = name, path = %path.display(), "resolved tool");
            path
        }
        Err(err) => {
            warn!(tool = name, error = %err, "tool not found in PATH");
            PathBuf::from(name)
        }
    }
}

/// Require that a program is runnable, returning its full path.
pub fn require(program: &Path) -> Result<PathBuf> {
    which::which(program).map_err(|_| FfdropError::tool_missing(display_name(program)))
}

/// Map a spawn failure to the error the rest of the crate expects.
pub fn spawn_error(program: &Path, err: io::Error) -> FfdropError {
    if err.kind() == io::ErrorKind::NotFound {
        FfdropError::tool_missing(display_name(program))
    } else {
        FfdropError::Io(err)
    }
}

pub fn display_name(program: &Path) -> String {
    program
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| program.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_falls_back_to_bare_name() {
        let path = resolve("nonexistent_tool_12345");
        assert_eq!(path, PathBuf::from("nonexistent_tool_12345"));
    }

    #[test]
    fn require_reports_missing_tool() {
        let err = require(Path::new("nonexistent_tool_12345")).unwrap_err();
        assert!(matches!(
            err,
            FfdropError::ToolMissing { ref tool } if tool == "nonexistent_tool_12345"
        ));
    }

    #[test]
    fn spawn_not_found_is_tool_missing() {
        let err = spawn_error(
            Path::new("/opt/bin/ffprobe"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(matches!(err, FfdropError::ToolMissing { ref tool } if tool == "ffprobe"));

        let err = spawn_error(
            Path::new("ffmpeg"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, FfdropError::Io(_)));
    }

    #[cfg(unix)]
    #[test]
    fn require_finds_shell() {
        assert!(require(Path::new("sh")).is_ok());
    }
}
