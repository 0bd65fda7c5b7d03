//! Scratch directories for file-backed tests.

use std::path::PathBuf;

/// A per-process path under the system temp directory. Not created.
pub(crate) fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ronda-data-{}-{name}", std::process::id()))
}
