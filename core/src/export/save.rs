use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::CutError;

use super::Result;

/// Atomically write `bytes` to `dir/name`, creating `dir` if needed.
///
/// The data lands in a temp file inside `dir` first and is renamed over any existing file,
/// so a failed save never leaves a truncated output behind.
pub fn save_file(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|err| CutError::io(dir, err))?;
    let path = dir.join(name);

    let mut tmp = NamedTempFile::new_in(dir).map_err(|err| CutError::io(dir, err))?;
    tmp.write_all(bytes).map_err(|err| CutError::io(&path, err))?;
    tmp.flush().map_err(|err| CutError::io(&path, err))?;
    tmp.persist(&path).map_err(|err| CutError::io(&path, err.error))?;

    debug!(target: "export", path = %path.display(), bytes = bytes.len(), "saved file");
    Ok(path)
}
