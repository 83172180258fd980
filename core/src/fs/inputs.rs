//! Turn command-line paths into ordered tiling inputs.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::codec::format::{guess_mime, is_accepted_path};
use crate::error::CutError;
use crate::pipeline::SourceInput;

use super::{Result, order};

/// Expand `paths` into the files to cut, in order.
///
/// Files are kept as given, whatever their extension, so the format gate can reject them
/// later with a proper message. Directories expand to their visible JPEG and PNG files in
/// natural name order; subdirectories are not descended into.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        let metadata = fs::metadata(path).map_err(|err| CutError::io(path, err))?;
        if metadata.is_dir() {
            files.extend(list_directory(path)?);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

/// Read one file as an upload, with its MIME type guessed from the extension.
pub fn read_input(path: &Path) -> Result<SourceInput> {
    let bytes = fs::read(path).map_err(|err| CutError::io(path, err))?;
    let name = path.file_name().and_then(OsStr::to_str).unwrap_or("image").to_string();
    debug!(target: "fs", path = %path.display(), bytes = bytes.len(), "read input");
    Ok(SourceInput::new(name, guess_mime(path), bytes))
}

fn list_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|err| CutError::io(dir, err))? {
        let entry = entry.map_err(|err| CutError::io(dir, err))?;
        let path = entry.path();
        let is_file = entry.file_type().map(|kind| kind.is_file()).unwrap_or(false);
        if is_file && !is_hidden(&path) && is_accepted_path(&path) {
            entries.push(path);
        }
    }

    entries.sort_by(|a, b| order::natural_cmp(&file_name(a), &file_name(b)));
    Ok(entries)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name().and_then(OsStr::to_str).is_some_and(|name| name.starts_with('.'))
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
}
