//! Canon file discovery and (de)serialization.

use crate::models::ErrorCanon;
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extension of canon records.
pub const CANON_EXTENSION: &str = "json";

/// Returns every `*.json` file under `root`, sorted by path.
///
/// The ordering is the load order of the corpus and therefore the tie-break
/// order of every stable ranking.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if `root` is not a directory or a
/// directory entry cannot be read.
pub fn discover_canon_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::operation(
            "discover_canon_files",
            format!("data directory not found: {}", root.display()),
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| Error::operation("discover_canon_files", e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|s| s.to_str()) == Some(CANON_EXTENSION) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Reads and parses a single canon file.
///
/// # Errors
///
/// Returns [`Error::Parse`] naming `path` if the file cannot be read, is not
/// valid JSON, or does not describe a well-formed canon.
pub fn read_canon(path: &Path) -> Result<ErrorCanon> {
    let content = fs::read_to_string(path).map_err(|e| Error::Parse {
        path: path.to_path_buf(),
        cause: e.to_string(),
    })?;
    parse_canon(path, &content)
}

/// Parses canon JSON that was read from `path`.
///
/// # Errors
///
/// Returns [`Error::Parse`] naming `path` on malformed input.
pub fn parse_canon(path: &Path, content: &str) -> Result<ErrorCanon> {
    serde_json::from_str(content).map_err(|e| Error::Parse {
        path: path.to_path_buf(),
        cause: e.to_string(),
    })
}

/// Writes a canon as pretty-printed JSON, creating parent directories.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] on serialization or I/O failure.
pub fn write_canon(path: &Path, canon: &ErrorCanon) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::operation("write_canon", e))?;
    }
    let mut json =
        serde_json::to_string_pretty(canon).map_err(|e| Error::operation("write_canon", e))?;
    json.push('\n');
    fs::write(path, json).map_err(|e| Error::operation("write_canon", e))
}

/// Conventional on-disk location of a canon under `root`: `root/<id>.json`.
///
/// The extension is appended, never substituted: environment tags such as
/// `py3.11` may contain periods.
#[must_use]
pub fn canon_path(root: &Path, canon: &ErrorCanon) -> PathBuf {
    let mut path = root.to_path_buf();
    let mut segments = canon.id.as_str().split('/').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_some() {
            path.push(segment);
        } else {
            path.push(format!("{segment}.{CANON_EXTENSION}"));
        }
    }
    path
}
