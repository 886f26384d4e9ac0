//! Note repository: a flat directory of files treated as markdown notes.
//!
//! The repository holds no state besides the directory path. Every call to
//! [`NoteRepository::list`] performs a fresh listing, and the returned
//! collection replaces whatever the caller held before.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{NoteError, Result};

/// Timestamp format used in the note table.
pub const MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A single file in the notes directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// File name, unique within the directory
    pub name: String,
    /// Full path to the file
    pub path: PathBuf,
    /// Last modification time
    pub modified: DateTime<Local>,
}

impl Note {
    /// Modification time formatted for display.
    pub fn modified_label(&self) -> String {
        self.modified.format(MODIFIED_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRepository {
    dir: PathBuf,
}

impl NoteRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List every non-directory entry, sorted by file name.
    ///
    /// Entries are not filtered by extension.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::Io`] if the directory cannot be read or an
    /// entry's metadata cannot be queried.
    pub fn list(&self) -> Result<Vec<Note>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| NoteError::io(&self.dir, e))?;

        let mut notes = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| NoteError::io(&self.dir, e))?;
            let path = entry.path();
            // Follow symlinks so a link to a directory is skipped too.
            let metadata = std::fs::metadata(&path).map_err(|e| NoteError::io(&path, e))?;
            if metadata.is_dir() {
                continue;
            }
            let modified = metadata.modified().map_err(|e| NoteError::io(&path, e))?;
            notes.push(Note {
                name: entry.file_name().to_string_lossy().to_string(),
                path,
                modified: DateTime::<Local>::from(modified),
            });
        }

        notes.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::info!(dir = %self.dir.display(), count = notes.len(), "listed notes");
        Ok(notes)
    }

    /// Path for a fresh note: `untitled.md`, then `untitled-2.md`, and so on.
    pub fn new_note_path(&self) -> PathBuf {
        let first = self.dir.join("untitled.md");
        if !first.exists() {
            return first;
        }
        (2..)
            .map(|n| self.dir.join(format!("untitled-{n}.md")))
            .find(|candidate| !candidate.exists())
            .unwrap_or(first)
    }
}

/// Read a note's content as text.
///
/// # Errors
///
/// Returns [`NoteError::Io`] if the file cannot be read, and
/// [`NoteError::Render`] if it holds binary or non-UTF-8 data.
pub fn read_note(note: &Note) -> Result<String> {
    let bytes = std::fs::read(&note.path).map_err(|e| NoteError::io(&note.path, e))?;
    if is_binary(&bytes) {
        return Err(NoteError::render(&note.name, "file contains binary data"));
    }
    String::from_utf8(bytes)
        .map_err(|e| NoteError::render(&note.name, format!("file is not valid UTF-8: {e}")))
}

/// Heuristic binary check: a NUL byte within the first 8 KiB.
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(8 * 1024).any(|&b| b == 0)
}
