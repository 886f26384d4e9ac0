//! Error taxonomy shared by every layer of the browser.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Everything that can go wrong while browsing notes.
///
/// `Io`, `Render` and `Terminal` are fatal to the interactive session. The
/// two subprocess variants are the only ones the interaction loop recovers
/// from.
#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    /// Missing or invalid startup setting.
    #[error("configuration error: {0}")]
    Config(String),

    /// Listing the notes directory or reading a note failed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The markdown renderer could not produce output for a note.
    #[error("failed to render {name}: {reason}")]
    Render { name: String, reason: String },

    /// Switching the terminal in or out of the interactive session failed.
    #[error("terminal handoff failed: {0}")]
    Terminal(#[source] std::io::Error),

    /// The external editor could not be started.
    #[error("failed to launch editor `{command}`: {source}")]
    SubprocessSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The external editor ran but exited unsuccessfully.
    #[error("editor `{command}` exited with {status}")]
    SubprocessExit { command: String, status: ExitStatus },
}

impl NoteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn render(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Render {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the interaction loop can continue after this error.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::SubprocessSpawn { .. } | Self::SubprocessExit { .. }
        )
    }
}

pub type Result<T, E = NoteError> = std::result::Result<T, E>;
