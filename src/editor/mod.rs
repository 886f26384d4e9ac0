//! External editor handoff.
//!
//! The interactive session gives the terminal to the user's editor, blocks
//! until it exits, then takes the terminal back. [`TerminalSuspend`] makes
//! the restore unconditional: it runs on the explicit [`TerminalSuspend::resume`]
//! or, failing that, when the guard drops.

use std::fmt;
use std::io::stdout;
use std::path::Path;
use std::process::{Command, ExitStatus};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};

use crate::error::{NoteError, Result};

/// An editor program plus its leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCommand {
    program: String,
    args: Vec<String>,
}

impl EditorCommand {
    /// Split a command line on whitespace. Returns `None` when blank.
    ///
    /// No shell quoting is interpreted.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(ToString::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Build the process invocation with `path` as the final argument.
    pub fn command_for(&self, path: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(path);
        command
    }

    /// Run the editor on `path` with inherited stdio and wait for it.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::SubprocessSpawn`] if the process cannot start.
    pub fn run(&self, path: &Path) -> Result<ExitStatus> {
        tracing::info!(command = %self, path = %path.display(), "launching editor");
        let status = self
            .command_for(path)
            .status()
            .map_err(|source| NoteError::SubprocessSpawn {
                command: self.to_string(),
                source,
            })?;
        tracing::info!(%status, "editor exited");
        Ok(status)
    }
}

impl fmt::Display for EditorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Something that can edit a file and report how it went.
pub trait Launcher {
    /// Edit `path`, blocking until done.
    ///
    /// # Errors
    ///
    /// Returns a subprocess error when the editor cannot start or exits
    /// unsuccessfully, and [`NoteError::Terminal`] if the terminal cannot be
    /// handed over or restored.
    fn edit(&mut self, path: &Path) -> Result<()>;
}

/// Runs the configured editor in the foreground terminal.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: EditorCommand,
    mouse_capture: bool,
}

impl ExternalEditor {
    pub const fn new(command: EditorCommand, mouse_capture: bool) -> Self {
        Self {
            command,
            mouse_capture,
        }
    }
}

impl Launcher for ExternalEditor {
    fn edit(&mut self, path: &Path) -> Result<()> {
        let suspend = TerminalSuspend::begin(self.mouse_capture)?;
        let outcome = self.command.run(path);
        suspend.resume()?;

        let status = outcome?;
        if status.success() {
            Ok(())
        } else {
            Err(NoteError::SubprocessExit {
                command: self.command.to_string(),
                status,
            })
        }
    }
}

/// Scoped release of the terminal to a child process.
///
/// Creating the guard leaves the alternate screen and raw mode; dropping or
/// resuming it restores both.
#[derive(Debug)]
pub struct TerminalSuspend {
    mouse_capture: bool,
    restored: bool,
}

impl TerminalSuspend {
    /// Hand the terminal back to cooked mode on the main screen.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::Terminal`] if any mode switch fails. Whatever was
    /// already switched is restored before returning.
    pub fn begin(mouse_capture: bool) -> Result<Self> {
        let guard = Self {
            mouse_capture,
            restored: false,
        };
        if mouse_capture {
            execute!(stdout(), DisableMouseCapture).map_err(NoteError::Terminal)?;
        }
        execute!(stdout(), LeaveAlternateScreen).map_err(NoteError::Terminal)?;
        disable_raw_mode().map_err(NoteError::Terminal)?;
        Ok(guard)
    }

    /// Take the terminal back for the interactive session.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::Terminal`] if any mode switch fails.
    pub fn resume(mut self) -> Result<()> {
        self.restored = true;
        self.restore()
    }

    fn restore(&self) -> Result<()> {
        enable_raw_mode().map_err(NoteError::Terminal)?;
        execute!(stdout(), EnterAlternateScreen).map_err(NoteError::Terminal)?;
        if self.mouse_capture {
            execute!(stdout(), EnableMouseCapture).map_err(NoteError::Terminal)?;
        }
        Ok(())
    }
}

impl Drop for TerminalSuspend {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(err) = self.restore() {
            tracing::error!(error = %err, "failed to restore terminal after editor session");
        }
    }
}
