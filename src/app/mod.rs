//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{DetailState, Geometry, ListState, Model, ToastLevel, ViewState};
pub use update::{EditorOutcome, Message, update};

use crate::config::Config;
use crate::editor::{ExternalEditor, Launcher};
use crate::error::Result;
use crate::notes::NoteRepository;

/// Main application struct that owns the configuration and the editor
/// launcher, and runs the event loop.
pub struct App {
    config: Config,
    launcher: Box<dyn Launcher>,
}

impl App {
    /// Create an application that edits with the configured external editor.
    pub fn new(config: Config) -> Self {
        let launcher = ExternalEditor::new(config.editor.clone(), config.mouse);
        Self {
            config,
            launcher: Box::new(launcher),
        }
    }

    /// Replace the editor launcher.
    #[must_use]
    pub fn with_launcher(mut self, launcher: Box<dyn Launcher>) -> Self {
        self.launcher = launcher;
        self
    }

    /// List the notes directory and build the starting model.
    ///
    /// # Errors
    ///
    /// Returns the listing error if the directory cannot be read.
    pub fn initial_model(&self) -> Result<Model> {
        let repository = NoteRepository::new(&self.config.notes_dir);
        let notes = repository.list()?;
        let mut model = Model::new(repository, notes, self.config.background);
        model
            .config_global_path
            .clone_from(&self.config.global_path);
        model.config_local_path.clone_from(&self.config.local_path);
        Ok(model)
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
