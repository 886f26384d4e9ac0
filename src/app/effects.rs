use crate::app::update::EditorOutcome;
use crate::app::{App, Message, Model, ToastLevel};
use crate::error::Result;

impl App {
    /// Perform the I/O a message implies after the pure update ran.
    ///
    /// May return a follow-up message, which the caller dispatches next.
    ///
    /// # Errors
    ///
    /// Listing, reading, rendering and terminal handoff failures are returned
    /// and end the session. Editor failures are not errors here: they come
    /// back as an [`Message::EditorExited`] carrying the failure.
    pub(super) fn handle_message_side_effects(
        &mut self,
        model: &mut Model,
        msg: &Message,
    ) -> Result<Option<Message>> {
        match msg {
            Message::Select(_) | Message::Resize(..) => {
                model.refresh_detail_document()?;
                Ok(None)
            }
            Message::Edit => {
                let Some(path) = model.current_note().map(|note| note.path.clone()) else {
                    model.show_toast(ToastLevel::Info, "No note selected");
                    return Ok(None);
                };
                self.run_editor(model, path).map(Some)
            }
            Message::NewNote => {
                let path = model.repository.new_note_path();
                self.run_editor(model, path).map(Some)
            }
            Message::EditorExited(outcome) => {
                Self::after_editor_session(model, outcome)?;
                Ok(None)
            }
            Message::Refresh => {
                model.cache.clear();
                model.reload_notes(None)?;
                model.refresh_detail_document()?;
                model.show_toast(
                    ToastLevel::Info,
                    format!("Reloaded {} notes", model.notes.len()),
                );
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Hand `path` to the editor and drop its cached renders before the
    /// terminal-reclaim resize runs.
    fn run_editor(&mut self, model: &mut Model, path: std::path::PathBuf) -> Result<Message> {
        let error = match self.launcher.edit(&path) {
            Ok(()) => None,
            Err(err) if err.is_recoverable() => {
                tracing::warn!(path = %path.display(), error = %err, "editor session failed");
                Some(err.to_string())
            }
            Err(err) => return Err(err),
        };
        let outcome = EditorOutcome { path, error };
        if let Some(name) = outcome.note_name() {
            model.cache.invalidate(&name);
        }
        Ok(Message::EditorExited(outcome))
    }

    fn after_editor_session(model: &mut Model, outcome: &EditorOutcome) -> Result<()> {
        model.reload_notes(outcome.note_name().as_deref())?;

        if let Some(error) = &outcome.error {
            model.fall_back_to_list();
            model.show_toast(ToastLevel::Error, error.clone());
            return Ok(());
        }
        model.refresh_detail_document()
    }
}
