use std::path::PathBuf;

use crate::app::Model;
use crate::app::model::{DetailState, Geometry, ListState, ViewState};
use crate::ui::viewport::Viewport;

/// How an editor session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOutcome {
    /// File handed to the editor
    pub path: PathBuf,
    /// Failure description when the editor could not run or exited badly
    pub error: Option<String>,
}

impl EditorOutcome {
    /// File name of the edited path, the note's identity.
    pub fn note_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
    }
}

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // List navigation
    /// Move the selection by n rows, negative meaning up
    Move(isize),
    /// Select a specific row (clamped)
    MoveTo(usize),
    MoveToFirst,
    MoveToLast,
    /// Open the note at this row in the detail view
    Select(usize),

    // Detail navigation
    /// Return to the list
    Back,
    /// Scroll by n lines, negative meaning up
    Scroll(isize),
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    GoToTop,
    GoToBottom,

    // Notes
    /// Open the current note in the external editor
    Edit,
    /// Open a fresh note file in the external editor
    NewNote,
    /// The editor returned control
    EditorExited(EditorOutcome),
    /// Re-list notes and drop cached renders
    Refresh,

    // Overlays
    ToggleHelp,
    HideHelp,

    // Window
    /// Terminal resized
    Resize(u16, u16),

    // Application
    /// Quit the application
    Quit,
}

impl Message {
    /// Whether handling this message hands the terminal to the editor.
    pub const fn launches_editor(&self) -> bool {
        matches!(self, Self::Edit | Self::NewNote)
    }
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here.
/// No side effects should occur in this function; rendering, listing and
/// editor sessions run afterwards in the effect step.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        Message::Move(delta) => {
            if let ViewState::List(list) = &mut model.view {
                let len = model.notes.len();
                if len > 0 {
                    let current = list.selected.unwrap_or(0);
                    let target = if delta.is_negative() {
                        current.saturating_sub(delta.unsigned_abs())
                    } else {
                        current.saturating_add(delta.unsigned_abs())
                    };
                    list.selected = Some(target.min(len - 1));
                }
            }
            sync_list_offset(&mut model);
        }
        Message::MoveTo(index) => {
            set_list_selection(&mut model, index);
        }
        Message::MoveToFirst => {
            set_list_selection(&mut model, 0);
        }
        Message::MoveToLast => {
            set_list_selection(&mut model, usize::MAX);
        }
        Message::Select(index) => {
            if let ViewState::List(_) = model.view
                && index < model.notes.len()
                && let Some(geometry) = model.geometry
            {
                let (_, height) = geometry.detail_size();
                tracing::debug!(note = %model.notes[index].name, "entering detail view");
                model.view = ViewState::Detail(DetailState {
                    note: model.notes[index].clone(),
                    return_to: index,
                    viewport: Viewport::new(height, 0),
                    document: None,
                });
            }
        }
        Message::Back => {
            if let ViewState::Detail(detail) = &model.view {
                let selected = if model.notes.is_empty() {
                    None
                } else {
                    Some(detail.return_to.min(model.notes.len() - 1))
                };
                model.view = ViewState::List(ListState::new(selected));
                sync_list_offset(&mut model);
            }
        }
        Message::Scroll(delta) => with_viewport(&mut model, |vp| vp.scroll_by(delta)),
        Message::PageUp => with_viewport(&mut model, Viewport::page_up),
        Message::PageDown => with_viewport(&mut model, Viewport::page_down),
        Message::HalfPageUp => with_viewport(&mut model, Viewport::half_page_up),
        Message::HalfPageDown => with_viewport(&mut model, Viewport::half_page_down),
        Message::GoToTop => with_viewport(&mut model, Viewport::go_to_top),
        Message::GoToBottom => with_viewport(&mut model, Viewport::go_to_bottom),

        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
        }
        Message::HideHelp => {
            model.help_visible = false;
        }

        Message::Resize(width, height) => {
            if model.geometry.is_none() {
                tracing::debug!(width, height, "terminal geometry ready");
            }
            let geometry = Geometry { width, height };
            model.geometry = Some(geometry);
            if let ViewState::Detail(detail) = &mut model.view {
                let (_, inner_height) = geometry.detail_size();
                detail.viewport.resize(inner_height);
            }
            sync_list_offset(&mut model);
        }

        Message::Quit => {
            model.should_quit = true;
        }

        // Editor sessions, listing and rendering happen in the effect step.
        Message::Edit | Message::NewNote | Message::EditorExited(_) | Message::Refresh => {}
    }

    model
}

fn set_list_selection(model: &mut Model, index: usize) {
    let len = model.notes.len();
    if let ViewState::List(list) = &mut model.view
        && len > 0
    {
        list.selected = Some(index.min(len - 1));
    }
    sync_list_offset(model);
}

fn sync_list_offset(model: &mut Model) {
    let rows = model.geometry.map_or(usize::MAX, Geometry::list_rows);
    if let ViewState::List(list) = &mut model.view {
        list.scroll_into_view(rows);
    }
}

fn with_viewport(model: &mut Model, f: impl FnOnce(&mut Viewport)) {
    if let ViewState::Detail(detail) = &mut model.view {
        f(&mut detail.viewport);
    }
}
