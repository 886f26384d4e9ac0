use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::model::{Geometry, ListState, ViewState};
use crate::app::{App, Message, Model};

/// Lines scrolled per mouse wheel notch in the detail view.
const WHEEL_SCROLL_LINES: isize = 3;

impl App {
    /// Translate a terminal event into a message, if it means anything.
    pub(super) fn handle_event(event: &Event, model: &Model) -> Option<Message> {
        match event {
            Event::Key(key) => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(width, height) => Some(Message::Resize(*width, *height)),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        if model.help_visible {
            return Some(Message::HideHelp);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return Some(Message::Quit),
            KeyCode::Char('q') => return Some(Message::Quit),
            KeyCode::Char('?') | KeyCode::F(1) => return Some(Message::ToggleHelp),
            KeyCode::Char('r') => return Some(Message::Refresh),
            KeyCode::Char('e') => return Some(Message::Edit),
            _ => {}
        }

        match &model.view {
            ViewState::List(list) => Self::handle_list_key(key, list, model),
            ViewState::Detail(_) => Self::handle_detail_key(key),
        }
    }

    fn handle_list_key(key: KeyEvent, list: &ListState, model: &Model) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let rows = model.geometry.map_or(1, Geometry::list_rows).max(1);
        let page = isize::try_from(rows).unwrap_or(isize::MAX);

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Message::Move(1)),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::Move(-1)),
            KeyCode::PageDown => Some(Message::Move(page)),
            KeyCode::PageUp => Some(Message::Move(-page)),
            KeyCode::Char('d') if ctrl => Some(Message::Move(page / 2)),
            KeyCode::Char('u') if ctrl => Some(Message::Move(-(page / 2))),
            KeyCode::Char('g') | KeyCode::Home => Some(Message::MoveToFirst),
            KeyCode::Char('G') | KeyCode::End => Some(Message::MoveToLast),
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                list.selected.map(Message::Select)
            }
            KeyCode::Char('n') => Some(Message::NewNote),
            _ => None,
        }
    }

    fn handle_detail_key(key: KeyEvent) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Message::Scroll(1)),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::Scroll(-1)),
            KeyCode::Char('d') if ctrl => Some(Message::HalfPageDown),
            KeyCode::Char('u') if ctrl => Some(Message::HalfPageUp),
            KeyCode::Char(' ') | KeyCode::PageDown => Some(Message::PageDown),
            KeyCode::Char('b') | KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::Char('g') | KeyCode::Home => Some(Message::GoToTop),
            KeyCode::Char('G') | KeyCode::End => Some(Message::GoToBottom),
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace => {
                Some(Message::Back)
            }
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return None;
        }

        match (&model.view, mouse.kind) {
            (ViewState::List(_), MouseEventKind::ScrollDown) => Some(Message::Move(1)),
            (ViewState::List(_), MouseEventKind::ScrollUp) => Some(Message::Move(-1)),
            (ViewState::Detail(_), MouseEventKind::ScrollDown) => {
                Some(Message::Scroll(WHEEL_SCROLL_LINES))
            }
            (ViewState::Detail(_), MouseEventKind::ScrollUp) => {
                Some(Message::Scroll(-WHEEL_SCROLL_LINES))
            }
            (ViewState::List(list), MouseEventKind::Down(MouseButton::Left)) => {
                let index = list_row_at(list, model, mouse.row)?;
                if list.selected == Some(index) {
                    Some(Message::Select(index))
                } else {
                    Some(Message::MoveTo(index))
                }
            }
            _ => None,
        }
    }

    pub(super) fn view(model: &Model, frame: &mut ratatui::Frame) {
        crate::ui::render(model, frame);
    }
}

/// The note row under a terminal row in the list table.
fn list_row_at(list: &ListState, model: &Model, row: u16) -> Option<usize> {
    let geometry = model.geometry?;
    let relative = usize::from(row.checked_sub(crate::ui::TABLE_FIRST_ROW)?);
    if relative >= geometry.list_rows() {
        return None;
    }
    let index = list.offset + relative;
    (index < model.notes.len()).then_some(index)
}
