use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use proptest::prelude::*;
use tempfile::{TempDir, tempdir};

use crate::config::Config;
use crate::editor::{EditorCommand, Launcher};
use crate::error::{NoteError, Result};
use crate::highlight::Background;
use crate::notes::{Note, NoteRepository};
use crate::ui::TABLE_FIRST_ROW;
use crate::ui::viewport::Viewport;

use super::{App, DetailState, Geometry, ListState, Message, Model, ToastLevel, ViewState, update};

/// Writes fixed content to whatever file it is asked to edit.
struct WritingLauncher {
    content: String,
    edited: Rc<RefCell<Vec<PathBuf>>>,
}

impl Launcher for WritingLauncher {
    fn edit(&mut self, path: &Path) -> Result<()> {
        self.edited.borrow_mut().push(path.to_path_buf());
        std::fs::write(path, &self.content).map_err(|e| NoteError::io(path, e))
    }
}

struct MissingEditor;

impl Launcher for MissingEditor {
    fn edit(&mut self, _path: &Path) -> Result<()> {
        Err(NoteError::SubprocessSpawn {
            command: "no-such-editor".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}

fn note(name: &str) -> Note {
    Note {
        name: name.to_string(),
        path: PathBuf::from("/notes").join(name),
        modified: Local::now(),
    }
}

fn test_config(dir: &Path) -> Config {
    Config {
        notes_dir: dir.to_path_buf(),
        editor: EditorCommand::parse("true").unwrap(),
        background: Background::Dark,
        mouse: false,
        log_file: None,
        global_path: None,
        local_path: None,
    }
}

fn notes_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempdir().unwrap();
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

fn app_with(dir: &Path, launcher: Box<dyn Launcher>) -> App {
    App::new(test_config(dir)).with_launcher(launcher)
}

fn writing_app(dir: &Path, content: &str) -> (App, Rc<RefCell<Vec<PathBuf>>>) {
    let edited = Rc::new(RefCell::new(Vec::new()));
    let launcher = WritingLauncher {
        content: content.to_string(),
        edited: Rc::clone(&edited),
    };
    (app_with(dir, Box::new(launcher)), edited)
}

fn send(app: &mut App, model: &mut Model, msg: Message) {
    app.dispatch(model, msg, || Ok(None)).unwrap();
}

fn ready(app: &mut App) -> Model {
    let mut model = app.initial_model().unwrap();
    send(app, &mut model, Message::Resize(80, 24));
    model
}

fn list_model(names: &[&str]) -> Model {
    let notes = names.iter().map(|n| note(n)).collect();
    let mut model = Model::new(NoteRepository::new("/notes"), notes, Background::Dark);
    model.geometry = Some(Geometry {
        width: 80,
        height: 24,
    });
    model
}

fn document_text(model: &Model) -> String {
    match &model.view {
        ViewState::Detail(DetailState {
            document: Some(document),
            ..
        }) => document.plain_text(),
        _ => String::new(),
    }
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

// --- pure update ---

#[test]
fn test_move_clamps_at_both_ends() {
    let model = list_model(&["a", "b", "c"]);
    let model = update(model, Message::Move(-5));
    assert_eq!(model.selected_index(), Some(0));
    let model = update(model, Message::Move(10));
    assert_eq!(model.selected_index(), Some(2));
}

#[test]
fn test_move_down_at_last_row_is_idempotent() {
    let model = update(list_model(&["a", "b"]), Message::MoveToLast);
    let model = update(model, Message::Move(1));
    let model = update(model, Message::Move(1));
    assert_eq!(model.selected_index(), Some(1));
}

#[test]
fn test_move_on_empty_list_keeps_no_selection() {
    let model = update(list_model(&[]), Message::Move(1));
    assert_eq!(model.selected_index(), None);
}

#[test]
fn test_select_then_back_restores_row() {
    let model = list_model(&["a", "b", "c"]);
    let model = update(model, Message::MoveTo(2));
    let model = update(model, Message::Select(2));
    assert!(model.view.is_detail());
    assert_eq!(model.current_note().map(|n| n.name.as_str()), Some("c"));

    let model = update(model, Message::Back);
    assert!(model.view.is_list());
    assert_eq!(model.selected_index(), Some(2));
}

#[test]
fn test_select_before_geometry_is_ignored() {
    let mut model = list_model(&["a"]);
    model.geometry = None;
    let model = update(model, Message::Select(0));
    assert!(model.view.is_list());
}

#[test]
fn test_select_out_of_range_is_ignored() {
    let model = update(list_model(&["a"]), Message::Select(3));
    assert!(model.view.is_list());
}

#[test]
fn test_detail_viewport_uses_geometry() {
    let model = update(list_model(&["a"]), Message::Select(0));
    let ViewState::Detail(detail) = &model.view else {
        panic!("expected detail view");
    };
    assert_eq!(detail.viewport.height(), 21);
    assert!(detail.document.is_none());
}

#[test]
fn test_back_clamps_when_list_shrank() {
    let mut model = update(list_model(&["a", "b", "c"]), Message::Select(2));
    model.notes.truncate(1);
    let model = update(model, Message::Back);
    assert_eq!(model.selected_index(), Some(0));
}

#[test]
fn test_list_offset_follows_selection() {
    let names: Vec<String> = (0..50).map(|i| format!("n{i:02}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let model = update(list_model(&refs), Message::MoveToLast);
    let ViewState::List(list) = &model.view else {
        panic!("expected list view");
    };
    assert_eq!(list.selected, Some(49));
    assert_eq!(list.offset, 50 - crate::ui::list_visible_rows(24));
}

#[test]
fn test_help_toggle_and_hide() {
    let model = update(list_model(&["a"]), Message::ToggleHelp);
    assert!(model.help_visible);
    let model = update(model, Message::HideHelp);
    assert!(!model.help_visible);
}

#[test]
fn test_quit_sets_flag() {
    let model = update(list_model(&["a"]), Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_resize_resizes_detail_viewport() {
    let model = update(list_model(&["a"]), Message::Select(0));
    let model = update(model, Message::Resize(100, 40));
    let ViewState::Detail(detail) = &model.view else {
        panic!("expected detail view");
    };
    assert_eq!(detail.viewport.height(), 37);
    assert_eq!(model.geometry.map(Geometry::detail_size), Some((97, 37)));
}

proptest! {
    #[test]
    fn prop_selection_stays_in_bounds(
        len in 1_usize..30,
        moves in prop::collection::vec(-40_isize..40, 0..20),
    ) {
        let names: Vec<String> = (0..len).map(|i| format!("note-{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut model = list_model(&refs);
        for delta in moves {
            model = update(model, Message::Move(delta));
            let selected = model.selected_index().unwrap();
            prop_assert!(selected < len);
            let ViewState::List(list) = &model.view else { unreachable!() };
            prop_assert!(selected >= list.offset);
            prop_assert!(selected < list.offset + crate::ui::list_visible_rows(24));
        }
    }

    #[test]
    fn prop_scroll_offset_stays_in_bounds(
        content in 0_usize..200,
        ops in prop::collection::vec(0_u8..7, 0..30),
    ) {
        let mut model = list_model(&["a"]);
        model.view = ViewState::Detail(DetailState {
            note: note("a"),
            return_to: 0,
            viewport: Viewport::new(10, content),
            document: None,
        });
        for op in ops {
            let msg = match op {
                0 => Message::Scroll(3),
                1 => Message::Scroll(-2),
                2 => Message::PageDown,
                3 => Message::PageUp,
                4 => Message::HalfPageDown,
                5 => Message::GoToBottom,
                _ => Message::GoToTop,
            };
            model = update(model, msg);
            let ViewState::Detail(detail) = &model.view else { unreachable!() };
            prop_assert!(detail.viewport.offset() <= detail.viewport.max_offset());
        }
    }
}

// --- input mapping ---

#[test]
fn test_list_keys() {
    let model = list_model(&["a", "b"]);
    assert_eq!(App::handle_key(key(KeyCode::Char('j')), &model), Some(Message::Move(1)));
    assert_eq!(App::handle_key(key(KeyCode::Up), &model), Some(Message::Move(-1)));
    assert_eq!(App::handle_key(key(KeyCode::Enter), &model), Some(Message::Select(0)));
    assert_eq!(App::handle_key(key(KeyCode::Char('n')), &model), Some(Message::NewNote));
    assert_eq!(App::handle_key(key(KeyCode::Char('G')), &model), Some(Message::MoveToLast));
    assert_eq!(App::handle_key(key(KeyCode::Esc), &model), None);
}

#[test]
fn test_detail_keys() {
    let model = update(list_model(&["a"]), Message::Select(0));
    assert_eq!(App::handle_key(key(KeyCode::Char('j')), &model), Some(Message::Scroll(1)));
    assert_eq!(App::handle_key(key(KeyCode::Char(' ')), &model), Some(Message::PageDown));
    assert_eq!(App::handle_key(key(KeyCode::Esc), &model), Some(Message::Back));
    assert_eq!(App::handle_key(key(KeyCode::Char('n')), &model), None);
    assert_eq!(
        App::handle_key(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL), &model),
        Some(Message::HalfPageDown)
    );
}

#[test]
fn test_global_keys() {
    let model = list_model(&["a"]);
    assert_eq!(App::handle_key(key(KeyCode::Char('q')), &model), Some(Message::Quit));
    assert_eq!(
        App::handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), &model),
        Some(Message::Quit)
    );
    assert_eq!(App::handle_key(key(KeyCode::Char('e')), &model), Some(Message::Edit));
    assert_eq!(App::handle_key(key(KeyCode::Char('r')), &model), Some(Message::Refresh));
    assert_eq!(App::handle_key(key(KeyCode::F(1)), &model), Some(Message::ToggleHelp));
}

#[test]
fn test_any_key_hides_help() {
    let mut model = list_model(&["a"]);
    model.help_visible = true;
    assert_eq!(App::handle_key(key(KeyCode::Char('q')), &model), Some(Message::HideHelp));
}

#[test]
fn test_key_release_is_ignored() {
    let model = list_model(&["a"]);
    let mut release = key(KeyCode::Char('q'));
    release.kind = KeyEventKind::Release;
    assert_eq!(App::handle_key(release, &model), None);
}

#[test]
fn test_resize_event_becomes_message() {
    let model = list_model(&["a"]);
    assert_eq!(
        App::handle_event(&Event::Resize(120, 50), &model),
        Some(Message::Resize(120, 50))
    );
}

fn click(row: u16) -> MouseEvent {
    MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: 5,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

#[test]
fn test_click_moves_then_opens() {
    let model = list_model(&["a", "b", "c"]);
    assert_eq!(
        App::handle_mouse(click(TABLE_FIRST_ROW + 1), &model),
        Some(Message::MoveTo(1))
    );
    assert_eq!(
        App::handle_mouse(click(TABLE_FIRST_ROW), &model),
        Some(Message::Select(0))
    );
    assert_eq!(App::handle_mouse(click(TABLE_FIRST_ROW + 5), &model), None);
    assert_eq!(App::handle_mouse(click(1), &model), None);
}

#[test]
fn test_wheel_scrolls_detail() {
    let model = update(list_model(&["a"]), Message::Select(0));
    let wheel = MouseEvent {
        kind: MouseEventKind::ScrollDown,
        column: 0,
        row: 0,
        modifiers: KeyModifiers::NONE,
    };
    assert_eq!(App::handle_mouse(wheel, &model), Some(Message::Scroll(3)));
}

// --- dispatch with effects ---

#[test]
fn test_select_renders_and_reuses_cache() {
    let dir = notes_dir(&[("a.md", "# Alpha\n\nbody"), ("b.md", "# Beta")]);
    let mut app = app_with(dir.path(), Box::new(MissingEditor));
    let mut model = ready(&mut app);

    send(&mut app, &mut model, Message::Select(0));
    assert!(document_text(&model).contains("Alpha"));
    assert_eq!(model.cache.stats().misses, 1);

    send(&mut app, &mut model, Message::Back);
    send(&mut app, &mut model, Message::Select(0));
    assert_eq!(model.cache.stats().hits, 1);
    assert_eq!(model.cache.stats().misses, 1);
}

#[test]
fn test_resize_renders_at_new_width() {
    let dir = notes_dir(&[("a.md", "text")]);
    let mut app = app_with(dir.path(), Box::new(MissingEditor));
    let mut model = ready(&mut app);

    send(&mut app, &mut model, Message::Select(0));
    send(&mut app, &mut model, Message::Resize(60, 20));
    assert!(model.cache.contains("a.md", 77));
    assert!(model.cache.contains("a.md", 57));
    let ViewState::Detail(detail) = &model.view else {
        panic!("expected detail view");
    };
    assert_eq!(detail.document.as_ref().map(|d| d.width()), Some(57));
}

#[test]
fn test_edit_rerenders_changed_note() {
    let dir = notes_dir(&[("a.md", "# Before")]);
    let (mut app, edited) = writing_app(dir.path(), "# After\n");
    let mut model = ready(&mut app);

    send(&mut app, &mut model, Message::Select(0));
    assert!(document_text(&model).contains("Before"));

    send(&mut app, &mut model, Message::Edit);
    assert_eq!(edited.borrow().as_slice(), &[dir.path().join("a.md")]);
    assert!(model.view.is_detail());
    assert!(document_text(&model).contains("After"));
    assert!(model.active_toast().is_none());
}

#[test]
fn test_new_note_appears_selected() {
    let dir = notes_dir(&[("a.md", "a"), ("b.md", "b")]);
    let (mut app, edited) = writing_app(dir.path(), "fresh");
    let mut model = ready(&mut app);

    send(&mut app, &mut model, Message::NewNote);
    assert_eq!(edited.borrow().as_slice(), &[dir.path().join("untitled.md")]);
    assert_eq!(model.notes.len(), 3);
    assert_eq!(model.current_note().map(|n| n.name.as_str()), Some("untitled.md"));
}

#[test]
fn test_new_note_in_empty_directory() {
    let dir = notes_dir(&[]);
    let (mut app, _) = writing_app(dir.path(), "fresh");
    let mut model = ready(&mut app);
    assert_eq!(model.selected_index(), None);

    send(&mut app, &mut model, Message::NewNote);
    assert_eq!(model.selected_index(), Some(0));
}

#[test]
fn test_editor_failure_is_reported_not_fatal() {
    let dir = notes_dir(&[("a.md", "a")]);
    let mut app = app_with(dir.path(), Box::new(MissingEditor));
    let mut model = ready(&mut app);

    send(&mut app, &mut model, Message::Edit);
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.contains("no-such-editor"));
    assert!(!model.should_quit);
}

#[test]
fn test_failed_edit_from_detail_returns_to_list() {
    let dir = notes_dir(&[("a.md", "a"), ("b.md", "b")]);
    let mut app = app_with(dir.path(), Box::new(MissingEditor));
    let mut model = ready(&mut app);

    send(&mut app, &mut model, Message::Select(1));
    send(&mut app, &mut model, Message::Edit);
    assert!(model.view.is_list());
    assert_eq!(model.selected_index(), Some(1));
    assert_eq!(model.active_toast().map(|(_, level)| level), Some(ToastLevel::Error));
}

#[test]
fn test_edit_without_notes_shows_info() {
    let dir = notes_dir(&[]);
    let mut app = app_with(dir.path(), Box::new(MissingEditor));
    let mut model = ready(&mut app);

    send(&mut app, &mut model, Message::Edit);
    assert_eq!(
        model.active_toast(),
        Some(("No note selected", ToastLevel::Info))
    );
}

#[test]
fn test_editor_session_reclaims_terminal() {
    let dir = notes_dir(&[("a.md", "a")]);
    let (mut app, _) = writing_app(dir.path(), "b");
    let mut model = ready(&mut app);
    let mut reclaimed = 0;

    app.dispatch(&mut model, Message::Edit, || {
        reclaimed += 1;
        Ok(Some((100, 30)))
    })
    .unwrap();
    assert_eq!(reclaimed, 1);
    assert_eq!(
        model.geometry,
        Some(Geometry {
            width: 100,
            height: 30
        })
    );
}

#[test]
fn test_edit_in_detail_renders_once_at_reclaimed_width() {
    let dir = notes_dir(&[("a.md", "old text")]);
    let (mut app, _) = writing_app(dir.path(), "new text");
    let mut model = ready(&mut app);
    send(&mut app, &mut model, Message::Select(0));
    assert!(model.cache.contains("a.md", 77));
    let misses_before = model.cache.stats().misses;

    app.dispatch(&mut model, Message::Edit, || Ok(Some((60, 20)))).unwrap();
    assert!(model.view.is_detail());
    assert!(document_text(&model).contains("new text"));
    assert!(model.cache.contains("a.md", 57));
    assert!(!model.cache.contains("a.md", 77));
    assert_eq!(model.cache.len(), 1);
    assert_eq!(model.cache.stats().misses, misses_before + 1);
}

#[test]
fn test_vanished_note_falls_back_to_list() {
    let dir = notes_dir(&[("a.md", "a"), ("b.md", "b")]);
    let mut app = app_with(dir.path(), Box::new(MissingEditor));
    let mut model = ready(&mut app);

    send(&mut app, &mut model, Message::Select(1));
    std::fs::remove_file(dir.path().join("b.md")).unwrap();
    send(&mut app, &mut model, Message::Refresh);

    assert!(model.view.is_list());
    assert_eq!(model.selected_index(), Some(0));
    assert!(!model.cache.contains("b.md", 77));
}

#[test]
fn test_refresh_picks_up_new_files() {
    let dir = notes_dir(&[("b.md", "b")]);
    let mut app = app_with(dir.path(), Box::new(MissingEditor));
    let mut model = ready(&mut app);

    std::fs::write(dir.path().join("a.md"), "a").unwrap();
    send(&mut app, &mut model, Message::Refresh);

    assert_eq!(model.notes.len(), 2);
    assert_eq!(model.current_note().map(|n| n.name.as_str()), Some("b.md"));
    assert_eq!(
        model.active_toast(),
        Some(("Reloaded 2 notes", ToastLevel::Info))
    );
}

#[test]
fn test_empty_collection_render_skips_cache() {
    let dir = notes_dir(&[]);
    let mut app = app_with(dir.path(), Box::new(MissingEditor));
    let mut model = ready(&mut app);

    let document = model.render_detail().unwrap();
    assert!(document.plain_text().contains("No notes found"));
    assert!(model.cache.is_empty());
    assert_eq!(model.cache.stats().misses, 0);
}

#[test]
fn test_binary_note_is_fatal_render_error() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("blob.bin"), [0_u8, 159, 146, 150]).unwrap();
    let mut app = app_with(dir.path(), Box::new(MissingEditor));
    let mut model = ready(&mut app);

    let result = app.dispatch(&mut model, Message::Select(0), || Ok(None));
    assert!(matches!(result, Err(NoteError::Render { .. })));
}

#[test]
fn test_toast_expires() {
    let mut model = list_model(&["a"]);
    model.show_toast(ToastLevel::Warning, "heads up");
    assert!(!model.expire_toast(Instant::now()));
    assert!(model.expire_toast(Instant::now() + Duration::from_secs(10)));
    assert!(model.active_toast().is_none());
}

#[test]
fn test_initial_model_carries_config_paths() {
    let dir = notes_dir(&[("a.md", "a")]);
    let config = test_config(dir.path())
        .with_config_paths(Some(PathBuf::from("/cfg/config")), None);
    let app = App::new(config).with_launcher(Box::new(MissingEditor));
    let model = app.initial_model().unwrap();

    assert_eq!(model.config_global_path, Some(PathBuf::from("/cfg/config")));
    assert_eq!(model.selected_index(), Some(0));
    assert!(!model.is_ready());
    assert!(matches!(model.view, ViewState::List(ListState { .. })));
}
