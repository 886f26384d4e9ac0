use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::RenderCache;
use crate::document::{Document, empty_collection_markdown, parse_with_layout};
use crate::error::Result;
use crate::highlight::Background;
use crate::notes::{Note, NoteRepository, read_note};
use crate::ui::viewport::Viewport;

/// Wrap width used when a render is requested before the terminal size is known.
const FALLBACK_WRAP_WIDTH: u16 = 80;
const TOAST_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Terminal size, known after the first resize event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u16,
    pub height: u16,
}

impl Geometry {
    /// Wrap width and visible rows of the detail pane.
    pub const fn detail_size(self) -> (u16, u16) {
        crate::ui::detail_viewport_size(self.width, self.height)
    }

    pub const fn list_rows(self) -> usize {
        crate::ui::list_visible_rows(self.height)
    }
}

/// Table browsing state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListState {
    /// Highlighted row, `None` only when the collection is empty
    pub selected: Option<usize>,
    /// First row shown in the table
    pub offset: usize,
}

impl ListState {
    pub const fn new(selected: Option<usize>) -> Self {
        Self {
            selected,
            offset: 0,
        }
    }

    /// Adjust `offset` so the selected row is among `visible_rows`.
    pub fn scroll_into_view(&mut self, visible_rows: usize) {
        let Some(selected) = self.selected else {
            self.offset = 0;
            return;
        };
        let rows = visible_rows.max(1);
        if selected < self.offset {
            self.offset = selected;
        } else if selected >= self.offset + rows {
            self.offset = selected + 1 - rows;
        }
    }
}

/// One note on screen.
#[derive(Debug, Clone)]
pub struct DetailState {
    pub note: Note,
    /// List row to highlight when going back
    pub return_to: usize,
    pub viewport: Viewport,
    /// Rendered content; `None` until the render effect has run
    pub document: Option<Arc<Document>>,
}

#[derive(Debug, Clone)]
pub enum ViewState {
    List(ListState),
    Detail(DetailState),
}

impl ViewState {
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub const fn is_detail(&self) -> bool {
        matches!(self, Self::Detail(_))
    }
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
#[derive(Debug)]
pub struct Model {
    pub repository: NoteRepository,
    /// Latest listing; replaced wholesale on every re-list
    pub notes: Vec<Note>,
    pub view: ViewState,
    /// `None` until the first resize
    pub geometry: Option<Geometry>,
    pub cache: RenderCache,
    pub background: Background,
    /// Whether help overlay is visible
    pub help_visible: bool,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    toast: Option<Toast>,
}

impl Model {
    /// Start in the list view with the first note selected.
    pub fn new(repository: NoteRepository, notes: Vec<Note>, background: Background) -> Self {
        let selected = if notes.is_empty() { None } else { Some(0) };
        Self {
            repository,
            notes,
            view: ViewState::List(ListState::new(selected)),
            geometry: None,
            cache: RenderCache::new(),
            background,
            help_visible: false,
            should_quit: false,
            config_global_path: None,
            config_local_path: None,
            toast: None,
        }
    }

    pub const fn is_ready(&self) -> bool {
        self.geometry.is_some()
    }

    /// The highlighted row in the list, or the row to return to from detail.
    pub const fn selected_index(&self) -> Option<usize> {
        match &self.view {
            ViewState::List(list) => list.selected,
            ViewState::Detail(detail) => Some(detail.return_to),
        }
    }

    /// The note an edit would apply to.
    pub fn current_note(&self) -> Option<&Note> {
        match &self.view {
            ViewState::List(list) => list.selected.and_then(|i| self.notes.get(i)),
            ViewState::Detail(detail) => Some(&detail.note),
        }
    }

    pub fn wrap_width(&self) -> u16 {
        self.geometry
            .map_or(FALLBACK_WRAP_WIDTH, |g| g.detail_size().0)
    }

    /// Fixed notice shown when the directory holds no notes.
    pub fn empty_collection_document(&self, width: u16) -> Document {
        parse_with_layout(
            &empty_collection_markdown(self.repository.dir()),
            width,
            self.background,
        )
    }

    /// Render the note the user is looking at.
    ///
    /// With an empty collection this is the fixed "no notes" notice, which
    /// bypasses the cache. Otherwise it is the displayed note in the detail
    /// view or the highlighted note in the list, rendered through the cache.
    ///
    /// # Errors
    ///
    /// Propagates read and render failures from the cache.
    pub fn render_detail(&mut self) -> Result<Arc<Document>> {
        let width = self.wrap_width();
        if self.notes.is_empty() {
            return Ok(Arc::new(self.empty_collection_document(width)));
        }
        let note = match &self.view {
            ViewState::Detail(detail) => detail.note.clone(),
            ViewState::List(list) => {
                let index = list.selected.unwrap_or(0).min(self.notes.len() - 1);
                self.notes[index].clone()
            }
        };
        let background = self.background;
        self.cache.get_or_render(&note, width, read_note, |source, w| {
            Ok(parse_with_layout(source, w, background))
        })
    }

    /// Render the detail note into the detail state, if one is displayed.
    ///
    /// # Errors
    ///
    /// See [`Model::render_detail`].
    pub fn refresh_detail_document(&mut self) -> Result<()> {
        if !self.view.is_detail() {
            return Ok(());
        }
        let document = self.render_detail()?;
        if let ViewState::Detail(detail) = &mut self.view {
            detail.viewport.set_content_height(document.line_count());
            detail.document = Some(document);
        }
        Ok(())
    }

    /// Replace the collection with a fresh listing and repair the view.
    ///
    /// The list keeps `focus` selected when given and present, otherwise the
    /// previously selected note by name, otherwise the nearest row. A detail
    /// view stays on its note when it still exists and falls back to the list
    /// when it does not.
    ///
    /// # Errors
    ///
    /// Returns the listing error; the model is unchanged in that case.
    pub fn reload_notes(&mut self, focus: Option<&str>) -> Result<()> {
        let notes = self.repository.list()?;
        let previous_name = self.current_note().map(|n| n.name.clone());
        let previous_index = self.selected_index();
        self.notes = notes;
        self.cache
            .retain_names(self.notes.iter().map(|n| n.name.as_str()));

        let position = |name: &str| self.notes.iter().position(|n| n.name == name);
        let fallback = previous_index.map(|i| i.min(self.notes.len().saturating_sub(1)));
        let fallback = if self.notes.is_empty() { None } else { fallback.or(Some(0)) };
        let rows = self.geometry.map_or(usize::MAX, Geometry::list_rows);

        let view = std::mem::replace(&mut self.view, ViewState::List(ListState::default()));
        self.view = match view {
            ViewState::Detail(mut detail) => {
                if let Some(index) = position(&detail.note.name) {
                    detail.note = self.notes[index].clone();
                    detail.return_to = index;
                    ViewState::Detail(detail)
                } else {
                    tracing::info!(note = %detail.note.name, "displayed note disappeared");
                    let mut list = ListState::new(fallback);
                    list.scroll_into_view(rows);
                    ViewState::List(list)
                }
            }
            ViewState::List(mut list) => {
                list.selected = focus
                    .and_then(position)
                    .or_else(|| previous_name.as_deref().and_then(position))
                    .or(fallback);
                list.scroll_into_view(rows);
                ViewState::List(list)
            }
        };
        Ok(())
    }

    /// Leave a detail view for the list, highlighting its `return_to` row.
    pub(crate) fn fall_back_to_list(&mut self) {
        let ViewState::Detail(detail) = &self.view else {
            return;
        };
        let selected = (!self.notes.is_empty())
            .then(|| detail.return_to.min(self.notes.len() - 1));
        let mut list = ListState::new(selected);
        list.scroll_into_view(self.geometry.map_or(usize::MAX, Geometry::list_rows));
        self.view = ViewState::List(list);
    }

    pub(crate) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        Self::new(NoteRepository::new(PathBuf::new()), Vec::new(), Background::Dark)
    }
}
