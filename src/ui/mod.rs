//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`viewport`]: Scroll position and visible range management
//! - [`style`]: Colors and text styles
//! - Layout helpers shared with input handling

pub mod style;
pub mod viewport;

mod overlays;
mod render;
mod status;

pub use render::render;

/// Rows reserved at the bottom for the status bar.
pub const STATUS_HEIGHT: u16 = 1;
/// Blank column between the detail border and the note text.
pub const DOCUMENT_LEFT_PADDING: u16 = 1;
/// Border plus header row plus header margin above the first table row.
pub const TABLE_FIRST_ROW: u16 = 3;
pub const NAME_COLUMN_WIDTH: u16 = 25;
pub const MODIFIED_COLUMN_WIDTH: u16 = 16;

/// Inner size of the detail pane: `(wrap width, visible rows)`.
///
/// The pane is bordered and sits above the status bar, so a terminal of
/// `width` columns wraps text at `width - 3`.
pub const fn detail_viewport_size(width: u16, height: u16) -> (u16, u16) {
    let wrap = width.saturating_sub(2 + DOCUMENT_LEFT_PADDING);
    let rows = height.saturating_sub(STATUS_HEIGHT + 2);
    (if wrap == 0 { 1 } else { wrap }, rows)
}

/// Number of note rows the list table can show.
pub const fn list_visible_rows(height: u16) -> usize {
    // bottom border plus status bar below the rows
    height.saturating_sub(TABLE_FIRST_ROW + 1 + STATUS_HEIGHT) as usize
}
