// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. cache::CacheKey)
    clippy::module_name_repetitions
)]

//! # Notecase
//!
//! A terminal browser for a flat directory of markdown notes.
//!
//! Notecase lists the notes in a table, shows a selected note rendered as
//! styled terminal text, and hands notes to an external editor:
//! - Table of note names and modification times
//! - Syntax-highlighted code blocks
//! - Per-session cache of rendered notes keyed by name and width
//! - Suspend/resume of the terminal around editor sessions
//!
//! ## Architecture
//!
//! Notecase uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`cache`]: Rendered note memo
//! - [`config`]: Startup settings
//! - [`document`]: Markdown parsing and rendering
//! - [`editor`]: External editor handoff
//! - [`highlight`]: Syntax highlighting
//! - [`notes`]: Note directory listing and reading
//! - [`ui`]: Terminal UI components

pub mod app;
pub mod cache;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod highlight;
pub mod notes;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::Document;
    pub use crate::error::{NoteError, Result};
    pub use crate::notes::{Note, NoteRepository};
    pub use crate::ui::viewport::Viewport;
}
