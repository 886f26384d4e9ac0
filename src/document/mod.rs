//! Markdown document rendering.
//!
//! This module handles:
//! - Parsing markdown with comrak
//! - Word-wrapping to a target width
//! - Producing styled lines for display

mod parser;
mod types;

pub use parser::parse_with_layout;
pub use types::{Document, InlineColor, InlineSpan, InlineStyle, LineType, RenderedLine};

/// Body shown in place of the detail pane when the directory has no notes.
pub fn empty_collection_markdown(dir: &std::path::Path) -> String {
    format!(
        "# No notes found in {}.\n\nPress `n` to create a new note.\n",
        dir.display()
    )
}
