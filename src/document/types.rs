//! Core document types.

/// A note rendered to styled, word-wrapped terminal lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Rendered lines for display
    lines: Vec<RenderedLine>,
    /// Wrap width the lines were laid out for
    width: u16,
}

impl Document {
    pub(crate) const fn from_lines(lines: Vec<RenderedLine>, width: u16) -> Self {
        Self { lines, width }
    }

    /// Get the total number of rendered lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Wrap width used when laying out this document.
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Get the lines in `offset..offset + count`, clamped to the document.
    pub fn visible_lines(&self, offset: usize, count: usize) -> Vec<&RenderedLine> {
        self.lines.iter().skip(offset).take(count).collect()
    }

    /// All rendered text joined with newlines, without styling.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(RenderedLine::content)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A single rendered line with optional inline styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    content: String,
    line_type: LineType,
    spans: Option<Vec<InlineSpan>>,
}

impl RenderedLine {
    /// Create a plain line.
    pub const fn new(content: String, line_type: LineType) -> Self {
        Self {
            content,
            line_type,
            spans: None,
        }
    }

    /// Create a line carrying inline spans.
    pub const fn with_spans(content: String, line_type: LineType, spans: Vec<InlineSpan>) -> Self {
        Self {
            content,
            line_type,
            spans: Some(spans),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn line_type(&self) -> &LineType {
        &self.line_type
    }

    pub fn spans(&self) -> Option<&[InlineSpan]> {
        self.spans.as_deref()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub emphasis: bool,
    pub strong: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub link: bool,
    /// Foreground from syntax highlighting
    pub fg: Option<InlineColor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    text: String,
    style: InlineStyle,
}

impl InlineSpan {
    pub const fn new(text: String, style: InlineStyle) -> Self {
        Self { text, style }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn style(&self) -> InlineStyle {
        self.style
    }
}

/// What kind of markdown block a line came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineType {
    Heading(u8),
    Paragraph,
    CodeBlock,
    BlockQuote,
    /// List item at nesting depth
    ListItem(usize),
    Table,
    HorizontalRule,
    Empty,
}
