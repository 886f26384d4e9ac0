//! Markdown parsing with comrak.

use comrak::nodes::{AstNode, ListDelimType, ListType, NodeValue, TableAlignment};
use comrak::{Arena, Options, parse_document};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::types::{Document, InlineSpan, InlineStyle, LineType, RenderedLine};
use crate::highlight::{Background, highlight_code};

const CODE_RIGHT_PADDING: usize = 3;

/// Render markdown source into styled lines wrapped to `width` columns.
///
/// # Example
///
/// ```
/// use notecase::document::parse_with_layout;
/// use notecase::highlight::Background;
///
/// let doc = parse_with_layout("# Hello\n\nWorld", 80, Background::Dark);
/// assert!(doc.line_count() >= 3);
/// ```
pub fn parse_with_layout(source: &str, width: u16, background: Background) -> Document {
    let arena = Arena::new();
    let options = create_options();
    let root = parse_document(&arena, source, &options);

    let mut builder = LineBuilder {
        lines: Vec::new(),
        wrap_width: usize::from(width.max(1)),
        background,
    };
    builder.node(root, 0, None);

    // Drop trailing separators so the last content line ends the document.
    while builder
        .lines
        .last()
        .is_some_and(|line| *line.line_type() == LineType::Empty)
    {
        builder.lines.pop();
    }

    Document::from_lines(builder.lines, width.max(1))
}

fn create_options() -> Options {
    let mut options = Options::default();

    // Enable GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;

    options
}

struct LineBuilder {
    lines: Vec<RenderedLine>,
    wrap_width: usize,
    background: Background,
}

impl LineBuilder {
    fn node<'a>(&mut self, node: &'a AstNode<'a>, depth: usize, list_marker: Option<&str>) {
        match &node.data.borrow().value {
            NodeValue::Heading(heading) => {
                // Keep headings visually separated from the block above.
                if !self.lines.is_empty() {
                    self.ensure_trailing_blank();
                }
                let prefix = "#".repeat(usize::from(heading.level));
                let spans = collect_inline_spans(node);
                let first = format!("{prefix} ");
                let next = " ".repeat(first.len());
                self.push_wrapped(&spans, &LineType::Heading(heading.level), &first, &next);
                self.blank();
            }

            NodeValue::Paragraph => {
                let spans = collect_inline_spans(node);
                self.push_wrapped(&spans, &LineType::Paragraph, "", "");
                self.blank();
            }

            NodeValue::CodeBlock(code_block) => {
                let language = code_block
                    .info
                    .split_whitespace()
                    .next()
                    .filter(|s| !s.is_empty())
                    .map(ToString::to_string);
                let literal = code_block.literal.clone();
                self.code_block(language.as_deref(), &literal);
                self.blank();
            }

            NodeValue::HtmlBlock(html) => {
                for raw_line in html.literal.lines() {
                    self.push(raw_line.to_string(), LineType::Paragraph);
                }
                self.blank();
            }

            NodeValue::List(list) => {
                let delimiter = match list.delimiter {
                    ListDelimType::Paren => ')',
                    ListDelimType::Period => '.',
                };
                let max_number = list.start + node.children().count().saturating_sub(1);
                let number_width = max_number.to_string().len();

                for (index, child) in node.children().enumerate() {
                    let marker = match list.list_type {
                        ListType::Bullet => "• ".to_string(),
                        ListType::Ordered => format!(
                            "{:>width$}{delimiter} ",
                            list.start + index,
                            width = number_width
                        ),
                    };
                    self.node(child, depth + 1, Some(marker.as_str()));
                }
                if depth == 0 {
                    self.blank();
                }
            }

            NodeValue::Item(_) => {
                let marker = list_marker.unwrap_or("• ").to_string();
                self.list_item(node, depth, &marker);
            }

            NodeValue::TaskItem(symbol) => {
                let marker = if symbol.is_some() { "✓ " } else { "□ " };
                self.list_item(node, depth, marker);
            }

            NodeValue::BlockQuote => {
                self.blockquote(node, 1);
                self.blank();
            }

            NodeValue::ThematicBreak => {
                let rule = "─".repeat(self.wrap_width.min(40));
                self.push(rule, LineType::HorizontalRule);
                self.blank();
            }

            NodeValue::Table(_) => {
                for line in render_table(node, self.wrap_width) {
                    self.push(line, LineType::Table);
                }
                self.blank();
            }

            NodeValue::FootnoteDefinition(def) => {
                let label = format!("[^{}]: ", def.name);
                let continuation = " ".repeat(label.len());
                let spans = collect_inline_spans(node);
                self.push_wrapped(&spans, &LineType::Paragraph, &label, &continuation);
                self.blank();
            }

            _ => {
                for child in node.children() {
                    self.node(child, depth, list_marker);
                }
            }
        }
    }

    fn list_item<'a>(&mut self, node: &'a AstNode<'a>, depth: usize, marker: &str) {
        let indent = "  ".repeat(depth.saturating_sub(1));
        let prefix_first = format!("{indent}{marker}");
        let prefix_next = format!("{indent}{}", " ".repeat(marker.chars().count()));
        let line_type = LineType::ListItem(depth);
        let mut rendered_any = false;

        for child in node.children() {
            match &child.data.borrow().value {
                NodeValue::Paragraph => {
                    if rendered_any {
                        self.push(String::new(), line_type.clone());
                    }
                    let spans = collect_inline_spans(child);
                    let prefix = if rendered_any {
                        &prefix_next
                    } else {
                        &prefix_first
                    };
                    self.push_wrapped(&spans, &line_type, prefix, &prefix_next);
                    rendered_any = true;
                }
                _ => self.node(child, depth, None),
            }
        }

        if !rendered_any {
            self.push_wrapped(&[], &line_type, &prefix_first, &prefix_next);
        }
    }

    fn blockquote<'a>(&mut self, node: &'a AstNode<'a>, quote_depth: usize) {
        let prefix = format!("  {}", "│ ".repeat(quote_depth));

        for child in node.children() {
            match &child.data.borrow().value {
                NodeValue::Paragraph => {
                    let spans = collect_inline_spans(child);
                    self.push_wrapped(&spans, &LineType::BlockQuote, &prefix, &prefix);
                }
                NodeValue::BlockQuote => self.blockquote(child, quote_depth + 1),
                _ => {
                    for raw_line in extract_text(child).lines() {
                        let spans = [InlineSpan::new(raw_line.to_string(), InlineStyle::default())];
                        self.push_wrapped(&spans, &LineType::BlockQuote, &prefix, &prefix);
                    }
                }
            }
        }
    }

    fn code_block(&mut self, language: Option<&str>, literal: &str) {
        let content_width = literal
            .lines()
            .map(UnicodeWidthStr::width)
            .max()
            .unwrap_or(0)
            .min(self.wrap_width.saturating_sub(4 + CODE_RIGHT_PADDING).max(1));
        let label = format!(" {} ", language.unwrap_or("code"));
        let frame_inner_width = content_width + 2 + CODE_RIGHT_PADDING;
        let visible_label = truncate_text(&label, frame_inner_width);
        let top = format!(
            "┌{}{}┐",
            visible_label,
            "─".repeat(frame_inner_width.saturating_sub(display_width(&visible_label)))
        );
        self.push(top, LineType::CodeBlock);

        for highlighted in highlight_code(language, literal, self.background) {
            let trimmed = truncate_spans(&highlighted, content_width);
            let trimmed_width = display_width(&spans_to_string(&trimmed));
            let padding = " ".repeat(content_width.saturating_sub(trimmed_width) + CODE_RIGHT_PADDING);

            let mut line_spans = vec![InlineSpan::new("│ ".to_string(), InlineStyle::default())];
            line_spans.extend(trimmed);
            line_spans.push(InlineSpan::new(format!("{padding} │"), InlineStyle::default()));
            let content = spans_to_string(&line_spans);
            self.lines.push(RenderedLine::with_spans(
                content,
                LineType::CodeBlock,
                line_spans,
            ));
        }

        self.push(
            format!("└{}┘", "─".repeat(frame_inner_width)),
            LineType::CodeBlock,
        );
    }

    fn push(&mut self, content: String, line_type: LineType) {
        self.lines.push(RenderedLine::new(content, line_type));
    }

    fn push_wrapped(
        &mut self,
        spans: &[InlineSpan],
        line_type: &LineType,
        prefix_first: &str,
        prefix_next: &str,
    ) {
        for line_spans in wrap_spans(spans, self.wrap_width, prefix_first, prefix_next) {
            let content = spans_to_string(&line_spans);
            self.lines.push(RenderedLine::with_spans(
                content,
                line_type.clone(),
                line_spans,
            ));
        }
    }

    fn blank(&mut self) {
        if self
            .lines
            .last()
            .is_some_and(|line| *line.line_type() == LineType::Empty)
        {
            return;
        }
        self.push(String::new(), LineType::Empty);
    }

    fn ensure_trailing_blank(&mut self) {
        self.blank();
    }
}

fn render_table<'a>(table_node: &'a AstNode<'a>, wrap_width: usize) -> Vec<String> {
    let (alignments, mut rows, has_header) = collect_table_rows(table_node);
    let num_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    if num_cols == 0 {
        return Vec::new();
    }

    for row in &mut rows {
        row.resize(num_cols, String::new());
    }

    let mut col_widths = vec![1_usize; num_cols];
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            col_widths[idx] = col_widths[idx].max(display_width(cell));
        }
    }

    // Row width is 1 + sum(col_width + 3); shrink the widest column until it fits.
    let max_table_width = wrap_width.max(4);
    while 1 + col_widths.iter().sum::<usize>() + (3 * num_cols) > max_table_width {
        let Some((widest, _)) = col_widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
            break;
        };
        if col_widths[widest] <= 1 {
            break;
        }
        col_widths[widest] -= 1;
    }

    let mut lines = vec![table_border(&col_widths, '┌', '┬', '┐')];
    for (idx, row) in rows.iter().enumerate() {
        lines.push(table_row(row, &col_widths, &alignments));
        if has_header && idx == 0 {
            lines.push(table_border(&col_widths, '├', '┼', '┤'));
        }
    }
    lines.push(table_border(&col_widths, '└', '┴', '┘'));
    lines
}

fn collect_table_rows<'a>(
    table_node: &'a AstNode<'a>,
) -> (Vec<TableAlignment>, Vec<Vec<String>>, bool) {
    let alignments = match &table_node.data.borrow().value {
        NodeValue::Table(table) => table.alignments.clone(),
        _ => Vec::new(),
    };

    let mut rows = Vec::new();
    let mut has_header = false;
    for row_node in table_node.children() {
        let NodeValue::TableRow(is_header) = row_node.data.borrow().value else {
            continue;
        };
        has_header |= is_header;
        let cells = row_node
            .children()
            .filter(|cell| matches!(cell.data.borrow().value, NodeValue::TableCell))
            .map(|cell| {
                extract_text(cell)
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        rows.push(cells);
    }

    (alignments, rows, has_header)
}

fn table_border(widths: &[usize], left: char, middle: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}", segments.join(&middle.to_string()))
}

fn table_row(cells: &[String], widths: &[usize], alignments: &[TableAlignment]) -> String {
    let mut out = String::from("│");
    for (idx, width) in widths.iter().enumerate() {
        let content = truncate_text(cells.get(idx).map_or("", String::as_str), *width);
        let padding = width.saturating_sub(display_width(&content));
        let (left, right) = match alignments.get(idx).copied().unwrap_or(TableAlignment::None) {
            TableAlignment::Right => (padding, 0),
            TableAlignment::Center => (padding / 2, padding - padding / 2),
            TableAlignment::Left | TableAlignment::None => (0, padding),
        };
        out.push(' ');
        out.push_str(&" ".repeat(left));
        out.push_str(&content);
        out.push_str(&" ".repeat(right));
        out.push_str(" │");
    }
    out
}

fn truncate_text(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut width = 0usize;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        out.push(ch);
        width += ch_width;
    }
    out
}

fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    extract_text_recursive(node, &mut text);
    text
}

fn extract_text_recursive<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => text.push_str(t),
        NodeValue::Code(c) => {
            text.push('`');
            text.push_str(&c.literal);
            text.push('`');
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => text.push('\n'),
        _ => {
            for child in node.children() {
                extract_text_recursive(child, text);
            }
        }
    }
}

fn collect_inline_spans<'a>(node: &'a AstNode<'a>) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    for child in node.children() {
        collect_inline_spans_recursive(child, InlineStyle::default(), &mut spans);
    }
    spans
}

fn collect_inline_spans_recursive<'a>(
    node: &'a AstNode<'a>,
    style: InlineStyle,
    spans: &mut Vec<InlineSpan>,
) {
    match &node.data.borrow().value {
        // Nested blocks render on their own lines.
        NodeValue::List(_) | NodeValue::Item(_) | NodeValue::TaskItem(_) => {}
        NodeValue::Text(t) => spans.push(InlineSpan::new(t.clone(), style)),
        NodeValue::HtmlInline(html) => spans.push(InlineSpan::new(html.clone(), style)),
        NodeValue::Code(code) => {
            let code_style = InlineStyle {
                code: true,
                emphasis: false,
                strong: false,
                strikethrough: false,
                ..style
            };
            spans.push(InlineSpan::new(code.literal.clone(), code_style));
        }
        NodeValue::Emph => {
            let next = InlineStyle {
                emphasis: true,
                ..style
            };
            for child in node.children() {
                collect_inline_spans_recursive(child, next, spans);
            }
        }
        NodeValue::Strong => {
            let next = InlineStyle {
                strong: true,
                ..style
            };
            for child in node.children() {
                collect_inline_spans_recursive(child, next, spans);
            }
        }
        NodeValue::Strikethrough => {
            let next = InlineStyle {
                strikethrough: true,
                ..style
            };
            for child in node.children() {
                collect_inline_spans_recursive(child, next, spans);
            }
        }
        NodeValue::Link(_) => {
            let next = InlineStyle { link: true, ..style };
            for child in node.children() {
                collect_inline_spans_recursive(child, next, spans);
            }
        }
        NodeValue::Image(image) => {
            let alt = extract_text(node);
            let label = if alt.is_empty() { &image.url } else { &alt };
            let next = InlineStyle { link: true, ..style };
            spans.push(InlineSpan::new(format!("[Image: {label}]"), next));
        }
        NodeValue::FootnoteReference(reference) => {
            spans.push(InlineSpan::new(format!("[^{}]", reference.name), style));
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => {
            spans.push(InlineSpan::new(" ".to_string(), style));
        }
        _ => {
            for child in node.children() {
                collect_inline_spans_recursive(child, style, spans);
            }
        }
    }
}

/// Greedy word wrap over styled spans.
///
/// Every returned line starts with `prefix_first` (first line) or
/// `prefix_next` (continuations). A single word wider than the line is kept
/// whole rather than split.
fn wrap_spans(
    spans: &[InlineSpan],
    width: usize,
    prefix_first: &str,
    prefix_next: &str,
) -> Vec<Vec<InlineSpan>> {
    let tokens: Vec<InlineSpan> = spans.iter().flat_map(split_inline_tokens).collect();

    let mut lines: Vec<Vec<InlineSpan>> = Vec::new();
    let mut current: Vec<InlineSpan> = Vec::new();
    let mut current_width = 0usize;
    let mut has_word = false;

    let start_line = |prefix: &str, current: &mut Vec<InlineSpan>, current_width: &mut usize| {
        current.clear();
        *current_width = display_width(prefix);
        if !prefix.is_empty() {
            current.push(InlineSpan::new(prefix.to_string(), InlineStyle::default()));
        }
    };

    start_line(prefix_first, &mut current, &mut current_width);

    for token in tokens {
        let token_width = display_width(token.text());
        let token_is_ws = token.text().chars().all(char::is_whitespace);

        if current_width + token_width > width && has_word {
            trim_trailing_whitespace(&mut current);
            lines.push(std::mem::take(&mut current));
            start_line(prefix_next, &mut current, &mut current_width);
            has_word = false;
        }

        if token_is_ws && !has_word {
            // Drop leading whitespace at wrapped line starts.
            continue;
        }

        current_width += token_width;
        current.push(token);
        has_word = true;
    }

    trim_trailing_whitespace(&mut current);
    lines.push(current);
    lines
}

fn trim_trailing_whitespace(line: &mut Vec<InlineSpan>) {
    while line
        .last()
        .is_some_and(|span| span.text().chars().all(char::is_whitespace) && line.len() > 1)
    {
        line.pop();
    }
}

fn split_inline_tokens(span: &InlineSpan) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut ws_state: Option<bool> = None;

    for ch in span.text().chars() {
        let is_ws = ch.is_whitespace();
        if ws_state.is_some_and(|state| state != is_ws) {
            out.push(InlineSpan::new(std::mem::take(&mut buf), span.style()));
        }
        buf.push(ch);
        ws_state = Some(is_ws);
    }

    if !buf.is_empty() {
        out.push(InlineSpan::new(buf, span.style()));
    }

    out
}

fn spans_to_string(spans: &[InlineSpan]) -> String {
    spans.iter().map(InlineSpan::text).collect()
}

fn truncate_spans(spans: &[InlineSpan], max_width: usize) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut remaining = max_width;
    for span in spans {
        if remaining == 0 {
            break;
        }
        let taken = truncate_text(span.text(), remaining);
        let taken_width = display_width(&taken);
        if !taken.is_empty() {
            out.push(InlineSpan::new(taken, span.style()));
        }
        remaining = remaining.saturating_sub(taken_width);
        if taken_width < display_width(span.text()) {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Document {
        parse_with_layout(source, 80, Background::Dark)
    }

    fn line_at(doc: &Document, index: usize) -> Option<&RenderedLine> {
        doc.visible_lines(index, 1).into_iter().next()
    }

    #[test]
    fn test_parse_empty_document() {
        let doc = parse("");
        assert_eq!(doc.line_count(), 0);
    }

    #[test]
    fn test_parse_simple_paragraph() {
        let doc = parse("Hello world");
        let lines = doc.visible_lines(0, 10);
        assert!(lines.iter().any(|l| l.content().contains("Hello world")));
    }

    #[test]
    fn test_parse_heading_keeps_marker() {
        let doc = parse("## Title");
        let first = line_at(&doc, 0).unwrap();
        assert_eq!(first.content(), "## Title");
        assert_eq!(*first.line_type(), LineType::Heading(2));
    }

    #[test]
    fn test_headings_are_separated_from_previous_block() {
        let doc = parse("intro\n\n# Next");
        let heading_idx = (0..doc.line_count())
            .find(|&i| matches!(line_at(&doc, i).unwrap().line_type(), LineType::Heading(_)))
            .unwrap();
        assert_eq!(
            *line_at(&doc, heading_idx - 1).unwrap().line_type(),
            LineType::Empty
        );
    }

    #[test]
    fn test_parse_code_block_is_framed() {
        let doc = parse("```rust\nfn main() {}\n```");
        let lines = doc.visible_lines(0, 10);
        assert!(lines[0].content().starts_with("┌ rust "));
        assert!(lines.iter().any(|l| l.content().contains("fn main() {}")));
        assert!(lines.iter().all(|l| *l.line_type() == LineType::CodeBlock));
    }

    #[test]
    fn test_parse_lists() {
        let doc = parse("- Item 1\n- Item 2\n\n3. three\n4. four");
        let text = doc.plain_text();
        assert!(text.contains("• Item 1"));
        assert!(text.contains("3. three"));
        assert!(text.contains("4. four"));
    }

    #[test]
    fn test_task_list_markers() {
        let doc = parse("- [x] done\n- [ ] open");
        let text = doc.plain_text();
        assert!(text.contains("✓ done"));
        assert!(text.contains("□ open"));
    }

    #[test]
    fn test_inline_styles_create_spans() {
        let doc = parse("*em* **strong** `code` [link](https://example.com) ~~strike~~");
        let paragraph = line_at(&doc, 0).unwrap();
        let spans = paragraph.spans().expect("Inline spans missing");

        assert!(spans.iter().any(|s| s.style().emphasis));
        assert!(spans.iter().any(|s| s.style().strong));
        assert!(spans.iter().any(|s| s.style().code));
        assert!(spans.iter().any(|s| s.style().link));
        assert!(spans.iter().any(|s| s.style().strikethrough));
    }

    #[test]
    fn test_image_renders_placeholder() {
        let doc = parse("![diagram](img.png)");
        assert!(doc.plain_text().contains("[Image: diagram]"));
    }

    #[test]
    fn test_table_renders_borders() {
        let doc = parse("| a | b |\n|---|--:|\n| 1 | 22 |");
        let text = doc.plain_text();
        assert!(text.contains("┌"));
        assert!(text.contains("├"));
        assert!(text.contains("│ a │"));
        assert!(text.contains("│ 1 │ 22 │"));
    }

    #[test]
    fn test_wrapping_respects_width() {
        let long = "word ".repeat(40);
        let doc = parse_with_layout(&long, 20, Background::Dark);
        assert!(doc.line_count() > 5);
        for line in doc.visible_lines(0, doc.line_count()) {
            assert!(display_width(line.content()) <= 20, "{:?}", line.content());
        }
    }

    #[test]
    fn test_width_changes_layout() {
        let long = "alpha beta gamma delta epsilon zeta eta theta iota kappa ".repeat(4);
        let wide = parse_with_layout(&long, 120, Background::Dark);
        let narrow = parse_with_layout(&long, 30, Background::Dark);
        assert!(narrow.line_count() > wide.line_count());
        assert_ne!(wide, narrow);
    }

    #[test]
    fn test_blockquote_prefix() {
        let doc = parse("> quoted text");
        let line = line_at(&doc, 0).unwrap();
        assert_eq!(*line.line_type(), LineType::BlockQuote);
        assert!(line.content().starts_with("  │ quoted"));
    }

    #[test]
    fn test_footnote_reference_and_definition_render() {
        let doc = parse("Alpha[^n]\n\n[^n]: Footnote text");
        let text = doc.plain_text();
        assert!(text.contains("Alpha[^n]"));
        assert!(text.contains("[^n]: Footnote text"));
    }

    #[test]
    fn test_no_trailing_empty_lines() {
        let doc = parse("# Title\n\nbody\n\n");
        let last = line_at(&doc, doc.line_count() - 1).unwrap();
        assert_ne!(*last.line_type(), LineType::Empty);
    }
}
