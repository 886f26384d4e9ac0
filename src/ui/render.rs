use ratatui::prelude::*;
use ratatui::widgets::{Block, Padding, Paragraph, Row, Table, TableState};

use crate::app::{DetailState, ListState, Model, ViewState};
use crate::document::Document;

use super::{
    DOCUMENT_LEFT_PADDING, MODIFIED_COLUMN_WIDTH, NAME_COLUMN_WIDTH, STATUS_HEIGHT, overlays,
    status, style,
};

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();

    if !model.is_ready() {
        let placeholder = Paragraph::new("Initializing…").alignment(Alignment::Center);
        frame.render_widget(placeholder, area);
        return;
    }

    let [main_area, status_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_HEIGHT)]).areas(area);

    match &model.view {
        ViewState::List(_) if model.notes.is_empty() => {
            render_empty_collection(model, frame, main_area);
        }
        ViewState::List(list) => render_note_table(model, list, frame, main_area),
        ViewState::Detail(detail) => render_detail(model, detail, frame, main_area),
    }

    if model.active_toast().is_some() {
        status::render_toast_bar(model, frame, status_area);
    } else {
        status::render_status_bar(model, frame, status_area);
    }

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn pane_block(title: String) -> Block<'static> {
    Block::bordered()
        .title(title)
        .border_style(Style::default().fg(style::BORDER))
}

fn render_note_table(model: &Model, list: &ListState, frame: &mut Frame, area: Rect) {
    let rows = model
        .notes
        .iter()
        .map(|note| Row::new([note.name.clone(), note.modified_label()]));
    let header = Row::new(["Note", "Date Modified"])
        .style(style::table_header())
        .bottom_margin(1);

    let table = Table::new(
        rows,
        [
            Constraint::Length(NAME_COLUMN_WIDTH),
            Constraint::Length(MODIFIED_COLUMN_WIDTH),
        ],
    )
    .header(header)
    .block(pane_block(format!(" {} ", model.repository.dir().display())))
    .row_highlight_style(style::selected_row());

    let mut state = TableState::default()
        .with_offset(list.offset)
        .with_selected(list.selected);
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_empty_collection(model: &Model, frame: &mut Frame, area: Rect) {
    let block = pane_block(" notecase ".to_string()).padding(Padding::left(DOCUMENT_LEFT_PADDING));
    let inner = block.inner(area);
    let document = model.empty_collection_document(inner.width);
    let lines = document_lines(&document, 0, inner.height as usize, model);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_detail(model: &Model, detail: &DetailState, frame: &mut Frame, area: Rect) {
    let block = pane_block(format!(" {} ", detail.note.name))
        .padding(Padding::left(DOCUMENT_LEFT_PADDING));

    let content = detail.document.as_deref().map_or_else(
        || vec![Line::raw("Rendering…")],
        |document| {
            let range = detail.viewport.visible_range();
            document_lines(document, range.start, range.len(), model)
        },
    );
    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn document_lines(
    document: &Document,
    offset: usize,
    count: usize,
    model: &Model,
) -> Vec<Line<'static>> {
    document
        .visible_lines(offset, count)
        .into_iter()
        .map(|line| {
            let line_style = style::style_for_line_type(line.line_type(), model.background);
            line.spans().map_or_else(
                || Line::styled(line.content().to_string(), line_style),
                |spans| {
                    Line::from(
                        spans
                            .iter()
                            .map(|span| {
                                Span::styled(
                                    span.text().to_string(),
                                    style::style_for_inline(
                                        line_style,
                                        span.style(),
                                        model.background,
                                    ),
                                )
                            })
                            .collect::<Vec<_>>(),
                    )
                },
            )
        })
        .collect()
}
