use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel, ViewState};

use super::style;

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let status = match &model.view {
        ViewState::List(list) => {
            let position = list
                .selected
                .map_or_else(|| "0/0".to_string(), |i| format!("{}/{}", i + 1, model.notes.len()));
            format!(" {position} notes  enter:open  e:edit  n:new  r:reload  ?:help  q:quit")
        }
        ViewState::Detail(detail) => {
            let vp = &detail.viewport;
            format!(
                " {}  [{}%]  Line {}/{}  esc:back  e:edit  ?:help",
                detail.note.name,
                vp.scroll_percent(),
                (vp.offset() + 1).min(vp.content_height().max(1)),
                vp.content_height()
            )
        }
    };

    let bar = Paragraph::new(status).style(style::status_bar(model.background));
    frame.render_widget(bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
