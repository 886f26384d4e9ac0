use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;

const KEY_COLUMN: usize = 20;

fn binding(keys: &str, action: &str) -> Line<'static> {
    Line::raw(format!("  {keys:<KEY_COLUMN$}{action}"))
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let lines = vec![
        Line::styled("Note list", section_style),
        binding("j/k or Up/Down", "Move selection"),
        binding("PageUp/PageDown", "Move by a page"),
        binding("g / G", "First / last note"),
        binding("Enter / l / click", "Open note"),
        binding("n", "New note"),
        Line::raw(""),
        Line::styled("Note view", section_style),
        binding("j/k or Up/Down", "Scroll"),
        binding("Space / b", "Page down / up"),
        binding("Ctrl-d / Ctrl-u", "Half page"),
        binding("g / G", "Top / bottom"),
        binding("Esc / h / Backspace", "Back to list"),
        Line::raw(""),
        Line::styled("Anywhere", section_style),
        binding("e", "Edit in external editor"),
        binding("r", "Reload notes"),
        binding("? / F1", "Toggle help"),
        binding("q / Ctrl-c", "Quit"),
        Line::raw(""),
        Line::styled("Config", section_style),
        Line::raw(format!("  Global: {global_cfg}")),
        Line::raw(format!("  Local override: {local_cfg}")),
    ];

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

pub fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
