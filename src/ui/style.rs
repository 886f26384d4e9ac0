//! Colors and text styles.
//!
//! Every style is derived from the terminal [`Background`] chosen at startup,
//! passed in explicitly.

use ratatui::style::{Color, Modifier, Style};

use crate::document::{InlineColor, InlineStyle, LineType};
use crate::highlight::Background;

/// Border color for the table and detail pane.
pub const BORDER: Color = Color::Indexed(240);

/// Style for a rendered note line of the given kind.
pub fn style_for_line_type(line_type: &LineType, background: Background) -> Style {
    let light = background == Background::Light;
    let pick = |dark: Color, light_color: Color| if light { light_color } else { dark };

    match line_type {
        LineType::Heading(1) => Style::default()
            .fg(pick(Color::Cyan, Color::Indexed(24)))
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        LineType::Heading(2) => Style::default()
            .fg(pick(Color::Green, Color::Indexed(22)))
            .add_modifier(Modifier::BOLD),
        LineType::Heading(3) => Style::default()
            .fg(pick(Color::Yellow, Color::Indexed(58)))
            .add_modifier(Modifier::BOLD),
        LineType::Heading(_) => Style::default()
            .fg(pick(Color::Blue, Color::Indexed(24)))
            .add_modifier(Modifier::BOLD),
        LineType::CodeBlock => Style::default()
            .fg(pick(Color::Indexed(245), Color::Indexed(238)))
            .add_modifier(Modifier::DIM),
        LineType::BlockQuote => Style::default()
            .fg(pick(Color::Blue, Color::Indexed(24)))
            .add_modifier(Modifier::ITALIC),
        LineType::HorizontalRule => Style::default()
            .fg(pick(Color::Indexed(240), Color::Indexed(241)))
            .add_modifier(Modifier::DIM),
        LineType::ListItem(_) | LineType::Table | LineType::Paragraph | LineType::Empty => {
            Style::default()
        }
    }
}

/// Merge an inline span's styling onto its line style.
pub fn style_for_inline(base: Style, inline: InlineStyle, background: Background) -> Style {
    let light = background == Background::Light;
    let mut style = base;

    if let Some(fg) = inline.fg {
        style = style
            .fg(fg_color_for_terminal(fg))
            .remove_modifier(Modifier::DIM);
    }
    if inline.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if inline.strong {
        style = style.add_modifier(Modifier::BOLD);
    }
    if inline.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if inline.link {
        style = style.add_modifier(Modifier::UNDERLINED);
        if inline.fg.is_none() {
            style = style.fg(if light { Color::Blue } else { Color::LightBlue });
        }
    }
    if inline.code && inline.fg.is_none() {
        style = style
            .fg(if light { Color::Indexed(88) } else { Color::Red })
            .add_modifier(Modifier::BOLD);
    }

    style
}

pub fn table_header() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

/// Highlighted row in the note table.
pub fn selected_row() -> Style {
    Style::default().fg(Color::Indexed(229)).bg(Color::Indexed(57))
}

pub fn status_bar(background: Background) -> Style {
    match background {
        Background::Dark => Style::default().bg(Color::Indexed(236)).fg(Color::Indexed(252)),
        Background::Light => Style::default().bg(Color::Indexed(252)).fg(Color::Indexed(235)),
    }
}

fn fg_color_for_terminal(fg: InlineColor) -> Color {
    let truecolor = supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    );
    if truecolor {
        Color::Rgb(fg.r, fg.g, fg.b)
    } else {
        Color::Indexed(rgb_to_xterm_256(fg.r, fg.g, fg.b))
    }
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    let has = |value: Option<&str>, needles: &[&str]| {
        value.is_some_and(|v| {
            let lower = v.to_ascii_lowercase();
            needles.iter().any(|n| lower.contains(n))
        })
    };
    has(colorterm, &["truecolor", "24bit"]) || has(term, &["direct", "truecolor"])
}

fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    // Result is always 0-5, fits in u8
    #[allow(clippy::cast_possible_truncation)]
    let to_cube = |v: u8| ((u16::from(v) * 5) / 255) as u8;
    16 + (36 * to_cube(r)) + (6 * to_cube(g)) + to_cube(b)
}
