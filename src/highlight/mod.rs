//! Syntax highlighting for code blocks.
//!
//! Uses syntect for highlighting with Sublime Text syntax definitions.

use std::sync::OnceLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

use crate::document::{InlineColor, InlineSpan, InlineStyle};

/// Terminal background the rendered colors are tuned for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Background {
    #[default]
    Dark,
    Light,
}

impl Background {
    /// Guess the background from the `COLORFGBG` convention (`fg;bg`).
    ///
    /// Missing or unparseable values fall back to dark.
    pub fn from_colorfgbg(colorfgbg: Option<&str>) -> Self {
        let Some(value) = colorfgbg else {
            return Self::Dark;
        };
        let bg_str = value.rsplit(';').next().unwrap_or(value);
        let Ok(bg) = bg_str.parse::<u8>() else {
            return Self::Dark;
        };

        if matches!(bg, 7 | 9..=15) { Self::Light } else { Self::Dark }
    }
}

/// Highlight `code` line by line.
///
/// Unknown or missing languages produce uncolored spans marked as code.
pub fn highlight_code(
    language: Option<&str>,
    code: &str,
    background: Background,
) -> Vec<Vec<InlineSpan>> {
    let syntax_set = syntax_set();
    let plain = InlineStyle {
        code: true,
        ..InlineStyle::default()
    };
    let syntax = language
        .and_then(|lang| syntax_set.find_syntax_by_token(lang))
        .or_else(|| language.and_then(|lang| syntax_set.find_syntax_by_name(lang)));

    let Some(syntax) = syntax else {
        return code
            .lines()
            .map(|line| vec![InlineSpan::new(line.to_string(), plain)])
            .collect();
    };

    let mut highlighter = HighlightLines::new(syntax, theme(background));
    let mut lines = Vec::new();
    for line in code.lines() {
        let ranges = match highlighter.highlight_line(line, syntax_set) {
            Ok(ranges) => ranges,
            Err(err) => {
                tracing::debug!(error = %err, "highlighting failed, using plain text");
                lines.push(vec![InlineSpan::new(line.to_string(), plain)]);
                continue;
            }
        };
        let spans = ranges
            .into_iter()
            .map(|(style, text)| {
                let fg = InlineColor {
                    r: style.foreground.r,
                    g: style.foreground.g,
                    b: style.foreground.b,
                };
                let inline_style = InlineStyle {
                    fg: Some(adjust_fg_for_background(fg, background)),
                    ..plain
                };
                InlineSpan::new(text.to_string(), inline_style)
            })
            .collect();
        lines.push(spans);
    }

    lines
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(|| {
        tracing::debug!("loading default syntax set");
        SyntaxSet::load_defaults_newlines()
    })
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

fn theme(background: Background) -> &'static Theme {
    static DARK: OnceLock<Theme> = OnceLock::new();
    static LIGHT: OnceLock<Theme> = OnceLock::new();

    let (cell, preferred) = match background {
        Background::Dark => (
            &DARK,
            [
                "Monokai Extended",
                "Monokai Extended Bright",
                "Solarized (dark)",
                "base16-ocean.dark",
            ]
            .as_slice(),
        ),
        Background::Light => (
            &LIGHT,
            ["InspiredGitHub", "Solarized (light)", "base16-ocean.light"].as_slice(),
        ),
    };

    cell.get_or_init(|| {
        let themes = &theme_set().themes;
        preferred
            .iter()
            .find_map(|name| themes.get(*name))
            .or_else(|| themes.values().next())
            .cloned()
            .unwrap_or_default()
    })
}

/// Darken bright syntax colors so they stay readable on a light background.
pub fn adjust_fg_for_background(color: InlineColor, background: Background) -> InlineColor {
    match background {
        Background::Dark => color,
        Background::Light => {
            let luma = 0.0722f32.mul_add(
                f32::from(color.b),
                0.2126f32.mul_add(f32::from(color.r), 0.7152 * f32::from(color.g)),
            );
            if luma < 155.0 {
                return color;
            }

            InlineColor {
                r: scale(color.r),
                g: scale(color.g),
                b: scale(color.b),
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale(channel: u8) -> u8 {
    (f32::from(channel) * 0.42).round() as u8
}
