//! Startup configuration.
//!
//! Settings come from, in decreasing priority: command-line flags, the
//! global config file and its local `.notecaserc` override, environment
//! variables, and built-in defaults. The result is an immutable [`Config`]
//! handed to the app and the editor launcher.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::editor::EditorCommand;
use crate::error::NoteError;
use crate::highlight::Background;

pub const NOTES_DIR_ENV: &str = "NOTES_FOLDER";
pub const EDITOR_ENV: &str = "EDITOR";
pub const LOG_FILE_ENV: &str = "NOTECASE_LOG";
pub const COLORFGBG_ENV: &str = "COLORFGBG";

#[cfg(windows)]
pub const DEFAULT_EDITOR: &str = "notepad";
#[cfg(not(windows))]
pub const DEFAULT_EDITOR: &str = "vi";

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Flags that may appear on the command line or in a config file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub dir: Option<PathBuf>,
    pub editor: Option<String>,
    pub theme: Option<ThemeMode>,
    pub no_mouse: bool,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge two flag sets; `other` wins for valued options.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            dir: other.dir.clone().or_else(|| self.dir.clone()),
            editor: other.editor.clone().or_else(|| self.editor.clone()),
            theme: other.theme.or(self.theme),
            no_mouse: self.no_mouse || other.no_mouse,
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    dirs::config_dir().map_or_else(local_override_path, |dir| {
        dir.join("notecase").join("config")
    })
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".notecaserc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    Ok(parse_config_lines(&content))
}

/// Parse config file content: one flag per line, `#` starts a comment line.
///
/// A flag's value is the rest of its line, so editor commands with
/// arguments survive (`--editor code --wait` or `--editor=code --wait`).
pub fn parse_config_lines(content: &str) -> ConfigFlags {
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| match line.split_once(char::is_whitespace) {
            Some((flag, _)) if flag.starts_with("--") && flag.contains('=') => {
                vec![line.to_string()]
            }
            Some((flag, value)) => vec![flag.to_string(), value.trim().to_string()],
            None => vec![line.to_string()],
        })
        .collect::<Vec<_>>();
    parse_flag_tokens(&tokens)
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# notecase defaults (saved with --save)".to_string()];
    if let Some(dir) = &flags.dir {
        lines.push(format!("--dir {}", dir.display()));
    }
    if let Some(editor) = &flags.editor {
        lines.push(format!("--editor {editor}"));
    }
    if let Some(theme) = flags.theme {
        lines.push(format!("--theme {}", theme.as_str()));
    }
    if flags.no_mouse {
        lines.push("--no-mouse".to_string());
    }
    if let Some(log_file) = &flags.log_file {
        lines.push(format!("--log-file {}", log_file.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Extract known flags from a token list, ignoring anything unrecognized.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value.to_string())),
            _ => (token, None),
        };
        let name = match name {
            "-d" => "--dir",
            "-e" => "--editor",
            other => other,
        };
        let takes_value = matches!(name, "--dir" | "--editor" | "--theme" | "--log-file");
        let value = if takes_value && inline_value.is_none() {
            i += 1;
            tokens.get(i).cloned()
        } else {
            inline_value
        };

        match (name, value) {
            ("--dir", Some(v)) => flags.dir = Some(PathBuf::from(v)),
            ("--editor", Some(v)) => flags.editor = Some(v),
            ("--theme", Some(v)) => flags.theme = parse_theme(&v),
            ("--log-file", Some(v)) => flags.log_file = Some(PathBuf::from(v)),
            ("--no-mouse", _) => flags.no_mouse = true,
            _ => {}
        }
        i += 1;
    }
    flags
}

fn parse_theme(s: &str) -> Option<ThemeMode> {
    match s {
        "auto" => Some(ThemeMode::Auto),
        "light" => Some(ThemeMode::Light),
        "dark" => Some(ThemeMode::Dark),
        _ => None,
    }
}

/// Fully resolved settings for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub notes_dir: PathBuf,
    pub editor: EditorCommand,
    pub background: Background,
    pub mouse: bool,
    pub log_file: Option<PathBuf>,
    /// Global config path shown in help
    pub global_path: Option<PathBuf>,
    /// Local override path shown in help, if present
    pub local_path: Option<PathBuf>,
}

impl Config {
    /// Resolve effective settings from merged flags and the environment.
    ///
    /// `env` looks up a variable; empty values count as unset. `home` is the
    /// user's home directory used for the default notes location.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::Config`] when no notes directory can be
    /// determined, when it does not exist or is not a directory, or when the
    /// editor command is blank.
    pub fn resolve(
        flags: &ConfigFlags,
        env: impl Fn(&str) -> Option<String>,
        home: Option<&Path>,
    ) -> Result<Self, NoteError> {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let notes_dir = flags
            .dir
            .clone()
            .or_else(|| env(NOTES_DIR_ENV).map(PathBuf::from))
            .or_else(|| home.map(|h| h.join("notes")))
            .ok_or_else(|| {
                NoteError::Config(format!(
                    "no notes directory: set --dir or {NOTES_DIR_ENV}, or define a home directory"
                ))
            })?;
        if !notes_dir.exists() {
            return Err(NoteError::Config(format!(
                "notes directory {} does not exist",
                notes_dir.display()
            )));
        }
        if !notes_dir.is_dir() {
            return Err(NoteError::Config(format!(
                "notes path {} is not a directory",
                notes_dir.display()
            )));
        }

        let editor_line = flags
            .editor
            .clone()
            .or_else(|| env(EDITOR_ENV))
            .unwrap_or_else(|| DEFAULT_EDITOR.to_string());
        let editor = EditorCommand::parse(&editor_line)
            .ok_or_else(|| NoteError::Config("editor command is empty".to_string()))?;

        let background = match flags.theme.unwrap_or(ThemeMode::Auto) {
            ThemeMode::Auto => Background::from_colorfgbg(env(COLORFGBG_ENV).as_deref()),
            ThemeMode::Light => Background::Light,
            ThemeMode::Dark => Background::Dark,
        };

        Ok(Self {
            notes_dir,
            editor,
            background,
            mouse: !flags.no_mouse,
            log_file: flags
                .log_file
                .clone()
                .or_else(|| env(LOG_FILE_ENV).map(PathBuf::from)),
            global_path: None,
            local_path: None,
        })
    }

    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.global_path = global_path;
        self.local_path = local_path;
        self
    }
}
