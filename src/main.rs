//! Notecase - browse a directory of markdown notes in the terminal.
//!
//! # Usage
//!
//! ```bash
//! notecase
//! notecase --dir ~/work/notes
//! notecase --editor "code --wait" --save
//! ```

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use notecase::app::App;
use notecase::config::{
    Config, ConfigFlags, ThemeMode, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};

/// A terminal note browser with rendered markdown preview
#[derive(Parser, Debug)]
#[command(name = "notecase", version, about, long_about = None)]
struct Cli {
    /// Directory holding the notes (default: $NOTES_FOLDER, then ~/notes)
    #[arg(short, long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Editor command, arguments allowed (default: $EDITOR, then vi)
    #[arg(short, long, value_name = "COMMAND")]
    editor: Option<String>,

    /// Force the color scheme instead of reading COLORFGBG
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,

    /// Leave mouse events to the terminal
    #[arg(long)]
    no_mouse: bool,

    /// Append diagnostics to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults in the global config
    #[arg(long)]
    save: bool,

    /// Clear saved defaults in the global config
    #[arg(long)]
    clear: bool,
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
                )
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    // Raw tokens keep `--editor` values with spaces intact, same as the file format.
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    let home = dirs::home_dir();
    let config = Config::resolve(&effective, |key| std::env::var(key).ok(), home.as_deref())?
        .with_config_paths(
            Some(global_path),
            local_path.exists().then_some(local_path),
        );

    init_logging(config.log_file.as_deref())?;
    tracing::info!(
        dir = %config.notes_dir.display(),
        editor = %config.editor,
        background = ?config.background,
        "starting"
    );

    App::new(config).run().context("Application error")
}
