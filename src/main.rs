//! Entry point for the lesson reader.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load the lesson JSON via `lesson`.
//! - Load user configuration from `conf/config.toml`.
//! - Launch the GUI application with the loaded lesson and config.

mod app;
mod cache;
mod config;
mod lesson;
mod mindmap;
mod playback;
mod player;
mod transcript;

use crate::app::run_app;
use crate::cache::{load_lesson_config, load_resume};
use crate::config::load_config;
use crate::lesson::load_lesson;
use anyhow::{Context, Result, anyhow};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let lesson_path = parse_args()?;
    let base_config = load_config(Path::new("conf/config.toml"));
    let mut config = base_config.clone();
    if let Some(mut overrides) = load_lesson_config(&lesson_path) {
        info!("Loaded per-lesson overrides from cache");
        // Always honor the base config's log level so user changes take effect.
        overrides.log_level = base_config.log_level;
        // Window size is a base setting, not a per-lesson one.
        overrides.window_width = base_config.window_width;
        overrides.window_height = base_config.window_height;
        config = overrides;
    }
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        path = %lesson_path.display(),
        level = %config.log_level,
        "Starting lesson reader"
    );
    let resume = load_resume(&lesson_path);
    if let Some(point) = &resume {
        info!(position = point.position_secs, "Resuming from cached position");
    }
    let lesson = load_lesson(&lesson_path)?;
    run_app(lesson, config, lesson_path, resume).context("Failed to start the GUI")?;
    Ok(())
}

fn parse_args() -> Result<PathBuf> {
    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| anyhow!("Usage: lectern <path-to-lesson.json>"))?;

    let path = PathBuf::from(path);
    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.as_path().display()));
    }
    Ok(path)
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
