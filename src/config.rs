//! Configuration loading for the lesson reader.
//!
//! All user-tunable settings are centralized here and loaded from
//! `conf/config.toml` if present. Any missing or invalid entries fall back to
//! sensible defaults so the UI can still launch.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// High-level app configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeMode,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f32,
    #[serde(default = "default_margin")]
    pub margin_horizontal: u16,
    #[serde(default = "default_margin")]
    pub margin_vertical: u16,
    /// Signed lead applied to playback time before resolving the active
    /// segment; compensates for rendering/audio lead.
    #[serde(default = "default_sync_offset")]
    pub sync_offset_secs: f32,
    /// How often the player position is polled while playing.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_auto_scroll")]
    pub auto_scroll: bool,
    /// Center the active segment in the viewport instead of anchoring it near
    /// the top.
    #[serde(default = "default_center_active")]
    pub center_active_segment: bool,
    #[serde(default = "default_playback_rate")]
    pub playback_rate: f32,
    /// Percent, 0..=100.
    #[serde(default = "default_volume")]
    pub volume: u8,
    #[serde(default = "default_show_video")]
    pub show_video: bool,
    #[serde(default = "default_show_settings")]
    pub show_settings: bool,
    #[serde(default = "default_day_highlight")]
    pub day_highlight: HighlightColor,
    #[serde(default = "default_night_highlight")]
    pub night_highlight: HighlightColor,
    #[serde(default = "default_window_width")]
    pub window_width: f32,
    #[serde(default = "default_window_height")]
    pub window_height: f32,
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            theme: ThemeMode::Night,
            font_size: default_font_size(),
            line_spacing: default_line_spacing(),
            margin_horizontal: default_margin(),
            margin_vertical: default_margin(),
            sync_offset_secs: default_sync_offset(),
            poll_interval_ms: default_poll_interval(),
            auto_scroll: default_auto_scroll(),
            center_active_segment: default_center_active(),
            playback_rate: default_playback_rate(),
            volume: default_volume(),
            show_video: default_show_video(),
            show_settings: default_show_settings(),
            day_highlight: default_day_highlight(),
            night_highlight: default_night_highlight(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            log_level: default_log_level(),
        }
    }
}

/// Theme mode.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeMode {
    Day,
    Night,
}

impl Default for ThemeMode {
    fn default() -> Self {
        ThemeMode::Night
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ThemeMode::Day => "Day",
            ThemeMode::Night => "Night",
        };
        write!(f, "{}", label)
    }
}

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err}");
            AppConfig::default()
        }
    }
}

fn default_font_size() -> u32 {
    16
}

fn default_line_spacing() -> f32 {
    1.2
}

fn default_margin() -> u16 {
    12
}

fn default_sync_offset() -> f32 {
    0.25
}

fn default_poll_interval() -> u64 {
    250
}

fn default_auto_scroll() -> bool {
    true
}

fn default_center_active() -> bool {
    true
}

fn default_playback_rate() -> f32 {
    1.0
}

fn default_volume() -> u8 {
    100
}

fn default_show_video() -> bool {
    true
}

fn default_show_settings() -> bool {
    true
}

fn default_day_highlight() -> HighlightColor {
    HighlightColor {
        r: 0.2,
        g: 0.4,
        b: 0.7,
        a: 0.15,
    }
}

fn default_night_highlight() -> HighlightColor {
    HighlightColor {
        r: 0.8,
        g: 0.8,
        b: 0.5,
        a: 0.2,
    }
}

fn default_window_width() -> f32 {
    1280.0
}

fn default_window_height() -> f32 {
    900.0
}

fn default_log_level() -> LogLevel {
    LogLevel::Debug
}

#[derive(Debug, Clone, Copy, serde::Deserialize, serde::Serialize)]
pub struct HighlightColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = load_config(Path::new("/nonexistent/lectern-config.toml"));
        assert_eq!(cfg.poll_interval_ms, 250);
        assert!((cfg.sync_offset_secs - 0.25).abs() < f32::EPSILON);
        assert!(cfg.auto_scroll);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: AppConfig =
            toml::from_str("font_size = 20\nsync_offset_secs = 0.5").expect("valid toml");
        assert_eq!(cfg.font_size, 20);
        assert!((cfg.sync_offset_secs - 0.5).abs() < f32::EPSILON);
        assert_eq!(cfg.poll_interval_ms, 250);
        assert_eq!(cfg.theme, ThemeMode::Night);
    }
}
