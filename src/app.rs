//! UI layer for the lesson reader.
//!
//! This module owns all GUI state and messages. It expects the caller to
//! provide the already-loaded lesson (see `lesson`) and derives the transcript
//! index and mind-map layout once at bootstrap.

mod messages;
mod state;
mod update;
mod view;

pub use messages::Message;
pub use state::App;

use crate::cache::ResumePoint;
use crate::config::AppConfig;
use crate::lesson::Lesson;
use iced::{Size, Theme, window};
use std::path::PathBuf;

/// Helper to launch the app with the provided lesson.
pub fn run_app(
    lesson: Lesson,
    config: AppConfig,
    lesson_path: PathBuf,
    resume: Option<ResumePoint>,
) -> iced::Result {
    let window_settings = window::Settings {
        size: Size::new(config.window_width, config.window_height),
        ..window::Settings::default()
    };

    iced::application("Lectern", App::update, App::view)
        .window(window_settings)
        .subscription(App::subscription)
        .theme(|app: &App| {
            if matches!(app.config.theme, crate::config::ThemeMode::Night) {
                Theme::Dark
            } else {
                Theme::Light
            }
        })
        .run_with(move || App::bootstrap(lesson, config, lesson_path, resume))
}
