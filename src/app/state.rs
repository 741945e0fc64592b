use crate::cache::{ResumePoint, save_lesson_config, save_resume};
use crate::config::{AppConfig, HighlightColor, ThemeMode};
use crate::lesson::Lesson;
use crate::mindmap::{self, MindMapLayout};
use crate::playback::PlaybackController;
use crate::player::ClockPlayerSdk;
use crate::transcript::SegmentIndex;
use iced::widget::scrollable::Id as ScrollId;
use iced::widget::scrollable::RelativeOffset;
use iced::{Color, Task};
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::messages::{Component, Message, Tab};

/// Limits and defaults for reader controls.
pub(crate) const MIN_FONT_SIZE: u32 = 12;
pub(crate) const MAX_FONT_SIZE: u32 = 36;
pub(crate) const MIN_PLAYBACK_RATE: f32 = 0.25;
pub(crate) const MAX_PLAYBACK_RATE: f32 = 2.0;
pub(crate) const MAX_SYNC_OFFSET_SECS: f32 = 5.0;
pub(crate) const SEEK_STEP_SECS: f64 = 5.0;
pub(crate) static TRANSCRIPT_SCROLL_ID: Lazy<ScrollId> =
    Lazy::new(|| ScrollId::new("transcript-scroll"));

/// Last reported geometry of the transcript scrollable. Zeroed until the
/// first scroll event; the auto-scroll synchronizer treats that as "not
/// mounted yet" and stays quiet.
pub struct ViewportState {
    pub(super) last_scroll_offset: RelativeOffset,
    pub(super) viewport_height: f32,
    pub(super) content_height: f32,
}

impl ViewportState {
    fn new() -> Self {
        Self {
            last_scroll_offset: RelativeOffset::START,
            viewport_height: 0.0,
            content_height: 0.0,
        }
    }
}

/// Core application state.
pub struct App {
    pub(super) config: AppConfig,
    pub(super) lesson_path: PathBuf,
    pub(super) title: String,
    pub(super) video_id: String,
    pub(super) segments: SegmentIndex,
    pub(super) mind_map: MindMapLayout,
    pub(super) controller: PlaybackController,
    pub(super) active_tab: Tab,
    pub(super) active_segment: Option<usize>,
    pub(super) viewport: ViewportState,
    pub(super) resume: Option<ResumePoint>,
}

impl App {
    pub(super) fn bootstrap(
        lesson: Lesson,
        config: AppConfig,
        lesson_path: PathBuf,
        resume: Option<ResumePoint>,
    ) -> (App, Task<Message>) {
        let mut config = config;
        config.font_size = config.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        config.line_spacing = config.line_spacing.clamp(0.8, 2.5);
        config.playback_rate = config
            .playback_rate
            .clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE);
        config.sync_offset_secs = config
            .sync_offset_secs
            .clamp(-MAX_SYNC_OFFSET_SECS, MAX_SYNC_OFFSET_SECS);
        config.volume = config.volume.min(100);
        config.poll_interval_ms = config.poll_interval_ms.clamp(50, 2000);

        // Derived once per transcript; the polling path only reads.
        let segments = SegmentIndex::build(lesson.segments());
        let mind_map = lesson
            .mind_map
            .as_ref()
            .map(mindmap::layout)
            .unwrap_or_default();

        let mut controller = PlaybackController::new(Arc::new(ClockPlayerSdk));
        controller.initialize(&lesson.video_id, lesson.duration_secs);
        controller.set_volume(config.volume);
        controller.set_playback_rate(config.playback_rate as f64);

        let mut app = App {
            title: lesson.display_title().to_string(),
            video_id: lesson.video_id.clone(),
            segments,
            mind_map,
            controller,
            active_tab: Tab::Transcript,
            active_segment: None,
            viewport: ViewportState::new(),
            resume,
            config,
            lesson_path,
        };

        info!(
            title = %app.title,
            segments = app.segments.len(),
            mind_map_nodes = app.mind_map.nodes.len(),
            "Initialized app state"
        );

        // The backend may have reported ready during initialize; drain now so
        // the cached resume position is restored before the first render.
        let mut tasks = Vec::new();
        app.apply_controller_events(&mut tasks);

        let task = if tasks.is_empty() {
            Task::none()
        } else {
            Task::batch(tasks)
        };
        (app, task)
    }

    /// Re-resolve the active segment from the current playhead. Returns
    /// whether the highlight moved.
    pub(super) fn refresh_active_segment(&mut self) -> bool {
        let resolved = self.segments.active_at(
            self.controller.state().current_time,
            self.config.sync_offset_secs as f64,
        );
        if resolved != self.active_segment {
            self.active_segment = resolved;
            true
        } else {
            false
        }
    }

    pub(super) fn highlight_color(&self) -> Color {
        let base = if matches!(self.config.theme, ThemeMode::Night) {
            self.config.night_highlight
        } else {
            self.config.day_highlight
        };
        Color {
            r: base.r,
            g: base.g,
            b: base.b,
            a: base.a,
        }
    }

    pub(super) fn save_lesson_config(&self) {
        save_lesson_config(&self.lesson_path, &self.config);
    }

    pub(super) fn persist_resume(&self) {
        let resume = ResumePoint {
            position_secs: self.controller.state().current_time,
            active_segment: self.active_segment,
        };
        save_resume(&self.lesson_path, &resume);
    }
}

pub(crate) fn apply_component(
    mut color: HighlightColor,
    component: Component,
    value: f32,
) -> HighlightColor {
    let clamped = value.clamp(0.0, 1.0);
    match component {
        Component::R => color.r = clamped,
        Component::G => color.g = clamped,
        Component::B => color.b = clamped,
        Component::A => color.a = clamped,
    }
    color
}
