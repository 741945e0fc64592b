use super::messages::{Message, Tab};
use super::state::{
    App, MAX_FONT_SIZE, MAX_PLAYBACK_RATE, MAX_SYNC_OFFSET_SECS, MIN_FONT_SIZE, MIN_PLAYBACK_RATE,
    SEEK_STEP_SECS, TRANSCRIPT_SCROLL_ID, apply_component,
};
use crate::playback::ControllerEvent;
use iced::keyboard::{self, Key};
use iced::time;
use iced::{Subscription, Task};
use std::time::Duration;
use tracing::{debug, info};

mod scroll;

impl App {
    pub fn subscription(app: &App) -> Subscription<Message> {
        let keys = keyboard::on_key_press(|key, _modifiers| match key.as_ref() {
            Key::Named(keyboard::key::Named::Space) => Some(Message::TogglePlayPause),
            Key::Named(keyboard::key::Named::ArrowRight) => Some(Message::SeekForward),
            Key::Named(keyboard::key::Named::ArrowLeft) => Some(Message::SeekBackward),
            Key::Character("j") => Some(Message::JumpToActiveSegment),
            _ => None,
        });

        if app.controller.wants_ticks() {
            Subscription::batch([
                keys,
                time::every(Duration::from_millis(app.config.poll_interval_ms))
                    .map(Message::Tick),
            ])
        } else {
            keys
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        let mut tasks: Vec<Task<Message>> = Vec::new();

        match message {
            Message::TabSelected(tab) => {
                if self.active_tab != tab {
                    debug!(?tab, "Switched tab");
                    self.active_tab = tab;
                    if tab == Tab::Transcript {
                        // Catch up on the highlight the moment the transcript
                        // is visible again; it never scrolls while hidden.
                        self.queue_auto_scroll(&mut tasks);
                    }
                }
            }
            Message::TogglePlayPause => {
                if self.controller.state().is_playing {
                    info!("Pausing playback");
                    self.controller.pause();
                } else {
                    info!("Starting playback");
                    self.controller.play();
                }
                self.apply_controller_events(&mut tasks);
            }
            Message::SeekForward => {
                self.seek_relative(SEEK_STEP_SECS, &mut tasks);
            }
            Message::SeekBackward => {
                self.seek_relative(-SEEK_STEP_SECS, &mut tasks);
            }
            Message::SegmentClicked(idx) => {
                if let Some(start) = self.segments.start_of(idx) {
                    info!(idx, start, "Segment clicked; seeking");
                    self.controller.seek_to(start);
                    self.active_segment = Some(idx);
                    self.queue_auto_scroll(&mut tasks);
                    self.apply_controller_events(&mut tasks);
                }
            }
            Message::JumpToActiveSegment => {
                if let Some(idx) = self.active_segment {
                    if let Some(offset) = self.scroll_offset_for_segment(idx) {
                        info!(idx, fraction = offset.y, "Jumping to active segment");
                        self.viewport.last_scroll_offset = offset;
                        tasks.push(iced::widget::scrollable::snap_to(
                            TRANSCRIPT_SCROLL_ID.clone(),
                            offset,
                        ));
                    }
                }
            }
            Message::ToggleVideo => {
                self.config.show_video = !self.config.show_video;
                info!(shown = self.config.show_video, "Toggled video visibility");
                self.controller.toggle_visibility(!self.config.show_video);
                self.apply_controller_events(&mut tasks);
                self.save_lesson_config();
            }
            Message::ToggleTheme => {
                self.config.theme = match self.config.theme {
                    crate::config::ThemeMode::Day => crate::config::ThemeMode::Night,
                    crate::config::ThemeMode::Night => crate::config::ThemeMode::Day,
                };
                info!(theme = %self.config.theme, "Toggled theme");
                self.save_lesson_config();
            }
            Message::ToggleSettings => {
                debug!("Toggled settings panel");
                self.config.show_settings = !self.config.show_settings;
                self.save_lesson_config();
            }
            Message::FontSizeChanged(size) => {
                let clamped = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
                if clamped != self.config.font_size {
                    debug!(old = self.config.font_size, new = clamped, "Font size changed");
                    self.config.font_size = clamped;
                    self.save_lesson_config();
                }
            }
            Message::SyncOffsetChanged(offset) => {
                let clamped = offset.clamp(-MAX_SYNC_OFFSET_SECS, MAX_SYNC_OFFSET_SECS);
                if (clamped - self.config.sync_offset_secs).abs() > f32::EPSILON {
                    self.config.sync_offset_secs = clamped;
                    debug!(offset = clamped, "Sync offset changed");
                    self.save_lesson_config();
                    if self.refresh_active_segment() {
                        self.queue_auto_scroll(&mut tasks);
                    }
                }
            }
            Message::AutoScrollChanged(enabled) => {
                if self.config.auto_scroll != enabled {
                    self.config.auto_scroll = enabled;
                    info!(enabled, "Updated auto-scroll to active segment");
                    self.save_lesson_config();
                    if enabled {
                        self.queue_auto_scroll(&mut tasks);
                    }
                }
            }
            Message::CenterActiveChanged(centered) => {
                if self.config.center_active_segment != centered {
                    self.config.center_active_segment = centered;
                    info!(centered, "Updated centered tracking preference");
                    self.save_lesson_config();
                    if self.config.auto_scroll {
                        self.queue_auto_scroll(&mut tasks);
                    }
                }
            }
            Message::PlaybackRateChanged(rate) => {
                let clamped = rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE);
                self.config.playback_rate = clamped;
                self.controller.set_playback_rate(clamped as f64);
                info!(rate = clamped, "Adjusted playback rate");
                self.save_lesson_config();
            }
            Message::VolumeChanged(volume) => {
                let clamped = volume.min(100);
                self.config.volume = clamped;
                self.controller.set_volume(clamped);
                debug!(volume = clamped, "Adjusted volume");
                self.save_lesson_config();
            }
            Message::DayHighlightChanged(component, value) => {
                self.config.day_highlight =
                    apply_component(self.config.day_highlight, component, value);
                debug!(?component, value, "Day highlight updated");
                self.save_lesson_config();
            }
            Message::NightHighlightChanged(component, value) => {
                self.config.night_highlight =
                    apply_component(self.config.night_highlight, component, value);
                debug!(?component, value, "Night highlight updated");
                self.save_lesson_config();
            }
            Message::Scrolled {
                offset,
                viewport_height,
                content_height,
            } => {
                self.viewport.last_scroll_offset = Self::sanitize_offset(offset);
                self.viewport.viewport_height = if viewport_height.is_finite() {
                    viewport_height.max(0.0)
                } else {
                    0.0
                };
                self.viewport.content_height = if content_height.is_finite() {
                    content_height.max(0.0)
                } else {
                    0.0
                };
            }
            Message::Tick(_now) => {
                self.controller.tick();
                self.apply_controller_events(&mut tasks);
                if self.refresh_active_segment() {
                    self.queue_auto_scroll(&mut tasks);
                    self.persist_resume();
                }
            }
        }

        if tasks.is_empty() {
            Task::none()
        } else {
            Task::batch(tasks)
        }
    }

    fn seek_relative(&mut self, delta_secs: f64, tasks: &mut Vec<Task<Message>>) {
        let state = self.controller.state();
        let upper = if state.duration > 0.0 {
            state.duration
        } else {
            f64::MAX
        };
        let target = (state.current_time + delta_secs).clamp(0.0, upper);
        info!(target, "Seeking relative");
        self.controller.seek_to(target);
        if self.refresh_active_segment() {
            self.queue_auto_scroll(tasks);
        }
        self.apply_controller_events(tasks);
    }

    /// Forward the controller's host notifications into app behavior.
    pub(in crate::app) fn apply_controller_events(&mut self, tasks: &mut Vec<Task<Message>>) {
        for event in self.controller.take_events() {
            match event {
                ControllerEvent::Ready => {
                    if let Some(resume) = self.resume.take() {
                        if resume.position_secs > 0.0 {
                            info!(
                                position = resume.position_secs,
                                "Restoring playback position"
                            );
                            self.controller.seek_to(resume.position_secs);
                            if self.refresh_active_segment() {
                                self.queue_auto_scroll(tasks);
                            }
                        }
                    }
                }
                ControllerEvent::Play => debug!("Playback started"),
                ControllerEvent::Pause => {
                    debug!("Playback paused");
                    self.persist_resume();
                }
                // The playhead is already mirrored into PlaybackState.
                ControllerEvent::TimeUpdate { .. } => {}
            }
        }
    }
}
