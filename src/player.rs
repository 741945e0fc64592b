//! Player backends behind an injected SDK abstraction.
//!
//! The playback controller never talks to a concrete backend; it receives a
//! `PlayerSdk` and works against `PlayerInstance`. Embed SDKs deliver
//! lifecycle callbacks; in this pull-based rendition an instance queues
//! `PlayerEvent`s and the controller drains them on each operation and tick.
//!
//! `ClockPlayerSdk` is the built-in backend: a wall-clock simulation that
//! advances the playhead at the configured rate. Hosts embedding a real
//! player supply their own `PlayerSdk` implementation.

use anyhow::{Result, anyhow};
use std::time::Instant;
use tracing::{debug, info};

/// Play states reported by a backend, mirroring the usual embed-SDK enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPlayState {
    Unstarted,
    Playing,
    Paused,
    Buffering,
    Ended,
}

/// Lifecycle callbacks a backend queues for the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    Ready,
    StateChange(PlayerPlayState),
    Error(u32),
}

pub trait PlayerSdk {
    /// Whether the backend can create instances yet. Controllers skip
    /// initialization and retry later while this is false.
    fn is_ready(&self) -> bool;

    fn create(&self, video_id: &str, duration_hint: Option<f64>)
    -> Result<Box<dyn PlayerInstance>>;
}

pub trait PlayerInstance {
    /// Swap the loaded media without recreating the instance.
    fn load(&mut self, video_id: &str, duration_hint: Option<f64>);
    fn play(&mut self);
    /// May fail on a torn-down backend; callers on defensive paths swallow it.
    fn pause(&mut self) -> Result<()>;
    fn seek_to(&mut self, seconds: f64);
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn volume(&self) -> u8;
    fn set_volume(&mut self, volume: u8);
    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&mut self, rate: f64);
    fn destroy(&mut self);
    /// Drain queued lifecycle events, oldest first.
    fn take_events(&mut self) -> Vec<PlayerEvent>;
}

/// Simulated backend; always ready.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockPlayerSdk;

impl PlayerSdk for ClockPlayerSdk {
    fn is_ready(&self) -> bool {
        true
    }

    fn create(
        &self,
        video_id: &str,
        duration_hint: Option<f64>,
    ) -> Result<Box<dyn PlayerInstance>> {
        info!(video_id, ?duration_hint, "Creating clock player");
        Ok(Box::new(ClockPlayer::new(video_id, duration_hint)))
    }
}

/// Wall-clock playhead simulation. While playing, the position advances at
/// `rate` seconds of media per wall second, clamped to the duration.
pub struct ClockPlayer {
    video_id: String,
    position: f64,
    duration: f64,
    rate: f64,
    volume: u8,
    state: PlayerPlayState,
    playing_since: Option<Instant>,
    destroyed: bool,
    events: Vec<PlayerEvent>,
}

const FALLBACK_DURATION_SECS: f64 = 600.0;

impl ClockPlayer {
    fn new(video_id: &str, duration_hint: Option<f64>) -> Self {
        let mut player = Self {
            video_id: video_id.to_string(),
            position: 0.0,
            duration: duration_hint
                .filter(|d| d.is_finite() && *d > 0.0)
                .unwrap_or(FALLBACK_DURATION_SECS),
            rate: 1.0,
            volume: 100,
            state: PlayerPlayState::Unstarted,
            playing_since: None,
            destroyed: false,
            events: Vec::new(),
        };
        player.events.push(PlayerEvent::Ready);
        player
    }

    /// Fold elapsed wall time into `position` and emit `Ended` on reaching
    /// the duration.
    fn refresh(&mut self) {
        if let Some(since) = self.playing_since.take() {
            self.position += since.elapsed().as_secs_f64() * self.rate;
            if self.state == PlayerPlayState::Playing {
                self.playing_since = Some(Instant::now());
            }
        }
        if self.position >= self.duration && self.state == PlayerPlayState::Playing {
            self.position = self.duration;
            self.playing_since = None;
            self.state = PlayerPlayState::Ended;
            self.events.push(PlayerEvent::StateChange(PlayerPlayState::Ended));
            debug!(video_id = %self.video_id, "Clock player reached end of media");
        }
    }

    fn push_state(&mut self, state: PlayerPlayState) {
        self.state = state;
        self.events.push(PlayerEvent::StateChange(state));
    }
}

impl PlayerInstance for ClockPlayer {
    fn load(&mut self, video_id: &str, duration_hint: Option<f64>) {
        if self.destroyed {
            return;
        }
        info!(video_id, "Clock player loading new media");
        self.video_id = video_id.to_string();
        self.position = 0.0;
        self.duration = duration_hint
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(FALLBACK_DURATION_SECS);
        self.playing_since = None;
        self.push_state(PlayerPlayState::Buffering);
        self.events.push(PlayerEvent::Ready);
        self.state = PlayerPlayState::Unstarted;
    }

    fn play(&mut self) {
        if self.destroyed {
            return;
        }
        self.refresh();
        if self.state == PlayerPlayState::Playing {
            return;
        }
        if self.state == PlayerPlayState::Ended {
            self.position = 0.0;
        }
        self.playing_since = Some(Instant::now());
        self.push_state(PlayerPlayState::Playing);
    }

    fn pause(&mut self) -> Result<()> {
        if self.destroyed {
            return Err(anyhow!("player instance already destroyed"));
        }
        self.refresh();
        if self.state == PlayerPlayState::Playing {
            self.playing_since = None;
            self.push_state(PlayerPlayState::Paused);
        }
        Ok(())
    }

    fn seek_to(&mut self, seconds: f64) {
        if self.destroyed {
            return;
        }
        self.refresh();
        self.position = seconds.clamp(0.0, self.duration);
        if self.state == PlayerPlayState::Ended {
            self.state = PlayerPlayState::Paused;
        }
    }

    fn current_time(&self) -> f64 {
        let elapsed = self
            .playing_since
            .map(|since| since.elapsed().as_secs_f64() * self.rate)
            .unwrap_or(0.0);
        (self.position + elapsed).min(self.duration)
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn volume(&self) -> u8 {
        self.volume
    }

    fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        if rate.is_finite() && rate > 0.0 {
            self.refresh();
            self.rate = rate;
        }
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.playing_since = None;
        self.events.clear();
    }

    fn take_events(&mut self) -> Vec<PlayerEvent> {
        self.refresh();
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_queues_a_ready_event() {
        let mut player = ClockPlayer::new("vid", Some(120.0));
        assert_eq!(player.take_events(), vec![PlayerEvent::Ready]);
        assert_eq!(player.duration(), 120.0);
        assert_eq!(player.volume(), 100);
    }

    #[test]
    fn pause_after_destroy_fails() {
        let mut player = ClockPlayer::new("vid", None);
        player.destroy();
        assert!(player.pause().is_err());
    }

    #[test]
    fn seek_clamps_into_media_bounds() {
        let mut player = ClockPlayer::new("vid", Some(60.0));
        player.seek_to(500.0);
        assert_eq!(player.current_time(), 60.0);
        player.seek_to(-3.0);
        assert_eq!(player.current_time(), 0.0);
    }

    #[test]
    fn load_resets_the_playhead() {
        let mut player = ClockPlayer::new("vid", Some(60.0));
        player.seek_to(30.0);
        player.load("next", Some(90.0));
        assert_eq!(player.current_time(), 0.0);
        assert_eq!(player.duration(), 90.0);
        let events = player.take_events();
        assert!(events.contains(&PlayerEvent::StateChange(PlayerPlayState::Buffering)));
        assert!(events.iter().filter(|e| **e == PlayerEvent::Ready).count() >= 1);
    }

    #[test]
    fn play_emits_a_single_state_change() {
        let mut player = ClockPlayer::new("vid", Some(60.0));
        let _ = player.take_events();
        player.play();
        player.play();
        let events = player.take_events();
        assert_eq!(
            events,
            vec![PlayerEvent::StateChange(PlayerPlayState::Playing)]
        );
    }
}
