//! Playback controller: sole owner of the player instance and the timing
//! source for transcript synchronization.
//!
//! Exactly one instance is live at a time; initialize destroys any prior one
//! first. Polling is modelled as a flag the UI derives its timer subscription
//! from, so two rapid "playing" callbacks can never stack two tickers. No
//! operation here may propagate an error into the render path: backend
//! failures are logged and degraded to "no highlight" / "video hidden".

use crate::player::{PlayerEvent, PlayerInstance, PlayerPlayState, PlayerSdk};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Explicit lifecycle of the wrapped player, replacing ad hoc boolean flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Ready,
    Playing,
    Paused,
    Buffering,
    Destroyed,
}

/// Snapshot of playback, owned exclusively by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    /// Percent, 0..=100.
    pub volume: u8,
    pub playback_rate: f64,
    pub is_loading: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: 100,
            playback_rate: 1.0,
            is_loading: false,
        }
    }
}

/// Fire-and-forget notifications for the host; drained after each update.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    Ready,
    Play,
    Pause,
    TimeUpdate { current_time: f64, duration: f64 },
}

pub struct PlaybackController {
    sdk: Arc<dyn PlayerSdk>,
    instance: Option<Box<dyn PlayerInstance>>,
    lifecycle: Lifecycle,
    state: PlaybackState,
    video_id: Option<String>,
    duration_hint: Option<f64>,
    hidden: bool,
    polling: bool,
    poll_sessions: u64,
    events: Vec<ControllerEvent>,
}

impl PlaybackController {
    pub fn new(sdk: Arc<dyn PlayerSdk>) -> Self {
        Self {
            sdk,
            instance: None,
            lifecycle: Lifecycle::Uninitialized,
            state: PlaybackState::default(),
            video_id: None,
            duration_hint: None,
            hidden: false,
            polling: false,
            poll_sessions: 0,
            events: Vec::new(),
        }
    }

    /// Create the player for `video_id`, tearing down any prior instance.
    ///
    /// Skipped with a log when the SDK is not ready yet; the stored id lets a
    /// later retry (visibility toggle, explicit re-init) pick it up.
    pub fn initialize(&mut self, video_id: &str, duration_hint: Option<f64>) {
        self.video_id = Some(video_id.to_string());
        self.duration_hint = duration_hint;

        if !self.sdk.is_ready() {
            warn!(video_id, "Player SDK not ready; deferring initialization");
            return;
        }

        self.destroy_instance();
        match self.sdk.create(video_id, duration_hint) {
            Ok(instance) => {
                info!(video_id, "Initialized player instance");
                self.instance = Some(instance);
                self.lifecycle = Lifecycle::Uninitialized;
                self.state = PlaybackState {
                    is_loading: true,
                    ..PlaybackState::default()
                };
                self.drain_instance_events();
            }
            Err(err) => {
                warn!(video_id, "Player creation failed: {err:#}");
                self.lifecycle = Lifecycle::Uninitialized;
            }
        }
    }

    /// Swap the loaded media on the existing instance, or initialize when
    /// there is none yet.
    pub fn load_video(&mut self, video_id: &str, duration_hint: Option<f64>) {
        self.video_id = Some(video_id.to_string());
        self.duration_hint = duration_hint;
        match self.instance.as_mut() {
            Some(instance) => {
                info!(video_id, "Loading new media into existing player");
                instance.load(video_id, duration_hint);
                self.state.is_loading = true;
                self.state.current_time = 0.0;
                self.drain_instance_events();
            }
            None => self.initialize(video_id, duration_hint),
        }
    }

    pub fn play(&mut self) {
        if let Some(instance) = self.instance.as_mut() {
            instance.play();
            self.drain_instance_events();
        } else {
            debug!("Play requested without a player instance");
        }
    }

    pub fn pause(&mut self) {
        if let Some(instance) = self.instance.as_mut() {
            if let Err(err) = instance.pause() {
                warn!("Pause failed: {err:#}");
            }
            self.drain_instance_events();
        }
    }

    /// Seek and optimistically update the playhead so the transcript follows
    /// immediately instead of waiting for the next tick.
    pub fn seek_to(&mut self, seconds: f64) {
        if let Some(instance) = self.instance.as_mut() {
            instance.seek_to(seconds);
            self.state.current_time = seconds.max(0.0);
            debug!(seconds, "Seeked");
            self.drain_instance_events();
        }
    }

    pub fn set_volume(&mut self, volume: u8) {
        let volume = volume.min(100);
        self.state.volume = volume;
        if let Some(instance) = self.instance.as_mut() {
            instance.set_volume(volume);
        }
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        if !rate.is_finite() || rate <= 0.0 {
            return;
        }
        self.state.playback_rate = rate;
        if let Some(instance) = self.instance.as_mut() {
            instance.set_playback_rate(rate);
        }
    }

    /// Hide pauses best-effort (the backend may already be torn down and is
    /// allowed to fail); show reinitializes when the player was destroyed.
    pub fn toggle_visibility(&mut self, hidden: bool) {
        self.hidden = hidden;
        if hidden {
            if let Some(instance) = self.instance.as_mut() {
                if let Err(err) = instance.pause() {
                    debug!("Ignoring pause failure while hiding: {err:#}");
                }
                self.drain_instance_events();
            }
        } else if self.instance.is_none() {
            if let Some(video_id) = self.video_id.clone() {
                info!(%video_id, "Player shown again; reinitializing");
                let hint = self.duration_hint;
                self.initialize(&video_id, hint);
            }
        }
    }

    /// Stop polling and destroy the instance. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.stop_polling();
        self.destroy_instance();
        if self.lifecycle != Lifecycle::Destroyed {
            info!("Playback controller torn down");
        }
        self.lifecycle = Lifecycle::Destroyed;
        self.state.is_playing = false;
        self.state.is_loading = false;
    }

    /// One polling step: drain backend events, then refresh time/duration
    /// while the poll loop is live.
    pub fn tick(&mut self) {
        self.drain_instance_events();
        if !self.polling {
            return;
        }
        let Some(instance) = self.instance.as_ref() else {
            return;
        };
        self.state.current_time = instance.current_time();
        self.state.duration = instance.duration();
        self.state.playback_rate = instance.playback_rate();
        self.events.push(ControllerEvent::TimeUpdate {
            current_time: self.state.current_time,
            duration: self.state.duration,
        });
    }

    /// Whether the UI should keep a tick timer running.
    pub fn wants_ticks(&self) -> bool {
        self.polling
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn has_instance(&self) -> bool {
        self.instance.is_some()
    }

    /// Drain host-facing notifications accumulated since the last call.
    pub fn take_events(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.events)
    }

    fn drain_instance_events(&mut self) {
        let Some(instance) = self.instance.as_mut() else {
            return;
        };
        let events = instance.take_events();
        for event in events {
            self.apply_player_event(event);
        }
    }

    fn apply_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Ready => {
                if let Some(instance) = self.instance.as_ref() {
                    self.state.duration = instance.duration();
                    self.state.volume = instance.volume();
                }
                self.state.is_loading = false;
                if self.lifecycle == Lifecycle::Uninitialized {
                    self.lifecycle = Lifecycle::Ready;
                }
                debug!(duration = self.state.duration, "Player ready");
                self.events.push(ControllerEvent::Ready);
            }
            PlayerEvent::StateChange(state) => self.apply_play_state(state),
            PlayerEvent::Error(code) => {
                warn!(code, "Player error; playback degraded");
                self.state.is_loading = false;
                self.state.is_playing = false;
                self.stop_polling();
                if matches!(self.lifecycle, Lifecycle::Playing | Lifecycle::Buffering) {
                    self.lifecycle = Lifecycle::Paused;
                }
            }
        }
    }

    fn apply_play_state(&mut self, state: PlayerPlayState) {
        match state {
            PlayerPlayState::Playing => {
                if !self.state.is_playing {
                    self.events.push(ControllerEvent::Play);
                }
                self.state.is_playing = true;
                self.state.is_loading = false;
                self.lifecycle = Lifecycle::Playing;
                if let Some(instance) = self.instance.as_ref() {
                    self.state.current_time = instance.current_time();
                    self.state.duration = instance.duration();
                    self.state.playback_rate = instance.playback_rate();
                }
                self.start_polling();
            }
            PlayerPlayState::Paused => {
                if self.state.is_playing {
                    self.events.push(ControllerEvent::Pause);
                }
                self.state.is_playing = false;
                self.lifecycle = Lifecycle::Paused;
                self.stop_polling();
            }
            PlayerPlayState::Buffering => {
                // Keep any live poll loop running so the resume event is
                // observed; a paused player stays paused.
                self.state.is_loading = true;
                self.lifecycle = Lifecycle::Buffering;
            }
            PlayerPlayState::Ended => {
                if self.state.is_playing {
                    self.events.push(ControllerEvent::Pause);
                }
                self.state.is_playing = false;
                self.state.current_time = self.state.duration;
                self.lifecycle = Lifecycle::Paused;
                self.stop_polling();
                info!("Playback reached end of media");
            }
            PlayerPlayState::Unstarted => {
                self.state.is_playing = false;
            }
        }
    }

    fn start_polling(&mut self) {
        if self.polling {
            return;
        }
        self.polling = true;
        self.poll_sessions += 1;
        debug!(session = self.poll_sessions, "Started poll loop");
    }

    fn stop_polling(&mut self) {
        if self.polling {
            debug!("Stopped poll loop");
        }
        self.polling = false;
    }

    fn destroy_instance(&mut self) {
        if let Some(mut instance) = self.instance.take() {
            instance.destroy();
            debug!("Destroyed player instance");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct FakeShared {
        calls: Vec<String>,
        created: usize,
        pause_fails: bool,
    }

    struct FakeSdk {
        ready: bool,
        shared: Rc<RefCell<FakeShared>>,
    }

    impl FakeSdk {
        fn new(ready: bool) -> Self {
            Self {
                ready,
                shared: Rc::new(RefCell::new(FakeShared::default())),
            }
        }
    }

    impl PlayerSdk for FakeSdk {
        fn is_ready(&self) -> bool {
            self.ready
        }

        fn create(
            &self,
            _video_id: &str,
            duration_hint: Option<f64>,
        ) -> anyhow::Result<Box<dyn PlayerInstance>> {
            self.shared.borrow_mut().created += 1;
            Ok(Box::new(FakePlayer {
                shared: Rc::clone(&self.shared),
                events: vec![PlayerEvent::Ready],
                duration: duration_hint.unwrap_or(300.0),
                time: 0.0,
            }))
        }
    }

    struct FakePlayer {
        shared: Rc<RefCell<FakeShared>>,
        events: Vec<PlayerEvent>,
        duration: f64,
        time: f64,
    }

    impl PlayerInstance for FakePlayer {
        fn load(&mut self, _video_id: &str, duration_hint: Option<f64>) {
            self.shared.borrow_mut().calls.push("load".into());
            self.duration = duration_hint.unwrap_or(self.duration);
            self.time = 0.0;
        }

        fn play(&mut self) {
            self.shared.borrow_mut().calls.push("play".into());
            self.events
                .push(PlayerEvent::StateChange(PlayerPlayState::Playing));
        }

        fn pause(&mut self) -> anyhow::Result<()> {
            let fails = {
                let mut shared = self.shared.borrow_mut();
                shared.calls.push("pause".into());
                shared.pause_fails
            };
            if fails {
                return Err(anyhow!("backend torn down"));
            }
            self.events
                .push(PlayerEvent::StateChange(PlayerPlayState::Paused));
            Ok(())
        }

        fn seek_to(&mut self, seconds: f64) {
            self.shared.borrow_mut().calls.push("seek".into());
            self.time = seconds;
        }

        fn current_time(&self) -> f64 {
            self.time
        }

        fn duration(&self) -> f64 {
            self.duration
        }

        fn volume(&self) -> u8 {
            80
        }

        fn set_volume(&mut self, _volume: u8) {}

        fn playback_rate(&self) -> f64 {
            1.0
        }

        fn set_playback_rate(&mut self, _rate: f64) {}

        fn destroy(&mut self) {
            self.shared.borrow_mut().calls.push("destroy".into());
        }

        fn take_events(&mut self) -> Vec<PlayerEvent> {
            std::mem::take(&mut self.events)
        }
    }

    fn ready_controller() -> (PlaybackController, Rc<RefCell<FakeShared>>) {
        let sdk = FakeSdk::new(true);
        let shared = Rc::clone(&sdk.shared);
        let mut controller = PlaybackController::new(Arc::new(sdk));
        controller.initialize("vid", Some(300.0));
        (controller, shared)
    }

    #[test]
    fn ready_event_populates_duration_and_volume() {
        let (mut controller, _) = ready_controller();
        assert_eq!(controller.lifecycle(), Lifecycle::Ready);
        assert_eq!(controller.state().duration, 300.0);
        assert_eq!(controller.state().volume, 80);
        assert!(!controller.state().is_loading);
        assert!(controller.take_events().contains(&ControllerEvent::Ready));
    }

    #[test]
    fn unready_sdk_defers_initialization() {
        let sdk = FakeSdk::new(false);
        let shared = Rc::clone(&sdk.shared);
        let mut controller = PlaybackController::new(Arc::new(sdk));

        controller.initialize("vid", None);
        assert!(!controller.has_instance());
        assert_eq!(controller.lifecycle(), Lifecycle::Uninitialized);
        assert_eq!(shared.borrow().created, 0);
    }

    #[test]
    fn initialize_replaces_the_prior_instance() {
        let (mut controller, shared) = ready_controller();
        controller.initialize("other", None);
        assert_eq!(shared.borrow().created, 2);
        assert_eq!(
            shared
                .borrow()
                .calls
                .iter()
                .filter(|c| c.as_str() == "destroy")
                .count(),
            1,
            "first instance must be destroyed before the second is created"
        );
    }

    #[test]
    fn double_playing_event_starts_one_poll_session() {
        let (mut controller, _) = ready_controller();
        controller.apply_player_event(PlayerEvent::StateChange(PlayerPlayState::Playing));
        controller.apply_player_event(PlayerEvent::StateChange(PlayerPlayState::Playing));

        assert!(controller.wants_ticks());
        assert_eq!(controller.poll_sessions, 1, "no overlapping tickers");
        let plays = controller
            .take_events()
            .into_iter()
            .filter(|e| *e == ControllerEvent::Play)
            .count();
        assert_eq!(plays, 1, "host sees a single play notification");
    }

    #[test]
    fn pause_stops_polling() {
        let (mut controller, _) = ready_controller();
        controller.play();
        assert!(controller.wants_ticks());
        controller.pause();
        assert!(!controller.wants_ticks());
        assert_eq!(controller.lifecycle(), Lifecycle::Paused);
    }

    #[test]
    fn tick_reports_time_updates_while_polling() {
        let (mut controller, _) = ready_controller();
        controller.play();
        let _ = controller.take_events();
        controller.tick();
        let events = controller.take_events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, ControllerEvent::TimeUpdate { .. })),
            "tick during playback must emit a time update"
        );
    }

    #[test]
    fn error_event_clears_loading_and_stops_polling() {
        let (mut controller, _) = ready_controller();
        controller.play();
        controller.apply_player_event(PlayerEvent::Error(2));
        assert!(!controller.wants_ticks());
        assert!(!controller.state().is_loading);
        assert!(!controller.state().is_playing);
        assert_eq!(controller.lifecycle(), Lifecycle::Paused);
    }

    #[test]
    fn teardown_twice_is_idempotent() {
        let (mut controller, shared) = ready_controller();
        controller.teardown();
        controller.teardown();

        assert_eq!(controller.lifecycle(), Lifecycle::Destroyed);
        assert!(!controller.wants_ticks());
        assert_eq!(
            shared
                .borrow()
                .calls
                .iter()
                .filter(|c| c.as_str() == "destroy")
                .count(),
            1,
            "destroy must run once"
        );
    }

    #[test]
    fn hide_swallows_pause_failures() {
        let sdk = FakeSdk::new(true);
        let shared = Rc::clone(&sdk.shared);
        let mut controller = PlaybackController::new(Arc::new(sdk));
        controller.initialize("vid", None);
        shared.borrow_mut().pause_fails = true;

        controller.toggle_visibility(true);
        assert!(controller.is_hidden());
        assert!(
            shared.borrow().calls.iter().any(|c| c == "pause"),
            "hide attempts a best-effort pause"
        );
    }

    #[test]
    fn show_after_teardown_reinitializes() {
        let (mut controller, shared) = ready_controller();
        controller.teardown();
        controller.toggle_visibility(false);
        assert!(controller.has_instance());
        assert_eq!(shared.borrow().created, 2);
    }

    #[test]
    fn seek_updates_time_optimistically() {
        let (mut controller, _) = ready_controller();
        controller.seek_to(42.0);
        assert_eq!(controller.state().current_time, 42.0);
    }

    #[test]
    fn load_video_reuses_the_instance() {
        let (mut controller, shared) = ready_controller();
        controller.load_video("next", Some(120.0));
        assert_eq!(shared.borrow().created, 1, "no recreation on media swap");
        assert!(shared.borrow().calls.iter().any(|c| c == "load"));
    }
}
