use iced::widget::scrollable::RelativeOffset;
use std::time::Instant;

/// Messages emitted by the UI.
#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    TogglePlayPause,
    SeekForward,
    SeekBackward,
    SegmentClicked(usize),
    JumpToActiveSegment,
    ToggleVideo,
    ToggleTheme,
    ToggleSettings,
    FontSizeChanged(u32),
    SyncOffsetChanged(f32),
    AutoScrollChanged(bool),
    CenterActiveChanged(bool),
    PlaybackRateChanged(f32),
    VolumeChanged(u8),
    DayHighlightChanged(Component, f32),
    NightHighlightChanged(Component, f32),
    Scrolled {
        offset: RelativeOffset,
        viewport_height: f32,
        content_height: f32,
    },
    Tick(Instant),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Transcript,
    MindMap,
}

#[derive(Debug, Clone, Copy)]
pub enum Component {
    R,
    G,
    B,
    A,
}
