//! Auto-scroll synchronization between the playhead and the transcript list.
//!
//! The scrollable only reports relative offsets, so the target position is
//! reconstructed from estimated per-row heights. Estimates do not need to be
//! exact; they need to be monotone in the segment index and roughly
//! proportional to rendered height so the active row lands in view.

use super::super::messages::{Message, Tab};
use super::super::state::{App, TRANSCRIPT_SCROLL_ID};
use iced::Task;
use iced::widget::scrollable::{self, RelativeOffset};
use tracing::trace;

/// Fraction of the viewport kept above the active row when tracking is
/// top-anchored rather than centered.
const TOP_ANCHOR_FRACTION: f32 = 0.25;

/// Approximate glyph advance as a fraction of the font size, used to estimate
/// how many lines a segment wraps into.
const GLYPH_WIDTH_RATIO: f32 = 0.55;

/// Width reserved for the timestamp column and row padding.
const ROW_CHROME_WIDTH: f32 = 90.0;

impl App {
    /// Queue a snap to the active segment if tracking applies right now.
    pub(in crate::app) fn queue_auto_scroll(&mut self, tasks: &mut Vec<Task<Message>>) {
        if !self.config.auto_scroll || self.active_tab != Tab::Transcript {
            return;
        }
        let Some(idx) = self.active_segment else {
            return;
        };
        let Some(offset) = self.scroll_offset_for_segment(idx) else {
            return;
        };
        trace!(idx, fraction = offset.y, "Auto-scrolling to active segment");
        self.viewport.last_scroll_offset = offset;
        tasks.push(scrollable::snap_to(TRANSCRIPT_SCROLL_ID.clone(), offset));
    }

    /// Relative scroll offset that brings `idx` into view, or `None` when the
    /// transcript geometry is not known yet.
    pub(in crate::app) fn scroll_offset_for_segment(&self, idx: usize) -> Option<RelativeOffset> {
        let viewport = self.viewport.viewport_height;
        let content = self.viewport.content_height;
        if viewport <= 0.0 || content <= 0.0 {
            return None;
        }
        if viewport >= content {
            return Some(RelativeOffset::START);
        }

        let weights = self.estimate_row_weights();
        if idx >= weights.len() {
            return None;
        }
        let total: f32 = weights.iter().sum();
        if total <= 0.0 {
            return Some(RelativeOffset::START);
        }

        let before: f32 = weights[..idx].iter().sum();
        let row_top_px = before / total * content;
        let row_height_px = weights[idx] / total * content;

        let desired_top = if self.config.center_active_segment {
            row_top_px + row_height_px * 0.5 - viewport * 0.5
        } else {
            row_top_px - viewport * TOP_ANCHOR_FRACTION
        };
        let max_top = content - viewport;
        let y = (desired_top / max_top).clamp(0.0, 1.0);
        Some(RelativeOffset { x: 0.0, y })
    }

    /// Estimate relative row heights from wrapped line counts at the current
    /// font size and window width.
    fn estimate_row_weights(&self) -> Vec<f32> {
        let font_px = self.config.font_size as f32;
        let text_width = (self.config.window_width
            - 2.0 * self.config.margin_horizontal as f32
            - ROW_CHROME_WIDTH)
            .max(160.0);
        let chars_per_line = (text_width / (font_px * GLYPH_WIDTH_RATIO)).max(12.0);
        let line_height = self.config.line_spacing.max(0.8);

        self.segments
            .segments()
            .iter()
            .map(|segment| {
                let chars = segment.text.chars().count() as f32;
                let lines = (chars / chars_per_line).ceil().max(1.0);
                lines * line_height
            })
            .collect()
    }

    pub(in crate::app) fn sanitize_offset(offset: RelativeOffset) -> RelativeOffset {
        let clamp = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        RelativeOffset {
            x: clamp(offset.x),
            y: clamp(offset.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::lesson::{Lesson, Transcript};
    use crate::transcript::TranscriptSegment;
    use std::path::PathBuf;

    fn test_app(segment_count: usize) -> App {
        let segments = (0..segment_count)
            .map(|i| TranscriptSegment {
                text: format!(
                    "Segment {i}: a sentence long enough to wrap once or twice on a normal window."
                ),
                start: i as f64 * 4.0,
                duration: 4.0,
                timestamp: None,
            })
            .collect();
        let lesson = Lesson {
            title: Some("Scroll test".into()),
            video_id: "vid".into(),
            duration_secs: Some(600.0),
            transcript: Some(Transcript {
                transcript_segments: segments,
            }),
            mind_map: None,
        };
        let (mut app, _) = App::bootstrap(
            lesson,
            AppConfig::default(),
            PathBuf::from("/tmp/scroll-test.json"),
            None,
        );
        app.viewport.viewport_height = 600.0;
        app.viewport.content_height = 4000.0;
        app
    }

    #[test]
    fn no_offset_before_geometry_is_known() {
        let mut app = test_app(20);
        app.viewport.viewport_height = 0.0;
        app.viewport.content_height = 0.0;
        assert!(app.scroll_offset_for_segment(5).is_none());
    }

    #[test]
    fn short_content_stays_at_top() {
        let mut app = test_app(3);
        app.viewport.content_height = 200.0;
        let offset = app.scroll_offset_for_segment(2).expect("geometry known");
        assert_eq!(offset.y, 0.0);
    }

    #[test]
    fn offsets_grow_with_segment_index() {
        let app = test_app(40);
        let mut last = -1.0f32;
        for idx in 0..40 {
            let offset = app.scroll_offset_for_segment(idx).expect("geometry known");
            assert!(offset.y >= last, "offset must not move backwards at {idx}");
            assert!((0.0..=1.0).contains(&offset.y));
            last = offset.y;
        }
    }

    #[test]
    fn last_segment_clamps_to_bottom() {
        let app = test_app(40);
        let offset = app.scroll_offset_for_segment(39).expect("geometry known");
        assert_eq!(offset.y, 1.0);
    }

    #[test]
    fn centered_and_top_anchored_targets_differ() {
        let mut app = test_app(40);
        app.config.center_active_segment = true;
        let centered = app.scroll_offset_for_segment(20).expect("geometry known");
        app.config.center_active_segment = false;
        let anchored = app.scroll_offset_for_segment(20).expect("geometry known");
        assert!(
            centered.y < anchored.y,
            "centering scrolls less far than the top anchor for a mid row"
        );
    }

    #[test]
    fn out_of_range_index_yields_none() {
        let app = test_app(5);
        assert!(app.scroll_offset_for_segment(5).is_none());
    }

    #[test]
    fn sanitize_offset_clamps_and_defuses_nan() {
        let clean = App::sanitize_offset(RelativeOffset { x: f32::NAN, y: 1.7 });
        assert_eq!(clean.x, 0.0);
        assert_eq!(clean.y, 1.0);
    }
}
