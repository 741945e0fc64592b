//! Transcript indexing and time-to-segment resolution.
//!
//! Segments arrive from the lesson file in whatever order the backend emitted
//! them, so they are normalized once into a time-sorted index. The resolver is
//! called on every playback tick and must stay allocation-free and O(log N).

use serde::Deserialize;
use tracing::debug;

/// A raw transcript entry as found in the lesson file.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    /// Start time in seconds.
    #[serde(default)]
    pub start: f64,
    /// Length in seconds. Informational; the active window of a segment runs
    /// until the next segment's start.
    #[serde(default)]
    pub duration: f64,
    /// Pre-formatted display timestamp, if the backend provided one.
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A transcript segment after sorting, tagged with its stable position.
#[derive(Debug, Clone)]
pub struct IndexedSegment {
    /// Zero-based position in the sorted index. This is the identity used for
    /// highlighting, auto-scroll targeting and click-to-seek.
    pub global_index: usize,
    pub text: String,
    pub start: f64,
    pub duration: f64,
    pub timestamp: Option<String>,
}

/// Time-sorted transcript with a parallel start-time array for lookup.
#[derive(Debug, Clone, Default)]
pub struct SegmentIndex {
    segments: Vec<IndexedSegment>,
    starts: Vec<f64>,
}

impl SegmentIndex {
    /// Sort the raw segments by start time and assign global indices.
    ///
    /// The sort is stable: segments sharing a start time keep their source
    /// order, which is the only tie-break signal a transcript carries.
    /// Callers must build once per transcript, not per tick.
    pub fn build(raw: &[TranscriptSegment]) -> Self {
        let mut segments: Vec<IndexedSegment> = raw
            .iter()
            .map(|segment| IndexedSegment {
                global_index: 0,
                text: segment.text.clone(),
                start: sanitize_seconds(segment.start),
                duration: sanitize_seconds(segment.duration),
                timestamp: segment.timestamp.clone(),
            })
            .collect();

        segments.sort_by(|a, b| {
            a.start
                .partial_cmp(&b.start)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for (idx, segment) in segments.iter_mut().enumerate() {
            segment.global_index = idx;
        }

        let starts = segments.iter().map(|segment| segment.start).collect();
        debug!(count = segments.len(), "Built transcript segment index");
        Self { segments, starts }
    }

    /// Resolve which segment should be highlighted at the given playback time.
    ///
    /// Lower-bound search for the rightmost start time not greater than
    /// `current_time + sync_offset`, clamped into range. A segment is active
    /// from its start until the next segment's start, so the answer before the
    /// first start clamps to index 0. `None` only when the transcript is
    /// empty.
    pub fn active_at(&self, current_time_secs: f64, sync_offset_secs: f64) -> Option<usize> {
        if self.starts.is_empty() {
            return None;
        }
        let target = current_time_secs + sync_offset_secs;
        let upper = self.starts.partition_point(|start| *start <= target);
        Some(upper.saturating_sub(1))
    }

    pub fn segments(&self) -> &[IndexedSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Start time of a segment, used for click-to-seek.
    pub fn start_of(&self, global_index: usize) -> Option<f64> {
        self.starts.get(global_index).copied()
    }
}

fn sanitize_seconds(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

/// `mm:ss` label for segments whose source carried no display timestamp.
pub fn format_timestamp(seconds: f64) -> String {
    let total = sanitize_seconds(seconds).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str, start: f64) -> TranscriptSegment {
        TranscriptSegment {
            text: text.to_string(),
            start,
            duration: 2.0,
            timestamp: None,
        }
    }

    #[test]
    fn sorts_by_start_and_assigns_positions() {
        let raw = vec![segment("c", 10.0), segment("a", 0.0), segment("b", 5.0)];
        let index = SegmentIndex::build(&raw);

        let texts: Vec<&str> = index.segments().iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        for (idx, seg) in index.segments().iter().enumerate() {
            assert_eq!(seg.global_index, idx, "global index must equal position");
        }
        for pair in index.segments().windows(2) {
            assert!(pair[0].start <= pair[1].start, "index must be sorted");
        }
    }

    #[test]
    fn ties_keep_source_order() {
        let raw = vec![segment("first", 3.0), segment("second", 3.0)];
        let index = SegmentIndex::build(&raw);
        assert_eq!(index.segments()[0].text, "first");
        assert_eq!(index.segments()[1].text, "second");
    }

    #[test]
    fn empty_transcript_resolves_to_none() {
        let index = SegmentIndex::build(&[]);
        assert!(index.is_empty());
        assert_eq!(index.active_at(0.0, 0.0), None);
        assert_eq!(index.active_at(1000.0, 0.25), None);
    }

    #[test]
    fn resolver_picks_last_started_segment() {
        let raw = vec![segment("c", 10.0), segment("a", 0.0), segment("b", 5.0)];
        let index = SegmentIndex::build(&raw);

        assert_eq!(index.active_at(6.0, 0.0), Some(1));
        assert_eq!(index.active_at(10.0, 0.0), Some(2));
        assert_eq!(index.active_at(4.9, 0.25), Some(1), "offset leads into b");
        assert_eq!(index.active_at(500.0, 0.0), Some(2), "past the end stays on last");
    }

    #[test]
    fn resolver_clamps_before_first_start() {
        let raw = vec![segment("a", 2.0), segment("b", 5.0)];
        let index = SegmentIndex::build(&raw);
        assert_eq!(index.active_at(-1.0, 0.0), Some(0));
        assert_eq!(index.active_at(0.0, 0.0), Some(0));
    }

    #[test]
    fn resolver_bracket_property() {
        let raw: Vec<TranscriptSegment> = (0..50).map(|i| segment("s", i as f64 * 3.7)).collect();
        let index = SegmentIndex::build(&raw);
        let starts: Vec<f64> = index.segments().iter().map(|s| s.start).collect();

        for tenth in -10..600 {
            let t = tenth as f64 / 3.0;
            let i = index.active_at(t, 0.25).expect("non-empty transcript");
            let target = t + 0.25;
            if target >= starts[0] {
                assert!(starts[i] <= target, "start must have been reached at t={t}");
            }
            if i + 1 < starts.len() && target >= starts[0] {
                assert!(target < starts[i + 1], "next segment must not have started at t={t}");
            }
        }
    }

    #[test]
    fn non_finite_starts_collapse_to_zero() {
        let raw = vec![segment("bad", f64::NAN), segment("ok", 4.0)];
        let index = SegmentIndex::build(&raw);
        assert_eq!(index.segments()[0].start, 0.0);
        assert_eq!(index.active_at(0.0, 0.0), Some(0));
    }

    #[test]
    fn formats_fallback_timestamps() {
        assert_eq!(format_timestamp(0.0), "0:00");
        assert_eq!(format_timestamp(65.4), "1:05");
        assert_eq!(format_timestamp(600.0), "10:00");
    }
}
