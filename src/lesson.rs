//! Lesson file loading.
//!
//! A lesson is a single JSON document exported by the course backend: video
//! id, optional transcript segments, optional mind-map tree. The loader only
//! parses; indexing and layout are derived later, once, by the app state.

use crate::mindmap::MindMapSource;
use crate::transcript::TranscriptSegment;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Lesson {
    #[serde(default)]
    pub title: Option<String>,
    pub video_id: String,
    /// Total video length, when the backend knows it ahead of playback.
    #[serde(default)]
    pub duration_secs: Option<f64>,
    #[serde(default)]
    pub transcript: Option<Transcript>,
    #[serde(default)]
    pub mind_map: Option<MindMapSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub transcript_segments: Vec<TranscriptSegment>,
}

impl Lesson {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(self.video_id.as_str())
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        self.transcript
            .as_ref()
            .map(|t| t.transcript_segments.as_slice())
            .unwrap_or(&[])
    }
}

pub fn load_lesson(path: &Path) -> Result<Lesson> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Reading lesson file {}", path.display()))?;
    let lesson: Lesson = serde_json::from_str(&data)
        .with_context(|| format!("Parsing lesson JSON {}", path.display()))?;
    info!(
        video_id = %lesson.video_id,
        segments = lesson.segments().len(),
        has_mind_map = lesson.mind_map.is_some(),
        "Loaded lesson"
    );
    Ok(lesson)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_lesson() {
        let json = r#"{
            "title": "Ownership in Rust",
            "video_id": "abc123",
            "duration_secs": 612.5,
            "transcript": {
                "transcript_segments": [
                    {"text": "Welcome back.", "start": 0.0, "duration": 2.4},
                    {"text": "Today: the borrow checker.", "start": 2.4, "duration": 3.1, "timestamp": "0:02"}
                ]
            },
            "mind_map": {
                "root": "Ownership",
                "nodes": [{"id": "a", "label": "Moves", "children": []}]
            }
        }"#;
        let lesson: Lesson = serde_json::from_str(json).expect("lesson should parse");

        assert_eq!(lesson.display_title(), "Ownership in Rust");
        assert_eq!(lesson.segments().len(), 2);
        assert_eq!(lesson.segments()[1].timestamp.as_deref(), Some("0:02"));
        assert_eq!(lesson.mind_map.as_ref().unwrap().nodes.len(), 1);
    }

    #[test]
    fn transcript_and_mind_map_are_optional() {
        let lesson: Lesson =
            serde_json::from_str(r#"{"video_id": "xyz"}"#).expect("minimal lesson should parse");
        assert!(lesson.segments().is_empty());
        assert!(lesson.mind_map.is_none());
        assert_eq!(lesson.display_title(), "xyz");
    }
}
