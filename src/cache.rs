//! Per-lesson cache: playback resume point and config overrides.
//!
//! Files live under `.cache/` in a directory named after a hash of the lesson
//! path to avoid filesystem issues. Writes are best-effort; a failed save
//! never blocks the UI.

use crate::config::AppConfig;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

pub const CACHE_DIR: &str = ".cache";

/// Where playback left off for a lesson.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResumePoint {
    pub position_secs: f64,
    #[serde(default)]
    pub active_segment: Option<usize>,
}

pub fn load_resume(lesson_path: &Path) -> Option<ResumePoint> {
    let data = fs::read_to_string(resume_path(lesson_path)).ok()?;
    toml::from_str(&data).ok()
}

pub fn save_resume(lesson_path: &Path, resume: &ResumePoint) {
    let path = resume_path(lesson_path);
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if let Ok(contents) = toml::to_string(resume) {
        let _ = fs::write(path, contents);
    }
}

pub fn load_lesson_config(lesson_path: &Path) -> Option<AppConfig> {
    let path = hash_dir(lesson_path).join("config.toml");
    let data = fs::read_to_string(path).ok()?;
    toml::from_str(&data).ok()
}

pub fn save_lesson_config(lesson_path: &Path, config: &AppConfig) {
    let dir = hash_dir(lesson_path);
    let path = dir.join("config.toml");
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if let Ok(contents) = toml::to_string(config) {
        let _ = fs::write(path, contents);
    }
}

pub fn hash_dir(lesson_path: &Path) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(lesson_path.as_os_str().to_string_lossy().as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    Path::new(CACHE_DIR).join(hash)
}

fn resume_path(lesson_path: &Path) -> PathBuf {
    hash_dir(lesson_path).join("resume.toml")
}
