// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Practice session log.
//!
//! Sessions are kept in memory and persisted as a JSON array in the data directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Session log file name inside the data directory.
pub const SESSIONS_FILE: &str = "sessions.json";

/// Estimated energy use in kcal per minute of practice.
pub const KCAL_PER_MINUTE: f32 = 3.0;

/// One logged practice session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Local start time, `%Y-%m-%d %H:%M`.
    pub date: String,
    /// Duration in minutes, one decimal.
    pub duration: f32,
    /// Practiced poses joined with ", ".
    pub poses: String,
    /// Average heart rate, if it was measured.
    pub avg_hr: Option<f32>,
    /// Estimated kcal, one decimal.
    pub calories: f32,
}

/// Aggregate statistics over the log.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub total_duration: f32,
    pub avg_duration: f32,
    pub fav_pose: String,
}

fn round1(v: f32) -> f32 {
    (v * 10.0).round() / 10.0
}

/// In-memory session log with optional file backing.
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    sessions: Vec<SessionRecord>,
    path: Option<PathBuf>,
}

impl SessionTracker {
    /// Create an empty, unsaved log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the log in `data_dir`, starting empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let path = data_dir.as_ref().join(SESSIONS_FILE);
        let sessions = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Vec::new()
        };
        Ok(Self {
            sessions,
            path: Some(path),
        })
    }

    /// Record a session.
    pub fn add_session(&mut self, duration_minutes: f32, poses: &[String], avg_hr: Option<f32>) -> &SessionRecord {
        let record = SessionRecord {
            date: Local::now().format("%Y-%m-%d %H:%M").to_string(),
            duration: round1(duration_minutes),
            poses: poses.join(", "),
            avg_hr,
            calories: round1(duration_minutes * KCAL_PER_MINUTE),
        };
        self.sessions.push(record);
        &self.sessions[self.sessions.len() - 1]
    }

    /// Write the log back to its file. A log created with [`SessionTracker::new`] is
    /// not saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.sessions)?)?;
        Ok(())
    }

    #[must_use]
    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    /// Totals, average duration and most frequent pose list.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        if self.sessions.is_empty() {
            return SessionStats {
                total_sessions: 0,
                total_duration: 0.0,
                avg_duration: 0.0,
                fav_pose: "N/A".to_string(),
            };
        }

        let total: f32 = self.sessions.iter().map(|s| s.duration).sum();

        // Most frequent entry; ties go to the one seen first
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for s in &self.sessions {
            match counts.iter_mut().find(|(p, _)| *p == s.poses) {
                Some((_, n)) => *n += 1,
                None => counts.push((s.poses.as_str(), 1)),
            }
        }
        let max = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
        let fav_pose = counts
            .iter()
            .find(|(_, n)| *n == max)
            .map_or_else(|| "N/A".to_string(), |(p, _)| (*p).to_string());

        SessionStats {
            total_sessions: self.sessions.len(),
            total_duration: round1(total),
            avg_duration: round1(total / self.sessions.len() as f32),
            fav_pose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poses(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_add_session_rounding_and_calories() {
        let mut tracker = SessionTracker::new();
        let record = tracker.add_session(12.345, &poses(&["tree", "plank"]), Some(80.0)).clone();
        assert!((record.duration - 12.3).abs() < 1e-4);
        assert!((record.calories - 37.0).abs() < 1e-4);
        assert_eq!(record.poses, "tree, plank");
        assert_eq!(record.date.len(), "2024-01-01 10:00".len());
    }

    #[test]
    fn test_empty_stats() {
        let stats = SessionTracker::new().stats();
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.fav_pose, "N/A");
    }

    #[test]
    fn test_stats() {
        let mut tracker = SessionTracker::new();
        tracker.add_session(10.0, &poses(&["tree"]), None);
        tracker.add_session(20.0, &poses(&["plank"]), None);
        tracker.add_session(15.0, &poses(&["plank"]), None);

        let stats = tracker.stats();
        assert_eq!(stats.total_sessions, 3);
        assert!((stats.total_duration - 45.0).abs() < 1e-4);
        assert!((stats.avg_duration - 15.0).abs() < 1e-4);
        assert_eq!(stats.fav_pose, "plank");
    }

    #[test]
    fn test_favourite_tie_goes_to_first() {
        let mut tracker = SessionTracker::new();
        tracker.add_session(5.0, &poses(&["warrior2"]), None);
        tracker.add_session(5.0, &poses(&["downdog"]), None);
        assert_eq!(tracker.stats().fav_pose, "warrior2");
    }

    #[test]
    fn test_persistence() {
        let dir = tempfile::tempdir().unwrap();

        let mut tracker = SessionTracker::open(dir.path()).unwrap();
        assert!(tracker.sessions().is_empty());
        tracker.add_session(8.0, &poses(&["goddess"]), Some(75.5));
        tracker.save().unwrap();

        let reopened = SessionTracker::open(dir.path()).unwrap();
        assert_eq!(reopened.sessions(), tracker.sessions());
    }
}
