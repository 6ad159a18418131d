// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Post-session ratings, stored one JSON object per line.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::{CoachError, Result};

/// Review log file name inside the data directory.
pub const REVIEWS_FILE: &str = "reviews.jsonl";

/// Lowest and highest accepted rating.
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// One session rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReview {
    /// Local time, `%Y-%m-%d %H:%M:%S`.
    pub timestamp: String,
    pub user: String,
    pub pose: String,
    pub rating: u8,
    pub comments: String,
}

/// Append-only review store.
#[derive(Debug, Clone)]
pub struct ReviewStore {
    path: PathBuf,
}

impl ReviewStore {
    /// Store backed by `reviews.jsonl` in `data_dir`.
    #[must_use]
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            path: data_dir.as_ref().join(REVIEWS_FILE),
        }
    }

    /// Append a review.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::ConfigError`] for a rating outside 1 to 5, or an I/O
    /// error if the file cannot be written.
    pub fn save(&self, user: &str, pose: &str, rating: u8, comments: &str) -> Result<SessionReview> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(CoachError::ConfigError(format!(
                "Rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
            )));
        }

        let review = SessionReview {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            user: user.to_string(),
            pose: pose.to_string(),
            rating,
            comments: comments.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", serde_json::to_string(&review)?)?;

        Ok(review)
    }

    /// All reviews by `user`, oldest first. A missing file yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line is not a valid review.
    pub fn history(&self, user: &str) -> Result<Vec<SessionReview>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(fs::File::open(&self.path)?);
        let mut reviews = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let review: SessionReview = serde_json::from_str(&line)?;
            if review.user == user {
                reviews.push(review);
            }
        }
        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_filter_by_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReviewStore::new(dir.path());

        store.save("Asha", "tree", 5, "Felt steady").unwrap();
        store.save("Ben", "plank", 3, "").unwrap();
        store.save("Asha", "downdog", 4, "Tight hamstrings").unwrap();

        let history = store.history("Asha").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].pose, "tree");
        assert_eq!(history[1].rating, 4);
        assert_eq!(history[0].timestamp.len(), "2024-01-01 10:00:00".len());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ReviewStore::new(dir.path()).history("anyone").unwrap().is_empty());
    }

    #[test]
    fn test_rating_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReviewStore::new(dir.path());
        assert!(matches!(store.save("Asha", "tree", 0, "").unwrap_err(), CoachError::ConfigError(_)));
        assert!(store.save("Asha", "tree", 6, "").is_err());
        assert!(store.history("Asha").unwrap().is_empty());
    }
}
