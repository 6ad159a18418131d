// Yoga Pose Coach 🧘 AGPL-3.0 License

//! User profile.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoachError, Result};

/// Profile file name inside the data directory.
pub const PROFILE_FILE: &str = "profile.json";

/// Practice experience level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Experience {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        };
        f.write_str(s)
    }
}

impl FromStr for Experience {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(CoachError::ConfigError(format!("Unknown experience level: {other}"))),
        }
    }
}

/// Practitioner profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    /// Body weight in kg.
    pub weight: f32,
    /// Height in cm.
    pub height: f32,
    pub goals: Vec<String>,
    pub experience: Experience,
    pub health_notes: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "New User".to_string(),
            age: 25,
            weight: 65.0,
            height: 170.0,
            goals: vec!["Flexibility".to_string()],
            experience: Experience::Beginner,
            health_notes: String::new(),
        }
    }
}

/// Partial profile update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub weight: Option<f32>,
    pub height: Option<f32>,
    pub goals: Option<Vec<String>>,
    pub experience: Option<Experience>,
    pub health_notes: Option<String>,
}

impl ProfileUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.weight.is_none()
            && self.height.is_none()
            && self.goals.is_none()
            && self.experience.is_none()
            && self.health_notes.is_none()
    }
}

impl UserProfile {
    /// Load the profile from `data_dir`, or defaults if none was saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let path = data_dir.as_ref().join(PROFILE_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save the profile into `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, data_dir: P) -> Result<()> {
        let dir = data_dir.as_ref();
        fs::create_dir_all(dir)?;
        fs::write(dir.join(PROFILE_FILE), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Apply an update.
    pub fn update(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(weight) = update.weight {
            self.weight = weight;
        }
        if let Some(height) = update.height {
            self.height = height;
        }
        if let Some(goals) = update.goals {
            self.goals = goals;
        }
        if let Some(experience) = update.experience {
            self.experience = experience;
        }
        if let Some(notes) = update.health_notes {
            self.health_notes = notes;
        }
    }
}
