// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Supported yoga poses.
//!
//! This module defines the closed set of poses the classifier can recognize,
//! in the order of the classifier's output classes.

use std::fmt;
use std::str::FromStr;

/// Yoga poses recognized by the pose classifier.
///
/// The discriminant order matches the class order of the classifier output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YogaPose {
    /// Downward-facing dog (Adho Mukha Svanasana).
    Downdog,
    /// Goddess pose (Utkata Konasana).
    Goddess,
    /// Plank pose (Phalakasana).
    Plank,
    /// Tree pose (Vrksasana).
    Tree,
    /// Warrior II (Virabhadrasana II).
    Warrior2,
}

impl YogaPose {
    /// All poses in classifier output order.
    pub const ALL: [Self; 5] = [
        Self::Downdog,
        Self::Goddess,
        Self::Plank,
        Self::Tree,
        Self::Warrior2,
    ];

    /// Number of classes the classifier predicts.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the model label for this pose.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Downdog => "downdog",
            Self::Goddess => "goddess",
            Self::Plank => "plank",
            Self::Tree => "tree",
            Self::Warrior2 => "warrior2",
        }
    }

    /// Returns the human-readable pose name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Downdog => "Downward Dog",
            Self::Goddess => "Goddess",
            Self::Plank => "Plank",
            Self::Tree => "Tree",
            Self::Warrior2 => "Warrior II",
        }
    }

    /// Look up a pose by classifier class index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Class index of this pose in the classifier output.
    #[must_use]
    pub const fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for YogaPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for YogaPose {
    type Err = PoseParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .find(|pose| {
                pose.as_str() == normalized || pose.display_name().to_lowercase() == normalized
            })
            .copied()
            .ok_or_else(|| PoseParseError(s.to_string()))
    }
}

/// Error returned when parsing an unknown pose name.
#[derive(Debug, Clone)]
pub struct PoseParseError(String);

impl fmt::Display for PoseParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid pose '{}', expected one of: downdog, goddess, plank, tree, warrior2",
            self.0
        )
    }
}

impl std::error::Error for PoseParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_from_str() {
        assert_eq!("downdog".parse::<YogaPose>().unwrap(), YogaPose::Downdog);
        assert_eq!("PLANK".parse::<YogaPose>().unwrap(), YogaPose::Plank);
        assert_eq!("Warrior II".parse::<YogaPose>().unwrap(), YogaPose::Warrior2);
        assert_eq!(" tree ".parse::<YogaPose>().unwrap(), YogaPose::Tree);
        assert!("lotus".parse::<YogaPose>().is_err());
    }

    #[test]
    fn test_pose_index_roundtrip() {
        for (i, pose) in YogaPose::ALL.iter().enumerate() {
            assert_eq!(pose.index(), i);
            assert_eq!(YogaPose::from_index(i), Some(*pose));
        }
        assert_eq!(YogaPose::from_index(YogaPose::COUNT), None);
    }

    #[test]
    fn test_pose_display() {
        assert_eq!(YogaPose::Warrior2.to_string(), "warrior2");
        assert_eq!(YogaPose::Downdog.display_name(), "Downward Dog");
    }
}
