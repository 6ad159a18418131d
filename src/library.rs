// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Reference entries for the supported poses.

use crate::muscles::{MuscleGroup, engaged_muscles};
use crate::pose::YogaPose;
use crate::profile::Experience;

/// Library entry for one pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoseEntry {
    pub pose: YogaPose,
    pub sanskrit: &'static str,
    pub level: Experience,
    pub benefits: &'static str,
    pub instructions: &'static [&'static str],
}

impl PoseEntry {
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        self.pose.display_name()
    }

    /// Muscle groups the pose engages.
    #[must_use]
    pub const fn muscles(&self) -> &'static [MuscleGroup] {
        engaged_muscles(self.pose)
    }
}

/// Library entry for `pose`.
#[must_use]
pub const fn entry(pose: YogaPose) -> PoseEntry {
    match pose {
        YogaPose::Downdog => PoseEntry {
            pose,
            sanskrit: "Adho Mukha Svanasana",
            level: Experience::Beginner,
            benefits: "Stretches hamstrings, strengthens arms",
            instructions: &[
                "Start on hands and knees",
                "Lift hips upward",
                "Straighten legs",
                "Heels toward floor",
            ],
        },
        YogaPose::Goddess => PoseEntry {
            pose,
            sanskrit: "Utkata Konasana",
            level: Experience::Beginner,
            benefits: "Strengthens thighs and glutes, opens hips",
            instructions: &[
                "Step feet wide, toes turned out",
                "Bend knees over ankles",
                "Lift arms to cactus shape",
            ],
        },
        YogaPose::Plank => PoseEntry {
            pose,
            sanskrit: "Phalakasana",
            level: Experience::Beginner,
            benefits: "Strengthens arms, shoulders, and core",
            instructions: &[
                "Hands under shoulders",
                "Step feet back",
                "Hold a straight line from head to heels",
            ],
        },
        YogaPose::Tree => PoseEntry {
            pose,
            sanskrit: "Vrksasana",
            level: Experience::Beginner,
            benefits: "Enhances balance, strengthens ankles",
            instructions: &["Stand on one leg", "Place foot on inner thigh", "Hands in prayer"],
        },
        YogaPose::Warrior2 => PoseEntry {
            pose,
            sanskrit: "Virabhadrasana II",
            level: Experience::Beginner,
            benefits: "Improves balance, tones legs",
            instructions: &["Feet wide apart", "Arms parallel to floor", "Gaze over front hand"],
        },
    }
}

/// All entries in pose order.
#[must_use]
pub fn entries() -> Vec<PoseEntry> {
    YogaPose::ALL.iter().map(|&p| entry(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pose_has_an_entry() {
        let all = entries();
        assert_eq!(all.len(), YogaPose::COUNT);
        assert!(all.iter().all(|e| !e.instructions.is_empty()));
    }

    #[test]
    fn test_entry_details() {
        let tree = entry(YogaPose::Tree);
        assert_eq!(tree.display_name(), "Tree");
        assert_eq!(tree.sanskrit, "Vrksasana");
        assert_eq!(tree.muscles(), &[MuscleGroup::Core, MuscleGroup::Quadriceps]);
    }
}
