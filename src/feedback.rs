// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Confidence-gated pose verdicts.

use std::fmt;

use crate::pose::YogaPose;
use crate::results::Classification;
use crate::visualizer::Color;

/// Confidence (percent) below which a classification is ignored.
pub const MIN_CONFIDENCE: f32 = 70.0;

/// Confidence (percent) at or above which a matching pose is rated perfect.
pub const PERFECT_CONFIDENCE: f32 = 85.0;

/// Verdict for one classified frame against the target pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseFeedback {
    /// Confidence too low to trust the label.
    NoPose,
    /// A different pose than the target was detected.
    Adjust(YogaPose),
    /// Target pose detected with moderate confidence.
    GoodForm,
    /// Target pose detected with high confidence.
    Perfect,
}

impl PoseFeedback {
    /// Grade a classification against the target pose.
    ///
    /// Checks are ordered and the first match wins: low confidence, wrong pose,
    /// moderate confidence, high confidence.
    #[must_use]
    pub fn evaluate(classification: &Classification, target: YogaPose) -> Self {
        if classification.confidence < MIN_CONFIDENCE {
            Self::NoPose
        } else if classification.pose != target {
            Self::Adjust(target)
        } else if classification.confidence < PERFECT_CONFIDENCE {
            Self::GoodForm
        } else {
            Self::Perfect
        }
    }

    /// On-screen message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::NoPose => "No pose detected".to_string(),
            Self::Adjust(target) => format!("Adjust to {target}"),
            Self::GoodForm => "Good form!".to_string(),
            Self::Perfect => "Perfect!".to_string(),
        }
    }

    /// Text color for the verdict.
    #[must_use]
    pub const fn color(&self) -> Color {
        match self {
            Self::NoPose => Color::RED,
            Self::Adjust(_) => Color::ORANGE,
            Self::GoodForm => Color::YELLOW,
            Self::Perfect => Color::GREEN,
        }
    }
}

impl fmt::Display for PoseFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(pose: YogaPose, confidence: f32, target: YogaPose) -> PoseFeedback {
        PoseFeedback::evaluate(&Classification::new(pose, confidence), target)
    }

    #[test]
    fn test_low_confidence_wins() {
        let fb = grade(YogaPose::Tree, 69.9, YogaPose::Plank);
        assert_eq!(fb, PoseFeedback::NoPose);
        assert_eq!(fb.message(), "No pose detected");
        assert_eq!(fb.color(), Color::RED);
    }

    #[test]
    fn test_wrong_pose_regardless_of_confidence() {
        let fb = grade(YogaPose::Tree, 99.0, YogaPose::Plank);
        assert_eq!(fb, PoseFeedback::Adjust(YogaPose::Plank));
        assert_eq!(fb.message(), "Adjust to plank");
        assert_eq!(fb.color(), Color::ORANGE);
    }

    #[test]
    fn test_good_and_perfect_boundaries() {
        assert_eq!(grade(YogaPose::Plank, 70.0, YogaPose::Plank), PoseFeedback::GoodForm);
        assert_eq!(grade(YogaPose::Plank, 84.9, YogaPose::Plank), PoseFeedback::GoodForm);
        assert_eq!(grade(YogaPose::Plank, 85.0, YogaPose::Plank), PoseFeedback::Perfect);
        assert_eq!(PoseFeedback::Perfect.color(), Color::GREEN);
        assert_eq!(PoseFeedback::GoodForm.to_string(), "Good form!");
    }
}
