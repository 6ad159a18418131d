// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Biomechanical rule engine.
//!
//! Each pose carries a fixed, ordered list of joint-angle tolerance windows. A rule
//! measures the angle at its middle joint and, when the angle falls outside the
//! window, contributes a short textual correction.

use crate::landmarks::{Landmark, LandmarkIndex, Landmarks};
use crate::pose::YogaPose;

use LandmarkIndex::{LeftAnkle, LeftHip, LeftKnee, LeftShoulder, LeftWrist};

/// Maximum number of corrections reported per frame.
pub const MAX_CORRECTIONS: usize = 2;

/// Angle at joint `b` formed by the segments `b→a` and `b→c`, in degrees.
///
/// Measured on the (x, y) projection and always within `[0, 180]`.
#[must_use]
pub fn calculate_joint_angle(a: &Landmark, b: &Landmark, c: &Landmark) -> f32 {
    let radians = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let angle = radians.to_degrees().abs();
    if angle > 180.0 { 360.0 - angle } else { angle }
}

/// One joint-angle tolerance window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiomechanicalRule {
    /// Short rule identifier.
    pub name: &'static str,
    /// Joints `(a, b, c)`; the angle is measured at `b`.
    pub joints: (LandmarkIndex, LandmarkIndex, LandmarkIndex),
    /// Inclusive lower bound in degrees.
    pub min_angle: f32,
    /// Inclusive upper bound in degrees.
    pub max_angle: f32,
    /// Correction shown when the angle is outside the window.
    pub feedback: &'static str,
}

/// Result of evaluating one rule against one landmark set.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// Angle inside the window.
    WithinRange,
    /// Angle outside the window, with the correction to show.
    OutOfRange(&'static str),
    /// Rule could not be evaluated (joint missing or not finite).
    NotApplicable,
}

impl BiomechanicalRule {
    const fn new(
        name: &'static str,
        joints: (LandmarkIndex, LandmarkIndex, LandmarkIndex),
        min_angle: f32,
        max_angle: f32,
        feedback: &'static str,
    ) -> Self {
        Self {
            name,
            joints,
            min_angle,
            max_angle,
            feedback,
        }
    }

    /// Measured angle, or `None` when a joint is missing or not finite.
    #[must_use]
    pub fn angle(&self, landmarks: &Landmarks) -> Option<f32> {
        let (a, b, c) = self.joints;
        let (a, b, c) = (landmarks.get(a)?, landmarks.get(b)?, landmarks.get(c)?);
        if !(a.is_finite() && b.is_finite() && c.is_finite()) {
            return None;
        }
        let angle = calculate_joint_angle(a, b, c);
        angle.is_finite().then_some(angle)
    }

    /// Evaluate this rule against a landmark set.
    #[must_use]
    pub fn evaluate(&self, landmarks: &Landmarks) -> RuleOutcome {
        match self.angle(landmarks) {
            None => RuleOutcome::NotApplicable,
            Some(angle) if (self.min_angle..=self.max_angle).contains(&angle) => RuleOutcome::WithinRange,
            Some(_) => RuleOutcome::OutOfRange(self.feedback),
        }
    }
}

const DOWNDOG_RULES: &[BiomechanicalRule] = &[
    BiomechanicalRule::new(
        "hip",
        (LeftShoulder, LeftHip, LeftKnee),
        160.0,
        180.0,
        "Lift hips higher and straighten legs",
    ),
];

const WARRIOR2_RULES: &[BiomechanicalRule] = &[
    BiomechanicalRule::new(
        "front_knee",
        (LeftHip, LeftKnee, LeftAnkle),
        80.0,
        100.0,
        "Align front knee over ankle",
    ),
];

const TREE_RULES: &[BiomechanicalRule] = &[
    BiomechanicalRule::new(
        "raised_knee",
        (LeftHip, LeftKnee, LeftAnkle),
        160.0,
        180.0,
        "Bring knee out to the side",
    ),
];

const PLANK_RULES: &[BiomechanicalRule] = &[
    BiomechanicalRule::new(
        "shoulder",
        (LeftHip, LeftShoulder, LeftWrist),
        170.0,
        190.0,
        "Keep shoulders over wrists",
    ),
];

/// Ordered rules for a pose. Goddess has none.
#[must_use]
pub const fn rules_for(pose: YogaPose) -> &'static [BiomechanicalRule] {
    match pose {
        YogaPose::Downdog => DOWNDOG_RULES,
        YogaPose::Warrior2 => WARRIOR2_RULES,
        YogaPose::Tree => TREE_RULES,
        YogaPose::Plank => PLANK_RULES,
        YogaPose::Goddess => &[],
    }
}

/// Evaluate every rule of `pose` in order.
#[must_use]
pub fn evaluate_pose(landmarks: &Landmarks, pose: YogaPose) -> Vec<(&'static BiomechanicalRule, RuleOutcome)> {
    rules_for(pose)
        .iter()
        .map(|rule| (rule, rule.evaluate(landmarks)))
        .collect()
}

/// Look up a pose by its rule-table label, ignoring ASCII case.
fn pose_for_label(label: &str) -> Option<YogaPose> {
    YogaPose::ALL
        .into_iter()
        .find(|pose| pose.as_str().eq_ignore_ascii_case(label))
}

/// Corrections for `target_pose`, at most [`MAX_CORRECTIONS`], in rule order.
///
/// The pose label is matched case-insensitively. Unknown poses and poses without
/// rules yield an empty list. Rules that cannot be evaluated are skipped.
#[must_use]
pub fn biomechanical_feedback(landmarks: &Landmarks, target_pose: &str) -> Vec<String> {
    let Some(pose) = pose_for_label(target_pose) else {
        crate::verbose!("No biomechanical rules for '{target_pose}'");
        return Vec::new();
    };

    corrections(landmarks, pose, rules_for(pose))
}

fn corrections(landmarks: &Landmarks, pose: YogaPose, rules: &[BiomechanicalRule]) -> Vec<String> {
    rules
        .iter()
        .filter_map(|rule| match rule.evaluate(landmarks) {
            RuleOutcome::OutOfRange(feedback) => Some(feedback.to_string()),
            RuleOutcome::WithinRange => None,
            RuleOutcome::NotApplicable => {
                crate::verbose!("Rule '{}' for {pose} not applicable: joint missing", rule.name);
                None
            }
        })
        .take(MAX_CORRECTIONS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lm(x: f32, y: f32) -> Landmark {
        Landmark::new(x, y, 0.0, 1.0)
    }

    fn blank() -> Vec<Landmark> {
        vec![lm(0.5, 0.5); LandmarkIndex::COUNT]
    }

    fn set(points: &mut [Landmark], index: LandmarkIndex, p: Landmark) {
        points[index as usize] = p;
    }

    /// Point at `degrees` from `origin`, 0.2 away (y grows downward).
    fn polar(origin: Landmark, degrees: f32) -> Landmark {
        let r = degrees.to_radians();
        lm(origin.x + 0.2 * r.cos(), origin.y + 0.2 * r.sin())
    }

    #[test]
    fn test_right_angle() {
        let angle = calculate_joint_angle(&lm(1.0, 0.0), &lm(0.0, 0.0), &lm(0.0, 1.0));
        assert!((angle - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_straight_and_reflex_angles() {
        let straight = calculate_joint_angle(&lm(0.0, 0.5), &lm(0.5, 0.5), &lm(1.0, 0.5));
        assert!((straight - 180.0).abs() < 1e-4);

        // 270 degrees measured one way folds back to 90
        let reflex = calculate_joint_angle(&lm(0.0, 1.0), &lm(0.0, 0.0), &lm(1.0, 0.0));
        assert!((reflex - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_angle_always_in_range() {
        for i in 0..36 {
            let b = lm(0.5, 0.5);
            let a = polar(b, 0.0);
            let c = polar(b, i as f32 * 10.0 + 3.0);
            let angle = calculate_joint_angle(&a, &b, &c);
            assert!((0.0..=180.0).contains(&angle), "angle {angle} out of range");
        }
    }

    #[test]
    fn test_downdog_hip_too_closed() {
        let mut points = blank();
        let hip = lm(0.5, 0.5);
        set(&mut points, LeftHip, hip);
        set(&mut points, LeftShoulder, polar(hip, 0.0));
        set(&mut points, LeftKnee, polar(hip, 150.0));

        let feedback = biomechanical_feedback(&Landmarks::new(points), "downdog");
        assert_eq!(feedback, vec!["Lift hips higher and straighten legs".to_string()]);
    }

    #[test]
    fn test_downdog_only_checks_hip() {
        // Hip open at 170 with the elbow square to the torso
        let mut points = blank();
        let hip = lm(0.5, 0.5);
        set(&mut points, LeftHip, hip);
        set(&mut points, LeftShoulder, lm(0.7, 0.5));
        set(&mut points, LeftKnee, polar(hip, 170.0));
        set(&mut points, LandmarkIndex::LeftElbow, lm(0.7, 0.7));

        assert!(biomechanical_feedback(&Landmarks::new(points), "downdog").is_empty());
    }

    #[test]
    fn test_one_rule_per_pose() {
        for pose in YogaPose::ALL {
            let expected = usize::from(pose != YogaPose::Goddess);
            assert_eq!(rules_for(pose).len(), expected, "{pose}");
        }
    }

    #[test]
    fn test_plank_straight_line() {
        let mut points = blank();
        let shoulder = lm(0.5, 0.5);
        set(&mut points, LeftShoulder, shoulder);
        set(&mut points, LeftHip, polar(shoulder, 0.0));
        set(&mut points, LeftWrist, polar(shoulder, 175.0));

        let lms = Landmarks::new(points);
        let angle = PLANK_RULES[0].angle(&lms).unwrap();
        assert!((angle - 175.0).abs() < 1e-3);
        assert!(biomechanical_feedback(&lms, "Plank").is_empty());
    }

    #[test]
    fn test_at_most_two_corrections() {
        const STRICT: &[BiomechanicalRule] = &[
            BiomechanicalRule::new("first", (LeftShoulder, LeftHip, LeftKnee), 0.0, 1.0, "first"),
            BiomechanicalRule::new("second", (LeftHip, LeftKnee, LeftAnkle), 0.0, 1.0, "second"),
            BiomechanicalRule::new("third", (LeftHip, LeftShoulder, LeftWrist), 0.0, 1.0, "third"),
        ];

        // Every triple is a right angle, so all three rules fail
        let mut points = blank();
        set(&mut points, LeftShoulder, lm(0.3, 0.3));
        set(&mut points, LeftHip, lm(0.3, 0.5));
        set(&mut points, LeftKnee, lm(0.5, 0.5));
        set(&mut points, LeftAnkle, lm(0.5, 0.7));
        set(&mut points, LeftWrist, lm(0.1, 0.3));

        let feedback = corrections(&Landmarks::new(points), YogaPose::Tree, STRICT);
        assert_eq!(feedback, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_pose_matched_by_label_only() {
        let mut points = blank();
        let knee = lm(0.5, 0.5);
        set(&mut points, LeftKnee, knee);
        set(&mut points, LeftHip, polar(knee, 0.0));
        set(&mut points, LeftAnkle, polar(knee, 45.0));
        let lms = Landmarks::new(points);

        assert_eq!(biomechanical_feedback(&lms, "WARRIOR2"), vec!["Align front knee over ankle".to_string()]);
        assert!(biomechanical_feedback(&lms, "Warrior II").is_empty());
    }

    #[test]
    fn test_unknown_and_goddess_are_empty() {
        let lms = Landmarks::new(blank());
        assert!(biomechanical_feedback(&lms, "crow").is_empty());
        assert!(biomechanical_feedback(&lms, "goddess").is_empty());
        assert!(rules_for(YogaPose::Goddess).is_empty());
    }

    #[test]
    fn test_missing_joint_not_applicable() {
        let lms = Landmarks::new(vec![lm(0.5, 0.5); 5]);
        assert_eq!(PLANK_RULES[0].evaluate(&lms), RuleOutcome::NotApplicable);
        assert!(biomechanical_feedback(&lms, "plank").is_empty());

        let mut points = blank();
        set(&mut points, LeftHip, lm(f32::NAN, 0.5));
        let outcomes = evaluate_pose(&Landmarks::new(points), YogaPose::Plank);
        assert!(outcomes.iter().all(|(_, o)| *o == RuleOutcome::NotApplicable));
    }
}
