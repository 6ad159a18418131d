// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Muscle-engagement tables.

use std::fmt;

use imageproc::point::Point;

use crate::landmarks::Landmarks;
use crate::pose::YogaPose;
use crate::visualizer::Color;
use crate::visualizer::color::{LOWER_BODY_COLOR, UPPER_BODY_COLOR};

/// Muscle groups that can be shaded on the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MuscleGroup {
    Core,
    Quadriceps,
    Hamstrings,
    Shoulders,
    Biceps,
    Triceps,
}

impl MuscleGroup {
    /// Landmark indices outlining the group, in polygon order.
    #[must_use]
    pub const fn landmark_indices(&self) -> &'static [usize] {
        match self {
            Self::Core => &[23, 24, 11, 12],
            Self::Quadriceps => &[23, 25, 27, 24, 26, 28],
            Self::Hamstrings => &[25, 27, 26, 28],
            Self::Shoulders => &[11, 12, 13, 14],
            Self::Biceps => &[13, 15, 14, 16],
            Self::Triceps => &[11, 13, 12, 14],
        }
    }

    #[must_use]
    pub const fn is_upper_body(&self) -> bool {
        matches!(self, Self::Shoulders | Self::Biceps | Self::Triceps)
    }

    /// Overlay fill color.
    #[must_use]
    pub const fn color(&self) -> Color {
        if self.is_upper_body() { UPPER_BODY_COLOR } else { LOWER_BODY_COLOR }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Quadriceps => "quadriceps",
            Self::Hamstrings => "hamstrings",
            Self::Shoulders => "shoulders",
            Self::Biceps => "biceps",
            Self::Triceps => "triceps",
        }
    }

    /// Pixel polygon for this group on a `width`×`height` frame.
    ///
    /// Consecutive duplicate points and a closing point equal to the first are
    /// dropped. Returns `None` when a landmark is missing or fewer than three
    /// distinct points remain.
    #[must_use]
    pub fn polygon(&self, landmarks: &Landmarks, width: u32, height: u32) -> Option<Vec<Point<i32>>> {
        let mut points: Vec<Point<i32>> = Vec::with_capacity(self.landmark_indices().len());
        for &idx in self.landmark_indices() {
            let lm = landmarks.get_index(idx)?;
            if !lm.is_finite() {
                return None;
            }
            let (x, y) = lm.to_pixel(width, height);
            let p = Point::new(x, y);
            if points.last() != Some(&p) {
                points.push(p);
            }
        }

        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }

        let mut distinct = points.clone();
        distinct.sort_by_key(|p| (p.x, p.y));
        distinct.dedup();

        (distinct.len() >= 3).then_some(points)
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Muscle groups engaged by a pose.
#[must_use]
pub const fn engaged_muscles(pose: YogaPose) -> &'static [MuscleGroup] {
    use MuscleGroup::{Core, Hamstrings, Quadriceps, Shoulders, Triceps};

    match pose {
        YogaPose::Downdog => &[Shoulders, Hamstrings, Triceps],
        YogaPose::Plank => &[Core, Shoulders, Quadriceps],
        YogaPose::Warrior2 => &[Quadriceps, Shoulders, Core],
        YogaPose::Tree => &[Core, Quadriceps],
        YogaPose::Goddess => &[Quadriceps, Core, Shoulders],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Landmark, LandmarkIndex};

    fn spread() -> Landmarks {
        // Every joint at a different position
        let points = (0..LandmarkIndex::COUNT)
            .map(|i| Landmark::new((i % 6) as f32 / 6.0, (i / 6) as f32 / 6.0, 0.0, 1.0))
            .collect();
        Landmarks::new(points)
    }

    #[test]
    fn test_plank_muscles() {
        let groups = engaged_muscles(YogaPose::Plank);
        assert_eq!(groups, &[MuscleGroup::Core, MuscleGroup::Shoulders, MuscleGroup::Quadriceps]);
        assert_eq!(groups[1].color(), Color::BLUE);
        assert_eq!(groups[0].color(), Color::RED);
    }

    #[test]
    fn test_upper_body_groups() {
        assert!(MuscleGroup::Biceps.is_upper_body());
        assert!(MuscleGroup::Triceps.is_upper_body());
        assert!(!MuscleGroup::Hamstrings.is_upper_body());
    }

    #[test]
    fn test_polygon_from_landmarks() {
        let poly = MuscleGroup::Core.polygon(&spread(), 600, 600).unwrap();
        assert_eq!(poly.len(), 4);
        // Joint 23 sits at column 5, row 3
        assert_eq!(poly[0], Point::new(500, 300));
    }

    #[test]
    fn test_collapsed_polygon_is_skipped() {
        let same = Landmarks::new(vec![Landmark::new(0.5, 0.5, 0.0, 1.0); LandmarkIndex::COUNT]);
        assert!(MuscleGroup::Quadriceps.polygon(&same, 640, 480).is_none());

        let short = Landmarks::new(vec![Landmark::new(0.5, 0.5, 0.0, 1.0); 12]);
        assert!(MuscleGroup::Core.polygon(&short, 640, 480).is_none());
    }
}
