// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Body landmark types.
//!
//! A [`Landmarks`] set holds one [`Landmark`] per tracked joint in the fixed
//! 33-point BlazePose order given by [`LandmarkIndex`].

/// BlazePose landmark indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    /// Number of landmarks produced by the extractor.
    pub const COUNT: usize = 33;

    /// Number of values stored per landmark (x, y, z, visibility).
    pub const VALUES_PER_LANDMARK: usize = 4;

    /// Length of the flattened landmark vector fed to the classifier.
    pub const FLAT_LEN: usize = Self::COUNT * Self::VALUES_PER_LANDMARK;
}

/// A single tracked body joint.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    /// Normalized X coordinate (0.0 to 1.0 of image width).
    pub x: f32,
    /// Normalized Y coordinate (0.0 to 1.0 of image height).
    pub y: f32,
    /// Relative depth, hip midpoint at the origin.
    pub z: f32,
    /// Visibility score (0.0 to 1.0).
    pub visibility: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }

    /// Convert to pixel coordinates for a frame of the given size.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    #[must_use]
    pub fn to_pixel(&self, width: u32, height: u32) -> (i32, i32) {
        let px = (self.x * width as f32) as i32;
        let py = (self.y * height as f32) as i32;
        (px, py)
    }

    /// Whether all coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Landmarks for one detected person in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Landmarks {
    points: Vec<Landmark>,
}

impl Landmarks {
    /// Create a landmark set from points in BlazePose order.
    ///
    /// Sets shorter than [`LandmarkIndex::COUNT`] are allowed; lookups of the
    /// missing joints return `None`.
    #[must_use]
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    /// Build a landmark set from a flat `[x, y, z, visibility, ...]` vector.
    #[must_use]
    pub fn from_flat(values: &[f32]) -> Self {
        let points = values
            .chunks_exact(LandmarkIndex::VALUES_PER_LANDMARK)
            .map(|c| Landmark::new(c[0], c[1], c[2], c[3]))
            .collect();
        Self { points }
    }

    /// Get a landmark by joint.
    #[must_use]
    pub fn get(&self, index: LandmarkIndex) -> Option<&Landmark> {
        self.points.get(index as usize)
    }

    /// Get a landmark by raw index.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    /// All landmarks in index order.
    #[must_use]
    pub fn as_slice(&self) -> &[Landmark] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Flatten into the classifier input vector.
    ///
    /// Always returns [`LandmarkIndex::FLAT_LEN`] values; missing joints are zero-filled.
    #[must_use]
    pub fn flatten(&self) -> Vec<f32> {
        let mut flat = vec![0.0; LandmarkIndex::FLAT_LEN];
        for (i, lm) in self.points.iter().take(LandmarkIndex::COUNT).enumerate() {
            let o = i * LandmarkIndex::VALUES_PER_LANDMARK;
            flat[o] = lm.x;
            flat[o + 1] = lm.y;
            flat[o + 2] = lm.z;
            flat[o + 3] = lm.visibility;
        }
        flat
    }

    /// Sum of all flattened values.
    #[must_use]
    pub fn sum(&self) -> f32 {
        self.points
            .iter()
            .map(|lm| lm.x + lm.y + lm.z + lm.visibility)
            .sum()
    }

    /// A set summing to zero carries no detection and must not be classified.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.sum() == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Landmarks {
        let points = (0..LandmarkIndex::COUNT)
            .map(|i| Landmark::new(i as f32 / 100.0, 0.5, 0.0, 0.9))
            .collect();
        Landmarks::new(points)
    }

    #[test]
    fn test_landmark_to_pixel() {
        let lm = Landmark::new(0.5, 0.25, 0.0, 1.0);
        assert_eq!(lm.to_pixel(640, 480), (320, 120));
    }

    #[test]
    fn test_get_by_index() {
        let lms = sample();
        let hip = lms.get(LandmarkIndex::LeftHip).unwrap();
        assert!((hip.x - 0.23).abs() < 1e-6);
        assert!(Landmarks::new(vec![]).get(LandmarkIndex::Nose).is_none());
    }

    #[test]
    fn test_flatten_layout() {
        let lms = sample();
        let flat = lms.flatten();
        assert_eq!(flat.len(), 132);
        // Right shoulder is joint 12
        assert!((flat[12 * 4] - 0.12).abs() < 1e-6);
        assert!((flat[12 * 4 + 3] - 0.9).abs() < 1e-6);
        assert_eq!(Landmarks::from_flat(&flat), lms);
    }

    #[test]
    fn test_flatten_pads_short_sets() {
        let lms = Landmarks::new(vec![Landmark::new(1.0, 1.0, 1.0, 1.0)]);
        let flat = lms.flatten();
        assert_eq!(flat.len(), LandmarkIndex::FLAT_LEN);
        assert!(flat[4..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_degenerate() {
        let zeros = Landmarks::new(vec![Landmark::default(); LandmarkIndex::COUNT]);
        assert!(zeros.is_degenerate());
        assert!(!sample().is_degenerate());
    }
}
