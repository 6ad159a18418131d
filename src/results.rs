// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Classification results.
//!
//! [`Probs`] holds the classifier's per-pose probability vector and
//! [`Classification`] is the reduced top-1 `(pose, confidence%)` pair the rest of
//! the pipeline works with.

use ndarray::Array1;

use crate::pose::YogaPose;

/// Class probabilities from the pose classifier.
#[derive(Debug, Clone)]
pub struct Probs {
    /// Probability data with shape (`num_classes`,).
    pub data: Array1<f32>,
}

impl Probs {
    /// Create a new `Probs` instance from already-normalized probabilities.
    #[must_use]
    pub const fn new(data: Array1<f32>) -> Self {
        Self { data }
    }

    /// Build probabilities from raw classifier output.
    ///
    /// NaN values are zeroed. Unless every value lies in `[0, 1]` and the values sum
    /// to roughly 1, the output is treated as logits and passed through a softmax.
    #[must_use]
    pub fn from_output(output: &[f32]) -> Self {
        let mut probs: Vec<f32> = output
            .iter()
            .map(|&v| if v.is_nan() { 0.0 } else { v })
            .collect();

        let sum: f32 = probs.iter().sum();
        let in_unit_range = probs.iter().all(|v| (0.0..=1.0).contains(v));
        if !in_unit_range || (sum - 1.0).abs() > 0.1 {
            let max_val = probs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let exp_vals: Vec<f32> = probs.iter().map(|&v| (v - max_val).exp()).collect();
            let exp_sum: f32 = exp_vals.iter().sum();
            if exp_sum > 0.0 {
                probs = exp_vals.iter().map(|&v| v / exp_sum).collect();
            }
        }

        Self::new(Array1::from_vec(probs))
    }

    /// Index of the most probable class.
    #[must_use]
    pub fn top1(&self) -> usize {
        self.data
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map_or(0, |(i, _)| i)
    }

    /// Probability of the top-1 class, or 0 for an empty vector.
    #[must_use]
    pub fn top1conf(&self) -> f32 {
        self.data.get(self.top1()).copied().unwrap_or(0.0)
    }

    /// Reduce to a [`Classification`].
    ///
    /// Returns `None` when the top class does not map to a known pose.
    #[must_use]
    pub fn classification(&self) -> Option<Classification> {
        if self.data.is_empty() {
            return None;
        }
        YogaPose::from_index(self.top1()).map(|pose| Classification {
            pose,
            confidence: self.top1conf() * 100.0,
        })
    }
}

/// Top-1 pose prediction for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// Predicted pose.
    pub pose: YogaPose,
    /// Confidence in percent (0 to 100).
    pub confidence: f32,
}

impl Classification {
    #[must_use]
    pub const fn new(pose: YogaPose, confidence: f32) -> Self {
        Self { pose, confidence }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probs_top1() {
        let probs = Probs::from_output(&[0.1, 0.1, 0.6, 0.15, 0.05]);
        assert_eq!(probs.top1(), 2);
        assert!((probs.top1conf() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_softmax_applied_to_logits() {
        let probs = Probs::from_output(&[2.0, 0.5, -1.0, 4.0, 0.0]);
        let sum: f32 = probs.data.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert_eq!(probs.top1(), 3);
        assert!(probs.top1conf() > 0.8);
    }

    #[test]
    fn test_logits_summing_to_one_are_normalized() {
        let probs = Probs::from_output(&[3.0, -2.0, 0.5, -0.3, -0.2]);
        assert_eq!(probs.top1(), 0);
        assert!(probs.data.iter().all(|v| (0.0..=1.0).contains(v)));

        let c = probs.classification().unwrap();
        assert_eq!(c.pose, YogaPose::Downdog);
        assert!(c.confidence > 0.0 && c.confidence <= 100.0);
    }

    #[test]
    fn test_nan_is_zeroed() {
        let probs = Probs::from_output(&[f32::NAN, 0.2, 0.8, 0.0, 0.0]);
        assert_eq!(probs.top1(), 2);
        assert!((probs.data[0]).abs() < 1e-6);
    }

    #[test]
    fn test_classification() {
        let c = Probs::from_output(&[0.02, 0.02, 0.92, 0.02, 0.02])
            .classification()
            .unwrap();
        assert_eq!(c.pose, YogaPose::Plank);
        assert!((c.confidence - 92.0).abs() < 1e-3);

        assert!(Probs::from_output(&[]).classification().is_none());
        // Class index outside the pose enum
        assert!(Probs::from_output(&[0.0, 0.0, 0.0, 0.0, 0.0, 1.0]).classification().is_none());
    }
}
