// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Pose classification over flattened landmark vectors.

use std::path::Path;

use ndarray::Array2;

use crate::config::PipelineConfig;
use crate::error::{CoachError, Result};
use crate::landmarks::{LandmarkIndex, Landmarks};
use crate::onnx::OnnxModel;
use crate::results::{Classification, Probs};

/// Maps a flattened 132-value landmark vector to per-pose scores.
pub trait PoseClassifier {
    /// Run the classifier and return its raw output (probabilities or logits).
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    fn predict(&mut self, features: &[f32]) -> Result<Vec<f32>>;
}

/// ONNX pose classifier taking a `[1, 132]` input.
#[derive(Debug)]
pub struct ClassifierModel {
    model: OnnxModel,
}

impl ClassifierModel {
    /// Load the classifier named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded.
    pub fn load(config: &PipelineConfig) -> Result<Self> {
        Self::load_from(&config.classifier_model, config.num_threads)
    }

    /// Load a classifier from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded.
    pub fn load_from<P: AsRef<Path>>(path: P, num_threads: usize) -> Result<Self> {
        let model = OnnxModel::load(path, num_threads)?;
        Ok(Self { model })
    }
}

impl PoseClassifier for ClassifierModel {
    fn predict(&mut self, features: &[f32]) -> Result<Vec<f32>> {
        if features.len() != LandmarkIndex::FLAT_LEN {
            return Err(CoachError::InferenceError(format!(
                "Classifier expects {} features, got {}",
                LandmarkIndex::FLAT_LEN,
                features.len()
            )));
        }

        let input = Array2::from_shape_vec((1, LandmarkIndex::FLAT_LEN), features.to_vec())
            .map_err(|e| CoachError::InferenceError(format!("Failed to shape classifier input: {e}")))?;

        let outputs = self.model.run(&input)?;
        outputs
            .into_iter()
            .next()
            .map(|(_, data)| data)
            .ok_or_else(|| CoachError::InferenceError("Classifier produced no output".to_string()))
    }
}

/// Classify a landmark set.
///
/// Degenerate (all-zero) sets are never passed to the classifier and yield `Ok(None)`,
/// as does an output whose top class is not a known pose.
///
/// # Errors
///
/// Returns an error if the classifier fails.
pub fn classify(classifier: &mut dyn PoseClassifier, landmarks: &Landmarks) -> Result<Option<Classification>> {
    if landmarks.is_degenerate() {
        return Ok(None);
    }

    let output = classifier.predict(&landmarks.flatten())?;
    Ok(Probs::from_output(&output).classification())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;
    use crate::pose::YogaPose;

    struct FixedClassifier {
        output: Vec<f32>,
        calls: usize,
    }

    impl PoseClassifier for FixedClassifier {
        fn predict(&mut self, features: &[f32]) -> Result<Vec<f32>> {
            assert_eq!(features.len(), LandmarkIndex::FLAT_LEN);
            self.calls += 1;
            Ok(self.output.clone())
        }
    }

    fn standing() -> Landmarks {
        Landmarks::new(vec![Landmark::new(0.5, 0.5, 0.0, 0.9); LandmarkIndex::COUNT])
    }

    #[test]
    fn test_classify_top1() {
        let mut clf = FixedClassifier {
            output: vec![0.05, 0.05, 0.05, 0.8, 0.05],
            calls: 0,
        };
        let c = classify(&mut clf, &standing()).unwrap().unwrap();
        assert_eq!(c.pose, YogaPose::Tree);
        assert!((c.confidence - 80.0).abs() < 1e-3);
        assert_eq!(clf.calls, 1);
    }

    #[test]
    fn test_degenerate_skips_classifier() {
        let mut clf = FixedClassifier {
            output: vec![1.0, 0.0, 0.0, 0.0, 0.0],
            calls: 0,
        };
        let zeros = Landmarks::new(vec![Landmark::default(); LandmarkIndex::COUNT]);
        assert!(classify(&mut clf, &zeros).unwrap().is_none());
        assert_eq!(clf.calls, 0);
    }

    #[test]
    fn test_model_not_found() {
        let result = ClassifierModel::load_from("missing_classifier.onnx", 0);
        assert!(matches!(result.unwrap_err(), CoachError::ModelLoadError(_)));
    }
}
