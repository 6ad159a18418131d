// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Pipeline configuration.
//!
//! This module defines the [`PipelineConfig`] struct, which controls the model
//! locations, detection thresholds, and overlay options used by the frame pipeline.

use std::path::PathBuf;

/// Default landmark model file name.
pub const DEFAULT_LANDMARK_MODEL: &str = "pose_landmark_full.onnx";

/// Default pose classifier model file name.
pub const DEFAULT_CLASSIFIER_MODEL: &str = "yoga_pose_classifier.onnx";

/// Name of the per-user data directory.
pub const DATA_DIR_NAME: &str = "yoga-pose-coach";

/// Configuration for the frame pipeline.
///
/// Uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use yoga_pose_coach::PipelineConfig;
///
/// let config = PipelineConfig::new()
///     .with_presence_threshold(0.6)
///     .with_muscle_overlay(true)
///     .with_overlay_opacity(0.5);
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Path to the landmark extractor ONNX model.
    pub landmark_model: PathBuf,
    /// Path to the pose classifier ONNX model.
    pub classifier_model: PathBuf,
    /// Minimum pose-presence score for a landmark set to count as a detection (0.0 to 1.0).
    pub presence_threshold: f32,
    /// Number of intra-op threads for ONNX Runtime.
    /// `0` lets ONNX Runtime decide.
    pub num_threads: usize,
    /// Draw the heart-rate readout.
    pub show_heart_rate: bool,
    /// Draw muscle-engagement polygons.
    pub show_muscles: bool,
    /// Opacity of the muscle overlay (0.0 to 1.0).
    pub overlay_opacity: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            landmark_model: PathBuf::from(DEFAULT_LANDMARK_MODEL),
            classifier_model: PathBuf::from(DEFAULT_CLASSIFIER_MODEL),
            presence_threshold: 0.5,
            num_threads: 0,
            show_heart_rate: false,
            show_muscles: false,
            overlay_opacity: 0.4,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the landmark model path.
    #[must_use]
    pub fn with_landmark_model<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.landmark_model = path.into();
        self
    }

    /// Set the classifier model path.
    #[must_use]
    pub fn with_classifier_model<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.classifier_model = path.into();
        self
    }

    /// Set the pose-presence threshold below which a frame counts as empty.
    #[must_use]
    pub const fn with_presence_threshold(mut self, threshold: f32) -> Self {
        self.presence_threshold = threshold;
        self
    }

    /// Set the number of threads for inference.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Enable or disable the heart-rate readout.
    #[must_use]
    pub const fn with_heart_rate(mut self, enabled: bool) -> Self {
        self.show_heart_rate = enabled;
        self
    }

    /// Enable or disable the muscle-engagement overlay.
    #[must_use]
    pub const fn with_muscle_overlay(mut self, enabled: bool) -> Self {
        self.show_muscles = enabled;
        self
    }

    /// Set the muscle overlay opacity, clamped to `[0.0, 1.0]`.
    #[must_use]
    pub const fn with_overlay_opacity(mut self, opacity: f32) -> Self {
        self.overlay_opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

/// Default directory for session logs, profiles and reviews.
///
/// Falls back to the current directory when the platform has no data directory.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir().map_or_else(|| PathBuf::from("."), |d| d.join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = PipelineConfig::default();
        assert!((config.presence_threshold - 0.5).abs() < f32::EPSILON);
        assert!((config.overlay_opacity - 0.4).abs() < f32::EPSILON);
        assert!(!config.show_heart_rate);
        assert!(!config.show_muscles);
        assert_eq!(config.landmark_model, PathBuf::from(DEFAULT_LANDMARK_MODEL));
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::new()
            .with_landmark_model("a.onnx")
            .with_classifier_model("b.onnx")
            .with_presence_threshold(0.7)
            .with_threads(4)
            .with_heart_rate(true)
            .with_muscle_overlay(true)
            .with_overlay_opacity(1.7);

        assert_eq!(config.landmark_model, PathBuf::from("a.onnx"));
        assert_eq!(config.classifier_model, PathBuf::from("b.onnx"));
        assert!((config.presence_threshold - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.num_threads, 4);
        assert!(config.show_heart_rate);
        assert!(config.show_muscles);
        assert!((config.overlay_opacity - 1.0).abs() < f32::EPSILON);
    }
}
