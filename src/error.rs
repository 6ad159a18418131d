// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Error types for the pose coach library.

use std::fmt;

/// Result type alias for pose coach operations.
pub type Result<T> = std::result::Result<T, CoachError>;

/// Main error type for the pose coach library.
#[derive(Debug)]
pub enum CoachError {
    /// Error loading an ONNX model.
    ModelLoadError(String),
    /// Error while running a model.
    InferenceError(String),
    /// Error processing images.
    ImageError(String),
    /// Invalid configuration or argument.
    ConfigError(String),
    /// Camera or frame source failure.
    CameraError(String),
    /// Error reading or writing a data file.
    StorageError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
    /// Visualizer error.
    VisualizerError(String),
    /// Video/stream processing error.
    VideoError(String),
    /// Feature not enabled.
    FeatureNotEnabled(String),
}

impl fmt::Display for CoachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelLoadError(msg) => write!(f, "Model load error: {msg}"),
            Self::InferenceError(msg) => write!(f, "Inference error: {msg}"),
            Self::ImageError(msg) => write!(f, "Image error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::CameraError(msg) => write!(f, "Camera error: {msg}"),
            Self::StorageError(msg) => write!(f, "Storage error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::VisualizerError(msg) => write!(f, "Visualizer error: {msg}"),
            Self::VideoError(msg) => write!(f, "Video error: {msg}"),
            Self::FeatureNotEnabled(msg) => write!(f, "Feature not enabled: {msg}"),
        }
    }
}

impl std::error::Error for CoachError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CoachError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for CoachError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageError(err.to_string())
    }
}

impl From<serde_json::Error> for CoachError {
    fn from(err: serde_json::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoachError::ModelLoadError("test".to_string());
        assert_eq!(err.to_string(), "Model load error: test");

        let err = CoachError::CameraError("device busy".to_string());
        assert_eq!(err.to_string(), "Camera error: device busy");
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error;

        let err = CoachError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
        assert!(CoachError::ConfigError("x".to_string()).source().is_none());
    }
}
