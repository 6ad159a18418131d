// Yoga Pose Coach 🧘 AGPL-3.0 License

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Yoga Pose Coach
//!
//! Real-time yoga pose feedback from a webcam. Each frame goes through a body
//! landmark model and a pose classifier (both ONNX, run with ONNX Runtime). Joint
//! angles are then checked against per-pose reference ranges, and the verdict,
//! corrections, skeleton and optional muscle-engagement shading are drawn back
//! onto the frame.
//!
//! ## Features
//!
//! - **Pose classification** - Downward Dog, Goddess, Plank, Tree and Warrior II, gated by confidence
//! - **Biomechanical corrections** - Up to two joint-angle corrections per frame
//! - **Overlays** - Skeleton, muscle engagement and camera-based heart rate
//! - **Practice log** - Sessions, profile and ratings stored as JSON in the user data directory
//! - **Yoga nidra** - Guided meditation timer
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use yoga_pose_coach::{PipelineConfig, PosePipeline, SessionContext, YogaPose};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::new().with_muscle_overlay(true);
//!     let mut pipeline = PosePipeline::from_config(&config)?;
//!     let mut ctx = SessionContext::from_config(YogaPose::Tree, &config);
//!
//!     let frame = image::open("tree.jpg")?;
//!     let (annotated, report) = pipeline.process_frame(&mut ctx, &frame)?;
//!     println!("{}", report.summary());
//!     annotated.save("tree_feedback.jpg")?;
//!     Ok(())
//! }
//! ```
//!
//! Joint-angle corrections work without any model:
//!
//! ```rust
//! use yoga_pose_coach::{Landmarks, biomechanical_feedback};
//!
//! let landmarks = Landmarks::new(Vec::new());
//! assert!(biomechanical_feedback(&landmarks, "goddess").is_empty());
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Live practice from the default webcam
//! yoga-pose-coach practice --pose tree
//!
//! # Heart rate and muscle overlay, saving the annotated session
//! yoga-pose-coach practice --pose warrior2 --heart-rate --muscles --save
//!
//! # Check still images, annotated copies go to runs/analyze
//! yoga-pose-coach analyze --pose plank --source photos/
//!
//! # Practice log, profile, ratings, library and meditation
//! yoga-pose-coach history
//! yoga-pose-coach profile --name Sam --experience intermediate
//! yoga-pose-coach review --pose plank --rating 4
//! yoga-pose-coach library
//! yoga-pose-coach nidra
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`pipeline`] | [`PosePipeline`], per-frame extraction, classification and rules |
//! | [`session`] | [`SessionContext`] and the live frame loop |
//! | [`extractor`] | [`LandmarkExtractor`] trait and the ONNX [`LandmarkModel`] |
//! | [`classifier`] | [`PoseClassifier`] trait and the ONNX [`ClassifierModel`] |
//! | [`feedback`] | Confidence-gated [`PoseFeedback`] verdicts |
//! | [`biomechanics`] | Joint angles and per-pose reference ranges |
//! | [`muscles`] | Muscle groups engaged by each pose |
//! | [`annotate`] | [`Compositor`] drawing the overlays |
//! | [`heart_rate`] | Camera-based heart-rate estimate |
//! | [`tracker`], [`profile`], [`review`] | JSON-backed practice records |
//! | [`library`] | Pose reference entries |
//! | [`meditation`] | Yoga-nidra timer |
//! | [`source`] | Frame sources ([`Source`], [`SourceIterator`]) |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `visualize` | Practice window (default) |
//! | `video` | Video file, stream and webcam sources through FFmpeg |

// Modules
pub mod annotate;
pub mod biomechanics;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod feedback;
pub mod heart_rate;
pub mod io;
pub mod landmarks;
pub mod library;
pub mod meditation;
pub mod muscles;
pub mod onnx;
pub mod pipeline;
pub mod pose;
pub mod profile;
pub mod results;
pub mod review;
pub mod session;
pub mod source;
pub mod tracker;
pub mod visualizer;

// Re-export main types for convenience
pub use annotate::{Compositor, OverlayOptions};
pub use biomechanics::{BiomechanicalRule, RuleOutcome, biomechanical_feedback, calculate_joint_angle};
pub use classifier::{ClassifierModel, PoseClassifier};
pub use config::PipelineConfig;
pub use error::{CoachError, Result};
pub use extractor::{LandmarkExtractor, LandmarkModel};
pub use feedback::PoseFeedback;
pub use heart_rate::HeartRateMonitor;
pub use landmarks::{Landmark, LandmarkIndex, Landmarks};
pub use muscles::MuscleGroup;
pub use pipeline::{Detection, FrameOutcome, FrameReport, PosePipeline};
pub use pose::YogaPose;
pub use results::{Classification, Probs};
pub use session::{FrameSink, SessionCommand, SessionContext, SessionSummary, run_session};
pub use source::{Source, SourceIterator, SourceMeta};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "yoga-pose-coach");
    }
}
