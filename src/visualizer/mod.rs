// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Visualization tools for practice sessions.

/// Color definitions.
pub mod color;

/// BlazePose skeleton connections.
pub mod skeleton;

#[cfg(feature = "visualize")]
pub mod viewer;

pub use color::Color;

#[cfg(feature = "visualize")]
pub use viewer::Viewer;
