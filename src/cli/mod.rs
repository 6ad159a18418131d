// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Command-line interface.
//!
//! Argument parsing, console logging and one module per command.

// Modules
/// CLI arguments.
pub mod args;

/// Console logging macros.
pub mod logging;

/// Still-image analysis.
pub mod analyze;

/// Guided meditation.
pub mod nidra;

/// Live practice sessions.
pub mod practice;

/// Library, history, profile and review commands.
pub mod records;
