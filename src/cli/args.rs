// Yoga Pose Coach 🧘 AGPL-3.0 License

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_CLASSIFIER_MODEL, DEFAULT_LANDMARK_MODEL};
use crate::pose::YogaPose;
use crate::profile::Experience;

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Practice Controls:
    H            Toggle heart-rate readout
    M            Toggle muscle-engagement overlay
    Up / Down    Overlay opacity
    1-5          Target pose (downdog, goddess, plank, tree, warrior2)
    Esc / Q      End the session

Examples:
    yoga-pose-coach practice --pose tree
    yoga-pose-coach practice --pose warrior2 --source 1 --heart-rate --muscles
    yoga-pose-coach analyze --pose plank --source photos/
    yoga-pose-coach review --pose plank --rating 4 --comments "Wrists sore"
    yoga-pose-coach nidra"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,

    /// Show verbose output
    #[arg(long, global = true, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,

    /// Directory for the session log, profile and reviews
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Practice a pose with live feedback from a camera or video
    Practice(PracticeArgs),
    /// Check a pose in still images
    Analyze(AnalyzeArgs),
    /// Show the pose library
    Library,
    /// Show logged sessions and statistics
    History,
    /// Show or update the user profile
    Profile(ProfileArgs),
    /// Rate a practice session
    Review(ReviewArgs),
    /// Run the guided yoga-nidra timer
    Nidra(NidraArgs),
}

/// Model options shared by `practice` and `analyze`.
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Path to the landmark ONNX model
    #[arg(long, default_value = DEFAULT_LANDMARK_MODEL)]
    pub landmark_model: PathBuf,

    /// Path to the pose classifier ONNX model
    #[arg(long, default_value = DEFAULT_CLASSIFIER_MODEL)]
    pub classifier_model: PathBuf,

    /// Intra-op threads for ONNX Runtime (0 = automatic)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Minimum pose-presence score
    #[arg(long, default_value_t = 0.5)]
    pub presence: f32,
}

/// Arguments for the practice command.
#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct PracticeArgs {
    /// Target pose (downdog, goddess, plank, tree, warrior2)
    #[arg(short, long, default_value = "tree")]
    pub pose: YogaPose,

    /// Frame source: webcam index, video file or stream URL
    #[arg(short, long, default_value = "0")]
    pub source: String,

    /// Show the heart-rate readout
    #[arg(long, default_value_t = false)]
    pub heart_rate: bool,

    /// Show the muscle-engagement overlay
    #[arg(long, default_value_t = false)]
    pub muscles: bool,

    /// Muscle overlay opacity
    #[arg(long, default_value_t = 0.4)]
    pub opacity: f32,

    /// Save annotated frames to runs/practice
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Do not add the session to the log
    #[arg(long, default_value_t = false)]
    pub no_log: bool,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// Arguments for the analyze command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Target pose (downdog, goddess, plank, tree, warrior2)
    #[arg(short, long)]
    pub pose: YogaPose,

    /// Image file, directory or glob pattern
    #[arg(short, long)]
    pub source: String,

    /// Draw the muscle-engagement overlay
    #[arg(long, default_value_t = false)]
    pub muscles: bool,

    /// Muscle overlay opacity
    #[arg(long, default_value_t = 0.4)]
    pub opacity: f32,

    /// Save annotated images to runs/analyze
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub save: bool,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// Arguments for the profile command. Without options the profile is printed.
#[derive(Args, Debug, Default)]
pub struct ProfileArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub age: Option<u32>,

    /// Weight in kg
    #[arg(long)]
    pub weight: Option<f32>,

    /// Height in cm
    #[arg(long)]
    pub height: Option<f32>,

    /// Comma-separated goals
    #[arg(long, value_delimiter = ',')]
    pub goals: Option<Vec<String>>,

    /// Beginner, Intermediate or Advanced
    #[arg(long)]
    pub experience: Option<Experience>,

    #[arg(long)]
    pub health_notes: Option<String>,
}

/// Arguments for the review command.
#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// Pose the session focused on
    #[arg(short, long)]
    pub pose: YogaPose,

    /// Rating from 1 to 5
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub rating: u8,

    #[arg(short, long, default_value = "")]
    pub comments: String,

    /// Reviewer name (defaults to the profile name)
    #[arg(long)]
    pub user: Option<String>,
}

/// Arguments for the nidra command.
#[derive(Args, Debug)]
pub struct NidraArgs {
    /// Length of one timer second in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub tick_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_practice_args_defaults() {
        let args = Cli::parse_from(["app", "practice"]);
        assert!(args.verbose);
        assert!(args.data_dir.is_none());
        match args.command {
            Commands::Practice(practice) => {
                assert_eq!(practice.pose, YogaPose::Tree);
                assert_eq!(practice.source, "0");
                assert!(!practice.heart_rate);
                assert!(!practice.muscles);
                assert!((practice.opacity - 0.4).abs() < f32::EPSILON);
                assert_eq!(practice.model.landmark_model, PathBuf::from(DEFAULT_LANDMARK_MODEL));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_practice_args_custom() {
        let args = Cli::parse_from([
            "app",
            "practice",
            "--pose",
            "Warrior II",
            "--source",
            "clip.mp4",
            "--heart-rate",
            "--muscles",
            "--opacity",
            "0.7",
            "--verbose",
            "false",
        ]);
        assert!(!args.verbose);
        match args.command {
            Commands::Practice(practice) => {
                assert_eq!(practice.pose, YogaPose::Warrior2);
                assert_eq!(practice.source, "clip.mp4");
                assert!(practice.heart_rate);
                assert!(practice.muscles);
                assert!((practice.opacity - 0.7).abs() < f32::EPSILON);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unknown_pose_rejected() {
        assert!(Cli::try_parse_from(["app", "analyze", "--pose", "lotus", "--source", "a.jpg"]).is_err());
    }

    #[test]
    fn test_review_rating_range() {
        assert!(Cli::try_parse_from(["app", "review", "--pose", "plank", "--rating", "6"]).is_err());
        let args = Cli::parse_from(["app", "review", "--pose", "plank", "--rating", "5", "-c", "great"]);
        match args.command {
            Commands::Review(review) => {
                assert_eq!(review.rating, 5);
                assert_eq!(review.comments, "great");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_profile_goals_split() {
        let args = Cli::parse_from(["app", "profile", "--goals", "Strength,Balance", "--experience", "advanced"]);
        match args.command {
            Commands::Profile(profile) => {
                assert_eq!(profile.goals, Some(vec!["Strength".to_string(), "Balance".to_string()]));
                assert_eq!(profile.experience, Some(Experience::Advanced));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
