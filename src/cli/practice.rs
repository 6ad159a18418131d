// Yoga Pose Coach 🧘 AGPL-3.0 License

use std::path::Path;
use std::process;

use image::DynamicImage;

use crate::annotate::find_next_run_dir;
use crate::cli::args::{ModelArgs, PracticeArgs};
use crate::io::FrameSaver;
use crate::pipeline::PosePipeline;
use crate::session::{FrameSink, SessionCommand, SessionContext, SessionSummary, run_session};
use crate::source::{Source, SourceIterator, SourceMeta};
use crate::tracker::SessionTracker;
use crate::{PipelineConfig, Result, VERSION};
use crate::{error, section, success, verbose, warn};

#[cfg(feature = "visualize")]
use crate::visualizer::Viewer;

/// Pipeline configuration from the shared model options.
pub(crate) fn pipeline_config(model: &ModelArgs) -> PipelineConfig {
    PipelineConfig::new()
        .with_landmark_model(model.landmark_model.clone())
        .with_classifier_model(model.classifier_model.clone())
        .with_threads(model.threads)
        .with_presence_threshold(model.presence)
}

/// Load the pipeline or exit.
pub(crate) fn load_pipeline(config: &PipelineConfig) -> PosePipeline {
    match PosePipeline::from_config(config) {
        Ok(p) => p,
        Err(e) => {
            error!("Error loading models: {e}");
            process::exit(1);
        }
    }
}

/// Practice window; opened on the first frame so it matches the source size.
#[cfg(feature = "visualize")]
#[derive(Default)]
struct WindowSink {
    viewer: Option<Viewer>,
}

#[cfg(feature = "visualize")]
impl FrameSink for WindowSink {
    fn show(&mut self, frame: &DynamicImage, _meta: &SourceMeta) -> Result<bool> {
        if self.viewer.is_none() {
            let (w, h) = (frame.width() as usize, frame.height() as usize);
            self.viewer = Some(Viewer::new("Yoga Pose Coach", w, h)?);
        }
        match &mut self.viewer {
            Some(viewer) => viewer.update(frame),
            None => Ok(false),
        }
    }

    fn commands(&mut self) -> Vec<SessionCommand> {
        self.viewer.as_ref().map(Viewer::key_commands).unwrap_or_default()
    }
}

/// Runs the session without a window, e.g. over a recorded video.
#[cfg(not(feature = "visualize"))]
struct HeadlessSink;

#[cfg(not(feature = "visualize"))]
impl FrameSink for HeadlessSink {
    fn show(&mut self, _frame: &DynamicImage, _meta: &SourceMeta) -> Result<bool> {
        Ok(true)
    }
}

/// Saves each frame before passing it on.
struct SavingSink<'a> {
    inner: &'a mut dyn FrameSink,
    saver: FrameSaver,
    is_video: bool,
}

impl FrameSink for SavingSink<'_> {
    fn show(&mut self, frame: &DynamicImage, meta: &SourceMeta) -> Result<bool> {
        if let Err(e) = self.saver.save(self.is_video, meta, frame) {
            warn!("Failed to save frame {}: {e}", meta.frame_idx + 1);
        }
        self.inner.show(frame, meta)
    }

    fn commands(&mut self) -> Vec<SessionCommand> {
        self.inner.commands()
    }
}

/// Run a live practice session and log it on exit.
pub fn run_practice(args: &PracticeArgs, data_dir: &Path) {
    let config = pipeline_config(&args.model)
        .with_heart_rate(args.heart_rate)
        .with_muscle_overlay(args.muscles)
        .with_overlay_opacity(args.opacity);

    let mut pipeline = load_pipeline(&config);
    let source = Source::from(args.source.as_str());

    println!("Yoga Pose Coach {VERSION} 🧘 {}", args.pose.display_name());
    verbose!("Source: {}", source.describe());
    if !pipeline.has_classifier() {
        warn!("Practicing without pose classification; only joint-angle corrections are shown");
    }

    let is_video = !source.is_still();
    let frames = match SourceIterator::new(source) {
        Ok(iter) => iter,
        Err(e) => {
            error!("Error opening source: {e}");
            process::exit(1);
        }
    };

    let mut ctx = SessionContext::from_config(args.pose, &config);

    #[cfg(feature = "visualize")]
    let mut base = WindowSink::default();
    #[cfg(not(feature = "visualize"))]
    let mut base = HeadlessSink;

    let result = if args.save {
        let dir = find_next_run_dir(Path::new("runs"), "practice");
        let mut sink = SavingSink {
            inner: &mut base,
            saver: FrameSaver::new(dir),
            is_video,
        };
        let result = run_session(&mut pipeline, &mut ctx, frames, &mut sink);
        let saved_to = sink.saver.save_dir().to_path_buf();
        if let Err(e) = sink.saver.finish() {
            error!("Failed to finish saving: {e}");
        }
        verbose!("Results saved to {}", saved_to.display());
        result
    } else {
        run_session(&mut pipeline, &mut ctx, frames, &mut base)
    };

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            error!("Session ended: {e}");
            process::exit(1);
        }
    };

    print_summary(&summary);
    if !args.no_log {
        log_session(&summary, data_dir);
    }

    if summary.source_error.is_some() {
        process::exit(1);
    }
}

fn print_summary(summary: &SessionSummary) {
    section!("Session summary");
    verbose!(
        "{} frames, person detected in {}, {:.1} min",
        summary.frames,
        summary.detected_frames,
        summary.duration_minutes
    );
    if !summary.poses.is_empty() {
        verbose!("Poses: {}", summary.poses.join(", "));
    }
    if let Some(hr) = summary.avg_heart_rate {
        verbose!("Average heart rate: {hr:.0} BPM");
    }
}

fn log_session(summary: &SessionSummary, data_dir: &Path) {
    if summary.poses.is_empty() {
        verbose!("No pose practiced, session not logged");
        return;
    }

    let mut tracker = match SessionTracker::open(data_dir) {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to open session log: {e}");
            return;
        }
    };

    let record = tracker
        .add_session(summary.duration_minutes, &summary.poses, summary.avg_heart_rate)
        .clone();

    if let Err(e) = tracker.save() {
        error!("Failed to save session log: {e}");
        return;
    }
    success!(
        "Session logged: {} min, {} kcal ({})",
        record.duration,
        record.calories,
        record.poses
    );
}
