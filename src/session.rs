// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Live practice session.
//!
//! [`SessionContext`] holds everything the keyboard can change during a session and
//! the few counters the session log needs. [`run_session`] is the frame loop: read a
//! frame, run the pipeline, hand the result to a [`FrameSink`], apply the sink's
//! commands, repeat until the source ends or the running flag is cleared.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use image::DynamicImage;

use crate::annotate::OverlayOptions;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::heart_rate::HeartRateMonitor;
use crate::pipeline::{FrameOutcome, FrameReport, PosePipeline};
use crate::pose::YogaPose;
use crate::source::SourceMeta;

/// Overlay opacity change per key press.
pub const OPACITY_STEP: f32 = 0.1;

/// Lowest overlay opacity reachable from the keyboard.
pub const MIN_OPACITY: f32 = 0.1;

/// Highest overlay opacity.
pub const MAX_OPACITY: f32 = 1.0;

/// A user action during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    ToggleHeartRate,
    ToggleMuscles,
    OpacityUp,
    OpacityDown,
    SelectPose(YogaPose),
    Quit,
}

/// State owned by the session loop.
#[derive(Debug)]
pub struct SessionContext {
    /// Pose the practitioner is working on.
    pub target: YogaPose,
    pub show_heart_rate: bool,
    pub show_muscles: bool,
    pub overlay_opacity: f32,
    pub heart_rate: HeartRateMonitor,
    running: Arc<AtomicBool>,
    started: Instant,
    frames: usize,
    detected_frames: usize,
    practiced: Vec<YogaPose>,
}

impl SessionContext {
    #[must_use]
    pub fn new(target: YogaPose) -> Self {
        Self {
            target,
            show_heart_rate: false,
            show_muscles: false,
            overlay_opacity: PipelineConfig::default().overlay_opacity,
            heart_rate: HeartRateMonitor::new(),
            running: Arc::new(AtomicBool::new(true)),
            started: Instant::now(),
            frames: 0,
            detected_frames: 0,
            practiced: Vec::new(),
        }
    }

    /// Take the overlay toggles from a pipeline configuration.
    #[must_use]
    pub fn from_config(target: YogaPose, config: &PipelineConfig) -> Self {
        let mut ctx = Self::new(target);
        ctx.show_heart_rate = config.show_heart_rate;
        ctx.show_muscles = config.show_muscles;
        ctx.overlay_opacity = config.overlay_opacity.clamp(MIN_OPACITY, MAX_OPACITY);
        ctx
    }

    /// Apply a keyboard command.
    pub fn apply(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::ToggleHeartRate => self.show_heart_rate = !self.show_heart_rate,
            SessionCommand::ToggleMuscles => self.show_muscles = !self.show_muscles,
            SessionCommand::OpacityUp => {
                self.overlay_opacity = (self.overlay_opacity + OPACITY_STEP).min(MAX_OPACITY);
            }
            SessionCommand::OpacityDown => {
                self.overlay_opacity = (self.overlay_opacity - OPACITY_STEP).max(MIN_OPACITY);
            }
            SessionCommand::SelectPose(pose) => {
                if pose != self.target {
                    crate::verbose!("Target pose: {}", pose.display_name());
                }
                self.target = pose;
            }
            SessionCommand::Quit => self.stop(),
        }
    }

    /// Shared flag; clearing it ends the loop before the next frame.
    #[must_use]
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Update counters from a processed frame.
    pub fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        if matches!(report.outcome, FrameOutcome::Detected(_)) {
            self.detected_frames += 1;
            if !self.practiced.contains(&report.target) {
                self.practiced.push(report.target);
            }
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    #[must_use]
    pub fn elapsed_minutes(&self) -> f32 {
        self.elapsed().as_secs_f32() / 60.0
    }

    #[must_use]
    pub const fn frames(&self) -> usize {
        self.frames
    }

    #[must_use]
    pub const fn detected_frames(&self) -> usize {
        self.detected_frames
    }

    /// Target poses held with a person in frame, in first-practiced order.
    #[must_use]
    pub fn practiced_poses(&self) -> &[YogaPose] {
        &self.practiced
    }

    /// Mean of the session's heart-rate readings.
    #[must_use]
    pub fn average_heart_rate(&self) -> Option<f32> {
        self.heart_rate.average()
    }

    #[must_use]
    pub const fn overlay_options(&self) -> OverlayOptions {
        OverlayOptions {
            show_muscles: self.show_muscles,
            opacity: self.overlay_opacity,
        }
    }
}

/// Where annotated frames go.
pub trait FrameSink {
    /// Present a frame. Returns `Ok(false)` when the session should end.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be presented.
    fn show(&mut self, frame: &DynamicImage, meta: &SourceMeta) -> Result<bool>;

    /// Commands issued since the last frame.
    fn commands(&mut self) -> Vec<SessionCommand> {
        Vec::new()
    }
}

#[cfg(feature = "visualize")]
impl FrameSink for crate::visualizer::Viewer {
    fn show(&mut self, frame: &DynamicImage, _meta: &SourceMeta) -> Result<bool> {
        self.update(frame)
    }

    fn commands(&mut self) -> Vec<SessionCommand> {
        self.key_commands()
    }
}

/// What a finished session did.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub frames: usize,
    pub detected_frames: usize,
    pub duration_minutes: f32,
    pub poses: Vec<String>,
    pub avg_heart_rate: Option<f32>,
    /// Frame-source failure that ended the session, if any.
    pub source_error: Option<String>,
}

impl SessionSummary {
    fn from_context(ctx: &SessionContext, source_error: Option<String>) -> Self {
        Self {
            frames: ctx.frames(),
            detected_frames: ctx.detected_frames(),
            duration_minutes: ctx.elapsed_minutes(),
            poses: ctx
                .practiced_poses()
                .iter()
                .map(|p| p.display_name().to_string())
                .collect(),
            avg_heart_rate: ctx.average_heart_rate(),
            source_error,
        }
    }
}

/// Run the frame loop until the source ends, the sink declines a frame, or the
/// running flag is cleared.
///
/// A frame the pipeline cannot process is shown unannotated. A source read error
/// ends the loop and is reported in the summary.
///
/// # Errors
///
/// Returns an error if the sink fails to present a frame.
pub fn run_session<I>(
    pipeline: &mut PosePipeline,
    ctx: &mut SessionContext,
    frames: I,
    sink: &mut dyn FrameSink,
) -> Result<SessionSummary>
where
    I: IntoIterator<Item = Result<(DynamicImage, SourceMeta)>>,
{
    let mut source_error = None;
    let mut last_summary = String::new();

    for item in frames {
        if !ctx.is_running() {
            break;
        }

        let (image, meta) = match item {
            Ok(frame) => frame,
            Err(e) => {
                crate::error!("Error reading source: {e}");
                source_error = Some(e.to_string());
                break;
            }
        };

        let shown = match pipeline.process_frame(ctx, &image) {
            Ok((annotated, report)) => {
                let summary = report.summary();
                if summary != last_summary {
                    crate::verbose!("frame {}: {summary}", meta.frame_idx + 1);
                    last_summary = summary;
                }
                sink.show(&annotated, &meta)?
            }
            Err(e) => {
                crate::warn!("Frame {} skipped: {e}", meta.frame_idx + 1);
                sink.show(&image, &meta)?
            }
        };

        if !shown {
            ctx.stop();
        }
        for command in sink.commands() {
            ctx.apply(command);
        }
    }

    ctx.stop();
    Ok(SessionSummary::from_context(ctx, source_error))
}
