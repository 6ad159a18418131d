// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Per-frame pose pipeline.
//!
//! A frame goes through landmark extraction, confidence-gated classification, the
//! biomechanical rules for the target pose and finally the compositor. Frames are
//! independent; only the heart-rate monitor in the session context carries state
//! from one frame to the next.

use image::DynamicImage;

use crate::annotate::{Compositor, OverlayOptions};
use crate::biomechanics::biomechanical_feedback;
use crate::classifier::{ClassifierModel, PoseClassifier, classify};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::extractor::{LandmarkExtractor, LandmarkModel};
use crate::feedback::PoseFeedback;
use crate::heart_rate::MeasurementZone;
use crate::landmarks::Landmarks;
use crate::pose::YogaPose;
use crate::results::Classification;
use crate::session::SessionContext;

/// A person found in the frame and everything derived from it.
#[derive(Debug, Clone)]
pub struct Detection {
    pub landmarks: Landmarks,
    /// `None` when no classifier is loaded.
    pub classification: Option<Classification>,
    /// Verdict against the target pose, when classified.
    pub verdict: Option<PoseFeedback>,
    /// At most two corrections, in rule order.
    pub corrections: Vec<String>,
}

/// What the pipeline concluded about one frame.
#[derive(Debug, Clone)]
pub enum FrameOutcome {
    /// No person, or an empty landmark set.
    NoPerson,
    Detected(Detection),
}

impl FrameOutcome {
    #[must_use]
    pub const fn detection(&self) -> Option<&Detection> {
        match self {
            Self::NoPerson => None,
            Self::Detected(d) => Some(d),
        }
    }
}

/// Everything drawn for one frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub target: YogaPose,
    pub outcome: FrameOutcome,
    /// Heart rate in BPM, when the readout is enabled.
    pub heart_rate: Option<u32>,
    /// Zone sampled for the heart rate this frame.
    pub hr_zone: Option<MeasurementZone>,
}

impl FrameReport {
    /// One-line summary for logs.
    #[must_use]
    pub fn summary(&self) -> String {
        match &self.outcome {
            FrameOutcome::NoPerson => "No person detected".to_string(),
            FrameOutcome::Detected(d) => {
                let mut parts = Vec::new();
                if let Some(c) = &d.classification {
                    parts.push(format!("{} {:.1}%", c.pose, c.confidence));
                }
                if let Some(v) = &d.verdict {
                    parts.push(v.message());
                }
                parts.extend(d.corrections.iter().cloned());
                if parts.is_empty() {
                    parts.push("person detected".to_string());
                }
                parts.join(", ")
            }
        }
    }
}

/// Landmark extractor, optional classifier and compositor.
pub struct PosePipeline {
    extractor: Box<dyn LandmarkExtractor>,
    classifier: Option<Box<dyn PoseClassifier>>,
    compositor: Compositor,
}

impl std::fmt::Debug for PosePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosePipeline")
            .field("has_classifier", &self.has_classifier())
            .field("compositor", &self.compositor)
            .finish_non_exhaustive()
    }
}

impl PosePipeline {
    #[must_use]
    pub fn new(
        extractor: Box<dyn LandmarkExtractor>,
        classifier: Option<Box<dyn PoseClassifier>>,
        compositor: Compositor,
    ) -> Self {
        Self {
            extractor,
            classifier,
            compositor,
        }
    }

    /// Load the ONNX models named in `config`.
    ///
    /// A classifier that fails to load is reported and the pipeline runs without
    /// classification.
    ///
    /// # Errors
    ///
    /// Returns an error if the landmark model cannot be loaded.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let extractor = LandmarkModel::load(config)?;
        crate::verbose!(
            "Loaded landmark model {} (input {:?})",
            config.landmark_model.display(),
            extractor.input_size()
        );

        let classifier: Option<Box<dyn PoseClassifier>> = match ClassifierModel::load(config) {
            Ok(model) => Some(Box::new(model)),
            Err(e) => {
                crate::warn!("Pose classifier unavailable ({e}); running without classification");
                None
            }
        };

        Ok(Self::new(Box::new(extractor), classifier, Compositor::load()))
    }

    #[must_use]
    pub const fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Landmarks for a frame, with empty sets folded into "no person".
    fn landmarks(&mut self, image: &DynamicImage) -> Result<Option<Landmarks>> {
        Ok(self.extractor.extract(image)?.filter(|lms| !lms.is_degenerate()))
    }

    /// Classify, grade and check the rules for a detected person.
    fn detect(&mut self, landmarks: Landmarks, target: YogaPose) -> Detection {
        let classification = match self.classifier.as_deref_mut() {
            Some(classifier) => match classify(classifier, &landmarks) {
                Ok(c) => c,
                Err(e) => {
                    crate::warn!("Classification failed: {e}");
                    None
                }
            },
            None => None,
        };

        let verdict = classification.map(|c| PoseFeedback::evaluate(&c, target));
        let corrections = biomechanical_feedback(&landmarks, target.as_str());

        Detection {
            landmarks,
            classification,
            verdict,
            corrections,
        }
    }

    /// Analyze a single still image without drawing.
    ///
    /// # Errors
    ///
    /// Returns an error if landmark extraction fails.
    pub fn analyze(&mut self, image: &DynamicImage, target: YogaPose) -> Result<FrameOutcome> {
        Ok(match self.landmarks(image)? {
            Some(landmarks) => FrameOutcome::Detected(self.detect(landmarks, target)),
            None => FrameOutcome::NoPerson,
        })
    }

    /// Run the whole pipeline on one frame and return the annotated frame.
    ///
    /// # Errors
    ///
    /// Returns an error if landmark extraction fails.
    pub fn process_frame(&mut self, ctx: &mut SessionContext, image: &DynamicImage) -> Result<(DynamicImage, FrameReport)> {
        let landmarks = self.landmarks(image)?;

        let (heart_rate, hr_zone) = if ctx.show_heart_rate {
            let zone = ctx.heart_rate.process_frame(image, landmarks.as_ref());
            (Some(ctx.heart_rate.heart_rate()), zone)
        } else {
            (None, None)
        };

        let outcome = match landmarks {
            Some(landmarks) => FrameOutcome::Detected(self.detect(landmarks, ctx.target)),
            None => FrameOutcome::NoPerson,
        };

        let report = FrameReport {
            target: ctx.target,
            outcome,
            heart_rate,
            hr_zone,
        };

        let options = OverlayOptions {
            show_muscles: ctx.show_muscles,
            opacity: ctx.overlay_opacity,
        };
        let annotated = self.compositor.render(image, &report, &options);
        ctx.record(&report);

        Ok((annotated, report))
    }

    /// Draw an already computed report.
    #[must_use]
    pub fn render(&self, image: &DynamicImage, report: &FrameReport, options: &OverlayOptions) -> DynamicImage {
        self.compositor.render(image, report, options)
    }
}
