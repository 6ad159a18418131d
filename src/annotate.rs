// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Frame compositor.
//!
//! Draws, in order: heart-rate readout and measurement zone, muscle-engagement
//! shading, the BlazePose skeleton, then the stacked target/verdict/correction text.
//! A frame with no person gets the "No person detected" line and nothing else.
//! Text needs a TrueType font; without one only the graphics are drawn.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_polygon_mut, draw_text_mut,
};
use imageproc::rect::Rect;

use crate::config::DATA_DIR_NAME;
use crate::heart_rate::MeasurementZone;
use crate::landmarks::Landmarks;
use crate::muscles::engaged_muscles;
use crate::pipeline::{FrameOutcome, FrameReport};
use crate::pose::YogaPose;
use crate::visualizer::Color;
use crate::visualizer::color::{CORRECTION_COLOR, HEART_RATE_COLOR, JOINT_COLOR, LIMB_COLOR};
use crate::visualizer::skeleton::SKELETON;

/// Assets URL for downloading fonts
const ASSETS_URL: &str = "https://github.com/ultralytics/assets/releases/download/v0.0.0";

/// Font used for overlay text.
pub const FONT_NAME: &str = "Arial.ttf";

/// Landmarks less visible than this are not drawn.
const DRAW_VISIBILITY: f32 = 0.5;

const TEXT_X: i32 = 20;
const TEXT_TOP: i32 = 50;
const TEXT_STEP: i32 = 40;
const CORRECTION_GAP: i32 = 20;
const CORRECTION_STEP: i32 = 30;
const HEADLINE_SCALE: f32 = 26.0;
const CORRECTION_SCALE: f32 = 22.0;
const HEART_RATE_SCALE: f32 = 22.0;

/// Find the next available run directory (analyze, analyze2, analyze3, etc.)
#[must_use]
pub fn find_next_run_dir(base: &Path, prefix: &str) -> PathBuf {
    let first = base.join(prefix);
    if !first.exists() {
        return first;
    }

    (2..)
        .map(|i| base.join(format!("{prefix}{i}")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

/// Check if a font exists locally or download it
pub fn check_font(font: &str) -> Option<PathBuf> {
    let font_name = Path::new(font).file_name()?.to_string_lossy().to_string();
    let config_dir = dirs::config_dir()?.join(DATA_DIR_NAME);
    let font_path = config_dir.join(&font_name);

    if font_path.exists() {
        return Some(font_path);
    }

    if let Err(e) = fs::create_dir_all(&config_dir) {
        crate::warn!("Failed to create config directory: {e}");
        return None;
    }

    let url = format!("{ASSETS_URL}/{font_name}");
    crate::info!("Downloading {url} to {}", font_path.display());

    let response = match ureq::get(&url).call() {
        Ok(r) => r,
        Err(e) => {
            crate::warn!("Failed to download font from {url}: {e}");
            return None;
        }
    };

    let mut file = match File::create(&font_path) {
        Ok(f) => f,
        Err(e) => {
            crate::warn!("Failed to create font file: {e}");
            return None;
        }
    };

    let mut reader = response.into_body().into_reader();
    if let Err(e) = io::copy(&mut reader, &mut file) {
        crate::warn!("Failed to download font: {e}");
        let _ = fs::remove_file(&font_path);
        return None;
    }

    Some(font_path)
}

/// Overlay switches controlled by the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayOptions {
    /// Shade engaged muscle groups.
    pub show_muscles: bool,
    /// Muscle overlay opacity (0.0 to 1.0).
    pub opacity: f32,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            show_muscles: false,
            opacity: 0.4,
        }
    }
}

/// Renders frame reports onto video frames.
pub struct Compositor {
    font: Option<FontVec>,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor").field("has_font", &self.has_font()).finish()
    }
}

impl Compositor {
    /// Compositor with the overlay font, downloading it on first use.
    ///
    /// Falls back to a text-less compositor when no font is available.
    #[must_use]
    pub fn load() -> Self {
        let font = check_font(FONT_NAME)
            .and_then(|path| fs::read(path).ok())
            .and_then(|data| FontVec::try_from_vec(data).ok());

        if font.is_none() {
            crate::warn!("No overlay font available, feedback text will not be drawn");
        }
        Self { font }
    }

    /// Compositor that draws graphics only.
    #[must_use]
    pub const fn without_font() -> Self {
        Self { font: None }
    }

    /// Compositor using the given TrueType/OpenType font data.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoachError::VisualizerError`] if the data is not a valid font.
    pub fn with_font_data(data: Vec<u8>) -> crate::Result<Self> {
        let font = FontVec::try_from_vec(data)
            .map_err(|e| crate::CoachError::VisualizerError(format!("Invalid font: {e}")))?;
        Ok(Self { font: Some(font) })
    }

    #[must_use]
    pub const fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draw `report` onto a copy of `image`.
    #[must_use]
    pub fn render(&self, image: &DynamicImage, report: &FrameReport, options: &OverlayOptions) -> DynamicImage {
        let mut img = image.to_rgb8();

        match &report.outcome {
            FrameOutcome::NoPerson => {
                self.draw_text(&mut img, "No person detected", TEXT_X, TEXT_TOP, HEADLINE_SCALE, Color::RED);
            }
            FrameOutcome::Detected(detection) => {
                if let Some(zone) = report.hr_zone {
                    self.draw_zone(&mut img, zone);
                }
                if let Some(bpm) = report.heart_rate {
                    let x = i32::try_from(img.width()).unwrap_or(i32::MAX) - 250;
                    self.draw_text(&mut img, &format!("Heart Rate: {bpm} BPM"), x, 30, HEART_RATE_SCALE, HEART_RATE_COLOR);
                }
                if options.show_muscles {
                    img = blend_muscles(&img, &detection.landmarks, report.target, options.opacity);
                }
                draw_skeleton(&mut img, &detection.landmarks);

                let color = detection.verdict.map_or(Color::WHITE, |v| v.color());
                let mut lines = vec![format!("Target: {}", report.target.display_name())];
                if let Some(c) = &detection.classification {
                    lines.push(format!("Detected: {} ({:.1}%)", c.pose, c.confidence));
                }
                if let Some(verdict) = &detection.verdict {
                    lines.push(verdict.message());
                }

                let mut y = TEXT_TOP;
                for line in &lines {
                    self.draw_text(&mut img, line, TEXT_X, y, HEADLINE_SCALE, color);
                    y += TEXT_STEP;
                }

                y += CORRECTION_GAP;
                for correction in &detection.corrections {
                    self.draw_text(&mut img, &format!("• {correction}"), TEXT_X, y, CORRECTION_SCALE, CORRECTION_COLOR);
                    y += CORRECTION_STEP;
                }
            }
        }

        DynamicImage::ImageRgb8(img)
    }

    /// Draw text with `baseline` as the bottom of the line.
    #[allow(clippy::cast_possible_truncation)]
    fn draw_text(&self, img: &mut RgbImage, text: &str, x: i32, baseline: i32, scale: f32, color: Color) {
        let Some(font) = &self.font else {
            return;
        };
        let top = baseline - (scale * 0.8) as i32;
        draw_text_mut(img, color.to_rgb(), x.max(0), top.max(0), PxScale::from(scale), font, text);
    }

    fn draw_zone(&self, img: &mut RgbImage, zone: MeasurementZone) {
        let (x, y) = (
            i32::try_from(zone.x).unwrap_or(i32::MAX),
            i32::try_from(zone.y).unwrap_or(i32::MAX),
        );
        for t in 0..2u32 {
            if zone.width > 2 * t && zone.height > 2 * t {
                let rect = Rect::at(x + t as i32, y + t as i32).of_size(zone.width - 2 * t, zone.height - 2 * t);
                draw_hollow_rect_mut(img, rect, Color::GREEN.to_rgb());
            }
        }
        self.draw_text(img, "HR Measurement Zone", x - 10, y - 10, 16.0, Color::GREEN);
    }
}

/// Shade the pose's muscle groups and alpha-blend them over the frame.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend_muscles(img: &RgbImage, landmarks: &Landmarks, pose: YogaPose, alpha: f32) -> RgbImage {
    let (width, height) = img.dimensions();
    let mut overlay = img.clone();

    for group in engaged_muscles(pose) {
        match group.polygon(landmarks, width, height) {
            Some(points) => draw_polygon_mut(&mut overlay, &points, group.color().to_rgb()),
            None => crate::verbose!("Skipping {group} overlay: fewer than 3 distinct points"),
        }
    }

    let alpha = alpha.clamp(0.0, 1.0);
    let mut out = img.clone();
    for (dst, (src, over)) in out.pixels_mut().zip(img.pixels().zip(overlay.pixels())) {
        for c in 0..3 {
            let v = f32::from(over[c]) * alpha + f32::from(src[c]) * (1.0 - alpha);
            dst[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Draw skeleton connections and joints for sufficiently visible landmarks.
#[allow(clippy::cast_precision_loss)]
fn draw_skeleton(img: &mut RgbImage, landmarks: &Landmarks) {
    let (width, height) = img.dimensions();
    let visible = |i: usize| {
        landmarks
            .get_index(i)
            .filter(|lm| lm.is_finite() && lm.visibility >= DRAW_VISIBILITY)
            .map(|lm| lm.to_pixel(width, height))
    };

    for [a, b] in SKELETON {
        if let (Some((x1, y1)), Some((x2, y2))) = (visible(a), visible(b)) {
            for (dx, dy) in [(0, 0), (1, 0), (0, 1)] {
                draw_line_segment_mut(
                    img,
                    ((x1 + dx) as f32, (y1 + dy) as f32),
                    ((x2 + dx) as f32, (y2 + dy) as f32),
                    LIMB_COLOR.to_rgb(),
                );
            }
        }
    }

    for i in 0..landmarks.len() {
        if let Some(center) = visible(i) {
            draw_filled_circle_mut(img, center, 2, JOINT_COLOR.to_rgb());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Landmark, LandmarkIndex};
    use crate::pipeline::Detection;
    use image::Rgb;

    fn frame() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 200, Rgb([100, 100, 100])))
    }

    fn plank_landmarks() -> Landmarks {
        let mut points = vec![Landmark::new(0.1, 0.1, 0.0, 0.0); LandmarkIndex::COUNT];
        // Core: hips low, shoulders high
        points[11] = Landmark::new(0.3, 0.3, 0.0, 1.0);
        points[12] = Landmark::new(0.7, 0.3, 0.0, 1.0);
        points[23] = Landmark::new(0.3, 0.7, 0.0, 1.0);
        points[24] = Landmark::new(0.7, 0.7, 0.0, 1.0);
        Landmarks::new(points)
    }

    fn detected(landmarks: Landmarks) -> FrameReport {
        FrameReport {
            target: YogaPose::Plank,
            outcome: FrameOutcome::Detected(Detection {
                landmarks,
                classification: None,
                verdict: None,
                corrections: Vec::new(),
            }),
            heart_rate: None,
            hr_zone: None,
        }
    }

    #[test]
    fn test_find_next_run_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_next_run_dir(dir.path(), "analyze"), dir.path().join("analyze"));
        fs::create_dir(dir.path().join("analyze")).unwrap();
        assert_eq!(find_next_run_dir(dir.path(), "analyze"), dir.path().join("analyze2"));
    }

    #[test]
    fn test_no_person_skips_heart_rate_overlays() {
        let report = FrameReport {
            target: YogaPose::Tree,
            outcome: FrameOutcome::NoPerson,
            heart_rate: Some(72),
            hr_zone: Some(MeasurementZone::FOREHEAD.clip(200, 200).unwrap()),
        };
        let out = Compositor::without_font().render(&frame(), &report, &OverlayOptions::default());
        assert_eq!(out.to_rgb8(), frame().to_rgb8());
    }

    #[test]
    fn test_measurement_zone_outline() {
        let hidden = Landmarks::new(vec![Landmark::new(0.1, 0.1, 0.0, 0.0); LandmarkIndex::COUNT]);
        let mut report = detected(hidden);
        report.heart_rate = Some(72);
        report.hr_zone = Some(MeasurementZone::FOREHEAD.clip(200, 200).unwrap());

        let out = Compositor::without_font()
            .render(&frame(), &report, &OverlayOptions::default())
            .to_rgb8();
        assert_eq!(*out.get_pixel(100, 150), Rgb([0, 255, 0]));
        assert_eq!(*out.get_pixel(150, 150), Rgb([100, 100, 100]));
    }

    #[test]
    fn test_muscle_overlay_blends() {
        let options = OverlayOptions {
            show_muscles: true,
            opacity: 0.5,
        };
        let out = Compositor::without_font()
            .render(&frame(), &detected(plank_landmarks()), &options)
            .to_rgb8();

        // Inside the core polygon, away from skeleton lines: red blended at 50%
        assert_eq!(*out.get_pixel(100, 120), Rgb([178, 50, 50]));
        // Outside every polygon
        assert_eq!(*out.get_pixel(5, 195), Rgb([100, 100, 100]));
    }

    #[test]
    fn test_skeleton_drawn() {
        let out = Compositor::without_font()
            .render(&frame(), &detected(plank_landmarks()), &OverlayOptions::default())
            .to_rgb8();
        // Shoulder line 11-12 at y = 60
        assert_eq!(*out.get_pixel(100, 60), Rgb([255, 0, 0]));
        // Joint dot at the left hip
        assert_eq!(*out.get_pixel(60, 140), Rgb([0, 255, 0]));
        // Invisible joints are not drawn
        assert_eq!(*out.get_pixel(20, 20), Rgb([100, 100, 100]));
    }

    #[test]
    fn test_collapsed_muscles_do_not_panic() {
        let same = Landmarks::new(vec![Landmark::new(0.5, 0.5, 0.0, 1.0); LandmarkIndex::COUNT]);
        let options = OverlayOptions {
            show_muscles: true,
            opacity: 0.4,
        };
        let _ = Compositor::without_font().render(&frame(), &detected(same), &options);
    }
}
