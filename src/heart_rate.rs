// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Camera-based heart-rate estimation.
//!
//! The monitor samples the mean green intensity of a fixed forehead region while a
//! face is in frame (photoplethysmography). Once the ring buffer is full the signal is
//! band-passed to the plausible pulse band and the rate is read off the spacing of
//! its peaks.

use std::collections::VecDeque;

use image::DynamicImage;

use crate::landmarks::{LandmarkIndex, Landmarks};

/// Samples kept in the ring buffer.
pub const BUFFER_SIZE: usize = 300;

/// Assumed camera frame rate in Hz.
pub const SAMPLE_RATE: f32 = 30.0;

/// Reported rate before the first valid estimate.
pub const DEFAULT_BPM: u32 = 72;

/// Number of accepted readings kept in the history.
pub const HISTORY_LEN: usize = 10;

/// Pass band of the pulse filter in Hz.
pub const LOW_CUTOFF_HZ: f32 = 0.7;
pub const HIGH_CUTOFF_HZ: f32 = 2.5;

/// Accepted estimates lie strictly inside this range.
const MIN_BPM: f32 = 40.0;
const MAX_BPM: f32 = 180.0;

/// Minimum nose visibility for a face to count as present.
pub const FACE_VISIBILITY: f32 = 0.5;

/// Rectangular measurement zone in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementZone {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl MeasurementZone {
    /// Forehead region used by default.
    pub const FOREHEAD: Self = Self {
        x: 100,
        y: 100,
        width: 200,
        height: 200,
    };

    /// Zone clipped to a `width`×`height` frame, or `None` if nothing remains.
    #[must_use]
    pub fn clip(&self, width: u32, height: u32) -> Option<Self> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let w = self.width.min(width - self.x);
        let h = self.height.min(height - self.y);
        (w > 0 && h > 0).then_some(Self {
            x: self.x,
            y: self.y,
            width: w,
            height: h,
        })
    }
}

/// Rolling heart-rate estimator.
#[derive(Debug, Clone)]
pub struct HeartRateMonitor {
    signal: VecDeque<f32>,
    capacity: usize,
    sample_rate: f32,
    zone: MeasurementZone,
    last_bpm: u32,
    history: VecDeque<u32>,
}

impl Default for HeartRateMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl HeartRateMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            signal: VecDeque::with_capacity(BUFFER_SIZE),
            capacity: BUFFER_SIZE,
            sample_rate: SAMPLE_RATE,
            zone: MeasurementZone::FOREHEAD,
            last_bpm: DEFAULT_BPM,
            history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    /// Use a different measurement zone.
    #[must_use]
    pub const fn with_zone(mut self, zone: MeasurementZone) -> Self {
        self.zone = zone;
        self
    }

    /// Sample one frame.
    ///
    /// A sample is taken only when `landmarks` shows a face. Returns the clipped zone
    /// that was sampled, for drawing.
    #[allow(clippy::cast_precision_loss)]
    pub fn process_frame(&mut self, image: &DynamicImage, landmarks: Option<&Landmarks>) -> Option<MeasurementZone> {
        if !face_present(landmarks) {
            return None;
        }

        let zone = self.zone.clip(image.width(), image.height())?;
        let rgb = image.to_rgb8();

        let mut total = 0.0f64;
        for y in zone.y..zone.y + zone.height {
            for x in zone.x..zone.x + zone.width {
                total += f64::from(rgb.get_pixel(x, y)[1]);
            }
        }
        let count = f64::from(zone.width) * f64::from(zone.height);

        #[allow(clippy::cast_possible_truncation)]
        self.push_sample((total / count) as f32);
        Some(zone)
    }

    /// Append a raw intensity sample, evicting the oldest when full.
    pub fn push_sample(&mut self, value: f32) {
        if self.signal.len() == self.capacity {
            self.signal.pop_front();
        }
        self.signal.push_back(value);
    }

    /// Current heart rate in BPM.
    ///
    /// Re-estimates once the buffer is full; implausible or failed estimates keep the
    /// previous reading.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn heart_rate(&mut self) -> u32 {
        if self.signal.len() == self.capacity {
            let samples: Vec<f32> = self.signal.iter().copied().collect();
            if let Some(bpm) = estimate_bpm(&samples, self.sample_rate) {
                if bpm > MIN_BPM && bpm < MAX_BPM {
                    self.last_bpm = bpm as u32;
                    if self.history.len() == HISTORY_LEN {
                        self.history.pop_front();
                    }
                    self.history.push_back(self.last_bpm);
                }
            }
        }
        self.last_bpm
    }

    /// Last reported rate without re-estimating.
    #[must_use]
    pub const fn last_heart_rate(&self) -> u32 {
        self.last_bpm
    }

    /// Accepted readings, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<u32> {
        self.history.iter().copied().collect()
    }

    /// Mean of the accepted readings, if any.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn average(&self) -> Option<f32> {
        if self.history.is_empty() {
            return None;
        }
        let sum: u32 = self.history.iter().sum();
        Some(sum as f32 / self.history.len() as f32)
    }

    /// Number of buffered samples.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.signal.len()
    }
}

fn face_present(landmarks: Option<&Landmarks>) -> bool {
    landmarks
        .and_then(|lms| lms.get(LandmarkIndex::Nose))
        .is_some_and(|nose| nose.visibility >= FACE_VISIBILITY)
}

/// Centered moving average; windows are truncated at the edges.
#[allow(clippy::cast_precision_loss)]
fn moving_average(signal: &[f32], window: usize) -> Vec<f32> {
    let n = signal.len();
    let half = window / 2;

    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0f64);
    for &v in signal {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + f64::from(v));
    }

    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(n);
            #[allow(clippy::cast_possible_truncation)]
            let mean = ((prefix[hi] - prefix[lo]) / (hi - lo) as f64) as f32;
            mean
        })
        .collect()
}

/// Estimate the pulse rate of an intensity signal sampled at `sample_rate` Hz.
///
/// Returns `None` when fewer than two pulse peaks are found.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn estimate_bpm(signal: &[f32], sample_rate: f32) -> Option<f32> {
    if signal.len() < 3 || sample_rate <= 0.0 {
        return None;
    }

    let mean = signal.iter().sum::<f32>() / signal.len() as f32;
    let centered: Vec<f32> = signal.iter().map(|v| v - mean).collect();

    let hp_window = (sample_rate / LOW_CUTOFF_HZ).round() as usize;
    let lp_window = (sample_rate / HIGH_CUTOFF_HZ).round().max(1.0) as usize;

    let trend = moving_average(&centered, hp_window);
    let high_passed: Vec<f32> = centered.iter().zip(&trend).map(|(v, t)| v - t).collect();
    let filtered = moving_average(&high_passed, lp_window);

    // Edges are distorted by the truncated high-pass window
    let margin = (hp_window / 2).max(1);
    let min_distance = (sample_rate / HIGH_CUTOFF_HZ).ceil() as usize;

    let mut peaks: Vec<usize> = Vec::new();
    for i in margin..filtered.len().saturating_sub(margin) {
        let v = filtered[i];
        if v > 0.0 && v > filtered[i - 1] && v >= filtered[i + 1] {
            match peaks.last_mut() {
                Some(last) if i - *last < min_distance => {
                    if v > filtered[*last] {
                        *last = i;
                    }
                }
                _ => peaks.push(i),
            }
        }
    }

    if peaks.len() < 2 {
        return None;
    }

    let span = (peaks[peaks.len() - 1] - peaks[0]) as f32;
    let mean_interval = span / (peaks.len() - 1) as f32;
    Some(60.0 * sample_rate / mean_interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;
    use image::{Rgb, RgbImage};

    fn pulse(freq_hz: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| 120.0 + 5.0 * (2.0 * std::f32::consts::PI * freq_hz * i as f32 / SAMPLE_RATE).sin())
            .collect()
    }

    fn face(visibility: f32) -> Landmarks {
        Landmarks::new(vec![Landmark::new(0.5, 0.3, 0.0, visibility); LandmarkIndex::COUNT])
    }

    #[test]
    fn test_estimate_synthetic_pulse() {
        let bpm = estimate_bpm(&pulse(1.2, BUFFER_SIZE), SAMPLE_RATE).unwrap();
        assert!((bpm - 72.0).abs() < 2.0, "got {bpm}");

        let bpm = estimate_bpm(&pulse(1.5, BUFFER_SIZE), SAMPLE_RATE).unwrap();
        assert!((bpm - 90.0).abs() < 2.0, "got {bpm}");
    }

    #[test]
    fn test_flat_signal_has_no_estimate() {
        assert!(estimate_bpm(&[120.0; BUFFER_SIZE], SAMPLE_RATE).is_none());
    }

    #[test]
    fn test_default_until_buffer_full() {
        let mut monitor = HeartRateMonitor::new();
        for v in pulse(1.5, BUFFER_SIZE - 1) {
            monitor.push_sample(v);
        }
        assert_eq!(monitor.heart_rate(), DEFAULT_BPM);
        assert!(monitor.history().is_empty());

        monitor.push_sample(120.0);
        assert_ne!(monitor.heart_rate(), DEFAULT_BPM);
        assert_eq!(monitor.history().len(), 1);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut monitor = HeartRateMonitor::new();
        for v in pulse(1.2, BUFFER_SIZE) {
            monitor.push_sample(v);
        }
        for _ in 0..15 {
            monitor.heart_rate();
        }
        assert_eq!(monitor.history().len(), HISTORY_LEN);
        assert_eq!(monitor.buffered(), BUFFER_SIZE);
        assert!(monitor.average().is_some());
    }

    #[test]
    fn test_samples_only_with_face() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(320, 240, Rgb([10, 200, 30])));
        let mut monitor = HeartRateMonitor::new();

        assert!(monitor.process_frame(&img, None).is_none());
        assert!(monitor.process_frame(&img, Some(&face(0.2))).is_none());
        assert_eq!(monitor.buffered(), 0);

        let zone = monitor.process_frame(&img, Some(&face(0.9))).unwrap();
        // Clipped to the 320x240 frame
        assert_eq!((zone.width, zone.height), (200, 140));
        assert_eq!(monitor.buffered(), 1);
    }

    #[test]
    fn test_zone_outside_frame() {
        assert!(MeasurementZone::FOREHEAD.clip(80, 80).is_none());
    }
}
