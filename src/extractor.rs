// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Body landmark extraction.
//!
//! [`LandmarkModel`] runs a BlazePose-style landmark network through ONNX Runtime
//! and turns its raw output into a normalized [`Landmarks`] set. The pipeline only
//! depends on the [`LandmarkExtractor`] trait so other detectors can be plugged in.

use std::path::Path;

use image::DynamicImage;
use image::imageops::FilterType;
use ndarray::Array4;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::landmarks::{Landmark, LandmarkIndex, Landmarks};
use crate::onnx::{OnnxModel, OutputTensor};

/// Fallback input size when the model declares dynamic spatial dimensions.
const DEFAULT_INPUT_SIZE: usize = 256;

/// Coordinates above this value are treated as input-pixel units.
const PIXEL_COORD_THRESHOLD: f32 = 1.5;

/// Produces body landmarks from a video frame.
pub trait LandmarkExtractor {
    /// Extract landmarks for the most prominent person in `image`.
    ///
    /// Returns `Ok(None)` when no person is in frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying detector fails.
    fn extract(&mut self, image: &DynamicImage) -> Result<Option<Landmarks>>;
}

/// Memory layout of the model's image input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorLayout {
    /// `[1, height, width, 3]`
    Nhwc,
    /// `[1, 3, height, width]`
    Nchw,
}

/// ONNX landmark model.
#[derive(Debug)]
pub struct LandmarkModel {
    model: OnnxModel,
    /// Input size as (height, width).
    input_size: (usize, usize),
    layout: TensorLayout,
    presence_threshold: f32,
}

impl LandmarkModel {
    /// Load the landmark model named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded.
    pub fn load(config: &PipelineConfig) -> Result<Self> {
        Self::load_from(&config.landmark_model, config.num_threads, config.presence_threshold)
    }

    /// Load a landmark model from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded.
    pub fn load_from<P: AsRef<Path>>(path: P, num_threads: usize, presence_threshold: f32) -> Result<Self> {
        let model = OnnxModel::load(path, num_threads)?;
        let (layout, input_size) = input_geometry(model.input_shape());

        Ok(Self {
            model,
            input_size,
            layout,
            presence_threshold,
        })
    }

    /// Model input size as (height, width).
    #[must_use]
    pub const fn input_size(&self) -> (usize, usize) {
        self.input_size
    }

    /// Resize and normalize an image into the model's input tensor.
    #[allow(clippy::cast_possible_truncation)]
    fn preprocess(&self, image: &DynamicImage) -> Array4<f32> {
        let (h, w) = self.input_size;
        let resized = image::imageops::resize(&image.to_rgb8(), w as u32, h as u32, FilterType::Triangle);

        let mut tensor = match self.layout {
            TensorLayout::Nhwc => Array4::<f32>::zeros((1, h, w, 3)),
            TensorLayout::Nchw => Array4::<f32>::zeros((1, 3, h, w)),
        };

        for (x, y, pixel) in resized.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for c in 0..3 {
                let value = f32::from(pixel[c]) / 255.0;
                match self.layout {
                    TensorLayout::Nhwc => tensor[[0, y, x, c]] = value,
                    TensorLayout::Nchw => tensor[[0, c, y, x]] = value,
                }
            }
        }

        tensor
    }
}

impl LandmarkExtractor for LandmarkModel {
    fn extract(&mut self, image: &DynamicImage) -> Result<Option<Landmarks>> {
        let input = self.preprocess(image);
        let outputs = self.model.run(&input)?;
        Ok(decode_landmarks(&outputs, self.input_size, self.presence_threshold))
    }
}

/// Work out tensor layout and spatial size from a declared input shape.
fn input_geometry(shape: &[i64]) -> (TensorLayout, (usize, usize)) {
    let dim = |d: i64| usize::try_from(d).ok().filter(|&v| v > 0).unwrap_or(DEFAULT_INPUT_SIZE);

    if shape.len() == 4 {
        if shape[3] == 3 {
            return (TensorLayout::Nhwc, (dim(shape[1]), dim(shape[2])));
        }
        if shape[1] == 3 {
            return (TensorLayout::Nchw, (dim(shape[2]), dim(shape[3])));
        }
    }

    (TensorLayout::Nhwc, (DEFAULT_INPUT_SIZE, DEFAULT_INPUT_SIZE))
}

fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}

/// Map a score onto `[0, 1]`, treating out-of-range values as logits.
fn as_probability(v: f32) -> f32 {
    if (0.0..=1.0).contains(&v) { v } else { sigmoid(v) }
}

/// Decode raw model outputs into normalized landmarks.
///
/// The first output holds per-landmark records of stride 4 (`x, y, z, visibility`)
/// or 5 (`x, y, z, visibility, presence`). An optional second single-value output
/// is the pose-presence score; scores below `presence_threshold` mean no person.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn decode_landmarks(
    outputs: &[OutputTensor],
    input_size: (usize, usize),
    presence_threshold: f32,
) -> Option<Landmarks> {
    let (shape, data) = outputs.first()?;

    if let Some((_, presence)) = outputs.get(1) {
        if presence.len() == 1 && as_probability(presence[0]) < presence_threshold {
            return None;
        }
    }

    let stride = landmark_stride(shape, data.len())?;
    if data.iter().all(|&v| v == 0.0) {
        return None;
    }

    let records = || data.chunks_exact(stride).take(LandmarkIndex::COUNT);

    // One scale for the whole set: joints near the origin look normalized in pixel space
    let max_coord = records()
        .map(|rec| rec[0].abs().max(rec[1].abs()))
        .fold(0.0_f32, f32::max);
    let (sx, sy) = if max_coord > PIXEL_COORD_THRESHOLD {
        (input_size.1 as f32, input_size.0 as f32)
    } else {
        (1.0, 1.0)
    };

    let points = records()
        .map(|rec| Landmark::new(rec[0] / sx, rec[1] / sy, rec[2] / sx, as_probability(rec[3])))
        .collect();

    Some(Landmarks::new(points))
}

/// Record stride of the landmark output, or `None` if it cannot hold 33 landmarks.
fn landmark_stride(shape: &[usize], len: usize) -> Option<usize> {
    if shape.len() >= 3 {
        let last = shape[shape.len() - 1];
        if (4..=5).contains(&last) && len / last >= LandmarkIndex::COUNT {
            return Some(last);
        }
    }

    [5, 4]
        .into_iter()
        .find(|&s| len % s == 0 && len / s >= LandmarkIndex::COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blazepose_output(presence: f32) -> Vec<OutputTensor> {
        // 39 records of (x, y, z, visibility logit, presence logit) in 256px space
        let mut data = Vec::with_capacity(39 * 5);
        for i in 0..39 {
            data.extend_from_slice(&[128.0, 64.0 + i as f32, 12.8, 5.0, 5.0]);
        }
        vec![(vec![1, 195], data), (vec![1, 1], vec![presence])]
    }

    #[test]
    fn test_input_geometry() {
        assert_eq!(input_geometry(&[1, 256, 256, 3]), (TensorLayout::Nhwc, (256, 256)));
        assert_eq!(input_geometry(&[1, 3, 224, 192]), (TensorLayout::Nchw, (224, 192)));
        assert_eq!(input_geometry(&[-1, 3, -1, -1]), (TensorLayout::Nchw, (256, 256)));
        assert_eq!(input_geometry(&[1, 132]), (TensorLayout::Nhwc, (256, 256)));
    }

    #[test]
    fn test_decode_blazepose_layout() {
        let lms = decode_landmarks(&blazepose_output(0.99), (256, 256), 0.5).unwrap();
        assert_eq!(lms.len(), LandmarkIndex::COUNT);

        let nose = lms.get(LandmarkIndex::Nose).unwrap();
        assert!((nose.x - 0.5).abs() < 1e-6);
        assert!((nose.y - 0.25).abs() < 1e-6);
        assert!((nose.z - 0.05).abs() < 1e-6);
        assert!(nose.visibility > 0.99);
    }

    #[test]
    fn test_low_presence_is_no_detection() {
        assert!(decode_landmarks(&blazepose_output(0.1), (256, 256), 0.5).is_none());
        // Presence given as a logit
        assert!(decode_landmarks(&blazepose_output(-4.0), (256, 256), 0.5).is_none());
    }

    #[test]
    fn test_decode_normalized_stride_four() {
        let data: Vec<f32> = (0..33).flat_map(|_| [0.4, 0.6, -0.1, 0.8]).collect();
        let outputs = vec![(vec![1, 33, 4], data)];
        let lms = decode_landmarks(&outputs, (256, 256), 0.5).unwrap();

        let hip = lms.get(LandmarkIndex::LeftHip).unwrap();
        assert!((hip.x - 0.4).abs() < 1e-6);
        assert!((hip.visibility - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_pixel_scale_applies_to_every_joint() {
        let mut data = Vec::with_capacity(33 * 4);
        // Nose sits one pixel from the corner
        data.extend_from_slice(&[1.0, 1.0, 0.0, 0.9]);
        for _ in 1..33 {
            data.extend_from_slice(&[128.0, 192.0, 0.0, 0.9]);
        }
        let outputs = vec![(vec![1, 33, 4], data)];
        let lms = decode_landmarks(&outputs, (256, 256), 0.5).unwrap();

        let nose = lms.get(LandmarkIndex::Nose).unwrap();
        assert!((nose.x - 1.0 / 256.0).abs() < 1e-6);
        assert!((nose.y - 1.0 / 256.0).abs() < 1e-6);
        let hip = lms.get(LandmarkIndex::LeftHip).unwrap();
        assert!((hip.y - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_all_zero_output_is_no_detection() {
        let outputs = vec![(vec![1, 33, 4], vec![0.0; 132])];
        assert!(decode_landmarks(&outputs, (256, 256), 0.5).is_none());
    }

    #[test]
    fn test_short_output_is_rejected() {
        let outputs = vec![(vec![1, 20], vec![0.5; 20])];
        assert!(decode_landmarks(&outputs, (256, 256), 0.5).is_none());
    }
}
