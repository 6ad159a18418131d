// Yoga Pose Coach 🧘 AGPL-3.0 License

//! Thin ONNX Runtime session wrapper shared by the landmark and pose models.

use std::path::Path;

use ndarray::{Array, Dimension};
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::{TensorRef, ValueType};

use crate::error::{CoachError, Result};

/// One model output as `(shape, data)`.
pub type OutputTensor = (Vec<usize>, Vec<f32>);

/// An ONNX Runtime session with its resolved input and output names.
pub struct OnnxModel {
    session: Session,
    input_name: String,
    input_shape: Vec<i64>,
    output_names: Vec<String>,
}

impl OnnxModel {
    /// Load a model from an ONNX file.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::ModelLoadError`] if the file is missing or ONNX Runtime
    /// rejects it.
    pub fn load<P: AsRef<Path>>(path: P, num_threads: usize) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CoachError::ModelLoadError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| CoachError::ModelLoadError(format!("Failed to create session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| CoachError::ModelLoadError(format!("Failed to set optimization level: {e}")))?
            .with_intra_threads(num_threads)
            .map_err(|e| CoachError::ModelLoadError(format!("Failed to set intra-thread count: {e}")))?
            .commit_from_file(path)
            .map_err(|e| CoachError::ModelLoadError(format!("Failed to load {}: {e}", path.display())))?;

        let (input_name, input_shape) = session
            .inputs
            .first()
            .map(|input| {
                let shape = match &input.input_type {
                    ValueType::Tensor { shape, .. } => shape.iter().copied().collect(),
                    _ => Vec::new(),
                };
                (input.name.clone(), shape)
            })
            .ok_or_else(|| {
                CoachError::ModelLoadError(format!("{} declares no inputs", path.display()))
            })?;

        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        if output_names.is_empty() {
            return Err(CoachError::ModelLoadError(format!(
                "{} declares no outputs",
                path.display()
            )));
        }

        Ok(Self {
            session,
            input_name,
            input_shape,
            output_names,
        })
    }

    /// Declared shape of the first input; dynamic dimensions are negative.
    #[must_use]
    pub fn input_shape(&self) -> &[i64] {
        &self.input_shape
    }

    /// Run the model on a single f32 input and return every output.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::InferenceError`] if the session fails or an output is
    /// not an f32 tensor.
    pub fn run<D: Dimension + 'static>(&mut self, input: &Array<f32, D>) -> Result<Vec<OutputTensor>> {
        let input_contiguous = input.as_standard_layout();

        let input_tensor = TensorRef::from_array_view(&input_contiguous)
            .map_err(|e| CoachError::InferenceError(format!("Failed to create input tensor: {e}")))?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| CoachError::InferenceError(format!("Inference failed: {e}")))?;

        let mut tensors = Vec::with_capacity(self.output_names.len());
        for name in &self.output_names {
            let output = outputs
                .get(name.as_str())
                .ok_or_else(|| CoachError::InferenceError(format!("Output '{name}' not found")))?;

            let (shape, data) = output
                .try_extract_tensor::<f32>()
                .map_err(|e| CoachError::InferenceError(format!("Failed to extract '{name}': {e}")))?;

            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            let shape_vec: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
            tensors.push((shape_vec, data.to_vec()));
        }

        Ok(tensors)
    }
}

impl std::fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxModel")
            .field("input_name", &self.input_name)
            .field("input_shape", &self.input_shape)
            .field("output_names", &self.output_names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_not_found() {
        let result = OnnxModel::load("nonexistent.onnx", 0);
        assert!(matches!(result.unwrap_err(), CoachError::ModelLoadError(_)));
    }
}
