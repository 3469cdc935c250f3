//! Model inference backends
//!
//! The classifier treats the network as an opaque function from an input tensor to a
//! score vector. [`OnnxModel`] runs an exported ONNX artifact with tract; tests plug
//! in their own [`InferenceBackend`].

use std::path::{Path, PathBuf};

use tract_onnx::prelude::*;
use tracing::info;

use super::ClassifyError;

type RunnableOnnx = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Forward pass over one preprocessed batch
pub trait InferenceBackend: Send + Sync {
    /// Run the model; returns the first output flattened to one score per class
    fn infer(&self, input: tract_ndarray::Array4<f32>) -> Result<Vec<f32>, ClassifyError>;

    /// Short description for logs and the health endpoint
    fn describe(&self) -> String;
}

/// ONNX model executed with tract
pub struct OnnxModel {
    plan: RunnableOnnx,
    path: PathBuf,
}

impl OnnxModel {
    /// Load, type-check and optimize a model expecting `f32 [1, height, width, 3]`
    ///
    /// A missing file is reported as [`ClassifyError::ModelNotFound`] so startup can
    /// fail fast with a clear message.
    pub fn load(path: &Path, width: u32, height: u32) -> Result<Self, ClassifyError> {
        if !path.is_file() {
            return Err(ClassifyError::ModelNotFound(path.to_path_buf()));
        }

        let input_shape = [1, height as usize, width as usize, 3];
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact(input_shape).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| ClassifyError::ModelLoad(format!("{}: {:#}", path.display(), e)))?;

        info!("Loaded ONNX model from {}", path.display());

        Ok(Self {
            plan,
            path: path.to_path_buf(),
        })
    }
}

impl InferenceBackend for OnnxModel {
    fn infer(&self, input: tract_ndarray::Array4<f32>) -> Result<Vec<f32>, ClassifyError> {
        let outputs = self
            .plan
            .run(tvec!(input.into_tensor().into()))
            .map_err(|e| ClassifyError::Inference(format!("{:#}", e)))?;

        let first = outputs
            .first()
            .ok_or_else(|| ClassifyError::Inference("model produced no outputs".to_string()))?;

        let scores = first
            .to_array_view::<f32>()
            .map_err(|e| ClassifyError::Inference(format!("{:#}", e)))?;

        Ok(scores.iter().copied().collect())
    }

    fn describe(&self) -> String {
        format!("onnx:{}", self.path.display())
    }
}
