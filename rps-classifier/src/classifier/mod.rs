//! Classification pipeline
//!
//! bytes → [`Preprocessor`] → [`InferenceBackend`] → [`decide`] → [`Prediction`]

pub mod decision;
pub mod labels;
pub mod model;
pub mod preprocess;

use std::path::PathBuf;
use std::sync::Arc;

use rps_common::ServiceConfig;
use thiserror::Error;
use tracing::debug;

pub use decision::{decide, Prediction};
pub use labels::{LabelSet, UNKNOWN_LABEL};
pub use model::{InferenceBackend, OnnxModel};
pub use preprocess::Preprocessor;

/// Classification pipeline errors
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Upload contained no bytes
    #[error("Uploaded file is empty")]
    EmptyInput,

    /// Upload could not be decoded as an image
    #[error("Invalid image: {0}")]
    InvalidImage(#[from] image::ImageError),

    /// Model artifact missing at startup
    #[error("Model not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    /// Model artifact present but unusable
    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    /// Forward pass failed
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Model returned no usable scores
    #[error("Model returned an empty output")]
    EmptyOutput,

    /// Winning index has no configured label
    #[error("Class index {index} has no label ({labels} labels configured)")]
    LabelOutOfRange { index: usize, labels: usize },
}

impl ClassifyError {
    /// True when the request payload is at fault rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::InvalidImage(_))
    }
}

/// Image classifier: preprocessing, inference and thresholding
pub struct Classifier {
    backend: Arc<dyn InferenceBackend>,
    preprocessor: Preprocessor,
    labels: LabelSet,
    threshold: f32,
}

impl Classifier {
    pub fn new(
        backend: Arc<dyn InferenceBackend>,
        preprocessor: Preprocessor,
        labels: LabelSet,
        threshold: f32,
    ) -> Self {
        Self {
            backend,
            preprocessor,
            labels,
            threshold,
        }
    }

    /// Load the ONNX model named by the config and wire up the pipeline
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ClassifyError> {
        let preprocessor = Preprocessor::square(config.image_size);
        let model = OnnxModel::load(
            &config.model_path,
            preprocessor.width(),
            preprocessor.height(),
        )?;

        Ok(Self::new(
            Arc::new(model),
            preprocessor,
            LabelSet::new(config.labels.clone()),
            config.confidence_threshold,
        ))
    }

    /// Classify one uploaded image
    pub fn classify(&self, bytes: &[u8]) -> Result<Prediction, ClassifyError> {
        let input = self.preprocessor.prepare(bytes)?;
        let scores = self.backend.infer(input)?;
        debug!(?scores, "Model output");
        decide(&scores, &self.labels, self.threshold)
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn describe(&self) -> String {
        self.backend.describe()
    }
}
