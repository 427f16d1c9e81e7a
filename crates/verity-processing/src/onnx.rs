//! ONNX Runtime backed classifier

use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use crate::classifier::{Classifier, ClassifierError};
use crate::codec::ImageTensor;

/// Image classifier over an ONNX model taking a `[1, H, W, 3]` float input
/// and producing one score per label.
pub struct OnnxClassifier {
    name: String,
    /// `Session::run` needs exclusive access
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxClassifier {
    /// Initialize ONNX Runtime and load the model at `path`.
    pub fn load<P: AsRef<Path>>(path: P, onnx_threads: usize) -> Result<Self> {
        let path = path.as_ref();

        ort::init().commit()?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .context("Model declares no inputs")?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .context("Model declares no outputs")?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx")
            .to_string();

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            "Model loaded successfully"
        );

        Ok(Self {
            name,
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, tensor: &ImageTensor) -> Result<Vec<f32>, ClassifierError> {
        let shape: Vec<i64> = tensor.shape.iter().map(|d| *d as i64).collect();
        let input = Tensor::from_array((shape, tensor.data.clone()))
            .map_err(|e| ClassifierError::Inference(format!("Failed to create input tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| ClassifierError::Inference(format!("Lock error: {}", e)))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input])
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let output = outputs.get(&self.output_name).ok_or_else(|| {
            ClassifierError::Inference(format!("Missing model output '{}'", self.output_name))
        })?;

        let (_, scores) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        Ok(scores.to_vec())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        &self.name
    }
}
