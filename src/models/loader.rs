//! ONNX artifact loader

use anyhow::{bail, Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::info;

/// Loaded ONNX artifact with the tensor names the service feeds and reads
pub struct LoadedModel {
    /// Artifact name used in logs
    pub name: String,
    /// ONNX Runtime session
    pub session: Session,
    /// Input the texts or features are bound to
    pub input_name: String,
    /// Output holding labels (classifier) or features (vectorizer)
    pub output_name: String,
}

/// Loader for ONNX artifacts
pub struct ModelLoader {
    /// Number of intra-op threads per session
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a loader with the specified number of threads, initializing ONNX Runtime
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        ort::init().commit()?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load a single ONNX artifact from file
    pub fn load_model<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<LoadedModel> {
        let path = path.as_ref();
        ensure_artifact_file(path, name)?;

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load {} from {}", name, path.display()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .with_context(|| format!("Model {} declares no inputs", name))?;

        // Classifiers exported from scikit-learn expose `output_label` next to
        // `output_probability`; vectorizers have a single output.
        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("label"))
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .with_context(|| format!("Model {} declares no outputs", name))?;

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            name: name.to_string(),
            session,
            input_name,
            output_name,
        })
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self { onnx_threads: 1 }
    }
}

/// Reject paths that cannot hold an artifact before handing them to the runtime
pub(crate) fn ensure_artifact_file(path: &Path, name: &str) -> Result<()> {
    if !path.exists() {
        bail!("Artifact {} not found at {}", name, path.display());
    }
    if !path.is_file() {
        bail!("Artifact {} at {} is not a regular file", name, path.display());
    }
    Ok(())
}
