//! Vectorizer and classifier capabilities backed by ONNX Runtime sessions.

use crate::models::artifact::{Classifier, ClassifierInput, FeatureMatrix, Label, Vectorizer};
use crate::models::loader::LoadedModel;
use anyhow::{anyhow, bail, Context, Result};
use ort::value::{DynValue, Tensor};
use std::sync::Mutex;
use tracing::debug;

/// Text vectorizer exported to ONNX (string tensor in, float tensor out)
pub struct OnnxVectorizer {
    /// `Session::run` needs exclusive access
    model: Mutex<LoadedModel>,
}

impl OnnxVectorizer {
    pub fn new(model: LoadedModel) -> Self {
        Self {
            model: Mutex::new(model),
        }
    }
}

impl Vectorizer for OnnxVectorizer {
    fn transform(&self, texts: &[String]) -> Result<FeatureMatrix> {
        let input = string_tensor(texts)?;

        let mut guard = self
            .model
            .lock()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        let model = &mut *guard;

        let outputs = model
            .session
            .run(ort::inputs![&model.input_name => input])
            .with_context(|| format!("Model {} failed to run", model.name))?;

        let output = outputs
            .get(model.output_name.as_str())
            .with_context(|| format!("Model {} produced no {} output", model.name, model.output_name))?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .with_context(|| format!("Model {} output is not a float tensor", model.name))?;

        let dims: Vec<i64> = shape.iter().copied().collect();
        let (rows, cols) = matrix_dims(&dims)
            .with_context(|| format!("Model {} output has unusable shape", model.name))?;

        debug!(model = %model.name, rows = rows, cols = cols, "Texts vectorized");

        FeatureMatrix::new(rows, cols, data.to_vec())
    }
}

/// Classifier exported to ONNX, taking either raw texts or a feature matrix
pub struct OnnxClassifier {
    model: Mutex<LoadedModel>,
}

impl OnnxClassifier {
    pub fn new(model: LoadedModel) -> Self {
        Self {
            model: Mutex::new(model),
        }
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, input: &ClassifierInput) -> Result<Vec<Label>> {
        let value: DynValue = match input {
            ClassifierInput::Texts(texts) => string_tensor(texts)?.into_dyn(),
            ClassifierInput::Features(features) => {
                let shape = vec![features.rows() as i64, features.cols() as i64];
                Tensor::from_array((shape, features.data().to_vec()))
                    .context("Failed to create feature tensor")?
                    .into_dyn()
            }
        };

        let mut guard = self
            .model
            .lock()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        let model = &mut *guard;

        let outputs = model
            .session
            .run(ort::inputs![&model.input_name => value])
            .with_context(|| format!("Model {} failed to run", model.name))?;

        let output = outputs
            .get(model.output_name.as_str())
            .with_context(|| format!("Model {} produced no {} output", model.name, model.output_name))?;

        let labels = extract_labels(output)
            .with_context(|| format!("Model {} returned unreadable labels", model.name))?;

        debug!(model = %model.name, count = labels.len(), "Labels predicted");

        Ok(labels)
    }
}

/// Texts as a `[n, 1]` string tensor, the input shape text transformers are exported with
fn string_tensor(texts: &[String]) -> Result<Tensor<String>> {
    Tensor::from_string_array((text_shape(texts.len()), texts))
        .context("Failed to create text tensor")
}

fn text_shape(count: usize) -> Vec<i64> {
    vec![count as i64, 1]
}

/// `(rows, cols)` of a vectorizer output: `[rows, cols]`, or `[cols]` for a single row
fn matrix_dims(dims: &[i64]) -> Result<(usize, usize)> {
    let to_usize =
        |dim: i64| usize::try_from(dim).map_err(|_| anyhow!("Negative dimension {}", dim));
    match dims {
        [rows, cols] => Ok((to_usize(*rows)?, to_usize(*cols)?)),
        [cols] => Ok((1, to_usize(*cols)?)),
        _ => bail!("Unsupported shape {:?}", dims),
    }
}

/// Read class labels from an int64 or string tensor
fn extract_labels(output: &DynValue) -> Result<Vec<Label>> {
    if let Ok((_, ids)) = output.try_extract_tensor::<i64>() {
        return Ok(ids.iter().map(|&id| Label::Class(id)).collect());
    }

    if let Ok((_, names)) = output.try_extract_strings() {
        return Ok(names.into_iter().map(Label::Text).collect());
    }

    Err(anyhow!("Unsupported label output type {:?}", output.dtype()))
}
