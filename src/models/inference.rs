//! Inference engine: the artifacts loaded at startup and the predict path over them

use crate::config::{AppConfig, ArtifactLayout, ArtifactsConfig};
use crate::models::artifact::{Classifier, ClassifierInput, Label, Vectorizer};
use crate::models::loader::{ensure_artifact_file, ModelLoader};
use crate::models::onnx::{OnnxClassifier, OnnxVectorizer};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// Immutable inference context, built once before the server starts.
pub struct InferenceEngine {
    /// Present only for the split layout
    vectorizer: Option<Box<dyn Vectorizer>>,
    classifier: Box<dyn Classifier>,
}

impl InferenceEngine {
    /// Load the configured ONNX artifacts. Any load failure is fatal to startup.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let artifacts = &config.artifacts;
        check_artifacts(artifacts)?;

        let loader = ModelLoader::with_threads(artifacts.onnx_threads)?;

        let classifier = OnnxClassifier::new(
            loader
                .load_model(&artifacts.classifier_path, "classifier")
                .context("Failed to load classifier artifact")?,
        );

        let engine = match artifacts.layout {
            ArtifactLayout::Split => {
                let vectorizer = OnnxVectorizer::new(
                    loader
                        .load_model(&artifacts.vectorizer_path, "vectorizer")
                        .context("Failed to load vectorizer artifact")?,
                );
                Self::split(Box::new(vectorizer), Box::new(classifier))
            }
            ArtifactLayout::Bundled => Self::bundled(Box::new(classifier)),
        };

        info!(layout = ?engine.layout(), "Inference engine initialized");

        Ok(engine)
    }

    /// Engine over a separate vectorizer and classifier
    pub fn split(vectorizer: Box<dyn Vectorizer>, classifier: Box<dyn Classifier>) -> Self {
        Self {
            vectorizer: Some(vectorizer),
            classifier,
        }
    }

    /// Engine over a classifier that takes raw text
    pub fn bundled(classifier: Box<dyn Classifier>) -> Self {
        Self {
            vectorizer: None,
            classifier,
        }
    }

    pub fn layout(&self) -> ArtifactLayout {
        match self.vectorizer {
            Some(_) => ArtifactLayout::Split,
            None => ArtifactLayout::Bundled,
        }
    }

    /// Predict the label of a single message
    pub fn predict(&self, message: &str) -> Result<Label> {
        let texts = vec![message.to_string()];

        let input = match &self.vectorizer {
            Some(vectorizer) => ClassifierInput::Features(
                vectorizer
                    .transform(&texts)
                    .context("Vectorizer failed")?,
            ),
            None => ClassifierInput::Texts(texts),
        };

        let label = self
            .classifier
            .predict(&input)
            .context("Classifier failed")?
            .into_iter()
            .next()
            .context("Classifier returned no labels")?;

        debug!(label = %label, "Prediction complete");

        Ok(label)
    }
}

/// Artifact files the layout needs, as `(name, path)`
fn required_artifacts(artifacts: &ArtifactsConfig) -> Vec<(&'static str, &str)> {
    let mut required = vec![("classifier", artifacts.classifier_path.as_str())];
    if artifacts.layout == ArtifactLayout::Split {
        required.push(("vectorizer", artifacts.vectorizer_path.as_str()));
    }
    required
}

/// Fail on any missing artifact before the first session is built
fn check_artifacts(artifacts: &ArtifactsConfig) -> Result<()> {
    for (name, path) in required_artifacts(artifacts) {
        ensure_artifact_file(Path::new(path), name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::artifact::{FeatureMatrix, MockClassifier, MockVectorizer};
    use anyhow::anyhow;

    fn artifacts_in(dir: &Path, layout: ArtifactLayout) -> ArtifactsConfig {
        ArtifactsConfig {
            layout,
            classifier_path: dir.join("model.onnx").to_string_lossy().into_owned(),
            vectorizer_path: dir.join("vectorizer.onnx").to_string_lossy().into_owned(),
            onnx_threads: 1,
        }
    }

    #[test]
    fn test_split_startup_fails_without_vectorizer() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.onnx"), b"").unwrap();

        let config = AppConfig {
            artifacts: artifacts_in(dir.path(), ArtifactLayout::Split),
            ..AppConfig::default()
        };

        let err = InferenceEngine::new(&config).err().unwrap();
        assert!(format!("{:#}", err).contains("vectorizer"));
    }

    #[test]
    fn test_startup_fails_without_classifier() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vectorizer.onnx"), b"").unwrap();

        let config = AppConfig {
            artifacts: artifacts_in(dir.path(), ArtifactLayout::Split),
            ..AppConfig::default()
        };

        let err = InferenceEngine::new(&config).err().unwrap();
        assert!(format!("{:#}", err).contains("classifier"));
    }

    #[test]
    fn test_bundled_layout_ignores_vectorizer_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.onnx"), b"").unwrap();
        let artifacts = artifacts_in(dir.path(), ArtifactLayout::Bundled);

        assert_eq!(
            required_artifacts(&artifacts)
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>(),
            vec!["classifier"]
        );
        assert!(check_artifacts(&artifacts).is_ok());
    }

    const FIXED_FEATURES: [f32; 3] = [0.0, 0.7, 0.3];

    fn fixed_vectorizer() -> MockVectorizer {
        let mut vectorizer = MockVectorizer::new();
        vectorizer
            .expect_transform()
            .withf(|texts| texts.len() == 1)
            .returning(|texts| FeatureMatrix::new(texts.len(), 3, FIXED_FEATURES.to_vec()));
        vectorizer
    }

    #[test]
    fn test_split_layout_feeds_features_to_classifier() {
        let mut classifier = MockClassifier::new();
        classifier
            .expect_predict()
            .withf(|input| match input {
                ClassifierInput::Features(features) => features.row(0) == Some(&FIXED_FEATURES[..]),
                ClassifierInput::Texts(_) => false,
            })
            .times(1)
            .returning(|_| Ok(vec![Label::Text("positive".to_string())]));

        let engine = InferenceEngine::split(Box::new(fixed_vectorizer()), Box::new(classifier));

        assert_eq!(engine.layout(), ArtifactLayout::Split);
        assert_eq!(
            engine.predict("great product").unwrap(),
            Label::Text("positive".to_string())
        );
    }

    #[test]
    fn test_bundled_layout_passes_raw_text() {
        let mut classifier = MockClassifier::new();
        classifier
            .expect_predict()
            .withf(|input| match input {
                ClassifierInput::Texts(texts) => texts.len() == 1 && texts[0] == "terrible service",
                ClassifierInput::Features(_) => false,
            })
            .times(1)
            .returning(|_| Ok(vec![Label::Text("negative".to_string())]));

        let engine = InferenceEngine::bundled(Box::new(classifier));

        assert_eq!(engine.layout(), ArtifactLayout::Bundled);
        assert_eq!(
            engine.predict("terrible service").unwrap(),
            Label::Text("negative".to_string())
        );
    }

    #[test]
    fn test_first_label_is_returned() {
        let mut classifier = MockClassifier::new();
        classifier
            .expect_predict()
            .returning(|_| Ok(vec![Label::Class(1), Label::Class(0)]));

        let engine = InferenceEngine::bundled(Box::new(classifier));

        assert_eq!(engine.predict("fine").unwrap(), Label::Class(1));
    }

    #[test]
    fn test_empty_prediction_is_an_error() {
        let mut classifier = MockClassifier::new();
        classifier.expect_predict().returning(|_| Ok(Vec::new()));

        let engine = InferenceEngine::bundled(Box::new(classifier));

        let err = engine.predict("anything").unwrap_err();
        assert!(err.to_string().contains("no labels"));
    }

    #[test]
    fn test_vectorizer_error_skips_classifier() {
        let mut vectorizer = MockVectorizer::new();
        vectorizer
            .expect_transform()
            .returning(|_| Err(anyhow!("vocabulary mismatch")));

        let mut classifier = MockClassifier::new();
        classifier.expect_predict().times(0);

        let engine = InferenceEngine::split(Box::new(vectorizer), Box::new(classifier));

        let err = engine.predict("great product").unwrap_err();
        assert!(format!("{:#}", err).contains("vocabulary mismatch"));
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let mut classifier = MockClassifier::new();
        classifier
            .expect_predict()
            .times(2)
            .returning(|_| Ok(vec![Label::Text("positive".to_string())]));

        let engine = InferenceEngine::split(Box::new(fixed_vectorizer()), Box::new(classifier));

        let first = engine.predict("great product").unwrap();
        let second = engine.predict("great product").unwrap();
        assert_eq!(first, second);
    }
}
