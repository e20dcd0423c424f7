//! Capabilities the service needs from a loaded model artifact.

use anyhow::{bail, Result};
use std::fmt;

#[cfg(test)]
use mockall::automock;

/// Dense row-major feature matrix, one row per input text.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl FeatureMatrix {
    /// Build a matrix from row-major data. Fails if `data` does not hold `rows * cols` values.
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        let Some(len) = rows.checked_mul(cols) else {
            bail!("Feature matrix shape {}x{} overflows", rows, cols);
        };
        if len != data.len() {
            bail!(
                "Feature matrix shape {}x{} does not match {} values",
                rows,
                cols,
                data.len()
            );
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Features of a single input, if `index` is in range
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.cols;
        Some(&self.data[start..start + self.cols])
    }
}

/// What a classifier is asked to label.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierInput {
    /// Raw texts, for classifiers that bundle their own vectorization
    Texts(Vec<String>),
    /// Features produced by a separate vectorizer
    Features(FeatureMatrix),
}

/// A predicted class label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    /// Named class, e.g. `"positive"`
    Text(String),
    /// Integer class id
    Class(i64),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Text(text) => f.write_str(text),
            Label::Class(id) => write!(f, "{}", id),
        }
    }
}

/// Maps raw text into the numeric representation a classifier consumes.
#[cfg_attr(test, automock)]
pub trait Vectorizer: Send + Sync {
    fn transform(&self, texts: &[String]) -> Result<FeatureMatrix>;
}

/// Maps texts or feature rows to one label each, in input order.
#[cfg_attr(test, automock)]
pub trait Classifier: Send + Sync {
    fn predict(&self, input: &ClassifierInput) -> Result<Vec<Label>>;
}
