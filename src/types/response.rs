//! Prediction response body

use crate::models::artifact::Label;
use serde::{Deserialize, Serialize};

/// Body returned by `POST /predict`.
///
/// Always a scalar string, whichever artifact layout produced the label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub sentiment: String,
}

impl From<Label> for PredictResponse {
    fn from(label: Label) -> Self {
        Self {
            sentiment: label.to_string(),
        }
    }
}
