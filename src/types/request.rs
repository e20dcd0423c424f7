//! Prediction request body

use serde::{Deserialize, Serialize};

/// Body of `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Text to classify; any string, including the empty one
    pub msg: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserialization() {
        let request: PredictRequest = serde_json::from_str(r#"{"msg": "great product"}"#).unwrap();
        assert_eq!(request.msg, "great product");
    }

    #[test]
    fn test_empty_message_is_accepted() {
        let request: PredictRequest = serde_json::from_str(r#"{"msg": ""}"#).unwrap();
        assert!(request.msg.is_empty());
    }

    #[test]
    fn test_missing_or_mistyped_message_is_rejected() {
        assert!(serde_json::from_str::<PredictRequest>(r#"{}"#).is_err());
        assert!(serde_json::from_str::<PredictRequest>(r#"{"msg": 5}"#).is_err());
        assert!(serde_json::from_str::<PredictRequest>(r#"{"msg": null}"#).is_err());
    }
}
