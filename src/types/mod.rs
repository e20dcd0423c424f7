//! Wire types for the HTTP API

pub mod request;
pub mod response;

pub use request::PredictRequest;
pub use response::PredictResponse;
