use thiserror::Error;

#[derive(Debug, Error)]
pub enum LboError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LboError {
    fn from(e: serde_json::Error) -> Self {
        LboError::SerializationError(e.to_string())
    }
}
