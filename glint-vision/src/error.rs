//! Error types for the bright-region pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    /// The input could not be turned into a pixel grid
    #[error("failed to decode {origin}: {message}")]
    Decode { origin: String, message: String },

    /// A threshold or dimension is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl VisionError {
    pub fn decode(origin: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            origin: origin.into(),
            message: message.to_string(),
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

pub type Result<T> = std::result::Result<T, VisionError>;
