//! Error types for case-study construction and network evaluation.

use hen_core::HenError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Dimension mismatch for {what}: expected {expected}, found {found}")]
    Dimension {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid case study: {what}")]
    InvalidCase { what: String },

    #[error("Stream index out of range: {what} (index={index}, len={len})")]
    StreamIndex {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Core error: {0}")]
    Core(#[from] HenError),
}

pub type ModelResult<T> = Result<T, ModelError>;

impl From<ModelError> for HenError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Dimension { what, expected, found } => HenError::Shape { what, expected, found },
            ModelError::InvalidCase { .. } => HenError::Rejected { what: "case study" },
            ModelError::StreamIndex { what, index, len } => HenError::Reference { what, index, len },
            ModelError::Core(inner) => inner,
        }
    }
}
