//! Error types for the optimizers.

use hen_core::HenError;
use hen_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimError {
    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Worker pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

pub type OptimResult<T> = Result<T, OptimError>;

impl From<OptimError> for HenError {
    fn from(e: OptimError) -> Self {
        match e {
            OptimError::InvalidConfig { .. } => HenError::Rejected {
                what: "optimizer configuration",
            },
            OptimError::Pool(_) => HenError::Rejected { what: "worker pool" },
            OptimError::Model(inner) => inner.into(),
        }
    }
}

pub(crate) fn invalid(what: impl Into<String>) -> OptimError {
    OptimError::InvalidConfig { what: what.into() }
}
