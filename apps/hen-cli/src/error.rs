//! Error type of the command-line front end.

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Project error: {0}")]
    Project(#[from] hen_project::ProjectError),

    #[error("Model error: {0}")]
    Model(#[from] hen_model::ModelError),

    #[error("Optimizer error: {0}")]
    Optim(#[from] hen_optim::OptimError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
