//! hen-project: case-study and algorithm file formats, validation and
//! conversion to the runtime types.

pub mod convert;
pub mod schema;
pub mod validate;

use hen_model::{CaseStudy, ModelError};
use hen_optim::{AlgorithmConfig, OptimError};
use std::path::Path;

pub use convert::{algorithm_from_def, case_study_from_def};
pub use schema::*;
pub use validate::{ValidationError, validate_case};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Case study error: {0}")]
    Model(#[from] ModelError),

    #[error("Algorithm configuration error: {0}")]
    Config(#[from] OptimError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_case_yaml(path: &Path) -> ProjectResult<CaseStudy> {
    let content = std::fs::read_to_string(path)?;
    let def: CaseStudyDef = serde_yaml::from_str(&content)?;
    case_study_from_def(&def)
}

pub fn load_case_json(path: &Path) -> ProjectResult<CaseStudy> {
    let content = std::fs::read_to_string(path)?;
    let def: CaseStudyDef = serde_json::from_str(&content)?;
    case_study_from_def(&def)
}

pub fn save_case_yaml(path: &Path, def: &CaseStudyDef) -> ProjectResult<()> {
    validate_case(def)?;
    let content = serde_yaml::to_string(def)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_algorithm_yaml(path: &Path) -> ProjectResult<AlgorithmConfig> {
    let content = std::fs::read_to_string(path)?;
    let def: AlgorithmDef = serde_yaml::from_str(&content)?;
    algorithm_from_def(&def)
}

pub fn load_algorithm_json(path: &Path) -> ProjectResult<AlgorithmConfig> {
    let content = std::fs::read_to_string(path)?;
    let def: AlgorithmDef = serde_json::from_str(&content)?;
    algorithm_from_def(&def)
}
