//! Error types for workload specifications.

use thiserror::Error;

/// Result type alias for spec operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors that can occur while reading or substituting workload specs.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("invalid workload spec: {0}")]
    InvalidSpec(String),

    #[error("workload metadata is missing required key '{0}'")]
    MissingMetadata(String),

    #[error("unresolved reference '${{{0}}}'")]
    UnresolvedReference(String),

    #[error("reference '${{{0}}}' does not resolve to a scalar value")]
    UnsubstitutableReference(String),

    #[error("unterminated placeholder starting at '${{{0}'")]
    UnterminatedReference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
