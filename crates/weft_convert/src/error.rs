//! Error types for workload conversion.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors that can occur while substituting or rendering a workload.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("unknown workload '{0}'")]
    UnknownWorkload(String),

    #[error("workload '{workload}' has no containers")]
    NoContainers { workload: String },

    #[error("workload '{workload}': resource '{resource}' ({uid}) is not primed")]
    ResourceNotPrimed {
        workload: String,
        resource: String,
        uid: String,
    },

    #[error("workload: {workload}: container: {container}: {field}: {source}")]
    Substitution {
        workload: String,
        container: String,
        field: String,
        source: weft_spec::SpecError,
    },

    #[error("workload: {workload}: container: {container}: files: {target}: missing 'content' or 'source'")]
    MissingFileContent {
        workload: String,
        container: String,
        target: String,
    },

    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("state error: {0}")]
    State(#[from] weft_state::StateError),

    #[error("spec error: {0}")]
    Spec(#[from] weft_spec::SpecError),
}
