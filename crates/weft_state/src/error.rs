//! Error types for state handling.

use thiserror::Error;

/// Result type alias for state operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur while priming, ordering or persisting state.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("unknown workload '{0}'")]
    UnknownWorkload(String),

    #[error("workload '{workload}': resource '{resource}' ({uid}) is not primed")]
    NotPrimed {
        workload: String,
        resource: String,
        uid: String,
    },

    #[error("shared resource '{uid}' is declared with conflicting params")]
    ShareConflict { uid: String },

    #[error("resource dependency cycle involving: {}", .uids.join(", "))]
    DependencyCycle { uids: Vec<String> },

    #[error("invalid resource uid '{0}'")]
    InvalidUid(String),

    #[error("spec error: {0}")]
    Spec(#[from] weft_spec::SpecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
