//! Error types for provisioning.

use thiserror::Error;

/// Result type alias for provisioning operations.
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Errors that can occur while loading provisioners or running the
/// template pipeline. All are fatal to the current generation run.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("resource '{uid}' is not supported by any provisioner, implement a custom provisioner for type '{res_type}' with class '{class}'")]
    UnsupportedResource {
        uid: String,
        res_type: String,
        class: String,
    },

    #[error("duplicate provisioner registered for type '{res_type}' with class '{class}'")]
    DuplicateProvisioner { res_type: String, class: String },

    #[error("failed to parse template: {message}")]
    TemplateParse { message: String },

    #[error("failed to execute template: {message}")]
    TemplateRender { message: String },

    #[error("failed to decode template output '{rendered}': {message}")]
    Decode { rendered: String, message: String },

    #[error("{uid}: failed to substitute params: {source}")]
    Substitution {
        uid: String,
        source: weft_spec::SpecError,
    },

    #[error("{uid}: {phase} template failed: {source}")]
    Phase {
        uid: String,
        phase: String,
        source: Box<ProvisionError>,
    },

    #[error("state error: {0}")]
    State(#[from] weft_state::StateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ProvisionError {
    /// Wrap an error with the resource uid and pipeline phase it occurred in.
    pub(crate) fn in_phase(self, uid: &weft_state::ResourceUid, phase: &str) -> ProvisionError {
        ProvisionError::Phase {
            uid: uid.to_string(),
            phase: phase.to_string(),
            source: Box::new(self),
        }
    }
}
