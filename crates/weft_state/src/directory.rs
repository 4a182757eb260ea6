//! State directory persistence.
//!
//! The engine itself performs no I/O; the CLI uses this to load the state
//! snapshot before a run and persist the updated snapshot afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StateResult;
use crate::state::State;

/// Directory name holding weft state and provisioner files.
pub const STATE_DIR_NAME: &str = ".weft";

/// State file name inside the state directory.
pub const STATE_FILE_NAME: &str = "state.yaml";

/// A loaded state directory.
#[derive(Debug, Clone)]
pub struct StateDirectory {
    path: PathBuf,
    pub state: State,
}

impl StateDirectory {
    /// The state directory path (where provisioner files also live).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the state directory under `base` if needed and load it.
    pub fn init(base: impl AsRef<Path>) -> StateResult<Self> {
        let path = base.as_ref().join(STATE_DIR_NAME);
        if !path.exists() {
            fs::create_dir_all(&path)?;
            debug!("Created state directory {:?}", path);
        }
        let state_file = path.join(STATE_FILE_NAME);
        if !state_file.exists() {
            let dir = Self {
                path,
                state: State::default(),
            };
            dir.persist()?;
            return Ok(dir);
        }
        Self::load_from(path)
    }

    /// Load an existing state directory under `base`, or `None` if absent.
    pub fn load(base: impl AsRef<Path>) -> StateResult<Option<Self>> {
        let path = base.as_ref().join(STATE_DIR_NAME);
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(path).map(Some)
    }

    fn load_from(path: PathBuf) -> StateResult<Self> {
        let state_file = path.join(STATE_FILE_NAME);
        debug!("Loading state from {:?}", state_file);
        let state = if state_file.exists() {
            let content = fs::read_to_string(&state_file)?;
            serde_yaml::from_str(&content)?
        } else {
            State::default()
        };
        Ok(Self { path, state })
    }

    /// Write the current state snapshot back to disk.
    pub fn persist(&self) -> StateResult<()> {
        let state_file = self.path.join(STATE_FILE_NAME);
        debug!("Persisting state to {:?}", state_file);
        let content = serde_yaml::to_string(&self.state)?;
        fs::write(state_file, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use weft_spec::WorkloadSpec;

    #[test]
    fn test_load_missing_directory() {
        let temp = tempdir().unwrap();
        assert!(StateDirectory::load(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_init_then_round_trip() {
        let temp = tempdir().unwrap();
        let mut dir = StateDirectory::init(temp.path()).unwrap();
        assert!(dir.state.workloads.is_empty());

        let spec: WorkloadSpec = serde_yaml::from_str(
            r#"
apiVersion: weft/v1
metadata:
  name: example
containers:
  main:
    image: nginx
"#,
        )
        .unwrap();
        dir.state = dir.state.with_workload("example", spec, None);
        dir.persist().unwrap();

        let reloaded = StateDirectory::load(temp.path()).unwrap().unwrap();
        assert_eq!(reloaded.state, dir.state);
    }
}
