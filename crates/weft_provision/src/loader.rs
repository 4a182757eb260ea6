//! Provisioner file loading.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::definition::Provisioner;
use crate::error::{ProvisionError, ProvisionResult};

/// File name suffix identifying provisioner files in the state directory.
pub const PROVISIONERS_FILE_SUFFIX: &str = ".provisioners.yaml";

/// Load every `*.provisioners.yaml` file directly under `dir`, in
/// lexicographic file order, and concatenate the definitions.
///
/// Duplicate (type, class) registrations are rejected here rather than left
/// to first-match behaviour in the matcher.
pub fn load_provisioners(dir: impl AsRef<Path>) -> ProvisionResult<Vec<Provisioner>> {
    let dir = dir.as_ref();
    if !dir.exists() {
        warn!("Provisioners directory does not exist: {:?}", dir);
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path().is_file()
                && e.file_name()
                    .to_string_lossy()
                    .ends_with(PROVISIONERS_FILE_SUFFIX)
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();

    let mut provisioners = Vec::new();
    for file in files {
        debug!("Loading provisioners from {:?}", file);
        let content = fs::read_to_string(&file)?;
        let batch: Vec<Provisioner> = serde_yaml::from_str(&content)?;
        provisioners.extend(batch);
    }

    let mut seen = BTreeSet::new();
    for provisioner in &provisioners {
        if !seen.insert((provisioner.res_type.clone(), provisioner.class.clone())) {
            return Err(ProvisionError::DuplicateProvisioner {
                res_type: provisioner.res_type.clone(),
                class: provisioner.class.clone(),
            });
        }
    }

    info!("Loaded {} provisioners", provisioners.len());
    Ok(provisioners)
}
