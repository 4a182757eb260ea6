//! Workload spec file reading.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{SpecError, SpecResult};
use crate::models::{Probe, WorkloadSpec};

/// Read and structurally check one workload spec file.
///
/// Full schema validation is a collaborator concern; this only rejects specs
/// the engine cannot work with at all.
pub fn read_spec_file(path: impl AsRef<Path>) -> SpecResult<WorkloadSpec> {
    let path = path.as_ref();
    debug!("Reading workload spec from {:?}", path);

    let content = fs::read_to_string(path)?;
    let spec: WorkloadSpec = serde_yaml::from_str(&content)
        .map_err(|e| SpecError::InvalidSpec(format!("{}: {}", path.display(), e)))?;
    check_spec(&spec, &path.display().to_string())?;
    Ok(spec)
}

fn check_spec(spec: &WorkloadSpec, origin: &str) -> SpecResult<()> {
    spec.name()
        .map_err(|_| SpecError::InvalidSpec(format!("{}: metadata.name is required", origin)))?;
    if spec.containers.is_empty() {
        return Err(SpecError::InvalidSpec(format!(
            "{}: at least one container is required",
            origin
        )));
    }
    for (name, container) in &spec.containers {
        for (label, probe) in [
            ("livenessProbe", &container.liveness_probe),
            ("readinessProbe", &container.readiness_probe),
        ] {
            if let Some(probe) = probe {
                check_probe(probe)
                    .map_err(|msg| SpecError::InvalidSpec(format!("{origin}: container '{name}': {label}: {msg}")))?;
            }
        }
    }
    Ok(())
}

fn check_probe(probe: &Probe) -> Result<(), String> {
    match (&probe.exec, &probe.http_get) {
        (Some(_), Some(_)) => Err("'exec' and 'httpGet' are mutually exclusive".to_string()),
        (None, None) => Err("one of 'exec' or 'httpGet' is required".to_string()),
        _ => Ok(()),
    }
}
