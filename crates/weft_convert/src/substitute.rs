//! Workload substitution pass.
//!
//! Resolves every `${...}` reference inside a workload's container variables
//! and files against the workload metadata and resolved resource outputs,
//! and attaches each resource's resolved params. The result is either a
//! fully substituted spec or an error; there is no partial result.

use std::fs;
use std::path::Path;

use tracing::debug;

use weft_spec::{substitute_string, SubstitutionContext, WorkloadSpec};
use weft_state::{ResourceUid, State};

use crate::error::{ConvertError, ConvertResult};

/// Substitute one workload's spec against the current state.
pub fn substitute_workload(state: &State, workload_name: &str) -> ConvertResult<WorkloadSpec> {
    let workload = state
        .workloads
        .get(workload_name)
        .ok_or_else(|| ConvertError::UnknownWorkload(workload_name.to_string()))?;
    let outputs = state.resource_outputs_for_workload(workload_name)?;
    let ctx = SubstitutionContext::new(workload.spec.metadata.clone(), outputs);
    debug!("Substituting workload '{}'", workload_name);

    let mut spec = workload.spec.clone();
    let spec_dir = workload
        .file
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf);

    for (container_name, container) in &mut spec.containers {
        for (key, value) in &mut container.variables {
            *value = substitute_string(value, &ctx).map_err(|e| ConvertError::Substitution {
                workload: workload_name.to_string(),
                container: container_name.clone(),
                field: format!("variables: {key}"),
                source: e,
            })?;
        }

        let files = std::mem::take(&mut container.files);
        for (target, mut file) in files {
            let content = match (&file.content, &file.source) {
                (Some(content), _) => content.clone(),
                (None, Some(source)) => {
                    let mut path = Path::new(source).to_path_buf();
                    if path.is_relative() {
                        if let Some(dir) = &spec_dir {
                            path = dir.join(path);
                        }
                    }
                    fs::read_to_string(&path)
                        .map_err(|e| ConvertError::FileRead { path, source: e })?
                }
                (None, None) => {
                    return Err(ConvertError::MissingFileContent {
                        workload: workload_name.to_string(),
                        container: container_name.clone(),
                        target,
                    })
                }
            };
            let content = if file.no_expand.unwrap_or(false) {
                content
            } else {
                substitute_string(&content, &ctx).map_err(|e| ConvertError::Substitution {
                    workload: workload_name.to_string(),
                    container: container_name.clone(),
                    field: format!("files: {target}"),
                    source: e,
                })?
            };
            file.source = None;
            file.content = Some(content);
            file.no_expand = Some(true);
            container.files.insert(target, file);
        }
    }

    for (res_name, res) in &mut spec.resources {
        let uid = ResourceUid::new(
            workload_name,
            res_name,
            &res.res_type,
            res.class.as_deref(),
            res.id.as_deref(),
        );
        let record = state
            .resources
            .get(&uid)
            .ok_or_else(|| ConvertError::ResourceNotPrimed {
                workload: workload_name.to_string(),
                resource: res_name.clone(),
                uid: uid.to_string(),
            })?;
        res.params = record.params.clone();
    }

    Ok(spec)
}
