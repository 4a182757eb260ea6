//! Immutable-style state snapshots.
//!
//! A `State` holds every known workload and the per-uid resource records.
//! All update operations clone at the top-level mapping granularity and
//! return a new snapshot; the caller's input is never mutated.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use weft_spec::WorkloadSpec;

use crate::error::{StateError, StateResult};
use crate::uid::ResourceUid;

/// Full system state: workloads plus resource records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub workloads: BTreeMap<String, Workload>,
    #[serde(default)]
    pub resources: BTreeMap<ResourceUid, ResourceState>,
}

/// A workload known to the state, with its originating spec file if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workload {
    pub spec: WorkloadSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Per-uid resource record.
///
/// `params` holds raw declaration params until provisioning substitutes them;
/// `outputs` is written once per provisioning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub source_workload: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioner_uri: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Value>,
}

impl ResourceState {
    fn new(source_workload: &str) -> Self {
        Self {
            source_workload: source_workload.to_string(),
            params: BTreeMap::new(),
            provisioner_uri: None,
            outputs: BTreeMap::new(),
        }
    }
}

impl State {
    /// Return a new snapshot with the workload added or replaced.
    pub fn with_workload(
        &self,
        name: &str,
        spec: WorkloadSpec,
        file: Option<PathBuf>,
    ) -> State {
        let mut next = self.clone();
        next.workloads
            .insert(name.to_string(), Workload { spec, file });
        next
    }

    /// Return a new snapshot whose resource records are derived from the
    /// current workload declarations.
    ///
    /// References sharing type+class+explicit-id collapse onto one uid and
    /// are primed once; conflicting raw params for a shared uid are an error.
    /// Outputs and provisioner uris from an existing record survive priming
    /// so repeated runs stay stable.
    pub fn with_primed_resources(&self) -> StateResult<State> {
        let mut next = self.clone();
        let mut primed: BTreeMap<ResourceUid, ResourceState> = BTreeMap::new();

        for (workload_name, workload) in &self.workloads {
            for (res_name, res) in &workload.spec.resources {
                let uid = ResourceUid::new(
                    workload_name,
                    res_name,
                    &res.res_type,
                    res.class.as_deref(),
                    res.id.as_deref(),
                );
                if let Some(existing) = primed.get(&uid) {
                    if existing.params != res.params {
                        return Err(StateError::ShareConflict {
                            uid: uid.to_string(),
                        });
                    }
                    continue;
                }
                let mut record = self
                    .resources
                    .get(&uid)
                    .cloned()
                    .unwrap_or_else(|| ResourceState::new(workload_name));
                record.source_workload = workload_name.clone();
                record.params = res.params.clone();
                primed.insert(uid, record);
            }
        }

        next.resources = primed;
        Ok(next)
    }

    /// Outputs of every resource declared by a workload, keyed by the
    /// workload-scoped resource name. Used to build substitution contexts.
    pub fn resource_outputs_for_workload(
        &self,
        workload_name: &str,
    ) -> StateResult<BTreeMap<String, BTreeMap<String, Value>>> {
        let workload = self
            .workloads
            .get(workload_name)
            .ok_or_else(|| StateError::UnknownWorkload(workload_name.to_string()))?;

        let mut outputs = BTreeMap::new();
        for (res_name, res) in &workload.spec.resources {
            let uid = ResourceUid::new(
                workload_name,
                res_name,
                &res.res_type,
                res.class.as_deref(),
                res.id.as_deref(),
            );
            let record = self
                .resources
                .get(&uid)
                .ok_or_else(|| StateError::NotPrimed {
                    workload: workload_name.to_string(),
                    resource: res_name.clone(),
                    uid: uid.to_string(),
                })?;
            outputs.insert(res_name.clone(), record.outputs.clone());
        }
        Ok(outputs)
    }
}
