//! Resource dependency ordering.
//!
//! A resource depends on another when one of its raw param values contains a
//! `${resources.<name>...}` reference; the referenced resource must be
//! provisioned first so its outputs exist. The sort is a pure function of the
//! input state and byte-identical across runs.

use std::collections::{BTreeMap, BTreeSet};

use serde_yaml::Value;

use weft_spec::find_references;

use crate::error::{StateError, StateResult};
use crate::state::State;
use crate::uid::ResourceUid;

/// Compute the deterministic topological provisioning order for every primed
/// resource. If resource A's params reference resource B's outputs, B comes
/// first. Ties break on the lexicographic uid ordering.
pub fn sorted_resource_uids(state: &State) -> StateResult<Vec<ResourceUid>> {
    let mut deps: BTreeMap<ResourceUid, BTreeSet<ResourceUid>> = state
        .resources
        .keys()
        .map(|uid| (uid.clone(), BTreeSet::new()))
        .collect();

    for (workload_name, workload) in &state.workloads {
        let by_name: BTreeMap<&str, ResourceUid> = workload
            .spec
            .resources
            .iter()
            .map(|(res_name, res)| {
                (
                    res_name.as_str(),
                    ResourceUid::new(
                        workload_name,
                        res_name,
                        &res.res_type,
                        res.class.as_deref(),
                        res.id.as_deref(),
                    ),
                )
            })
            .collect();

        for (res_name, res) in &workload.spec.resources {
            let uid = &by_name[res_name.as_str()];
            let mut edges = match deps.get(uid) {
                Some(edges) => edges.clone(),
                None => continue,
            };
            for value in res.params.values() {
                for reference in value_references(value) {
                    let Some(rest) = reference.strip_prefix("resources.") else {
                        continue;
                    };
                    let target_name = rest.split('.').next().unwrap_or(rest);
                    // unknown names are left for substitution to report
                    if let Some(target) = by_name.get(target_name) {
                        edges.insert(target.clone());
                    }
                }
            }
            deps.insert(uid.clone(), edges);
        }
    }

    // Kahn's algorithm over sorted maps: always emit the smallest ready uid.
    let mut ordered = Vec::with_capacity(deps.len());
    while !deps.is_empty() {
        let ready = deps
            .iter()
            .find(|(uid, edges)| edges.is_empty() || (edges.len() == 1 && edges.contains(uid)))
            .map(|(uid, edges)| (uid.clone(), edges.contains(uid)));
        let Some((uid, self_edge)) = ready else {
            return Err(StateError::DependencyCycle {
                uids: deps.keys().map(ResourceUid::to_string).collect(),
            });
        };
        if self_edge {
            return Err(StateError::DependencyCycle {
                uids: vec![uid.to_string()],
            });
        }
        deps.remove(&uid);
        for edges in deps.values_mut() {
            edges.remove(&uid);
        }
        ordered.push(uid);
    }
    Ok(ordered)
}

/// Collect every `${...}` reference found in a YAML value tree.
fn value_references(value: &Value) -> Vec<String> {
    let mut refs = Vec::new();
    collect(value, &mut refs);
    refs
}

fn collect(value: &Value, refs: &mut Vec<String>) {
    match value {
        Value::String(s) => refs.extend(find_references(s)),
        Value::Sequence(items) => {
            for item in items {
                collect(item, refs);
            }
        }
        Value::Mapping(mapping) => {
            for (_, v) in mapping {
                collect(v, refs);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_spec::WorkloadSpec;

    fn state_from_specs(specs: &[(&str, &str)]) -> State {
        let mut state = State::default();
        for (name, yaml) in specs {
            let spec: WorkloadSpec = serde_yaml::from_str(yaml).unwrap();
            state = state.with_workload(name, spec, None);
        }
        state.with_primed_resources().unwrap()
    }

    #[test]
    fn test_dependency_orders_referenced_resource_first() {
        let state = state_from_specs(&[(
            "web",
            r#"
apiVersion: weft/v1
metadata:
  name: web
containers:
  main:
    image: nginx
resources:
  app-db:
    type: postgres
    params:
      replica_of: ${resources.primary-db.host}
  primary-db:
    type: postgres
"#,
        )]);
        let order = sorted_resource_uids(&state).unwrap();
        let names: Vec<String> = order.iter().map(ResourceUid::to_string).collect();
        assert_eq!(
            names,
            vec!["postgres.default#web.primary-db", "postgres.default#web.app-db"]
        );
    }

    #[test]
    fn test_order_is_deterministic() {
        let state = state_from_specs(&[(
            "web",
            r#"
apiVersion: weft/v1
metadata:
  name: web
containers:
  main:
    image: nginx
resources:
  c:
    type: thing
  a:
    type: thing
  b:
    type: thing
"#,
        )]);
        let first = sorted_resource_uids(&state).unwrap();
        let second = sorted_resource_uids(&state).unwrap();
        assert_eq!(first, second);
        let names: Vec<String> = first.iter().map(ResourceUid::to_string).collect();
        assert_eq!(
            names,
            vec![
                "thing.default#web.a",
                "thing.default#web.b",
                "thing.default#web.c"
            ]
        );
    }

    #[test]
    fn test_cycle_is_detected() {
        let state = state_from_specs(&[(
            "web",
            r#"
apiVersion: weft/v1
metadata:
  name: web
containers:
  main:
    image: nginx
resources:
  first:
    type: thing
    params:
      x: ${resources.second.value}
  second:
    type: thing
    params:
      x: ${resources.first.value}
"#,
        )]);
        let err = sorted_resource_uids(&state).unwrap_err();
        match err {
            StateError::DependencyCycle { uids } => {
                assert_eq!(uids.len(), 2);
                assert!(uids[0].contains("first"));
            }
            other => panic!("expected cycle error, got {other}"),
        }
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let state = state_from_specs(&[(
            "web",
            r#"
apiVersion: weft/v1
metadata:
  name: web
containers:
  main:
    image: nginx
resources:
  selfish:
    type: thing
    params:
      x: ${resources.selfish.value}
"#,
        )]);
        let err = sorted_resource_uids(&state).unwrap_err();
        assert!(matches!(err, StateError::DependencyCycle { .. }));
    }
}
