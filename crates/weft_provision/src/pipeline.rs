//! The resource provisioning pipeline.
//!
//! Resources are processed strictly in dependency order, one at a time:
//! match a provisioner, substitute params, run the init → outputs →
//! manifests template phases, and append the manifest fragment. The whole
//! run either succeeds with a new state snapshot or fails leaving the
//! caller's input untouched.

use std::collections::BTreeMap;

use tracing::info;

use weft_spec::{substitute_value, SubstitutionContext};
use weft_state::{sorted_resource_uids, ResourceUid, State, StateError};

use crate::definition::Provisioner;
use crate::error::{ProvisionError, ProvisionResult};
use crate::matcher::match_provisioner;
use crate::template::{TemplateData, TemplateEngine};

/// Provision every resource in the state and assemble the manifest document.
///
/// Returns the concatenated manifest fragments (each preceded by a newline,
/// in provisioning order) together with the updated state snapshot.
pub fn provision(
    state: &State,
    provisioners: &[Provisioner],
    engine: &TemplateEngine,
) -> ProvisionResult<(String, State)> {
    let ordered = sorted_resource_uids(state)?;

    let mut next = state.clone();
    let mut manifests = String::new();

    for uid in ordered {
        let mut record = next
            .resources
            .get(&uid)
            .cloned()
            .ok_or_else(|| StateError::NotPrimed {
                workload: String::new(),
                resource: uid.id().to_string(),
                uid: uid.to_string(),
            })?;

        let provisioner = match_provisioner(provisioners, &uid)?;

        if !record.params.is_empty() {
            record.params =
                substitute_params(&next, &uid, &record.source_workload, record.params)?;
        }
        record.provisioner_uri = Some(provisioner.uri.clone());

        let mut data = TemplateData::new(uid.to_string(), record.source_workload.clone());
        if let Some(init) = engine
            .render_and_decode(provisioner.init_template.as_deref(), &data)
            .map_err(|e| e.in_phase(&uid, "init"))?
        {
            data.init = init;
        }

        record.outputs = engine
            .render_and_decode(provisioner.outputs_template.as_deref(), &data)
            .map_err(|e| e.in_phase(&uid, "outputs"))?
            .unwrap_or_default();

        let fragment = engine
            .render_manifest(provisioner.manifests_template.as_deref(), &data)
            .map_err(|e| e.in_phase(&uid, "manifests"))?;
        info!("Generated manifests for resource {}", uid);

        next.resources.insert(uid, record);
        manifests.push('\n');
        manifests.push_str(&fragment);
    }

    Ok((manifests, next))
}

/// Substitute a resource's raw params against its source workload's metadata
/// and the outputs resolved so far.
fn substitute_params(
    state: &State,
    uid: &ResourceUid,
    source_workload: &str,
    params: BTreeMap<String, serde_yaml::Value>,
) -> ProvisionResult<BTreeMap<String, serde_yaml::Value>> {
    let workload = state
        .workloads
        .get(source_workload)
        .ok_or_else(|| StateError::UnknownWorkload(source_workload.to_string()))?;
    let outputs = state.resource_outputs_for_workload(source_workload)?;
    let ctx = SubstitutionContext::new(workload.spec.metadata.clone(), outputs);

    let mut resolved = BTreeMap::new();
    for (key, value) in params {
        let value = substitute_value(value, &ctx).map_err(|e| ProvisionError::Substitution {
            uid: uid.to_string(),
            source: e,
        })?;
        resolved.insert(key, value);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;
    use weft_spec::WorkloadSpec;

    fn state_from_spec(name: &str, yaml: &str) -> State {
        let spec: WorkloadSpec = serde_yaml::from_str(yaml).unwrap();
        State::default()
            .with_workload(name, spec, None)
            .with_primed_resources()
            .unwrap()
    }

    fn provisioner(res_type: &str) -> Provisioner {
        Provisioner {
            uri: format!("default://{res_type}"),
            res_type: res_type.to_string(),
            class: "default".to_string(),
            description: None,
            init_template: None,
            outputs_template: None,
            manifests_template: None,
            params: Vec::new(),
            expected_outputs: Vec::new(),
        }
    }

    #[test]
    fn test_empty_templates_produce_empty_outputs() {
        let state = state_from_spec(
            "web",
            r#"
apiVersion: weft/v1
metadata:
  name: web
containers:
  main:
    image: nginx
resources:
  thing:
    type: something
    params:
      x: ${metadata.name}
"#,
        );
        let provisioners = vec![provisioner("something")];
        let engine = TemplateEngine::new();
        let (manifests, next) = provision(&state, &provisioners, &engine).unwrap();

        assert_eq!(manifests, "\n");
        let uid = ResourceUid::new("web", "thing", "something", None, None);
        let record = &next.resources[&uid];
        assert!(record.outputs.is_empty());
        assert_eq!(
            record.provisioner_uri.as_deref(),
            Some("default://something")
        );
        assert_eq!(record.params["x"], Value::String("web".to_string()));
    }

    #[test]
    fn test_unsupported_resource_leaves_state_unchanged() {
        let state = state_from_spec(
            "web",
            r#"
apiVersion: weft/v1
metadata:
  name: web
containers:
  main:
    image: nginx
resources:
  thing:
    type: mystery
"#,
        );
        let engine = TemplateEngine::new();
        let before = state.clone();
        let err = provision(&state, &[], &engine).unwrap_err();
        assert!(matches!(err, ProvisionError::UnsupportedResource { .. }));
        assert_eq!(state, before);
    }

    #[test]
    fn test_init_data_feeds_outputs_and_manifests() {
        let state = state_from_spec(
            "web",
            r#"
apiVersion: weft/v1
metadata:
  name: web
containers:
  main:
    image: nginx
resources:
  db:
    type: postgres
"#,
        );
        let mut p = provisioner("postgres");
        p.init_template = Some("host: pg.{{ WorkloadName }}.svc\n".to_string());
        p.outputs_template = Some("host: {{ Init.host }}\nport: 5432\n".to_string());
        p.manifests_template =
            Some("resource db 'Databases/postgres' = {\n  host: '{{ Init.host }}'\n}\n".to_string());

        let engine = TemplateEngine::new();
        let (manifests, next) = provision(&state, &[p], &engine).unwrap();

        let uid = ResourceUid::new("web", "db", "postgres", None, None);
        let record = &next.resources[&uid];
        assert_eq!(record.outputs["host"], Value::String("pg.web.svc".to_string()));
        assert_eq!(record.outputs["port"], Value::Number(5432.into()));
        assert!(manifests.starts_with("\nresource db"));
        assert!(manifests.contains("host: 'pg.web.svc'"));
    }

    #[test]
    fn test_params_see_upstream_outputs() {
        let state = state_from_spec(
            "web",
            r#"
apiVersion: weft/v1
metadata:
  name: web
containers:
  main:
    image: nginx
resources:
  cache:
    type: redis
    params:
      peer: ${resources.db.host}
  db:
    type: postgres
"#,
        );
        let mut pg = provisioner("postgres");
        pg.outputs_template = Some("host: pg.{{ WorkloadName }}.svc\n".to_string());
        let redis = provisioner("redis");

        let engine = TemplateEngine::new();
        let (_, next) = provision(&state, &[pg, redis], &engine).unwrap();

        let cache_uid = ResourceUid::new("web", "cache", "redis", None, None);
        assert_eq!(
            next.resources[&cache_uid].params["peer"],
            Value::String("pg.web.svc".to_string())
        );
    }

    #[test]
    fn test_fragments_assemble_in_dependency_order() {
        let state = state_from_spec(
            "web",
            r#"
apiVersion: weft/v1
metadata:
  name: web
containers:
  main:
    image: nginx
resources:
  app:
    type: bucket
    params:
      after: ${resources.store.name}
  store:
    type: bucket
    id: store
"#,
        );
        let mut p = provisioner("bucket");
        p.outputs_template = Some("name: {{ Id }}\n".to_string());
        p.manifests_template = Some("// {{ Id }}".to_string());

        let engine = TemplateEngine::new();
        let (manifests, _) = provision(&state, &[p], &engine).unwrap();
        assert_eq!(
            manifests,
            "\n// bucket.default#store\n// bucket.default#web.app"
        );
    }

    #[test]
    fn test_provision_is_idempotent() {
        let state = state_from_spec(
            "web",
            r#"
apiVersion: weft/v1
metadata:
  name: web
containers:
  main:
    image: nginx
resources:
  db:
    type: postgres
    params:
      name: ${metadata.name}-db
"#,
        );
        let mut p = provisioner("postgres");
        p.outputs_template = Some("host: pg.{{ WorkloadName }}.svc\n".to_string());
        p.manifests_template = Some("resource db 'Databases/postgres' = {}\n".to_string());

        let engine = TemplateEngine::new();
        let (first_manifests, first_state) = provision(&state, &[p.clone()], &engine).unwrap();
        let (second_manifests, second_state) =
            provision(&first_state, &[p], &engine).unwrap();
        assert_eq!(first_manifests, second_manifests);
        assert_eq!(first_state, second_state);
    }

    #[test]
    fn test_decode_failure_aborts_run() {
        let state = state_from_spec(
            "web",
            r#"
apiVersion: weft/v1
metadata:
  name: web
containers:
  main:
    image: nginx
resources:
  db:
    type: postgres
"#,
        );
        let mut p = provisioner("postgres");
        p.outputs_template = Some("[[ not yaml: {{ WorkloadName }}\n".to_string());

        let engine = TemplateEngine::new();
        let err = provision(&state, &[p], &engine).unwrap_err();
        match err {
            ProvisionError::Phase { phase, source, .. } => {
                assert_eq!(phase, "outputs");
                assert!(matches!(*source, ProvisionError::Decode { .. }));
            }
            other => panic!("expected phase-wrapped decode error, got {other}"),
        }
    }
}
