//! Bicep workload manifest rendering.
//!
//! Pure text construction from a fully substituted workload spec: no I/O and
//! no substitution happens here. Every optional field goes through a renderer
//! helper that checks for presence first, so absent data produces no output
//! at all rather than an empty block.

use serde_yaml::Value;

use weft_spec::{Container, Probe, ResourceSpec, Service, WorkloadSpec};

use crate::error::{ConvertError, ConvertResult};

/// Shared document header: the platform extension plus the application and
/// environment parameters injected by the platform CLI.
const DOCUMENT_HEADER: &str = r#"
extension radius

@description('The Radius Application ID. Injected automatically by the rad CLI.')
param application string

@description('The Radius Environment ID. Injected automatically by the rad CLI.')
param environment string
"#;

/// Render the full workload document: one shared header, then one container
/// resource block per workload as siblings.
pub fn render_document(workloads: &[(String, WorkloadSpec)]) -> ConvertResult<String> {
    let mut out = String::from(DOCUMENT_HEADER);
    for (name, spec) in workloads {
        out.push('\n');
        out.push_str(&render_workload(name, spec)?);
    }
    out.push('\n');
    Ok(out)
}

/// Render one workload's container resource block.
///
/// The platform models one container per resource block, so the block is
/// built from the workload's first container in name order.
pub fn render_workload(workload_name: &str, spec: &WorkloadSpec) -> ConvertResult<String> {
    let container = spec
        .containers
        .values()
        .next()
        .ok_or_else(|| ConvertError::NoContainers {
            workload: workload_name.to_string(),
        })?;

    let mut out = String::new();
    out.push_str(&format!(
        "resource {workload_name} 'Applications.Core/containers@2023-10-01-preview' = {{\n"
    ));
    out.push_str(&format!("  name: '{workload_name}'\n"));
    out.push_str("  properties: {\n");
    out.push_str("    application: application\n");
    out.push_str("    environment: environment\n");
    out.push_str("    container: {\n");
    out.push_str(&format!("      image: '{}'\n", container.image));
    push_string_list(&mut out, "      ", "command", &container.command);
    push_string_list(&mut out, "      ", "args", &container.args);
    push_env(&mut out, container);
    push_ports(&mut out, spec.service.as_ref());
    push_probe(&mut out, "livenessProbe", container.liveness_probe.as_ref());
    push_probe(&mut out, "readinessProbe", container.readiness_probe.as_ref());
    out.push_str("    }\n");
    push_connections(&mut out, &spec.resources);
    out.push_str("  }\n");
    out.push('}');
    Ok(out)
}

fn push_string_list(out: &mut String, indent: &str, key: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("{indent}{key}: [\n"));
    for item in items {
        out.push_str(&format!("{indent}  '{item}'\n"));
    }
    out.push_str(&format!("{indent}]\n"));
}

fn push_env(out: &mut String, container: &Container) {
    if container.variables.is_empty() {
        return;
    }
    out.push_str("      env: {\n");
    for (name, value) in &container.variables {
        out.push_str(&format!("        {name}: {{\n"));
        out.push_str(&format!("          value: '{value}'\n"));
        out.push_str("        }\n");
    }
    out.push_str("      }\n");
}

fn push_ports(out: &mut String, service: Option<&Service>) {
    let Some(service) = service else {
        return;
    };
    if service.ports.is_empty() {
        return;
    }
    out.push_str("      ports: {\n");
    for (name, port) in &service.ports {
        out.push_str(&format!("        '{name}': {{\n"));
        out.push_str(&format!("          port: {}\n", port.port));
        if let Some(protocol) = &port.protocol {
            out.push_str(&format!("          protocol: '{protocol}'\n"));
        }
        if let Some(target_port) = port.target_port {
            out.push_str(&format!("          containerPort: {target_port}\n"));
        }
        out.push_str("        }\n");
    }
    out.push_str("      }\n");
}

fn push_probe(out: &mut String, key: &str, probe: Option<&Probe>) {
    let Some(probe) = probe else {
        return;
    };
    out.push_str(&format!("      {key}: {{\n"));
    if let Some(exec) = &probe.exec {
        out.push_str("        kind: 'exec'\n");
        push_string_list(out, "        ", "command", &exec.command);
    } else if let Some(http_get) = &probe.http_get {
        out.push_str("        kind: 'httpGet'\n");
        out.push_str(&format!("        containerPort: {}\n", http_get.port));
        if let Some(path) = &http_get.path {
            out.push_str(&format!("        path: '{path}'\n"));
        }
    }
    out.push_str("      }\n");
}

fn push_connections(
    out: &mut String,
    resources: &std::collections::BTreeMap<String, ResourceSpec>,
) {
    if resources.is_empty() {
        return;
    }
    out.push_str("    connections: {\n");
    for (name, res) in resources {
        let disable = matches!(
            res.params.get("disableDefaultEnvVars"),
            Some(Value::Bool(true))
        );
        out.push_str(&format!("      {name}: {{\n"));
        out.push_str(&format!("        source: {name}.id\n"));
        out.push_str(&format!("        disableDefaultEnvVars: {disable}\n"));
        out.push_str("      }\n");
    }
    out.push_str("    }\n");
}
