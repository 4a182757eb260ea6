//! Template engine for provisioner-authored templates.
//!
//! Provisioner init/outputs/manifests templates are handlebars text rendered
//! against a `{Id, Init, WorkloadName}` context. The helper registry is
//! injected at construction so tests can run a reduced deterministic set;
//! every stock helper is a pure string/list function.

use std::collections::BTreeMap;

use handlebars::{handlebars_helper, Handlebars, HelperDef};
use serde::Serialize;
use serde_json::Value as JsonValue;
use serde_yaml::Value;

use crate::error::{ProvisionError, ProvisionResult};

/// Context visible to all three template phases of one resource.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateData {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Init")]
    pub init: BTreeMap<String, Value>,
    #[serde(rename = "WorkloadName")]
    pub workload_name: String,
}

impl TemplateData {
    /// Fresh context with empty init data.
    pub fn new(id: impl Into<String>, workload_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            init: BTreeMap::new(),
            workload_name: workload_name.into(),
        }
    }
}

fn json_display(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

handlebars_helper!(upper: |s: str| s.to_uppercase());
handlebars_helper!(lower: |s: str| s.to_lowercase());
handlebars_helper!(trim: |s: str| s.trim().to_string());
handlebars_helper!(quote: |s: str| format!("'{s}'"));
handlebars_helper!(join: |items: Json, sep: str| match items {
    JsonValue::Array(values) => values
        .iter()
        .map(json_display)
        .collect::<Vec<_>>()
        .join(sep),
    other => json_display(other),
});
handlebars_helper!(default_value: |value: Json, fallback: Json| {
    match value {
        JsonValue::Null => json_display(fallback),
        JsonValue::String(s) if s.is_empty() => json_display(fallback),
        other => json_display(other),
    }
});

/// Handlebars registry with the injected helper set.
pub struct TemplateEngine {
    registry: Handlebars<'static>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    /// Engine with the stock helper library.
    pub fn new() -> Self {
        let mut engine = Self::bare();
        engine.register_helper("upper", Box::new(upper));
        engine.register_helper("lower", Box::new(lower));
        engine.register_helper("trim", Box::new(trim));
        engine.register_helper("quote", Box::new(quote));
        engine.register_helper("join", Box::new(join));
        engine.register_helper("default", Box::new(default_value));
        engine
    }

    /// Engine with no helpers registered.
    pub fn bare() -> Self {
        let mut registry = Handlebars::new();
        // Templates render YAML and raw infrastructure manifests, never HTML,
        // so disable the default HTML entity escaping.
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry }
    }

    /// Register an additional helper under the given name.
    pub fn register_helper(
        &mut self,
        name: &str,
        helper: Box<dyn HelperDef + Send + Sync + 'static>,
    ) {
        self.registry.register_helper(name, helper);
    }

    /// Render a template against the phase context, distinguishing parse
    /// errors from execution errors.
    pub fn render(&self, template: &str, data: &TemplateData) -> ProvisionResult<String> {
        handlebars::Template::compile(template).map_err(|e| ProvisionError::TemplateParse {
            message: e.to_string(),
        })?;
        self.registry
            .render_template(template, data)
            .map_err(|e| ProvisionError::TemplateRender {
                message: e.to_string(),
            })
    }

    /// Render a template and decode the output as a YAML mapping.
    ///
    /// A missing template, whitespace-only template text, or whitespace-only
    /// rendered text all mean "no data" rather than an error.
    pub fn render_and_decode(
        &self,
        template: Option<&str>,
        data: &TemplateData,
    ) -> ProvisionResult<Option<BTreeMap<String, Value>>> {
        let Some(raw) = template else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let rendered = self.render(raw, data)?;
        if rendered.trim().is_empty() {
            return Ok(None);
        }
        let value: Value =
            serde_yaml::from_str(&rendered).map_err(|e| ProvisionError::Decode {
                rendered: rendered.clone(),
                message: e.to_string(),
            })?;
        project_mapping(value, &rendered).map(Some)
    }

    /// Render the manifest template to trimmed raw text. A missing or blank
    /// template yields an empty fragment.
    pub fn render_manifest(
        &self,
        template: Option<&str>,
        data: &TemplateData,
    ) -> ProvisionResult<String> {
        let Some(raw) = template else {
            return Ok(String::new());
        };
        if raw.trim().is_empty() {
            return Ok(String::new());
        }
        let rendered = self.render(raw, data)?;
        Ok(rendered.trim().to_string())
    }
}

/// Project a decoded YAML document into a string-keyed mapping. The untyped
/// value stops here; callers only ever see the validated mapping.
fn project_mapping(value: Value, rendered: &str) -> ProvisionResult<BTreeMap<String, Value>> {
    let mapping = match value {
        Value::Null => return Ok(BTreeMap::new()),
        Value::Mapping(mapping) => mapping,
        _ => {
            return Err(ProvisionError::Decode {
                rendered: rendered.to_string(),
                message: "expected a mapping".to_string(),
            })
        }
    };
    let mut out = BTreeMap::new();
    for (key, val) in mapping {
        let key = key.as_str().ok_or_else(|| ProvisionError::Decode {
            rendered: rendered.to_string(),
            message: "mapping keys must be strings".to_string(),
        })?;
        out.insert(key.to_string(), val);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_context_fields() {
        let engine = TemplateEngine::new();
        let data = TemplateData::new("postgres.default#web.db", "web");
        let out = engine
            .render("{{ Id }} for {{ WorkloadName }}", &data)
            .unwrap();
        assert_eq!(out, "postgres.default#web.db for web");
    }

    #[test]
    fn test_helpers() {
        let engine = TemplateEngine::new();
        let data = TemplateData::new("id", "web");
        let out = engine
            .render("{{ upper WorkloadName }}-{{ quote Id }}", &data)
            .unwrap();
        assert_eq!(out, "WEB-'id'");
    }

    #[test]
    fn test_bare_engine_lacks_helpers() {
        let engine = TemplateEngine::bare();
        let data = TemplateData::new("id", "web");
        assert!(engine.render("{{ upper WorkloadName }}", &data).is_err());
    }

    #[test]
    fn test_parse_error() {
        let engine = TemplateEngine::new();
        let data = TemplateData::new("id", "web");
        let err = engine.render("{{ #broken", &data).unwrap_err();
        assert!(matches!(err, ProvisionError::TemplateParse { .. }));
    }

    #[test]
    fn test_decode_blank_is_none() {
        let engine = TemplateEngine::new();
        let data = TemplateData::new("id", "web");
        assert!(engine.render_and_decode(None, &data).unwrap().is_none());
        assert!(engine
            .render_and_decode(Some("   \n"), &data)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_decode_mapping() {
        let engine = TemplateEngine::new();
        let data = TemplateData::new("id", "web");
        let decoded = engine
            .render_and_decode(Some("host: db.{{ WorkloadName }}.svc\nport: 5432\n"), &data)
            .unwrap()
            .unwrap();
        assert_eq!(decoded["host"], Value::String("db.web.svc".to_string()));
        assert_eq!(decoded["port"], Value::Number(5432.into()));
    }

    #[test]
    fn test_decode_error_reports_rendered_text() {
        let engine = TemplateEngine::new();
        let data = TemplateData::new("id", "web");
        let err = engine
            .render_and_decode(Some("- not\n- a: mapping: at all\n"), &data)
            .unwrap_err();
        match err {
            ProvisionError::Decode { rendered, .. } => {
                assert!(rendered.contains("not"));
            }
            other => panic!("expected decode error, got {other}"),
        }
    }

    #[test]
    fn test_decode_rejects_non_mapping() {
        let engine = TemplateEngine::new();
        let data = TemplateData::new("id", "web");
        let err = engine
            .render_and_decode(Some("just a scalar"), &data)
            .unwrap_err();
        assert!(matches!(err, ProvisionError::Decode { .. }));
    }

    #[test]
    fn test_init_visible_to_later_phases() {
        let engine = TemplateEngine::new();
        let mut data = TemplateData::new("id", "web");
        let init = engine
            .render_and_decode(Some("region: eu-west\n"), &data)
            .unwrap()
            .unwrap();
        data.init = init;
        let out = engine
            .render("bucket-{{ Init.region }}", &data)
            .unwrap();
        assert_eq!(out, "bucket-eu-west");
    }

    #[test]
    fn test_manifest_blank_is_empty() {
        let engine = TemplateEngine::new();
        let data = TemplateData::new("id", "web");
        assert_eq!(engine.render_manifest(None, &data).unwrap(), "");
        assert_eq!(engine.render_manifest(Some("  "), &data).unwrap(), "");
    }

    #[test]
    fn test_manifest_is_trimmed() {
        let engine = TemplateEngine::new();
        let data = TemplateData::new("id", "web");
        let out = engine
            .render_manifest(Some("\nresource {{ WorkloadName }} {}\n\n"), &data)
            .unwrap();
        assert_eq!(out, "resource web {}");
    }
}
