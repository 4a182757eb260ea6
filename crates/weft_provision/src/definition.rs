//! Provisioner definitions.

use serde::{Deserialize, Serialize};

/// A provisioner definition as loaded from a provisioners file.
///
/// The init template always runs first; its decoded data is working-set state
/// visible to the outputs and manifests templates, so derived values are
/// computed once instead of duplicated across the later templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provisioner {
    pub uri: String,
    #[serde(rename = "type")]
    pub res_type: String,
    #[serde(default = "default_class")]
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "init", default, skip_serializing_if = "Option::is_none")]
    pub init_template: Option<String>,
    #[serde(rename = "outputs", default, skip_serializing_if = "Option::is_none")]
    pub outputs_template: Option<String>,
    #[serde(rename = "manifests", default, skip_serializing_if = "Option::is_none")]
    pub manifests_template: Option<String>,
    /// Params the provisioner expects to be passed in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
    /// Outputs the provisioner promises to produce.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expected_outputs: Vec<String>,
}

fn default_class() -> String {
    "default".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_minimal_definition() {
        let provisioners: Vec<Provisioner> = serde_yaml::from_str(
            r#"
- uri: default://something
  type: something
  class: default
"#,
        )
        .unwrap();
        assert_eq!(provisioners.len(), 1);
        assert_eq!(provisioners[0].res_type, "something");
        assert!(provisioners[0].init_template.is_none());
    }

    #[test]
    fn test_class_defaults() {
        let provisioners: Vec<Provisioner> = serde_yaml::from_str(
            r#"
- uri: default://postgres
  type: postgres
  outputs: |
    host: pg.{{ WorkloadName }}.svc
"#,
        )
        .unwrap();
        assert_eq!(provisioners[0].class, "default");
        assert!(provisioners[0].outputs_template.is_some());
    }
}
