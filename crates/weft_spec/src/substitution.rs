//! Placeholder substitution over workload metadata and resource outputs.
//!
//! References are `${...}` dot paths rooted at `metadata` or
//! `resources.<name>`. `$$` escapes a literal dollar sign.

use std::collections::BTreeMap;

use serde_yaml::Value;

use crate::error::{SpecError, SpecResult};

/// Resolution context for `${...}` references: workload metadata plus the
/// outputs of every resource declared by the workload, keyed by resource name.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionContext {
    metadata: BTreeMap<String, Value>,
    resource_outputs: BTreeMap<String, BTreeMap<String, Value>>,
}

impl SubstitutionContext {
    /// Create a new substitution context.
    pub fn new(
        metadata: BTreeMap<String, Value>,
        resource_outputs: BTreeMap<String, BTreeMap<String, Value>>,
    ) -> Self {
        Self {
            metadata,
            resource_outputs,
        }
    }

    /// Resolve a single dotted reference to its string form.
    pub fn resolve(&self, reference: &str) -> SpecResult<String> {
        let mut parts = reference.split('.');
        let value = match parts.next() {
            Some("metadata") => {
                let key = parts
                    .next()
                    .ok_or_else(|| SpecError::UnresolvedReference(reference.to_string()))?;
                let root = self
                    .metadata
                    .get(key)
                    .ok_or_else(|| SpecError::UnresolvedReference(reference.to_string()))?;
                walk_path(root, parts, reference)?
            }
            Some("resources") => {
                let name = parts
                    .next()
                    .ok_or_else(|| SpecError::UnresolvedReference(reference.to_string()))?;
                let outputs = self
                    .resource_outputs
                    .get(name)
                    .ok_or_else(|| SpecError::UnresolvedReference(reference.to_string()))?;
                let key = parts
                    .next()
                    .ok_or_else(|| SpecError::UnsubstitutableReference(reference.to_string()))?;
                let root = outputs
                    .get(key)
                    .ok_or_else(|| SpecError::UnresolvedReference(reference.to_string()))?;
                walk_path(root, parts, reference)?
            }
            _ => return Err(SpecError::UnresolvedReference(reference.to_string())),
        };
        scalar_to_string(value, reference)
    }
}

/// Walk remaining dot-path segments through nested mappings.
fn walk_path<'a, I>(root: &'a Value, parts: I, reference: &str) -> SpecResult<&'a Value>
where
    I: Iterator<Item = &'a str>,
{
    let mut current = root;
    for part in parts {
        let mapping = current
            .as_mapping()
            .ok_or_else(|| SpecError::UnresolvedReference(reference.to_string()))?;
        current = mapping
            .iter()
            .find(|(k, _)| k.as_str() == Some(part))
            .map(|(_, v)| v)
            .ok_or_else(|| SpecError::UnresolvedReference(reference.to_string()))?;
    }
    Ok(current)
}

fn scalar_to_string(value: &Value, reference: &str) -> SpecResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(SpecError::UnsubstitutableReference(reference.to_string())),
    }
}

/// Substitute every `${...}` reference in a string against the context.
pub fn substitute_string(input: &str, ctx: &SubstitutionContext) -> SpecResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                out.push('$');
            }
            Some('{') => {
                chars.next();
                let mut reference = String::new();
                let mut closed = false;
                for rc in chars.by_ref() {
                    if rc == '}' {
                        closed = true;
                        break;
                    }
                    reference.push(rc);
                }
                if !closed {
                    return Err(SpecError::UnterminatedReference(reference));
                }
                out.push_str(&ctx.resolve(reference.trim())?);
            }
            _ => out.push('$'),
        }
    }
    Ok(out)
}

/// Substitute every string scalar in a YAML value tree.
pub fn substitute_value(value: Value, ctx: &SubstitutionContext) -> SpecResult<Value> {
    Ok(match value {
        Value::String(s) => Value::String(substitute_string(&s, ctx)?),
        Value::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .map(|item| substitute_value(item, ctx))
                .collect::<SpecResult<_>>()?,
        ),
        Value::Mapping(mapping) => Value::Mapping(
            mapping
                .into_iter()
                .map(|(k, v)| Ok((k, substitute_value(v, ctx)?)))
                .collect::<SpecResult<_>>()?,
        ),
        other => other,
    })
}

/// Collect the dot-path references contained in a string, skipping escaped
/// `$$` sequences. Shared with the dependency resolver, which needs the
/// `resources.<name>` references of raw params before substitution can run.
pub fn find_references(input: &str) -> Vec<String> {
    let mut refs = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
            }
            Some('{') => {
                chars.next();
                let mut reference = String::new();
                let mut closed = false;
                for rc in chars.by_ref() {
                    if rc == '}' {
                        closed = true;
                        break;
                    }
                    reference.push(rc);
                }
                if closed {
                    refs.push(reference.trim().to_string());
                }
            }
            _ => {}
        }
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_context() -> SubstitutionContext {
        let mut metadata = BTreeMap::new();
        metadata.insert("name".to_string(), Value::String("example".to_string()));
        let mut db_outputs = BTreeMap::new();
        db_outputs.insert("host".to_string(), Value::String("db.local".to_string()));
        db_outputs.insert("port".to_string(), Value::Number(5432.into()));
        let mut outputs = BTreeMap::new();
        outputs.insert("db".to_string(), db_outputs);
        SubstitutionContext::new(metadata, outputs)
    }

    #[test]
    fn test_substitute_metadata() {
        let ctx = test_context();
        let out = substitute_string("app-${metadata.name}", &ctx).unwrap();
        assert_eq!(out, "app-example");
    }

    #[test]
    fn test_substitute_resource_outputs() {
        let ctx = test_context();
        let out = substitute_string("${resources.db.host}:${resources.db.port}", &ctx).unwrap();
        assert_eq!(out, "db.local:5432");
    }

    #[test]
    fn test_escaped_dollar() {
        let ctx = test_context();
        let out = substitute_string("cost: $$5 for ${metadata.name}", &ctx).unwrap();
        assert_eq!(out, "cost: $5 for example");
    }

    #[test]
    fn test_unresolved_reference() {
        let ctx = test_context();
        let err = substitute_string("${resources.cache.host}", &ctx).unwrap_err();
        assert!(matches!(err, SpecError::UnresolvedReference(r) if r == "resources.cache.host"));
    }

    #[test]
    fn test_unterminated_reference() {
        let ctx = test_context();
        let err = substitute_string("${metadata.name", &ctx).unwrap_err();
        assert!(matches!(err, SpecError::UnterminatedReference(_)));
    }

    #[test]
    fn test_substitute_value_recurses() {
        let ctx = test_context();
        let value: Value = serde_yaml::from_str(
            r#"
host: ${resources.db.host}
nested:
  - ${metadata.name}
  - literal
"#,
        )
        .unwrap();
        let out = substitute_value(value, &ctx).unwrap();
        let out: BTreeMap<String, Value> = serde_yaml::from_value(out).unwrap();
        assert_eq!(out["host"], Value::String("db.local".to_string()));
    }

    #[test]
    fn test_find_references_skips_escapes() {
        let refs = find_references("$${not.a.ref} ${resources.db.host} ${metadata.name}");
        assert_eq!(refs, vec!["resources.db.host", "metadata.name"]);
    }
}
