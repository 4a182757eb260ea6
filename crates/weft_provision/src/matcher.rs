//! Provisioner matching.

use weft_state::ResourceUid;

use crate::definition::Provisioner;
use crate::error::{ProvisionError, ProvisionResult};

/// Find the provisioner handling a resource's (type, class) pair.
///
/// Matching is exact on both fields and takes the first hit in registration
/// order; the loader guarantees registrations are free of duplicates.
pub fn match_provisioner<'a>(
    provisioners: &'a [Provisioner],
    uid: &ResourceUid,
) -> ProvisionResult<&'a Provisioner> {
    provisioners
        .iter()
        .find(|p| p.res_type == uid.res_type() && p.class == uid.class())
        .ok_or_else(|| ProvisionError::UnsupportedResource {
            uid: uid.to_string(),
            res_type: uid.res_type().to_string(),
            class: uid.class().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provisioner(res_type: &str, class: &str, uri: &str) -> Provisioner {
        Provisioner {
            uri: uri.to_string(),
            res_type: res_type.to_string(),
            class: class.to_string(),
            description: None,
            init_template: None,
            outputs_template: None,
            manifests_template: None,
            params: Vec::new(),
            expected_outputs: Vec::new(),
        }
    }

    #[test]
    fn test_exact_match() {
        let registry = vec![
            provisioner("postgres", "default", "default://postgres"),
            provisioner("postgres", "large", "default://postgres-large"),
        ];
        let uid = ResourceUid::new("web", "db", "postgres", Some("large"), None);
        let matched = match_provisioner(&registry, &uid).unwrap();
        assert_eq!(matched.uri, "default://postgres-large");
    }

    #[test]
    fn test_no_partial_match_on_class() {
        let registry = vec![provisioner("postgres", "default", "default://postgres")];
        let uid = ResourceUid::new("web", "db", "postgres", Some("large"), None);
        let err = match_provisioner(&registry, &uid).unwrap_err();
        match err {
            ProvisionError::UnsupportedResource {
                res_type, class, ..
            } => {
                assert_eq!(res_type, "postgres");
                assert_eq!(class, "large");
            }
            other => panic!("expected unsupported resource, got {other}"),
        }
    }

    #[test]
    fn test_first_match_wins() {
        let registry = vec![
            provisioner("thing", "default", "default://first"),
            provisioner("thing", "default", "default://second"),
        ];
        let uid = ResourceUid::new("web", "t", "thing", None, None);
        assert_eq!(match_provisioner(&registry, &uid).unwrap().uri, "default://first");
    }
}
