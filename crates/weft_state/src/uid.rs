//! Globally unique resource identity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::StateError;

/// Globally unique key for an abstract resource.
///
/// The canonical form is `type.class#id`. With an explicit id the key is the
/// same for every workload that declares it, so those declarations denote one
/// shared resource and it is provisioned once. Without an explicit id the id
/// segment is `workload.resource_name`, scoping the resource to its workload.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceUid {
    res_type: String,
    class: String,
    id: String,
}

impl ResourceUid {
    /// Derive the uid for a resource declared by a workload.
    pub fn new(
        workload: &str,
        res_name: &str,
        res_type: &str,
        class: Option<&str>,
        id: Option<&str>,
    ) -> Self {
        let id = match id {
            Some(id) => id.to_string(),
            None => format!("{workload}.{res_name}"),
        };
        Self {
            res_type: res_type.to_string(),
            class: class.unwrap_or("default").to_string(),
            id,
        }
    }

    pub fn res_type(&self) -> &str {
        &self.res_type
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ResourceUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}#{}", self.res_type, self.class, self.id)
    }
}

impl FromStr for ResourceUid {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (type_class, id) = s
            .split_once('#')
            .ok_or_else(|| StateError::InvalidUid(s.to_string()))?;
        let (res_type, class) = type_class
            .rsplit_once('.')
            .ok_or_else(|| StateError::InvalidUid(s.to_string()))?;
        if res_type.is_empty() || class.is_empty() || id.is_empty() {
            return Err(StateError::InvalidUid(s.to_string()));
        }
        Ok(Self {
            res_type: res_type.to_string(),
            class: class.to_string(),
            id: id.to_string(),
        })
    }
}

impl Serialize for ResourceUid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceUid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workload_scoped_uid() {
        let uid = ResourceUid::new("web", "db", "postgres", None, None);
        assert_eq!(uid.to_string(), "postgres.default#web.db");
        assert_eq!(uid.res_type(), "postgres");
        assert_eq!(uid.class(), "default");
    }

    #[test]
    fn test_shared_uid_collapses_across_workloads() {
        let a = ResourceUid::new("web", "queue", "rabbitmq", Some("large"), Some("shared-bus"));
        let b = ResourceUid::new("worker", "bus", "rabbitmq", Some("large"), Some("shared-bus"));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "rabbitmq.large#shared-bus");
    }

    #[test]
    fn test_round_trip() {
        let uid = ResourceUid::new("web", "db", "postgres", Some("small"), None);
        let parsed: ResourceUid = uid.to_string().parse().unwrap();
        assert_eq!(parsed, uid);
    }

    #[test]
    fn test_invalid_uid() {
        assert!("nonsense".parse::<ResourceUid>().is_err());
        assert!("missing-class#id".parse::<ResourceUid>().is_err());
    }
}
