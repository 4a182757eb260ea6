//! # weft_spec
//!
//! Workload specification model and placeholder substitution for weft.
//!
//! A workload spec declares containers, an optional service with named ports,
//! and abstract resource dependencies. String values in specs may contain
//! `${...}` references to workload metadata or other resources' outputs;
//! this crate provides the resolution context and substitution routines used
//! by every templating step in the engine.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//! use weft_spec::{read_spec_file, substitute_string, SubstitutionContext};
//!
//! let spec = read_spec_file("weft.yaml").unwrap();
//! let ctx = SubstitutionContext::new(spec.metadata.clone(), BTreeMap::new());
//! let resolved = substitute_string("app-${metadata.name}", &ctx).unwrap();
//! ```

pub mod error;
pub mod models;
pub mod reader;
pub mod substitution;

pub use error::{SpecError, SpecResult};
pub use models::{
    Container, ContainerFile, ExecProbe, HttpGetProbe, Probe, ResourceSpec, Service, ServicePort,
    WorkloadSpec,
};
pub use reader::read_spec_file;
pub use substitution::{
    find_references, substitute_string, substitute_value, SubstitutionContext,
};
