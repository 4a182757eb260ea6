//! # weft_provision
//!
//! Provisioner definitions and the resource template pipeline for weft.
//!
//! A provisioner is a (type, class)-keyed definition of three optional
//! handlebars templates. For each resource, in dependency order, the
//! pipeline renders the init template (working-set data), the outputs
//! template (the durable values other resources and workload substitution
//! see), and the manifests template (one raw infrastructure-manifest
//! fragment), then applies the results to a fresh state snapshot.
//!
//! ## Example
//!
//! ```rust,no_run
//! use weft_provision::{load_provisioners, provision, TemplateEngine};
//! use weft_state::StateDirectory;
//!
//! let dir = StateDirectory::load(".").unwrap().expect("run init first");
//! let state = dir.state.with_primed_resources().unwrap();
//! let provisioners = load_provisioners(dir.path()).unwrap();
//! let engine = TemplateEngine::new();
//! let (manifests, new_state) = provision(&state, &provisioners, &engine).unwrap();
//! ```

pub mod definition;
pub mod error;
pub mod loader;
pub mod matcher;
pub mod pipeline;
pub mod template;

pub use definition::Provisioner;
pub use error::{ProvisionError, ProvisionResult};
pub use loader::{load_provisioners, PROVISIONERS_FILE_SUFFIX};
pub use matcher::match_provisioner;
pub use pipeline::provision;
pub use template::{TemplateData, TemplateEngine};
