//! # weft_convert
//!
//! Workload substitution and Bicep manifest rendering for weft.
//!
//! Conversion is two steps: `substitute_workload` resolves every `${...}`
//! reference in a workload's containers against metadata and resource
//! outputs, then `render_document`/`render_workload` turn the substituted
//! spec into the platform's container resource blocks. Rendering is a pure
//! function; substitution is the only step that touches state or disk.
//!
//! ## Example
//!
//! ```rust,no_run
//! use weft_convert::{render_document, substitute_workload};
//! use weft_state::StateDirectory;
//!
//! let dir = StateDirectory::load(".").unwrap().expect("run init first");
//! let state = dir.state.with_primed_resources().unwrap();
//! let mut workloads = Vec::new();
//! for name in state.workloads.keys() {
//!     workloads.push((name.clone(), substitute_workload(&state, name).unwrap()));
//! }
//! let document = render_document(&workloads).unwrap();
//! ```

pub mod bicep;
pub mod error;
pub mod substitute;

pub use bicep::{render_document, render_workload};
pub use error::{ConvertError, ConvertResult};
pub use substitute::substitute_workload;
