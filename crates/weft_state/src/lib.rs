//! # weft_state
//!
//! State snapshots, resource identity and dependency ordering for weft.
//!
//! The state is a functional snapshot: every operation that changes it
//! returns a new `State`, so a failed generation run leaves the caller's
//! prior state authoritative. Resource identity is the `ResourceUid`,
//! which collapses declarations sharing type+class+explicit-id into one
//! shared resource across workloads.
//!
//! ## Example
//!
//! ```rust,no_run
//! use weft_state::{sorted_resource_uids, State, StateDirectory};
//!
//! let dir = StateDirectory::load(".").unwrap().expect("run init first");
//! let state = dir.state.with_primed_resources().unwrap();
//! for uid in sorted_resource_uids(&state).unwrap() {
//!     println!("{uid}");
//! }
//! ```

pub mod directory;
pub mod error;
pub mod graph;
pub mod state;
pub mod uid;

pub use directory::{StateDirectory, STATE_DIR_NAME, STATE_FILE_NAME};
pub use error::{StateError, StateResult};
pub use graph::sorted_resource_uids;
pub use state::{ResourceState, State, Workload};
pub use uid::ResourceUid;
