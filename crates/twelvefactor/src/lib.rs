//! twelvefactor: the platform-agnostic deployment model.
//!
//! Describes an app as a [`Manifest`] of named [`Process`]es and exposes the
//! [`Scheduler`] contract that orchestration backends implement. Backends
//! translate manifests into their own resource model (services, tasks,
//! clusters) and report running [`Task`]s back in these terms.
//!
//! # Architecture
//!
//! ```text
//! caller
//!   └── dyn Scheduler
//!         ├── up(Manifest)          converge all processes
//!         ├── scale_process(..)     change one process's desired count
//!         ├── tasks(app)            observe running instances
//!         ├── restart(app)          replace instances in place
//!         └── remove(app)           tear everything down
//! ```

pub mod error;
pub mod manifest;
pub mod scheduler;
pub mod types;

pub use error::{BoxError, SchedulerError, SchedulerResult};
pub use manifest::{App, Manifest, Process};
pub use scheduler::Scheduler;
pub use types::*;
