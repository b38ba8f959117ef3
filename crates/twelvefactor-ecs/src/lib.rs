//! twelvefactor-ecs: run twelvefactor apps on Amazon ECS.
//!
//! Maps each process of a [`Manifest`](twelvefactor::Manifest) to one ECS
//! service. The [`EcsScheduler`]:
//!
//! - Delegates convergence, removal, and restarts to a [`StackBuilder`]
//! - Scales a process by updating its service's desired count
//! - Reports tasks by listing and describing them per service
//!
//! # Architecture
//!
//! ```text
//! EcsScheduler (cluster)
//!   ├── StackBuilder (manifest → services, app → {process: service})
//!   └── EcsClient    (UpdateService, ListTasks, DescribeTasks)
//! ```
//!
//! [`memory::MemoryBackend`] implements both collaborators in process.

pub mod api;
pub mod arn;
pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod scheduler;

pub use client::{EcsClient, StackBuilder};
pub use config::EcsConfig;
pub use error::BackendError;
pub use memory::MemoryBackend;
pub use scheduler::EcsScheduler;
