//! # Reconciler
//!
//! Lifecycle controllers for the three managed resource types. Each exposes
//! inherent `create`/`read`/`update`/`delete`/`import` methods returning
//! [`crate::Error`], and implements [`ResourceHandler`] for the host, which
//! receives [`crate::error::Diagnostics`] instead.
//!
//! - `application`: the application state machine and its update plan
//! - `maintenance`: the application's weekly maintenance window
//! - `snapshot`: application snapshots

pub mod application;
pub mod maintenance;
pub mod snapshot;
pub mod types;

pub use application::ApplicationReconciler;
pub use maintenance::MaintenanceReconciler;
pub use snapshot::SnapshotReconciler;
pub use types::{OperationContext, ResourceHandler};
