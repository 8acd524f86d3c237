//! # Model
//!
//! Declared-state shapes exchanged with the host (serde + JSON Schema).
//!
//! - `application`: the Application resource
//! - `configuration`: nested configuration groups
//! - `sql`: SQL input/output/reference data source
//! - `snapshot`: Snapshot and MaintenanceWindow sub-resources
//! - `enums`: closed sets of remote string values
//! - `validation`: format checks

pub mod application;
pub mod configuration;
pub mod enums;
pub mod snapshot;
pub mod sql;
pub mod validation;

pub use application::Application;
pub use configuration::*;
pub use enums::*;
pub use snapshot::{MaintenanceWindow, Snapshot};
pub use sql::*;
