//! Kinesis Analytics Controller Library
//!
//! Reconciles declared Kinesis Analytics v2 applications, maintenance
//! windows and snapshots against the remote control plane. The remote API
//! is reached only through [`provider::KinesisAnalyticsApi`], injected into
//! each reconciler.

pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod model;
pub mod observability;
pub mod provider;

pub use config::ControllerConfig;
pub use controller::reconciler::{
    ApplicationReconciler, MaintenanceReconciler, OperationContext, ResourceHandler,
    SnapshotReconciler,
};
pub use error::{Diagnostic, Diagnostics, Error, Result};
