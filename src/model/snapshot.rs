//! # Snapshot and Maintenance Window
//!
//! Declared state of the two sub-resources that hang off an application.

use super::enums::SnapshotStatus;
use super::validation::{
    validate_application_name, validate_maintenance_start_time, validate_snapshot_name,
};
use crate::controller::identifier::snapshot_create_resource_id;
use crate::error::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A point-in-time snapshot of a Flink application. Every declared field is
/// immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Snapshot {
    pub application_name: String,
    pub snapshot_name: String,

    /// Computed, `<application_name>/<snapshot_name>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_version_id: Option<i64>,

    /// Computed, RFC 3339; required again by delete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_creation_timestamp: Option<String>,

    /// Computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SnapshotStatus>,
}

impl Snapshot {
    #[must_use]
    pub fn new(application_name: impl Into<String>, snapshot_name: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            snapshot_name: snapshot_name.into(),
            id: None,
            application_version_id: None,
            snapshot_creation_timestamp: None,
            status: None,
        }
    }

    #[must_use]
    pub fn resource_id(&self) -> String {
        snapshot_create_resource_id(&self.application_name, &self.snapshot_name)
    }

    /// # Errors
    ///
    /// Returns the first rule violated.
    pub fn validate(&self) -> Result<()> {
        validate_application_name(&self.application_name)?;
        validate_snapshot_name(&self.snapshot_name)
    }
}

/// Weekly maintenance window of an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MaintenanceWindow {
    pub application_name: String,

    /// 24-hour `HH:MM`, UTC
    pub application_maintenance_window_start_time: String,

    /// Computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_maintenance_window_end_time: Option<String>,

    /// Computed once, on first acquisition; restored on delete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_start_time: Option<String>,
}

impl MaintenanceWindow {
    #[must_use]
    pub fn new(application_name: impl Into<String>, start_time: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            application_maintenance_window_start_time: start_time.into(),
            application_maintenance_window_end_time: None,
            original_start_time: None,
        }
    }

    /// # Errors
    ///
    /// Returns the first rule violated.
    pub fn validate(&self) -> Result<()> {
        validate_application_name(&self.application_name)?;
        validate_maintenance_start_time(&self.application_maintenance_window_start_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_resource_id() {
        let snapshot = Snapshot::new("my-app", "nightly");
        assert_eq!(snapshot.resource_id(), "my-app/nightly");
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn test_maintenance_window_validation() {
        assert!(MaintenanceWindow::new("my-app", "03:30").validate().is_ok());
        assert!(MaintenanceWindow::new("my-app", "3:30").validate().is_err());
    }
}
