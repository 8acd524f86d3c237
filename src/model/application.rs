//! # Application
//!
//! Declared state of a Kinesis Analytics v2 application as exchanged with the
//! host. `start_application` and `force_stop` are declarative only and are
//! never read back from the remote.

use super::configuration::{ApplicationConfiguration, CloudWatchLoggingOption};
use super::enums::{ApplicationMode, ApplicationStatus, RuntimeEnvironment};
use super::validation::{
    validate_application_name, validate_description, validate_length, validate_property_group_id,
    validate_snapshot_name, validate_sql_identifier,
};
use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Application {
    /// Immutable; changing it replaces the application
    pub name: String,

    pub runtime_environment: RuntimeEnvironment,

    pub service_execution_role: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Defaults to `STREAMING` on the remote; create-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_mode: Option<ApplicationMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_configuration: Option<ApplicationConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudwatch_logging_options: Option<CloudWatchLoggingOption>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    #[serde(default)]
    pub start_application: bool,

    #[serde(default)]
    pub force_stop: bool,

    /// Computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,

    /// Computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,

    /// Computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<i64>,

    /// Computed, RFC 3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_timestamp: Option<String>,

    /// Computed, RFC 3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_timestamp: Option<String>,
}

impl Application {
    /// Minimal declaration; everything optional left unset
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        runtime_environment: RuntimeEnvironment,
        service_execution_role: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            runtime_environment,
            service_execution_role: service_execution_role.into(),
            description: None,
            application_mode: None,
            application_configuration: None,
            cloudwatch_logging_options: None,
            tags: BTreeMap::new(),
            start_application: false,
            force_stop: false,
            arn: None,
            status: None,
            version_id: None,
            create_timestamp: None,
            last_update_timestamp: None,
        }
    }

    /// Nested configuration, or an empty one
    #[must_use]
    pub fn configuration(&self) -> ApplicationConfiguration {
        self.application_configuration.clone().unwrap_or_default()
    }

    /// Check declared values before any remote call
    ///
    /// # Errors
    ///
    /// Returns the first rule violated.
    pub fn validate(&self) -> Result<()> {
        validate_application_name(&self.name)?;
        validate_length("service_execution_role", &self.service_execution_role, 1, 2048)?;
        if let Some(description) = &self.description {
            validate_description(description)?;
        }

        let Some(config) = &self.application_configuration else {
            return Ok(());
        };

        if let Some(env) = &config.environment_properties {
            let mut seen = BTreeSet::new();
            for group in &env.property_groups {
                validate_property_group_id(&group.property_group_id)?;
                if !seen.insert(group.property_group_id.as_str()) {
                    return Err(Error::validation(format!(
                        "property_group_id: duplicate property group {:?}",
                        group.property_group_id
                    )));
                }
            }
        }

        if let Some(restore) = config
            .run_configuration
            .as_ref()
            .and_then(|r| r.application_restore_configuration.as_ref())
        {
            if let Some(snapshot_name) = &restore.snapshot_name {
                validate_snapshot_name(snapshot_name)?;
            }
        }

        if let Some(sql) = &config.sql_application_configuration {
            if self.runtime_environment.is_flink() {
                return Err(Error::validation(format!(
                    "sql_application_configuration is only supported with runtime {}",
                    RuntimeEnvironment::Sql10
                )));
            }
            if let Some(input) = &sql.input {
                validate_sql_identifier("input.name_prefix", &input.name_prefix, 32)?;
                for column in &input.input_schema.record_columns {
                    validate_sql_identifier("record_column.name", &column.name, 256)?;
                }
            }
            let mut names = BTreeSet::new();
            for output in &sql.outputs {
                validate_sql_identifier("output.name", &output.name, 32)?;
                if !names.insert(output.name.as_str()) {
                    return Err(Error::validation(format!(
                        "output.name: duplicate output {:?}",
                        output.name
                    )));
                }
            }
            if let Some(reference) = &sql.reference_data_source {
                validate_length("reference_data_source.table_name", &reference.table_name, 1, 32)?;
                for column in &reference.reference_schema.record_columns {
                    validate_sql_identifier("record_column.name", &column.name, 256)?;
                }
            }
        }

        if config.flink_application_configuration.is_some() && self.runtime_environment.is_sql() {
            return Err(Error::validation(format!(
                "flink_application_configuration is not supported with runtime {}",
                self.runtime_environment
            )));
        }

        Ok(())
    }
}
