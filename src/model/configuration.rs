//! # Application Configuration
//!
//! The nested configuration aggregate. Every group here is updated through
//! its own discrete remote call, so each one is a separate optional field.
//! Fields documented as *computed* are assigned by the control plane and are
//! ignored when comparing declared against observed state.

use super::enums::{
    ApplicationRestoreType, CodeContentType, ConfigurationType, LogLevel, MetricsLevel,
};
use super::sql::SqlApplicationConfiguration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// All nested configuration groups of an application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ApplicationConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_code_configuration: Option<ApplicationCodeConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_snapshot_configuration: Option<ApplicationSnapshotConfiguration>,

    /// Removing this block clears every property group on the remote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_properties: Option<EnvironmentProperties>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flink_application_configuration: Option<FlinkApplicationConfiguration>,

    /// Only sent when the application is started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_configuration: Option<RunConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_application_configuration: Option<SqlApplicationConfiguration>,

    /// Added after create; cannot be part of the create request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc_configuration: Option<VpcConfiguration>,
}

impl ApplicationConfiguration {
    /// Copy with every computed field cleared
    #[must_use]
    pub fn definition(&self) -> Self {
        Self {
            sql_application_configuration: self
                .sql_application_configuration
                .as_ref()
                .map(SqlApplicationConfiguration::definition),
            vpc_configuration: self.vpc_configuration.as_ref().map(VpcConfiguration::definition),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ApplicationCodeConfiguration {
    pub code_content_type: CodeContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_content: Option<CodeContent>,
}

/// Inline text or an S3 object; exactly one is expected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CodeContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_content_location: Option<S3ContentLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct S3ContentLocation {
    pub bucket_arn: String,
    pub file_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ApplicationSnapshotConfiguration {
    pub snapshots_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EnvironmentProperties {
    /// Unordered on the remote; compared by `property_group_id`
    #[serde(default)]
    pub property_groups: Vec<PropertyGroup>,
}

impl EnvironmentProperties {
    /// Property groups keyed by id
    #[must_use]
    pub fn by_id(&self) -> BTreeMap<&str, &BTreeMap<String, String>> {
        self.property_groups
            .iter()
            .map(|g| (g.property_group_id.as_str(), &g.property_map))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PropertyGroup {
    pub property_group_id: String,
    #[serde(default)]
    pub property_map: BTreeMap<String, String>,
}

/// Flink checkpointing, monitoring and parallelism
///
/// Sub-group values other than `configuration_type` only take effect when
/// the sub-group is `CUSTOM`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FlinkApplicationConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint_configuration: Option<CheckpointConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring_configuration: Option<MonitoringConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallelism_configuration: Option<ParallelismConfiguration>,
}

impl FlinkApplicationConfiguration {
    /// Copy in which `DEFAULT` sub-groups carry only their discriminator
    ///
    /// The remote reports the service defaults for `DEFAULT` sub-groups and
    /// rejects explicit values for them, so those values are never compared
    /// or sent.
    #[must_use]
    pub fn effective(&self) -> Self {
        Self {
            checkpoint_configuration: self.checkpoint_configuration.as_ref().map(|c| {
                match c.configuration_type {
                    ConfigurationType::Custom => c.clone(),
                    ConfigurationType::Default => CheckpointConfiguration {
                        configuration_type: ConfigurationType::Default,
                        checkpointing_enabled: None,
                        checkpoint_interval: None,
                        min_pause_between_checkpoints: None,
                    },
                }
            }),
            monitoring_configuration: self.monitoring_configuration.as_ref().map(|c| {
                match c.configuration_type {
                    ConfigurationType::Custom => c.clone(),
                    ConfigurationType::Default => MonitoringConfiguration {
                        configuration_type: ConfigurationType::Default,
                        log_level: None,
                        metrics_level: None,
                    },
                }
            }),
            parallelism_configuration: self.parallelism_configuration.as_ref().map(|c| {
                match c.configuration_type {
                    ConfigurationType::Custom => c.clone(),
                    ConfigurationType::Default => ParallelismConfiguration {
                        configuration_type: ConfigurationType::Default,
                        auto_scaling_enabled: None,
                        parallelism: None,
                        parallelism_per_kpu: None,
                    },
                }
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CheckpointConfiguration {
    pub configuration_type: ConfigurationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpointing_enabled: Option<bool>,
    /// Milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint_interval: Option<i64>,
    /// Milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_pause_between_checkpoints: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MonitoringConfiguration {
    pub configuration_type: ConfigurationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_level: Option<MetricsLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParallelismConfiguration {
    pub configuration_type: ConfigurationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_scaling_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallelism_per_kpu: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_restore_configuration: Option<ApplicationRestoreConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flink_run_configuration: Option<FlinkRunConfiguration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ApplicationRestoreConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_restore_type: Option<ApplicationRestoreType>,
    /// Required with `RESTORE_FROM_CUSTOM_SNAPSHOT`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FlinkRunConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_non_restored_state: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VpcConfiguration {
    #[serde(default)]
    pub subnet_ids: BTreeSet<String>,
    #[serde(default)]
    pub security_group_ids: BTreeSet<String>,
    /// Computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc_configuration_id: Option<String>,
    /// Computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
}

impl VpcConfiguration {
    #[must_use]
    pub fn definition(&self) -> Self {
        Self {
            vpc_configuration_id: None,
            vpc_id: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CloudWatchLoggingOption {
    pub log_stream_arn: String,
    /// Computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudwatch_logging_option_id: Option<String>,
}

impl CloudWatchLoggingOption {
    #[must_use]
    pub fn definition(&self) -> Self {
        Self {
            cloudwatch_logging_option_id: None,
            ..self.clone()
        }
    }
}
