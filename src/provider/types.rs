//! # Remote Types
//!
//! Request and response shapes at the Kinesis Analytics v2 API boundary.
//! Nested configuration descriptions reuse the declared-state structs from
//! [`crate::model`], with computed ids filled in.

use crate::model::{
    ApplicationCodeConfiguration, ApplicationConfiguration, ApplicationMode,
    ApplicationRestoreConfiguration, ApplicationSnapshotConfiguration, ApplicationStatus,
    CloudWatchLoggingOption, EnvironmentProperties, FlinkApplicationConfiguration,
    FlinkRunConfiguration, Input, InputParallelism, InputProcessingConfiguration,
    InputStartingPosition, OperationStatus, Output, ReferenceDataSource, ResourceArn,
    RuntimeEnvironment, SnapshotStatus, SourceSchema, VpcConfiguration,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// `DescribeApplication` result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDetail {
    pub application_arn: String,
    pub application_name: String,
    pub application_description: Option<String>,
    pub runtime_environment: RuntimeEnvironment,
    pub service_execution_role: Option<String>,
    pub application_status: ApplicationStatus,
    pub application_version_id: i64,
    pub application_mode: Option<ApplicationMode>,
    pub create_timestamp: Option<DateTime<Utc>>,
    pub last_update_timestamp: Option<DateTime<Utc>>,
    pub application_configuration: Option<ApplicationConfiguration>,
    pub cloudwatch_logging_options: Vec<CloudWatchLoggingOption>,
    pub maintenance_configuration: Option<MaintenanceConfigurationDescription>,
}

impl ApplicationDetail {
    /// First SQL input, if any
    #[must_use]
    pub fn sql_input(&self) -> Option<&Input> {
        self.application_configuration
            .as_ref()
            .and_then(|c| c.sql_application_configuration.as_ref())
            .and_then(|s| s.input.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceConfigurationDescription {
    /// `HH:MM`
    pub application_maintenance_window_start_time: String,
    /// `HH:MM`
    pub application_maintenance_window_end_time: String,
}

/// `CreateApplication` request
///
/// VPC configuration is not accepted at create time and is added afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateApplicationRequest {
    pub application_name: String,
    pub application_description: Option<String>,
    pub runtime_environment: RuntimeEnvironment,
    pub service_execution_role: String,
    pub application_mode: Option<ApplicationMode>,
    pub application_configuration: Option<ApplicationConfiguration>,
    /// Log stream ARNs
    pub cloudwatch_logging_options: Vec<String>,
    pub tags: BTreeMap<String, String>,
}

/// `StartApplication` run configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartRunConfiguration {
    pub application_restore_configuration: Option<ApplicationRestoreConfiguration>,
    pub flink_run_configuration: Option<FlinkRunConfiguration>,
    pub sql_run_configurations: Vec<SqlRunConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlRunConfiguration {
    pub input_id: String,
    pub input_starting_position: Option<InputStartingPosition>,
}

/// Result of a versioned update call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOutput {
    /// Version after the call, when reported
    pub application_version_id: Option<i64>,
    /// Asynchronous operation to track, when the call started one
    pub operation_id: Option<String>,
}

/// `DescribeApplicationOperation` result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDetail {
    pub operation_id: String,
    pub operation: Option<String>,
    pub status: OperationStatus,
    pub failure_message: Option<String>,
}

/// `DescribeApplicationSnapshot` result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDetail {
    pub snapshot_name: String,
    pub snapshot_status: SnapshotStatus,
    pub application_version_id: i64,
    pub snapshot_creation_timestamp: Option<DateTime<Utc>>,
}

/// Replacement values for an existing SQL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputUpdate {
    pub input_id: String,
    pub name_prefix: Option<String>,
    pub input_schema: Option<SourceSchema>,
    pub input_parallelism: Option<InputParallelism>,
    pub kinesis_firehose_input: Option<ResourceArn>,
    pub kinesis_streams_input: Option<ResourceArn>,
    /// Replacement for an existing processor; adding and removing one are
    /// separate calls
    pub input_processing_configuration: Option<InputProcessingConfiguration>,
}

/// One discrete, versioned configuration change
///
/// The remote API has no whole-object update: every variant is sent as its own
/// `UpdateApplication` (or `Add*`/`Delete*`) call carrying the current version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationUpdate {
    Code(ApplicationCodeConfiguration),
    SnapshotConfiguration(ApplicationSnapshotConfiguration),
    /// The complete resulting list; empty clears all groups
    EnvironmentProperties(EnvironmentProperties),
    Flink(FlinkApplicationConfiguration),
    AddInput(Input),
    UpdateInput(InputUpdate),
    AddInputProcessingConfiguration {
        input_id: String,
        configuration: InputProcessingConfiguration,
    },
    DeleteInputProcessingConfiguration {
        input_id: String,
    },
    AddOutput(Output),
    DeleteOutput {
        output_id: String,
    },
    AddReferenceDataSource(ReferenceDataSource),
    UpdateReferenceDataSource {
        reference_id: String,
        source: ReferenceDataSource,
    },
    DeleteReferenceDataSource {
        reference_id: String,
    },
    AddVpcConfiguration(VpcConfiguration),
    UpdateVpcConfiguration {
        vpc_configuration_id: String,
        configuration: VpcConfiguration,
    },
    DeleteVpcConfiguration {
        vpc_configuration_id: String,
    },
    /// Only accepted while the application is running
    RunConfiguration(StartRunConfiguration),
    AddCloudWatchLoggingOption {
        log_stream_arn: String,
    },
    UpdateCloudWatchLoggingOption {
        cloudwatch_logging_option_id: String,
        log_stream_arn: String,
    },
    DeleteCloudWatchLoggingOption {
        cloudwatch_logging_option_id: String,
    },
    ServiceExecutionRole(String),
}

impl ApplicationUpdate {
    /// Remote operation name, for logs and metrics
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Code(_)
            | Self::SnapshotConfiguration(_)
            | Self::EnvironmentProperties(_)
            | Self::Flink(_)
            | Self::UpdateInput(_)
            | Self::UpdateReferenceDataSource { .. }
            | Self::RunConfiguration(_)
            | Self::UpdateCloudWatchLoggingOption { .. }
            | Self::ServiceExecutionRole(_) => "UpdateApplication",
            Self::AddInput(_) => "AddApplicationInput",
            Self::AddInputProcessingConfiguration { .. } => {
                "AddApplicationInputProcessingConfiguration"
            }
            Self::DeleteInputProcessingConfiguration { .. } => {
                "DeleteApplicationInputProcessingConfiguration"
            }
            Self::AddOutput(_) => "AddApplicationOutput",
            Self::DeleteOutput { .. } => "DeleteApplicationOutput",
            Self::AddReferenceDataSource(_) => "AddApplicationReferenceDataSource",
            Self::DeleteReferenceDataSource { .. } => "DeleteApplicationReferenceDataSource",
            Self::AddVpcConfiguration(_) => "AddApplicationVpcConfiguration",
            Self::UpdateVpcConfiguration { .. } => "UpdateApplication",
            Self::DeleteVpcConfiguration { .. } => "DeleteApplicationVpcConfiguration",
            Self::AddCloudWatchLoggingOption { .. } => "AddApplicationCloudWatchLoggingOption",
            Self::DeleteCloudWatchLoggingOption { .. } => {
                "DeleteApplicationCloudWatchLoggingOption"
            }
        }
    }

    /// Short description of the change, for logs
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Code(_) => "application code configuration",
            Self::SnapshotConfiguration(_) => "snapshot configuration",
            Self::EnvironmentProperties(_) => "environment properties",
            Self::Flink(_) => "Flink application configuration",
            Self::AddInput(_) => "add input",
            Self::UpdateInput(_) => "update input",
            Self::AddInputProcessingConfiguration { .. } => "add input processing configuration",
            Self::DeleteInputProcessingConfiguration { .. } => {
                "delete input processing configuration"
            }
            Self::AddOutput(_) => "add output",
            Self::DeleteOutput { .. } => "delete output",
            Self::AddReferenceDataSource(_) => "add reference data source",
            Self::UpdateReferenceDataSource { .. } => "update reference data source",
            Self::DeleteReferenceDataSource { .. } => "delete reference data source",
            Self::AddVpcConfiguration(_) => "add VPC configuration",
            Self::UpdateVpcConfiguration { .. } => "update VPC configuration",
            Self::DeleteVpcConfiguration { .. } => "delete VPC configuration",
            Self::RunConfiguration(_) => "run configuration",
            Self::AddCloudWatchLoggingOption { .. } => "add CloudWatch logging option",
            Self::UpdateCloudWatchLoggingOption { .. } => "update CloudWatch logging option",
            Self::DeleteCloudWatchLoggingOption { .. } => "delete CloudWatch logging option",
            Self::ServiceExecutionRole(_) => "service execution role",
        }
    }

    /// Whether the call can only be made while the application is RUNNING
    #[must_use]
    pub fn requires_running(&self) -> bool {
        matches!(self, Self::RunConfiguration(_))
    }
}
