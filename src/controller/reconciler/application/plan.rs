//! # Update Plan
//!
//! Turns (observed, declared) into the ordered list of discrete remote
//! updates. Each configuration group is one row of [`PLANNERS`]: a change
//! predicate and a builder. Rows are visited in table order and every
//! resulting call is executed against a freshly read version.
//!
//! A declared `None` for the code, snapshot, Flink and run configuration
//! groups means "keep whatever the remote has". A declared `None` for
//! environment properties, VPC, reference data source and CloudWatch logging
//! removes the observed value.
//!
//! Inside a declared group, fields the service fills in on its own (input
//! parallelism, CUSTOM Flink sub-group values, run configuration defaults)
//! are compared only when declared. An unset field keeps the remote value.

use crate::error::{Error, Result};
use crate::model::{
    Application, ApplicationConfiguration, ApplicationRestoreConfiguration,
    CheckpointConfiguration, EnvironmentProperties, FlinkApplicationConfiguration,
    FlinkRunConfiguration, Input, InputParallelism, MonitoringConfiguration, Output,
    ParallelismConfiguration, RunConfiguration, SqlApplicationConfiguration,
};
use crate::provider::{ApplicationUpdate, InputUpdate, StartRunConfiguration};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::warn;

/// One independently updatable concern of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigurationGroup {
    Code,
    SnapshotConfiguration,
    EnvironmentProperties,
    Flink,
    SqlInput,
    SqlOutputs,
    SqlReferenceDataSource,
    Vpc,
    RunConfiguration,
    CloudWatchLogging,
    ServiceExecutionRole,
}

impl ConfigurationGroup {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Code => "application_code_configuration",
            Self::SnapshotConfiguration => "application_snapshot_configuration",
            Self::EnvironmentProperties => "environment_properties",
            Self::Flink => "flink_application_configuration",
            Self::SqlInput => "sql_application_configuration.input",
            Self::SqlOutputs => "sql_application_configuration.output",
            Self::SqlReferenceDataSource => "sql_application_configuration.reference_data_source",
            Self::Vpc => "vpc_configuration",
            Self::RunConfiguration => "run_configuration",
            Self::CloudWatchLogging => "cloudwatch_logging_options",
            Self::ServiceExecutionRole => "service_execution_role",
        }
    }
}

impl fmt::Display for ConfigurationGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote update together with the group that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpdate {
    pub group: ConfigurationGroup,
    pub update: ApplicationUpdate,
}

type Changed = fn(&Application, &Application) -> bool;
type Build = fn(&Application, &Application) -> Result<Vec<ApplicationUpdate>>;

/// `(group, changed(observed, declared), build(observed, declared))` in call order
pub const PLANNERS: &[(ConfigurationGroup, Changed, Build)] = &[
    (ConfigurationGroup::Code, code_changed, plan_code),
    (
        ConfigurationGroup::SnapshotConfiguration,
        snapshot_configuration_changed,
        plan_snapshot_configuration,
    ),
    (
        ConfigurationGroup::EnvironmentProperties,
        environment_properties_changed,
        plan_environment_properties,
    ),
    (ConfigurationGroup::Flink, flink_changed, plan_flink),
    (ConfigurationGroup::SqlInput, input_changed, plan_input),
    (ConfigurationGroup::SqlOutputs, outputs_changed, plan_outputs),
    (
        ConfigurationGroup::SqlReferenceDataSource,
        reference_data_source_changed,
        plan_reference_data_source,
    ),
    (ConfigurationGroup::Vpc, vpc_changed, plan_vpc),
    (
        ConfigurationGroup::RunConfiguration,
        run_configuration_changed,
        plan_run_configuration,
    ),
    (
        ConfigurationGroup::CloudWatchLogging,
        cloudwatch_logging_changed,
        plan_cloudwatch_logging,
    ),
    (
        ConfigurationGroup::ServiceExecutionRole,
        service_execution_role_changed,
        plan_service_execution_role,
    ),
];

/// Declared changes that cannot be applied in place
#[must_use]
pub fn replacement_reasons(observed: &Application, declared: &Application) -> Vec<String> {
    let mut reasons = Vec::new();
    if observed.name != declared.name {
        reasons.push(format!("name changed from {:?} to {:?}", observed.name, declared.name));
    }
    if observed.runtime_environment != declared.runtime_environment {
        reasons.push(format!(
            "runtime_environment changed from {} to {}",
            observed.runtime_environment, declared.runtime_environment
        ));
    }
    let description = |a: &Application| a.description.clone().unwrap_or_default();
    if description(observed) != description(declared) {
        reasons.push("description changed".to_string());
    }
    if let (Some(o), Some(d)) = (observed.application_mode, declared.application_mode) {
        if o != d {
            reasons.push(format!("application_mode changed from {o} to {d}"));
        }
    }
    if sql(observed).and_then(|s| s.input.as_ref()).is_some()
        && sql(declared).and_then(|s| s.input.as_ref()).is_none()
    {
        reasons.push("an existing SQL input cannot be removed".to_string());
    }
    reasons
}

/// Ordered remote updates needed to move `observed` to `declared`
///
/// `observed` must carry the computed ids of the current remote state.
///
/// # Errors
///
/// [`Error::RequiresReplacement`] when any declared change cannot be applied
/// in place; no update is planned in that case.
pub fn plan_updates(observed: &Application, declared: &Application) -> Result<Vec<PlannedUpdate>> {
    let reasons = replacement_reasons(observed, declared);
    if !reasons.is_empty() {
        return Err(Error::RequiresReplacement {
            resource: "Kinesis Analytics v2 Application",
            id: observed.name.clone(),
            reason: reasons.join("; "),
        });
    }

    let mut planned = Vec::new();
    for (group, changed, build) in PLANNERS {
        if !changed(observed, declared) {
            continue;
        }
        for update in build(observed, declared)? {
            planned.push(PlannedUpdate {
                group: *group,
                update,
            });
        }
    }
    Ok(planned)
}

fn config(app: &Application) -> Option<&ApplicationConfiguration> {
    app.application_configuration.as_ref()
}

fn sql(app: &Application) -> Option<&SqlApplicationConfiguration> {
    config(app).and_then(|c| c.sql_application_configuration.as_ref())
}

fn missing_id(observed: &Application, what: &str) -> Error {
    Error::UnexpectedState {
        state: format!("{what} without id"),
        expected: format!("{what} id reported for application ({})", observed.name),
        detail: None,
    }
}

// Code

fn code_changed(observed: &Application, declared: &Application) -> bool {
    let declared = config(declared).and_then(|c| c.application_code_configuration.as_ref());
    let observed = config(observed).and_then(|c| c.application_code_configuration.as_ref());
    declared.is_some() && declared != observed
}

fn plan_code(_: &Application, declared: &Application) -> Result<Vec<ApplicationUpdate>> {
    Ok(config(declared)
        .and_then(|c| c.application_code_configuration.clone())
        .map(ApplicationUpdate::Code)
        .into_iter()
        .collect())
}

// Snapshot configuration

fn snapshot_configuration_changed(observed: &Application, declared: &Application) -> bool {
    let declared = config(declared).and_then(|c| c.application_snapshot_configuration.as_ref());
    let observed = config(observed).and_then(|c| c.application_snapshot_configuration.as_ref());
    declared.is_some() && declared != observed
}

fn plan_snapshot_configuration(
    _: &Application,
    declared: &Application,
) -> Result<Vec<ApplicationUpdate>> {
    Ok(config(declared)
        .and_then(|c| c.application_snapshot_configuration.clone())
        .map(ApplicationUpdate::SnapshotConfiguration)
        .into_iter()
        .collect())
}

// Environment properties

/// Group-level delta between two property group lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyGroupChanges {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    pub modified: BTreeSet<String>,
}

impl PropertyGroupChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// Compare property groups by id, ignoring list order
#[must_use]
pub fn property_group_changes(
    observed: Option<&EnvironmentProperties>,
    declared: Option<&EnvironmentProperties>,
) -> PropertyGroupChanges {
    let empty = EnvironmentProperties::default();
    let observed = observed.unwrap_or(&empty).by_id();
    let declared = declared.unwrap_or(&empty).by_id();

    let mut changes = PropertyGroupChanges::default();
    for (id, map) in &declared {
        match observed.get(id) {
            None => {
                changes.added.insert((*id).to_string());
            }
            Some(current) if current != map => {
                changes.modified.insert((*id).to_string());
            }
            Some(_) => {}
        }
    }
    for id in observed.keys() {
        if !declared.contains_key(id) {
            changes.removed.insert((*id).to_string());
        }
    }
    changes
}

fn environment_properties_changed(observed: &Application, declared: &Application) -> bool {
    !property_group_changes(
        config(observed).and_then(|c| c.environment_properties.as_ref()),
        config(declared).and_then(|c| c.environment_properties.as_ref()),
    )
    .is_empty()
}

fn plan_environment_properties(
    _: &Application,
    declared: &Application,
) -> Result<Vec<ApplicationUpdate>> {
    let properties = config(declared)
        .and_then(|c| c.environment_properties.clone())
        .unwrap_or_default();
    Ok(vec![ApplicationUpdate::EnvironmentProperties(properties)])
}

// Flink

/// Observed sub-groups and fields restricted to the ones `declared` sets
fn flink_projection(
    observed: Option<&FlinkApplicationConfiguration>,
    declared: &FlinkApplicationConfiguration,
) -> FlinkApplicationConfiguration {
    let observed = observed.map(FlinkApplicationConfiguration::effective).unwrap_or_default();
    let declared = declared.effective();
    FlinkApplicationConfiguration {
        checkpoint_configuration: declared
            .checkpoint_configuration
            .as_ref()
            .zip(observed.checkpoint_configuration)
            .map(|(d, o)| CheckpointConfiguration {
                configuration_type: o.configuration_type,
                checkpointing_enabled: d.checkpointing_enabled.and(o.checkpointing_enabled),
                checkpoint_interval: d.checkpoint_interval.and(o.checkpoint_interval),
                min_pause_between_checkpoints: d
                    .min_pause_between_checkpoints
                    .and(o.min_pause_between_checkpoints),
            }),
        monitoring_configuration: declared
            .monitoring_configuration
            .as_ref()
            .zip(observed.monitoring_configuration)
            .map(|(d, o)| MonitoringConfiguration {
                configuration_type: o.configuration_type,
                log_level: d.log_level.and(o.log_level),
                metrics_level: d.metrics_level.and(o.metrics_level),
            }),
        parallelism_configuration: declared
            .parallelism_configuration
            .as_ref()
            .zip(observed.parallelism_configuration)
            .map(|(d, o)| ParallelismConfiguration {
                configuration_type: o.configuration_type,
                auto_scaling_enabled: d.auto_scaling_enabled.and(o.auto_scaling_enabled),
                parallelism: d.parallelism.and(o.parallelism),
                parallelism_per_kpu: d.parallelism_per_kpu.and(o.parallelism_per_kpu),
            }),
    }
}

fn flink_changed(observed: &Application, declared: &Application) -> bool {
    let Some(declared) = config(declared).and_then(|c| c.flink_application_configuration.as_ref())
    else {
        return false;
    };
    let observed = config(observed).and_then(|c| c.flink_application_configuration.as_ref());
    declared.effective() != flink_projection(observed, declared)
}

fn plan_flink(_: &Application, declared: &Application) -> Result<Vec<ApplicationUpdate>> {
    Ok(config(declared)
        .and_then(|c| c.flink_application_configuration.as_ref())
        .map(|f| ApplicationUpdate::Flink(f.effective()))
        .into_iter()
        .collect())
}

// SQL input

/// Input fields carried by an input update, as far as `declared` sets them
///
/// Processing and starting position are excluded; parallelism is only
/// compared when declared.
fn input_core(input: &Input, declared: &Input) -> Input {
    Input {
        input_parallelism: declared.input_parallelism.as_ref().map(|d| InputParallelism {
            count: d
                .count
                .and(input.input_parallelism.as_ref().and_then(|p| p.count)),
        }),
        input_processing_configuration: None,
        input_starting_position_configuration: None,
        ..input.definition()
    }
}

fn input_changed(observed: &Application, declared: &Application) -> bool {
    let Some(declared) = sql(declared).and_then(|s| s.input.as_ref()) else {
        return false;
    };
    match sql(observed).and_then(|s| s.input.as_ref()) {
        None => true,
        Some(observed) => {
            input_core(observed, declared) != input_core(declared, declared)
                || observed.input_processing_configuration != declared.input_processing_configuration
        }
    }
}

fn plan_input(observed_app: &Application, declared: &Application) -> Result<Vec<ApplicationUpdate>> {
    let Some(declared) = sql(declared).and_then(|s| s.input.as_ref()) else {
        return Ok(Vec::new());
    };
    let Some(observed) = sql(observed_app).and_then(|s| s.input.as_ref()) else {
        return Ok(vec![ApplicationUpdate::AddInput(declared.definition())]);
    };
    let input_id = observed
        .input_id
        .clone()
        .ok_or_else(|| missing_id(observed_app, "input"))?;

    let mut updates = Vec::new();
    let processing_modified = matches!(
        (&observed.input_processing_configuration, &declared.input_processing_configuration),
        (Some(o), Some(d)) if o != d
    );
    if input_core(observed, declared) != input_core(declared, declared) || processing_modified {
        updates.push(ApplicationUpdate::UpdateInput(InputUpdate {
            input_id: input_id.clone(),
            name_prefix: Some(declared.name_prefix.clone()),
            input_schema: Some(declared.input_schema.clone()),
            input_parallelism: declared.input_parallelism.clone(),
            kinesis_firehose_input: declared.kinesis_firehose_input.clone(),
            kinesis_streams_input: declared.kinesis_streams_input.clone(),
            input_processing_configuration: if processing_modified {
                declared.input_processing_configuration.clone()
            } else {
                None
            },
        }));
    }
    match (&observed.input_processing_configuration, &declared.input_processing_configuration) {
        (None, Some(configuration)) => {
            updates.push(ApplicationUpdate::AddInputProcessingConfiguration {
                input_id,
                configuration: configuration.clone(),
            });
        }
        (Some(_), None) => {
            updates.push(ApplicationUpdate::DeleteInputProcessingConfiguration { input_id });
        }
        _ => {}
    }
    Ok(updates)
}

// SQL outputs

fn output_definitions(app: &Application) -> Vec<Output> {
    sql(app)
        .map(|s| s.outputs.iter().map(Output::definition).collect())
        .unwrap_or_default()
}

fn outputs_changed(observed: &Application, declared: &Application) -> bool {
    let observed = output_definitions(observed);
    let declared = output_definitions(declared);
    observed.iter().any(|o| !declared.contains(o)) || declared.iter().any(|d| !observed.contains(d))
}

/// Set difference on definitions: deletions first, then additions
fn plan_outputs(observed: &Application, declared: &Application) -> Result<Vec<ApplicationUpdate>> {
    let observed_outputs = sql(observed).map(|s| s.outputs.as_slice()).unwrap_or_default();
    let declared_outputs = sql(declared).map(|s| s.outputs.as_slice()).unwrap_or_default();
    let observed_defs = output_definitions(observed);
    let declared_defs = output_definitions(declared);

    let mut deleted_ids = BTreeSet::new();
    let mut updates = Vec::new();
    for output in observed_outputs {
        if declared_defs.contains(&output.definition()) {
            continue;
        }
        match &output.output_id {
            Some(output_id) => {
                deleted_ids.insert(output_id.clone());
                updates.push(ApplicationUpdate::DeleteOutput {
                    output_id: output_id.clone(),
                });
            }
            None => warn!(
                application.name = %observed.name,
                output = %output.name,
                "Skipping deletion of output without an output_id"
            ),
        }
    }
    for output in declared_outputs {
        if observed_defs.contains(&output.definition()) {
            continue;
        }
        match &output.output_id {
            Some(output_id) if !deleted_ids.contains(output_id) => warn!(
                application.name = %observed.name,
                output = %output.name,
                output_id = %output_id,
                "Skipping addition of output that already carries an output_id"
            ),
            _ => updates.push(ApplicationUpdate::AddOutput(output.definition())),
        }
    }
    Ok(updates)
}

// SQL reference data source

fn reference_data_source_changed(observed: &Application, declared: &Application) -> bool {
    let definition = |a: &Application| {
        sql(a)
            .and_then(|s| s.reference_data_source.as_ref())
            .map(|r| r.definition())
    };
    definition(observed) != definition(declared)
}

fn plan_reference_data_source(
    observed_app: &Application,
    declared: &Application,
) -> Result<Vec<ApplicationUpdate>> {
    let observed = sql(observed_app).and_then(|s| s.reference_data_source.as_ref());
    let declared = sql(declared).and_then(|s| s.reference_data_source.as_ref());
    let update = match (observed, declared) {
        (None, Some(d)) => ApplicationUpdate::AddReferenceDataSource(d.definition()),
        (Some(o), None) => ApplicationUpdate::DeleteReferenceDataSource {
            reference_id: o
                .reference_id
                .clone()
                .ok_or_else(|| missing_id(observed_app, "reference data source"))?,
        },
        (Some(o), Some(d)) => ApplicationUpdate::UpdateReferenceDataSource {
            reference_id: o
                .reference_id
                .clone()
                .ok_or_else(|| missing_id(observed_app, "reference data source"))?,
            source: d.definition(),
        },
        (None, None) => return Ok(Vec::new()),
    };
    Ok(vec![update])
}

// VPC

fn vpc_changed(observed: &Application, declared: &Application) -> bool {
    let definition = |a: &Application| {
        config(a)
            .and_then(|c| c.vpc_configuration.as_ref())
            .map(|v| v.definition())
    };
    definition(observed) != definition(declared)
}

fn plan_vpc(observed_app: &Application, declared: &Application) -> Result<Vec<ApplicationUpdate>> {
    let observed = config(observed_app).and_then(|c| c.vpc_configuration.as_ref());
    let declared = config(declared).and_then(|c| c.vpc_configuration.as_ref());
    let vpc_id = |o: &crate::model::VpcConfiguration| {
        o.vpc_configuration_id
            .clone()
            .ok_or_else(|| missing_id(observed_app, "VPC configuration"))
    };
    let update = match (observed, declared) {
        (None, Some(d)) => ApplicationUpdate::AddVpcConfiguration(d.definition()),
        (Some(o), None) => ApplicationUpdate::DeleteVpcConfiguration {
            vpc_configuration_id: vpc_id(o)?,
        },
        (Some(o), Some(d)) => ApplicationUpdate::UpdateVpcConfiguration {
            vpc_configuration_id: vpc_id(o)?,
            configuration: d.definition(),
        },
        (None, None) => return Ok(Vec::new()),
    };
    Ok(vec![update])
}

// Run configuration

/// Observed run configuration restricted to the fields `declared` sets
fn run_configuration_projection(
    observed: Option<&RunConfiguration>,
    declared: &RunConfiguration,
) -> RunConfiguration {
    let restore = observed.and_then(|o| o.application_restore_configuration.as_ref());
    let flink = observed.and_then(|o| o.flink_run_configuration.as_ref());
    RunConfiguration {
        application_restore_configuration: declared.application_restore_configuration.as_ref().map(
            |d| ApplicationRestoreConfiguration {
                application_restore_type: d
                    .application_restore_type
                    .and(restore.and_then(|r| r.application_restore_type)),
                snapshot_name: d
                    .snapshot_name
                    .as_ref()
                    .and(restore.and_then(|r| r.snapshot_name.clone())),
            },
        ),
        flink_run_configuration: declared.flink_run_configuration.as_ref().map(|d| {
            FlinkRunConfiguration {
                allow_non_restored_state: d
                    .allow_non_restored_state
                    .and(flink.and_then(|f| f.allow_non_restored_state)),
            }
        }),
    }
}

fn run_configuration_changed(observed: &Application, declared: &Application) -> bool {
    let Some(declared) = config(declared).and_then(|c| c.run_configuration.as_ref()) else {
        return false;
    };
    let observed = config(observed).and_then(|c| c.run_configuration.as_ref());
    *declared != run_configuration_projection(observed, declared)
}

fn plan_run_configuration(
    _: &Application,
    declared: &Application,
) -> Result<Vec<ApplicationUpdate>> {
    Ok(config(declared)
        .and_then(|c| c.run_configuration.as_ref())
        .map(|r| {
            ApplicationUpdate::RunConfiguration(StartRunConfiguration {
                application_restore_configuration: r.application_restore_configuration.clone(),
                flink_run_configuration: r.flink_run_configuration.clone(),
                sql_run_configurations: Vec::new(),
            })
        })
        .into_iter()
        .collect())
}

// CloudWatch logging

fn cloudwatch_logging_changed(observed: &Application, declared: &Application) -> bool {
    let arn = |a: &Application| {
        a.cloudwatch_logging_options
            .as_ref()
            .map(|o| o.log_stream_arn.clone())
    };
    arn(observed) != arn(declared)
}

fn plan_cloudwatch_logging(
    observed_app: &Application,
    declared: &Application,
) -> Result<Vec<ApplicationUpdate>> {
    let option_id = |a: &Application| {
        a.cloudwatch_logging_options
            .as_ref()
            .and_then(|o| o.cloudwatch_logging_option_id.clone())
            .ok_or_else(|| missing_id(a, "CloudWatch logging option"))
    };
    let update = match (
        &observed_app.cloudwatch_logging_options,
        &declared.cloudwatch_logging_options,
    ) {
        (None, Some(d)) => ApplicationUpdate::AddCloudWatchLoggingOption {
            log_stream_arn: d.log_stream_arn.clone(),
        },
        (Some(_), None) => ApplicationUpdate::DeleteCloudWatchLoggingOption {
            cloudwatch_logging_option_id: option_id(observed_app)?,
        },
        (Some(_), Some(d)) => ApplicationUpdate::UpdateCloudWatchLoggingOption {
            cloudwatch_logging_option_id: option_id(observed_app)?,
            log_stream_arn: d.log_stream_arn.clone(),
        },
        (None, None) => return Ok(Vec::new()),
    };
    Ok(vec![update])
}

// Service execution role

fn service_execution_role_changed(observed: &Application, declared: &Application) -> bool {
    observed.service_execution_role != declared.service_execution_role
}

fn plan_service_execution_role(
    _: &Application,
    declared: &Application,
) -> Result<Vec<ApplicationUpdate>> {
    Ok(vec![ApplicationUpdate::ServiceExecutionRole(
        declared.service_execution_role.clone(),
    )])
}

/// Tag delta; applied outside the versioned update sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagChanges {
    /// New and changed keys
    pub to_set: BTreeMap<String, String>,
    pub to_remove: Vec<String>,
}

#[must_use]
pub fn diff_tags(
    observed: &BTreeMap<String, String>,
    declared: &BTreeMap<String, String>,
) -> TagChanges {
    TagChanges {
        to_set: declared
            .iter()
            .filter(|(k, v)| observed.get(*k) != Some(*v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        to_remove: observed
            .keys()
            .filter(|k| !declared.contains_key(*k))
            .cloned()
            .collect(),
    }
}
