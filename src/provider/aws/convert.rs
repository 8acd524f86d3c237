//! Conversions between the SDK shapes and the crate's own types.
//!
//! Outbound conversions can fail when an SDK builder rejects a missing
//! required member; inbound conversions fail when the service reports an enum
//! value this crate does not know.

use crate::error::{RemoteError, RemoteErrorKind};
use crate::model::{self, UnknownVariant};
use crate::provider::{
    ApplicationDetail, ApplicationUpdate, InputUpdate, MaintenanceConfigurationDescription,
    OperationDetail, RemoteResult, SnapshotDetail, StartRunConfiguration,
};
use aws_sdk_kinesisanalyticsv2::error::BuildError;
use aws_sdk_kinesisanalyticsv2::primitives::DateTime as SdkDateTime;
use aws_sdk_kinesisanalyticsv2::types as sdk;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::str::FromStr;

impl From<BuildError> for RemoteError {
    fn from(e: BuildError) -> Self {
        RemoteError::new(RemoteErrorKind::InvalidArgument, e.to_string())
    }
}

fn enum_value<T: FromStr<Err = UnknownVariant>>(value: &str) -> RemoteResult<T> {
    value
        .parse()
        .map_err(|e: UnknownVariant| RemoteError::new(RemoteErrorKind::Service, e.to_string()))
}

fn missing(shape: &str, member: &str) -> RemoteError {
    RemoteError::new(
        RemoteErrorKind::Service,
        format!("{shape} response is missing {member}"),
    )
}

pub(super) fn to_sdk_timestamp(t: DateTime<Utc>) -> SdkDateTime {
    SdkDateTime::from_secs_and_nanos(t.timestamp(), t.timestamp_subsec_nanos())
}

fn from_sdk_timestamp(t: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(t.secs(), t.subsec_nanos())
}

// Outbound

pub(super) fn tag(key: &str, value: &str) -> RemoteResult<sdk::Tag> {
    Ok(sdk::Tag::builder().key(key).value(value).build()?)
}

pub(super) fn cloudwatch_logging_option(log_stream_arn: &str) -> RemoteResult<sdk::CloudWatchLoggingOption> {
    Ok(sdk::CloudWatchLoggingOption::builder()
        .log_stream_arn(log_stream_arn)
        .build()?)
}

pub(super) fn application_configuration(
    c: &model::ApplicationConfiguration,
) -> RemoteResult<sdk::ApplicationConfiguration> {
    Ok(sdk::ApplicationConfiguration::builder()
        .set_application_code_configuration(
            c.application_code_configuration
                .as_ref()
                .map(code_configuration)
                .transpose()?,
        )
        .set_application_snapshot_configuration(
            c.application_snapshot_configuration
                .as_ref()
                .map(|s| {
                    sdk::ApplicationSnapshotConfiguration::builder()
                        .snapshots_enabled(s.snapshots_enabled)
                        .build()
                })
                .transpose()?,
        )
        .set_environment_properties(
            c.environment_properties
                .as_ref()
                .map(environment_properties)
                .transpose()?,
        )
        .set_flink_application_configuration(
            c.flink_application_configuration
                .as_ref()
                .map(flink_configuration)
                .transpose()?,
        )
        .set_sql_application_configuration(
            c.sql_application_configuration
                .as_ref()
                .map(sql_configuration)
                .transpose()?,
        )
        .set_vpc_configurations(
            c.vpc_configuration
                .as_ref()
                .map(|v| vpc_configuration(v).map(|v| vec![v]))
                .transpose()?,
        )
        .build())
}

fn code_configuration(
    c: &model::ApplicationCodeConfiguration,
) -> RemoteResult<sdk::ApplicationCodeConfiguration> {
    let content = match &c.code_content {
        Some(content) => Some(
            sdk::CodeContent::builder()
                .set_text_content(content.text_content.clone())
                .set_s3_content_location(
                    content
                        .s3_content_location
                        .as_ref()
                        .map(|s| {
                            sdk::S3ContentLocation::builder()
                                .bucket_arn(&s.bucket_arn)
                                .file_key(&s.file_key)
                                .set_object_version(s.object_version.clone())
                                .build()
                        })
                        .transpose()?,
                )
                .build(),
        ),
        None => None,
    };
    Ok(sdk::ApplicationCodeConfiguration::builder()
        .code_content_type(sdk::CodeContentType::from(c.code_content_type.as_str()))
        .set_code_content(content)
        .build()?)
}

fn property_groups(e: &model::EnvironmentProperties) -> RemoteResult<Vec<sdk::PropertyGroup>> {
    e.property_groups
        .iter()
        .map(|g| -> RemoteResult<_> {
            let map: HashMap<String, String> = g
                .property_map
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            Ok(sdk::PropertyGroup::builder()
                .property_group_id(&g.property_group_id)
                .set_property_map(Some(map))
                .build()?)
        })
        .collect()
}

fn environment_properties(
    e: &model::EnvironmentProperties,
) -> RemoteResult<sdk::EnvironmentProperties> {
    Ok(sdk::EnvironmentProperties::builder()
        .set_property_groups(Some(property_groups(e)?))
        .build()?)
}

fn configuration_type(t: model::ConfigurationType) -> sdk::ConfigurationType {
    sdk::ConfigurationType::from(t.as_str())
}

fn flink_configuration(
    f: &model::FlinkApplicationConfiguration,
) -> RemoteResult<sdk::FlinkApplicationConfiguration> {
    let f = f.effective();
    Ok(sdk::FlinkApplicationConfiguration::builder()
        .set_checkpoint_configuration(
            f.checkpoint_configuration
                .as_ref()
                .map(|c| {
                    sdk::CheckpointConfiguration::builder()
                        .configuration_type(configuration_type(c.configuration_type))
                        .set_checkpointing_enabled(c.checkpointing_enabled)
                        .set_checkpoint_interval(c.checkpoint_interval)
                        .set_min_pause_between_checkpoints(c.min_pause_between_checkpoints)
                        .build()
                })
                .transpose()?,
        )
        .set_monitoring_configuration(
            f.monitoring_configuration
                .as_ref()
                .map(|c| {
                    sdk::MonitoringConfiguration::builder()
                        .configuration_type(configuration_type(c.configuration_type))
                        .set_log_level(c.log_level.map(|l| sdk::LogLevel::from(l.as_str())))
                        .set_metrics_level(
                            c.metrics_level.map(|l| sdk::MetricsLevel::from(l.as_str())),
                        )
                        .build()
                })
                .transpose()?,
        )
        .set_parallelism_configuration(
            f.parallelism_configuration
                .as_ref()
                .map(|c| {
                    sdk::ParallelismConfiguration::builder()
                        .configuration_type(configuration_type(c.configuration_type))
                        .set_auto_scaling_enabled(c.auto_scaling_enabled)
                        .set_parallelism(c.parallelism)
                        .set_parallelism_per_kpu(c.parallelism_per_kpu)
                        .build()
                })
                .transpose()?,
        )
        .build())
}

fn flink_configuration_update(
    f: &model::FlinkApplicationConfiguration,
) -> sdk::FlinkApplicationConfigurationUpdate {
    let f = f.effective();
    sdk::FlinkApplicationConfigurationUpdate::builder()
        .set_checkpoint_configuration_update(f.checkpoint_configuration.as_ref().map(|c| {
            sdk::CheckpointConfigurationUpdate::builder()
                .configuration_type_update(configuration_type(c.configuration_type))
                .set_checkpointing_enabled_update(c.checkpointing_enabled)
                .set_checkpoint_interval_update(c.checkpoint_interval)
                .set_min_pause_between_checkpoints_update(c.min_pause_between_checkpoints)
                .build()
        }))
        .set_monitoring_configuration_update(f.monitoring_configuration.as_ref().map(|c| {
            sdk::MonitoringConfigurationUpdate::builder()
                .configuration_type_update(configuration_type(c.configuration_type))
                .set_log_level_update(c.log_level.map(|l| sdk::LogLevel::from(l.as_str())))
                .set_metrics_level_update(
                    c.metrics_level.map(|l| sdk::MetricsLevel::from(l.as_str())),
                )
                .build()
        }))
        .set_parallelism_configuration_update(f.parallelism_configuration.as_ref().map(|c| {
            sdk::ParallelismConfigurationUpdate::builder()
                .configuration_type_update(configuration_type(c.configuration_type))
                .set_auto_scaling_enabled_update(c.auto_scaling_enabled)
                .set_parallelism_update(c.parallelism)
                .set_parallelism_per_kpu_update(c.parallelism_per_kpu)
                .build()
        }))
        .build()
}

fn sql_configuration(
    s: &model::SqlApplicationConfiguration,
) -> RemoteResult<sdk::SqlApplicationConfiguration> {
    Ok(sdk::SqlApplicationConfiguration::builder()
        .set_inputs(s.input.as_ref().map(|i| input(i).map(|i| vec![i])).transpose()?)
        .set_outputs(if s.outputs.is_empty() {
            None
        } else {
            Some(s.outputs.iter().map(output).collect::<RemoteResult<Vec<_>>>()?)
        })
        .set_reference_data_sources(
            s.reference_data_source
                .as_ref()
                .map(|r| reference_data_source(r).map(|r| vec![r]))
                .transpose()?,
        )
        .build())
}

fn record_format(f: &model::RecordFormat) -> RemoteResult<sdk::RecordFormat> {
    let mapping = f.mapping_parameters.as_ref().map(|m| -> RemoteResult<_> {
        Ok(sdk::MappingParameters::builder()
            .set_csv_mapping_parameters(
                m.csv_mapping_parameters
                    .as_ref()
                    .map(|c| {
                        sdk::CsvMappingParameters::builder()
                            .record_row_delimiter(&c.record_row_delimiter)
                            .record_column_delimiter(&c.record_column_delimiter)
                            .build()
                    })
                    .transpose()?,
            )
            .set_json_mapping_parameters(
                m.json_mapping_parameters
                    .as_ref()
                    .map(|j| {
                        sdk::JsonMappingParameters::builder()
                            .record_row_path(&j.record_row_path)
                            .build()
                    })
                    .transpose()?,
            )
            .build())
    });
    Ok(sdk::RecordFormat::builder()
        .record_format_type(sdk::RecordFormatType::from(f.record_format_type.as_str()))
        .set_mapping_parameters(mapping.transpose()?)
        .build()?)
}

fn record_columns(columns: &[model::RecordColumn]) -> RemoteResult<Vec<sdk::RecordColumn>> {
    columns
        .iter()
        .map(|c| -> RemoteResult<_> {
            Ok(sdk::RecordColumn::builder()
                .name(&c.name)
                .sql_type(&c.sql_type)
                .set_mapping(c.mapping.clone())
                .build()?)
        })
        .collect()
}

fn source_schema(s: &model::SourceSchema) -> RemoteResult<sdk::SourceSchema> {
    Ok(sdk::SourceSchema::builder()
        .record_format(record_format(&s.record_format)?)
        .set_record_encoding(s.record_encoding.clone())
        .set_record_columns(Some(record_columns(&s.record_columns)?))
        .build()?)
}

pub(super) fn input_processing_configuration(
    p: &model::InputProcessingConfiguration,
) -> RemoteResult<sdk::InputProcessingConfiguration> {
    Ok(sdk::InputProcessingConfiguration::builder()
        .input_lambda_processor(
            sdk::InputLambdaProcessor::builder()
                .resource_arn(&p.input_lambda_processor.resource_arn)
                .build()?,
        )
        .build())
}

pub(super) fn input(i: &model::Input) -> RemoteResult<sdk::Input> {
    Ok(sdk::Input::builder()
        .name_prefix(&i.name_prefix)
        .input_schema(source_schema(&i.input_schema)?)
        .set_input_parallelism(
            i.input_parallelism
                .as_ref()
                .map(|p| sdk::InputParallelism::builder().set_count(p.count).build()),
        )
        .set_input_processing_configuration(
            i.input_processing_configuration
                .as_ref()
                .map(input_processing_configuration)
                .transpose()?,
        )
        .set_kinesis_firehose_input(
            i.kinesis_firehose_input
                .as_ref()
                .map(|a| {
                    sdk::KinesisFirehoseInput::builder()
                        .resource_arn(&a.resource_arn)
                        .build()
                })
                .transpose()?,
        )
        .set_kinesis_streams_input(
            i.kinesis_streams_input
                .as_ref()
                .map(|a| sdk::KinesisStreamsInput::builder().resource_arn(&a.resource_arn).build())
                .transpose()?,
        )
        .build()?)
}

fn input_update(u: &InputUpdate) -> RemoteResult<sdk::InputUpdate> {
    let schema = match &u.input_schema {
        Some(s) => Some(
            sdk::InputSchemaUpdate::builder()
                .record_format_update(record_format(&s.record_format)?)
                .set_record_encoding_update(s.record_encoding.clone())
                .set_record_column_updates(Some(record_columns(&s.record_columns)?))
                .build(),
        ),
        None => None,
    };
    let parallelism = u
        .input_parallelism
        .as_ref()
        .and_then(|p| p.count)
        .map(|count| sdk::InputParallelismUpdate::builder().count_update(count).build())
        .transpose()?;
    let processing = match &u.input_processing_configuration {
        Some(p) => Some(
            sdk::InputProcessingConfigurationUpdate::builder()
                .input_lambda_processor_update(
                    sdk::InputLambdaProcessorUpdate::builder()
                        .resource_arn_update(&p.input_lambda_processor.resource_arn)
                        .build()?,
                )
                .build(),
        ),
        None => None,
    };

    Ok(sdk::InputUpdate::builder()
        .input_id(&u.input_id)
        .set_name_prefix_update(u.name_prefix.clone())
        .set_input_schema_update(schema)
        .set_input_parallelism_update(parallelism)
        .set_input_processing_configuration_update(processing)
        .set_kinesis_firehose_input_update(
            u.kinesis_firehose_input
                .as_ref()
                .map(|a| {
                    sdk::KinesisFirehoseInputUpdate::builder()
                        .resource_arn_update(&a.resource_arn)
                        .build()
                })
                .transpose()?,
        )
        .set_kinesis_streams_input_update(
            u.kinesis_streams_input
                .as_ref()
                .map(|a| {
                    sdk::KinesisStreamsInputUpdate::builder()
                        .resource_arn_update(&a.resource_arn)
                        .build()
                })
                .transpose()?,
        )
        .build()?)
}

pub(super) fn output(o: &model::Output) -> RemoteResult<sdk::Output> {
    Ok(sdk::Output::builder()
        .name(&o.name)
        .destination_schema(
            sdk::DestinationSchema::builder()
                .record_format_type(sdk::RecordFormatType::from(
                    o.destination_schema.record_format_type.as_str(),
                ))
                .build()?,
        )
        .set_kinesis_firehose_output(
            o.kinesis_firehose_output
                .as_ref()
                .map(|a| {
                    sdk::KinesisFirehoseOutput::builder()
                        .resource_arn(&a.resource_arn)
                        .build()
                })
                .transpose()?,
        )
        .set_kinesis_streams_output(
            o.kinesis_streams_output
                .as_ref()
                .map(|a| sdk::KinesisStreamsOutput::builder().resource_arn(&a.resource_arn).build())
                .transpose()?,
        )
        .set_lambda_output(
            o.lambda_output
                .as_ref()
                .map(|a| sdk::LambdaOutput::builder().resource_arn(&a.resource_arn).build())
                .transpose()?,
        )
        .build()?)
}

pub(super) fn reference_data_source(
    r: &model::ReferenceDataSource,
) -> RemoteResult<sdk::ReferenceDataSource> {
    Ok(sdk::ReferenceDataSource::builder()
        .table_name(&r.table_name)
        .s3_reference_data_source(
            sdk::S3ReferenceDataSource::builder()
                .bucket_arn(&r.s3_reference_data_source.bucket_arn)
                .file_key(&r.s3_reference_data_source.file_key)
                .build(),
        )
        .reference_schema(source_schema(&r.reference_schema)?)
        .build()?)
}

pub(super) fn vpc_configuration(v: &model::VpcConfiguration) -> RemoteResult<sdk::VpcConfiguration> {
    Ok(sdk::VpcConfiguration::builder()
        .set_subnet_ids(Some(v.subnet_ids.iter().cloned().collect()))
        .set_security_group_ids(Some(v.security_group_ids.iter().cloned().collect()))
        .build()?)
}

fn restore_configuration(
    r: &model::ApplicationRestoreConfiguration,
) -> RemoteResult<Option<sdk::ApplicationRestoreConfiguration>> {
    let Some(restore_type) = r.application_restore_type else {
        return Ok(None);
    };
    Ok(Some(
        sdk::ApplicationRestoreConfiguration::builder()
            .application_restore_type(sdk::ApplicationRestoreType::from(restore_type.as_str()))
            .set_snapshot_name(r.snapshot_name.clone())
            .build()?,
    ))
}

fn flink_run_configuration(f: &model::FlinkRunConfiguration) -> sdk::FlinkRunConfiguration {
    sdk::FlinkRunConfiguration::builder()
        .set_allow_non_restored_state(f.allow_non_restored_state)
        .build()
}

pub(super) fn run_configuration(r: &StartRunConfiguration) -> RemoteResult<sdk::RunConfiguration> {
    let sql = r
        .sql_run_configurations
        .iter()
        .map(|s| -> RemoteResult<_> {
            Ok(sdk::SqlRunConfiguration::builder()
                .input_id(&s.input_id)
                .input_starting_position_configuration(
                    sdk::InputStartingPositionConfiguration::builder()
                        .set_input_starting_position(
                            s.input_starting_position
                                .map(|p| sdk::InputStartingPosition::from(p.as_str())),
                        )
                        .build(),
                )
                .build()?)
        })
        .collect::<RemoteResult<Vec<_>>>()?;

    Ok(sdk::RunConfiguration::builder()
        .set_application_restore_configuration(match &r.application_restore_configuration {
            Some(restore) => restore_configuration(restore)?,
            None => None,
        })
        .set_flink_run_configuration(r.flink_run_configuration.as_ref().map(flink_run_configuration))
        .set_sql_run_configurations(if sql.is_empty() { None } else { Some(sql) })
        .build())
}

/// The members of one `UpdateApplication` request
#[derive(Debug, Default)]
pub(super) struct UpdateApplicationParts {
    pub configuration: Option<sdk::ApplicationConfigurationUpdate>,
    pub service_execution_role: Option<String>,
    pub run_configuration: Option<sdk::RunConfigurationUpdate>,
    pub cloudwatch_logging_option: Option<sdk::CloudWatchLoggingOptionUpdate>,
}

impl UpdateApplicationParts {
    fn configuration(update: sdk::ApplicationConfigurationUpdate) -> Self {
        Self {
            configuration: Some(update),
            ..Self::default()
        }
    }
}

/// Build the `UpdateApplication` members for an update sent through that call
///
/// Returns `None` for updates that have a dedicated `Add*`/`Delete*` call.
pub(super) fn update_application_parts(
    update: &ApplicationUpdate,
) -> RemoteResult<Option<UpdateApplicationParts>> {
    let builder = sdk::ApplicationConfigurationUpdate::builder();
    let parts = match update {
        ApplicationUpdate::Code(c) => {
            let content = c.code_content.as_ref().map(|content| {
                sdk::CodeContentUpdate::builder()
                    .set_text_content_update(content.text_content.clone())
                    .set_s3_content_location_update(content.s3_content_location.as_ref().map(
                        |s| {
                            sdk::S3ContentLocationUpdate::builder()
                                .bucket_arn_update(&s.bucket_arn)
                                .file_key_update(&s.file_key)
                                .set_object_version_update(s.object_version.clone())
                                .build()
                        },
                    ))
                    .build()
            });
            UpdateApplicationParts::configuration(
                builder
                    .application_code_configuration_update(
                        sdk::ApplicationCodeConfigurationUpdate::builder()
                            .code_content_type_update(sdk::CodeContentType::from(
                                c.code_content_type.as_str(),
                            ))
                            .set_code_content_update(content)
                            .build(),
                    )
                    .build(),
            )
        }
        ApplicationUpdate::SnapshotConfiguration(s) => UpdateApplicationParts::configuration(
            builder
                .application_snapshot_configuration_update(
                    sdk::ApplicationSnapshotConfigurationUpdate::builder()
                        .snapshots_enabled_update(s.snapshots_enabled)
                        .build()?,
                )
                .build(),
        ),
        ApplicationUpdate::EnvironmentProperties(e) => UpdateApplicationParts::configuration(
            builder
                .environment_property_updates(
                    sdk::EnvironmentPropertyUpdates::builder()
                        .set_property_groups(Some(property_groups(e)?))
                        .build()?,
                )
                .build(),
        ),
        ApplicationUpdate::Flink(f) => UpdateApplicationParts::configuration(
            builder
                .flink_application_configuration_update(flink_configuration_update(f))
                .build(),
        ),
        ApplicationUpdate::UpdateInput(u) => UpdateApplicationParts::configuration(
            builder
                .sql_application_configuration_update(
                    sdk::SqlApplicationConfigurationUpdate::builder()
                        .input_updates(input_update(u)?)
                        .build(),
                )
                .build(),
        ),
        ApplicationUpdate::UpdateReferenceDataSource {
            reference_id,
            source,
        } => UpdateApplicationParts::configuration(
            builder
                .sql_application_configuration_update(
                    sdk::SqlApplicationConfigurationUpdate::builder()
                        .reference_data_source_updates(
                            sdk::ReferenceDataSourceUpdate::builder()
                                .reference_id(reference_id)
                                .table_name_update(&source.table_name)
                                .s3_reference_data_source_update(
                                    sdk::S3ReferenceDataSourceUpdate::builder()
                                        .bucket_arn_update(&source.s3_reference_data_source.bucket_arn)
                                        .file_key_update(&source.s3_reference_data_source.file_key)
                                        .build(),
                                )
                                .reference_schema_update(source_schema(&source.reference_schema)?)
                                .build()?,
                        )
                        .build(),
                )
                .build(),
        ),
        ApplicationUpdate::UpdateVpcConfiguration {
            vpc_configuration_id,
            configuration,
        } => UpdateApplicationParts::configuration(
            builder
                .vpc_configuration_updates(
                    sdk::VpcConfigurationUpdate::builder()
                        .vpc_configuration_id(vpc_configuration_id)
                        .set_subnet_id_updates(Some(
                            configuration.subnet_ids.iter().cloned().collect(),
                        ))
                        .set_security_group_id_updates(Some(
                            configuration.security_group_ids.iter().cloned().collect(),
                        ))
                        .build()?,
                )
                .build(),
        ),
        ApplicationUpdate::RunConfiguration(r) => UpdateApplicationParts {
            run_configuration: Some(
                sdk::RunConfigurationUpdate::builder()
                    .set_application_restore_configuration(
                        match &r.application_restore_configuration {
                            Some(restore) => restore_configuration(restore)?,
                            None => None,
                        },
                    )
                    .set_flink_run_configuration(
                        r.flink_run_configuration.as_ref().map(flink_run_configuration),
                    )
                    .build(),
            ),
            ..UpdateApplicationParts::default()
        },
        ApplicationUpdate::UpdateCloudWatchLoggingOption {
            cloudwatch_logging_option_id,
            log_stream_arn,
        } => UpdateApplicationParts {
            cloudwatch_logging_option: Some(
                sdk::CloudWatchLoggingOptionUpdate::builder()
                    .cloud_watch_logging_option_id(cloudwatch_logging_option_id)
                    .log_stream_arn_update(log_stream_arn)
                    .build()?,
            ),
            ..UpdateApplicationParts::default()
        },
        ApplicationUpdate::ServiceExecutionRole(role) => UpdateApplicationParts {
            service_execution_role: Some(role.clone()),
            ..UpdateApplicationParts::default()
        },
        ApplicationUpdate::AddInput(_)
        | ApplicationUpdate::AddInputProcessingConfiguration { .. }
        | ApplicationUpdate::DeleteInputProcessingConfiguration { .. }
        | ApplicationUpdate::AddOutput(_)
        | ApplicationUpdate::DeleteOutput { .. }
        | ApplicationUpdate::AddReferenceDataSource(_)
        | ApplicationUpdate::DeleteReferenceDataSource { .. }
        | ApplicationUpdate::AddVpcConfiguration(_)
        | ApplicationUpdate::DeleteVpcConfiguration { .. }
        | ApplicationUpdate::AddCloudWatchLoggingOption { .. }
        | ApplicationUpdate::DeleteCloudWatchLoggingOption { .. } => return Ok(None),
    };
    Ok(Some(parts))
}

// Inbound

fn configuration_type_from(t: Option<&sdk::ConfigurationType>) -> RemoteResult<model::ConfigurationType> {
    t.map_or(Ok(model::ConfigurationType::Default), |t| enum_value(t.as_str()))
}

fn source_schema_from(s: &sdk::SourceSchema) -> RemoteResult<model::SourceSchema> {
    let format = s
        .record_format()
        .ok_or_else(|| missing("SourceSchema", "RecordFormat"))?;
    let mapping = format.mapping_parameters().map(|m| model::MappingParameters {
        csv_mapping_parameters: m.csv_mapping_parameters().map(|c| model::CsvMappingParameters {
            record_column_delimiter: c.record_column_delimiter().to_string(),
            record_row_delimiter: c.record_row_delimiter().to_string(),
        }),
        json_mapping_parameters: m.json_mapping_parameters().map(|j| {
            model::JsonMappingParameters {
                record_row_path: j.record_row_path().to_string(),
            }
        }),
    });
    Ok(model::SourceSchema {
        record_columns: s
            .record_columns()
            .iter()
            .map(|c| model::RecordColumn {
                name: c.name().to_string(),
                sql_type: c.sql_type().to_string(),
                mapping: c.mapping().map(str::to_string),
            })
            .collect(),
        record_encoding: s.record_encoding().map(str::to_string),
        record_format: model::RecordFormat {
            record_format_type: enum_value(format.record_format_type().as_str())?,
            mapping_parameters: mapping,
        },
    })
}

fn arn(resource_arn: &str) -> model::ResourceArn {
    model::ResourceArn {
        resource_arn: resource_arn.to_string(),
    }
}

fn input_from(i: &sdk::InputDescription) -> RemoteResult<model::Input> {
    Ok(model::Input {
        name_prefix: i.name_prefix().unwrap_or_default().to_string(),
        input_schema: source_schema_from(
            i.input_schema()
                .ok_or_else(|| missing("InputDescription", "InputSchema"))?,
        )?,
        input_parallelism: i
            .input_parallelism()
            .map(|p| model::InputParallelism { count: p.count() }),
        input_processing_configuration: i
            .input_processing_configuration_description()
            .and_then(|p| p.input_lambda_processor_description())
            .map(|l| model::InputProcessingConfiguration {
                input_lambda_processor: arn(l.resource_arn()),
            }),
        input_starting_position_configuration: i
            .input_starting_position_configuration()
            .map(|p| -> RemoteResult<_> {
                Ok(model::InputStartingPositionConfiguration {
                    input_starting_position: p
                        .input_starting_position()
                        .map(|s| enum_value(s.as_str()))
                        .transpose()?,
                })
            })
            .transpose()?,
        kinesis_firehose_input: i
            .kinesis_firehose_input_description()
            .map(|k| arn(k.resource_arn())),
        kinesis_streams_input: i
            .kinesis_streams_input_description()
            .map(|k| arn(k.resource_arn())),
        input_id: i.input_id().map(str::to_string),
        in_app_stream_names: i.in_app_stream_names().to_vec(),
    })
}

fn output_from(o: &sdk::OutputDescription) -> RemoteResult<model::Output> {
    let destination = o
        .destination_schema()
        .ok_or_else(|| missing("OutputDescription", "DestinationSchema"))?;
    Ok(model::Output {
        name: o.name().unwrap_or_default().to_string(),
        destination_schema: model::DestinationSchema {
            record_format_type: enum_value(destination.record_format_type().as_str())?,
        },
        kinesis_firehose_output: o
            .kinesis_firehose_output_description()
            .map(|k| arn(k.resource_arn())),
        kinesis_streams_output: o
            .kinesis_streams_output_description()
            .map(|k| arn(k.resource_arn())),
        lambda_output: o.lambda_output_description().map(|l| arn(l.resource_arn())),
        output_id: o.output_id().map(str::to_string),
    })
}

fn reference_data_source_from(
    r: &sdk::ReferenceDataSourceDescription,
) -> RemoteResult<model::ReferenceDataSource> {
    let s3 = r
        .s3_reference_data_source_description()
        .ok_or_else(|| missing("ReferenceDataSourceDescription", "S3ReferenceDataSourceDescription"))?;
    Ok(model::ReferenceDataSource {
        table_name: r.table_name().to_string(),
        reference_schema: source_schema_from(
            r.reference_schema()
                .ok_or_else(|| missing("ReferenceDataSourceDescription", "ReferenceSchema"))?,
        )?,
        s3_reference_data_source: model::S3ReferenceDataSource {
            bucket_arn: s3.bucket_arn().to_string(),
            file_key: s3.file_key().to_string(),
        },
        reference_id: Some(r.reference_id().to_string()),
    })
}

fn sql_configuration_from(
    s: &sdk::SqlApplicationConfigurationDescription,
) -> RemoteResult<model::SqlApplicationConfiguration> {
    Ok(model::SqlApplicationConfiguration {
        input: s.input_descriptions().first().map(input_from).transpose()?,
        outputs: s
            .output_descriptions()
            .iter()
            .map(output_from)
            .collect::<RemoteResult<Vec<_>>>()?,
        reference_data_source: s
            .reference_data_source_descriptions()
            .first()
            .map(reference_data_source_from)
            .transpose()?,
    })
}

fn flink_configuration_from(
    f: &sdk::FlinkApplicationConfigurationDescription,
) -> RemoteResult<model::FlinkApplicationConfiguration> {
    Ok(model::FlinkApplicationConfiguration {
        checkpoint_configuration: f
            .checkpoint_configuration_description()
            .map(|c| -> RemoteResult<_> {
                Ok(model::CheckpointConfiguration {
                    configuration_type: configuration_type_from(c.configuration_type())?,
                    checkpointing_enabled: c.checkpointing_enabled(),
                    checkpoint_interval: c.checkpoint_interval(),
                    min_pause_between_checkpoints: c.min_pause_between_checkpoints(),
                })
            })
            .transpose()?,
        monitoring_configuration: f
            .monitoring_configuration_description()
            .map(|c| -> RemoteResult<_> {
                Ok(model::MonitoringConfiguration {
                    configuration_type: configuration_type_from(c.configuration_type())?,
                    log_level: c.log_level().map(|l| enum_value(l.as_str())).transpose()?,
                    metrics_level: c
                        .metrics_level()
                        .map(|l| enum_value(l.as_str()))
                        .transpose()?,
                })
            })
            .transpose()?,
        parallelism_configuration: f
            .parallelism_configuration_description()
            .map(|c| -> RemoteResult<_> {
                Ok(model::ParallelismConfiguration {
                    configuration_type: configuration_type_from(c.configuration_type())?,
                    auto_scaling_enabled: c.auto_scaling_enabled(),
                    parallelism: c.parallelism(),
                    parallelism_per_kpu: c.parallelism_per_kpu(),
                })
            })
            .transpose()?,
    })
}

fn run_configuration_from(
    r: &sdk::RunConfigurationDescription,
) -> RemoteResult<model::RunConfiguration> {
    Ok(model::RunConfiguration {
        application_restore_configuration: r
            .application_restore_configuration_description()
            .map(|a| -> RemoteResult<_> {
                Ok(model::ApplicationRestoreConfiguration {
                    application_restore_type: Some(enum_value(a.application_restore_type().as_str())?),
                    snapshot_name: a.snapshot_name().map(str::to_string),
                })
            })
            .transpose()?,
        flink_run_configuration: r.flink_run_configuration_description().map(|f| {
            model::FlinkRunConfiguration {
                allow_non_restored_state: f.allow_non_restored_state(),
            }
        }),
    })
}

fn configuration_from(
    c: &sdk::ApplicationConfigurationDescription,
) -> RemoteResult<model::ApplicationConfiguration> {
    Ok(model::ApplicationConfiguration {
        application_code_configuration: c
            .application_code_configuration_description()
            .map(|code| -> RemoteResult<_> {
                Ok(model::ApplicationCodeConfiguration {
                    code_content_type: enum_value(code.code_content_type().as_str())?,
                    code_content: code.code_content_description().map(|content| {
                        model::CodeContent {
                            text_content: content.text_content().map(str::to_string),
                            s3_content_location: content
                                .s3_application_code_location_description()
                                .map(|s| model::S3ContentLocation {
                                    bucket_arn: s.bucket_arn().to_string(),
                                    file_key: s.file_key().to_string(),
                                    object_version: s.object_version().map(str::to_string),
                                }),
                        }
                    }),
                })
            })
            .transpose()?,
        application_snapshot_configuration: c
            .application_snapshot_configuration_description()
            .map(|s| model::ApplicationSnapshotConfiguration {
                snapshots_enabled: s.snapshots_enabled(),
            }),
        environment_properties: c.environment_property_descriptions().map(|e| {
            model::EnvironmentProperties {
                property_groups: e
                    .property_group_descriptions()
                    .iter()
                    .map(|g| model::PropertyGroup {
                        property_group_id: g.property_group_id().to_string(),
                        property_map: g
                            .property_map()
                            .iter()
                            .map(|(k, v)| (k.clone(), v.clone()))
                            .collect(),
                    })
                    .collect(),
            }
        }),
        flink_application_configuration: c
            .flink_application_configuration_description()
            .map(flink_configuration_from)
            .transpose()?,
        run_configuration: c
            .run_configuration_description()
            .map(run_configuration_from)
            .transpose()?,
        sql_application_configuration: c
            .sql_application_configuration_description()
            .map(sql_configuration_from)
            .transpose()?,
        vpc_configuration: c.vpc_configuration_descriptions().first().map(|v| {
            model::VpcConfiguration {
                subnet_ids: v.subnet_ids().iter().cloned().collect(),
                security_group_ids: v.security_group_ids().iter().cloned().collect(),
                vpc_configuration_id: Some(v.vpc_configuration_id().to_string()),
                vpc_id: Some(v.vpc_id().to_string()),
            }
        }),
    })
}

pub(super) fn application_detail(d: &sdk::ApplicationDetail) -> RemoteResult<ApplicationDetail> {
    Ok(ApplicationDetail {
        application_arn: d.application_arn().to_string(),
        application_name: d.application_name().to_string(),
        application_description: d.application_description().map(str::to_string),
        runtime_environment: enum_value(d.runtime_environment().as_str())?,
        service_execution_role: d.service_execution_role().map(str::to_string),
        application_status: enum_value(d.application_status().as_str())?,
        application_version_id: d.application_version_id(),
        application_mode: d
            .application_mode()
            .map(|m| enum_value(m.as_str()))
            .transpose()?,
        create_timestamp: d.create_timestamp().and_then(from_sdk_timestamp),
        last_update_timestamp: d.last_update_timestamp().and_then(from_sdk_timestamp),
        application_configuration: d
            .application_configuration_description()
            .map(configuration_from)
            .transpose()?,
        cloudwatch_logging_options: d
            .cloud_watch_logging_option_descriptions()
            .iter()
            .map(|o| model::CloudWatchLoggingOption {
                log_stream_arn: o.log_stream_arn().to_string(),
                cloudwatch_logging_option_id: o.cloud_watch_logging_option_id().map(str::to_string),
            })
            .collect(),
        maintenance_configuration: d
            .application_maintenance_configuration_description()
            .map(maintenance_configuration),
    })
}

pub(super) fn maintenance_configuration(
    m: &sdk::ApplicationMaintenanceConfigurationDescription,
) -> MaintenanceConfigurationDescription {
    MaintenanceConfigurationDescription {
        application_maintenance_window_start_time: m
            .application_maintenance_window_start_time()
            .to_string(),
        application_maintenance_window_end_time: m
            .application_maintenance_window_end_time()
            .to_string(),
    }
}

pub(super) fn operation_detail(
    operation_id: &str,
    o: &sdk::ApplicationOperationInfoDetails,
) -> RemoteResult<OperationDetail> {
    Ok(OperationDetail {
        operation_id: operation_id.to_string(),
        operation: Some(o.operation().to_string()),
        status: enum_value(o.operation_status().as_str())?,
        failure_message: o
            .operation_failure_details()
            .and_then(|f| f.error_info())
            .and_then(|e| e.error_string())
            .map(str::to_string),
    })
}

pub(super) fn snapshot_detail(s: &sdk::SnapshotDetails) -> RemoteResult<SnapshotDetail> {
    Ok(SnapshotDetail {
        snapshot_name: s.snapshot_name().to_string(),
        snapshot_status: enum_value(s.snapshot_status().as_str())?,
        application_version_id: s.application_version_id(),
        snapshot_creation_timestamp: s.snapshot_creation_timestamp().and_then(from_sdk_timestamp),
    })
}

pub(super) fn required<T>(value: Option<T>, shape: &str, member: &str) -> RemoteResult<T> {
    value.ok_or_else(|| missing(shape, member))
}
