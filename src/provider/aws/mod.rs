//! # AWS Kinesis Analytics v2 Client
//!
//! [`KinesisAnalyticsApi`] over the official SDK.
//!
//! Credentials and region come from the SDK default chain (environment,
//! profile, IRSA web identity, instance metadata). Every call is timed into
//! the remote-call metrics and its failure classified into a
//! [`RemoteError`] from the service error code.

mod convert;

use crate::error::{RemoteError, RemoteErrorKind};
use crate::observability::metrics;
use crate::provider::{
    ApplicationDetail, ApplicationUpdate, CreateApplicationRequest, KinesisAnalyticsApi,
    MaintenanceConfigurationDescription, OperationDetail, RemoteResult, SnapshotDetail,
    StartRunConfiguration, UpdateOutput,
};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_kinesisanalyticsv2::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_kinesisanalyticsv2::types as sdk;
use aws_sdk_kinesisanalyticsv2::Client;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Instant;
use tracing::{debug, debug_span, info, Instrument};

/// Classify an SDK failure; transport failures carry no service code
fn remote_error<E, R>(operation: &'static str, err: &SdkError<E, R>) -> RemoteError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let message = err
        .message()
        .map_or_else(|| DisplayErrorContext(err).to_string(), str::to_string);
    let error = match err.code() {
        Some(code) => RemoteError::from_code(code, message),
        None => RemoteError::new(RemoteErrorKind::Transport, message),
    };
    metrics::increment_remote_call_errors(operation, error.kind.as_str());
    error
}

/// Run one SDK call under a span, recording its duration and failure kind
async fn call<T, E, R, F>(operation: &'static str, request: F) -> RemoteResult<T>
where
    F: Future<Output = Result<T, SdkError<E, R>>>,
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let start = Instant::now();
    let result = request
        .instrument(debug_span!("kinesisanalyticsv2.call", operation))
        .await;
    metrics::record_remote_call(operation, start.elapsed());
    result.map_err(|e| {
        let error = remote_error(operation, &e);
        debug!(operation, error = %error, "Remote call failed");
        error
    })
}

/// Kinesis Analytics v2 provider implementation
pub struct AwsKinesisAnalytics {
    client: Client,
    region: Option<String>,
}

impl std::fmt::Debug for AwsKinesisAnalytics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsKinesisAnalytics")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AwsKinesisAnalytics {
    /// Build from an already loaded SDK configuration
    #[must_use]
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
            region: sdk_config.region().map(ToString::to_string),
        }
    }

    /// Load the SDK default credential chain, optionally pinning the region
    pub async fn from_env(region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        let sdk_config = loader.load().await;
        let provider = Self::new(&sdk_config);
        info!(region = ?provider.region, "Kinesis Analytics v2 client ready");
        provider
    }
}

#[async_trait]
impl KinesisAnalyticsApi for AwsKinesisAnalytics {
    async fn describe_application(&self, application_name: &str) -> RemoteResult<ApplicationDetail> {
        let output = call(
            "DescribeApplication",
            self.client
                .describe_application()
                .application_name(application_name)
                .send(),
        )
        .await?;
        let detail = convert::required(
            output.application_detail(),
            "DescribeApplication",
            "ApplicationDetail",
        )?;
        convert::application_detail(detail)
    }

    async fn create_application(
        &self,
        request: &CreateApplicationRequest,
    ) -> RemoteResult<ApplicationDetail> {
        let configuration = request
            .application_configuration
            .as_ref()
            .map(convert::application_configuration)
            .transpose()?;
        let logging = request
            .cloudwatch_logging_options
            .iter()
            .map(|arn| convert::cloudwatch_logging_option(arn))
            .collect::<RemoteResult<Vec<_>>>()?;
        let tags = request
            .tags
            .iter()
            .map(|(k, v)| convert::tag(k, v))
            .collect::<RemoteResult<Vec<_>>>()?;

        let output = call(
            "CreateApplication",
            self.client
                .create_application()
                .application_name(&request.application_name)
                .set_application_description(request.application_description.clone())
                .runtime_environment(sdk::RuntimeEnvironment::from(
                    request.runtime_environment.as_str(),
                ))
                .service_execution_role(&request.service_execution_role)
                .set_application_mode(
                    request
                        .application_mode
                        .map(|m| sdk::ApplicationMode::from(m.as_str())),
                )
                .set_application_configuration(configuration)
                .set_cloud_watch_logging_options((!logging.is_empty()).then_some(logging))
                .set_tags((!tags.is_empty()).then_some(tags))
                .send(),
        )
        .await?;
        let detail = convert::required(
            output.application_detail(),
            "CreateApplication",
            "ApplicationDetail",
        )?;
        convert::application_detail(detail)
    }

    async fn update_application(
        &self,
        application_name: &str,
        current_version_id: i64,
        update: &ApplicationUpdate,
    ) -> RemoteResult<UpdateOutput> {
        if let Some(parts) = convert::update_application_parts(update)? {
            let output = call(
                "UpdateApplication",
                self.client
                    .update_application()
                    .application_name(application_name)
                    .current_application_version_id(current_version_id)
                    .set_application_configuration_update(parts.configuration)
                    .set_service_execution_role_update(parts.service_execution_role)
                    .set_run_configuration_update(parts.run_configuration)
                    .set_cloud_watch_logging_option_updates(
                        parts.cloudwatch_logging_option.map(|o| vec![o]),
                    )
                    .send(),
            )
            .await?;
            return Ok(UpdateOutput {
                application_version_id: output
                    .application_detail()
                    .map(sdk::ApplicationDetail::application_version_id),
                operation_id: output.operation_id().map(str::to_string),
            });
        }

        let name = application_name;
        let version = current_version_id;
        let operation = update.operation();
        let operation_id = match update {
            ApplicationUpdate::AddInput(input) => {
                let input = convert::input(input)?;
                call(
                    operation,
                    self.client
                        .add_application_input()
                        .application_name(name)
                        .current_application_version_id(version)
                        .input(input)
                        .send(),
                )
                .await?;
                None
            }
            ApplicationUpdate::AddInputProcessingConfiguration {
                input_id,
                configuration,
            } => {
                let configuration = convert::input_processing_configuration(configuration)?;
                call(
                    operation,
                    self.client
                        .add_application_input_processing_configuration()
                        .application_name(name)
                        .current_application_version_id(version)
                        .input_id(input_id)
                        .input_processing_configuration(configuration)
                        .send(),
                )
                .await?;
                None
            }
            ApplicationUpdate::DeleteInputProcessingConfiguration { input_id } => {
                call(
                    operation,
                    self.client
                        .delete_application_input_processing_configuration()
                        .application_name(name)
                        .current_application_version_id(version)
                        .input_id(input_id)
                        .send(),
                )
                .await?;
                None
            }
            ApplicationUpdate::AddOutput(output) => {
                let output = convert::output(output)?;
                call(
                    operation,
                    self.client
                        .add_application_output()
                        .application_name(name)
                        .current_application_version_id(version)
                        .output(output)
                        .send(),
                )
                .await?;
                None
            }
            ApplicationUpdate::DeleteOutput { output_id } => {
                call(
                    operation,
                    self.client
                        .delete_application_output()
                        .application_name(name)
                        .current_application_version_id(version)
                        .output_id(output_id)
                        .send(),
                )
                .await?;
                None
            }
            ApplicationUpdate::AddReferenceDataSource(source) => {
                let source = convert::reference_data_source(source)?;
                call(
                    operation,
                    self.client
                        .add_application_reference_data_source()
                        .application_name(name)
                        .current_application_version_id(version)
                        .reference_data_source(source)
                        .send(),
                )
                .await?;
                None
            }
            ApplicationUpdate::DeleteReferenceDataSource { reference_id } => {
                call(
                    operation,
                    self.client
                        .delete_application_reference_data_source()
                        .application_name(name)
                        .current_application_version_id(version)
                        .reference_id(reference_id)
                        .send(),
                )
                .await?;
                None
            }
            ApplicationUpdate::AddVpcConfiguration(vpc) => {
                let vpc = convert::vpc_configuration(vpc)?;
                let output = call(
                    operation,
                    self.client
                        .add_application_vpc_configuration()
                        .application_name(name)
                        .current_application_version_id(version)
                        .vpc_configuration(vpc)
                        .send(),
                )
                .await?;
                output.operation_id().map(str::to_string)
            }
            ApplicationUpdate::DeleteVpcConfiguration {
                vpc_configuration_id,
            } => {
                let output = call(
                    operation,
                    self.client
                        .delete_application_vpc_configuration()
                        .application_name(name)
                        .current_application_version_id(version)
                        .vpc_configuration_id(vpc_configuration_id)
                        .send(),
                )
                .await?;
                output.operation_id().map(str::to_string)
            }
            ApplicationUpdate::AddCloudWatchLoggingOption { log_stream_arn } => {
                let option = convert::cloudwatch_logging_option(log_stream_arn)?;
                let output = call(
                    operation,
                    self.client
                        .add_application_cloud_watch_logging_option()
                        .application_name(name)
                        .current_application_version_id(version)
                        .cloud_watch_logging_option(option)
                        .send(),
                )
                .await?;
                output.operation_id().map(str::to_string)
            }
            ApplicationUpdate::DeleteCloudWatchLoggingOption {
                cloudwatch_logging_option_id,
            } => {
                let output = call(
                    operation,
                    self.client
                        .delete_application_cloud_watch_logging_option()
                        .application_name(name)
                        .current_application_version_id(version)
                        .cloud_watch_logging_option_id(cloudwatch_logging_option_id)
                        .send(),
                )
                .await?;
                output.operation_id().map(str::to_string)
            }
            other => {
                return Err(RemoteError::new(
                    RemoteErrorKind::InvalidArgument,
                    format!("{} has no dedicated call", other.describe()),
                ))
            }
        };

        Ok(UpdateOutput {
            application_version_id: None,
            operation_id,
        })
    }

    async fn start_application(
        &self,
        application_name: &str,
        run_configuration: &StartRunConfiguration,
    ) -> RemoteResult<Option<String>> {
        let run_configuration = convert::run_configuration(run_configuration)?;
        let output = call(
            "StartApplication",
            self.client
                .start_application()
                .application_name(application_name)
                .run_configuration(run_configuration)
                .send(),
        )
        .await?;
        Ok(output.operation_id().map(str::to_string))
    }

    async fn stop_application(
        &self,
        application_name: &str,
        force: bool,
    ) -> RemoteResult<Option<String>> {
        let output = call(
            "StopApplication",
            self.client
                .stop_application()
                .application_name(application_name)
                .force(force)
                .send(),
        )
        .await?;
        Ok(output.operation_id().map(str::to_string))
    }

    async fn delete_application(
        &self,
        application_name: &str,
        create_timestamp: DateTime<Utc>,
    ) -> RemoteResult<()> {
        call(
            "DeleteApplication",
            self.client
                .delete_application()
                .application_name(application_name)
                .create_timestamp(convert::to_sdk_timestamp(create_timestamp))
                .send(),
        )
        .await?;
        Ok(())
    }

    async fn describe_application_operation(
        &self,
        application_name: &str,
        operation_id: &str,
    ) -> RemoteResult<OperationDetail> {
        let output = call(
            "DescribeApplicationOperation",
            self.client
                .describe_application_operation()
                .application_name(application_name)
                .operation_id(operation_id)
                .send(),
        )
        .await?;
        let details = convert::required(
            output.application_operation_info_details(),
            "DescribeApplicationOperation",
            "ApplicationOperationInfoDetails",
        )?;
        convert::operation_detail(operation_id, details)
    }

    async fn update_maintenance_configuration(
        &self,
        application_name: &str,
        start_time: &str,
    ) -> RemoteResult<MaintenanceConfigurationDescription> {
        let update = sdk::ApplicationMaintenanceConfigurationUpdate::builder()
            .application_maintenance_window_start_time_update(start_time)
            .build()?;
        let output = call(
            "UpdateApplicationMaintenanceConfiguration",
            self.client
                .update_application_maintenance_configuration()
                .application_name(application_name)
                .application_maintenance_configuration_update(update)
                .send(),
        )
        .await?;
        let description = convert::required(
            output.application_maintenance_configuration_description(),
            "UpdateApplicationMaintenanceConfiguration",
            "ApplicationMaintenanceConfigurationDescription",
        )?;
        Ok(convert::maintenance_configuration(description))
    }

    async fn list_tags(&self, resource_arn: &str) -> RemoteResult<BTreeMap<String, String>> {
        let output = call(
            "ListTagsForResource",
            self.client
                .list_tags_for_resource()
                .resource_arn(resource_arn)
                .send(),
        )
        .await?;
        Ok(output
            .tags()
            .iter()
            .map(|t| (t.key().to_string(), t.value().unwrap_or_default().to_string()))
            .collect())
    }

    async fn tag_resource(
        &self,
        resource_arn: &str,
        tags: &BTreeMap<String, String>,
    ) -> RemoteResult<()> {
        let tags = tags
            .iter()
            .map(|(k, v)| convert::tag(k, v))
            .collect::<RemoteResult<Vec<_>>>()?;
        call(
            "TagResource",
            self.client
                .tag_resource()
                .resource_arn(resource_arn)
                .set_tags(Some(tags))
                .send(),
        )
        .await?;
        Ok(())
    }

    async fn untag_resource(&self, resource_arn: &str, tag_keys: &[String]) -> RemoteResult<()> {
        call(
            "UntagResource",
            self.client
                .untag_resource()
                .resource_arn(resource_arn)
                .set_tag_keys(Some(tag_keys.to_vec()))
                .send(),
        )
        .await?;
        Ok(())
    }

    async fn create_application_snapshot(
        &self,
        application_name: &str,
        snapshot_name: &str,
    ) -> RemoteResult<()> {
        call(
            "CreateApplicationSnapshot",
            self.client
                .create_application_snapshot()
                .application_name(application_name)
                .snapshot_name(snapshot_name)
                .send(),
        )
        .await?;
        Ok(())
    }

    async fn describe_application_snapshot(
        &self,
        application_name: &str,
        snapshot_name: &str,
    ) -> RemoteResult<SnapshotDetail> {
        let output = call(
            "DescribeApplicationSnapshot",
            self.client
                .describe_application_snapshot()
                .application_name(application_name)
                .snapshot_name(snapshot_name)
                .send(),
        )
        .await?;
        let details = convert::required(
            output.snapshot_details(),
            "DescribeApplicationSnapshot",
            "SnapshotDetails",
        )?;
        convert::snapshot_detail(details)
    }

    async fn delete_application_snapshot(
        &self,
        application_name: &str,
        snapshot_name: &str,
        snapshot_creation_timestamp: DateTime<Utc>,
    ) -> RemoteResult<()> {
        call(
            "DeleteApplicationSnapshot",
            self.client
                .delete_application_snapshot()
                .application_name(application_name)
                .snapshot_name(snapshot_name)
                .snapshot_creation_timestamp(convert::to_sdk_timestamp(snapshot_creation_timestamp))
                .send(),
        )
        .await?;
        Ok(())
    }
}
