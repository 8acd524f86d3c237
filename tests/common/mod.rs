//! In-memory Kinesis Analytics v2 control plane shared by the integration tests.
//!
//! Models what the reconcilers depend on: version ids that advance by one on
//! every configuration call and reject stale versions, transitional statuses
//! that settle after one describe, operation ids, tags, snapshots and the
//! maintenance window. Every call is recorded, and errors can be scripted per
//! operation.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, TimeZone, Utc};
use kinesis_analytics_controller::error::{RemoteError, RemoteErrorKind};
use kinesis_analytics_controller::model::{
    Application, ApplicationCodeConfiguration, ApplicationConfiguration,
    ApplicationRestoreConfiguration, ApplicationRestoreType, ApplicationStatus,
    CloudWatchLoggingOption, CodeContent, CodeContentType, ConfigurationType,
    EnvironmentProperties, FlinkApplicationConfiguration, FlinkRunConfiguration, InputParallelism,
    OperationStatus, PropertyGroup, RecordColumn, RecordFormat, RecordFormatType,
    RunConfiguration, RuntimeEnvironment, SnapshotStatus, SourceSchema,
    SqlApplicationConfiguration,
};
use kinesis_analytics_controller::provider::{
    ApplicationDetail, ApplicationUpdate, CreateApplicationRequest, KinesisAnalyticsApi,
    MaintenanceConfigurationDescription, OperationDetail, RemoteResult, SnapshotDetail,
    StartRunConfiguration, UpdateOutput,
};
use kinesis_analytics_controller::ControllerConfig;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

pub const ROLE: &str = "arn:aws:iam::123456789012:role/kinesis-analytics";
pub const OTHER_ROLE: &str = "arn:aws:iam::123456789012:role/kinesis-analytics-v2";
pub const DEFAULT_WINDOW_START: &str = "06:00";

/// Fast polling so waits settle within a few virtual milliseconds
pub fn test_config() -> ControllerConfig {
    ControllerConfig {
        poll_min_interval_ms: 10,
        poll_max_interval_ms: 50,
        poll_initial_delay_ms: 0,
        propagation_timeout_secs: 5,
        ..ControllerConfig::default()
    }
}

pub fn application_arn(name: &str) -> String {
    format!("arn:aws:kinesisanalytics:us-east-1:123456789012:application/{name}")
}

pub fn text_code(text: &str) -> ApplicationCodeConfiguration {
    ApplicationCodeConfiguration {
        code_content_type: CodeContentType::Plaintext,
        code_content: Some(CodeContent {
            s3_content_location: None,
            text_content: Some(text.to_string()),
        }),
    }
}

pub fn property_group(id: &str, entries: &[(&str, &str)]) -> PropertyGroup {
    PropertyGroup {
        property_group_id: id.to_string(),
        property_map: entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect(),
    }
}

pub fn flink_application(name: &str) -> Application {
    let mut app = Application::new(name, RuntimeEnvironment::Flink120, ROLE);
    app.application_configuration = Some(ApplicationConfiguration {
        application_code_configuration: Some(text_code("SELECT 1")),
        environment_properties: Some(EnvironmentProperties {
            property_groups: vec![property_group("ConsumerConfig", &[("flink.stream.initpos", "LATEST")])],
        }),
        ..ApplicationConfiguration::default()
    });
    app
}

pub fn sql_application(name: &str) -> Application {
    let mut app = Application::new(name, RuntimeEnvironment::Sql10, ROLE);
    app.application_configuration = Some(ApplicationConfiguration {
        application_code_configuration: Some(text_code(
            "CREATE OR REPLACE STREAM \"DESTINATION_SQL_STREAM\" (ticker VARCHAR(4));",
        )),
        sql_application_configuration: Some(SqlApplicationConfiguration::default()),
        ..ApplicationConfiguration::default()
    });
    app
}

pub fn json_schema(columns: &[(&str, &str)]) -> SourceSchema {
    SourceSchema {
        record_columns: columns
            .iter()
            .map(|(name, sql_type)| RecordColumn {
                name: (*name).to_string(),
                sql_type: (*sql_type).to_string(),
                mapping: Some(format!("$.{name}")),
            })
            .collect(),
        record_encoding: Some("UTF-8".to_string()),
        record_format: RecordFormat {
            record_format_type: RecordFormatType::Json,
            mapping_parameters: None,
        },
    }
}

/// One recorded remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: String,
    pub target: String,
    /// Version the call was made against, for versioned calls
    pub version_id: Option<i64>,
    pub update: Option<ApplicationUpdate>,
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        !(self.operation.starts_with("Describe") || self.operation.starts_with("List"))
    }
}

/// What a transitional status turns into after the next describe
#[derive(Debug, Clone, Copy)]
enum Settle {
    To(ApplicationStatus),
    Gone,
}

#[derive(Debug)]
struct StoredApplication {
    detail: ApplicationDetail,
    settle: Option<Settle>,
}

#[derive(Debug)]
struct StoredSnapshot {
    detail: SnapshotDetail,
    settle: Option<Option<SnapshotStatus>>,
}

#[derive(Debug, Default)]
struct State {
    applications: BTreeMap<String, StoredApplication>,
    tags: BTreeMap<String, BTreeMap<String, String>>,
    snapshots: BTreeMap<(String, String), StoredSnapshot>,
    operations: HashMap<String, OperationDetail>,
    calls: Vec<Call>,
    scripted: HashMap<String, VecDeque<RemoteError>>,
    next_id: u32,
    clock: i64,
}

impl State {
    fn record(&mut self, operation: &str, target: &str, version_id: Option<i64>, update: Option<&ApplicationUpdate>) {
        self.calls.push(Call {
            operation: operation.to_string(),
            target: target.to_string(),
            version_id,
            update: update.cloned(),
        });
    }

    fn scripted_error(&mut self, operation: &str) -> Option<RemoteError> {
        self.scripted.get_mut(operation).and_then(VecDeque::pop_front)
    }

    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("{}.1", self.next_id)
    }

    fn now(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + ChronoDuration::seconds(self.clock)
    }

    fn operation(&mut self, operation: &str) -> String {
        let operation_id = format!("op-{}", self.next_id());
        self.operations.insert(
            operation_id.clone(),
            OperationDetail {
                operation_id: operation_id.clone(),
                operation: Some(operation.to_string()),
                status: OperationStatus::Successful,
                failure_message: None,
            },
        );
        operation_id
    }

    fn application(&mut self, name: &str) -> RemoteResult<&mut StoredApplication> {
        self.applications.get_mut(name).ok_or_else(|| {
            RemoteError::not_found(format!(
                "Application {name} is not found in account 123456789012"
            ))
        })
    }
}

fn resource_in_use(message: impl Into<String>) -> RemoteError {
    RemoteError::from_code("ResourceInUseException", message)
}

fn end_of_window(start: &str) -> String {
    NaiveTime::parse_from_str(start, "%H:%M")
        .map(|t| (t + ChronoDuration::hours(8)).format("%H:%M").to_string())
        .unwrap_or_default()
}

/// The fake control plane
#[derive(Debug, Default)]
pub struct FakeKinesisAnalytics {
    state: Mutex<State>,
}

impl FakeKinesisAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `operation` fail with `error`
    pub fn fail_next(&self, operation: &str, error: RemoteError) {
        self.state
            .lock()
            .unwrap()
            .scripted
            .entry(operation.to_string())
            .or_default()
            .push_back(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn calls_to(&self, operation: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.operation == operation)
            .collect()
    }

    /// Operation names of all mutations, in call order
    pub fn mutation_names(&self) -> Vec<String> {
        self.mutations().into_iter().map(|c| c.operation).collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Current stored detail, without settling any transition
    pub fn application(&self, name: &str) -> Option<ApplicationDetail> {
        self.state
            .lock()
            .unwrap()
            .applications
            .get(name)
            .map(|a| a.detail.clone())
    }

    pub fn set_status(&self, name: &str, status: ApplicationStatus) {
        let mut state = self.state.lock().unwrap();
        let stored = state.applications.get_mut(name).unwrap();
        stored.detail.application_status = status;
        stored.settle = None;
    }

    pub fn remove_application(&self, name: &str) {
        self.state.lock().unwrap().applications.remove(name);
    }

    pub fn snapshot(&self, application_name: &str, snapshot_name: &str) -> Option<SnapshotDetail> {
        self.state
            .lock()
            .unwrap()
            .snapshots
            .get(&(application_name.to_string(), snapshot_name.to_string()))
            .map(|s| s.detail.clone())
    }

    pub fn remove_snapshot(&self, application_name: &str, snapshot_name: &str) {
        self.state
            .lock()
            .unwrap()
            .snapshots
            .remove(&(application_name.to_string(), snapshot_name.to_string()));
    }

    pub fn tags(&self, name: &str) -> BTreeMap<String, String> {
        self.state
            .lock()
            .unwrap()
            .tags
            .get(&application_arn(name))
            .cloned()
            .unwrap_or_default()
    }
}

fn assign_ids(state: &mut State, configuration: &mut ApplicationConfiguration) {
    if let Some(sql) = configuration.sql_application_configuration.as_mut() {
        if let Some(input) = sql.input.as_mut() {
            input.input_id = Some(state.next_id());
            input.in_app_stream_names = vec![format!("{}_001", input.name_prefix)];
        }
        for output in &mut sql.outputs {
            output.output_id = Some(state.next_id());
        }
        if let Some(reference) = sql.reference_data_source.as_mut() {
            reference.reference_id = Some(state.next_id());
        }
    }
}

/// Values the service reports even when they were never sent
fn fill_service_defaults(runtime: RuntimeEnvironment, configuration: &mut ApplicationConfiguration) {
    if let Some(input) = configuration
        .sql_application_configuration
        .as_mut()
        .and_then(|s| s.input.as_mut())
    {
        let parallelism = input.input_parallelism.get_or_insert_with(InputParallelism::default);
        parallelism.count.get_or_insert(1);
    }
    if let Some(flink) = configuration.flink_application_configuration.as_mut() {
        if let Some(c) = flink
            .checkpoint_configuration
            .as_mut()
            .filter(|c| c.configuration_type == ConfigurationType::Custom)
        {
            c.checkpointing_enabled.get_or_insert(true);
            c.checkpoint_interval.get_or_insert(60_000);
            c.min_pause_between_checkpoints.get_or_insert(5_000);
        }
        if let Some(p) = flink
            .parallelism_configuration
            .as_mut()
            .filter(|p| p.configuration_type == ConfigurationType::Custom)
        {
            p.auto_scaling_enabled.get_or_insert(false);
            p.parallelism.get_or_insert(1);
            p.parallelism_per_kpu.get_or_insert(1);
        }
    }
    if runtime.is_flink() {
        let run = configuration.run_configuration.get_or_insert_with(RunConfiguration::default);
        run.application_restore_configuration
            .get_or_insert_with(ApplicationRestoreConfiguration::default)
            .application_restore_type
            .get_or_insert(ApplicationRestoreType::RestoreFromLatestSnapshot);
        run.flink_run_configuration
            .get_or_insert_with(FlinkRunConfiguration::default)
            .allow_non_restored_state
            .get_or_insert(false);
    }
}

fn merge_flink(current: Option<FlinkApplicationConfiguration>, update: &FlinkApplicationConfiguration) -> FlinkApplicationConfiguration {
    let current = current.unwrap_or_default();
    FlinkApplicationConfiguration {
        checkpoint_configuration: update
            .checkpoint_configuration
            .clone()
            .or(current.checkpoint_configuration),
        monitoring_configuration: update
            .monitoring_configuration
            .clone()
            .or(current.monitoring_configuration),
        parallelism_configuration: update
            .parallelism_configuration
            .clone()
            .or(current.parallelism_configuration),
    }
}

fn run_configuration(start: &StartRunConfiguration) -> RunConfiguration {
    RunConfiguration {
        application_restore_configuration: start.application_restore_configuration.clone(),
        flink_run_configuration: start.flink_run_configuration.clone(),
    }
}

/// Apply one configuration call to the stored detail
fn apply(state: &mut State, detail: &mut ApplicationDetail, update: &ApplicationUpdate) -> RemoteResult<()> {
    let missing = |what: &str| RemoteError::invalid_argument(format!("{what} does not exist"));
    let mut configuration = detail.application_configuration.clone().unwrap_or_default();
    match update {
        ApplicationUpdate::Code(code) => configuration.application_code_configuration = Some(code.clone()),
        ApplicationUpdate::SnapshotConfiguration(s) => {
            configuration.application_snapshot_configuration = Some(s.clone());
        }
        ApplicationUpdate::EnvironmentProperties(e) => {
            configuration.environment_properties = (!e.property_groups.is_empty()).then(|| e.clone());
        }
        ApplicationUpdate::Flink(f) => {
            configuration.flink_application_configuration =
                Some(merge_flink(configuration.flink_application_configuration.take(), f));
        }
        ApplicationUpdate::AddInput(input) => {
            let sql = configuration.sql_application_configuration.get_or_insert_with(Default::default);
            if sql.input.is_some() {
                return Err(RemoteError::invalid_argument("application already has an input"));
            }
            let mut input = input.clone();
            input.input_id = Some(state.next_id());
            input.in_app_stream_names = vec![format!("{}_001", input.name_prefix)];
            sql.input = Some(input);
        }
        ApplicationUpdate::UpdateInput(u) => {
            let input = configuration
                .sql_application_configuration
                .as_mut()
                .and_then(|s| s.input.as_mut())
                .filter(|i| i.input_id.as_deref() == Some(u.input_id.as_str()))
                .ok_or_else(|| missing("input"))?;
            if let Some(prefix) = &u.name_prefix {
                input.name_prefix.clone_from(prefix);
            }
            if let Some(schema) = &u.input_schema {
                input.input_schema = schema.clone();
            }
            if u.input_parallelism.is_some() {
                input.input_parallelism.clone_from(&u.input_parallelism);
            }
            if u.kinesis_streams_input.is_some() {
                input.kinesis_streams_input.clone_from(&u.kinesis_streams_input);
                input.kinesis_firehose_input = None;
            }
            if u.kinesis_firehose_input.is_some() {
                input.kinesis_firehose_input.clone_from(&u.kinesis_firehose_input);
                input.kinesis_streams_input = None;
            }
            if u.input_processing_configuration.is_some() {
                if input.input_processing_configuration.is_none() {
                    return Err(RemoteError::invalid_argument("input has no processing configuration to update"));
                }
                input
                    .input_processing_configuration
                    .clone_from(&u.input_processing_configuration);
            }
        }
        ApplicationUpdate::AddInputProcessingConfiguration { input_id, configuration: processing } => {
            let input = configuration
                .sql_application_configuration
                .as_mut()
                .and_then(|s| s.input.as_mut())
                .filter(|i| i.input_id.as_deref() == Some(input_id.as_str()))
                .ok_or_else(|| missing("input"))?;
            input.input_processing_configuration = Some(processing.clone());
        }
        ApplicationUpdate::DeleteInputProcessingConfiguration { input_id } => {
            let input = configuration
                .sql_application_configuration
                .as_mut()
                .and_then(|s| s.input.as_mut())
                .filter(|i| i.input_id.as_deref() == Some(input_id.as_str()))
                .ok_or_else(|| missing("input"))?;
            input.input_processing_configuration = None;
        }
        ApplicationUpdate::AddOutput(output) => {
            let mut output = output.clone();
            output.output_id = Some(state.next_id());
            configuration
                .sql_application_configuration
                .get_or_insert_with(Default::default)
                .outputs
                .push(output);
        }
        ApplicationUpdate::DeleteOutput { output_id } => {
            let sql = configuration
                .sql_application_configuration
                .as_mut()
                .ok_or_else(|| missing("output"))?;
            let before = sql.outputs.len();
            sql.outputs.retain(|o| o.output_id.as_deref() != Some(output_id.as_str()));
            if sql.outputs.len() == before {
                return Err(missing("output"));
            }
        }
        ApplicationUpdate::AddReferenceDataSource(source) => {
            let mut source = source.clone();
            source.reference_id = Some(state.next_id());
            configuration
                .sql_application_configuration
                .get_or_insert_with(Default::default)
                .reference_data_source = Some(source);
        }
        ApplicationUpdate::UpdateReferenceDataSource { reference_id, source } => {
            let sql = configuration
                .sql_application_configuration
                .as_mut()
                .ok_or_else(|| missing("reference data source"))?;
            let mut source = source.clone();
            source.reference_id = Some(reference_id.clone());
            sql.reference_data_source = Some(source);
        }
        ApplicationUpdate::DeleteReferenceDataSource { .. } => {
            if let Some(sql) = configuration.sql_application_configuration.as_mut() {
                sql.reference_data_source = None;
            }
        }
        ApplicationUpdate::AddVpcConfiguration(vpc) => {
            let mut vpc = vpc.clone();
            vpc.vpc_configuration_id = Some(state.next_id());
            vpc.vpc_id = Some("vpc-0123456789abcdef0".to_string());
            configuration.vpc_configuration = Some(vpc);
        }
        ApplicationUpdate::UpdateVpcConfiguration { vpc_configuration_id, configuration: vpc } => {
            let mut vpc = vpc.clone();
            vpc.vpc_configuration_id = Some(vpc_configuration_id.clone());
            vpc.vpc_id = Some("vpc-0123456789abcdef0".to_string());
            configuration.vpc_configuration = Some(vpc);
        }
        ApplicationUpdate::DeleteVpcConfiguration { .. } => configuration.vpc_configuration = None,
        ApplicationUpdate::RunConfiguration(start) => {
            configuration.run_configuration = Some(run_configuration(start));
        }
        ApplicationUpdate::AddCloudWatchLoggingOption { log_stream_arn } => {
            detail.cloudwatch_logging_options = vec![CloudWatchLoggingOption {
                log_stream_arn: log_stream_arn.clone(),
                cloudwatch_logging_option_id: Some(state.next_id()),
            }];
        }
        ApplicationUpdate::UpdateCloudWatchLoggingOption { cloudwatch_logging_option_id, log_stream_arn } => {
            detail.cloudwatch_logging_options = vec![CloudWatchLoggingOption {
                log_stream_arn: log_stream_arn.clone(),
                cloudwatch_logging_option_id: Some(cloudwatch_logging_option_id.clone()),
            }];
        }
        ApplicationUpdate::DeleteCloudWatchLoggingOption { .. } => detail.cloudwatch_logging_options.clear(),
        ApplicationUpdate::ServiceExecutionRole(role) => detail.service_execution_role = Some(role.clone()),
    }
    fill_service_defaults(detail.runtime_environment, &mut configuration);
    detail.application_configuration = Some(configuration);
    Ok(())
}

/// Calls that report an operation id to wait on
fn reports_operation(update: &ApplicationUpdate) -> bool {
    matches!(
        update,
        ApplicationUpdate::AddVpcConfiguration(_)
            | ApplicationUpdate::DeleteVpcConfiguration { .. }
            | ApplicationUpdate::AddCloudWatchLoggingOption { .. }
            | ApplicationUpdate::DeleteCloudWatchLoggingOption { .. }
    ) || update.operation() == "UpdateApplication"
}

#[async_trait]
impl KinesisAnalyticsApi for FakeKinesisAnalytics {
    async fn describe_application(&self, application_name: &str) -> RemoteResult<ApplicationDetail> {
        let mut state = self.state.lock().unwrap();
        state.record("DescribeApplication", application_name, None, None);
        if let Some(e) = state.scripted_error("DescribeApplication") {
            return Err(e);
        }
        let stored = state.application(application_name)?;
        let detail = stored.detail.clone();
        match stored.settle.take() {
            Some(Settle::To(status)) => stored.detail.application_status = status,
            Some(Settle::Gone) => {
                state.applications.remove(application_name);
            }
            None => {}
        }
        Ok(detail)
    }

    async fn create_application(&self, request: &CreateApplicationRequest) -> RemoteResult<ApplicationDetail> {
        let mut state = self.state.lock().unwrap();
        state.record("CreateApplication", &request.application_name, None, None);
        if let Some(e) = state.scripted_error("CreateApplication") {
            return Err(e);
        }
        if state.applications.contains_key(&request.application_name) {
            return Err(resource_in_use(format!(
                "Application {} already exists",
                request.application_name
            )));
        }

        let mut configuration = request.application_configuration.clone();
        if let Some(c) = configuration.as_mut() {
            assign_ids(&mut state, c);
            fill_service_defaults(request.runtime_environment, c);
        }
        let cloudwatch_logging_options = request
            .cloudwatch_logging_options
            .iter()
            .map(|arn| CloudWatchLoggingOption {
                log_stream_arn: arn.clone(),
                cloudwatch_logging_option_id: Some(state.next_id()),
            })
            .collect();
        let arn = application_arn(&request.application_name);
        let now = state.now();
        let detail = ApplicationDetail {
            application_arn: arn.clone(),
            application_name: request.application_name.clone(),
            application_description: Some(request.application_description.clone().unwrap_or_default()),
            runtime_environment: request.runtime_environment,
            service_execution_role: Some(request.service_execution_role.clone()),
            application_status: ApplicationStatus::Ready,
            application_version_id: 1,
            application_mode: request.application_mode,
            create_timestamp: Some(now),
            last_update_timestamp: None,
            application_configuration: configuration,
            cloudwatch_logging_options,
            maintenance_configuration: Some(MaintenanceConfigurationDescription {
                application_maintenance_window_start_time: DEFAULT_WINDOW_START.to_string(),
                application_maintenance_window_end_time: end_of_window(DEFAULT_WINDOW_START),
            }),
        };
        state.tags.insert(arn, request.tags.clone());
        state.applications.insert(
            request.application_name.clone(),
            StoredApplication {
                detail: detail.clone(),
                settle: None,
            },
        );
        Ok(detail)
    }

    async fn update_application(
        &self,
        application_name: &str,
        current_version_id: i64,
        update: &ApplicationUpdate,
    ) -> RemoteResult<UpdateOutput> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        let operation = update.operation();
        state.record(operation, application_name, Some(current_version_id), Some(update));
        if let Some(e) = state.scripted_error(operation) {
            return Err(e);
        }

        let mut stored = state
            .applications
            .remove(application_name)
            .ok_or_else(|| RemoteError::not_found(format!("Application {application_name} is not found")))?;
        let result = (|| {
            if !stored.detail.application_status.is_stable() {
                return Err(resource_in_use(format!(
                    "Application {application_name} is in {} status",
                    stored.detail.application_status
                )));
            }
            if stored.detail.application_version_id != current_version_id {
                return Err(RemoteError::from_code(
                    "ConcurrentModificationException",
                    format!(
                        "Current application version {} does not match {current_version_id}",
                        stored.detail.application_version_id
                    ),
                ));
            }
            apply(state, &mut stored.detail, update)?;
            stored.detail.application_version_id += 1;
            stored.detail.last_update_timestamp = Some(state.now());
            stored.settle = Some(Settle::To(stored.detail.application_status));
            stored.detail.application_status = ApplicationStatus::Updating;
            let operation_id = reports_operation(update).then(|| state.operation(operation));
            Ok(UpdateOutput {
                application_version_id: Some(stored.detail.application_version_id),
                operation_id,
            })
        })();
        state.applications.insert(application_name.to_string(), stored);
        result
    }

    async fn start_application(
        &self,
        application_name: &str,
        run_configuration: &StartRunConfiguration,
    ) -> RemoteResult<Option<String>> {
        let mut state = self.state.lock().unwrap();
        state.record("StartApplication", application_name, None, None);
        state.calls.last_mut().unwrap().update =
            Some(ApplicationUpdate::RunConfiguration(run_configuration.clone()));
        if let Some(e) = state.scripted_error("StartApplication") {
            return Err(e);
        }
        let stored = state.application(application_name)?;
        if stored.detail.application_status != ApplicationStatus::Ready {
            let status = stored.detail.application_status;
            return Err(resource_in_use(format!("Application {application_name} is in {status} status")));
        }
        stored.detail.application_status = ApplicationStatus::Starting;
        stored.settle = Some(Settle::To(ApplicationStatus::Running));
        if run_configuration.application_restore_configuration.is_some()
            || run_configuration.flink_run_configuration.is_some()
        {
            stored
                .detail
                .application_configuration
                .get_or_insert_with(Default::default)
                .run_configuration = Some(self::run_configuration(run_configuration));
        }
        let runtime = stored.detail.runtime_environment;
        if let Some(c) = stored.detail.application_configuration.as_mut() {
            fill_service_defaults(runtime, c);
        }
        Ok(Some(state.operation("StartApplication")))
    }

    async fn stop_application(&self, application_name: &str, force: bool) -> RemoteResult<Option<String>> {
        let mut state = self.state.lock().unwrap();
        state.record("StopApplication", application_name, None, None);
        if let Some(e) = state.scripted_error("StopApplication") {
            return Err(e);
        }
        let stored = state.application(application_name)?;
        if stored.detail.application_status != ApplicationStatus::Running {
            let status = stored.detail.application_status;
            return Err(resource_in_use(format!("Application {application_name} is in {status} status")));
        }
        stored.detail.application_status = if force {
            ApplicationStatus::ForceStopping
        } else {
            ApplicationStatus::Stopping
        };
        stored.settle = Some(Settle::To(ApplicationStatus::Ready));
        Ok(Some(state.operation("StopApplication")))
    }

    async fn delete_application(&self, application_name: &str, create_timestamp: DateTime<Utc>) -> RemoteResult<()> {
        let mut state = self.state.lock().unwrap();
        state.record("DeleteApplication", application_name, None, None);
        if let Some(e) = state.scripted_error("DeleteApplication") {
            return Err(e);
        }
        let stored = state.application(application_name)?;
        if stored.detail.create_timestamp != Some(create_timestamp) {
            return Err(RemoteError::invalid_argument("Create timestamp does not match"));
        }
        if stored.detail.application_status == ApplicationStatus::Running {
            return Err(resource_in_use("Application is RUNNING"));
        }
        stored.detail.application_status = ApplicationStatus::Deleting;
        stored.settle = Some(Settle::Gone);
        Ok(())
    }

    async fn describe_application_operation(
        &self,
        application_name: &str,
        operation_id: &str,
    ) -> RemoteResult<OperationDetail> {
        let mut state = self.state.lock().unwrap();
        state.record("DescribeApplicationOperation", application_name, None, None);
        if let Some(e) = state.scripted_error("DescribeApplicationOperation") {
            return Err(e);
        }
        state
            .operations
            .get(operation_id)
            .cloned()
            .ok_or_else(|| RemoteError::not_found(format!("Operation {operation_id} not found")))
    }

    async fn update_maintenance_configuration(
        &self,
        application_name: &str,
        start_time: &str,
    ) -> RemoteResult<MaintenanceConfigurationDescription> {
        let mut state = self.state.lock().unwrap();
        state.record("UpdateApplicationMaintenanceConfiguration", application_name, None, None);
        if let Some(e) = state.scripted_error("UpdateApplicationMaintenanceConfiguration") {
            return Err(e);
        }
        let stored = state.application(application_name)?;
        let window = MaintenanceConfigurationDescription {
            application_maintenance_window_start_time: start_time.to_string(),
            application_maintenance_window_end_time: end_of_window(start_time),
        };
        stored.detail.maintenance_configuration = Some(window.clone());
        Ok(window)
    }

    async fn list_tags(&self, resource_arn: &str) -> RemoteResult<BTreeMap<String, String>> {
        let mut state = self.state.lock().unwrap();
        state.record("ListTagsForResource", resource_arn, None, None);
        if let Some(e) = state.scripted_error("ListTagsForResource") {
            return Err(e);
        }
        Ok(state.tags.get(resource_arn).cloned().unwrap_or_default())
    }

    async fn tag_resource(&self, resource_arn: &str, tags: &BTreeMap<String, String>) -> RemoteResult<()> {
        let mut state = self.state.lock().unwrap();
        state.record("TagResource", resource_arn, None, None);
        if let Some(e) = state.scripted_error("TagResource") {
            return Err(e);
        }
        state
            .tags
            .entry(resource_arn.to_string())
            .or_default()
            .extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }

    async fn untag_resource(&self, resource_arn: &str, tag_keys: &[String]) -> RemoteResult<()> {
        let mut state = self.state.lock().unwrap();
        state.record("UntagResource", resource_arn, None, None);
        if let Some(e) = state.scripted_error("UntagResource") {
            return Err(e);
        }
        if let Some(tags) = state.tags.get_mut(resource_arn) {
            tags.retain(|k, _| !tag_keys.contains(k));
        }
        Ok(())
    }

    async fn create_application_snapshot(&self, application_name: &str, snapshot_name: &str) -> RemoteResult<()> {
        let mut state = self.state.lock().unwrap();
        state.record("CreateApplicationSnapshot", application_name, None, None);
        if let Some(e) = state.scripted_error("CreateApplicationSnapshot") {
            return Err(e);
        }
        let stored = state.application(application_name)?;
        if !stored.detail.application_status.is_stable() {
            return Err(resource_in_use("Application is not READY or RUNNING"));
        }
        let version = stored.detail.application_version_id;
        let key = (application_name.to_string(), snapshot_name.to_string());
        if state.snapshots.contains_key(&key) {
            return Err(resource_in_use(format!("Snapshot {snapshot_name} already exists")));
        }
        let now = state.now();
        state.snapshots.insert(
            key,
            StoredSnapshot {
                detail: SnapshotDetail {
                    snapshot_name: snapshot_name.to_string(),
                    snapshot_status: SnapshotStatus::Creating,
                    application_version_id: version,
                    snapshot_creation_timestamp: Some(now),
                },
                settle: Some(Some(SnapshotStatus::Ready)),
            },
        );
        Ok(())
    }

    async fn describe_application_snapshot(
        &self,
        application_name: &str,
        snapshot_name: &str,
    ) -> RemoteResult<SnapshotDetail> {
        let mut state = self.state.lock().unwrap();
        state.record("DescribeApplicationSnapshot", application_name, None, None);
        if let Some(e) = state.scripted_error("DescribeApplicationSnapshot") {
            return Err(e);
        }
        let key = (application_name.to_string(), snapshot_name.to_string());
        let stored = state
            .snapshots
            .get_mut(&key)
            .ok_or_else(|| RemoteError::not_found(format!("Snapshot {snapshot_name} not found")))?;
        let detail = stored.detail.clone();
        match stored.settle.take() {
            Some(Some(status)) => stored.detail.snapshot_status = status,
            Some(None) => {
                state.snapshots.remove(&key);
            }
            None => {}
        }
        Ok(detail)
    }

    async fn delete_application_snapshot(
        &self,
        application_name: &str,
        snapshot_name: &str,
        snapshot_creation_timestamp: DateTime<Utc>,
    ) -> RemoteResult<()> {
        let mut state = self.state.lock().unwrap();
        state.record("DeleteApplicationSnapshot", application_name, None, None);
        if let Some(e) = state.scripted_error("DeleteApplicationSnapshot") {
            return Err(e);
        }
        let key = (application_name.to_string(), snapshot_name.to_string());
        let stored = state
            .snapshots
            .get_mut(&key)
            .ok_or_else(|| RemoteError::not_found(format!("Snapshot {snapshot_name} not found")))?;
        if stored.detail.snapshot_creation_timestamp != Some(snapshot_creation_timestamp) {
            return Err(RemoteError::new(
                RemoteErrorKind::InvalidArgument,
                "Snapshot creation timestamp does not match",
            ));
        }
        stored.detail.snapshot_status = SnapshotStatus::Deleting;
        stored.settle = Some(None);
        Ok(())
    }
}
