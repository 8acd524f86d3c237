//! # Application Reconciler Tests
//!
//! Drive the application lifecycle against the in-memory control plane:
//! - create, with the follow-up VPC call and IAM propagation retries
//! - update ordering (stop, versioned updates, tags, start)
//! - replacement-only changes failing before any mutation
//! - read, import and delete, including absence

mod common;

use common::{
    application_arn, flink_application, property_group, test_config, text_code,
    FakeKinesisAnalytics, ROLE,
};
use kinesis_analytics_controller::constants::IAM_PROPAGATION_MESSAGES;
use kinesis_analytics_controller::error::RemoteError;
use kinesis_analytics_controller::model::{
    Application, ApplicationStatus, ConfigurationType, EnvironmentProperties,
    FlinkApplicationConfiguration, FlinkRunConfiguration, ParallelismConfiguration,
    RunConfiguration, RuntimeEnvironment, VpcConfiguration,
};
use kinesis_analytics_controller::provider::ApplicationUpdate;
use kinesis_analytics_controller::{ApplicationReconciler, Error, OperationContext, ResourceHandler};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn setup() -> (Arc<FakeKinesisAnalytics>, ApplicationReconciler) {
    let api = Arc::new(FakeKinesisAnalytics::new());
    let reconciler = ApplicationReconciler::new(api.clone(), test_config());
    (api, reconciler)
}

/// Create `declared` and forget the calls that took
async fn created(
    api: &FakeKinesisAnalytics,
    reconciler: &ApplicationReconciler,
    declared: &Application,
) -> Application {
    let state = reconciler
        .create(declared, &OperationContext::default())
        .await
        .unwrap();
    api.clear_calls();
    state
}

#[tokio::test(start_paused = true)]
async fn test_create_returns_version_one() {
    let (api, reconciler) = setup();
    let declared = flink_application("orders");

    let state = reconciler
        .create(&declared, &OperationContext::default())
        .await
        .unwrap();

    assert_eq!(state.version_id, Some(1));
    assert_eq!(state.status, Some(ApplicationStatus::Ready));
    assert_eq!(state.arn.as_deref(), Some(application_arn("orders").as_str()));
    assert!(state.create_timestamp.is_some());
    assert_eq!(api.mutation_names(), vec!["CreateApplication"]);
}

#[tokio::test(start_paused = true)]
async fn test_create_with_start_leaves_application_running() {
    let (api, reconciler) = setup();
    let mut declared = flink_application("orders");
    declared.start_application = true;

    let state = reconciler
        .create(&declared, &OperationContext::default())
        .await
        .unwrap();

    assert_eq!(state.status, Some(ApplicationStatus::Running));
    assert!(state.start_application);
    assert_eq!(api.mutation_names(), vec!["CreateApplication", "StartApplication"]);
}

#[tokio::test(start_paused = true)]
async fn test_create_adds_vpc_configuration_after_create() {
    let (api, reconciler) = setup();
    let mut declared = flink_application("orders");
    if let Some(config) = declared.application_configuration.as_mut() {
        config.vpc_configuration = Some(VpcConfiguration {
            subnet_ids: ["subnet-0a".to_string(), "subnet-0b".to_string()].into(),
            security_group_ids: ["sg-01".to_string()].into(),
            ..VpcConfiguration::default()
        });
    }

    let state = reconciler
        .create(&declared, &OperationContext::default())
        .await
        .unwrap();

    assert_eq!(
        api.mutation_names(),
        vec!["CreateApplication", "AddApplicationVpcConfiguration"]
    );
    let vpc_calls = api.calls_to("AddApplicationVpcConfiguration");
    assert_eq!(vpc_calls[0].version_id, Some(1));
    assert_eq!(state.version_id, Some(2));
    let vpc = state
        .application_configuration
        .and_then(|c| c.vpc_configuration)
        .unwrap();
    assert!(vpc.vpc_configuration_id.is_some());
    assert_eq!(vpc.subnet_ids.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_create_retries_iam_propagation_errors() {
    let (api, reconciler) = setup();
    api.fail_next(
        "CreateApplication",
        RemoteError::invalid_argument(format!(
            "{} to write to the stream",
            IAM_PROPAGATION_MESSAGES[0]
        )),
    );

    let state = reconciler
        .create(&flink_application("orders"), &OperationContext::default())
        .await
        .unwrap();

    assert_eq!(state.version_id, Some(1));
    assert_eq!(api.calls_to("CreateApplication").len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_create_does_not_retry_other_errors() {
    let (api, reconciler) = setup();
    api.fail_next(
        "CreateApplication",
        RemoteError::from_code("LimitExceededException", "too many applications"),
    );

    let err = reconciler
        .create(&flink_application("orders"), &OperationContext::default())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("creating Kinesis Analytics v2 Application (orders)"));
    assert_eq!(api.calls_to("CreateApplication").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_create_rejects_invalid_name_before_any_call() {
    let (api, reconciler) = setup();
    let declared = Application::new("orders stream", RuntimeEnvironment::Flink120, ROLE);

    let err = reconciler
        .create(&declared, &OperationContext::default())
        .await
        .unwrap_err();

    assert!(matches!(err.root(), Error::Validation(_)));
    assert!(api.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_context_makes_no_create_call() {
    let (api, reconciler) = setup();
    let token = CancellationToken::new();
    token.cancel();

    let err = reconciler
        .create(&flink_application("orders"), &OperationContext::with_cancellation(token))
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(api.calls_to("CreateApplication").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_update_rereads_version_before_each_call() {
    let (api, reconciler) = setup();
    let state = created(&api, &reconciler, &flink_application("orders")).await;

    let mut declared = state.clone();
    if let Some(config) = declared.application_configuration.as_mut() {
        config.application_code_configuration = Some(text_code("SELECT 2"));
        config.environment_properties = Some(EnvironmentProperties {
            property_groups: vec![property_group("ConsumerConfig", &[("flink.stream.initpos", "TRIM_HORIZON")])],
        });
    }

    let updated = reconciler
        .update(&declared, &OperationContext::default())
        .await
        .unwrap();

    let calls = api.calls_to("UpdateApplication");
    let versions: Vec<_> = calls.iter().map(|c| c.version_id).collect();
    assert_eq!(versions, vec![Some(1), Some(2)]);
    assert!(matches!(calls[0].update, Some(ApplicationUpdate::Code(_))));
    assert!(matches!(calls[1].update, Some(ApplicationUpdate::EnvironmentProperties(_))));
    assert_eq!(updated.version_id, Some(3));
    assert_eq!(updated.status, Some(ApplicationStatus::Ready));
}

#[tokio::test(start_paused = true)]
async fn test_update_without_changes_makes_no_calls() {
    let (api, reconciler) = setup();
    let state = created(&api, &reconciler, &flink_application("orders")).await;

    let updated = reconciler
        .update(&state, &OperationContext::default())
        .await
        .unwrap();

    assert!(api.mutations().is_empty());
    assert_eq!(updated.version_id, Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_update_stops_before_applying_changes() {
    let (api, reconciler) = setup();
    let mut declared = flink_application("orders");
    declared.start_application = true;
    let state = created(&api, &reconciler, &declared).await;
    assert_eq!(state.status, Some(ApplicationStatus::Running));

    let mut declared = state.clone();
    declared.start_application = false;
    if let Some(config) = declared.application_configuration.as_mut() {
        config.application_code_configuration = Some(text_code("SELECT 2"));
    }

    let updated = reconciler
        .update(&declared, &OperationContext::default())
        .await
        .unwrap();

    assert_eq!(api.mutation_names(), vec!["StopApplication", "UpdateApplication"]);
    assert_eq!(updated.status, Some(ApplicationStatus::Ready));
}

#[tokio::test(start_paused = true)]
async fn test_update_starts_after_applying_changes() {
    let (api, reconciler) = setup();
    let state = created(&api, &reconciler, &flink_application("orders")).await;

    let mut declared = state.clone();
    declared.start_application = true;
    if let Some(config) = declared.application_configuration.as_mut() {
        config.application_code_configuration = Some(text_code("SELECT 2"));
    }

    let updated = reconciler
        .update(&declared, &OperationContext::default())
        .await
        .unwrap();

    assert_eq!(api.mutation_names(), vec!["UpdateApplication", "StartApplication"]);
    assert_eq!(updated.status, Some(ApplicationStatus::Running));
    assert_eq!(updated.version_id, Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_runtime_change_requires_replacement_without_mutation() {
    let (api, reconciler) = setup();
    let state = created(&api, &reconciler, &flink_application("orders")).await;

    let mut declared = state.clone();
    declared.runtime_environment = RuntimeEnvironment::Flink119;
    if let Some(config) = declared.application_configuration.as_mut() {
        config.application_code_configuration = Some(text_code("SELECT 2"));
    }

    let err = reconciler
        .update(&declared, &OperationContext::default())
        .await
        .unwrap_err();

    assert!(matches!(err.root(), Error::RequiresReplacement { .. }));
    assert!(api.mutations().is_empty());
    assert_eq!(api.application("orders").unwrap().application_version_id, 1);
}

#[tokio::test(start_paused = true)]
async fn test_replacement_is_reported_as_diagnostic() {
    let (_api, reconciler) = setup();
    let ctx = OperationContext::default();
    let state = ResourceHandler::create(&reconciler, &flink_application("orders"), &ctx)
        .await
        .unwrap();

    let mut declared = state.clone();
    declared.description = Some("order enrichment".to_string());
    let diagnostics = ResourceHandler::update(&reconciler, &state, &declared, &ctx)
        .await
        .unwrap_err();

    assert!(diagnostics.has_errors());
    let diagnostic = &diagnostics.0[0];
    assert!(diagnostic.summary.contains("requires replacement"));
    assert!(diagnostic.summary.contains("description changed"));
}

#[tokio::test(start_paused = true)]
async fn test_tag_changes_do_not_bump_version() {
    let (api, reconciler) = setup();
    let mut declared = flink_application("orders");
    declared.tags.insert("env".to_string(), "dev".to_string());
    let state = created(&api, &reconciler, &declared).await;

    let mut declared = state.clone();
    declared.tags.clear();
    declared.tags.insert("team".to_string(), "data".to_string());

    let updated = reconciler
        .update(&declared, &OperationContext::default())
        .await
        .unwrap();

    assert_eq!(api.mutation_names(), vec!["UntagResource", "TagResource"]);
    assert_eq!(updated.version_id, Some(1));
    assert_eq!(updated.tags, declared.tags);
    assert_eq!(api.tags("orders"), declared.tags);
}

#[tokio::test(start_paused = true)]
async fn test_role_change_is_an_update() {
    let (api, reconciler) = setup();
    let state = created(&api, &reconciler, &flink_application("orders")).await;

    let mut declared = state.clone();
    declared.service_execution_role = common::OTHER_ROLE.to_string();
    let updated = reconciler
        .update(&declared, &OperationContext::default())
        .await
        .unwrap();

    assert_eq!(updated.service_execution_role, common::OTHER_ROLE);
    assert_eq!(updated.version_id, Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_read_missing_application_is_none() {
    let (_api, reconciler) = setup();

    let state = reconciler
        .read("missing", None, &OperationContext::default())
        .await
        .unwrap();

    assert!(state.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_read_keeps_declared_flags() {
    let (api, reconciler) = setup();
    let mut declared = flink_application("orders");
    declared.force_stop = true;
    let state = created(&api, &reconciler, &declared).await;

    let read = reconciler
        .read("orders", Some(&state), &OperationContext::default())
        .await
        .unwrap()
        .unwrap();

    assert!(read.force_stop);
    assert_eq!(read, state);
}

#[tokio::test(start_paused = true)]
async fn test_import_by_arn() {
    let (api, reconciler) = setup();
    let mut declared = flink_application("orders");
    declared.start_application = true;
    created(&api, &reconciler, &declared).await;

    let imported = reconciler
        .import(&application_arn("orders"), &OperationContext::default())
        .await
        .unwrap();

    assert_eq!(imported.name, "orders");
    assert!(imported.start_application);
    assert_eq!(imported.runtime_environment, RuntimeEnvironment::Flink120);
}

#[tokio::test(start_paused = true)]
async fn test_import_unknown_application_is_not_found() {
    let (_api, reconciler) = setup();

    let err = reconciler
        .import("missing", &OperationContext::default())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test(start_paused = true)]
async fn test_import_rejects_non_application_arn() {
    let (api, reconciler) = setup();

    let err = reconciler
        .import(
            "arn:aws:kinesisanalytics:us-east-1:123456789012:stream/orders",
            &OperationContext::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidIdentifier { .. }));
    assert!(api.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_delete_stops_running_application_first() {
    let (api, reconciler) = setup();
    let mut declared = flink_application("orders");
    declared.start_application = true;
    let state = created(&api, &reconciler, &declared).await;

    reconciler
        .delete(&state, &OperationContext::default())
        .await
        .unwrap();

    assert_eq!(api.mutation_names(), vec!["StopApplication", "DeleteApplication"]);
    assert!(api.application("orders").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_delete_missing_application_succeeds() {
    let (api, reconciler) = setup();
    let state = created(&api, &reconciler, &flink_application("orders")).await;
    api.remove_application("orders");

    reconciler
        .delete(&state, &OperationContext::default())
        .await
        .unwrap();

    assert!(api.calls_to("DeleteApplication").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_update_while_autoscaling_is_rejected_by_remote() {
    let (api, reconciler) = setup();
    let state = created(&api, &reconciler, &flink_application("orders")).await;
    api.set_status("orders", ApplicationStatus::Autoscaling);

    let mut declared = state.clone();
    if let Some(config) = declared.application_configuration.as_mut() {
        config.application_code_configuration = Some(text_code("SELECT 2"));
    }
    let err = reconciler
        .update(&declared, &OperationContext::default())
        .await
        .unwrap_err();

    assert!(err.remote().is_some_and(|e| e.code.as_deref() == Some("ResourceInUseException")));
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_declaration_ignores_service_defaults() {
    let (api, reconciler) = setup();
    let mut declared = flink_application("orders");
    declared.start_application = true;
    if let Some(config) = declared.application_configuration.as_mut() {
        config.flink_application_configuration = Some(FlinkApplicationConfiguration {
            checkpoint_configuration: None,
            monitoring_configuration: None,
            parallelism_configuration: Some(ParallelismConfiguration {
                configuration_type: ConfigurationType::Custom,
                auto_scaling_enabled: None,
                parallelism: Some(4),
                parallelism_per_kpu: None,
            }),
        });
        config.run_configuration = Some(RunConfiguration {
            application_restore_configuration: None,
            flink_run_configuration: Some(FlinkRunConfiguration::default()),
        });
    }
    let state = created(&api, &reconciler, &declared).await;
    assert_eq!(state.status, Some(ApplicationStatus::Running));

    let updated = reconciler
        .update(&declared, &OperationContext::default())
        .await
        .unwrap();

    assert!(api.mutations().is_empty());
    assert_eq!(updated.version_id, state.version_id);
    assert_eq!(updated.status, Some(ApplicationStatus::Running));
}
