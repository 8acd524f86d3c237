//! Declared state to remote request shapes.

use crate::model::{Application, ApplicationConfiguration, FlinkApplicationConfiguration};
use crate::provider::{ApplicationDetail, CreateApplicationRequest, SqlRunConfiguration, StartRunConfiguration};

/// `CreateApplication` request
///
/// VPC and run configuration are left out: the first is added by a follow-up
/// update, the second only applies when the application is started.
#[must_use]
pub fn create_request(app: &Application) -> CreateApplicationRequest {
    let application_configuration = app.application_configuration.as_ref().map(|c| {
        let c = c.definition();
        ApplicationConfiguration {
            flink_application_configuration: c
                .flink_application_configuration
                .as_ref()
                .map(FlinkApplicationConfiguration::effective),
            vpc_configuration: None,
            run_configuration: None,
            ..c
        }
    });

    CreateApplicationRequest {
        application_name: app.name.clone(),
        application_description: app.description.clone(),
        runtime_environment: app.runtime_environment,
        service_execution_role: app.service_execution_role.clone(),
        application_mode: app.application_mode,
        application_configuration,
        cloudwatch_logging_options: app
            .cloudwatch_logging_options
            .iter()
            .map(|o| o.log_stream_arn.clone())
            .collect(),
        tags: app.tags.clone(),
    }
}

/// `StartApplication` run configuration, or `None` when the application
/// cannot be started yet
///
/// A SQL application with a declared starting position needs the remote id
/// of its input; without an input there is nothing to start.
#[must_use]
pub fn start_run_configuration(
    app: &Application,
    detail: &ApplicationDetail,
) -> Option<StartRunConfiguration> {
    let config = app.application_configuration.as_ref();
    let run = config.and_then(|c| c.run_configuration.as_ref());

    let mut start = StartRunConfiguration {
        application_restore_configuration: run
            .and_then(|r| r.application_restore_configuration.clone()),
        flink_run_configuration: run.and_then(|r| r.flink_run_configuration.clone()),
        sql_run_configurations: Vec::new(),
    };

    let starting_position = config
        .and_then(|c| c.sql_application_configuration.as_ref())
        .and_then(|s| s.input.as_ref())
        .and_then(|i| i.input_starting_position_configuration.as_ref())
        .and_then(|p| p.input_starting_position);

    if let Some(position) = starting_position {
        let input_id = detail.sql_input()?.input_id.clone()?;
        start.sql_run_configurations.push(SqlRunConfiguration {
            input_id,
            input_starting_position: Some(position),
        });
    }

    Some(start)
}
