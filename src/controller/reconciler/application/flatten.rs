//! Remote application detail back to declared state.

use crate::model::Application;
use crate::provider::ApplicationDetail;
use std::collections::BTreeMap;

/// Project a describe result into declared state
///
/// `start_application` and `force_stop` are never reported by the remote:
/// they are carried over from `prior`, or derived from the status when there
/// is no prior state (import).
#[must_use]
pub fn flatten_application(
    detail: &ApplicationDetail,
    tags: BTreeMap<String, String>,
    prior: Option<&Application>,
) -> Application {
    let (start_application, force_stop) = match prior {
        Some(p) => (p.start_application, p.force_stop),
        None => (
            detail.application_status == crate::model::ApplicationStatus::Running,
            false,
        ),
    };

    Application {
        name: detail.application_name.clone(),
        runtime_environment: detail.runtime_environment,
        service_execution_role: detail.service_execution_role.clone().unwrap_or_default(),
        description: detail
            .application_description
            .clone()
            .filter(|d| !d.is_empty()),
        application_mode: detail.application_mode,
        application_configuration: detail.application_configuration.clone(),
        cloudwatch_logging_options: detail.cloudwatch_logging_options.first().cloned(),
        tags,
        start_application,
        force_stop,
        arn: Some(detail.application_arn.clone()),
        status: Some(detail.application_status),
        version_id: Some(detail.application_version_id),
        create_timestamp: detail.create_timestamp.map(|t| t.to_rfc3339()),
        last_update_timestamp: detail.last_update_timestamp.map(|t| t.to_rfc3339()),
    }
}
