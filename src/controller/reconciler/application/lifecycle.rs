//! # Application Lifecycle Calls
//!
//! Versioned updates and start/stop, each followed by the waits that let the
//! next call see a settled application.

use super::expand::start_run_configuration;
use crate::config::ControllerConfig;
use crate::controller::finder::find_application_detail_by_name;
use crate::controller::retry::PropagationRetry;
use crate::controller::wait::Waiter;
use crate::error::{Error, Result, ResultExt};
use crate::model::{Application, ApplicationStatus};
use crate::provider::{ApplicationDetail, ApplicationUpdate, KinesisAnalyticsApi};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

/// Everything one reconciliation of one application needs
#[derive(Clone, Copy)]
pub(crate) struct Session<'a> {
    pub api: &'a dyn KinesisAnalyticsApi,
    pub config: &'a ControllerConfig,
    pub retry: &'a PropagationRetry,
    pub cancel: &'a CancellationToken,
    pub name: &'a str,
}

impl<'a> Session<'a> {
    pub fn waiter(&self) -> Waiter<'a> {
        Waiter::new(self.api, self.config.poll_settings(), self.cancel)
    }

    pub async fn describe(&self) -> Result<ApplicationDetail> {
        find_application_detail_by_name(self.api, self.name)
            .await
            .with_action(|| format!("reading Kinesis Analytics v2 Application ({})", self.name))
    }

    /// Wait for the operation a call reported, if any
    async fn await_operation(&self, operation_id: Option<&str>, timeout: Duration) -> Result<()> {
        if let Some(operation_id) = operation_id {
            self.waiter()
                .operation_succeeded(self.name, operation_id, timeout)
                .await
                .with_action(|| {
                    format!(
                        "waiting for Kinesis Analytics v2 Application ({}) operation ({operation_id}) success",
                        self.name
                    )
                })?;
        }
        Ok(())
    }

    /// Send one discrete update against a freshly read version
    ///
    /// Returns the settled application detail. A call that needs a running
    /// application is skipped when the application is not running.
    pub async fn apply_update(
        &self,
        update: &ApplicationUpdate,
        timeout: Duration,
    ) -> Result<ApplicationDetail> {
        let detail = self.describe().await?;
        if update.requires_running() && detail.application_status != ApplicationStatus::Running {
            info!(
                application.name = %self.name,
                status = %detail.application_status,
                "Skipping {} while the application is not running",
                update.describe()
            );
            return Ok(detail);
        }

        let version_id = detail.application_version_id;
        let operation = update.operation();
        let span = info_span!(
            "update_application",
            application.name = %self.name,
            operation,
            version_id
        );

        async {
            debug!("Sending {}", update.describe());
            let output = self
                .retry
                .call(operation, self.cancel, || {
                    self.api.update_application(self.name, version_id, update)
                })
                .await?;
            self.await_operation(output.operation_id.as_deref(), timeout).await?;
            let settled = self.waiter().application_updated(self.name, timeout).await?;
            info!(
                new_version_id = settled.application_version_id,
                "Applied {}",
                update.describe()
            );
            Ok::<_, Error>(settled)
        }
        .instrument(span)
        .await
        .with_action(|| format!("updating Kinesis Analytics v2 Application ({})", self.name))
    }

    /// Start a READY application and wait for RUNNING
    ///
    /// Any other status, or a SQL application without an input, is left
    /// alone.
    pub async fn start(&self, declared: &Application, timeout: Duration) -> Result<()> {
        let detail = self.describe().await?;
        if detail.application_status != ApplicationStatus::Ready {
            debug!(
                application.name = %self.name,
                status = %detail.application_status,
                "Application can only be started from READY"
            );
            return Ok(());
        }
        let Some(run_configuration) = start_run_configuration(declared, &detail) else {
            info!(application.name = %self.name, "Application has no input, not starting");
            return Ok(());
        };

        let span = info_span!("start_application", application.name = %self.name);
        async {
            let operation_id = self
                .retry
                .call("StartApplication", self.cancel, || {
                    self.api.start_application(self.name, &run_configuration)
                })
                .await?;
            self.await_operation(operation_id.as_deref(), timeout).await?;
            self.waiter().application_started(self.name, timeout).await?;
            info!("Application started");
            Ok::<_, Error>(())
        }
        .instrument(span)
        .await
        .with_action(|| format!("starting Kinesis Analytics v2 Application ({})", self.name))
    }

    /// Stop a RUNNING application and wait for READY
    pub async fn stop(&self, force: bool, timeout: Duration) -> Result<()> {
        let detail = self.describe().await?;
        if detail.application_status != ApplicationStatus::Running {
            debug!(
                application.name = %self.name,
                status = %detail.application_status,
                "Application can only be stopped from RUNNING"
            );
            return Ok(());
        }

        let span = info_span!("stop_application", application.name = %self.name, force);
        async {
            let operation_id = self
                .api
                .stop_application(self.name, force)
                .await?;
            self.await_operation(operation_id.as_deref(), timeout).await?;
            self.waiter().application_stopped(self.name, timeout).await?;
            info!("Application stopped");
            Ok::<_, Error>(())
        }
        .instrument(span)
        .await
        .with_action(|| format!("stopping Kinesis Analytics v2 Application ({})", self.name))
    }
}
