//! # Application Reconciler
//!
//! Create, read, update, delete and import of a Kinesis Analytics v2
//! application.
//!
//! ## Update sequence
//!
//! 1. Read the application and project it to declared state
//! 2. Plan the discrete updates (see [`plan`]); replacement-only changes fail here
//! 3. Stop the application when it should no longer run
//! 4. Apply each planned update against a freshly read version
//! 5. Untag, then tag
//! 6. Start the application when it should run
//! 7. Read back

pub mod expand;
pub mod flatten;
mod lifecycle;
pub mod plan;

use super::types::{report, OperationContext, ResourceHandler};
use crate::config::ControllerConfig;
use crate::controller::identifier::application_name_from_import_id;
use crate::controller::retry::PropagationRetry;
use crate::error::{Diagnostics, Error, NotFoundError, Result, ResultExt};
use crate::model::{Application, ApplicationStatus};
use crate::provider::{ApplicationUpdate, KinesisAnalyticsApi};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use expand::create_request;
use flatten::flatten_application;
use lifecycle::Session;
use plan::{diff_tags, plan_updates};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

const RESOURCE: &str = "Kinesis Analytics v2 Application";

/// Reconciles [`Application`] declared state against the remote
#[derive(Clone)]
pub struct ApplicationReconciler {
    api: Arc<dyn KinesisAnalyticsApi>,
    config: ControllerConfig,
    retry: PropagationRetry,
}

impl std::fmt::Debug for ApplicationReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationReconciler")
            .field("config", &self.config)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl ApplicationReconciler {
    #[must_use]
    pub fn new(api: Arc<dyn KinesisAnalyticsApi>, config: ControllerConfig) -> Self {
        let retry = PropagationRetry::from_config(&config);
        Self { api, config, retry }
    }

    /// Replace the IAM propagation retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: PropagationRetry) -> Self {
        self.retry = retry;
        self
    }

    fn session<'a>(&'a self, name: &'a str, ctx: &'a OperationContext) -> Session<'a> {
        Session {
            api: self.api.as_ref(),
            config: &self.config,
            retry: &self.retry,
            cancel: &ctx.cancellation,
            name,
        }
    }

    async fn observe(&self, session: &Session<'_>, prior: Option<&Application>) -> Result<Application> {
        let detail = session.describe().await?;
        let tags = self
            .api
            .list_tags(&detail.application_arn)
            .await
            .with_action(|| format!("listing tags for {RESOURCE} ({})", session.name))?;
        Ok(flatten_application(&detail, tags, prior))
    }

    /// Create the application, add its VPC configuration, optionally start it
    ///
    /// # Errors
    ///
    /// Validation, remote and wait failures, wrapped with the action.
    pub async fn create(&self, declared: &Application, ctx: &OperationContext) -> Result<Application> {
        declared.validate()?;
        let name = declared.name.as_str();
        let session = self.session(name, ctx);
        let span = info_span!("create_application", application.name = %name);

        async {
            let request = create_request(declared);
            let created = self
                .retry
                .call("CreateApplication", &ctx.cancellation, || {
                    self.api.create_application(&request)
                })
                .await
                .with_action(|| format!("creating {RESOURCE} ({name})"))?;
            info!(
                version_id = created.application_version_id,
                status = %created.application_status,
                "Application created"
            );

            if let Some(vpc) = declared
                .application_configuration
                .as_ref()
                .and_then(|c| c.vpc_configuration.as_ref())
            {
                session
                    .apply_update(
                        &ApplicationUpdate::AddVpcConfiguration(vpc.definition()),
                        self.config.create_timeout(),
                    )
                    .await?;
            }

            if declared.start_application {
                session.start(declared, self.config.create_timeout()).await?;
            }

            self.observe(&session, Some(declared)).await
        }
        .instrument(span)
        .await
    }

    /// Current state, or `None` when the application no longer exists
    ///
    /// # Errors
    ///
    /// Any failure other than absence.
    pub async fn read(
        &self,
        name: &str,
        prior: Option<&Application>,
        ctx: &OperationContext,
    ) -> Result<Option<Application>> {
        let session = self.session(name, ctx);
        match self.observe(&session, prior).await {
            Ok(app) => Ok(Some(app)),
            Err(e) if e.is_not_found() => {
                warn!(application.name = %name, "Application not found, removing from state");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Move the remote application to `declared`
    ///
    /// # Errors
    ///
    /// [`Error::RequiresReplacement`] before any mutation when a change
    /// cannot be applied in place; otherwise remote and wait failures.
    pub async fn update(&self, declared: &Application, ctx: &OperationContext) -> Result<Application> {
        declared.validate()?;
        let name = declared.name.as_str();
        let session = self.session(name, ctx);
        let timeout = self.config.update_timeout();
        let span = info_span!("reconcile_application", application.name = %name);

        async {
            let observed = self.observe(&session, Some(declared)).await?;
            let planned = plan_updates(&observed, declared)?;
            debug!(updates = planned.len(), "Planned configuration updates");

            if !declared.start_application && observed.status == Some(ApplicationStatus::Running) {
                session.stop(declared.force_stop, timeout).await?;
            }

            for step in &planned {
                debug!(group = %step.group, "Applying {}", step.update.describe());
                session.apply_update(&step.update, timeout).await?;
            }

            if let Some(arn) = observed.arn.as_deref() {
                let tags = diff_tags(&observed.tags, &declared.tags);
                if !tags.to_remove.is_empty() {
                    self.api
                        .untag_resource(arn, &tags.to_remove)
                        .await
                        .with_action(|| format!("untagging {RESOURCE} ({name})"))?;
                }
                if !tags.to_set.is_empty() {
                    self.api
                        .tag_resource(arn, &tags.to_set)
                        .await
                        .with_action(|| format!("tagging {RESOURCE} ({name})"))?;
                }
            }

            if declared.start_application {
                session.start(declared, timeout).await?;
            }

            self.observe(&session, Some(declared)).await
        }
        .instrument(span)
        .await
    }

    /// Stop if running, delete, wait until gone; absence is success
    ///
    /// # Errors
    ///
    /// Remote and wait failures other than absence.
    pub async fn delete(&self, state: &Application, ctx: &OperationContext) -> Result<()> {
        let name = state.name.as_str();
        let session = self.session(name, ctx);
        let timeout = self.config.delete_timeout();
        let span = info_span!("delete_application", application.name = %name);

        async {
            let detail = match session.describe().await {
                Ok(detail) => detail,
                Err(e) if e.is_not_found() => {
                    debug!("Application already deleted");
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

            if detail.application_status == ApplicationStatus::Running {
                session.stop(state.force_stop, timeout).await?;
            }

            let create_timestamp = state
                .create_timestamp
                .as_deref()
                .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
                .map(|t| t.with_timezone(&Utc))
                .or(detail.create_timestamp)
                .ok_or_else(|| {
                    Error::validation(format!("{RESOURCE} ({name}) has no create_timestamp"))
                })?;

            match self.api.delete_application(name, create_timestamp).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => return Ok(()),
                Err(e) => return Err(Error::from(e).context(format!("deleting {RESOURCE} ({name})"))),
            }

            session
                .waiter()
                .application_deleted(name, timeout)
                .await
                .with_action(|| format!("waiting for {RESOURCE} ({name}) delete"))?;
            info!("Application deleted");
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Adopt an existing application by name or ARN
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIdentifier`] for a malformed id, [`Error::NotFound`]
    /// when the application does not exist.
    pub async fn import(&self, id: &str, ctx: &OperationContext) -> Result<Application> {
        let name = application_name_from_import_id(id)?;
        self.read(&name, None, ctx)
            .await?
            .ok_or_else(|| NotFoundError::new("Application", name).into())
    }
}

#[async_trait]
impl ResourceHandler for ApplicationReconciler {
    type State = Application;

    fn type_name(&self) -> &'static str {
        "kinesisanalyticsv2_application"
    }

    async fn create(
        &self,
        desired: &Application,
        ctx: &OperationContext,
    ) -> std::result::Result<Application, Diagnostics> {
        report(self.type_name(), "create", Self::create(self, desired, ctx)).await
    }

    async fn read(
        &self,
        current: &Application,
        ctx: &OperationContext,
    ) -> std::result::Result<Option<Application>, Diagnostics> {
        report(
            self.type_name(),
            "read",
            Self::read(self, &current.name, Some(current), ctx),
        )
        .await
    }

    async fn update(
        &self,
        _prior: &Application,
        desired: &Application,
        ctx: &OperationContext,
    ) -> std::result::Result<Application, Diagnostics> {
        report(self.type_name(), "update", Self::update(self, desired, ctx)).await
    }

    async fn delete(
        &self,
        current: &Application,
        ctx: &OperationContext,
    ) -> std::result::Result<(), Diagnostics> {
        report(self.type_name(), "delete", Self::delete(self, current, ctx)).await
    }

    async fn import(
        &self,
        id: &str,
        ctx: &OperationContext,
    ) -> std::result::Result<Application, Diagnostics> {
        report(self.type_name(), "import", Self::import(self, id, ctx)).await
    }
}
