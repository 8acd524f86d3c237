//! # Snapshot Reconciler
//!
//! Snapshots are immutable: any declared change requires replacement.
//! Delete hands the creation timestamp back to the remote.

use super::types::{report, OperationContext, ResourceHandler};
use crate::config::ControllerConfig;
use crate::constants::SNAPSHOT_DOES_NOT_EXIST_MESSAGE;
use crate::controller::finder::{
    find_application_detail_by_name, find_snapshot_details_by_two_part_key,
};
use crate::controller::identifier::snapshot_parse_resource_id;
use crate::controller::retry::PropagationRetry;
use crate::controller::wait::Waiter;
use crate::error::{
    Diagnostics, Error, NotFoundError, RemoteError, RemoteErrorKind, Result, ResultExt,
};
use crate::model::Snapshot;
use crate::provider::{KinesisAnalyticsApi, SnapshotDetail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};

const RESOURCE: &str = "Kinesis Analytics v2 Application Snapshot";

fn flatten_snapshot(application_name: &str, detail: &SnapshotDetail) -> Snapshot {
    let mut snapshot = Snapshot::new(application_name, detail.snapshot_name.clone());
    snapshot.id = Some(snapshot.resource_id());
    snapshot.application_version_id = Some(detail.application_version_id);
    snapshot.snapshot_creation_timestamp = detail.snapshot_creation_timestamp.map(|t| t.to_rfc3339());
    snapshot.status = Some(detail.snapshot_status);
    snapshot
}

/// Delete failures that mean the snapshot is already gone
fn already_deleted(error: &RemoteError) -> bool {
    error.is_not_found()
        || (error.kind == RemoteErrorKind::InvalidArgument
            && error.message.contains(SNAPSHOT_DOES_NOT_EXIST_MESSAGE))
}

#[derive(Clone)]
pub struct SnapshotReconciler {
    api: Arc<dyn KinesisAnalyticsApi>,
    config: ControllerConfig,
    retry: PropagationRetry,
}

impl std::fmt::Debug for SnapshotReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotReconciler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SnapshotReconciler {
    #[must_use]
    pub fn new(api: Arc<dyn KinesisAnalyticsApi>, config: ControllerConfig) -> Self {
        let retry = PropagationRetry::from_config(&config);
        Self { api, config, retry }
    }

    fn waiter<'a>(&'a self, ctx: &'a OperationContext) -> Waiter<'a> {
        Waiter::new(self.api.as_ref(), self.config.poll_settings(), &ctx.cancellation)
    }

    /// Snapshot a READY or RUNNING application and wait for READY
    ///
    /// # Errors
    ///
    /// Validation failure, an application in any other status, remote and
    /// wait failures.
    pub async fn create(&self, declared: &Snapshot, ctx: &OperationContext) -> Result<Snapshot> {
        declared.validate()?;
        let id = declared.resource_id();
        let app = declared.application_name.as_str();
        let snap = declared.snapshot_name.as_str();
        let span = info_span!("create_snapshot", application.name = %app, snapshot.name = %snap);

        async {
            let detail = find_application_detail_by_name(self.api.as_ref(), app).await?;
            if !detail.application_status.is_stable() {
                return Err(Error::validation(format!(
                    "application ({app}) status is {}, snapshots can only be created while READY or RUNNING",
                    detail.application_status
                )));
            }

            self.retry
                .call("CreateApplicationSnapshot", &ctx.cancellation, || {
                    self.api.create_application_snapshot(app, snap)
                })
                .await?;

            let created = self
                .waiter(ctx)
                .snapshot_created(app, snap, self.config.snapshot_create_timeout())
                .await?;
            info!(version_id = created.application_version_id, "Snapshot created");
            Ok(flatten_snapshot(app, &created))
        }
        .instrument(span)
        .await
        .with_action(|| format!("creating {RESOURCE} ({id})"))
    }

    /// `None` when the snapshot was deleted out of band
    ///
    /// # Errors
    ///
    /// Any failure other than absence.
    pub async fn read(&self, current: &Snapshot) -> Result<Option<Snapshot>> {
        let app = current.application_name.as_str();
        match find_snapshot_details_by_two_part_key(self.api.as_ref(), app, &current.snapshot_name)
            .await
        {
            Ok(detail) => Ok(Some(flatten_snapshot(app, &detail))),
            Err(e) if e.is_not_found() => {
                debug!(id = %current.resource_id(), "Snapshot not found, removing from state");
                Ok(None)
            }
            Err(e) => Err(e.context(format!("reading {RESOURCE} ({})", current.resource_id()))),
        }
    }

    /// Every declared field is immutable; only an unchanged snapshot passes
    ///
    /// # Errors
    ///
    /// [`Error::RequiresReplacement`] for any declared change.
    pub async fn update(&self, prior: &Snapshot, declared: &Snapshot) -> Result<Snapshot> {
        if prior.application_name != declared.application_name
            || prior.snapshot_name != declared.snapshot_name
        {
            return Err(Error::RequiresReplacement {
                resource: RESOURCE,
                id: prior.resource_id(),
                reason: "application_name and snapshot_name cannot be changed".to_string(),
            });
        }
        self.read(prior)
            .await?
            .ok_or_else(|| NotFoundError::new("Application Snapshot", prior.resource_id()).into())
    }

    /// Delete by creation timestamp; an absent snapshot is success
    ///
    /// # Errors
    ///
    /// Remote and wait failures other than absence.
    pub async fn delete(&self, current: &Snapshot, ctx: &OperationContext) -> Result<()> {
        let id = current.resource_id();
        let app = current.application_name.as_str();
        let snap = current.snapshot_name.as_str();
        let span = info_span!("delete_snapshot", application.name = %app, snapshot.name = %snap);

        async {
            let recorded = current
                .snapshot_creation_timestamp
                .as_deref()
                .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
                .map(|t| t.with_timezone(&Utc));
            let timestamp = match recorded {
                Some(t) => t,
                None => match find_snapshot_details_by_two_part_key(self.api.as_ref(), app, snap).await {
                    Ok(detail) => detail.snapshot_creation_timestamp.ok_or_else(|| {
                        Error::validation(format!("{RESOURCE} ({id}) has no creation timestamp"))
                    })?,
                    Err(e) if e.is_not_found() => return Ok(()),
                    Err(e) => return Err(e),
                },
            };

            match self.api.delete_application_snapshot(app, snap, timestamp).await {
                Ok(()) => {}
                Err(e) if already_deleted(&e) => {
                    debug!(error = %e, "Snapshot already deleted");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }

            self.waiter(ctx)
                .snapshot_deleted(app, snap, self.config.snapshot_delete_timeout())
                .await?;
            info!("Snapshot deleted");
            Ok(())
        }
        .instrument(span)
        .await
        .with_action(|| format!("deleting {RESOURCE} ({id})"))
    }

    /// Adopt a snapshot by `<application-name>/<snapshot-name>`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIdentifier`] for a malformed id, [`Error::NotFound`]
    /// when the snapshot does not exist.
    pub async fn import(&self, id: &str) -> Result<Snapshot> {
        let (app, snap) = snapshot_parse_resource_id(id)?;
        self.read(&Snapshot::new(app, snap))
            .await?
            .ok_or_else(|| NotFoundError::new("Application Snapshot", id).into())
    }
}

#[async_trait]
impl ResourceHandler for SnapshotReconciler {
    type State = Snapshot;

    fn type_name(&self) -> &'static str {
        "kinesisanalyticsv2_application_snapshot"
    }

    async fn create(
        &self,
        desired: &Snapshot,
        ctx: &OperationContext,
    ) -> std::result::Result<Snapshot, Diagnostics> {
        report(self.type_name(), "create", Self::create(self, desired, ctx)).await
    }

    async fn read(
        &self,
        current: &Snapshot,
        _ctx: &OperationContext,
    ) -> std::result::Result<Option<Snapshot>, Diagnostics> {
        report(self.type_name(), "read", Self::read(self, current)).await
    }

    async fn update(
        &self,
        prior: &Snapshot,
        desired: &Snapshot,
        _ctx: &OperationContext,
    ) -> std::result::Result<Snapshot, Diagnostics> {
        report(self.type_name(), "update", Self::update(self, prior, desired)).await
    }

    async fn delete(
        &self,
        current: &Snapshot,
        ctx: &OperationContext,
    ) -> std::result::Result<(), Diagnostics> {
        report(self.type_name(), "delete", Self::delete(self, current, ctx)).await
    }

    async fn import(
        &self,
        id: &str,
        _ctx: &OperationContext,
    ) -> std::result::Result<Snapshot, Diagnostics> {
        report(self.type_name(), "import", Self::import(self, id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_does_not_exist_message_counts_as_deleted() {
        assert!(already_deleted(&RemoteError::invalid_argument(
            "Snapshot nightly does not exist for application my-app"
        )));
        assert!(already_deleted(&RemoteError::not_found("gone")));
        assert!(!already_deleted(&RemoteError::from_code(
            "ResourceInUseException",
            "Snapshot is being created"
        )));
    }

    #[test]
    fn test_does_not_exist_message_only_counts_for_invalid_argument() {
        assert!(!already_deleted(&RemoteError::from_code(
            "ResourceInUseException",
            "Application my-app does not exist in a stable state"
        )));
        assert!(!already_deleted(&RemoteError::new(
            RemoteErrorKind::Service,
            "Snapshot nightly does not exist"
        )));
    }
}
