//! # Maintenance Window Reconciler
//!
//! The remote always has a maintenance window and cannot unset it. The value
//! found on first acquisition (create or import) is kept in
//! `original_start_time` and written back on delete.

use super::types::{report, OperationContext, ResourceHandler};
use crate::controller::finder::find_application_detail_by_name;
use crate::error::{Diagnostics, Error, NotFoundError, Result, ResultExt};
use crate::model::MaintenanceWindow;
use crate::provider::{ApplicationDetail, KinesisAnalyticsApi};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

fn action(name: &str) -> String {
    format!("updating Application Maintenance Configuration ({name})")
}

/// Maintenance configuration can only change while READY or RUNNING
fn ensure_stable(detail: &ApplicationDetail) -> Result<()> {
    if detail.application_status.is_stable() {
        return Ok(());
    }
    Err(Error::validation(format!(
        "application status is {}, maintenance configuration can only be updated while READY or RUNNING",
        detail.application_status
    )))
}

fn current_start_time(detail: &ApplicationDetail) -> Option<String> {
    detail
        .maintenance_configuration
        .as_ref()
        .map(|m| m.application_maintenance_window_start_time.clone())
}

#[derive(Clone)]
pub struct MaintenanceReconciler {
    api: Arc<dyn KinesisAnalyticsApi>,
}

impl std::fmt::Debug for MaintenanceReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenanceReconciler").finish_non_exhaustive()
    }
}

impl MaintenanceReconciler {
    #[must_use]
    pub fn new(api: Arc<dyn KinesisAnalyticsApi>) -> Self {
        Self { api }
    }

    async fn set_start_time(&self, name: &str, start_time: &str) -> Result<()> {
        let detail = find_application_detail_by_name(self.api.as_ref(), name).await?;
        ensure_stable(&detail)?;
        let applied = self
            .api
            .update_maintenance_configuration(name, start_time)
            .await?;
        info!(
            application.name = %name,
            start_time = %applied.application_maintenance_window_start_time,
            end_time = %applied.application_maintenance_window_end_time,
            "Maintenance window updated"
        );
        Ok(())
    }

    fn project(detail: &ApplicationDetail, original_start_time: Option<String>) -> MaintenanceWindow {
        let window = detail.maintenance_configuration.as_ref();
        MaintenanceWindow {
            application_name: detail.application_name.clone(),
            application_maintenance_window_start_time: window
                .map(|w| w.application_maintenance_window_start_time.clone())
                .unwrap_or_default(),
            application_maintenance_window_end_time: window
                .map(|w| w.application_maintenance_window_end_time.clone()),
            original_start_time,
        }
    }

    /// Capture the current window, then set the declared one
    ///
    /// # Errors
    ///
    /// Validation failure, an application that is not READY or RUNNING, or a
    /// remote error.
    pub async fn create(&self, declared: &MaintenanceWindow) -> Result<MaintenanceWindow> {
        declared.validate()?;
        let name = declared.application_name.as_str();
        async {
            let detail = find_application_detail_by_name(self.api.as_ref(), name).await?;
            let original = current_start_time(&detail);
            self.set_start_time(name, &declared.application_maintenance_window_start_time)
                .await?;
            self.read_with_original(name, original)
                .await?
                .ok_or_else(|| Error::from(NotFoundError::new("Application", name)))
        }
        .await
        .with_action(|| action(name))
    }

    async fn read_with_original(
        &self,
        name: &str,
        original_start_time: Option<String>,
    ) -> Result<Option<MaintenanceWindow>> {
        match find_application_detail_by_name(self.api.as_ref(), name).await {
            Ok(detail) => Ok(Some(Self::project(&detail, original_start_time))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// # Errors
    ///
    /// Any failure other than absence of the application.
    pub async fn read(&self, current: &MaintenanceWindow) -> Result<Option<MaintenanceWindow>> {
        self.read_with_original(&current.application_name, current.original_start_time.clone())
            .await
            .with_action(|| {
                format!(
                    "reading Application Maintenance Configuration ({})",
                    current.application_name
                )
            })
    }

    /// Set the declared window; the captured original is never overwritten
    ///
    /// # Errors
    ///
    /// See [`MaintenanceReconciler::create`].
    pub async fn update(
        &self,
        prior: &MaintenanceWindow,
        declared: &MaintenanceWindow,
    ) -> Result<MaintenanceWindow> {
        declared.validate()?;
        let name = declared.application_name.as_str();
        async {
            self.set_start_time(name, &declared.application_maintenance_window_start_time)
                .await?;
            self.read_with_original(name, prior.original_start_time.clone())
                .await?
                .ok_or_else(|| Error::from(NotFoundError::new("Application", name)))
        }
        .await
        .with_action(|| action(name))
    }

    /// Restore the captured original window
    ///
    /// # Errors
    ///
    /// See [`MaintenanceReconciler::create`]; an absent application is success.
    pub async fn delete(&self, current: &MaintenanceWindow) -> Result<()> {
        let name = current.application_name.as_str();
        let Some(original) = current.original_start_time.as_deref() else {
            warn!(application.name = %name, "No original maintenance window recorded, leaving it as is");
            return Ok(());
        };
        match self.set_start_time(name, original).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e.context(action(name))),
        }
    }

    /// Adopt the window of an existing application; its current value
    /// becomes the original
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the application does not exist.
    pub async fn import(&self, application_name: &str) -> Result<MaintenanceWindow> {
        let detail = find_application_detail_by_name(self.api.as_ref(), application_name)
            .await
            .with_action(|| {
                format!("reading Application Maintenance Configuration ({application_name})")
            })?;
        Ok(Self::project(&detail, current_start_time(&detail)))
    }
}

#[async_trait]
impl ResourceHandler for MaintenanceReconciler {
    type State = MaintenanceWindow;

    fn type_name(&self) -> &'static str {
        "kinesisanalyticsv2_application_maintenance_configuration"
    }

    async fn create(
        &self,
        desired: &MaintenanceWindow,
        _ctx: &OperationContext,
    ) -> std::result::Result<MaintenanceWindow, Diagnostics> {
        report(self.type_name(), "create", Self::create(self, desired)).await
    }

    async fn read(
        &self,
        current: &MaintenanceWindow,
        _ctx: &OperationContext,
    ) -> std::result::Result<Option<MaintenanceWindow>, Diagnostics> {
        report(self.type_name(), "read", Self::read(self, current)).await
    }

    async fn update(
        &self,
        prior: &MaintenanceWindow,
        desired: &MaintenanceWindow,
        _ctx: &OperationContext,
    ) -> std::result::Result<MaintenanceWindow, Diagnostics> {
        report(self.type_name(), "update", Self::update(self, prior, desired)).await
    }

    async fn delete(
        &self,
        current: &MaintenanceWindow,
        _ctx: &OperationContext,
    ) -> std::result::Result<(), Diagnostics> {
        report(self.type_name(), "delete", Self::delete(self, current)).await
    }

    async fn import(
        &self,
        id: &str,
        _ctx: &OperationContext,
    ) -> std::result::Result<MaintenanceWindow, Diagnostics> {
        report(self.type_name(), "import", Self::import(self, id)).await
    }
}
