//! # Status Projectors
//!
//! Adapt the finders to the wait engine's [`Refresh`] contract: absence is an
//! observation, any other fetch error aborts the wait.

use super::finder::{
    find_application_detail_by_name, find_application_operation_by_two_part_key,
    find_snapshot_details_by_two_part_key,
};
use super::wait::{Observation, Refresh};
use crate::error::Result;
use crate::model::{ApplicationStatus, OperationStatus, SnapshotStatus};
use crate::provider::{ApplicationDetail, KinesisAnalyticsApi, OperationDetail, SnapshotDetail};
use async_trait::async_trait;

fn project<T, S>(result: Result<T>, state: impl FnOnce(&T) -> S) -> Result<Observation<T, S>> {
    match result {
        Ok(object) => Ok(Observation::Present {
            state: state(&object),
            object,
        }),
        Err(e) if e.is_not_found() => Ok(Observation::Absent),
        Err(e) => Err(e),
    }
}

/// Application status by name
#[derive(Clone, Copy)]
pub struct ApplicationStatusRefresh<'a> {
    api: &'a dyn KinesisAnalyticsApi,
    name: &'a str,
}

impl<'a> ApplicationStatusRefresh<'a> {
    #[must_use]
    pub fn new(api: &'a dyn KinesisAnalyticsApi, name: &'a str) -> Self {
        Self { api, name }
    }
}

#[async_trait]
impl<'a> Refresh for ApplicationStatusRefresh<'a> {
    type Object = ApplicationDetail;
    type State = ApplicationStatus;

    async fn refresh(&self) -> Result<Observation<ApplicationDetail, ApplicationStatus>> {
        project(
            find_application_detail_by_name(self.api, self.name).await,
            |detail| detail.application_status,
        )
    }
}

/// Snapshot status by application and snapshot name
#[derive(Clone, Copy)]
pub struct SnapshotStatusRefresh<'a> {
    api: &'a dyn KinesisAnalyticsApi,
    application_name: &'a str,
    snapshot_name: &'a str,
}

impl<'a> SnapshotStatusRefresh<'a> {
    #[must_use]
    pub fn new(
        api: &'a dyn KinesisAnalyticsApi,
        application_name: &'a str,
        snapshot_name: &'a str,
    ) -> Self {
        Self {
            api,
            application_name,
            snapshot_name,
        }
    }
}

#[async_trait]
impl<'a> Refresh for SnapshotStatusRefresh<'a> {
    type Object = SnapshotDetail;
    type State = SnapshotStatus;

    async fn refresh(&self) -> Result<Observation<SnapshotDetail, SnapshotStatus>> {
        project(
            find_snapshot_details_by_two_part_key(self.api, self.application_name, self.snapshot_name)
                .await,
            |detail| detail.snapshot_status,
        )
    }
}

/// Status of an asynchronous application operation
#[derive(Clone, Copy)]
pub struct OperationStatusRefresh<'a> {
    api: &'a dyn KinesisAnalyticsApi,
    application_name: &'a str,
    operation_id: &'a str,
}

impl<'a> OperationStatusRefresh<'a> {
    #[must_use]
    pub fn new(
        api: &'a dyn KinesisAnalyticsApi,
        application_name: &'a str,
        operation_id: &'a str,
    ) -> Self {
        Self {
            api,
            application_name,
            operation_id,
        }
    }
}

#[async_trait]
impl<'a> Refresh for OperationStatusRefresh<'a> {
    type Object = OperationDetail;
    type State = OperationStatus;

    async fn refresh(&self) -> Result<Observation<OperationDetail, OperationStatus>> {
        project(
            find_application_operation_by_two_part_key(
                self.api,
                self.application_name,
                self.operation_id,
            )
            .await,
            |detail| detail.status,
        )
    }

    fn failure_detail(&self, object: &OperationDetail) -> Option<String> {
        object.failure_message.clone()
    }
}
