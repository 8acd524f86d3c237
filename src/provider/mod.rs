//! # Provider
//!
//! The remote control-plane boundary. Reconcilers depend only on the
//! [`KinesisAnalyticsApi`] trait and receive an implementation by injection;
//! nothing reads a client from ambient state.
//!
//! - `types`: request/response shapes
//! - `aws`: adapter over the official AWS SDK (feature `aws`)

use crate::error::RemoteError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

pub mod types;

#[cfg(feature = "aws")]
pub mod aws;

pub use types::*;

/// Result of a single remote call
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Kinesis Analytics v2 control-plane operations used by the reconcilers
///
/// Every method is one remote call. Absence is reported as a
/// `ResourceNotFound` [`RemoteError`]; the finders turn it into a typed
/// not-found signal.
#[async_trait]
pub trait KinesisAnalyticsApi: Send + Sync {
    /// `DescribeApplication`
    async fn describe_application(&self, application_name: &str)
        -> RemoteResult<ApplicationDetail>;

    /// `CreateApplication`; the new application starts at version 1
    async fn create_application(
        &self,
        request: &CreateApplicationRequest,
    ) -> RemoteResult<ApplicationDetail>;

    /// Apply one discrete configuration change against `current_version_id`
    ///
    /// Fails with `ConcurrentModification` or `InvalidArgument` when the
    /// version is stale.
    async fn update_application(
        &self,
        application_name: &str,
        current_version_id: i64,
        update: &ApplicationUpdate,
    ) -> RemoteResult<UpdateOutput>;

    /// `StartApplication`; returns the operation id when one is reported
    async fn start_application(
        &self,
        application_name: &str,
        run_configuration: &StartRunConfiguration,
    ) -> RemoteResult<Option<String>>;

    /// `StopApplication`; returns the operation id when one is reported
    async fn stop_application(&self, application_name: &str, force: bool)
        -> RemoteResult<Option<String>>;

    /// `DeleteApplication`; the remote disambiguates by creation timestamp
    async fn delete_application(
        &self,
        application_name: &str,
        create_timestamp: DateTime<Utc>,
    ) -> RemoteResult<()>;

    /// `DescribeApplicationOperation`
    async fn describe_application_operation(
        &self,
        application_name: &str,
        operation_id: &str,
    ) -> RemoteResult<OperationDetail>;

    /// `UpdateApplicationMaintenanceConfiguration`; not versioned
    async fn update_maintenance_configuration(
        &self,
        application_name: &str,
        start_time: &str,
    ) -> RemoteResult<MaintenanceConfigurationDescription>;

    /// `ListTagsForResource`
    async fn list_tags(&self, resource_arn: &str) -> RemoteResult<BTreeMap<String, String>>;

    /// `TagResource`; does not change the application version
    async fn tag_resource(
        &self,
        resource_arn: &str,
        tags: &BTreeMap<String, String>,
    ) -> RemoteResult<()>;

    /// `UntagResource`; does not change the application version
    async fn untag_resource(&self, resource_arn: &str, tag_keys: &[String]) -> RemoteResult<()>;

    /// `CreateApplicationSnapshot`
    async fn create_application_snapshot(
        &self,
        application_name: &str,
        snapshot_name: &str,
    ) -> RemoteResult<()>;

    /// `DescribeApplicationSnapshot`
    async fn describe_application_snapshot(
        &self,
        application_name: &str,
        snapshot_name: &str,
    ) -> RemoteResult<SnapshotDetail>;

    /// `DeleteApplicationSnapshot`; the remote disambiguates by creation timestamp
    async fn delete_application_snapshot(
        &self,
        application_name: &str,
        snapshot_name: &str,
        snapshot_creation_timestamp: DateTime<Utc>,
    ) -> RemoteResult<()>;
}
