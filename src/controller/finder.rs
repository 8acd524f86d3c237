//! # Finders
//!
//! Fetch remote state by stable key and turn remote absence into a typed
//! [`NotFoundError`], so callers can tell "already gone" from "call failed".
//! No caching: every call hits the API.

use crate::controller::identifier::snapshot_create_resource_id;
use crate::error::{Error, NotFoundError, Result};
use crate::provider::{ApplicationDetail, KinesisAnalyticsApi, OperationDetail, SnapshotDetail};
use crate::provider::RemoteResult;

fn not_found_or<T>(
    result: RemoteResult<T>,
    resource: &'static str,
    id: impl FnOnce() -> String,
) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_not_found() => Err(NotFoundError::new(resource, id()).with_last_error(e).into()),
        Err(e) => Err(Error::Remote(e)),
    }
}

/// Describe an application by name
///
/// # Errors
///
/// [`Error::NotFound`] when the application does not exist, otherwise the
/// remote error unchanged.
pub async fn find_application_detail_by_name(
    api: &dyn KinesisAnalyticsApi,
    name: &str,
) -> Result<ApplicationDetail> {
    not_found_or(api.describe_application(name).await, "Application", || {
        name.to_string()
    })
}

/// Describe a snapshot by application and snapshot name
///
/// # Errors
///
/// [`Error::NotFound`] when the snapshot (or its application) does not exist,
/// otherwise the remote error unchanged.
pub async fn find_snapshot_details_by_two_part_key(
    api: &dyn KinesisAnalyticsApi,
    application_name: &str,
    snapshot_name: &str,
) -> Result<SnapshotDetail> {
    not_found_or(
        api.describe_application_snapshot(application_name, snapshot_name)
            .await,
        "Application Snapshot",
        || snapshot_create_resource_id(application_name, snapshot_name),
    )
}

/// Describe an asynchronous application operation
///
/// # Errors
///
/// [`Error::NotFound`] when the operation is unknown, otherwise the remote
/// error unchanged.
pub async fn find_application_operation_by_two_part_key(
    api: &dyn KinesisAnalyticsApi,
    application_name: &str,
    operation_id: &str,
) -> Result<OperationDetail> {
    not_found_or(
        api.describe_application_operation(application_name, operation_id)
            .await,
        "Application Operation",
        || format!("{application_name}/{operation_id}"),
    )
}
