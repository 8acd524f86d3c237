//! # Reconciler Types
//!
//! The entry-point contract the host drives, and the per-invocation context.

use crate::error::{Diagnostics, Result};
use crate::observability::metrics;
use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::error;

/// Per-invocation context handed to every entry point
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    /// Cancelling aborts in-flight polling and retries with `Error::Cancelled`
    pub cancellation: CancellationToken,
}

impl OperationContext {
    #[must_use]
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self { cancellation }
    }
}

/// Lifecycle entry points of one managed resource type
///
/// Failures are reported as [`Diagnostics`], never as panics or exit codes.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    type State: Send + Sync;

    /// Resource type name, for logs and metrics
    fn type_name(&self) -> &'static str;

    async fn create(
        &self,
        desired: &Self::State,
        ctx: &OperationContext,
    ) -> std::result::Result<Self::State, Diagnostics>;

    /// `Ok(None)` means the resource no longer exists and should be dropped
    async fn read(
        &self,
        current: &Self::State,
        ctx: &OperationContext,
    ) -> std::result::Result<Option<Self::State>, Diagnostics>;

    async fn update(
        &self,
        prior: &Self::State,
        desired: &Self::State,
        ctx: &OperationContext,
    ) -> std::result::Result<Self::State, Diagnostics>;

    async fn delete(
        &self,
        current: &Self::State,
        ctx: &OperationContext,
    ) -> std::result::Result<(), Diagnostics>;

    async fn import(
        &self,
        id: &str,
        ctx: &OperationContext,
    ) -> std::result::Result<Self::State, Diagnostics>;
}

/// Count the reconciliation and turn a failure into diagnostics
pub(crate) async fn report<T, F>(
    resource: &'static str,
    action: &'static str,
    fut: F,
) -> std::result::Result<T, Diagnostics>
where
    F: Future<Output = Result<T>> + Send,
{
    metrics::increment_reconciliations(resource, action);
    fut.await.map_err(|e| {
        metrics::increment_reconciliation_errors(resource, action);
        error!(resource, action, error = %e, "Reconciliation failed");
        Diagnostics::from(e)
    })
}
