//! # Wait Engine
//!
//! Generic status poller. A [`StateChange`] names the pending and target
//! statuses; [`StateChange::wait`] polls a [`Refresh`] until the object
//! reaches a target, leaves the pending set, disappears, or the timeout
//! elapses. Pauses between polls follow [`FibonacciBackoff`] and every sleep
//! and every refresh is raced against the caller's cancellation token.
//!
//! The concrete waiters used by the reconcilers live on [`Waiter`].

use super::backoff::FibonacciBackoff;
use super::status::{ApplicationStatusRefresh, OperationStatusRefresh, SnapshotStatusRefresh};
use crate::config::PollSettings;
use crate::error::{Error, NotFoundError, Result};
use crate::model::{ApplicationStatus, OperationStatus, SnapshotStatus};
use crate::observability::metrics;
use crate::provider::{ApplicationDetail, KinesisAnalyticsApi, OperationDetail, SnapshotDetail};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, Instrument};

/// One poll result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation<T, S> {
    /// The object does not exist (remote not-found)
    Absent,
    Present { object: T, state: S },
}

/// Status source polled by the wait engine
///
/// Returning `Err` aborts the wait immediately; the error is not retried.
#[async_trait]
pub trait Refresh: Send + Sync {
    type Object: Send;
    type State: Copy + Eq + fmt::Display + Send + Sync;

    async fn refresh(&self) -> Result<Observation<Self::Object, Self::State>>;

    /// Extra diagnostics when the object lands in an unexpected state
    fn failure_detail(&self, _object: &Self::Object) -> Option<String> {
        None
    }
}

/// Await `fut` unless the token fires first
pub(crate) async fn with_cancellation<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::Cancelled),
        out = fut => Ok(out),
    }
}

/// Sleep for `pause` unless the token fires first
pub(crate) async fn sleep_with_cancellation(
    cancel: &CancellationToken,
    pause: Duration,
) -> Result<()> {
    with_cancellation(cancel, tokio::time::sleep(pause)).await
}

/// Pending and target statuses of one wait
#[derive(Debug, Clone)]
pub struct StateChange<S: 'static> {
    /// Name used in spans and metrics
    pub waiter: &'static str,
    pub pending: &'static [S],
    pub target: &'static [S],
    /// Absence counts as reaching the target
    pub target_absent: bool,
    pub timeout: Duration,
    pub poll: PollSettings,
}

impl<S> StateChange<S>
where
    S: Copy + Eq + fmt::Display + Send + Sync + 'static,
{
    fn target_label(&self) -> String {
        let mut labels: Vec<String> = self.target.iter().map(ToString::to_string).collect();
        if self.target_absent {
            labels.push("absent".to_string());
        }
        labels.join(", ")
    }

    /// Poll until a target is reached
    ///
    /// Returns the last fetched object, or `None` when absence was the target.
    ///
    /// # Errors
    ///
    /// - [`Error::WaitTimeout`] when the status stayed pending past the timeout
    /// - [`Error::UnexpectedState`] when the status left the pending set, or the
    ///   object disappeared and absence was not a target
    /// - [`Error::Cancelled`] when the token fired
    /// - the refresh error, unchanged
    pub async fn wait<R>(&self, refresh: &R, cancel: &CancellationToken) -> Result<Option<R::Object>>
    where
        R: Refresh<State = S> + ?Sized,
    {
        let span = info_span!("wait", waiter = self.waiter, timeout = ?self.timeout);
        let started = Instant::now();
        let outcome = self.poll_until_done(refresh, cancel).instrument(span).await;

        match &outcome {
            Ok(_) => metrics::observe_wait_duration(self.waiter, started.elapsed()),
            Err(e) => {
                let reason = match e {
                    Error::WaitTimeout { .. } => "timeout",
                    Error::UnexpectedState { .. } => "unexpected_state",
                    Error::Cancelled => "cancelled",
                    _ => "error",
                };
                metrics::increment_wait_failures(self.waiter, reason);
            }
        }
        outcome
    }

    async fn poll_until_done<R>(
        &self,
        refresh: &R,
        cancel: &CancellationToken,
    ) -> Result<Option<R::Object>>
    where
        R: Refresh<State = S> + ?Sized,
    {
        let deadline = Instant::now() + self.timeout;
        let mut backoff = FibonacciBackoff::from_poll_settings(&self.poll);
        let mut last_state = String::new();

        if !self.poll.initial_delay.is_zero() {
            sleep_with_cancellation(cancel, self.poll.initial_delay).await?;
        }

        loop {
            match with_cancellation(cancel, refresh.refresh()).await?? {
                Observation::Absent if self.target_absent => {
                    debug!("Object is gone");
                    return Ok(None);
                }
                Observation::Absent => {
                    return Err(Error::UnexpectedState {
                        state: "absent".to_string(),
                        expected: self.target_label(),
                        detail: None,
                    });
                }
                Observation::Present { object, state } => {
                    if self.target.contains(&state) {
                        debug!(state = %state, "Target state reached");
                        return Ok(Some(object));
                    }
                    if !self.pending.contains(&state) {
                        return Err(Error::UnexpectedState {
                            state: state.to_string(),
                            expected: self.target_label(),
                            detail: refresh.failure_detail(&object),
                        });
                    }
                    debug!(state = %state, "Still pending");
                    last_state = state.to_string();
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(Error::WaitTimeout {
                    last_state,
                    target: self.target_label(),
                    timeout: self.timeout,
                });
            }
            let pause = backoff.next_backoff().min(deadline - now);
            sleep_with_cancellation(cancel, pause).await?;
        }
    }
}

fn present<T>(object: Option<T>, resource: &'static str, id: &str) -> Result<T> {
    object.ok_or_else(|| NotFoundError::new(resource, id).into())
}

/// The concrete waits the reconcilers perform
#[derive(Clone, Copy)]
pub struct Waiter<'a> {
    api: &'a dyn KinesisAnalyticsApi,
    poll: PollSettings,
    cancel: &'a CancellationToken,
}

impl fmt::Debug for Waiter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Waiter")
            .field("poll", &self.poll)
            .finish_non_exhaustive()
    }
}

impl<'a> Waiter<'a> {
    #[must_use]
    pub fn new(
        api: &'a dyn KinesisAnalyticsApi,
        poll: PollSettings,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self { api, poll, cancel }
    }

    fn application(
        &self,
        waiter: &'static str,
        pending: &'static [ApplicationStatus],
        target: &'static [ApplicationStatus],
        target_absent: bool,
        timeout: Duration,
    ) -> StateChange<ApplicationStatus> {
        StateChange {
            waiter,
            pending,
            target,
            target_absent,
            timeout,
            poll: self.poll,
        }
    }

    /// STARTING until RUNNING
    ///
    /// # Errors
    ///
    /// See [`StateChange::wait`].
    pub async fn application_started(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<ApplicationDetail> {
        let conf = self.application(
            "application_started",
            &[ApplicationStatus::Starting],
            &[ApplicationStatus::Running],
            false,
            timeout,
        );
        let detail = conf
            .wait(&ApplicationStatusRefresh::new(self.api, name), self.cancel)
            .await?;
        present(detail, "Application", name)
    }

    /// FORCE_STOPPING / STOPPING until READY
    ///
    /// # Errors
    ///
    /// See [`StateChange::wait`].
    pub async fn application_stopped(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<ApplicationDetail> {
        let conf = self.application(
            "application_stopped",
            &[ApplicationStatus::ForceStopping, ApplicationStatus::Stopping],
            &[ApplicationStatus::Ready],
            false,
            timeout,
        );
        let detail = conf
            .wait(&ApplicationStatusRefresh::new(self.api, name), self.cancel)
            .await?;
        present(detail, "Application", name)
    }

    /// UPDATING until READY or RUNNING
    ///
    /// # Errors
    ///
    /// See [`StateChange::wait`].
    pub async fn application_updated(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<ApplicationDetail> {
        let conf = self.application(
            "application_updated",
            &[ApplicationStatus::Updating],
            &[ApplicationStatus::Ready, ApplicationStatus::Running],
            false,
            timeout,
        );
        let detail = conf
            .wait(&ApplicationStatusRefresh::new(self.api, name), self.cancel)
            .await?;
        present(detail, "Application", name)
    }

    /// DELETING until the application is gone
    ///
    /// # Errors
    ///
    /// See [`StateChange::wait`].
    pub async fn application_deleted(&self, name: &str, timeout: Duration) -> Result<()> {
        let conf = self.application(
            "application_deleted",
            &[ApplicationStatus::Deleting],
            &[],
            true,
            timeout,
        );
        conf.wait(&ApplicationStatusRefresh::new(self.api, name), self.cancel)
            .await
            .map(|_| ())
    }

    /// IN_PROGRESS until SUCCESSFUL; a FAILED operation carries its failure message
    ///
    /// # Errors
    ///
    /// See [`StateChange::wait`].
    pub async fn operation_succeeded(
        &self,
        application_name: &str,
        operation_id: &str,
        timeout: Duration,
    ) -> Result<OperationDetail> {
        let conf = StateChange {
            waiter: "operation_succeeded",
            pending: &[OperationStatus::InProgress],
            target: &[OperationStatus::Successful],
            target_absent: false,
            timeout,
            poll: self.poll,
        };
        let detail = conf
            .wait(
                &OperationStatusRefresh::new(self.api, application_name, operation_id),
                self.cancel,
            )
            .await?;
        present(detail, "Application Operation", operation_id)
    }

    /// CREATING until READY
    ///
    /// # Errors
    ///
    /// See [`StateChange::wait`].
    pub async fn snapshot_created(
        &self,
        application_name: &str,
        snapshot_name: &str,
        timeout: Duration,
    ) -> Result<SnapshotDetail> {
        let conf = StateChange {
            waiter: "snapshot_created",
            pending: &[SnapshotStatus::Creating],
            target: &[SnapshotStatus::Ready],
            target_absent: false,
            timeout,
            poll: self.poll,
        };
        let detail = conf
            .wait(
                &SnapshotStatusRefresh::new(self.api, application_name, snapshot_name),
                self.cancel,
            )
            .await?;
        present(detail, "Application Snapshot", snapshot_name)
    }

    /// DELETING until the snapshot is gone
    ///
    /// # Errors
    ///
    /// See [`StateChange::wait`].
    pub async fn snapshot_deleted(
        &self,
        application_name: &str,
        snapshot_name: &str,
        timeout: Duration,
    ) -> Result<()> {
        let conf = StateChange {
            waiter: "snapshot_deleted",
            pending: &[SnapshotStatus::Deleting],
            target: &[],
            target_absent: true,
            timeout,
            poll: self.poll,
        };
        conf.wait(
            &SnapshotStatusRefresh::new(self.api, application_name, snapshot_name),
            self.cancel,
        )
        .await
        .map(|_| ())
    }
}
