//! # IAM Propagation Retry
//!
//! The control plane checks IAM when a mutation references a role, stream,
//! Lambda function or S3 object, and newly created policies can take a while
//! to become visible to it. [`PropagationRetry`] retries a call for a bounded
//! window while the failure matches one of its [`ErrorMatcher`]s. Any other
//! failure is returned at once.
//!
//! When the window runs out the call is made exactly once more and that
//! attempt's outcome is returned as-is, so the caller always sees a real
//! remote error rather than a synthetic timeout.

use super::backoff::FibonacciBackoff;
use super::wait::{sleep_with_cancellation, with_cancellation};
use crate::config::{ControllerConfig, PollSettings};
use crate::constants::IAM_PROPAGATION_MESSAGES;
use crate::error::{RemoteError, RemoteErrorKind, Result};
use crate::observability::metrics;
use crate::provider::RemoteResult;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Predicate selecting retryable errors
pub type ErrorMatcher = Arc<dyn Fn(&RemoteError) -> bool + Send + Sync>;

/// Match errors of `kind` whose message contains `fragment`
#[must_use]
pub fn message_matcher(kind: RemoteErrorKind, fragment: impl Into<String>) -> ErrorMatcher {
    let fragment = fragment.into();
    Arc::new(move |e: &RemoteError| e.matches(kind, &fragment))
}

/// The known "IAM change not visible yet" failures, all `InvalidArgumentException`
#[must_use]
pub fn iam_propagation_matchers() -> Vec<ErrorMatcher> {
    IAM_PROPAGATION_MESSAGES
        .iter()
        .map(|fragment| message_matcher(RemoteErrorKind::InvalidArgument, *fragment))
        .collect()
}

/// Bounded retry of a remote mutation while IAM changes propagate
#[derive(Clone)]
pub struct PropagationRetry {
    timeout: Duration,
    poll: PollSettings,
    matchers: Vec<ErrorMatcher>,
}

impl fmt::Debug for PropagationRetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropagationRetry")
            .field("timeout", &self.timeout)
            .field("poll", &self.poll)
            .field("matchers", &self.matchers.len())
            .finish()
    }
}

impl PropagationRetry {
    /// Retry with the IAM propagation matchers
    #[must_use]
    pub fn new(timeout: Duration, poll: PollSettings) -> Self {
        Self {
            timeout,
            poll,
            matchers: iam_propagation_matchers(),
        }
    }

    #[must_use]
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.propagation_timeout(), config.poll_settings())
    }

    /// Add a matcher
    #[must_use]
    pub fn with_matcher(mut self, matcher: ErrorMatcher) -> Self {
        self.matchers.push(matcher);
        self
    }

    #[must_use]
    pub fn is_retryable(&self, error: &RemoteError) -> bool {
        self.matchers.iter().any(|m| m(error))
    }

    /// Run `call`, retrying matched failures within the window
    ///
    /// # Errors
    ///
    /// The first non-retryable error, the outcome of the final attempt once
    /// the window is exhausted, or [`crate::Error::Cancelled`].
    pub async fn call<T, F, Fut>(
        &self,
        operation: &str,
        cancel: &CancellationToken,
        mut call: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RemoteResult<T>>,
    {
        let deadline = Instant::now() + self.timeout;
        let mut backoff = FibonacciBackoff::from_poll_settings(&self.poll);
        let mut attempt: u32 = 1;

        loop {
            let error = match with_cancellation(cancel, call()).await? {
                Ok(value) => return Ok(value),
                Err(e) if !self.is_retryable(&e) => return Err(e.into()),
                Err(e) => e,
            };

            let now = Instant::now();
            if now >= deadline {
                debug!(
                    operation,
                    attempt, "IAM propagation window exhausted, making final attempt"
                );
                break;
            }

            warn!(
                operation,
                attempt,
                error = %error,
                "Retrying while IAM changes propagate"
            );
            metrics::increment_propagation_retries();
            sleep_with_cancellation(cancel, backoff.next_backoff().min(deadline - now)).await?;
            attempt += 1;
        }

        with_cancellation(cancel, call())
            .await?
            .map_err(Into::into)
    }
}
