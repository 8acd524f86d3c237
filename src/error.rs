//! # Errors
//!
//! Error taxonomy shared by the fetchers, the wait engine, the retry wrapper and
//! the reconcilers, plus the host-facing [`Diagnostic`] form.
//!
//! Remote failures are classified once, at the API boundary, into a
//! [`RemoteErrorKind`]. Everything above the boundary only ever asks
//! questions of the kind (`is_not_found`, `kind == InvalidArgument`) and never
//! inspects SDK types.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result alias used across the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Classification of a failed remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteErrorKind {
    ResourceNotFound,
    InvalidArgument,
    ConcurrentModification,
    ResourceInUse,
    InvalidRequest,
    InvalidApplicationConfiguration,
    LimitExceeded,
    UnsupportedOperation,
    Throttling,
    /// Any other error reported by the service
    Service,
    /// The request never got a response (connect, timeout, dispatch)
    Transport,
}

impl RemoteErrorKind {
    /// Map a service error code (e.g. `ResourceNotFoundException`) to a kind
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "ResourceNotFoundException" => Self::ResourceNotFound,
            "InvalidArgumentException" => Self::InvalidArgument,
            "ConcurrentModificationException" => Self::ConcurrentModification,
            "ResourceInUseException" => Self::ResourceInUse,
            "InvalidRequestException" => Self::InvalidRequest,
            "InvalidApplicationConfigurationException" => Self::InvalidApplicationConfiguration,
            "LimitExceededException" | "TooManyTagsException" => Self::LimitExceeded,
            "UnsupportedOperationException" => Self::UnsupportedOperation,
            "ThrottlingException" => Self::Throttling,
            _ => Self::Service,
        }
    }

    /// Label used in metrics
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceNotFound => "resource_not_found",
            Self::InvalidArgument => "invalid_argument",
            Self::ConcurrentModification => "concurrent_modification",
            Self::ResourceInUse => "resource_in_use",
            Self::InvalidRequest => "invalid_request",
            Self::InvalidApplicationConfiguration => "invalid_application_configuration",
            Self::LimitExceeded => "limit_exceeded",
            Self::UnsupportedOperation => "unsupported_operation",
            Self::Throttling => "throttling",
            Self::Service => "service",
            Self::Transport => "transport",
        }
    }
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed remote call, as reported by the control plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    /// Service error code, when the service returned one
    pub code: Option<String>,
    pub message: String,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.code.as_deref().unwrap_or(self.kind.as_str());
        write!(f, "{code}: {}", self.message)
    }
}

impl std::error::Error for RemoteError {}

impl RemoteError {
    #[must_use]
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
        }
    }

    /// Build from a service error code, classifying it
    #[must_use]
    pub fn from_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            kind: RemoteErrorKind::from_code(&code),
            code: Some(code),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::from_code("ResourceNotFoundException", message)
    }

    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::from_code("InvalidArgumentException", message)
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == RemoteErrorKind::ResourceNotFound
    }

    /// True when the error is of `kind` and its message contains `fragment`
    #[must_use]
    pub fn matches(&self, kind: RemoteErrorKind, fragment: &str) -> bool {
        self.kind == kind && self.message.contains(fragment)
    }
}

/// A typed "resource is absent" signal from a finder
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("couldn't find resource {resource} ({id})")]
pub struct NotFoundError {
    pub resource: &'static str,
    pub id: String,
    /// The remote error that reported the absence, when there was one
    pub last_error: Option<RemoteError>,
}

impl NotFoundError {
    #[must_use]
    pub fn new(resource: &'static str, id: impl Into<String>) -> Self {
        Self {
            resource,
            id: id.into(),
            last_error: None,
        }
    }

    #[must_use]
    pub fn with_last_error(mut self, error: RemoteError) -> Self {
        self.last_error = Some(error);
        self
    }
}

/// Errors surfaced by the reconcilers
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Bad declared state or an operation requested in the wrong status
    #[error("{0}")]
    Validation(String),

    #[error("unexpected format for ID ({id}), expected {expected}")]
    InvalidIdentifier { id: String, expected: &'static str },

    #[error(
        "timeout while waiting for state to become '{target}' (last state: '{last_state}', timeout: {timeout:?})"
    )]
    WaitTimeout {
        last_state: String,
        target: String,
        timeout: Duration,
    },

    #[error("unexpected state '{state}', wanted target '{expected}'{}", last_error_suffix(.detail))]
    UnexpectedState {
        state: String,
        expected: String,
        detail: Option<String>,
    },

    #[error("operation cancelled")]
    Cancelled,

    /// The declared change cannot be applied in place
    #[error("{resource} ({id}) requires replacement: {reason}")]
    RequiresReplacement {
        resource: &'static str,
        id: String,
        reason: String,
    },

    #[error("{action}: {source}")]
    Context {
        action: String,
        #[source]
        source: Box<Error>,
    },
}

fn last_error_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(". last error: {d}"))
        .unwrap_or_default()
}

impl Error {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wrap with a human-readable action, e.g. `updating Kinesis Analytics v2 Application (x)`
    #[must_use]
    pub fn context(self, action: impl Into<String>) -> Self {
        Self::Context {
            action: action.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with all context layers removed
    #[must_use]
    pub fn root(&self) -> &Error {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Absent resource, either from a finder or straight from the remote
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self.root() {
            Self::NotFound(_) => true,
            Self::Remote(e) => e.is_not_found(),
            _ => false,
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), Self::Cancelled)
    }

    #[must_use]
    pub fn is_wait_timeout(&self) -> bool {
        matches!(self.root(), Self::WaitTimeout { .. })
    }

    /// The remote error at the root, if any
    #[must_use]
    pub fn remote(&self) -> Option<&RemoteError> {
        match self.root() {
            Self::Remote(e) => Some(e),
            Self::NotFound(e) => e.last_error.as_ref(),
            _ => None,
        }
    }
}

/// Attach an action description to a fallible result
pub trait ResultExt<T> {
    /// Wrap the error with `action()`; the closure only runs on failure
    fn with_action<F, S>(self, action: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn with_action<F, S>(self, action: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| e.into().context(action()))
    }
}

/// Diagnostic severity reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A host-facing diagnostic
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// The summary is the full message; the detail names the root cause class
    #[must_use]
    pub fn from_error(error: &Error) -> Self {
        let detail = match error.root() {
            Error::Remote(e) => Some(format!("remote error kind: {}", e.kind)),
            Error::WaitTimeout { last_state, .. } => Some(format!("last observed state: {last_state}")),
            Error::UnexpectedState { state, .. } => Some(format!("observed state: {state}")),
            Error::RequiresReplacement { .. } => {
                Some("destroy and re-create the resource to apply this change".to_string())
            }
            _ => None,
        };
        Self {
            severity: Severity::Error,
            summary: error.to_string(),
            detail,
        }
    }
}

impl From<Error> for Diagnostic {
    fn from(error: Error) -> Self {
        Self::from_error(&error)
    }
}

/// Ordered list of diagnostics returned to the host
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct Diagnostics(pub Vec<Diagnostic>);

impl Diagnostics {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }
}

impl From<Error> for Diagnostics {
    fn from(error: Error) -> Self {
        Self(vec![Diagnostic::from_error(&error)])
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let level = match d.severity {
                Severity::Error => "Error",
                Severity::Warning => "Warning",
            };
            write!(f, "{level}: {}", d.summary)?;
            if let Some(detail) = &d.detail {
                write!(f, " ({detail})")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_classification() {
        let err = RemoteError::from_code("ResourceNotFoundException", "Application foo not found");
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "ResourceNotFoundException: Application foo not found"
        );

        let err = RemoteError::from_code("SomethingNew", "boom");
        assert_eq!(err.kind, RemoteErrorKind::Service);
    }

    #[test]
    fn test_not_found_seen_through_context() {
        let err = Error::from(RemoteError::not_found("gone"))
            .context("deleting Kinesis Analytics v2 Application (foo)")
            .context("outer");
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "outer: deleting Kinesis Analytics v2 Application (foo): ResourceNotFoundException: gone"
        );
    }

    #[test]
    fn test_with_action_prefixes_message() {
        let res: std::result::Result<(), RemoteError> =
            Err(RemoteError::invalid_argument("bad input"));
        let err = res
            .with_action(|| "updating Application Maintenance Configuration (foo)")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "updating Application Maintenance Configuration (foo): InvalidArgumentException: bad input"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_diagnostic_from_wait_timeout() {
        let err = Error::WaitTimeout {
            last_state: "STARTING".to_string(),
            target: "RUNNING".to_string(),
            timeout: Duration::from_secs(600),
        };
        let diag = Diagnostic::from_error(&err);
        assert_eq!(diag.severity, Severity::Error);
        assert!(diag.summary.contains("RUNNING"));
        assert_eq!(diag.detail.as_deref(), Some("last observed state: STARTING"));
    }
}
