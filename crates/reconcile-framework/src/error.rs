//! # Reconciliation Errors
//!
//! This module defines the error taxonomy shared by every reconciler and by the
//! actor plumbing that serves them.
//!
//! - [`FormatError`] - a composite identifier could not be encoded or decoded.
//! - [`ApiError`] - the remote management API reported a failure.
//! - [`ReconcileError`] - the terminal outcome of a failed reconciliation step.
//! - [`FrameworkError`] - the reconcile actor could not be reached, or the
//!   reconciler it serves returned a [`ReconcileError`].
//!
//! A remote "not found" is deliberately *not* an error at the reconciler
//! surface: `read`/`import` return `Ok(None)` and `delete` returns `Ok(())`.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// A composite identifier was malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("unexpected format (expected '{expected}'): {value}")]
    Shape {
        expected: &'static str,
        value: String,
    },
    #[error("identifier component {index} is empty")]
    EmptyComponent { index: usize },
    #[error("identifier component {component:?} contains the delimiter '{delimiter}'")]
    DelimiterInComponent {
        component: String,
        delimiter: &'static str,
    },
    #[error("unsupported identifier arity {0} (expected 2 or 3)")]
    Arity(usize),
}

/// Failure reported by the remote management API.
///
/// `status` carries the transport status when one was received. A `404` is the
/// only status the reconcilers branch on; see [`ApiError::is_not_found`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    /// A failure that never produced a response (connection reset, DNS, ...).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Why a reconciliation step failed.
///
/// None of these are retried internally; every variant is handed back to the
/// caller as the terminal outcome of the current operation.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("error during {operation} of {id}: {source}")]
    Remote {
        operation: &'static str,
        id: String,
        #[source]
        source: ApiError,
    },

    /// A multi-facet update stopped part way. The facets in `applied` are live
    /// on the remote side, `failed` and everything after it are not.
    #[error(
        "partial update of {id}: applied [{done}] before {failed} failed: {source}",
        done = .applied.join(", ")
    )]
    PartialUpdate {
        id: String,
        applied: Vec<&'static str>,
        failed: &'static str,
        #[source]
        source: Box<ReconcileError>,
    },

    /// Provisioning did not settle in time. The resource still exists under `id`.
    #[error("timed out after {waited:?} waiting for {id} to finish provisioning")]
    PollTimeout { id: String, waited: Duration },

    /// NOTE: may also be read-after-write lag on the remote side; not retried.
    #[error("{id} was not found while waiting for provisioning")]
    PollNotFound { id: String },

    #[error("{id} reported unexpected provisioning state {state:?}")]
    UnexpectedState { id: String, state: String },

    /// A secondary create step failed and the primary resource was deleted
    /// again. `source` is the secondary failure; a failed compensating delete
    /// is only recorded in `rollback_error`.
    #[error("creation of {id} was rolled back: {source}")]
    CreateRollback {
        id: String,
        #[source]
        source: Box<ReconcileError>,
        rollback_error: Option<String>,
    },

    #[error("{kind} {id} disappeared right after being written")]
    Vanished { kind: &'static str, id: String },

    #[error("{kind} does not support in-place updates; it must be replaced")]
    Immutable { kind: &'static str },

    #[error("invalid desired state: {0}")]
    Invalid(String),

    #[error("failed to load function archive {}: {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReconcileError {
    pub fn remote(operation: &'static str, id: impl Into<String>, source: ApiError) -> Self {
        Self::Remote {
            operation,
            id: id.into(),
            source,
        }
    }

    /// The underlying remote failure, if this error (or the step it wraps) was one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Remote { source, .. } => Some(source),
            Self::PartialUpdate { source, .. } | Self::CreateRollback { source, .. } => {
                source.api_error()
            }
            _ => None,
        }
    }
}

/// Errors that can occur within the reconcile framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}
