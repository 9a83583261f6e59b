//! Error type returned by the typed resource clients.

use reconcile_framework::{FrameworkError, ReconcileError};
use thiserror::Error;

/// Errors that can occur when calling a resource actor through its typed client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The actor could not be reached or dropped the request.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),

    /// The reconciler ran and failed.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

impl From<FrameworkError> for ClientError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::Reconcile(inner) => ClientError::Reconcile(inner),
            other => ClientError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl ClientError {
    /// The reconciliation failure, if the actor got that far.
    pub fn reconcile_error(&self) -> Option<&ReconcileError> {
        match self {
            ClientError::Reconcile(e) => Some(e),
            ClientError::ActorCommunicationError(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framework_errors_split_by_origin() {
        let closed = ClientError::from(FrameworkError::ActorClosed);
        assert!(matches!(closed, ClientError::ActorCommunicationError(_)));
        assert!(closed.reconcile_error().is_none());

        let failed = ClientError::from(FrameworkError::Reconcile(ReconcileError::Invalid(
            "no profiles".into(),
        )));
        assert!(matches!(
            failed.reconcile_error(),
            Some(ReconcileError::Invalid(_))
        ));
        assert_eq!(failed.to_string(), "invalid desired state: no profiles");
    }
}
