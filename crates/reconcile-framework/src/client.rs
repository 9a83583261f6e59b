//! # Reconcile Client
//!
//! The sending half of a [`ReconcileActor`](crate::ReconcileActor).

use crate::error::FrameworkError;
use crate::message::ReconcileRequest;
use crate::reconciler::{Created, Reconciler};
use tokio::sync::{mpsc, oneshot};

/// A type-safe handle for issuing lifecycle requests to a `ReconcileActor`.
///
/// Holds only a sender, so cloning is cheap and clones can be shared across tasks. Every call
/// resolves after the actor has finished the remote work for that request.
pub struct ReconcileClient<T: Reconciler> {
    sender: mpsc::Sender<ReconcileRequest<T>>,
}

impl<T: Reconciler> Clone for ReconcileClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Reconciler> ReconcileClient<T> {
    pub fn new(sender: mpsc::Sender<ReconcileRequest<T>>) -> Self {
        Self { sender }
    }

    async fn call<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<R, FrameworkError>>) -> ReconcileRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(
        &self,
        desired: T::Desired,
    ) -> Result<Created<T::Observed>, FrameworkError> {
        self.call(|respond_to| ReconcileRequest::Create {
            desired,
            respond_to,
        })
        .await
    }

    pub async fn read(&self, id: String) -> Result<Option<T::Observed>, FrameworkError> {
        self.call(|respond_to| ReconcileRequest::Read { id, respond_to })
            .await
    }

    pub async fn update(
        &self,
        id: String,
        update: T::Update,
    ) -> Result<T::Observed, FrameworkError> {
        self.call(|respond_to| ReconcileRequest::Update {
            id,
            update,
            respond_to,
        })
        .await
    }

    pub async fn delete(&self, id: String) -> Result<(), FrameworkError> {
        self.call(|respond_to| ReconcileRequest::Delete { id, respond_to })
            .await
    }

    pub async fn import(&self, id: String) -> Result<Option<T::Observed>, FrameworkError> {
        self.call(|respond_to| ReconcileRequest::Import { id, respond_to })
            .await
    }
}
