//! # Reconcile Actor
//!
//! This module defines the `ReconcileActor`, the task that serves every lifecycle request for
//! one resource type. Requests are processed strictly one at a time, so two operations on the
//! same resource type never interleave, including a create that is waiting on provisioning.

use crate::client::ReconcileClient;
use crate::error::FrameworkError;
use crate::message::ReconcileRequest;
use crate::reconciler::Reconciler;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The sequential server for one [`Reconciler`].
///
/// The actor holds no resource state. It owns the receiving end of the channel and forwards
/// each request to the matching `Reconciler` operation with the injected context.
///
/// # Usage Pattern
///
/// 1. **Create**: `ReconcileActor::new()` returns the actor and its client.
/// 2. **Wire**: pass the API handles into `actor.run(context)`.
/// 3. **Run**: spawn the future returned by `run`.
///
/// ```rust
/// use async_trait::async_trait;
/// use reconcile_framework::{Created, ReconcileActor, ReconcileError, Reconciler};
///
/// #[derive(Debug)]
/// struct Note;
///
/// #[async_trait]
/// impl Reconciler for Note {
///     const KIND: &'static str = "note";
///     type Desired = String;
///     type Update = ();
///     type Observed = String;
///     type Context = ();
///
///     async fn create(_: &(), text: String) -> Result<Created<String>, ReconcileError> {
///         Ok(Created { id: "n1".into(), observed: text })
///     }
///     async fn read(_: &(), _: &str) -> Result<Option<String>, ReconcileError> { Ok(None) }
///     async fn delete(_: &(), _: &str) -> Result<(), ReconcileError> { Ok(()) }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ReconcileActor::<Note>::new(10);
///     tokio::spawn(actor.run(()));
///
///     let created = client.create("hello".to_string()).await.unwrap();
///     assert_eq!(created.id, "n1");
///     assert!(client.read("n1".into()).await.unwrap().is_none());
/// }
/// ```
pub struct ReconcileActor<T: Reconciler> {
    receiver: mpsc::Receiver<ReconcileRequest<T>>,
}

impl<T: Reconciler> ReconcileActor<T> {
    /// Creates a new `ReconcileActor` and its associated `ReconcileClient`.
    ///
    /// `buffer_size` is the capacity of the request channel. When it is full, client calls
    /// wait for space.
    pub fn new(buffer_size: usize) -> (Self, ReconcileClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        (Self { receiver }, ReconcileClient::new(sender))
    }

    /// Runs the request loop until every client has been dropped.
    pub async fn run(mut self, context: T::Context) {
        let kind = T::KIND;
        let mut served: u64 = 0;
        info!(kind, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            served += 1;
            match msg {
                ReconcileRequest::Create {
                    desired,
                    respond_to,
                } => {
                    debug!(kind, ?desired, "Create");
                    let result = T::create(&context, desired).await;
                    match &result {
                        Ok(created) => info!(kind, id = %created.id, "Created"),
                        Err(e) => warn!(kind, error = %e, "Create failed"),
                    }
                    let _ = respond_to.send(result.map_err(FrameworkError::from));
                }
                ReconcileRequest::Read { id, respond_to } => {
                    let result = T::read(&context, &id).await;
                    match &result {
                        Ok(Some(_)) => debug!(kind, %id, "Read"),
                        Ok(None) => info!(kind, %id, "Not found; drop from state"),
                        Err(e) => warn!(kind, %id, error = %e, "Read failed"),
                    }
                    let _ = respond_to.send(result.map_err(FrameworkError::from));
                }
                ReconcileRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(kind, %id, ?update, "Update");
                    let result = T::update(&context, &id, update).await;
                    match &result {
                        Ok(_) => info!(kind, %id, "Updated"),
                        Err(e) => warn!(kind, %id, error = %e, "Update failed"),
                    }
                    let _ = respond_to.send(result.map_err(FrameworkError::from));
                }
                ReconcileRequest::Delete { id, respond_to } => {
                    debug!(kind, %id, "Delete");
                    let result = T::delete(&context, &id).await;
                    match &result {
                        Ok(()) => info!(kind, %id, "Deleted"),
                        Err(e) => warn!(kind, %id, error = %e, "Delete failed"),
                    }
                    let _ = respond_to.send(result.map_err(FrameworkError::from));
                }
                ReconcileRequest::Import { id, respond_to } => {
                    let result = T::import(&context, &id).await;
                    match &result {
                        Ok(Some(_)) => info!(kind, %id, "Imported"),
                        Ok(None) => warn!(kind, %id, "Nothing to import"),
                        Err(e) => warn!(kind, %id, error = %e, "Import failed"),
                    }
                    let _ = respond_to.send(result.map_err(FrameworkError::from));
                }
            }
        }

        info!(kind, served, "Shutdown");
    }
}
