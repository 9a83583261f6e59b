//! # ResourceClient Trait
//!
//! Common interface for resource-specific clients, adding default `read`, `import` and `delete`
//! methods on top of a generic [`ReconcileClient`].
use crate::{FrameworkError, ReconcileClient, Reconciler};
use async_trait::async_trait;

/// Trait for typed resource clients to inherit the identifier-only operations.
///
/// Create and update take resource-specific input, so typed clients write those by hand.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use reconcile_framework::{
///     Created, FrameworkError, ReconcileClient, ReconcileError, Reconciler, ResourceClient,
/// };
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
/// struct NoteClient {
///     inner: ReconcileClient<Note>,
/// }
///
/// impl ResourceClient<Note> for NoteClient {
///     type Error = String;
///
///     fn inner(&self) -> &ReconcileClient<Note> {
///         &self.inner
///     }
///
///     fn map_error(e: FrameworkError) -> Self::Error {
///         e.to_string()
///     }
/// }
///
/// async fn usage(client: NoteClient) {
///     // read(), import() and delete() come for free
///     let _ = client.read("n1").await;
///     let _ = client.delete("n1").await;
/// }
/// ```
#[async_trait]
pub trait ResourceClient<T: Reconciler>: Send + Sync {
    /// The resource-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic ReconcileClient.
    fn inner(&self) -> &ReconcileClient<T>;

    /// Map framework errors to the specific resource error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Read the current remote state. `None` means the resource is gone.
    #[tracing::instrument(skip(self))]
    async fn read(&self, id: &str) -> Result<Option<T::Observed>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().read(id.to_string()).await.map_err(Self::map_error)
    }

    /// Adopt an existing remote resource by identifier.
    #[tracing::instrument(skip(self))]
    async fn import(&self, id: &str) -> Result<Option<T::Observed>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().import(id.to_string()).await.map_err(Self::map_error)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id.to_string()).await.map_err(Self::map_error)
    }
}
