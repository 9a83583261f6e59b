//! # Reconciler Trait
//!
//! The `Reconciler` trait is the contract every remote resource type implements to be served by
//! the generic [`ReconcileActor`](crate::ReconcileActor). It names the declarative input
//! (`Desired`), the in-place change request (`Update`), the observed output (`Observed`) and the
//! runtime dependencies (`Context`), and provides the five lifecycle operations.
//!
//! The implementing type is a zero-sized marker (e.g. `struct Delivery;`). Nothing about the
//! resource is cached between calls: every operation talks to the remote API through the
//! context it is handed, and the encoded identifier is the only durable artifact.
//!
//! # Provided Methods
//! - [`Reconciler::update`] returns [`ReconcileError::Immutable`]; types with an in-place
//!   update path override it.
//! - [`Reconciler::import`] is a plain [`Reconciler::read`]. Write-only fields stay unset.

use crate::error::ReconcileError;
use async_trait::async_trait;
use std::fmt::Debug;

/// Outcome of a successful create: the identifier the caller must persist plus the state read
/// back after the write.
#[derive(Debug, Clone, PartialEq)]
pub struct Created<O> {
    pub id: String,
    pub observed: O,
}

/// Lifecycle operations for one kind of remote resource.
///
/// # Context
/// `Context` is injected at [`ReconcileActor::run`](crate::ReconcileActor::run), not at
/// construction, so API handles and poll settings can be chosen after the actor exists.
///
/// # Not found
/// A resource that no longer exists remotely is signalled by `Ok(None)` from `read`/`import`
/// and by `Ok(())` from `delete`. It is never an error at this surface.
#[async_trait]
pub trait Reconciler: Send + Sync + 'static {
    /// Resource type name used in logs and errors (e.g. `limelight_delivery`).
    const KIND: &'static str;

    /// Declarative input for `create`.
    type Desired: Send + Sync + Debug;

    /// Input for an in-place `update`.
    type Update: Send + Sync + Debug;

    /// State as read back from the remote API.
    type Observed: Clone + Send + Sync + Debug;

    /// Runtime dependencies (API handles, settings). Use `()` if none.
    type Context: Send + Sync;

    async fn create(
        ctx: &Self::Context,
        desired: Self::Desired,
    ) -> Result<Created<Self::Observed>, ReconcileError>;

    async fn read(ctx: &Self::Context, id: &str) -> Result<Option<Self::Observed>, ReconcileError>;

    async fn update(
        _ctx: &Self::Context,
        _id: &str,
        _update: Self::Update,
    ) -> Result<Self::Observed, ReconcileError> {
        Err(ReconcileError::Immutable { kind: Self::KIND })
    }

    async fn delete(ctx: &Self::Context, id: &str) -> Result<(), ReconcileError>;

    async fn import(
        ctx: &Self::Context,
        id: &str,
    ) -> Result<Option<Self::Observed>, ReconcileError> {
        Self::read(ctx, id).await
    }
}
