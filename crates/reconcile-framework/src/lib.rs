//! # Reconcile Framework
//!
//! Building blocks for reconciling declared desired state against a remote management API.
//!
//! ## Architecture Overview
//!
//! 1. **Reconciler layer** ([`Reconciler`]) - per resource type: create, read, update, delete
//!    and import against the remote API.
//! 2. **Runtime layer** ([`ReconcileActor`]) - one task per resource type that serves requests
//!    strictly in order.
//! 3. **Interface layer** ([`ReconcileClient`], [`ResourceClient`]) - typed async handles.
//!
//! Supporting pieces every reconciler leans on:
//!
//! - [`identity`] - folds a resource hierarchy into one `:`-delimited identifier and back.
//! - [`changes`] - named field comparators for deciding what an update has to touch.
//! - [`poller`] - waits for asynchronously provisioned resources to settle.
//! - [`error`] - the shared error taxonomy.
//! - [`mock`] - expectation-driven clients for tests.
//!
//! ## Context Injection
//!
//! Dependencies are handed to [`ReconcileActor::run`] rather than to `new`, so the API handles
//! and poll settings are chosen when the system starts:
//!
//! ```rust
//! use async_trait::async_trait;
//! use reconcile_framework::{Created, ReconcileActor, ReconcileError, Reconciler};
//! use std::collections::HashMap;
//! use std::sync::{Arc, Mutex};
//!
//! type Store = Arc<Mutex<HashMap<String, String>>>;
//!
//! #[derive(Debug)]
//! struct Entry;
//!
//! #[async_trait]
//! impl Reconciler for Entry {
//!     const KIND: &'static str = "entry";
//!     type Desired = (String, String);
//!     type Update = String;
//!     type Observed = String;
//!     type Context = Store;
//!
//!     async fn create(
//!         store: &Store,
//!         (key, value): (String, String),
//!     ) -> Result<Created<String>, ReconcileError> {
//!         store.lock().unwrap().insert(key.clone(), value.clone());
//!         Ok(Created { id: key, observed: value })
//!     }
//!     async fn read(store: &Store, id: &str) -> Result<Option<String>, ReconcileError> {
//!         Ok(store.lock().unwrap().get(id).cloned())
//!     }
//!     async fn update(store: &Store, id: &str, value: String) -> Result<String, ReconcileError> {
//!         store.lock().unwrap().insert(id.to_string(), value.clone());
//!         Ok(value)
//!     }
//!     async fn delete(store: &Store, id: &str) -> Result<(), ReconcileError> {
//!         store.lock().unwrap().remove(id);
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ReconcileActor::<Entry>::new(10);
//!     tokio::spawn(actor.run(Store::default()));
//!
//!     let created = client.create(("k".into(), "v1".into())).await.unwrap();
//!     client.update(created.id.clone(), "v2".into()).await.unwrap();
//!     assert_eq!(client.read(created.id).await.unwrap().as_deref(), Some("v2"));
//! }
//! ```

pub mod actor;
pub mod changes;
pub mod client;
pub mod client_trait;
pub mod error;
pub mod identity;
pub mod message;
pub mod mock;
pub mod poller;
pub mod reconciler;
pub mod tracing;

// Re-export core types for convenience
pub use actor::ReconcileActor;
pub use client::ReconcileClient;
pub use client_trait::ResourceClient;
pub use error::{ApiError, FormatError, FrameworkError, ReconcileError};
pub use message::{ReconcileRequest, Response};
pub use poller::{PollSettings, ProvisioningState};
pub use reconciler::{Created, Reconciler};
