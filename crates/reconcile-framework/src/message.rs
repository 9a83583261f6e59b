//! # Reconcile Messages
//!
//! Request types sent from a [`ReconcileClient`](crate::ReconcileClient) to its
//! [`ReconcileActor`](crate::ReconcileActor).

use crate::error::FrameworkError;
use crate::reconciler::{Created, Reconciler};
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// One lifecycle operation against a single remote resource.
///
/// The variants map onto the [`Reconciler`] operations. Identifiers travel as the encoded
/// string the caller persisted; the reconciler decodes them itself.
#[derive(Debug)]
pub enum ReconcileRequest<T: Reconciler> {
    Create {
        desired: T::Desired,
        respond_to: Response<Created<T::Observed>>,
    },
    Read {
        id: String,
        respond_to: Response<Option<T::Observed>>,
    },
    Update {
        id: String,
        update: T::Update,
        respond_to: Response<T::Observed>,
    },
    Delete {
        id: String,
        respond_to: Response<()>,
    },
    Import {
        id: String,
        respond_to: Response<Option<T::Observed>>,
    },
}
