//! # Edge Function Client
//!
//! High-level API for the edge function actor.
use crate::edge_function::EdgeFunction;
use crate::error::ClientError;
use crate::model::{EdgeFunctionSpec, EdgeFunctionState, EdgeFunctionUpdate};
use async_trait::async_trait;
use reconcile_framework::{Created, FrameworkError, ReconcileClient, ResourceClient};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct EdgeFunctionClient {
    inner: ReconcileClient<EdgeFunction>,
}

impl EdgeFunctionClient {
    pub fn new(inner: ReconcileClient<EdgeFunction>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn create_edge_function(
        &self,
        spec: EdgeFunctionSpec,
    ) -> Result<Created<EdgeFunctionState>, ClientError> {
        debug!("Sending request");
        self.inner.create(spec).await.map_err(Self::map_error)
    }

    /// Moves the function from `prior` to `desired`, touching only the facets that changed.
    #[instrument(skip(self, prior, desired), fields(name = %desired.name))]
    pub async fn update_edge_function(
        &self,
        id: &str,
        prior: EdgeFunctionSpec,
        desired: EdgeFunctionSpec,
    ) -> Result<EdgeFunctionState, ClientError> {
        debug!("Sending request");
        self.inner
            .update(id.to_string(), EdgeFunctionUpdate { prior, desired })
            .await
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ResourceClient<EdgeFunction> for EdgeFunctionClient {
    type Error = ClientError;

    fn inner(&self) -> &ReconcileClient<EdgeFunction> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        ClientError::from(e)
    }
}
