//! # Edge Function Alias Client
use crate::edge_function_alias::EdgeFunctionAlias;
use crate::error::ClientError;
use crate::model::{AliasUpdate, EdgeFunctionAliasSpec, EdgeFunctionAliasState};
use async_trait::async_trait;
use reconcile_framework::{Created, FrameworkError, ReconcileClient, ResourceClient};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct EdgeFunctionAliasClient {
    inner: ReconcileClient<EdgeFunctionAlias>,
}

impl EdgeFunctionAliasClient {
    pub fn new(inner: ReconcileClient<EdgeFunctionAlias>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn create_alias(
        &self,
        spec: EdgeFunctionAliasSpec,
    ) -> Result<Created<EdgeFunctionAliasState>, ClientError> {
        debug!("Sending request");
        self.inner.create(spec).await.map_err(Self::map_error)
    }

    /// `revision_id` must be the one last observed for this alias.
    #[instrument(skip(self))]
    pub async fn update_alias(
        &self,
        id: &str,
        desired: EdgeFunctionAliasSpec,
        revision_id: u64,
    ) -> Result<EdgeFunctionAliasState, ClientError> {
        debug!("Sending request");
        self.inner
            .update(
                id.to_string(),
                AliasUpdate {
                    desired,
                    revision_id,
                },
            )
            .await
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ResourceClient<EdgeFunctionAlias> for EdgeFunctionAliasClient {
    type Error = ClientError;

    fn inner(&self) -> &ReconcileClient<EdgeFunctionAlias> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        ClientError::from(e)
    }
}
