//! # Delivery Client
//!
//! High-level API for the delivery actor.
use crate::delivery::Delivery;
use crate::error::ClientError;
use crate::model::{DeliverySpec, DeliveryState};
use async_trait::async_trait;
use reconcile_framework::{Created, FrameworkError, ReconcileClient, ResourceClient};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct DeliveryClient {
    inner: ReconcileClient<Delivery>,
}

impl DeliveryClient {
    pub fn new(inner: ReconcileClient<Delivery>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn create_delivery(
        &self,
        spec: DeliverySpec,
    ) -> Result<Created<DeliveryState>, ClientError> {
        debug!("Sending request");
        self.inner.create(spec).await.map_err(Self::map_error)
    }

    /// Replaces the whole configuration in one call.
    #[instrument(skip(self))]
    pub async fn update_delivery(
        &self,
        id: &str,
        spec: DeliverySpec,
    ) -> Result<DeliveryState, ClientError> {
        debug!("Sending request");
        self.inner
            .update(id.to_string(), spec)
            .await
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ResourceClient<Delivery> for DeliveryClient {
    type Error = ClientError;

    fn inner(&self) -> &ReconcileClient<Delivery> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        ClientError::from(e)
    }
}
