//! # Streaming Slot Client
//!
//! Slots have no update path; replacing one means delete and create.
use crate::error::ClientError;
use crate::model::{StreamingSlotSpec, StreamingSlotState};
use crate::streaming_slot::StreamingSlot;
use async_trait::async_trait;
use reconcile_framework::{Created, FrameworkError, ReconcileClient, ResourceClient};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct StreamingSlotClient {
    inner: ReconcileClient<StreamingSlot>,
}

impl StreamingSlotClient {
    pub fn new(inner: ReconcileClient<StreamingSlot>) -> Self {
        Self { inner }
    }

    /// Resolves once the slot has finished provisioning, unless `wait_for_provisioning` is off.
    #[instrument(skip(self))]
    pub async fn create_slot(
        &self,
        spec: StreamingSlotSpec,
    ) -> Result<Created<StreamingSlotState>, ClientError> {
        debug!("Sending request");
        self.inner.create(spec).await.map_err(Self::map_error)
    }
}

#[async_trait]
impl ResourceClient<StreamingSlot> for StreamingSlotClient {
    type Error = ClientError;

    fn inner(&self) -> &ReconcileClient<StreamingSlot> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        ClientError::from(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile_framework::mock::MockClient;
    use reconcile_framework::ReconcileError;
    use std::time::Duration;

    #[tokio::test]
    async fn test_poll_timeout_surfaces_with_the_slot_id() {
        let mut mock = MockClient::<StreamingSlot>::new();
        mock.expect_create()
            .return_err(FrameworkError::Reconcile(ReconcileError::PollTimeout {
                id: "acct:abc123".into(),
                waited: Duration::from_secs(1200),
            }));
        mock.expect_import("acct:abc123").return_ok(None);

        let slot_client = StreamingSlotClient::new(mock.client());
        let spec = serde_json::from_value(serde_json::json!({
            "shortname": "acct",
            "name": "live-1",
            "region": "europe",
            "profile": [{ "video_bitrate": 800, "audio_bitrate": 64 }]
        }))
        .unwrap();

        match slot_client.create_slot(spec).await {
            Err(ClientError::Reconcile(ReconcileError::PollTimeout { id, .. })) => {
                assert_eq!(id, "acct:abc123");
            }
            other => panic!("expected poll timeout, got {other:?}"),
        }
        assert_eq!(slot_client.import("acct:abc123").await.unwrap(), None);
        mock.verify();
    }
}
