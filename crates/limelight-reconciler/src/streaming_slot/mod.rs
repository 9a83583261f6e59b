//! # Realtime Streaming Slot Reconciler
//!
//! Manages `limelight_realtime_streaming_slot`, identified as `shortname:slot_id` where the slot
//! id is issued by the API.
//!
//! Slots are provisioned asynchronously. Unless `wait_for_provisioning` is off, create polls the
//! slot until it reports `READY` or `FAILED` (see [`wait_until_terminal`]). A poll failure does
//! not delete the slot: the error carries the encoded id so the caller can still record it.
//!
//! Every declared field forces replacement, so there is no update path.

use crate::api::{found, ConfigurationApi, RealtimeStreamingSlot, SlotInfo};
use crate::model::{StreamingSlotSpec, StreamingSlotState};
use crate::transcode::{expand_profiles, flatten_profiles};
use async_trait::async_trait;
use reconcile_framework::identity;
use reconcile_framework::poller::wait_until_terminal;
use reconcile_framework::{
    Created, PollSettings, ProvisioningState, ReconcileActor, ReconcileClient, ReconcileError,
    Reconciler,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Runtime dependencies of the slot actor.
#[derive(Clone)]
pub struct SlotContext {
    pub api: Arc<dyn ConfigurationApi>,
    pub provisioning: PollSettings,
}

#[derive(Debug)]
pub struct StreamingSlot;

/// Creates a new streaming slot actor and its client.
pub fn new() -> (ReconcileActor<StreamingSlot>, ReconcileClient<StreamingSlot>) {
    ReconcileActor::new(32)
}

fn request(spec: &StreamingSlotSpec) -> RealtimeStreamingSlot {
    RealtimeStreamingSlot {
        name: spec.name.clone(),
        region: spec.region.clone(),
        profiles: expand_profiles(&spec.profiles),
        password: spec.password.clone(),
        ip_geo_match: spec.ip_geo_match.clone(),
        mediavault_enabled: spec.mediavault_enabled(),
        mediavault_secret_key: spec.mediavault_secret_key.clone(),
    }
}

fn observe(shortname: String, info: SlotInfo) -> StreamingSlotState {
    StreamingSlotState {
        shortname,
        slot_id: info.id,
        name: info.name,
        region: info.region,
        profiles: flatten_profiles(&info.profiles),
        ip_geo_match: info.ip_geo_match,
        mediavault_enabled: info.mediavault_enabled,
        mediavault_secret_key: info.mediavault_secret_key,
        state: info.state,
    }
}

/// One provisioning check. A missing slot is reported as [`ProvisioningState::NotFound`] so the
/// poller can fail on it.
async fn provisioning_state(
    api: &dyn ConfigurationApi,
    id: &str,
    shortname: &str,
    slot_id: &str,
) -> Result<ProvisioningState, ReconcileError> {
    match found(api.get_streaming_slot(shortname, slot_id).await) {
        Ok(Some(info)) => info.state.parse::<ProvisioningState>().map_err(|state| {
            ReconcileError::UnexpectedState {
                id: id.to_string(),
                state,
            }
        }),
        Ok(None) => Ok(ProvisioningState::NotFound),
        Err(e) => Err(ReconcileError::remote("get_streaming_slot", id, e)),
    }
}

#[async_trait]
impl Reconciler for StreamingSlot {
    const KIND: &'static str = "limelight_realtime_streaming_slot";
    type Desired = StreamingSlotSpec;
    type Update = StreamingSlotSpec;
    type Observed = StreamingSlotState;
    type Context = SlotContext;

    async fn create(
        ctx: &SlotContext,
        desired: StreamingSlotSpec,
    ) -> Result<Created<StreamingSlotState>, ReconcileError> {
        desired.validate()?;
        info!(
            shortname = %desired.shortname,
            name = %desired.name,
            region = %desired.region,
            "Creating streaming slot"
        );
        let slot = ctx
            .api
            .create_streaming_slot(&desired.shortname, &request(&desired))
            .await
            .map_err(|e| ReconcileError::remote("create_streaming_slot", &desired.shortname, e))?;
        let id = identity::encode(&[desired.shortname.as_str(), slot.id.as_str()])?;

        if desired.wait_for_provisioning {
            let api = &*ctx.api;
            let (shortname, slot_id) = (desired.shortname.as_str(), slot.id.as_str());
            let state = wait_until_terminal(&id, &ctx.provisioning, || {
                provisioning_state(api, &id, shortname, slot_id)
            })
            .await?;
            if state == ProvisioningState::Failed {
                warn!(%id, "Streaming slot provisioning failed");
            }
        }

        let observed = Self::read(ctx, &id)
            .await?
            .ok_or_else(|| ReconcileError::Vanished {
                kind: Self::KIND,
                id: id.clone(),
            })?;
        Ok(Created { id, observed })
    }

    async fn read(
        ctx: &SlotContext,
        id: &str,
    ) -> Result<Option<StreamingSlotState>, ReconcileError> {
        let [shortname, slot_id] = identity::decode::<2>(id)?;
        let info = found(ctx.api.get_streaming_slot(&shortname, &slot_id).await)
            .map_err(|e| ReconcileError::remote("get_streaming_slot", id, e))?;
        Ok(info.map(|info| observe(shortname, info)))
    }

    async fn delete(ctx: &SlotContext, id: &str) -> Result<(), ReconcileError> {
        let [shortname, slot_id] = identity::decode::<2>(id)?;
        info!(%id, "Deleting streaming slot");
        found(ctx.api.delete_streaming_slot(&shortname, &slot_id).await)
            .map(|_| ())
            .map_err(|e| ReconcileError::remote("delete_streaming_slot", id, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::InMemoryLimelight;
    use crate::model::BitrateProfile;
    use std::collections::BTreeSet;
    use std::time::Duration;

    fn spec(wait: bool) -> StreamingSlotSpec {
        StreamingSlotSpec {
            shortname: "acct".into(),
            name: "live-1".into(),
            region: "europe".into(),
            profiles: BTreeSet::from([BitrateProfile {
                video_bitrate: 800,
                audio_bitrate: 64,
            }]),
            password: Some("hunter2".into()),
            ip_geo_match: None,
            mediavault_secret_key: None,
            wait_for_provisioning: wait,
        }
    }

    fn context(api: &Arc<InMemoryLimelight>) -> SlotContext {
        SlotContext {
            api: api.clone(),
            provisioning: PollSettings {
                initial_delay: Duration::from_secs(1),
                min_interval: Duration::from_secs(1),
                timeout: Duration::from_secs(30),
            },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_waits_until_ready() {
        let api = Arc::new(InMemoryLimelight::new());
        api.script_slot_states(&["PENDING", "PENDING", "READY"]);

        let created = StreamingSlot::create(&context(&api), spec(true))
            .await
            .unwrap();

        assert!(created.id.starts_with("acct:"));
        assert_eq!(created.observed.state, "READY");
        assert_eq!(created.observed.slot_id, created.id["acct:".len()..]);
        // three polls, then the final read
        assert_eq!(api.count("get_streaming_slot"), 4);
    }

    #[tokio::test]
    async fn test_create_without_waiting_reads_once() {
        let api = Arc::new(InMemoryLimelight::new());

        let created = StreamingSlot::create(&context(&api), spec(false))
            .await
            .unwrap();

        assert_eq!(created.observed.state, "PENDING");
        assert_eq!(api.count("get_streaming_slot"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_state_aborts_the_wait() {
        let api = Arc::new(InMemoryLimelight::new());
        api.script_slot_states(&["PENDING", "MIGRATING"]);

        let err = StreamingSlot::create(&context(&api), spec(true))
            .await
            .unwrap_err();

        match err {
            ReconcileError::UnexpectedState { id, state } => {
                assert!(id.starts_with("acct:"));
                assert_eq!(state, "MIGRATING");
            }
            other => panic!("expected UnexpectedState, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_provisioning_still_returns_the_slot() {
        let api = Arc::new(InMemoryLimelight::new());
        api.script_slot_states(&["FAILED"]);

        let created = StreamingSlot::create(&context(&api), spec(true))
            .await
            .unwrap();
        assert_eq!(created.observed.state, "FAILED");
    }

    #[tokio::test]
    async fn test_update_is_refused() {
        let api = Arc::new(InMemoryLimelight::new());
        let err = StreamingSlot::update(&context(&api), "acct:abc", spec(false))
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Immutable { .. }));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unusable_shortname_is_rejected_before_creating() {
        let api = Arc::new(InMemoryLimelight::new());
        for shortname in ["", "a:b"] {
            let desired = StreamingSlotSpec {
                shortname: shortname.into(),
                ..spec(false)
            };
            let err = StreamingSlot::create(&context(&api), desired)
                .await
                .unwrap_err();
            assert!(matches!(err, ReconcileError::Format(_)));
        }
        assert!(api.calls().is_empty());
    }
}
