use reconcile_framework::{identity, ReconcileError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

fn yes() -> bool {
    true
}

/// One encoding ladder rung of a streaming slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BitrateProfile {
    pub video_bitrate: u32,
    pub audio_bitrate: u32,
}

/// Desired state of a realtime streaming slot. Every field forces replacement.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamingSlotSpec {
    pub shortname: String,
    pub name: String,
    pub region: String,
    #[serde(rename = "profile")]
    pub profiles: BTreeSet<BitrateProfile>,
    /// Write-only.
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub ip_geo_match: Option<String>,
    /// MediaVault is enabled exactly when a secret key is given.
    #[serde(default)]
    pub mediavault_secret_key: Option<String>,
    #[serde(default = "yes")]
    pub wait_for_provisioning: bool,
}

impl StreamingSlotSpec {
    pub fn mediavault_enabled(&self) -> bool {
        self.mediavault_secret_key.is_some()
    }

    /// Checked before the slot is created: the shortname must be usable as the first
    /// component of the slot's composite id, which is only known once the API issues it.
    pub fn validate(&self) -> Result<(), ReconcileError> {
        identity::encode(&[self.shortname.as_str(), "slot"])?;
        if self.name.is_empty() {
            return Err(ReconcileError::Invalid("slot name must not be empty".into()));
        }
        if self.profiles.is_empty() {
            return Err(ReconcileError::Invalid(
                "a streaming slot needs at least one profile".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for StreamingSlotSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingSlotSpec")
            .field("shortname", &self.shortname)
            .field("name", &self.name)
            .field("region", &self.region)
            .field("profiles", &self.profiles)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("ip_geo_match", &self.ip_geo_match)
            .field(
                "mediavault_secret_key",
                &self.mediavault_secret_key.as_ref().map(|_| "<redacted>"),
            )
            .field("wait_for_provisioning", &self.wait_for_provisioning)
            .finish()
    }
}

/// A streaming slot as read back from the Configuration API. The password is never reported.
#[derive(Clone, PartialEq, Eq)]
pub struct StreamingSlotState {
    pub shortname: String,
    /// API-issued slot id.
    pub slot_id: String,
    pub name: String,
    pub region: String,
    pub profiles: BTreeSet<BitrateProfile>,
    pub ip_geo_match: Option<String>,
    pub mediavault_enabled: bool,
    pub mediavault_secret_key: Option<String>,
    /// Provisioning state as reported (`PENDING`, `READY`, `FAILED`).
    pub state: String,
}

impl fmt::Debug for StreamingSlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingSlotState")
            .field("shortname", &self.shortname)
            .field("slot_id", &self.slot_id)
            .field("name", &self.name)
            .field("region", &self.region)
            .field("profiles", &self.profiles)
            .field("mediavault_enabled", &self.mediavault_enabled)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
