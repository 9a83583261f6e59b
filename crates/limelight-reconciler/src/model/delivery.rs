//! Delivery configurations (CDN routing rules).
//!
//! Specs deserialize from the declarative field names (`protocol_set`, `option`, ...).
use reconcile_framework::ReconcileError;
use serde::{Deserialize, Serialize};

/// Service profile used when none is declared.
pub const DEFAULT_SERVICE_PROFILE: &str = "LLNW-Generic";

fn default_service_profile() -> String {
    DEFAULT_SERVICE_PROFILE.to_string()
}

/// Desired state of a delivery configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverySpec {
    pub shortname: String,
    #[serde(default = "default_service_profile")]
    pub service_profile: String,
    /// One or two protocol sets, in order.
    #[serde(rename = "protocol_set")]
    pub protocol_sets: Vec<ProtocolSetSpec>,
    pub published_hostname: String,
    pub published_path: String,
    pub source_hostname: String,
    pub source_path: String,
}

impl DeliverySpec {
    pub fn validate(&self) -> Result<(), ReconcileError> {
        if self.shortname.is_empty() {
            return Err(ReconcileError::Invalid("shortname must not be empty".into()));
        }
        if !(1..=2).contains(&self.protocol_sets.len()) {
            return Err(ReconcileError::Invalid(format!(
                "protocol_set must have 1 or 2 entries, got {}",
                self.protocol_sets.len()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolSetSpec {
    pub published_protocol: String,
    pub source_protocol: String,
    /// `None` and `Some(0)` both mean "not set".
    #[serde(default)]
    pub source_port: Option<u16>,
    #[serde(rename = "option", default)]
    pub options: Vec<OptionSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub name: String,
    /// Always strings on the declarative side; typed per position when sent.
    #[serde(default)]
    pub parameters: Vec<String>,
}

/// A delivery configuration as read back from the Configuration API.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryState {
    /// API-issued UUID.
    pub id: String,
    pub shortname: String,
    pub service_profile: String,
    pub protocol_sets: Vec<ProtocolSetSpec>,
    pub published_hostname: String,
    pub published_path: String,
    pub source_hostname: String,
    pub source_path: String,
    pub version_number: u32,
}
