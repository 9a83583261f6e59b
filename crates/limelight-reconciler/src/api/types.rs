//! Wire payloads exchanged with the Limelight management APIs.
//!
//! Field names follow the APIs' camelCase JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Service key every delivery body carries.
pub const DELIVERY_SERVICE_KEY: &str = "delivery";

// --- Configuration API: delivery ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryServiceInstance {
    pub uuid: String,
    pub shortname: String,
    pub body: DeliveryBody,
    pub revision: Revision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub version_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryBody {
    pub service_profile_name: String,
    pub protocol_sets: Vec<ProtocolSet>,
    pub published_hostname: String,
    #[serde(rename = "publishedUrlPath")]
    pub published_url_path: String,
    pub source_hostname: String,
    #[serde(rename = "sourceUrlPath")]
    pub source_url_path: String,
    pub service_key: ServiceKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceKey {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolSet {
    pub published_protocol: String,
    pub source_protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_port: Option<u16>,
    #[serde(default)]
    pub options: Vec<ConfigOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigOption {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParamValue>,
}

/// An option parameter as the API types it: a JSON number or a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

// --- Configuration API: realtime streaming ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingProfile {
    pub video_bitrate: u32,
    pub audio_bitrate: u32,
}

/// Create request for a realtime streaming slot.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeStreamingSlot {
    pub name: String,
    pub region: String,
    pub profiles: Vec<StreamingProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_geo_match: Option<String>,
    #[serde(rename = "mediaVaultEnabled")]
    pub mediavault_enabled: bool,
    #[serde(
        rename = "mediaVaultSecretKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub mediavault_secret_key: Option<String>,
}

impl fmt::Debug for RealtimeStreamingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealtimeStreamingSlot")
            .field("name", &self.name)
            .field("region", &self.region)
            .field("profiles", &self.profiles)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("ip_geo_match", &self.ip_geo_match)
            .field("mediavault_enabled", &self.mediavault_enabled)
            .field(
                "mediavault_secret_key",
                &self.mediavault_secret_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// A streaming slot as the API reports it. The password is never echoed back.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotInfo {
    pub id: String,
    pub name: String,
    pub region: String,
    pub profiles: Vec<StreamingProfile>,
    #[serde(default)]
    pub ip_geo_match: Option<String>,
    #[serde(rename = "mediaVaultEnabled")]
    pub mediavault_enabled: bool,
    #[serde(rename = "mediaVaultSecretKey", default)]
    pub mediavault_secret_key: Option<String>,
    /// `PENDING`, `READY` or `FAILED`.
    pub state: String,
}

impl fmt::Debug for SlotInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotInfo")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("region", &self.region)
            .field("state", &self.state)
            .field("profiles", &self.profiles)
            .field("mediavault_enabled", &self.mediavault_enabled)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpAllowList {
    pub ip_ranges: Vec<String>,
    pub version: u64,
}

// --- EdgeFunctions API ---

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub name: String,
    pub value: String,
}

impl fmt::Debug for EnvironmentVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentVariable")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Everything about a function except its code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionConfiguration {
    #[serde(default)]
    pub description: String,
    pub handler: String,
    pub runtime: String,
    pub memory: u32,
    pub timeout: u32,
    pub can_debug: bool,
    #[serde(default)]
    pub environment_variables: Vec<EnvironmentVariable>,
}

/// Create request for an edge function.
#[derive(Clone, PartialEq)]
pub struct NewEdgeFunction {
    pub name: String,
    pub configuration: FunctionConfiguration,
    /// Zip archive bytes.
    pub function_archive: Vec<u8>,
}

impl fmt::Debug for NewEdgeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewEdgeFunction")
            .field("name", &self.name)
            .field("configuration", &self.configuration)
            .field("archive_bytes", &self.function_archive.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeFunctionInfo {
    pub name: String,
    #[serde(flatten)]
    pub configuration: FunctionConfiguration,
    /// Hex SHA-256 of the deployed archive.
    pub sha256: String,
    pub revision_id: u64,
    #[serde(default)]
    pub reserved_concurrency: u32,
}

/// Create/update request for an alias.
///
/// `name` is only sent on create; `revision_id` only on update, where it must match the
/// alias's current revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    pub function_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasInfo {
    pub name: String,
    /// Name of the function the alias belongs to.
    pub function: String,
    #[serde(default)]
    pub description: String,
    pub function_version: String,
    pub revision_id: u64,
}
