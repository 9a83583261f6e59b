use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_MEMORY: u32 = 256;
pub const DEFAULT_TIMEOUT: u32 = 5000;

fn default_memory() -> u32 {
    DEFAULT_MEMORY
}

fn default_timeout() -> u32 {
    DEFAULT_TIMEOUT
}

/// An environment variable of an edge function. Held in a set; order carries no meaning.
///
/// Values are left out of `Debug` output.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

impl fmt::Debug for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvVar")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Desired state of an edge function.
///
/// `shortname` and `name` identify the function and cannot change in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeFunctionSpec {
    pub shortname: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Path of the zip archive to upload.
    pub function_archive: PathBuf,
    pub handler: String,
    pub runtime: String,
    #[serde(default = "default_memory")]
    pub memory: u32,
    /// Milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout: u32,
    #[serde(default)]
    pub can_debug: bool,
    #[serde(rename = "environment_variable", default)]
    pub environment_variables: BTreeSet<EnvVar>,
    /// Hex SHA-256 of the archive. A change here is what triggers a code upload.
    pub function_sha256: String,
    #[serde(default)]
    pub reserved_concurrency: u32,
}

/// An edge function as read back from the EdgeFunctions API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeFunctionState {
    pub shortname: String,
    pub name: String,
    pub description: String,
    /// Write-only: never reported by the API, so always `None` here.
    pub function_archive: Option<PathBuf>,
    pub handler: String,
    pub runtime: String,
    pub memory: u32,
    pub timeout: u32,
    pub can_debug: bool,
    pub environment_variables: BTreeSet<EnvVar>,
    pub function_sha256: String,
    pub revision_id: u64,
    pub reserved_concurrency: u32,
}

impl EdgeFunctionState {
    /// The desired state this observation corresponds to, given the archive it was built from.
    pub fn to_spec(&self, function_archive: PathBuf) -> EdgeFunctionSpec {
        EdgeFunctionSpec {
            shortname: self.shortname.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            function_archive,
            handler: self.handler.clone(),
            runtime: self.runtime.clone(),
            memory: self.memory,
            timeout: self.timeout,
            can_debug: self.can_debug,
            environment_variables: self.environment_variables.clone(),
            function_sha256: self.function_sha256.clone(),
            reserved_concurrency: self.reserved_concurrency,
        }
    }
}

/// In-place update of an edge function: the previously applied desired state and the new one.
/// Only the facets whose fields differ are sent.
#[derive(Debug, Clone)]
pub struct EdgeFunctionUpdate {
    pub prior: EdgeFunctionSpec,
    pub desired: EdgeFunctionSpec,
}
