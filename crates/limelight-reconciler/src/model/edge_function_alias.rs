use serde::{Deserialize, Serialize};

/// Desired state of an alias pointing at one version of an edge function.
///
/// `shortname`, `function_name` and `name` identify the alias and cannot change in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeFunctionAliasSpec {
    pub shortname: String,
    pub name: String,
    pub function_name: String,
    pub function_version: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeFunctionAliasState {
    pub shortname: String,
    pub name: String,
    pub function_name: String,
    pub function_version: String,
    pub description: String,
    /// Optimistic concurrency token; must accompany the next update.
    pub revision_id: u64,
}

/// In-place update of an alias. `revision_id` is the one last observed.
#[derive(Debug, Clone)]
pub struct AliasUpdate {
    pub desired: EdgeFunctionAliasSpec,
    pub revision_id: u64,
}
