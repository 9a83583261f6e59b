//! In-memory Limelight.
//!
//! A single struct implementing both remote API traits against process-local state. It mimics
//! the behaviour the reconcilers depend on: server-issued ids, revision counters, archive
//! digests, asynchronous slot provisioning and 404s for missing resources. Tests steer it with
//! [`InMemoryLimelight::fail_next`], [`InMemoryLimelight::script_slot_states`] and
//! [`InMemoryLimelight::register_integer_parameter`], and inspect it with
//! [`InMemoryLimelight::calls`].

use super::*;
use crate::digest::sha256_hex;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

struct StoredDelivery {
    shortname: String,
    /// Bodies are kept as JSON, the way they travel.
    body: serde_json::Value,
    version_number: u32,
}

struct StoredFunction {
    configuration: FunctionConfiguration,
    sha256: String,
    revision_id: u64,
    reserved_concurrency: u32,
}

struct StoredAlias {
    description: String,
    function_version: String,
    revision_id: u64,
}

struct StoredSlot {
    request: RealtimeStreamingSlot,
    /// Remaining provisioning states; the last one sticks.
    states: VecDeque<String>,
}

struct State {
    deliveries: HashMap<String, StoredDelivery>,
    functions: HashMap<(String, String), StoredFunction>,
    aliases: HashMap<(String, String, String), StoredAlias>,
    slots: HashMap<(String, String), StoredSlot>,
    integer_parameters: HashSet<(String, String, usize)>,
    slot_script: Vec<String>,
    ip_allow_list: IpAllowList,
    failures: HashMap<String, VecDeque<ApiError>>,
    calls: Vec<String>,
}

pub struct InMemoryLimelight {
    state: Mutex<State>,
}

impl Default for InMemoryLimelight {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(what: &str, id: &str) -> ApiError {
    ApiError::not_found(format!("{what} {id} not found"))
}

fn invalid_body(e: serde_json::Error) -> ApiError {
    ApiError::new(500, format!("malformed delivery body: {e}"))
}

impl InMemoryLimelight {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                deliveries: HashMap::new(),
                functions: HashMap::new(),
                aliases: HashMap::new(),
                slots: HashMap::new(),
                integer_parameters: HashSet::new(),
                slot_script: vec!["PENDING".into(), "READY".into()],
                ip_allow_list: IpAllowList {
                    ip_ranges: vec!["68.142.64.0/18".into(), "69.28.128.0/18".into()],
                    version: 1,
                },
                failures: HashMap::new(),
                calls: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the call and returns the injected failure for it, if any.
    fn enter(&self, op: &str) -> ApiResult<MutexGuard<'_, State>> {
        let mut state = self.lock();
        state.calls.push(op.to_string());
        let injected = state.failures.get_mut(op).and_then(VecDeque::pop_front);
        match injected {
            Some(err) => {
                debug!(op, error = %err, "Injected failure");
                Err(err)
            }
            None => Ok(state),
        }
    }

    // --- test steering ---

    /// Makes the next call to `op` (a trait method name, e.g. `"set_function_concurrency"`)
    /// fail with `error`. Repeated calls queue further failures.
    pub fn fail_next(&self, op: &str, error: ApiError) {
        self.lock()
            .failures
            .entry(op.to_string())
            .or_default()
            .push_back(error);
    }

    /// Provisioning states reported by slots created from now on, one per read.
    pub fn script_slot_states(&self, states: &[&str]) {
        self.lock().slot_script = states.iter().map(|s| s.to_string()).collect();
    }

    /// Declares parameter `position` of `option` under `service_profile` integer-typed.
    pub fn register_integer_parameter(&self, service_profile: &str, option: &str, position: usize) {
        self.lock().integer_parameters.insert((
            service_profile.to_string(),
            option.to_string(),
            position,
        ));
    }

    pub fn set_ip_allow_list(&self, ip_ranges: Vec<String>, version: u64) {
        self.lock().ip_allow_list = IpAllowList { ip_ranges, version };
    }

    /// Every API call so far, by method name.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.lock().calls.iter().filter(|c| *c == op).count()
    }

    /// The stored JSON body of a delivery, as it was sent.
    pub fn delivery_body_json(&self, uuid: &str) -> Option<serde_json::Value> {
        self.lock().deliveries.get(uuid).map(|d| d.body.clone())
    }

    pub fn function_exists(&self, shortname: &str, name: &str) -> bool {
        self.lock()
            .functions
            .contains_key(&(shortname.to_string(), name.to_string()))
    }

    /// Removes a function out of band, as another operator would.
    pub fn remove_function(&self, shortname: &str, name: &str) {
        self.lock()
            .functions
            .remove(&(shortname.to_string(), name.to_string()));
    }
}

fn delivery_view(uuid: &str, stored: &StoredDelivery) -> ApiResult<DeliveryServiceInstance> {
    Ok(DeliveryServiceInstance {
        uuid: uuid.to_string(),
        shortname: stored.shortname.clone(),
        body: serde_json::from_value(stored.body.clone()).map_err(invalid_body)?,
        revision: Revision {
            version_number: stored.version_number,
        },
    })
}

fn function_view(name: &str, stored: &StoredFunction) -> EdgeFunctionInfo {
    EdgeFunctionInfo {
        name: name.to_string(),
        configuration: stored.configuration.clone(),
        sha256: stored.sha256.clone(),
        revision_id: stored.revision_id,
        reserved_concurrency: stored.reserved_concurrency,
    }
}

fn alias_view(function: &str, name: &str, stored: &StoredAlias) -> AliasInfo {
    AliasInfo {
        name: name.to_string(),
        function: function.to_string(),
        description: stored.description.clone(),
        function_version: stored.function_version.clone(),
        revision_id: stored.revision_id,
    }
}

fn slot_view(id: &str, stored: &StoredSlot, state: String) -> SlotInfo {
    SlotInfo {
        id: id.to_string(),
        name: stored.request.name.clone(),
        region: stored.request.region.clone(),
        profiles: stored.request.profiles.clone(),
        ip_geo_match: stored.request.ip_geo_match.clone(),
        mediavault_enabled: stored.request.mediavault_enabled,
        mediavault_secret_key: stored.request.mediavault_secret_key.clone(),
        state,
    }
}

#[async_trait]
impl ParameterMetadata for InMemoryLimelight {
    async fn is_parameter_integer(
        &self,
        _shortname: &str,
        service_profile: &str,
        option: &str,
        position: usize,
    ) -> ApiResult<bool> {
        let state = self.enter("is_parameter_integer")?;
        Ok(state.integer_parameters.contains(&(
            service_profile.to_string(),
            option.to_string(),
            position,
        )))
    }
}

#[async_trait]
impl ConfigurationApi for InMemoryLimelight {
    async fn create_delivery(
        &self,
        shortname: &str,
        body: &DeliveryBody,
    ) -> ApiResult<DeliveryServiceInstance> {
        let mut state = self.enter("create_delivery")?;
        let uuid = Uuid::new_v4().to_string();
        let stored = StoredDelivery {
            shortname: shortname.to_string(),
            body: serde_json::to_value(body).map_err(invalid_body)?,
            version_number: 1,
        };
        let view = delivery_view(&uuid, &stored)?;
        state.deliveries.insert(uuid, stored);
        Ok(view)
    }

    async fn get_delivery(&self, uuid: &str) -> ApiResult<DeliveryServiceInstance> {
        let state = self.enter("get_delivery")?;
        let stored = state
            .deliveries
            .get(uuid)
            .ok_or_else(|| missing("delivery", uuid))?;
        delivery_view(uuid, stored)
    }

    async fn update_delivery(
        &self,
        uuid: &str,
        shortname: &str,
        body: &DeliveryBody,
    ) -> ApiResult<DeliveryServiceInstance> {
        let mut state = self.enter("update_delivery")?;
        let stored = state
            .deliveries
            .get_mut(uuid)
            .ok_or_else(|| missing("delivery", uuid))?;
        if stored.shortname != shortname {
            return Err(ApiError::new(
                400,
                format!("delivery {uuid} belongs to {}", stored.shortname),
            ));
        }
        stored.body = serde_json::to_value(body).map_err(invalid_body)?;
        stored.version_number += 1;
        delivery_view(uuid, stored)
    }

    async fn delete_delivery(&self, uuid: &str) -> ApiResult<()> {
        let mut state = self.enter("delete_delivery")?;
        state
            .deliveries
            .remove(uuid)
            .map(|_| ())
            .ok_or_else(|| missing("delivery", uuid))
    }

    async fn create_streaming_slot(
        &self,
        shortname: &str,
        slot: &RealtimeStreamingSlot,
    ) -> ApiResult<SlotInfo> {
        let mut state = self.enter("create_streaming_slot")?;
        let id = Uuid::new_v4().simple().to_string();
        let stored = StoredSlot {
            request: slot.clone(),
            states: state.slot_script.iter().cloned().collect(),
        };
        let initial = stored
            .states
            .front()
            .cloned()
            .unwrap_or_else(|| "PENDING".to_string());
        let view = slot_view(&id, &stored, initial);
        state
            .slots
            .insert((shortname.to_string(), id), stored);
        Ok(view)
    }

    async fn get_streaming_slot(&self, shortname: &str, slot_id: &str) -> ApiResult<SlotInfo> {
        let mut state = self.enter("get_streaming_slot")?;
        let stored = state
            .slots
            .get_mut(&(shortname.to_string(), slot_id.to_string()))
            .ok_or_else(|| missing("streaming slot", slot_id))?;
        let current = if stored.states.len() > 1 {
            stored.states.pop_front()
        } else {
            stored.states.front().cloned()
        }
        .unwrap_or_else(|| "READY".to_string());
        Ok(slot_view(slot_id, stored, current))
    }

    async fn delete_streaming_slot(&self, shortname: &str, slot_id: &str) -> ApiResult<()> {
        let mut state = self.enter("delete_streaming_slot")?;
        state
            .slots
            .remove(&(shortname.to_string(), slot_id.to_string()))
            .map(|_| ())
            .ok_or_else(|| missing("streaming slot", slot_id))
    }

    async fn get_ip_allow_list(&self) -> ApiResult<IpAllowList> {
        let state = self.enter("get_ip_allow_list")?;
        Ok(state.ip_allow_list.clone())
    }
}

#[async_trait]
impl EdgeFunctionsApi for InMemoryLimelight {
    async fn create_function(
        &self,
        shortname: &str,
        function: &NewEdgeFunction,
    ) -> ApiResult<EdgeFunctionInfo> {
        let mut state = self.enter("create_function")?;
        let key = (shortname.to_string(), function.name.clone());
        if state.functions.contains_key(&key) {
            return Err(ApiError::new(
                409,
                format!("function {} already exists", function.name),
            ));
        }
        let stored = StoredFunction {
            configuration: function.configuration.clone(),
            sha256: sha256_hex(&function.function_archive),
            revision_id: 1,
            reserved_concurrency: 0,
        };
        let view = function_view(&function.name, &stored);
        state.functions.insert(key, stored);
        Ok(view)
    }

    async fn get_function(&self, shortname: &str, name: &str) -> ApiResult<EdgeFunctionInfo> {
        let state = self.enter("get_function")?;
        state
            .functions
            .get(&(shortname.to_string(), name.to_string()))
            .map(|stored| function_view(name, stored))
            .ok_or_else(|| missing("function", name))
    }

    async fn update_function_code(
        &self,
        shortname: &str,
        name: &str,
        archive: &[u8],
    ) -> ApiResult<EdgeFunctionInfo> {
        let mut state = self.enter("update_function_code")?;
        let stored = state
            .functions
            .get_mut(&(shortname.to_string(), name.to_string()))
            .ok_or_else(|| missing("function", name))?;
        stored.sha256 = sha256_hex(archive);
        stored.revision_id += 1;
        Ok(function_view(name, stored))
    }

    async fn update_function_configuration(
        &self,
        shortname: &str,
        name: &str,
        configuration: &FunctionConfiguration,
    ) -> ApiResult<EdgeFunctionInfo> {
        let mut state = self.enter("update_function_configuration")?;
        let stored = state
            .functions
            .get_mut(&(shortname.to_string(), name.to_string()))
            .ok_or_else(|| missing("function", name))?;
        stored.configuration = configuration.clone();
        stored.revision_id += 1;
        Ok(function_view(name, stored))
    }

    async fn set_function_concurrency(
        &self,
        shortname: &str,
        name: &str,
        reserved_concurrency: u32,
    ) -> ApiResult<()> {
        let mut state = self.enter("set_function_concurrency")?;
        let stored = state
            .functions
            .get_mut(&(shortname.to_string(), name.to_string()))
            .ok_or_else(|| missing("function", name))?;
        stored.reserved_concurrency = reserved_concurrency;
        Ok(())
    }

    async fn delete_function(&self, shortname: &str, name: &str) -> ApiResult<()> {
        let mut state = self.enter("delete_function")?;
        let removed = state
            .functions
            .remove(&(shortname.to_string(), name.to_string()));
        if removed.is_none() {
            return Err(missing("function", name));
        }
        state
            .aliases
            .retain(|(s, f, _), _| !(s == shortname && f == name));
        Ok(())
    }

    async fn create_alias(
        &self,
        shortname: &str,
        function: &str,
        alias: &AliasRequest,
    ) -> ApiResult<AliasInfo> {
        let mut state = self.enter("create_alias")?;
        if !state
            .functions
            .contains_key(&(shortname.to_string(), function.to_string()))
        {
            return Err(missing("function", function));
        }
        let name = alias
            .name
            .clone()
            .ok_or_else(|| ApiError::new(400, "alias name is required"))?;
        let key = (shortname.to_string(), function.to_string(), name.clone());
        if state.aliases.contains_key(&key) {
            return Err(ApiError::new(409, format!("alias {name} already exists")));
        }
        let stored = StoredAlias {
            description: alias.description.clone(),
            function_version: alias.function_version.clone(),
            revision_id: 1,
        };
        let view = alias_view(function, &name, &stored);
        state.aliases.insert(key, stored);
        Ok(view)
    }

    async fn get_alias(
        &self,
        shortname: &str,
        function: &str,
        alias: &str,
    ) -> ApiResult<AliasInfo> {
        let state = self.enter("get_alias")?;
        state
            .aliases
            .get(&(shortname.to_string(), function.to_string(), alias.to_string()))
            .map(|stored| alias_view(function, alias, stored))
            .ok_or_else(|| missing("alias", alias))
    }

    async fn update_alias(
        &self,
        shortname: &str,
        function: &str,
        alias: &str,
        request: &AliasRequest,
    ) -> ApiResult<AliasInfo> {
        let mut state = self.enter("update_alias")?;
        let stored = state
            .aliases
            .get_mut(&(shortname.to_string(), function.to_string(), alias.to_string()))
            .ok_or_else(|| missing("alias", alias))?;
        if request.revision_id != Some(stored.revision_id) {
            return Err(ApiError::new(
                409,
                format!(
                    "alias {alias} is at revision {}, update was based on {:?}",
                    stored.revision_id, request.revision_id
                ),
            ));
        }
        stored.description = request.description.clone();
        stored.function_version = request.function_version.clone();
        stored.revision_id += 1;
        Ok(alias_view(function, alias, stored))
    }

    async fn delete_alias(&self, shortname: &str, function: &str, alias: &str) -> ApiResult<()> {
        let mut state = self.enter("delete_alias")?;
        state
            .aliases
            .remove(&(shortname.to_string(), function.to_string(), alias.to_string()))
            .map(|_| ())
            .ok_or_else(|| missing("alias", alias))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FunctionConfiguration {
        FunctionConfiguration {
            description: String::new(),
            handler: "main.handler".into(),
            runtime: "python3".into(),
            memory: 256,
            timeout: 5000,
            can_debug: false,
            environment_variables: vec![],
        }
    }

    #[tokio::test]
    async fn test_injected_failure_is_consumed_once() {
        let api = InMemoryLimelight::new();
        api.fail_next("get_ip_allow_list", ApiError::new(503, "busy"));

        let err = api.get_ip_allow_list().await.unwrap_err();
        assert_eq!(err.status, Some(503));
        assert!(api.get_ip_allow_list().await.is_ok());
        assert_eq!(api.count("get_ip_allow_list"), 2);
    }

    #[tokio::test]
    async fn test_slot_states_advance_per_read_and_stick() {
        let api = InMemoryLimelight::new();
        api.script_slot_states(&["PENDING", "PENDING", "READY"]);
        let slot = RealtimeStreamingSlot {
            name: "live".into(),
            region: "europe".into(),
            profiles: vec![],
            password: None,
            ip_geo_match: None,
            mediavault_enabled: false,
            mediavault_secret_key: None,
        };
        let created = api.create_streaming_slot("acct", &slot).await.unwrap();
        assert_eq!(created.state, "PENDING");

        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(api.get_streaming_slot("acct", &created.id).await.unwrap().state);
        }
        assert_eq!(seen, ["PENDING", "PENDING", "READY", "READY"]);
    }

    #[tokio::test]
    async fn test_function_digest_and_revisions() {
        let api = InMemoryLimelight::new();
        let created = api
            .create_function(
                "acct",
                &NewEdgeFunction {
                    name: "fn1".into(),
                    configuration: config(),
                    function_archive: b"v1".to_vec(),
                },
            )
            .await
            .unwrap();
        assert_eq!(created.sha256, sha256_hex(b"v1"));
        assert_eq!(created.revision_id, 1);

        let updated = api.update_function_code("acct", "fn1", b"v2").await.unwrap();
        assert_eq!(updated.sha256, sha256_hex(b"v2"));
        assert_eq!(updated.revision_id, 2);

        assert!(api.get_function("acct", "nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_alias_update_requires_current_revision() {
        let api = InMemoryLimelight::new();
        api.create_function(
            "acct",
            &NewEdgeFunction {
                name: "fn1".into(),
                configuration: config(),
                function_archive: vec![],
            },
        )
        .await
        .unwrap();
        api.create_alias(
            "acct",
            "fn1",
            &AliasRequest {
                name: Some("live".into()),
                description: String::new(),
                function_version: "1".into(),
                revision_id: None,
            },
        )
        .await
        .unwrap();

        let stale = AliasRequest {
            name: None,
            description: "d".into(),
            function_version: "2".into(),
            revision_id: Some(7),
        };
        let err = api.update_alias("acct", "fn1", "live", &stale).await.unwrap_err();
        assert_eq!(err.status, Some(409));

        let fresh = AliasRequest {
            revision_id: Some(1),
            ..stale
        };
        let updated = api.update_alias("acct", "fn1", "live", &fresh).await.unwrap();
        assert_eq!(updated.revision_id, 2);
        assert_eq!(updated.function_version, "2");
    }
}
