//! # Remote API Contract
//!
//! The reconcilers talk to two Limelight management APIs through these traits. Transport
//! concerns (HTTP, authentication, retries) belong to the implementation; the reconcilers only
//! see typed payloads and [`ApiError`].
//!
//! - [`ConfigurationApi`] - delivery configurations, realtime streaming slots, the IP allow list
//!   and option parameter metadata.
//! - [`EdgeFunctionsApi`] - edge functions and their aliases.
//!
//! [`memory::InMemoryLimelight`] implements both for the demo binary and the tests.

pub mod memory;
pub mod types;

use async_trait::async_trait;
pub use reconcile_framework::ApiError;
pub use types::*;

pub type ApiResult<T> = Result<T, ApiError>;

/// Runtime metadata about delivery option parameters.
#[async_trait]
pub trait ParameterMetadata: Send + Sync {
    /// Whether parameter `position` of `option` is typed as an integer for this account and
    /// service profile.
    async fn is_parameter_integer(
        &self,
        shortname: &str,
        service_profile: &str,
        option: &str,
        position: usize,
    ) -> ApiResult<bool>;
}

/// The Configuration API.
#[async_trait]
pub trait ConfigurationApi: ParameterMetadata {
    async fn create_delivery(
        &self,
        shortname: &str,
        body: &DeliveryBody,
    ) -> ApiResult<DeliveryServiceInstance>;

    async fn get_delivery(&self, uuid: &str) -> ApiResult<DeliveryServiceInstance>;

    async fn update_delivery(
        &self,
        uuid: &str,
        shortname: &str,
        body: &DeliveryBody,
    ) -> ApiResult<DeliveryServiceInstance>;

    async fn delete_delivery(&self, uuid: &str) -> ApiResult<()>;

    async fn create_streaming_slot(
        &self,
        shortname: &str,
        slot: &RealtimeStreamingSlot,
    ) -> ApiResult<SlotInfo>;

    async fn get_streaming_slot(&self, shortname: &str, slot_id: &str) -> ApiResult<SlotInfo>;

    async fn delete_streaming_slot(&self, shortname: &str, slot_id: &str) -> ApiResult<()>;

    async fn get_ip_allow_list(&self) -> ApiResult<IpAllowList>;
}

/// The EdgeFunctions API.
#[async_trait]
pub trait EdgeFunctionsApi: Send + Sync {
    async fn create_function(
        &self,
        shortname: &str,
        function: &NewEdgeFunction,
    ) -> ApiResult<EdgeFunctionInfo>;

    async fn get_function(&self, shortname: &str, name: &str) -> ApiResult<EdgeFunctionInfo>;

    async fn update_function_code(
        &self,
        shortname: &str,
        name: &str,
        archive: &[u8],
    ) -> ApiResult<EdgeFunctionInfo>;

    async fn update_function_configuration(
        &self,
        shortname: &str,
        name: &str,
        configuration: &FunctionConfiguration,
    ) -> ApiResult<EdgeFunctionInfo>;

    async fn set_function_concurrency(
        &self,
        shortname: &str,
        name: &str,
        reserved_concurrency: u32,
    ) -> ApiResult<()>;

    async fn delete_function(&self, shortname: &str, name: &str) -> ApiResult<()>;

    async fn create_alias(
        &self,
        shortname: &str,
        function: &str,
        alias: &AliasRequest,
    ) -> ApiResult<AliasInfo>;

    async fn get_alias(&self, shortname: &str, function: &str, alias: &str)
        -> ApiResult<AliasInfo>;

    async fn update_alias(
        &self,
        shortname: &str,
        function: &str,
        alias: &str,
        request: &AliasRequest,
    ) -> ApiResult<AliasInfo>;

    async fn delete_alias(&self, shortname: &str, function: &str, alias: &str) -> ApiResult<()>;
}

/// Maps a 404 to `None` and leaves every other outcome alone.
pub(crate) fn found<T>(result: ApiResult<T>) -> ApiResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}
