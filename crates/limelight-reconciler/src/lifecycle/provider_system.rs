use crate::api::{ConfigurationApi, EdgeFunctionsApi};
use crate::clients::{
    DeliveryClient, EdgeFunctionAliasClient, EdgeFunctionClient, StreamingSlotClient,
};
use crate::config::ProviderConfig;
use crate::ip_ranges::read_ip_ranges;
use crate::model::IpRanges;
use crate::streaming_slot::SlotContext;
use crate::{delivery, edge_function, edge_function_alias, streaming_slot};
use reconcile_framework::ReconcileError;
use std::sync::Arc;
use tracing::{error, info};

/// The running set of resource actors.
///
/// ```rust
/// use limelight_reconciler::api::memory::InMemoryLimelight;
/// use limelight_reconciler::config::ProviderConfig;
/// use limelight_reconciler::lifecycle::ProviderSystem;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ProviderConfig::from_toml_str("username = \"ops\"\napi_key = \"k\"")?;
///     let api = Arc::new(InMemoryLimelight::new());
///     let system = ProviderSystem::new(&config, api.clone(), api);
///
///     let ranges = system.ip_ranges().await?;
///     assert_eq!(ranges.version, 1);
///
///     system.shutdown().await?;
///     Ok(())
/// }
/// ```
pub struct ProviderSystem {
    pub delivery_client: DeliveryClient,
    pub edge_function_client: EdgeFunctionClient,
    pub edge_function_alias_client: EdgeFunctionAliasClient,
    pub streaming_slot_client: StreamingSlotClient,

    config_api: Arc<dyn ConfigurationApi>,

    /// Task handles for all running actors (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl ProviderSystem {
    /// Spawns the four resource actors. Must be called from within a Tokio runtime.
    pub fn new(
        config: &ProviderConfig,
        config_api: Arc<dyn ConfigurationApi>,
        edgefunctions_api: Arc<dyn EdgeFunctionsApi>,
    ) -> Self {
        info!(username = %config.username, "Starting provider system");

        let (delivery_actor, delivery_client) = delivery::new();
        let delivery_handle = tokio::spawn(delivery_actor.run(config_api.clone()));

        let (function_actor, function_client) = edge_function::new();
        let function_handle = tokio::spawn(function_actor.run(edgefunctions_api.clone()));

        let (alias_actor, alias_client) = edge_function_alias::new();
        let alias_handle = tokio::spawn(alias_actor.run(edgefunctions_api));

        let (slot_actor, slot_client) = streaming_slot::new();
        let slot_handle = tokio::spawn(slot_actor.run(SlotContext {
            api: config_api.clone(),
            provisioning: config.poll_settings(),
        }));

        Self {
            delivery_client: DeliveryClient::new(delivery_client),
            edge_function_client: EdgeFunctionClient::new(function_client),
            edge_function_alias_client: EdgeFunctionAliasClient::new(alias_client),
            streaming_slot_client: StreamingSlotClient::new(slot_client),
            config_api,
            handles: vec![delivery_handle, function_handle, alias_handle, slot_handle],
        }
    }

    /// Reads the `limelight_ip_ranges` data source.
    pub async fn ip_ranges(&self) -> Result<IpRanges, ReconcileError> {
        read_ip_ranges(&*self.config_api).await
    }

    /// Drops every client and waits for the actors to finish.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down provider system...");

        drop(self.delivery_client);
        drop(self.edge_function_client);
        drop(self.edge_function_alias_client);
        drop(self.streaming_slot_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("Provider system shutdown complete.");
        Ok(())
    }
}
