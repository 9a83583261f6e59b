//! # Limelight Reconciler Demo
//!
//! Runs one lifecycle of every resource type against the in-memory Limelight API:
//! a delivery, an edge function with an alias, and a realtime streaming slot.
//!
//! ```bash
//! RUST_LOG=info cargo run -p limelight-reconciler
//! ```
//!
//! Credentials come from the usual `LLNW_*` variables; demo values are used when they are unset.

use limelight_reconciler::api::memory::InMemoryLimelight;
use limelight_reconciler::config::ProviderConfig;
use limelight_reconciler::digest::sha256_hex;
use limelight_reconciler::lifecycle::ProviderSystem;
use limelight_reconciler::model::{
    BitrateProfile, DeliverySpec, EdgeFunctionAliasSpec, EdgeFunctionSpec, EnvVar, OptionSpec,
    ProtocolSetSpec, StreamingSlotSpec, DEFAULT_MEMORY, DEFAULT_TIMEOUT,
};
use reconcile_framework::tracing::setup_tracing;
use reconcile_framework::ResourceClient;
use std::collections::BTreeSet;
use std::error::Error;
use std::sync::Arc;
use tracing::{info, warn, Instrument};

const DEMO_CONFIG: &str = r#"
username = "demo"
api_key = "demo"

[provisioning]
delay_ms = 100
interval_ms = 100
"#;

fn demo_config() -> Result<ProviderConfig, Box<dyn Error>> {
    match ProviderConfig::from_env() {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!(error = %e, "No usable LLNW_* environment; using demo credentials");
            Ok(ProviderConfig::from_toml_str(DEMO_CONFIG)?)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_tracing();

    let config = demo_config()?;
    info!(?config, "Starting Limelight reconciler demo");

    let api = Arc::new(InMemoryLimelight::new());
    api.register_integer_parameter("LLNW-Generic", "genreply", 0);
    let system = ProviderSystem::new(&config, api.clone(), api.clone());

    // --- delivery ---
    let mut delivery = DeliverySpec {
        shortname: "demo".to_string(),
        service_profile: "LLNW-Generic".to_string(),
        protocol_sets: vec![ProtocolSetSpec {
            published_protocol: "https".to_string(),
            source_protocol: "http".to_string(),
            source_port: None,
            options: vec![OptionSpec {
                name: "genreply".to_string(),
                parameters: vec!["200".to_string(), "OK".to_string()],
            }],
        }],
        published_hostname: "cdn.demo.example".to_string(),
        published_path: "/".to_string(),
        source_hostname: "origin.demo.example".to_string(),
        source_path: "/".to_string(),
    };
    let span = tracing::info_span!("delivery");
    let delivery_id = async {
        let created = system.delivery_client.create_delivery(delivery.clone()).await?;
        delivery.source_path = "/v2".to_string();
        let updated = system
            .delivery_client
            .update_delivery(&created.id, delivery.clone())
            .await?;
        info!(id = %created.id, version = updated.version_number, "Delivery reconciled");
        Ok::<_, Box<dyn Error>>(created.id)
    }
    .instrument(span)
    .await?;

    // --- edge function and alias ---
    let archive_path = std::env::temp_dir().join("limelight-demo-function.zip");
    let archive = b"PK\x03\x04 demo function";
    tokio::fs::write(&archive_path, archive).await?;
    let function = EdgeFunctionSpec {
        shortname: "demo".to_string(),
        name: "hello".to_string(),
        description: "demo function".to_string(),
        function_archive: archive_path.clone(),
        handler: "main.handler".to_string(),
        runtime: "python3".to_string(),
        memory: DEFAULT_MEMORY,
        timeout: DEFAULT_TIMEOUT,
        can_debug: false,
        environment_variables: BTreeSet::from([EnvVar::new("GREETING", "hello")]),
        function_sha256: sha256_hex(archive),
        reserved_concurrency: 2,
    };
    let span = tracing::info_span!("edge_function");
    let (function_id, alias_id) = async {
        let created = system
            .edge_function_client
            .create_edge_function(function.clone())
            .await?;
        let desired = EdgeFunctionSpec {
            memory: 512,
            reserved_concurrency: 4,
            ..function.clone()
        };
        let updated = system
            .edge_function_client
            .update_edge_function(&created.id, function.clone(), desired)
            .await?;
        info!(id = %created.id, revision = updated.revision_id, "Edge function reconciled");

        let alias = system
            .edge_function_alias_client
            .create_alias(EdgeFunctionAliasSpec {
                shortname: "demo".to_string(),
                name: "live".to_string(),
                function_name: "hello".to_string(),
                function_version: updated.revision_id.to_string(),
                description: "production traffic".to_string(),
            })
            .await?;
        info!(id = %alias.id, "Alias reconciled");
        Ok::<_, Box<dyn Error>>((created.id, alias.id))
    }
    .instrument(span)
    .await?;

    // --- streaming slot ---
    let span = tracing::info_span!("streaming_slot");
    let slot_id = async {
        let created = system
            .streaming_slot_client
            .create_slot(StreamingSlotSpec {
                shortname: "demo".to_string(),
                name: "live-1".to_string(),
                region: "europe".to_string(),
                profiles: BTreeSet::from([BitrateProfile {
                    video_bitrate: 2400,
                    audio_bitrate: 128,
                }]),
                password: Some("demo-password".to_string()),
                ip_geo_match: None,
                mediavault_secret_key: None,
                wait_for_provisioning: true,
            })
            .await?;
        info!(id = %created.id, state = %created.observed.state, "Streaming slot reconciled");
        Ok::<_, Box<dyn Error>>(created.id)
    }
    .instrument(span)
    .await?;

    let ranges = system.ip_ranges().await?;
    info!(id = %ranges.id, count = ranges.ip_ranges.len(), "IP allow list read");

    // --- teardown ---
    system.edge_function_alias_client.delete(&alias_id).await?;
    system.edge_function_client.delete(&function_id).await?;
    system.streaming_slot_client.delete(&slot_id).await?;
    system.delivery_client.delete(&delivery_id).await?;
    let _ = tokio::fs::remove_file(&archive_path).await;

    info!(calls = api.calls().len(), "Remote calls issued");
    system.shutdown().await?;

    info!("Demo completed successfully");
    Ok(())
}
