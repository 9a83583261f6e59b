//! # Delivery Reconciler
//!
//! Manages `limelight_delivery`: a CDN routing rule held by the Configuration API.
//!
//! - **Identifier**: the UUID the API issues on create. It is opaque and not a composite id.
//! - **Create/Update**: a single call each, carrying the whole body (service key `delivery`).
//!   Option parameters are typed per position against the API's metadata on every write.
//! - **Read**: maps the body back to the declarative shape; `version_number` is the API's
//!   revision counter.
//!
//! ## Usage
//!
//! ```rust
//! use limelight_reconciler::api::memory::InMemoryLimelight;
//! use limelight_reconciler::api::ConfigurationApi;
//! use limelight_reconciler::delivery;
//! use limelight_reconciler::model::{DeliverySpec, ProtocolSetSpec};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api: Arc<dyn ConfigurationApi> = Arc::new(InMemoryLimelight::new());
//!     let (actor, client) = delivery::new();
//!     tokio::spawn(actor.run(api));
//!
//!     let created = client
//!         .create(DeliverySpec {
//!             shortname: "acct".into(),
//!             service_profile: "LLNW-Generic".into(),
//!             protocol_sets: vec![ProtocolSetSpec {
//!                 published_protocol: "https".into(),
//!                 source_protocol: "http".into(),
//!                 source_port: None,
//!                 options: vec![],
//!             }],
//!             published_hostname: "cdn.example.com".into(),
//!             published_path: "/".into(),
//!             source_hostname: "origin.example.com".into(),
//!             source_path: "/".into(),
//!         })
//!         .await?;
//!     assert_eq!(created.observed.version_number, 1);
//!     Ok(())
//! }
//! ```

use crate::api::{
    found, ConfigurationApi, DeliveryBody, DeliveryServiceInstance, ServiceKey,
    DELIVERY_SERVICE_KEY,
};
use crate::model::{DeliverySpec, DeliveryState};
use crate::transcode::{expand_protocol_sets, flatten_protocol_sets};
use async_trait::async_trait;
use reconcile_framework::{
    Created, FormatError, ReconcileActor, ReconcileClient, ReconcileError, Reconciler,
};
use std::sync::Arc;
use tracing::info;

/// Marker type for the delivery resource.
#[derive(Debug)]
pub struct Delivery;

/// Creates a new delivery actor and its client.
pub fn new() -> (ReconcileActor<Delivery>, ReconcileClient<Delivery>) {
    ReconcileActor::new(32)
}

async fn build_body(api: &dyn ConfigurationApi, spec: &DeliverySpec) -> DeliveryBody {
    DeliveryBody {
        service_profile_name: spec.service_profile.clone(),
        protocol_sets: expand_protocol_sets(
            api,
            &spec.shortname,
            &spec.service_profile,
            &spec.protocol_sets,
        )
        .await,
        published_hostname: spec.published_hostname.clone(),
        published_url_path: spec.published_path.clone(),
        source_hostname: spec.source_hostname.clone(),
        source_url_path: spec.source_path.clone(),
        service_key: ServiceKey {
            name: DELIVERY_SERVICE_KEY.to_string(),
        },
    }
}

fn observe(instance: DeliveryServiceInstance) -> DeliveryState {
    DeliveryState {
        id: instance.uuid,
        shortname: instance.shortname,
        service_profile: instance.body.service_profile_name,
        protocol_sets: flatten_protocol_sets(&instance.body.protocol_sets),
        published_hostname: instance.body.published_hostname,
        published_path: instance.body.published_url_path,
        source_hostname: instance.body.source_hostname,
        source_path: instance.body.source_url_path,
        version_number: instance.revision.version_number,
    }
}

fn check_id(id: &str) -> Result<(), ReconcileError> {
    if id.is_empty() {
        return Err(FormatError::EmptyComponent { index: 0 }.into());
    }
    Ok(())
}

#[async_trait]
impl Reconciler for Delivery {
    const KIND: &'static str = "limelight_delivery";
    type Desired = DeliverySpec;
    type Update = DeliverySpec;
    type Observed = DeliveryState;
    type Context = Arc<dyn ConfigurationApi>;

    async fn create(
        api: &Self::Context,
        desired: DeliverySpec,
    ) -> Result<Created<DeliveryState>, ReconcileError> {
        desired.validate()?;
        let body = build_body(&**api, &desired).await;

        info!(
            shortname = %desired.shortname,
            service_profile = %desired.service_profile,
            "Creating delivery configuration"
        );
        let instance = api
            .create_delivery(&desired.shortname, &body)
            .await
            .map_err(|e| ReconcileError::remote("create_delivery", &desired.shortname, e))?;

        let id = instance.uuid;
        let observed = Self::read(api, &id)
            .await?
            .ok_or_else(|| ReconcileError::Vanished {
                kind: Self::KIND,
                id: id.clone(),
            })?;
        Ok(Created { id, observed })
    }

    async fn read(api: &Self::Context, id: &str) -> Result<Option<DeliveryState>, ReconcileError> {
        check_id(id)?;
        let instance = found(api.get_delivery(id).await)
            .map_err(|e| ReconcileError::remote("get_delivery", id, e))?;
        Ok(instance.map(observe))
    }

    async fn update(
        api: &Self::Context,
        id: &str,
        desired: DeliverySpec,
    ) -> Result<DeliveryState, ReconcileError> {
        check_id(id)?;
        desired.validate()?;
        let body = build_body(&**api, &desired).await;

        info!(%id, "Updating delivery configuration");
        api.update_delivery(id, &desired.shortname, &body)
            .await
            .map_err(|e| ReconcileError::remote("update_delivery", id, e))?;

        Self::read(api, id)
            .await?
            .ok_or_else(|| ReconcileError::Vanished {
                kind: Self::KIND,
                id: id.to_string(),
            })
    }

    async fn delete(api: &Self::Context, id: &str) -> Result<(), ReconcileError> {
        check_id(id)?;
        info!(%id, "Deleting delivery configuration");
        found(api.delete_delivery(id).await)
            .map(|_| ())
            .map_err(|e| ReconcileError::remote("delete_delivery", id, e))
    }
}
