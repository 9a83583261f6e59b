//! # Edge Function Alias Reconciler
//!
//! Manages `limelight_edgefunction_alias`, identified as `shortname:function_name:name`.
//! Updates are a single call guarded by the alias's `revision_id`.

use crate::api::{found, AliasInfo, AliasRequest, EdgeFunctionsApi};
use crate::model::{AliasUpdate, EdgeFunctionAliasSpec, EdgeFunctionAliasState};
use async_trait::async_trait;
use reconcile_framework::identity;
use reconcile_framework::{Created, ReconcileActor, ReconcileClient, ReconcileError, Reconciler};
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct EdgeFunctionAlias;

/// Creates a new alias actor and its client.
pub fn new() -> (
    ReconcileActor<EdgeFunctionAlias>,
    ReconcileClient<EdgeFunctionAlias>,
) {
    ReconcileActor::new(32)
}

fn observe(shortname: String, info: AliasInfo) -> EdgeFunctionAliasState {
    EdgeFunctionAliasState {
        shortname,
        name: info.name,
        function_name: info.function,
        function_version: info.function_version,
        description: info.description,
        revision_id: info.revision_id,
    }
}

fn alias_id(spec: &EdgeFunctionAliasSpec) -> Result<String, ReconcileError> {
    Ok(identity::encode(&[
        spec.shortname.as_str(),
        spec.function_name.as_str(),
        spec.name.as_str(),
    ])?)
}

#[async_trait]
impl Reconciler for EdgeFunctionAlias {
    const KIND: &'static str = "limelight_edgefunction_alias";
    type Desired = EdgeFunctionAliasSpec;
    type Update = AliasUpdate;
    type Observed = EdgeFunctionAliasState;
    type Context = Arc<dyn EdgeFunctionsApi>;

    async fn create(
        api: &Self::Context,
        desired: EdgeFunctionAliasSpec,
    ) -> Result<Created<EdgeFunctionAliasState>, ReconcileError> {
        let id = alias_id(&desired)?;
        info!(%id, version = %desired.function_version, "Creating edge function alias");

        let request = AliasRequest {
            name: Some(desired.name.clone()),
            description: desired.description.clone(),
            function_version: desired.function_version.clone(),
            revision_id: None,
        };
        api.create_alias(&desired.shortname, &desired.function_name, &request)
            .await
            .map_err(|e| ReconcileError::remote("create_alias", &id, e))?;

        let observed = Self::read(api, &id)
            .await?
            .ok_or_else(|| ReconcileError::Vanished {
                kind: Self::KIND,
                id: id.clone(),
            })?;
        Ok(Created { id, observed })
    }

    async fn read(
        api: &Self::Context,
        id: &str,
    ) -> Result<Option<EdgeFunctionAliasState>, ReconcileError> {
        let [shortname, function, alias] = identity::decode::<3>(id)?;
        let info = found(api.get_alias(&shortname, &function, &alias).await)
            .map_err(|e| ReconcileError::remote("get_alias", id, e))?;
        Ok(info.map(|info| observe(shortname, info)))
    }

    async fn update(
        api: &Self::Context,
        id: &str,
        update: AliasUpdate,
    ) -> Result<EdgeFunctionAliasState, ReconcileError> {
        let [shortname, function, alias] = identity::decode::<3>(id)?;
        if alias_id(&update.desired)? != id {
            return Err(ReconcileError::Invalid(format!(
                "alias identity cannot be changed in place on {id}"
            )));
        }

        info!(%id, revision_id = update.revision_id, "Updating edge function alias");
        let request = AliasRequest {
            name: None,
            description: update.desired.description,
            function_version: update.desired.function_version,
            revision_id: Some(update.revision_id),
        };
        api.update_alias(&shortname, &function, &alias, &request)
            .await
            .map_err(|e| ReconcileError::remote("update_alias", id, e))?;

        Self::read(api, id)
            .await?
            .ok_or_else(|| ReconcileError::Vanished {
                kind: Self::KIND,
                id: id.to_string(),
            })
    }

    async fn delete(api: &Self::Context, id: &str) -> Result<(), ReconcileError> {
        let [shortname, function, alias] = identity::decode::<3>(id)?;
        info!(%id, "Deleting edge function alias");
        found(api.delete_alias(&shortname, &function, &alias).await)
            .map(|_| ())
            .map_err(|e| ReconcileError::remote("delete_alias", id, e))
    }
}
