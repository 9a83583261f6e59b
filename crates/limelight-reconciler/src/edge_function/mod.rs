//! # Edge Function Reconciler
//!
//! Manages `limelight_edgefunction`: a serverless function deployed from a zip archive.
//!
//! - **Identifier**: `shortname:name`.
//! - **Create**: uploads the archive, then sets reserved concurrency when it is non-zero. If that
//!   second step fails the function is deleted again and the concurrency failure is returned as
//!   [`ReconcileError::CreateRollback`].
//! - **Update**: only the facets whose fields changed are sent (see [`plan`]). Execution stops
//!   at the first failing call; calls already made stay applied.
//! - **Read**: `function_archive` is write-only and always comes back unset.

pub mod plan;

use crate::api::{found, EdgeFunctionInfo, EdgeFunctionsApi, NewEdgeFunction};
use crate::model::{EdgeFunctionSpec, EdgeFunctionState, EdgeFunctionUpdate};
use crate::transcode::flatten_env_vars;
use async_trait::async_trait;
use plan::{configuration, FacetOperation, FIELDS};
use reconcile_framework::identity;
use reconcile_framework::{Created, ReconcileActor, ReconcileClient, ReconcileError, Reconciler};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug)]
pub struct EdgeFunction;

/// Creates a new edge function actor and its client.
pub fn new() -> (ReconcileActor<EdgeFunction>, ReconcileClient<EdgeFunction>) {
    ReconcileActor::new(32)
}

async fn load_archive(path: &Path) -> Result<Vec<u8>, ReconcileError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ReconcileError::Archive {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), bytes = bytes.len(), "Loaded function archive");
    Ok(bytes)
}

fn observe(shortname: String, info: EdgeFunctionInfo) -> EdgeFunctionState {
    EdgeFunctionState {
        shortname,
        name: info.name,
        description: info.configuration.description,
        function_archive: None,
        handler: info.configuration.handler,
        runtime: info.configuration.runtime,
        memory: info.configuration.memory,
        timeout: info.configuration.timeout,
        can_debug: info.configuration.can_debug,
        environment_variables: flatten_env_vars(&info.configuration.environment_variables),
        function_sha256: info.sha256,
        revision_id: info.revision_id,
        reserved_concurrency: info.reserved_concurrency,
    }
}

/// Runs one planned call. The code facet reads the archive from disk at this point.
async fn apply(
    api: &dyn EdgeFunctionsApi,
    id: &str,
    shortname: &str,
    name: &str,
    operation: &FacetOperation,
) -> Result<(), ReconcileError> {
    match operation {
        FacetOperation::CodeUpdate { archive } => {
            let bytes = load_archive(archive).await?;
            api.update_function_code(shortname, name, &bytes)
                .await
                .map_err(|e| ReconcileError::remote("update_function_code", id, e))?;
        }
        FacetOperation::ConfigUpdate(config) => {
            api.update_function_configuration(shortname, name, config)
                .await
                .map_err(|e| ReconcileError::remote("update_function_configuration", id, e))?;
        }
        FacetOperation::ConcurrencyUpdate(reserved) => {
            api.set_function_concurrency(shortname, name, *reserved)
                .await
                .map_err(|e| ReconcileError::remote("set_function_concurrency", id, e))?;
        }
    }
    Ok(())
}

fn check_identity(
    id: &str,
    spec: &EdgeFunctionSpec,
    shortname: &str,
    name: &str,
) -> Result<(), ReconcileError> {
    if spec.shortname != shortname || spec.name != name {
        return Err(ReconcileError::Invalid(format!(
            "{}:{} cannot be changed in place on {id}",
            spec.shortname, spec.name
        )));
    }
    Ok(())
}

#[async_trait]
impl Reconciler for EdgeFunction {
    const KIND: &'static str = "limelight_edgefunction";
    type Desired = EdgeFunctionSpec;
    type Update = EdgeFunctionUpdate;
    type Observed = EdgeFunctionState;
    type Context = Arc<dyn EdgeFunctionsApi>;

    async fn create(
        api: &Self::Context,
        desired: EdgeFunctionSpec,
    ) -> Result<Created<EdgeFunctionState>, ReconcileError> {
        let requested = identity::encode(&[desired.shortname.as_str(), desired.name.as_str()])?;
        let archive = load_archive(&desired.function_archive).await?;

        info!(id = %requested, runtime = %desired.runtime, "Creating edge function");
        let function = NewEdgeFunction {
            name: desired.name.clone(),
            configuration: configuration(&desired),
            function_archive: archive,
        };
        let info = api
            .create_function(&desired.shortname, &function)
            .await
            .map_err(|e| ReconcileError::remote("create_function", &requested, e))?;
        let id = identity::encode(&[desired.shortname.as_str(), info.name.as_str()])?;

        if desired.reserved_concurrency > 0 {
            if let Err(e) = api
                .set_function_concurrency(
                    &desired.shortname,
                    &info.name,
                    desired.reserved_concurrency,
                )
                .await
            {
                warn!(%id, error = %e, "Setting reserved concurrency failed; deleting function");
                let rollback = api.delete_function(&desired.shortname, &info.name).await;
                let rollback_error = match rollback {
                    Ok(()) => None,
                    Err(delete_error) => {
                        error!(
                            %id,
                            error = %delete_error,
                            "Rollback delete failed; function may be orphaned"
                        );
                        Some(delete_error.to_string())
                    }
                };
                return Err(ReconcileError::CreateRollback {
                    id: id.clone(),
                    source: Box::new(ReconcileError::remote("set_function_concurrency", id, e)),
                    rollback_error,
                });
            }
        }

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
    ) -> Result<Option<EdgeFunctionState>, ReconcileError> {
        let [shortname, name] = identity::decode::<2>(id)?;
        let info = found(api.get_function(&shortname, &name).await)
            .map_err(|e| ReconcileError::remote("get_function", id, e))?;
        Ok(info.map(|info| observe(shortname, info)))
    }

    async fn update(
        api: &Self::Context,
        id: &str,
        update: EdgeFunctionUpdate,
    ) -> Result<EdgeFunctionState, ReconcileError> {
        let [shortname, name] = identity::decode::<2>(id)?;
        check_identity(id, &update.prior, &shortname, &name)?;
        check_identity(id, &update.desired, &shortname, &name)?;

        let changed = FIELDS.changed(&update.prior, &update.desired);
        let operations = plan::plan(&changed, &update.desired);
        info!(
            %id,
            changed = ?changed,
            operations = operations.len(),
            "Updating edge function"
        );

        let mut applied = Vec::with_capacity(operations.len());
        for operation in &operations {
            if let Err(source) = apply(&**api, id, &shortname, &name, operation).await {
                if applied.is_empty() {
                    return Err(source);
                }
                warn!(%id, ?applied, failed = operation.name(), "Edge function partially updated");
                return Err(ReconcileError::PartialUpdate {
                    id: id.to_string(),
                    applied,
                    failed: operation.name(),
                    source: Box::new(source),
                });
            }
            applied.push(operation.name());
        }

        Self::read(api, id)
            .await?
            .ok_or_else(|| ReconcileError::Vanished {
                kind: Self::KIND,
                id: id.to_string(),
            })
    }

    async fn delete(api: &Self::Context, id: &str) -> Result<(), ReconcileError> {
        let [shortname, name] = identity::decode::<2>(id)?;
        info!(%id, "Deleting edge function");
        found(api.delete_function(&shortname, &name).await)
            .map(|_| ())
            .map_err(|e| ReconcileError::remote("delete_function", id, e))
    }
}
