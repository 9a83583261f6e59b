//! Update planning for edge functions.
//!
//! An edge function has three facets that the API updates through separate calls: code,
//! configuration and reserved concurrency. The planner maps the set of changed declarative
//! fields to the calls that have to be made, always in the order code, configuration,
//! concurrency.

use crate::api::FunctionConfiguration;
use crate::model::EdgeFunctionSpec;
use crate::transcode::expand_env_vars;
use reconcile_framework::changes::FieldTable;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Declarative fields of an edge function and how to tell they changed.
pub static FIELDS: FieldTable<EdgeFunctionSpec> = FieldTable::new(&[
    ("description", |a, b| a.description != b.description),
    ("function_archive", |a, b| a.function_archive != b.function_archive),
    ("handler", |a, b| a.handler != b.handler),
    ("runtime", |a, b| a.runtime != b.runtime),
    ("memory", |a, b| a.memory != b.memory),
    ("timeout", |a, b| a.timeout != b.timeout),
    ("can_debug", |a, b| a.can_debug != b.can_debug),
    ("environment_variable", |a, b| {
        a.environment_variables != b.environment_variables
    }),
    ("function_sha256", |a, b| a.function_sha256 != b.function_sha256),
    ("reserved_concurrency", |a, b| {
        a.reserved_concurrency != b.reserved_concurrency
    }),
]);

/// Fields carried by the configuration call.
const CONFIG_FIELDS: [&str; 7] = [
    "description",
    "handler",
    "runtime",
    "memory",
    "timeout",
    "can_debug",
    "environment_variable",
];

/// One remote call of an edge function update.
#[derive(Debug, Clone, PartialEq)]
pub enum FacetOperation {
    /// Upload the archive found at this path.
    CodeUpdate { archive: PathBuf },
    ConfigUpdate(FunctionConfiguration),
    ConcurrencyUpdate(u32),
}

impl FacetOperation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CodeUpdate { .. } => "code_update",
            Self::ConfigUpdate(_) => "config_update",
            Self::ConcurrencyUpdate(_) => "concurrency_update",
        }
    }
}

/// The full configuration payload for `spec`.
pub fn configuration(spec: &EdgeFunctionSpec) -> FunctionConfiguration {
    FunctionConfiguration {
        description: spec.description.clone(),
        handler: spec.handler.clone(),
        runtime: spec.runtime.clone(),
        memory: spec.memory,
        timeout: spec.timeout,
        can_debug: spec.can_debug,
        environment_variables: expand_env_vars(&spec.environment_variables),
    }
}

/// Operations needed to move an edge function to `desired`, given the fields that changed.
///
/// A changed `function_archive` path alone uploads nothing; the digest decides.
pub fn plan(changed: &BTreeSet<&'static str>, desired: &EdgeFunctionSpec) -> Vec<FacetOperation> {
    let mut operations = Vec::new();
    if changed.contains("function_sha256") {
        operations.push(FacetOperation::CodeUpdate {
            archive: desired.function_archive.clone(),
        });
    }
    if CONFIG_FIELDS.iter().any(|field| changed.contains(field)) {
        operations.push(FacetOperation::ConfigUpdate(configuration(desired)));
    }
    if changed.contains("reserved_concurrency") {
        operations.push(FacetOperation::ConcurrencyUpdate(desired.reserved_concurrency));
    }
    operations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EnvVar;

    fn spec() -> EdgeFunctionSpec {
        EdgeFunctionSpec {
            shortname: "acct".into(),
            name: "fn1".into(),
            description: "first".into(),
            function_archive: PathBuf::from("fn.zip"),
            handler: "main.handler".into(),
            runtime: "python3".into(),
            memory: 256,
            timeout: 5000,
            can_debug: false,
            environment_variables: BTreeSet::from([EnvVar::new("A", "1")]),
            function_sha256: "aaaa".into(),
            reserved_concurrency: 0,
        }
    }

    fn names(operations: &[FacetOperation]) -> Vec<&'static str> {
        operations.iter().map(FacetOperation::name).collect()
    }

    #[test]
    fn test_digest_change_plans_only_code_update() {
        let prior = spec();
        let desired = EdgeFunctionSpec {
            function_sha256: "bbbb".into(),
            ..prior.clone()
        };

        let changed = FIELDS.changed(&prior, &desired);
        assert_eq!(changed, BTreeSet::from(["function_sha256"]));
        assert_eq!(
            plan(&changed, &desired),
            vec![FacetOperation::CodeUpdate {
                archive: PathBuf::from("fn.zip")
            }]
        );
    }

    #[test]
    fn test_memory_and_concurrency_plan_config_then_concurrency() {
        let prior = spec();
        let desired = EdgeFunctionSpec {
            memory: 512,
            reserved_concurrency: 5,
            ..prior.clone()
        };

        let operations = plan(&FIELDS.changed(&prior, &desired), &desired);
        assert_eq!(names(&operations), vec!["config_update", "concurrency_update"]);
        match &operations[0] {
            FacetOperation::ConfigUpdate(config) => assert_eq!(config.memory, 512),
            other => panic!("expected config update, got {other:?}"),
        }
        assert_eq!(operations[1], FacetOperation::ConcurrencyUpdate(5));
    }

    #[test]
    fn test_every_facet_changes_in_fixed_order() {
        let prior = spec();
        let mut desired = spec();
        desired.function_sha256 = "cccc".into();
        desired
            .environment_variables
            .insert(EnvVar::new("B", "2"));
        desired.reserved_concurrency = 1;

        let operations = plan(&FIELDS.changed(&prior, &desired), &desired);
        assert_eq!(
            names(&operations),
            vec!["code_update", "config_update", "concurrency_update"]
        );
    }

    #[test]
    fn test_archive_path_alone_plans_nothing() {
        let prior = spec();
        let desired = EdgeFunctionSpec {
            function_archive: PathBuf::from("renamed.zip"),
            ..prior.clone()
        };
        let changed = FIELDS.changed(&prior, &desired);
        assert_eq!(changed, BTreeSet::from(["function_archive"]));
        assert!(plan(&changed, &desired).is_empty());
    }

    #[test]
    fn test_table_lists_declarative_names() {
        let names: Vec<_> = FIELDS.names().collect();
        assert_eq!(names.len(), 10);
        assert!(names.contains(&"environment_variable"));
    }
}
