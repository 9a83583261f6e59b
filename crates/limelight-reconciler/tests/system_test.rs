use limelight_reconciler::api::memory::InMemoryLimelight;
use limelight_reconciler::config::ProviderConfig;
use limelight_reconciler::error::ClientError;
use limelight_reconciler::lifecycle::ProviderSystem;
use limelight_reconciler::model::{DeliverySpec, OptionSpec, ProtocolSetSpec};
use reconcile_framework::{ReconcileError, ResourceClient};
use serde_json::json;
use std::sync::Arc;

fn config() -> ProviderConfig {
    ProviderConfig::from_toml_str(
        r#"
        username = "ops"
        api_key = "k"
        "#,
    )
    .unwrap()
}

fn delivery(parameters: &[&str]) -> DeliverySpec {
    DeliverySpec {
        shortname: "acct".into(),
        service_profile: "LLNW-Generic".into(),
        protocol_sets: vec![
            ProtocolSetSpec {
                published_protocol: "https".into(),
                source_protocol: "http".into(),
                source_port: Some(0),
                options: vec![OptionSpec {
                    name: "genreply".into(),
                    parameters: parameters.iter().map(|p| p.to_string()).collect(),
                }],
            },
            ProtocolSetSpec {
                published_protocol: "http".into(),
                source_protocol: "http".into(),
                source_port: Some(8080),
                options: vec![],
            },
        ],
        published_hostname: "cdn.example.com".into(),
        published_path: "/".into(),
        source_hostname: "origin.example.com".into(),
        source_path: "/".into(),
    }
}

#[tokio::test]
async fn test_delivery_lifecycle_through_the_system() {
    let api = Arc::new(InMemoryLimelight::new());
    api.register_integer_parameter("LLNW-Generic", "genreply", 0);
    let system = ProviderSystem::new(&config(), api.clone(), api.clone());

    let created = system
        .delivery_client
        .create_delivery(delivery(&["200", "OK"]))
        .await
        .unwrap();
    assert_eq!(created.observed.version_number, 1);
    assert_eq!(created.observed.shortname, "acct");

    let body = api.delivery_body_json(&created.id).unwrap();
    assert_eq!(body["serviceKey"]["name"], "delivery");
    assert_eq!(
        body["protocolSets"][0]["options"][0]["parameters"],
        json!([200, "OK"])
    );
    assert!(body["protocolSets"][0].get("sourcePort").is_none());
    assert_eq!(body["protocolSets"][1]["sourcePort"], 8080);

    // parameters always come back as strings
    let read = system
        .delivery_client
        .read(&created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        read.protocol_sets[0].options[0].parameters,
        vec!["200", "OK"]
    );

    let updated = system
        .delivery_client
        .update_delivery(&created.id, delivery(&["301", "Moved"]))
        .await
        .unwrap();
    assert_eq!(updated.version_number, 2);
    assert_eq!(api.count("update_delivery"), 1);

    system.delivery_client.delete(&created.id).await.unwrap();
    assert_eq!(system.delivery_client.read(&created.id).await.unwrap(), None);
    // deleting again is not an error
    system.delivery_client.delete(&created.id).await.unwrap();

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invalid_delivery_never_reaches_the_api() {
    let api = Arc::new(InMemoryLimelight::new());
    let system = ProviderSystem::new(&config(), api.clone(), api.clone());

    let mut spec = delivery(&["200"]);
    spec.protocol_sets.clear();
    let err = system
        .delivery_client
        .create_delivery(spec)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::Reconcile(ReconcileError::Invalid(_))
    ));
    assert!(api.calls().is_empty());
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_import_of_unknown_delivery_is_none() {
    let api = Arc::new(InMemoryLimelight::new());
    let system = ProviderSystem::new(&config(), api.clone(), api.clone());

    assert_eq!(
        system
            .delivery_client
            .import("00000000-0000-0000-0000-000000000000")
            .await
            .unwrap(),
        None
    );
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_remote_failure_names_operation_and_id() {
    let api = Arc::new(InMemoryLimelight::new());
    let system = ProviderSystem::new(&config(), api.clone(), api.clone());
    let created = system
        .delivery_client
        .create_delivery(delivery(&["200"]))
        .await
        .unwrap();

    api.fail_next(
        "get_delivery",
        limelight_reconciler::api::ApiError::new(500, "internal"),
    );
    let err = system.delivery_client.read(&created.id).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("get_delivery"));
    assert!(message.contains(&created.id));
    assert!(message.contains("HTTP 500"));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_ip_ranges_data_source() {
    let api = Arc::new(InMemoryLimelight::new());
    api.set_ip_allow_list(vec!["1.2.3.0/24".into(), "5.6.7.0/24".into()], 9);
    let system = ProviderSystem::new(&config(), api.clone(), api.clone());

    let ranges = system.ip_ranges().await.unwrap();
    assert_eq!(ranges.version, 9);
    assert_eq!(ranges.id.len(), 64);
    assert_eq!(
        ranges.id,
        limelight_reconciler::digest::sha256_hex(b"1.2.3.0/24,5.6.7.0/24")
    );

    system.shutdown().await.unwrap();
}
