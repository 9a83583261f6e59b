use async_trait::async_trait;
use reconcile_framework::{
    identity, Created, FrameworkError, ReconcileActor, ReconcileClient, ReconcileError,
    Reconciler, ResourceClient,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// --- Test Reconciler ---

/// A remote key-value record addressed as `owner:key`.
#[derive(Debug)]
struct Record;

#[derive(Debug)]
struct RecordSpec {
    owner: String,
    key: String,
    value: String,
}

#[derive(Debug, Clone, PartialEq)]
struct RecordState {
    owner: String,
    key: String,
    value: String,
    revision: u32,
}

#[derive(Default)]
struct FakeRemote {
    records: Mutex<HashMap<String, RecordState>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeRemote {
    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Reconciler for Record {
    const KIND: &'static str = "record";
    type Desired = RecordSpec;
    type Update = String;
    type Observed = RecordState;
    type Context = Arc<FakeRemote>;

    async fn create(
        remote: &Arc<FakeRemote>,
        desired: RecordSpec,
    ) -> Result<Created<RecordState>, ReconcileError> {
        remote.enter().await;
        let id = identity::encode(&[&desired.owner, &desired.key])?;
        let state = RecordState {
            owner: desired.owner,
            key: desired.key,
            value: desired.value,
            revision: 1,
        };
        remote
            .records
            .lock()
            .unwrap()
            .insert(id.clone(), state.clone());
        Ok(Created {
            id,
            observed: state,
        })
    }

    async fn read(
        remote: &Arc<FakeRemote>,
        id: &str,
    ) -> Result<Option<RecordState>, ReconcileError> {
        identity::decode::<2>(id)?;
        Ok(remote.records.lock().unwrap().get(id).cloned())
    }

    async fn update(
        remote: &Arc<FakeRemote>,
        id: &str,
        value: String,
    ) -> Result<RecordState, ReconcileError> {
        remote.enter().await;
        let mut records = remote.records.lock().unwrap();
        let state = records.get_mut(id).ok_or(ReconcileError::Vanished {
            kind: Self::KIND,
            id: id.to_string(),
        })?;
        state.value = value;
        state.revision += 1;
        Ok(state.clone())
    }

    async fn delete(remote: &Arc<FakeRemote>, id: &str) -> Result<(), ReconcileError> {
        remote.records.lock().unwrap().remove(id);
        Ok(())
    }
}

struct RecordClient {
    inner: ReconcileClient<Record>,
}

impl ResourceClient<Record> for RecordClient {
    type Error = String;

    fn inner(&self) -> &ReconcileClient<Record> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.to_string()
    }
}

fn spec(owner: &str, key: &str, value: &str) -> RecordSpec {
    RecordSpec {
        owner: owner.into(),
        key: key.into(),
        value: value.into(),
    }
}

#[tokio::test]
async fn test_record_lifecycle_through_actor() {
    let remote = Arc::new(FakeRemote::default());
    let (actor, client) = ReconcileActor::<Record>::new(10);
    let handle = tokio::spawn(actor.run(remote.clone()));

    let created = client.create(spec("acct", "k1", "v1")).await.unwrap();
    assert_eq!(created.id, "acct:k1");
    assert_eq!(created.observed.revision, 1);

    let updated = client.update(created.id.clone(), "v2".into()).await.unwrap();
    assert_eq!(updated.value, "v2");
    assert_eq!(updated.revision, 2);

    let imported = client.import(created.id.clone()).await.unwrap().unwrap();
    assert_eq!(imported, updated);

    client.delete(created.id.clone()).await.unwrap();
    assert!(client.read(created.id.clone()).await.unwrap().is_none());

    // deleting again is still success
    client.delete(created.id).await.unwrap();

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_malformed_id_is_a_format_error() {
    let (actor, client) = ReconcileActor::<Record>::new(10);
    tokio::spawn(actor.run(Arc::new(FakeRemote::default())));

    let err = client.read("no-delimiter".into()).await.unwrap_err();
    assert!(matches!(
        err,
        FrameworkError::Reconcile(ReconcileError::Format(_))
    ));
}

#[tokio::test]
async fn test_update_of_missing_record_reports_vanished() {
    let (actor, client) = ReconcileActor::<Record>::new(10);
    tokio::spawn(actor.run(Arc::new(FakeRemote::default())));

    let err = client.update("acct:ghost".into(), "v".into()).await.unwrap_err();
    assert!(matches!(
        err,
        FrameworkError::Reconcile(ReconcileError::Vanished { kind: "record", .. })
    ));
}

#[tokio::test]
async fn test_concurrent_requests_are_served_one_at_a_time() {
    let remote = Arc::new(FakeRemote::default());
    let (actor, client) = ReconcileActor::<Record>::new(32);
    tokio::spawn(actor.run(remote.clone()));

    let mut tasks = Vec::new();
    for i in 0..8 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            client
                .create(spec("acct", &format!("k{i}"), "v"))
                .await
                .unwrap()
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(remote.records.lock().unwrap().len(), 8);
    assert_eq!(remote.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_typed_client_default_methods() {
    let remote = Arc::new(FakeRemote::default());
    let (actor, inner) = ReconcileActor::<Record>::new(10);
    tokio::spawn(actor.run(remote));

    let created = inner.create(spec("acct", "k1", "v1")).await.unwrap();
    let client = RecordClient { inner };

    assert!(client.read(&created.id).await.unwrap().is_some());
    assert!(client.import(&created.id).await.unwrap().is_some());
    client.delete(&created.id).await.unwrap();
    assert!(client.read(&created.id).await.unwrap().is_none());

    let err = client.read("bad").await.unwrap_err();
    assert!(err.contains("unexpected format"));
}

#[tokio::test]
async fn test_default_update_is_immutable() {
    #[derive(Debug)]
    struct Frozen;

    #[async_trait]
    impl Reconciler for Frozen {
        const KIND: &'static str = "frozen";
        type Desired = ();
        type Update = ();
        type Observed = ();
        type Context = ();

        async fn create(_: &(), _: ()) -> Result<Created<()>, ReconcileError> {
            Ok(Created {
                id: "f".into(),
                observed: (),
            })
        }
        async fn read(_: &(), _: &str) -> Result<Option<()>, ReconcileError> {
            Ok(Some(()))
        }
        async fn delete(_: &(), _: &str) -> Result<(), ReconcileError> {
            Ok(())
        }
    }

    let (actor, client) = ReconcileActor::<Frozen>::new(1);
    tokio::spawn(actor.run(()));

    let err = client.update("f".into(), ()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "frozen does not support in-place updates; it must be replaced"
    );
}

#[tokio::test]
async fn test_closed_actor() {
    let (actor, client) = ReconcileActor::<Record>::new(1);
    drop(actor);

    let err = client.read("acct:k".into()).await.unwrap_err();
    assert!(matches!(err, FrameworkError::ActorClosed));
}
