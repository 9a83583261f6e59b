//! # Mock Client & Testing Guide
//!
//! [`MockClient<T>`] hands out a real [`ReconcileClient<T>`] whose requests are answered from a
//! queue of expectations instead of a running [`ReconcileActor`](crate::ReconcileActor). Use it
//! to test code that sits *around* a client (typed wrappers, orchestration) without a remote
//! API behind it.
//!
//! | | MockClient | Real actor + in-memory API |
//! |---|---|---|
//! | **State** | none, canned answers | real remote state |
//! | **Error injection** | `return_err` on any call | per-operation failure hooks |
//! | **Use case** | client logic | reconciler behaviour, system flows |
//!
//! ```rust
//! use async_trait::async_trait;
//! use reconcile_framework::mock::MockClient;
//! use reconcile_framework::{Created, FrameworkError, ReconcileError, Reconciler};
//!
//! #[derive(Debug)]
//! struct Note;
//!
//! #[async_trait]
//! impl Reconciler for Note {
//!     const KIND: &'static str = "note";
//!     type Desired = String;
//!     type Update = ();
//!     type Observed = String;
//!     type Context = ();
//!
//!     async fn create(_: &(), text: String) -> Result<Created<String>, ReconcileError> {
//!         Ok(Created { id: "n1".into(), observed: text })
//!     }
//!     async fn read(_: &(), _: &str) -> Result<Option<String>, ReconcileError> { Ok(None) }
//!     async fn delete(_: &(), _: &str) -> Result<(), ReconcileError> { Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Note>::new();
//!     mock.expect_read("n1").return_ok(Some("hello".into()));
//!     mock.expect_delete("n1").return_err(FrameworkError::ActorClosed);
//!
//!     let client = mock.client();
//!     assert_eq!(client.read("n1".into()).await.unwrap().as_deref(), Some("hello"));
//!     assert!(matches!(client.delete("n1".into()).await, Err(FrameworkError::ActorClosed)));
//!
//!     mock.verify();
//! }
//! ```
//!
//! Use [`create_mock_client`] to get a client and the raw request receiver instead, when a test
//! needs to inspect the payload that was sent.

use crate::client::ReconcileClient;
use crate::error::FrameworkError;
use crate::message::ReconcileRequest;
use crate::reconciler::{Created, Reconciler};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

enum Expectation<T: Reconciler> {
    Create {
        response: Result<Created<T::Observed>, FrameworkError>,
    },
    Read {
        id: String,
        response: Result<Option<T::Observed>, FrameworkError>,
    },
    Update {
        id: String,
        response: Result<T::Observed, FrameworkError>,
    },
    Delete {
        id: String,
        response: Result<(), FrameworkError>,
    },
    Import {
        id: String,
        response: Result<Option<T::Observed>, FrameworkError>,
    },
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

fn check_id(verb: &str, expected: &str, actual: &str) {
    assert_eq!(
        expected, actual,
        "{verb} sent for unexpected id (expected {expected:?}, got {actual:?})"
    );
}

/// A mock client with ordered expectations.
///
/// Requests must arrive in the order the expectations were registered; an out-of-order or
/// unexpected request panics the mock task, which surfaces as
/// [`FrameworkError::ActorDropped`] at the call site.
pub struct MockClient<T: Reconciler> {
    client: ReconcileClient<T>,
    expectations: Queue<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: Reconciler> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Reconciler> MockClient<T> {
    /// Creates a new mock client with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ReconcileRequest<T>>(100);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = queue.lock().unwrap().pop_front();

                match (request, expectation) {
                    (
                        ReconcileRequest::Create { respond_to, .. },
                        Some(Expectation::Create { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ReconcileRequest::Read { id, respond_to },
                        Some(Expectation::Read { id: want, response }),
                    ) => {
                        check_id("read", &want, &id);
                        let _ = respond_to.send(response);
                    }
                    (
                        ReconcileRequest::Update { id, respond_to, .. },
                        Some(Expectation::Update { id: want, response }),
                    ) => {
                        check_id("update", &want, &id);
                        let _ = respond_to.send(response);
                    }
                    (
                        ReconcileRequest::Delete { id, respond_to },
                        Some(Expectation::Delete { id: want, response }),
                    ) => {
                        check_id("delete", &want, &id);
                        let _ = respond_to.send(response);
                    }
                    (
                        ReconcileRequest::Import { id, respond_to },
                        Some(Expectation::Import { id: want, response }),
                    ) => {
                        check_id("import", &want, &id);
                        let _ = respond_to.send(response);
                    }
                    _ => panic!("Unexpected request or expectation mismatch"),
                }
            }
        });

        Self {
            client: ReconcileClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ReconcileClient<T> {
        self.client.clone()
    }

    pub fn expect_create(&mut self) -> ExpectationBuilder<T, Created<T::Observed>> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Create {
            response,
        })
    }

    pub fn expect_read(&mut self, id: &str) -> ExpectationBuilder<T, Option<T::Observed>> {
        let id = id.to_string();
        ExpectationBuilder::new(self.expectations.clone(), move |response| Expectation::Read {
            id,
            response,
        })
    }

    pub fn expect_update(&mut self, id: &str) -> ExpectationBuilder<T, T::Observed> {
        let id = id.to_string();
        ExpectationBuilder::new(self.expectations.clone(), move |response| {
            Expectation::Update { id, response }
        })
    }

    pub fn expect_delete(&mut self, id: &str) -> ExpectationBuilder<T, ()> {
        let id = id.to_string();
        ExpectationBuilder::new(self.expectations.clone(), move |response| {
            Expectation::Delete { id, response }
        })
    }

    pub fn expect_import(&mut self, id: &str) -> ExpectationBuilder<T, Option<T::Observed>> {
        let id = id.to_string();
        ExpectationBuilder::new(self.expectations.clone(), move |response| {
            Expectation::Import { id, response }
        })
    }

    /// Panics unless every expectation has been consumed.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().unwrap().len();
        if remaining > 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

/// Completes an expectation with the value the mock will answer.
pub struct ExpectationBuilder<T: Reconciler, R> {
    expectations: Queue<T>,
    make: Box<dyn FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send>,
}

impl<T: Reconciler, R> ExpectationBuilder<T, R> {
    fn new(
        expectations: Queue<T>,
        make: impl FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send + 'static,
    ) -> Self {
        Self {
            expectations,
            make: Box::new(make),
        }
    }

    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    pub fn return_err(self, error: FrameworkError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, FrameworkError>) {
        let expectation = (self.make)(response);
        self.expectations.lock().unwrap().push_back(expectation);
    }
}

/// Creates a client and the receiving end of its channel, for asserting on raw requests.
pub fn create_mock_client<T: Reconciler>(
    buffer_size: usize,
) -> (ReconcileClient<T>, mpsc::Receiver<ReconcileRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ReconcileClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request.
pub async fn expect_create<T: Reconciler>(
    receiver: &mut mpsc::Receiver<ReconcileRequest<T>>,
) -> Option<(
    T::Desired,
    oneshot::Sender<Result<Created<T::Observed>, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ReconcileRequest::Create {
            desired,
            respond_to,
        }) => Some((desired, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Update request.
pub async fn expect_update<T: Reconciler>(
    receiver: &mut mpsc::Receiver<ReconcileRequest<T>>,
) -> Option<(
    String,
    T::Update,
    oneshot::Sender<Result<T::Observed, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ReconcileRequest::Update {
            id,
            update,
            respond_to,
        }) => Some((id, update, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReconcileError;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct Counter;

    #[derive(Debug, Clone, PartialEq)]
    struct CounterState {
        value: u32,
    }

    #[async_trait]
    impl Reconciler for Counter {
        const KIND: &'static str = "counter";
        type Desired = u32;
        type Update = u32;
        type Observed = CounterState;
        type Context = ();

        async fn create(_: &(), value: u32) -> Result<Created<CounterState>, ReconcileError> {
            Ok(Created {
                id: "c1".into(),
                observed: CounterState { value },
            })
        }

        async fn read(_: &(), _: &str) -> Result<Option<CounterState>, ReconcileError> {
            Ok(None)
        }

        async fn delete(_: &(), _: &str) -> Result<(), ReconcileError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_raw_receiver_sees_create_payload() {
        let (client, mut receiver) = create_mock_client::<Counter>(10);

        let task = tokio::spawn(async move { client.create(7).await });

        let (desired, responder) = expect_create(&mut receiver)
            .await
            .expect("Expected Create request");
        assert_eq!(desired, 7);
        responder
            .send(Ok(Created {
                id: "c9".into(),
                observed: CounterState { value: 7 },
            }))
            .unwrap();

        let created = task.await.unwrap().unwrap();
        assert_eq!(created.id, "c9");
    }

    #[tokio::test]
    async fn test_raw_receiver_sees_update_payload() {
        let (client, mut receiver) = create_mock_client::<Counter>(10);

        let task = tokio::spawn(async move { client.update("c1".into(), 3).await });

        let (id, update, responder) = expect_update(&mut receiver).await.unwrap();
        assert_eq!((id.as_str(), update), ("c1", 3));
        responder.send(Ok(CounterState { value: 3 })).unwrap();

        assert_eq!(task.await.unwrap().unwrap(), CounterState { value: 3 });
    }

    #[tokio::test]
    async fn test_expectations_answer_in_order() {
        let mut mock = MockClient::<Counter>::new();
        mock.expect_create().return_ok(Created {
            id: "c1".into(),
            observed: CounterState { value: 1 },
        });
        mock.expect_import("c1").return_ok(Some(CounterState { value: 1 }));
        mock.expect_update("c1").return_err(FrameworkError::Reconcile(
            ReconcileError::Immutable { kind: "counter" },
        ));
        mock.expect_delete("c1").return_ok(());

        let client = mock.client();
        assert_eq!(client.create(1).await.unwrap().id, "c1");
        assert!(client.import("c1".into()).await.unwrap().is_some());
        let err = client.update("c1".into(), 2).await.unwrap_err();
        assert!(matches!(
            err,
            FrameworkError::Reconcile(ReconcileError::Immutable { .. })
        ));
        client.delete("c1".into()).await.unwrap();

        mock.verify();
    }

    #[tokio::test]
    async fn test_unexpected_request_surfaces_as_dropped_actor() {
        let mock = MockClient::<Counter>::new();
        let err = mock.client().delete("c1".into()).await.unwrap_err();
        assert!(matches!(err, FrameworkError::ActorDropped));
    }
}
