//! # System Lifecycle
//!
//! Starts one reconcile actor per Limelight resource type, hands each its context, and shuts
//! them all down again.
//!
//! ## Context Injection
//!
//! Actors are created without dependencies and receive them at `run(context)`:
//!
//! | Actor | Context |
//! |---|---|
//! | delivery | `Arc<dyn ConfigurationApi>` |
//! | edge function, alias | `Arc<dyn EdgeFunctionsApi>` |
//! | streaming slot | [`SlotContext`](crate::streaming_slot::SlotContext): API, poll timing |
//!
//! The API handles are the only shared state; they are stateless from the actors' point of
//! view.
//!
//! ## Graceful Shutdown
//!
//! 1. **Drop all clients** - closes the sending side of every channel
//! 2. **Actors drain** - each finishes the request it is serving and sees its channel closed
//! 3. **Await completion** - every actor task is joined
//!
//! A create that is waiting on provisioning holds its actor until the wait ends, so shutdown
//! can take up to the provisioning timeout.

pub mod provider_system;

pub use provider_system::*;
