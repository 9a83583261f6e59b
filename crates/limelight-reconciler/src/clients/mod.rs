//! # Typed Clients
//!
//! One client per resource type. Each wraps a
//! [`ReconcileClient`](reconcile_framework::ReconcileClient), inherits `read`, `import` and
//! `delete` from [`ResourceClient`](reconcile_framework::ResourceClient) and adds the
//! create/update calls that take resource-specific input.

pub mod delivery_client;
pub mod edge_function_alias_client;
pub mod edge_function_client;
pub mod streaming_slot_client;

pub use delivery_client::DeliveryClient;
pub use edge_function_alias_client::EdgeFunctionAliasClient;
pub use edge_function_client::EdgeFunctionClient;
pub use streaming_slot_client::StreamingSlotClient;
