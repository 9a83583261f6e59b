//! Declarative desired state and observed state for every Limelight resource type.

pub mod delivery;
pub mod edge_function;
pub mod edge_function_alias;
pub mod ip_ranges;
pub mod streaming_slot;

pub use delivery::*;
pub use edge_function::*;
pub use edge_function_alias::*;
pub use ip_ranges::*;
pub use streaming_slot::*;
