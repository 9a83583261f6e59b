//! # Limelight Reconciler
//!
//! Reconciles declared Limelight resources against the Limelight management APIs, on top of
//! [`reconcile_framework`].
//!
//! - **[model]**: declarative specs and observed states per resource type.
//! - **[api]**: the remote API contract, plus an in-memory implementation.
//! - **[transcode]**: conversion between the declarative shape and API payloads.
//! - **[delivery]**, **[edge_function]**, **[edge_function_alias]**, **[streaming_slot]**: one
//!   [`Reconciler`](reconcile_framework::Reconciler) per resource type.
//! - **[ip_ranges]**: the read-only IP allow list data source.
//! - **[digest]**: hex SHA-256 for archives and the IP allow list id.
//! - **[clients]**: typed handles to the resource actors.
//! - **[lifecycle]**: starts and stops the actors.
//! - **[config]**: credentials, endpoints and poll timing.

pub mod api;
pub mod clients;
pub mod config;
pub mod delivery;
pub mod digest;
pub mod edge_function;
pub mod edge_function_alias;
pub mod error;
pub mod ip_ranges;
pub mod lifecycle;
pub mod model;
pub mod streaming_slot;
pub mod transcode;
