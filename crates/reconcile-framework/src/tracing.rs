//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the process-wide subscriber. Filtering comes from `RUST_LOG`.
//!
//! ```bash
//! RUST_LOG=info cargo run     # one line per remote mutation and actor lifecycle event
//! RUST_LOG=debug cargo run    # adds desired payloads, poll attempts and metadata lookups
//! RUST_LOG=limelight_reconciler=debug,reconcile_framework=info cargo run
//! ```
//!
//! Every actor event carries a `kind` field (e.g. `kind="limelight_edgefunction"`) and, where a
//! resource is addressed, its encoded `id`:
//!
//! ```text
//! INFO Actor started kind="limelight_realtime_streaming_slot"
//! INFO Creating streaming slot shortname="acct" name="live-1"
//! INFO Provisioning finished id="acct:7f3c..." attempts=2 state=READY
//! INFO Created kind="limelight_realtime_streaming_slot" id="acct:7f3c..."
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // kind/id fields identify the source
        .compact()
        .init();
}
