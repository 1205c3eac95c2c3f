//! # Observability & Tracing
//!
//! Every module logs through `tracing` macros with structured fields, so a
//! line can be filtered by component or state without parsing the message:
//!
//! ```text
//! INFO Component registered component=chemistry
//! INFO State changed from=starting to=running
//! WARN Component not responding component=audio errors=1
//! WARN Message timed out id=6f1c… sender=ui receiver=audio age_ms=5210
//! ```
//!
//! ## Levels
//!
//! - `error`: readiness failure, panicking observers and handlers
//! - `warn`: rejected transitions, probe failures, blocked components, dropped messages
//! - `info`: registration, state changes, initialization summary
//! - `debug`: per-request and per-delivery detail
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run -p lab-sample
//! RUST_LOG=orchestrator_core=debug cargo run -p lab-sample
//! ```

/// Installs a compact fmt subscriber filtered by `RUST_LOG`.
///
/// Call once, from the binary's `main`. Libraries and tests never call it.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
