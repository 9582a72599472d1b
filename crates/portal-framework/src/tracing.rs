//! # Observability
//!
//! [`setup_tracing`] installs the `tracing-subscriber` formatter used by every binary and
//! demo in the workspace.
//!
//! - Log levels come from `RUST_LOG` (`EnvFilter::from_default_env`).
//! - Module paths are hidden (`with_target(false)`); actors log an `entity_type` field instead.
//! - The compact format renders spans inline, e.g. `login:poll: Observation status=pending`.
//!
//! ```bash
//! RUST_LOG=info cargo run      # one line per state change
//! RUST_LOG=debug cargo run     # every observation and request payload
//! ```

/// Initializes the global subscriber. Call once, at process start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
