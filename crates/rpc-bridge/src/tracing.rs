//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the subscriber used by the binary. Output is
//! compact and target-less; the level comes from `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **Router lifecycle**: one `Listening` line per topic, `Router stopped` on shutdown.
//! - **Requests**: every request runs inside a `request{topic, id}` span, so each
//!   line a handler logs carries the topic and correlation id.
//! - **Failures**: undecodable envelopes and failed requests at `warn`, handlers
//!   that end without replying at `error`.
//!
//! ```bash
//! RUST_LOG=info cargo run -p bridge-services
//! RUST_LOG=debug cargo run -p bridge-services   # decoded payloads and reply subjects
//! RUST_LOG=rpc_bridge=trace cargo run -p bridge-services
//! ```
//!
//! With `RUST_LOG=info` a login round trip reads:
//!
//! ```text
//! INFO Listening topic="auth.loginUser"
//! INFO request{topic="auth.loginUser" id="req-2"}: Issued token email=alice@example.com
//! ```

/// Initializes the global subscriber. Call once, early in `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
