//! Tracing setup: structured JSON logs, plus OTLP span export when an
//! endpoint is configured.
//!
//! # Telemetry invariants
//!
//! - **No passphrase, key material, or save content** may appear in any span
//!   attribute or log field. Only sizes, flags and backend names are recorded.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   takes precedence when set.

pub mod init;

pub use init::init_telemetry;
