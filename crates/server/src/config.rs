//! Configuration loading and validation for the codec service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use es3_codec::{BackendKind, Passphrase};
use serde::Deserialize;

/// Validated service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Passphrase every save container is keyed from. **Required.**
    pub es3_passphrase: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Codec backend: `"native"` or `"restricted"`.
    #[serde(default = "default_codec_backend")]
    pub codec_backend: String,

    /// Whether `/api/encrypt` gzips when the request does not say.
    #[serde(default)]
    pub compress_on_encrypt: bool,

    /// Largest accepted request body in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Optional OTLP endpoint; spans are only exported when set.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    8080
}
fn default_codec_backend() -> String {
    "native".into()
}
fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// The configured passphrase, checked non-empty.
    pub fn passphrase(&self) -> Result<Passphrase> {
        Passphrase::new(self.es3_passphrase.clone())
            .context("ES3_PASSPHRASE is required and must not be empty")
    }

    /// The configured codec backend.
    pub fn backend(&self) -> Result<BackendKind> {
        self.codec_backend
            .parse()
            .context("CODEC_BACKEND is invalid")
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        self.passphrase()?;
        self.backend()?;
        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be > 0");
        }
        if self.max_body_bytes == 0 {
            anyhow::bail!("MAX_BODY_BYTES must be > 0");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be > 0");
        }
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            if endpoint.trim().is_empty() {
                anyhow::bail!("OTEL_EXPORTER_OTLP_ENDPOINT must not be blank when set");
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The passphrase never reaches logs.
        f.debug_struct("Config")
            .field("es3_passphrase", &"[REDACTED]")
            .field("listen_port", &self.listen_port)
            .field("codec_backend", &self.codec_backend)
            .field("compress_on_encrypt", &self.compress_on_encrypt)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .field("log_level", &self.log_level)
            .finish()
    }
}
