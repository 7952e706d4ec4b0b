//! Shared application state injected into every Axum handler.

use es3_codec::Codec;

/// Application state shared across all request handlers.
///
/// [`Codec`] is `Arc`-backed, so cloning the state per request copies two
/// pointers and a flag.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Codec bound to the process-wide passphrase and the configured backend.
    pub codec: Codec,
    /// Whether `/api/encrypt` compresses when the request omits `compress`.
    pub compress_on_encrypt: bool,
}

impl AppState {
    pub fn new(codec: Codec, compress_on_encrypt: bool) -> Self {
        Self {
            codec,
            compress_on_encrypt,
        }
    }
}

#[cfg(test)]
impl Default for AppState {
    /// Native backend with a fixed test passphrase.
    fn default() -> Self {
        use es3_codec::{BackendKind, Passphrase};
        let passphrase = Passphrase::new("test-passphrase").unwrap();
        Self::new(Codec::with_kind(passphrase, BackendKind::Native), false)
    }
}
