use thiserror::Error;

use crate::disposable::RefreshError;
use crate::mx::Error as MxError;

/// Faults detected while building a [`Verifier`](super::Verifier). They are
/// reported once at construction, never per request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid proxy URI {uri}: {reason}")]
    InvalidProxyUri { uri: String, reason: String },
    #[error("unsupported proxy scheme '{scheme}', expected socks5 or socks5h")]
    UnsupportedProxyScheme { scheme: String },
    #[error("{name} must be greater than zero")]
    ZeroTimeout { name: &'static str },
    #[error("invalid disposable list URL {url}: {reason}")]
    InvalidSourceUrl { url: String, reason: String },
    #[error("automatic disposable updates need a running Tokio runtime")]
    RuntimeUnavailable,
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid email address {email:?}: {}", .reasons.join("; "))]
    InvalidAddress { email: String, reasons: Vec<String> },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("DNS resolver unavailable: {0}")]
    Resolver(#[from] MxError),
    #[error("disposable list source unavailable: {0}")]
    Refresh(#[from] RefreshError),
}

impl VerifyError {
    pub fn is_invalid_address(&self) -> bool {
        matches!(self, Self::InvalidAddress { .. })
    }
}
