use thiserror::Error;

use super::machine::SmtpState;

#[derive(Debug, Error)]
pub enum SmtpProbeError {
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("SOCKS5 proxy {proxy} failed: {source}")]
    Proxy {
        proxy: String,
        #[source]
        source: fast_socks5::SocksError,
    },
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
    #[error("timed out while in state {state:?}")]
    Timeout { state: SmtpState },
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl SmtpProbeError {
    pub(crate) fn io(source: std::io::Error) -> Self {
        Self::Io { source }
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}
