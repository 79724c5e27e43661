use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("failed to build HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to fetch {source_name}: {source}")]
    Fetch {
        source_name: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{source_name} answered HTTP {status}")]
    Status { source_name: String, status: u16 },
    #[error("malformed domain list from {source_name}: {reason}")]
    Malformed { source_name: String, reason: String },
    #[error("domain list from {source_name} is empty")]
    Empty { source_name: String },
}

impl RefreshError {
    pub(crate) fn fetch(source_name: &str, source: reqwest::Error) -> Self {
        Self::Fetch {
            source_name: source_name.to_string(),
            source,
        }
    }

    pub(crate) fn malformed(source_name: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            source_name: source_name.to_string(),
            reason: reason.into(),
        }
    }
}
