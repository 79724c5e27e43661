use thiserror::Error;

#[derive(Debug, Error)]
pub enum MxError {
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: trust_dns_resolver::error::ResolveError,
    },
    #[error("no records found for {name}")]
    NoRecords { name: String },
    #[error("DNS lookup for {name} failed: {source}")]
    Lookup {
        name: String,
        #[source]
        source: trust_dns_resolver::error::ResolveError,
    },
    #[error("DNS lookup for {name} timed out")]
    Timeout { name: String },
}

impl MxError {
    pub(crate) fn resolver_init(source: trust_dns_resolver::error::ResolveError) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn lookup(
        name: impl Into<String>,
        source: trust_dns_resolver::error::ResolveError,
    ) -> Self {
        Self::Lookup {
            name: name.into(),
            source,
        }
    }

    pub(crate) fn no_records(name: impl Into<String>) -> Self {
        Self::NoRecords { name: name.into() }
    }

    /// NXDOMAIN / NODATA: the name definitively has nothing to offer.
    pub fn is_no_records(&self) -> bool {
        matches!(self, Self::NoRecords { .. })
    }
}
