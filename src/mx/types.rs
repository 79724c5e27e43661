use std::net::IpAddr;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }

    /// RFC 7505 null MX: the domain explicitly accepts no mail.
    pub fn is_null(&self) -> bool {
        self.exchange.is_empty() || self.exchange == "."
    }
}

/// Outcome of mail-host resolution for a domain.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MxStatus {
    /// MX records, sorted by ascending preference.
    Records(Vec<MxRecord>),
    /// No MX, but the domain itself has A/AAAA records (implicit MX).
    Implicit(Vec<IpAddr>),
    /// The domain does not exist or publishes no mail host.
    NoRecords,
    /// Resolution could not be concluded (timeout, SERVFAIL, ...).
    Failed(String),
}

impl MxStatus {
    pub fn has_mail_hosts(&self) -> bool {
        matches!(self, Self::Records(_) | Self::Implicit(_))
    }

    /// Host to probe: lowest-preference exchange, or `domain` itself for an
    /// implicit MX.
    pub fn best_host(&self, domain: &str) -> Option<String> {
        match self {
            Self::Records(records) => records.first().map(|r| r.exchange.clone()),
            Self::Implicit(_) => Some(domain.to_string()),
            Self::NoRecords | Self::Failed(_) => None,
        }
    }

    pub fn is_conclusive(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}
