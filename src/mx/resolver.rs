use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};

use super::{Error, MxRecord, MxStatus};

/// Source of MX and address records. Implemented by [`SystemDns`] and by
/// stubs in tests.
#[async_trait]
pub trait DnsLookup: Send + Sync {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, Error>;
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, Error>;
}

/// System resolver (`/etc/resolv.conf`) on the Tokio runtime.
pub struct SystemDns {
    resolver: TokioAsyncResolver,
}

impl SystemDns {
    pub fn from_system_conf() -> Result<Self, Error> {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().map_err(Error::resolver_init)?;
        Ok(Self { resolver })
    }
}

#[async_trait]
impl DnsLookup for SystemDns {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, Error> {
        let lookup = self
            .resolver
            .mx_lookup(fqdn(domain))
            .await
            .map_err(|err| classify_error(domain, err))?;
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            records.push(MxRecord::new(mx.preference(), exchange));
        }
        Ok(records)
    }

    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, Error> {
        let lookup = self
            .resolver
            .lookup_ip(fqdn(host))
            .await
            .map_err(|err| classify_error(host, err))?;
        Ok(lookup.iter().collect())
    }
}

fn classify_error(name: &str, err: ResolveError) -> Error {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => Error::no_records(name),
        ResolveErrorKind::Timeout => Error::Timeout {
            name: name.to_string(),
        },
        _ => Error::lookup(name, err),
    }
}

fn fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// Resolve the mail hosts of `ascii_domain`: MX first, A/AAAA fallback.
///
/// Never fails; every lookup is bounded by `timeout` and failures are folded
/// into [`MxStatus::Failed`] / [`MxStatus::NoRecords`].
pub async fn resolve_mail_hosts<R>(resolver: &R, ascii_domain: &str, timeout: Duration) -> MxStatus
where
    R: DnsLookup + ?Sized,
{
    let mx = match tokio::time::timeout(timeout, resolver.lookup_mx(ascii_domain)).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout {
            name: ascii_domain.to_string(),
        }),
    };

    match mx {
        Ok(mut records) => {
            records.sort();
            records.dedup();
            if records.len() == 1 && records[0].is_null() {
                debug!(domain = ascii_domain, "null MX published");
                return MxStatus::NoRecords;
            }
            records.retain(|r| !r.is_null());
            if !records.is_empty() {
                return MxStatus::Records(records);
            }
        }
        Err(err) if err.is_no_records() => {}
        Err(err) => {
            debug!(domain = ascii_domain, error = %err, "MX lookup failed");
            return MxStatus::Failed(err.to_string());
        }
    }

    // RFC 5321 §5.1: implicit MX from the domain's own A/AAAA records
    match tokio::time::timeout(timeout, resolver.lookup_ip(ascii_domain)).await {
        Ok(Ok(addrs)) if !addrs.is_empty() => MxStatus::Implicit(addrs),
        Ok(Ok(_)) => MxStatus::NoRecords,
        Ok(Err(err)) if err.is_no_records() => MxStatus::NoRecords,
        Ok(Err(err)) => MxStatus::Failed(err.to_string()),
        Err(_) => MxStatus::Failed(format!("address lookup for {ascii_domain} timed out")),
    }
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}
