use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{DnsLookup, Error, MxRecord, MxStatus, resolve_mail_hosts, resolver};

/// In-memory DNS. Names absent from both maps answer NXDOMAIN; names listed
/// in `failing` answer a timeout; names in `hanging` never answer.
#[derive(Default)]
pub(crate) struct StubDns {
    pub mx: HashMap<String, Vec<MxRecord>>,
    pub ips: HashMap<String, Vec<IpAddr>>,
    pub failing: Vec<String>,
    pub hanging: Vec<String>,
    queries: AtomicUsize,
}

impl StubDns {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_mx(mut self, domain: &str, records: Vec<MxRecord>) -> Self {
        self.mx.insert(domain.to_string(), records);
        self
    }

    pub(crate) fn with_ip(mut self, host: &str, ip: &str) -> Self {
        let addr = ip.parse().expect("valid ip literal");
        self.ips.entry(host.to_string()).or_default().push(addr);
        self
    }

    pub(crate) fn failing(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }

    pub(crate) fn hanging(mut self, name: &str) -> Self {
        self.hanging.push(name.to_string());
        self
    }

    /// Number of MX and address queries answered so far.
    pub(crate) fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    async fn gate(&self, name: &str) -> Result<(), Error> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.hanging.iter().any(|n| n == name) {
            std::future::pending::<()>().await;
        }
        if self.failing.iter().any(|n| n == name) {
            return Err(Error::Timeout {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DnsLookup for StubDns {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, Error> {
        self.gate(domain).await?;
        self.mx
            .get(domain)
            .cloned()
            .ok_or_else(|| Error::NoRecords {
                name: domain.to_string(),
            })
    }

    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, Error> {
        self.gate(host).await?;
        self.ips.get(host).cloned().ok_or_else(|| Error::NoRecords {
            name: host.to_string(),
        })
    }
}

const TIMEOUT: Duration = Duration::from_secs(3);

#[tokio::test]
async fn records_sorted_and_deduped() {
    let stub = StubDns::new().with_mx(
        "example.com",
        vec![
            MxRecord::new(20, "mx2.example.com"),
            MxRecord::new(10, "mx1.example.com"),
            MxRecord::new(10, "mx1.example.com"),
            MxRecord::new(30, "mx3.example.com"),
        ],
    );

    let status = resolve_mail_hosts(&stub, "example.com", TIMEOUT).await;
    let MxStatus::Records(ref records) = status else {
        panic!("expected MX records, got {status:?}");
    };
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].preference, 10);
    assert_eq!(records[0].exchange, "mx1.example.com");
    assert_eq!(records[2].preference, 30);
    assert_eq!(
        status.best_host("example.com").as_deref(),
        Some("mx1.example.com")
    );
}

#[tokio::test]
async fn falls_back_to_address_records() {
    let stub = StubDns::new().with_ip("example.com", "192.0.2.10");
    let status = resolve_mail_hosts(&stub, "example.com", TIMEOUT).await;
    assert!(matches!(status, MxStatus::Implicit(ref addrs) if addrs.len() == 1));
    assert!(status.has_mail_hosts());
    assert_eq!(status.best_host("example.com").as_deref(), Some("example.com"));
}

#[tokio::test]
async fn nothing_published_means_no_records() {
    let stub = StubDns::new();
    let status = resolve_mail_hosts(&stub, "nowhere.invalid", TIMEOUT).await;
    assert_eq!(status, MxStatus::NoRecords);
    assert!(!status.has_mail_hosts());
    assert!(status.is_conclusive());
}

#[tokio::test]
async fn null_mx_means_no_mail() {
    let stub = StubDns::new()
        .with_mx("example.com", vec![MxRecord::new(0, "")])
        .with_ip("example.com", "192.0.2.10");
    let status = resolve_mail_hosts(&stub, "example.com", TIMEOUT).await;
    assert_eq!(status, MxStatus::NoRecords);
}

#[tokio::test]
async fn server_failure_is_folded_not_raised() {
    let stub = StubDns::new().failing("example.com");
    let status = resolve_mail_hosts(&stub, "example.com", TIMEOUT).await;
    assert!(matches!(status, MxStatus::Failed(_)));
    assert!(!status.has_mail_hosts());
    assert!(!status.is_conclusive());
}

#[tokio::test(start_paused = true)]
async fn hanging_resolver_is_bounded_by_timeout() {
    let stub = StubDns::new().hanging("example.com");
    let status = resolve_mail_hosts(&stub, "example.com", Duration::from_secs(2)).await;
    match status {
        MxStatus::Failed(reason) => assert!(reason.contains("timed out"), "{reason}"),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn normalize_exchange_trims_dot_and_lowercases() {
    let out = resolver::normalize_exchange("Mail.EXAMPLE.com.".to_string());
    assert_eq!(out, "mail.example.com");
    assert!(MxRecord::new(0, resolver::normalize_exchange(".".to_string())).is_null());
}
