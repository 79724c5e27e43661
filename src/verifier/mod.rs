//! The verification engine.
//!
//! A [`Verifier`] is built once from a [`VerifierConfig`] and shared across
//! requests. `verify` runs syntax, classifier, DNS and SMTP checks in that
//! order under one request deadline; when the deadline hits, the checks
//! already done are returned and the rest are left at their neutral value.

mod config;
mod error;
mod types;


use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, warn};

pub use config::VerifierConfig;
pub use error::{ConfigError, VerifyError};
pub use types::{Reachable, VerificationResult};

use crate::address::{Address, parse_address, parse_domain_literal};
use crate::classify::{is_free_provider, is_role_account};
use crate::disposable::{DisposableDomains, HttpListSource, ListSource, RefreshHandle, spawn_refresher};
use crate::mx::{DnsLookup, MxStatus, SystemDns, resolve_mail_hosts};
use crate::smtp::{DirectConnector, SmtpConnect, SmtpProber, Socks5Connector};
use crate::suggest::suggest_domain;

pub struct Verifier {
    config: VerifierConfig,
    dns: Arc<dyn DnsLookup>,
    prober: SmtpProber,
    disposable: DisposableDomains,
    _refresher: Option<RefreshHandle>,
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("config", &self.config)
            .field("disposable_domains", &self.disposable.snapshot().len())
            .finish_non_exhaustive()
    }
}

impl Verifier {
    /// Engine with the system resolver and a direct or SOCKS5 SMTP
    /// transport. With `enable_auto_update_disposable`, this must run inside
    /// a Tokio runtime: the refresh task is spawned here.
    pub fn new(config: VerifierConfig) -> Result<Self, VerifyError> {
        config.validate()?;
        let dns = SystemDns::from_system_conf()?;
        let connector: Arc<dyn SmtpConnect> = match config.proxy_settings()? {
            Some(proxy) => {
                debug!(proxy = %proxy, "SMTP probes go through SOCKS5");
                Arc::new(Socks5Connector::new(proxy))
            }
            None => Arc::new(DirectConnector),
        };
        Self::with_components(config, Arc::new(dns), connector)
    }

    /// Engine over caller-provided DNS and SMTP transports. The disposable
    /// list, if auto-updated, is fetched over HTTP.
    pub fn with_components(
        config: VerifierConfig,
        dns: Arc<dyn DnsLookup>,
        connector: Arc<dyn SmtpConnect>,
    ) -> Result<Self, VerifyError> {
        let source: Option<Arc<dyn ListSource>> = if config.enable_auto_update_disposable {
            let url = config.source_url()?;
            Some(Arc::new(HttpListSource::new(url, config.request_timeout)?))
        } else {
            None
        };
        Self::with_list_source(config, dns, connector, source)
    }

    /// Like [`with_components`](Self::with_components) with an explicit
    /// disposable list source. `source` is only used when auto-update is on.
    pub fn with_list_source(
        config: VerifierConfig,
        dns: Arc<dyn DnsLookup>,
        connector: Arc<dyn SmtpConnect>,
        source: Option<Arc<dyn ListSource>>,
    ) -> Result<Self, VerifyError> {
        config.validate()?;
        let disposable = DisposableDomains::builtin();
        let refresher = match (config.enable_auto_update_disposable, source) {
            (true, Some(source)) => {
                if tokio::runtime::Handle::try_current().is_err() {
                    return Err(ConfigError::RuntimeUnavailable.into());
                }
                Some(spawn_refresher(
                    disposable.clone(),
                    source,
                    config.disposable_refresh_interval,
                ))
            }
            _ => None,
        };
        let prober = SmtpProber::new(config.probe_options(), connector);
        Ok(Self {
            config,
            dns,
            prober,
            disposable,
            _refresher: refresher,
        })
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Syntax check only, no I/O.
    pub fn parse_address(&self, raw: &str) -> Address {
        parse_address(raw)
    }

    /// Engine readiness: false only while auto-update is on and no remote
    /// disposable list has been loaded yet.
    pub fn is_ready(&self) -> bool {
        !self.config.enable_auto_update_disposable || self.disposable.has_remote_list()
    }

    /// Adds custom disposable domains; returns how many were new.
    pub fn add_disposable_domains<I, S>(&self, domains: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.disposable.extend(domains)
    }

    pub fn disposable(&self) -> &DisposableDomains {
        &self.disposable
    }

    /// Full verification of one address.
    ///
    /// Only a syntactically invalid address is an error. Network failures and
    /// the request deadline degrade individual fields instead.
    pub async fn verify(&self, raw: &str) -> Result<VerificationResult, VerifyError> {
        let deadline = Instant::now() + self.config.request_timeout;
        let syntax = parse_address(raw);
        if !syntax.valid {
            return Err(VerifyError::InvalidAddress {
                email: raw.trim().to_string(),
                reasons: syntax.reasons,
            });
        }

        let mut result = VerificationResult::new(syntax);
        let local = result.syntax.local_part.clone();
        let ascii_domain = result.syntax.ascii_domain.clone();

        result.role_account = is_role_account(&local);
        result.free = is_free_provider(&ascii_domain);
        result.disposable = self.disposable.contains(&ascii_domain);
        if self.config.enable_domain_suggest {
            result.suggestion = suggest_domain(&result.syntax.domain);
        }
        debug!(
            email = %result.email,
            role = result.role_account,
            free = result.free,
            disposable = result.disposable,
            "classified address"
        );

        if result.disposable && !self.config.check_disposable_mail_servers {
            return Ok(result);
        }

        let literal = if result.syntax.is_domain_literal() {
            parse_domain_literal(&ascii_domain)
        } else {
            None
        };
        let status = match literal {
            Some(ip) => MxStatus::Implicit(vec![ip]),
            None => {
                let lookup = resolve_mail_hosts(self.dns.as_ref(), &ascii_domain, self.config.dns_timeout);
                match tokio::time::timeout_at(deadline, lookup).await {
                    Ok(status) => status,
                    Err(_) => {
                        warn!(email = %result.email, "request deadline hit during DNS resolution");
                        result.deadline_exceeded = true;
                        return Ok(result);
                    }
                }
            }
        };
        if status.is_conclusive() {
            debug!(domain = %ascii_domain, status = ?status, "mail hosts resolved");
        } else {
            warn!(domain = %ascii_domain, status = ?status, "mail host resolution inconclusive");
        }
        result.has_mx_records = status.has_mail_hosts();
        if status == MxStatus::NoRecords {
            result.reachable = Reachable::No;
        }

        if !self.config.enable_smtp_check {
            return Ok(result);
        }
        let host = match literal {
            Some(ip) => Some(ip.to_string()),
            None => status.best_host(&ascii_domain),
        };
        let Some(host) = host else {
            return Ok(result);
        };

        let probe = self.prober.probe(&host, &local, &ascii_domain);
        match tokio::time::timeout_at(deadline, probe).await {
            Ok(report) => {
                result.reachable = report.reachable();
                result.smtp = Some(report.details);
            }
            Err(_) => {
                warn!(email = %result.email, %host, "request deadline hit during SMTP probe");
                result.deadline_exceeded = true;
            }
        }
        Ok(result)
    }
}
