use std::time::Duration;

use url::Url;

use super::error::ConfigError;
use crate::disposable::DEFAULT_SOURCE_URL;
use crate::smtp::{DEFAULT_MAIL_FROM, SmtpProbeOptions, Socks5Proxy};

/// Engine settings. Start from [`Default`] and chain the builder methods:
///
/// ```
/// use std::time::Duration;
/// use mailverify_lib::VerifierConfig;
///
/// let config = VerifierConfig::default()
///     .enable_smtp_check(true)
///     .enable_domain_suggest(true)
///     .smtp_timeout(Duration::from_secs(5));
/// assert!(config.validate().is_ok());
/// ```
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    pub enable_smtp_check: bool,
    pub enable_domain_suggest: bool,
    pub enable_auto_update_disposable: bool,
    /// `socks5://[user:pass@]host[:port]` used for SMTP connections.
    pub proxy_uri: Option<String>,
    /// Bound on the SMTP connect and on each command; the whole probe gets
    /// three times this.
    pub smtp_timeout: Duration,
    pub smtp_port: u16,
    pub catch_all_check: bool,
    /// Still resolve and probe domains already known as disposable.
    pub check_disposable_mail_servers: bool,
    pub helo_name: String,
    pub from_email: String,
    /// Overall budget of one `verify` call.
    pub request_timeout: Duration,
    pub dns_timeout: Duration,
    pub disposable_refresh_interval: Duration,
    pub disposable_source_url: String,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            enable_smtp_check: false,
            enable_domain_suggest: false,
            enable_auto_update_disposable: false,
            proxy_uri: None,
            smtp_timeout: Duration::from_secs(10),
            smtp_port: 25,
            catch_all_check: true,
            check_disposable_mail_servers: false,
            helo_name: "localhost".to_string(),
            from_email: DEFAULT_MAIL_FROM.to_string(),
            request_timeout: Duration::from_secs(60),
            dns_timeout: Duration::from_secs(5),
            disposable_refresh_interval: Duration::from_secs(24 * 60 * 60),
            disposable_source_url: DEFAULT_SOURCE_URL.to_string(),
        }
    }
}

impl VerifierConfig {
    pub fn enable_smtp_check(mut self, enabled: bool) -> Self {
        self.enable_smtp_check = enabled;
        self
    }

    pub fn enable_domain_suggest(mut self, enabled: bool) -> Self {
        self.enable_domain_suggest = enabled;
        self
    }

    pub fn enable_auto_update_disposable(mut self, enabled: bool) -> Self {
        self.enable_auto_update_disposable = enabled;
        self
    }

    pub fn proxy(mut self, uri: impl Into<String>) -> Self {
        self.proxy_uri = Some(uri.into());
        self
    }

    pub fn smtp_timeout(mut self, timeout: Duration) -> Self {
        self.smtp_timeout = timeout;
        self
    }

    pub fn smtp_port(mut self, port: u16) -> Self {
        self.smtp_port = port;
        self
    }

    pub fn catch_all_check(mut self, enabled: bool) -> Self {
        self.catch_all_check = enabled;
        self
    }

    pub fn check_disposable_mail_servers(mut self, enabled: bool) -> Self {
        self.check_disposable_mail_servers = enabled;
        self
    }

    pub fn helo_name(mut self, name: impl Into<String>) -> Self {
        self.helo_name = name.into();
        self
    }

    /// Envelope sender for probes; an empty string sends `MAIL FROM:<>`.
    pub fn from_email(mut self, sender: impl Into<String>) -> Self {
        self.from_email = sender.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn dns_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout = timeout;
        self
    }

    pub fn disposable_refresh_interval(mut self, interval: Duration) -> Self {
        self.disposable_refresh_interval = interval;
        self
    }

    pub fn disposable_source_url(mut self, url: impl Into<String>) -> Self {
        self.disposable_source_url = url.into();
        self
    }

    /// Checks everything that would otherwise fail later at request time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(uri) = &self.proxy_uri {
            Socks5Proxy::parse(uri)?;
        }
        for (name, value) in [
            ("smtp_timeout", self.smtp_timeout),
            ("request_timeout", self.request_timeout),
            ("dns_timeout", self.dns_timeout),
            ("disposable_refresh_interval", self.disposable_refresh_interval),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroTimeout { name });
            }
        }
        if self.enable_auto_update_disposable {
            self.source_url()?;
        }
        Ok(())
    }

    pub(crate) fn proxy_settings(&self) -> Result<Option<Socks5Proxy>, ConfigError> {
        self.proxy_uri.as_deref().map(Socks5Proxy::parse).transpose()
    }

    pub(crate) fn source_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidSourceUrl {
            url: self.disposable_source_url.clone(),
            reason,
        };
        let url = Url::parse(&self.disposable_source_url).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme '{other}'"))),
        }
    }

    pub(crate) fn probe_options(&self) -> SmtpProbeOptions {
        SmtpProbeOptions {
            port: self.smtp_port,
            helo_domain: self.helo_name.clone(),
            mail_from: self.from_email.clone(),
            connect_timeout: self.smtp_timeout,
            command_timeout: self.smtp_timeout,
            probe_timeout: self.smtp_timeout.saturating_mul(3),
            catch_all_check: self.catch_all_check,
        }
    }
}
