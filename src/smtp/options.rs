use std::time::Duration;

/// Placeholder envelope sender used when none is configured.
pub const DEFAULT_MAIL_FROM: &str = "user@example.org";

/// Configuration knobs for [`SmtpProber`](super::SmtpProber).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpProbeOptions {
    pub port: u16,
    pub helo_domain: String,
    /// Envelope sender. An empty string sends the null reverse-path `<>`.
    pub mail_from: String,
    pub connect_timeout: Duration,
    /// Deadline for each individual read or write.
    pub command_timeout: Duration,
    /// Upper bound on the whole session, connect included.
    pub probe_timeout: Duration,
    pub catch_all_check: bool,
}

impl Default for SmtpProbeOptions {
    fn default() -> Self {
        Self {
            port: 25,
            helo_domain: "localhost".to_string(),
            mail_from: DEFAULT_MAIL_FROM.to_string(),
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(30),
            catch_all_check: true,
        }
    }
}

impl SmtpProbeOptions {
    pub fn helo_name(&self) -> &str {
        let trimmed = self.helo_domain.trim();
        if trimmed.is_empty() { "localhost" } else { trimmed }
    }
}
