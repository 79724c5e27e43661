use std::fmt;

use super::machine::SmtpState;
use crate::verifier::Reachable;

/// What a single probe session learned about the mailbox.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmtpDetails {
    pub host_exists: bool,
    pub full_inbox: bool,
    pub catch_all: bool,
    pub deliverable: bool,
    pub disabled: bool,
}

/// Verdict of the target `RCPT TO`.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Accepted,
    Rejected,
    TemporaryFailure,
    /// No verdict: unreachable host, refused session, timeout, policy block.
    Unavailable,
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str("accepted"),
            Self::Rejected => f.write_str("rejected"),
            Self::TemporaryFailure => f.write_str("temporary failure"),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// Final report produced by [`SmtpProber::probe`](super::SmtpProber::probe).
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub host: String,
    pub state: SmtpState,
    pub details: SmtpDetails,
    pub outcome: ProbeOutcome,
    pub reason: Option<String>,
    pub transcript: Vec<String>,
}

impl ProbeReport {
    pub(crate) fn unreachable(host: &str, reason: impl Into<String>) -> Self {
        Self {
            host: host.to_string(),
            state: SmtpState::Failed,
            details: SmtpDetails::default(),
            outcome: ProbeOutcome::Unavailable,
            reason: Some(reason.into()),
            transcript: Vec::new(),
        }
    }

    /// `Yes` only for an accepted mailbox on a domain that rejects random
    /// recipients.
    pub fn reachable(&self) -> Reachable {
        if !self.details.host_exists || self.details.catch_all {
            return Reachable::Unknown;
        }
        match self.outcome {
            ProbeOutcome::Accepted if self.details.deliverable => Reachable::Yes,
            ProbeOutcome::Rejected => Reachable::No,
            _ => Reachable::Unknown,
        }
    }
}
