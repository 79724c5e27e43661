use std::fmt;

use crate::address::Address;
use crate::smtp::SmtpDetails;

/// Whether a message sent to the address would reach a mailbox.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Reachable {
    Yes,
    No,
    #[default]
    Unknown,
}

impl fmt::Display for Reachable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Unknown => "unknown",
        })
    }
}

/// Everything `verify` learned about one address. Fields that could not be
/// computed (network failure, deadline) keep their neutral value.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub email: String,
    pub syntax: Address,
    pub reachable: Reachable,
    pub disposable: bool,
    pub role_account: bool,
    pub free: bool,
    pub has_mx_records: bool,
    pub suggestion: Option<String>,
    /// `None` when no probe ran or it did not finish before the deadline.
    pub smtp: Option<SmtpDetails>,
    /// The request deadline expired; later checks were skipped.
    pub deadline_exceeded: bool,
}

impl VerificationResult {
    pub(crate) fn new(syntax: Address) -> Self {
        Self {
            email: syntax.original.trim().to_string(),
            syntax,
            reachable: Reachable::Unknown,
            disposable: false,
            role_account: false,
            free: false,
            has_mx_records: false,
            suggestion: None,
            smtp: None,
            deadline_exceeded: false,
        }
    }
}
