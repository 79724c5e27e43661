#![forbid(unsafe_code)]
//! mailverify_lib : vérification d'adresses e-mail
//!
//! Syntax, MX resolution, SMTP mailbox probing with catch-all detection,
//! disposable / role / free-provider classification and typo suggestions,
//! bundled behind a single [`Verifier`].

pub mod address;
pub mod classify;
pub mod disposable;
pub mod mx;
pub mod smtp;
pub mod suggest;
pub mod verifier;

pub use address::{Address, parse_address};
pub use classify::{is_free_provider, is_role_account};
pub use disposable::{DisposableDomains, DisposableSnapshot, ListSource, RefreshError};
pub use mx::{DnsLookup, Error as MxError, MxRecord, MxStatus};
pub use smtp::{Error as SmtpProbeError, ProbeOutcome, ProbeReport, SmtpConnect, SmtpDetails, SmtpProbeOptions};
pub use suggest::suggest_domain;
pub use verifier::{ConfigError, Reachable, VerificationResult, Verifier, VerifierConfig, VerifyError};
