//! DNS mail-host resolution.
//!
//! [`resolve_mail_hosts`] queries MX records through a [`DnsLookup`]
//! implementation, falls back to A/AAAA records, and folds every failure
//! into an [`MxStatus`] instead of an error.

mod error;
mod resolver;
mod types;

pub use error::MxError as Error;
pub use resolver::{DnsLookup, SystemDns, resolve_mail_hosts};
pub use types::{MxRecord, MxStatus};

#[cfg(test)]
pub(crate) mod tests;
