//! SMTP mailbox probing.
//!
//! A probe connects to one mail exchanger, walks `EHLO` / `MAIL FROM` /
//! `RCPT TO` and stops before `DATA`. An accepted recipient is followed by
//! a random one on the same domain to spot catch-all servers.
//!
//! [`ProbeMachine`] holds the dialogue logic with no I/O, [`SmtpProber`]
//! wires it to a transport obtained through an [`SmtpConnect`].

mod classify;
mod connector;
mod error;
mod machine;
mod options;
mod probe;
mod session;
mod types;

pub use classify::{ReplyClass, classify_reply};
pub use connector::{BoxedStream, DirectConnector, Socks5Connector, Socks5Proxy, SmtpConnect, SmtpIo};
pub use error::SmtpProbeError as Error;
pub use machine::{Command, ProbeMachine, SmtpState};
pub use options::{DEFAULT_MAIL_FROM, SmtpProbeOptions};
pub use probe::SmtpProber;
pub use session::SmtpReply;
pub use types::{ProbeOutcome, ProbeReport, SmtpDetails};
