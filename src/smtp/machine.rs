use std::fmt;

use super::classify::{ReplyClass, classify_reply};
use super::session::SmtpReply;
use super::types::{ProbeOutcome, SmtpDetails};

/// Position of a probe session in the SMTP dialogue.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpState {
    Connecting,
    /// Connected, waiting for the 220 banner.
    Greeting,
    /// EHLO (or the HELO fallback) sent.
    HelloSent,
    SenderSent,
    RecipientSent,
    Closed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ehlo(String),
    Helo(String),
    MailFrom(String),
    RcptTo(String),
    Quit,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ehlo(name) => write!(f, "EHLO {name}"),
            Self::Helo(name) => write!(f, "HELO {name}"),
            Self::MailFrom(sender) => write!(f, "MAIL FROM:<{sender}>"),
            Self::RcptTo(rcpt) => write!(f, "RCPT TO:<{rcpt}>"),
            Self::Quit => f.write_str("QUIT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recipient {
    Target,
    CatchAll,
}

/// Pure transition function of a probe: it consumes server replies and
/// yields the next command, without touching the network. `DATA` is never
/// part of the dialogue.
#[derive(Debug, Clone)]
pub struct ProbeMachine {
    state: SmtpState,
    helo: String,
    sender: String,
    target: String,
    catch_all_target: Option<String>,
    recipient: Recipient,
    helo_fallback_used: bool,
    details: SmtpDetails,
    outcome: ProbeOutcome,
    reason: Option<String>,
}

impl ProbeMachine {
    pub fn new(
        helo: impl Into<String>,
        sender: impl Into<String>,
        target: impl Into<String>,
        catch_all_target: Option<String>,
    ) -> Self {
        Self {
            state: SmtpState::Connecting,
            helo: helo.into(),
            sender: sender.into(),
            target: target.into(),
            catch_all_target,
            recipient: Recipient::Target,
            helo_fallback_used: false,
            details: SmtpDetails::default(),
            outcome: ProbeOutcome::Unavailable,
            reason: Some("probe not started".to_string()),
        }
    }

    pub fn state(&self) -> SmtpState {
        self.state
    }

    pub fn details(&self) -> SmtpDetails {
        self.details
    }

    pub fn outcome(&self) -> ProbeOutcome {
        self.outcome
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SmtpState::Closed | SmtpState::Failed)
    }

    /// The TCP (or proxied) connection is up; the banner is expected next.
    /// The host only counts as existing once a 220 greeting arrives.
    pub fn connected(&mut self) {
        if self.state == SmtpState::Connecting {
            self.state = SmtpState::Greeting;
            self.reason = None;
        }
    }

    /// I/O error or timeout. A session already closing keeps its verdict;
    /// otherwise no mailbox verdict survives.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.is_finished() {
            return;
        }
        self.state = SmtpState::Failed;
        self.outcome = ProbeOutcome::Unavailable;
        self.details.deliverable = false;
        self.reason = Some(reason.into());
    }

    /// Feeds one server reply; returns the command to send next, or `None`
    /// when the session is over.
    pub fn advance(&mut self, reply: &SmtpReply) -> Option<Command> {
        match self.state {
            SmtpState::Connecting => {
                self.fail("reply received before connection was established");
                None
            }
            SmtpState::Greeting => {
                if reply.code == 220 {
                    self.details.host_exists = true;
                    self.state = SmtpState::HelloSent;
                    Some(Command::Ehlo(self.helo.clone()))
                } else {
                    self.give_up(reply, "greeting refused")
                }
            }
            SmtpState::HelloSent => {
                if reply.is_positive_completion() {
                    self.state = SmtpState::SenderSent;
                    Some(Command::MailFrom(self.sender.clone()))
                } else if reply.is_permanent_failure() && !self.helo_fallback_used {
                    self.helo_fallback_used = true;
                    Some(Command::Helo(self.helo.clone()))
                } else {
                    self.give_up(reply, "HELO rejected")
                }
            }
            SmtpState::SenderSent => {
                if reply.is_positive_completion() {
                    self.state = SmtpState::RecipientSent;
                    self.recipient = Recipient::Target;
                    Some(Command::RcptTo(self.target.clone()))
                } else {
                    self.give_up(reply, "MAIL FROM rejected")
                }
            }
            SmtpState::RecipientSent => match self.recipient {
                Recipient::Target => self.on_target_reply(reply),
                Recipient::CatchAll => self.on_catch_all_reply(reply),
            },
            SmtpState::Closed | SmtpState::Failed => None,
        }
    }

    fn on_target_reply(&mut self, reply: &SmtpReply) -> Option<Command> {
        let class = classify_reply(reply);
        self.reason = Some(format!("RCPT TO answered {} ({class:?})", reply.code));
        match class {
            ReplyClass::Accepted => {
                self.details.deliverable = true;
                self.outcome = ProbeOutcome::Accepted;
                self.reason = None;
                if let Some(random) = self.catch_all_target.clone() {
                    self.recipient = Recipient::CatchAll;
                    return Some(Command::RcptTo(random));
                }
            }
            ReplyClass::MailboxUnavailable => self.outcome = ProbeOutcome::Rejected,
            ReplyClass::Disabled => {
                self.details.disabled = true;
                self.outcome = ProbeOutcome::Rejected;
            }
            ReplyClass::FullInbox => {
                self.details.full_inbox = true;
                self.outcome = ProbeOutcome::TemporaryFailure;
            }
            ReplyClass::Greylisted | ReplyClass::TryAgainLater => {
                self.outcome = ProbeOutcome::TemporaryFailure;
            }
            ReplyClass::ServiceClosing => {
                self.outcome = ProbeOutcome::TemporaryFailure;
                self.state = SmtpState::Closed;
                return None;
            }
            ReplyClass::Blocked | ReplyClass::Unexpected => {
                self.outcome = ProbeOutcome::Unavailable;
            }
        }
        self.close()
    }

    fn on_catch_all_reply(&mut self, reply: &SmtpReply) -> Option<Command> {
        match classify_reply(reply) {
            ReplyClass::Accepted => {
                self.details.catch_all = true;
                self.details.deliverable = false;
                self.reason = Some("server accepts any recipient (catch-all)".to_string());
                self.close()
            }
            ReplyClass::ServiceClosing => {
                self.state = SmtpState::Closed;
                None
            }
            _ => self.close(),
        }
    }

    fn give_up(&mut self, reply: &SmtpReply, context: &str) -> Option<Command> {
        self.outcome = if reply.is_transient_failure() {
            ProbeOutcome::TemporaryFailure
        } else {
            ProbeOutcome::Unavailable
        };
        self.reason = Some(format!("{context}: {} {}", reply.code, reply.text()));
        if reply.code == 421 {
            self.state = SmtpState::Closed;
            return None;
        }
        self.close()
    }

    fn close(&mut self) -> Option<Command> {
        self.state = SmtpState::Closed;
        Some(Command::Quit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(code: u16) -> SmtpReply {
        SmtpReply::new(code, "ok")
    }

    fn machine(catch_all: bool) -> ProbeMachine {
        let random = catch_all.then(|| "zq8x1k2m@example.com".to_string());
        let mut m = ProbeMachine::new("localhost", "user@example.org", "alice@example.com", random);
        m.connected();
        m
    }

    fn through_sender(m: &mut ProbeMachine) {
        assert_eq!(m.advance(&ok(220)), Some(Command::Ehlo("localhost".into())));
        assert_eq!(
            m.advance(&ok(250)),
            Some(Command::MailFrom("user@example.org".into()))
        );
        assert_eq!(
            m.advance(&ok(250)),
            Some(Command::RcptTo("alice@example.com".into()))
        );
        assert_eq!(m.state(), SmtpState::RecipientSent);
    }

    #[test]
    fn accepted_without_catch_all_check() {
        let mut m = machine(false);
        through_sender(&mut m);
        assert_eq!(m.advance(&ok(250)), Some(Command::Quit));
        assert_eq!(m.state(), SmtpState::Closed);
        assert_eq!(m.advance(&ok(221)), None);
        assert!(m.details().deliverable);
        assert!(m.details().host_exists);
        assert_eq!(m.outcome(), ProbeOutcome::Accepted);
    }

    #[test]
    fn random_recipient_accepted_means_catch_all() {
        let mut m = machine(true);
        through_sender(&mut m);
        assert_eq!(
            m.advance(&ok(250)),
            Some(Command::RcptTo("zq8x1k2m@example.com".into()))
        );
        assert_eq!(m.advance(&ok(250)), Some(Command::Quit));
        let details = m.details();
        assert!(details.catch_all);
        assert!(!details.deliverable);
    }

    #[test]
    fn random_recipient_rejected_keeps_verdict() {
        let mut m = machine(true);
        through_sender(&mut m);
        m.advance(&ok(250));
        assert_eq!(
            m.advance(&SmtpReply::new(550, "5.1.1 unknown")),
            Some(Command::Quit)
        );
        assert!(!m.details().catch_all);
        assert!(m.details().deliverable);
        assert_eq!(m.outcome(), ProbeOutcome::Accepted);
    }

    #[test]
    fn rejection_skips_catch_all_probe() {
        let mut m = machine(true);
        through_sender(&mut m);
        assert_eq!(
            m.advance(&SmtpReply::new(550, "5.1.1 User unknown")),
            Some(Command::Quit)
        );
        assert_eq!(m.outcome(), ProbeOutcome::Rejected);
        assert!(!m.details().deliverable);
    }

    #[test]
    fn full_inbox_is_temporary() {
        let mut m = machine(true);
        through_sender(&mut m);
        m.advance(&SmtpReply::new(452, "4.2.2 Mailbox full"));
        assert!(m.details().full_inbox);
        assert_eq!(m.outcome(), ProbeOutcome::TemporaryFailure);
    }

    #[test]
    fn disabled_account_is_rejected() {
        let mut m = machine(false);
        through_sender(&mut m);
        m.advance(&SmtpReply::new(550, "5.2.1 The email account is disabled"));
        assert!(m.details().disabled);
        assert_eq!(m.outcome(), ProbeOutcome::Rejected);
    }

    #[test]
    fn service_closing_ends_without_quit() {
        let mut m = machine(true);
        through_sender(&mut m);
        assert_eq!(m.advance(&SmtpReply::new(421, "too busy")), None);
        assert_eq!(m.state(), SmtpState::Closed);
        assert_eq!(m.outcome(), ProbeOutcome::TemporaryFailure);
    }

    #[test]
    fn ehlo_rejection_falls_back_to_helo_once() {
        let mut m = machine(false);
        m.advance(&ok(220));
        assert_eq!(
            m.advance(&SmtpReply::new(502, "not implemented")),
            Some(Command::Helo("localhost".into()))
        );
        assert_eq!(
            m.advance(&SmtpReply::new(502, "still no")),
            Some(Command::Quit)
        );
        assert_eq!(m.outcome(), ProbeOutcome::Unavailable);
    }

    #[test]
    fn refused_greeting_quits() {
        let mut m = machine(false);
        assert_eq!(
            m.advance(&SmtpReply::new(554, "no service")),
            Some(Command::Quit)
        );
        assert_eq!(m.outcome(), ProbeOutcome::Unavailable);
        assert!(!m.details().host_exists);
    }

    #[test]
    fn host_exists_only_after_banner() {
        let mut m = machine(false);
        assert!(!m.details().host_exists);
        m.fail("timed out waiting for banner");
        assert!(!m.details().host_exists);

        let mut m = machine(false);
        m.advance(&ok(220));
        assert!(m.details().host_exists);
    }

    #[test]
    fn drop_during_catch_all_check_clears_deliverable() {
        let mut m = machine(true);
        through_sender(&mut m);
        assert_eq!(
            m.advance(&ok(250)),
            Some(Command::RcptTo("zq8x1k2m@example.com".into()))
        );
        m.fail("connection reset");
        assert_eq!(m.state(), SmtpState::Failed);
        assert_eq!(m.outcome(), ProbeOutcome::Unavailable);
        assert!(!m.details().deliverable);
        assert!(!m.details().catch_all);
    }

    #[test]
    fn failure_after_close_keeps_verdict() {
        let mut m = machine(false);
        through_sender(&mut m);
        m.advance(&ok(250));
        m.fail("connection reset");
        assert_eq!(m.state(), SmtpState::Closed);
        assert_eq!(m.outcome(), ProbeOutcome::Accepted);
    }

    #[test]
    fn failure_mid_dialogue_is_unavailable() {
        let mut m = machine(false);
        m.advance(&ok(220));
        m.fail("timed out");
        assert_eq!(m.state(), SmtpState::Failed);
        assert_eq!(m.outcome(), ProbeOutcome::Unavailable);
        assert_eq!(m.reason(), Some("timed out"));
    }

    #[test]
    fn null_sender_renders_empty_path() {
        assert_eq!(Command::MailFrom(String::new()).to_string(), "MAIL FROM:<>");
        assert_eq!(
            Command::RcptTo("a@b.c".into()).to_string(),
            "RCPT TO:<a@b.c>"
        );
    }
}
