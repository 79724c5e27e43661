use super::session::SmtpReply;

/// What a reply to `RCPT TO` says about the mailbox.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyClass {
    Accepted,
    /// 550/551/553: no such mailbox.
    MailboxUnavailable,
    FullInbox,
    Disabled,
    /// The server refuses *us* (block lists, relay policy); says nothing
    /// about the mailbox.
    Blocked,
    Greylisted,
    TryAgainLater,
    /// 421: the server is closing the channel.
    ServiceClosing,
    Unexpected,
}

const BLOCKED_HINTS: &[&str] = &[
    "blocked",
    "block list",
    "blocklist",
    "blacklist",
    "spamhaus",
    "banned",
    "reputation",
    "relay access denied",
    "relaying denied",
    "unable to relay",
    "relay not permitted",
];

const MAILBOX_UNKNOWN_HINTS: &[&str] = &[
    "user unknown",
    "unknown user",
    "no such user",
    "does not exist",
    "recipient address rejected",
];

const FULL_INBOX_HINTS: &[&str] = &[
    "mailbox full",
    "mailbox is full",
    "inbox full",
    "quota",
    "insufficient",
    "storage",
    "out of space",
];

const DISABLED_HINTS: &[&str] = &[
    "disabled",
    "deactivated",
    "suspended",
    "inactive",
    "discontinued",
    "no longer active",
    "locked",
];

const GREYLIST_HINTS: &[&str] = &["greylist", "graylist", "try again later", "deferred"];

pub fn classify_reply(reply: &SmtpReply) -> ReplyClass {
    if reply.is_positive_completion() {
        return ReplyClass::Accepted;
    }
    if reply.code == 421 {
        return ReplyClass::ServiceClosing;
    }

    let text = reply.text().to_ascii_lowercase();
    // Un statut boîte (5.1.x ou "user unknown") l'emporte sur la politique.
    if matches!(reply.code, 550 | 551 | 553)
        && (text.starts_with("5.1.") || contains_any(&text, MAILBOX_UNKNOWN_HINTS))
    {
        return ReplyClass::MailboxUnavailable;
    }
    if contains_any(&text, BLOCKED_HINTS) {
        return ReplyClass::Blocked;
    }
    if matches!(reply.code, 452 | 552) || contains_any(&text, FULL_INBOX_HINTS) {
        return ReplyClass::FullInbox;
    }
    if contains_any(&text, DISABLED_HINTS) {
        return ReplyClass::Disabled;
    }
    if reply.is_transient_failure() && contains_any(&text, GREYLIST_HINTS) {
        return ReplyClass::Greylisted;
    }

    match reply.code {
        550 | 551 | 553 => ReplyClass::MailboxUnavailable,
        400..=499 => ReplyClass::TryAgainLater,
        _ => ReplyClass::Unexpected,
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}
