//! Address syntax parsing.
//!
//! [`parse_address`] never fails: malformed input yields an [`Address`] with
//! `valid == false` and the list of violated rules in `reasons`.

mod domain;
mod local;
mod types;

pub use types::Address;

pub(crate) use domain::parse_domain_literal;

use domain::check_domain;
use local::check_local;

const MAX_ADDRESS_LEN: usize = 254;

/// Splits `raw` on its last unescaped `@` and validates both halves.
pub fn parse_address(raw: &str) -> Address {
    let input = raw.trim();

    if input.is_empty() {
        return Address::invalid(raw, vec!["address is empty".to_string()]);
    }

    let separators = match unescaped_at_positions(input) {
        Ok(positions) => positions,
        Err(reason) => return Address::invalid(raw, vec![reason.to_string()]),
    };

    let at = match separators.as_slice() {
        [] => return Address::invalid(raw, vec!["must contain an '@'".to_string()]),
        [single] => *single,
        _ => {
            return Address::invalid(raw, vec!["must contain exactly one unescaped '@'".to_string()]);
        }
    };

    let (local, domain) = (&input[..at], &input[at + 1..]);
    let domain = domain.to_lowercase();

    let mut reasons = Vec::new();
    if input.len() > MAX_ADDRESS_LEN {
        reasons.push(format!("total length {} > {MAX_ADDRESS_LEN}", input.len()));
    }
    check_local(local, &mut reasons);
    let ascii_domain = check_domain(&domain, &mut reasons);

    Address {
        original: raw.to_string(),
        local_part: local.to_string(),
        domain,
        ascii_domain,
        valid: reasons.is_empty(),
        reasons,
    }
}

/// Byte offsets of every `@` that is neither quoted nor backslash-escaped.
fn unescaped_at_positions(input: &str) -> Result<Vec<usize>, &'static str> {
    let mut positions = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for (idx, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            '@' if !in_quotes => positions.push(idx),
            _ => {}
        }
    }

    if in_quotes {
        return Err("unterminated quoted string");
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_basic() {
        let a = parse_address("user@example.com");
        assert!(a.valid, "{:?}", a.reasons);
        assert_eq!(a.local_part, "user");
        assert_eq!(a.domain, "example.com");
        assert_eq!(a.ascii_domain, "example.com");
    }

    #[test]
    fn syntax_table() {
        let cases = [
            ("user@example.com", true),
            ("test.email@domain.co.uk", true),
            ("user+tag@example.com", true),
            ("\"john doe\"@example.com", true),
            ("\"a@b\"@example.com", true),
            ("user@[192.0.2.1]", true),
            ("user@[IPv6:2001:db8::1]", true),
            ("invalid.email", false),
            ("@example.com", false),
            ("user@", false),
            ("user@.com", false),
            ("a@@b.com", false),
            ("a@b@example.com", false),
            ("\"unterminated@example.com", false),
            ("jo\"hn\"@example.com", false),
            ("user@localhost", false),
            ("user@[not-an-ip]", false),
            ("", false),
            ("   ", false),
        ];
        for (email, valid) in cases {
            let parsed = parse_address(email);
            assert_eq!(parsed.valid, valid, "{email}: {:?}", parsed.reasons);
        }
    }

    #[test]
    fn splits_on_last_unescaped_at() {
        let a = parse_address("\"odd@local\"@Example.COM");
        assert!(a.valid, "{:?}", a.reasons);
        assert_eq!(a.local_part, "\"odd@local\"");
        assert_eq!(a.domain, "example.com");
    }

    #[test]
    fn escaped_at_is_not_a_separator() {
        let a = parse_address("\"a\\@b\"@example.com");
        assert!(a.valid, "{:?}", a.reasons);
        assert_eq!(a.local_part, "\"a\\@b\"");
    }

    #[test]
    fn invalid_carries_reason() {
        let a = parse_address("no-at-sign");
        assert!(!a.valid);
        assert_eq!(a.reason(), Some("must contain an '@'"));
    }

    #[test]
    fn long_local_part_rejected() {
        let local = "a".repeat(65);
        let a = parse_address(&format!("{local}@example.com"));
        assert!(!a.valid);
        assert!(a.reasons.iter().any(|r| r.contains("> 64")));
    }

    #[test]
    fn whitespace_trimmed() {
        let a = parse_address("  alice@example.com \n");
        assert!(a.valid);
        assert_eq!(a.original, "  alice@example.com \n");
        assert_eq!(a.ascii_address(), "alice@example.com");
    }

    proptest! {
        #[test]
        fn strings_without_at_are_invalid(s in "[^@]*") {
            prop_assert!(!parse_address(&s).valid);
        }

        #[test]
        fn empty_local_part_is_invalid(domain in "[a-z]{1,10}\\.[a-z]{2,4}") {
            let addr = format!("@{domain}");
            prop_assert!(!parse_address(&addr).valid);
        }

        #[test]
        fn empty_domain_is_invalid(local in "[a-z0-9.]{1,20}") {
            let addr = format!("{local}@");
            prop_assert!(!parse_address(&addr).valid);
        }

        #[test]
        fn never_panics(s in "\\PC*") {
            let _ = parse_address(&s);
        }
    }
}
