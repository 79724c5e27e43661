use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Valide le domaine: littéral `[...]` ou conversion IDNA + checks de labels.
/// Push des raisons invalidantes dans `reasons` et renvoie la forme ASCII
/// (vide si la conversion échoue).
pub(crate) fn check_domain(domain: &str, reasons: &mut Vec<String>) -> String {
    if domain.is_empty() {
        reasons.push("domain is empty".to_string());
        return String::new();
    }

    if domain.starts_with('[') {
        return match parse_domain_literal(domain) {
            Some(_) => domain.to_string(),
            None => {
                reasons.push(format!("invalid domain literal '{domain}'"));
                String::new()
            }
        };
    }

    let domain_ascii = match idna::domain_to_ascii(domain) {
        Ok(d) => d,
        Err(_) => {
            reasons.push("domain punycode conversion failed".to_string());
            return String::new();
        }
    };

    if domain_ascii.is_empty() {
        reasons.push("domain empty after IDNA conversion".to_string());
        return domain_ascii;
    }

    // au moins un point
    if !domain_ascii.contains('.') {
        reasons.push("domain must contain at least one dot".to_string());
    }

    if domain_ascii.len() > 253 {
        reasons.push(format!("domain length {} > 253", domain_ascii.len()));
    }

    for label in domain_ascii.split('.') {
        if label.is_empty() {
            reasons.push("empty domain label".to_string());
            continue;
        }
        if label.len() > 63 {
            reasons.push(format!(
                "domain label '{}' length {} > 63",
                label,
                label.len()
            ));
        }
        if label.starts_with('-') || label.ends_with('-') {
            reasons.push(format!(
                "domain label '{}' cannot start/end with '-'",
                label
            ));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            reasons.push(format!("domain label '{}' has invalid chars", label));
        }
    }

    domain_ascii
}

/// `[192.0.2.1]` or `[IPv6:2001:db8::1]`.
pub(crate) fn parse_domain_literal(literal: &str) -> Option<IpAddr> {
    let inner = literal.strip_prefix('[')?.strip_suffix(']')?;
    if let Some(v6) = inner
        .get(..5)
        .filter(|tag| tag.eq_ignore_ascii_case("IPv6:"))
        .and_then(|_| inner.get(5..))
    {
        return v6.parse::<Ipv6Addr>().ok().map(IpAddr::V6);
    }
    inner.parse::<Ipv4Addr>().ok().map(IpAddr::V4)
}
