//! Typo suggestions for the domain part (`gmial.com` -> `gmail.com`).

/// Ordered by popularity; on equal distance the earlier entry wins.
const POPULAR_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "aol.com",
    "icloud.com",
    "live.com",
    "msn.com",
    "googlemail.com",
    "ymail.com",
    "protonmail.com",
    "proton.me",
    "me.com",
    "mail.com",
    "gmx.com",
    "gmx.de",
    "web.de",
    "yandex.ru",
    "mail.ru",
    "qq.com",
    "163.com",
    "comcast.net",
    "verizon.net",
    "att.net",
    "orange.fr",
    "free.fr",
    "sfr.fr",
    "laposte.net",
    "yahoo.fr",
    "hotmail.fr",
    "hotmail.co.uk",
    "yahoo.co.uk",
];

const SHORT_DOMAIN_LEN: usize = 7;

/// Closest popular domain within the edit budget, if `domain` is not
/// already one of them.
pub fn suggest_domain(domain: &str) -> Option<String> {
    let domain = domain.trim().trim_end_matches('.').to_ascii_lowercase();
    if domain.is_empty() || POPULAR_DOMAINS.contains(&domain.as_str()) {
        return None;
    }
    let budget = max_edits(&domain);
    let mut best: Option<(usize, &str)> = None;
    for candidate in POPULAR_DOMAINS {
        let Some(distance) = bounded_levenshtein(&domain, candidate, budget) else {
            continue;
        };
        if best.is_none_or(|(d, _)| distance < d) {
            best = Some((distance, candidate));
        }
    }
    best.map(|(_, candidate)| candidate.to_string())
}

fn max_edits(domain: &str) -> usize {
    if domain.chars().count() <= SHORT_DOMAIN_LEN { 1 } else { 2 }
}

/// Levenshtein distance, or `None` as soon as it must exceed `max`.
fn bounded_levenshtein(a: &str, b: &str, max: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > max {
        return None;
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut row = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        row[0] = i + 1;
        let mut row_min = row[0];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            row[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(row[j] + 1);
            row_min = row_min.min(row[j + 1]);
        }
        if row_min > max {
            return None;
        }
        std::mem::swap(&mut prev, &mut row);
    }
    let distance = prev[b.len()];
    (distance <= max).then_some(distance)
}
