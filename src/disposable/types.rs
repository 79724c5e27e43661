use std::collections::HashSet;
use std::time::SystemTime;

/// Where the domains of a snapshot came from.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOrigin {
    /// Built-in seed list only (plus custom additions).
    Builtin,
    Remote { source: String, fetched_at: SystemTime },
}

/// Immutable set of disposable domains. Readers hold an `Arc` to one of
/// these, so a refresh never changes a set someone is reading.
#[derive(Debug, Clone)]
pub struct DisposableSnapshot {
    domains: HashSet<String>,
    origin: SnapshotOrigin,
}

impl DisposableSnapshot {
    pub(crate) fn new(domains: HashSet<String>, origin: SnapshotOrigin) -> Self {
        Self { domains, origin }
    }

    /// Matches `domain` or any of its parent domains
    /// (`a.mailinator.com` matches `mailinator.com`).
    pub fn contains(&self, domain: &str) -> bool {
        let Some(domain) = normalize(domain) else {
            return false;
        };
        let mut candidate = domain.as_str();
        loop {
            if self.domains.contains(candidate) {
                return true;
            }
            match candidate.split_once('.') {
                Some((_, parent)) if parent.contains('.') => candidate = parent,
                _ => return false,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn origin(&self) -> &SnapshotOrigin {
        &self.origin
    }

    pub(crate) fn domains(&self) -> &HashSet<String> {
        &self.domains
    }
}

/// Lowercase, strip surrounding whitespace and a trailing dot; `None` for
/// anything that cannot be a domain name.
pub(crate) fn normalize(domain: &str) -> Option<String> {
    let domain = domain.trim().trim_end_matches('.').to_ascii_lowercase();
    let plausible = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.contains("..")
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    plausible.then_some(domain)
}
