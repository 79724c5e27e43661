//! Disposable (throw-away) email domains.
//!
//! [`DisposableDomains`] starts from a built-in list and can be refreshed
//! from a remote [`ListSource`]. Every refresh builds a complete new
//! [`DisposableSnapshot`] and swaps it in one step.

mod data;
mod error;
mod refresh;
mod types;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::{Mutex, RwLock};

pub use error::RefreshError;
pub use refresh::{
    DEFAULT_SOURCE_URL, HttpListSource, ListSource, RefreshHandle, parse_domain_list,
    spawn_refresher,
};
pub use types::{DisposableSnapshot, SnapshotOrigin};

#[derive(Debug)]
struct Shared {
    current: RwLock<Arc<DisposableSnapshot>>,
    // writers serialize on this; it also holds the caller-added domains
    custom: Mutex<HashSet<String>>,
}

/// Shared, cheaply clonable handle on the current disposable set.
#[derive(Debug, Clone)]
pub struct DisposableDomains {
    shared: Arc<Shared>,
}

impl Default for DisposableDomains {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DisposableDomains {
    pub fn builtin() -> Self {
        Self::from_domains(data::BUILTIN_DOMAINS.iter().copied())
    }

    /// A set seeded with `domains` only, ignoring the built-in list.
    pub fn from_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = domains
            .into_iter()
            .filter_map(|d| types::normalize(d.as_ref()))
            .collect();
        Self {
            shared: Arc::new(Shared {
                current: RwLock::new(Arc::new(DisposableSnapshot::new(set, SnapshotOrigin::Builtin))),
                custom: Mutex::new(HashSet::new()),
            }),
        }
    }

    pub fn snapshot(&self) -> Arc<DisposableSnapshot> {
        Arc::clone(&self.shared.current.read())
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.snapshot().contains(domain)
    }

    /// True once a remote list has been loaded at least once.
    pub fn has_remote_list(&self) -> bool {
        matches!(self.snapshot().origin(), SnapshotOrigin::Remote { .. })
    }

    /// Adds domains to the current set. They are kept across refreshes.
    /// Returns how many were new.
    pub fn extend<I, S>(&self, domains: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut custom = self.shared.custom.lock();
        let added: Vec<String> = domains
            .into_iter()
            .filter_map(|d| types::normalize(d.as_ref()))
            .collect();
        custom.extend(added.iter().cloned());

        let current = self.snapshot();
        let mut next = current.domains().clone();
        let before = next.len();
        next.extend(added);
        let inserted = next.len() - before;
        if inserted > 0 {
            self.swap(DisposableSnapshot::new(next, current.origin().clone()));
        }
        inserted
    }

    /// Fetches a new list from `source` and installs it merged with the
    /// built-in and custom domains. On error the current set is untouched.
    pub async fn refresh_from(&self, source: &dyn ListSource) -> Result<usize, RefreshError> {
        let body = source.fetch().await?;
        let remote = parse_domain_list(source.name(), &body)?;

        let custom = self.shared.custom.lock();
        let mut next: HashSet<String> = data::BUILTIN_DOMAINS
            .iter()
            .map(|d| d.to_string())
            .collect();
        next.extend(remote);
        next.extend(custom.iter().cloned());
        let count = next.len();
        self.swap(DisposableSnapshot::new(
            next,
            SnapshotOrigin::Remote {
                source: source.name().to_string(),
                fetched_at: SystemTime::now(),
            },
        ));
        drop(custom);
        Ok(count)
    }

    fn swap(&self, snapshot: DisposableSnapshot) {
        *self.shared.current.write() = Arc::new(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct StubSource {
        bodies: Mutex<Vec<Result<String, ()>>>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(bodies: Vec<Result<&str, ()>>) -> Arc<Self> {
            Arc::new(Self {
                bodies: Mutex::new(bodies.into_iter().rev().map(|b| b.map(str::to_string)).collect()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ListSource for StubSource {
        fn name(&self) -> &str {
            "stub"
        }

        async fn fetch(&self) -> Result<String, RefreshError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.bodies.lock().pop() {
                Some(Ok(body)) => Ok(body),
                _ => Err(RefreshError::Status {
                    source_name: "stub".into(),
                    status: 503,
                }),
            }
        }
    }

    #[test]
    fn builtin_list_knows_common_providers() {
        let set = DisposableDomains::builtin();
        assert!(set.contains("mailinator.com"));
        assert!(set.contains("YOPMAIL.COM"));
        assert!(set.contains("10minutemail.com"));
        assert!(!set.contains("gmail.com"));
        assert!(!set.has_remote_list());
    }

    #[test]
    fn parses_json_and_text_lists() {
        let json = parse_domain_list("t", r#"["Foo.com", "bar.org.", "not a domain"]"#).unwrap();
        assert_eq!(json.len(), 2);
        assert!(json.contains("foo.com") && json.contains("bar.org"));

        let text = parse_domain_list("t", "# header\nfoo.com\n\n  bar.org # trailing\n").unwrap();
        assert_eq!(text.len(), 2);
    }

    #[test]
    fn rejects_empty_and_malformed_lists() {
        assert!(matches!(parse_domain_list("t", "  \n# only comments\n"), Err(RefreshError::Empty { .. })));
        assert!(matches!(parse_domain_list("t", "[\"unterminated"), Err(RefreshError::Malformed { .. })));
        assert!(matches!(parse_domain_list("t", "[]"), Err(RefreshError::Empty { .. })));
    }

    #[tokio::test]
    async fn refresh_swaps_without_touching_old_snapshots() {
        let set = DisposableDomains::from_domains(["old.example"]);
        let before = set.snapshot();

        let source = StubSource::new(vec![Ok("[\"fresh.example\"]")]);
        let count = set.refresh_from(source.as_ref()).await.unwrap();

        assert!(count > 1);
        assert!(before.contains("old.example"));
        assert!(!before.contains("fresh.example"));
        assert!(set.contains("fresh.example"));
        assert!(set.contains("mailinator.com"));
        assert!(set.has_remote_list());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_set() {
        let set = DisposableDomains::builtin();
        let before = set.snapshot();
        let source = StubSource::new(vec![Ok("\n\n")]);
        assert!(set.refresh_from(source.as_ref()).await.is_err());
        assert!(Arc::ptr_eq(&before, &set.snapshot()));
        assert!(set.refresh_from(source.as_ref()).await.is_err());
        assert!(!set.has_remote_list());
    }

    #[tokio::test]
    async fn custom_domains_survive_refresh() {
        let set = DisposableDomains::builtin();
        assert_eq!(set.extend(["my-burner.test", "mailinator.com"]), 1);
        assert!(set.contains("my-burner.test"));

        let source = StubSource::new(vec![Ok("other.example\n")]);
        set.refresh_from(source.as_ref()).await.unwrap();
        assert!(set.contains("my-burner.test"));
        assert!(set.contains("other.example"));
    }

    const LIST_LEN: usize = 50;

    /// Serves list "a" and list "b" in turn.
    struct AlternatingSource {
        turn: AtomicUsize,
    }

    #[async_trait]
    impl ListSource for AlternatingSource {
        fn name(&self) -> &str {
            "alternating"
        }

        async fn fetch(&self) -> Result<String, RefreshError> {
            let tag = if self.turn.fetch_add(1, Ordering::SeqCst) % 2 == 0 { 'a' } else { 'b' };
            Ok((0..LIST_LEN).map(|i| format!("{tag}{i}.example\n")).collect())
        }
    }

    fn assert_complete(snapshot: &DisposableSnapshot) {
        assert!(snapshot.contains("mailinator.com"));
        let count = |tag: char| {
            (0..LIST_LEN)
                .filter(|i| snapshot.contains(&format!("{tag}{i}.example")))
                .count()
        };
        let (a, b) = (count('a'), count('b'));
        assert!(a == 0 || a == LIST_LEN, "partial list a: {a}");
        assert!(b == 0 || b == LIST_LEN, "partial list b: {b}");
        assert!(a == 0 || b == 0, "lists a and b mixed");

        // custom domains are added in order, so a snapshot holding custom-k
        // holds every earlier one too
        let customs = (0..200)
            .take_while(|k| snapshot.contains(&format!("custom-{k}.test")))
            .count();
        assert!((customs..200).all(|k| !snapshot.contains(&format!("custom-{k}.test"))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_refreshes_never_expose_partial_sets() {
        let set = DisposableDomains::builtin();
        let source = Arc::new(AlternatingSource {
            turn: AtomicUsize::new(0),
        });

        let refresher = {
            let set = set.clone();
            let source = source.clone();
            tokio::spawn(async move {
                for _ in 0..100 {
                    set.refresh_from(source.as_ref()).await.unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };
        let extender = {
            let set = set.clone();
            tokio::spawn(async move {
                for k in 0..200 {
                    set.extend([format!("custom-{k}.test")]);
                    tokio::task::yield_now().await;
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let set = set.clone();
                tokio::spawn(async move {
                    for _ in 0..300 {
                        assert_complete(&set.snapshot());
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        refresher.await.unwrap();
        extender.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }

        let last = set.snapshot();
        assert_complete(&last);
        assert!(last.contains("custom-199.test"));
        assert!(last.contains("custom-0.test"));
        assert!(set.has_remote_list());
    }

    #[tokio::test(start_paused = true)]
    async fn refresher_ticks_and_survives_failures() {
        let set = DisposableDomains::builtin();
        let source = StubSource::new(vec![Err(()), Ok("late.example")]);
        let handle = spawn_refresher(set.clone(), source.clone(), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(!set.contains("late.example"));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert!(set.contains("late.example"));

        drop(handle);
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
