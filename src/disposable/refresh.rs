use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use url::Url;

use super::DisposableDomains;
use super::error::RefreshError;
use super::types::normalize;

/// Community-maintained list used when no other source is configured.
pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/disposable/disposable-email-domains/master/domains.json";

const MIN_REFRESH_PERIOD: Duration = Duration::from_secs(1);

/// Somewhere a fresh disposable-domain list can be downloaded from.
#[async_trait]
pub trait ListSource: Send + Sync {
    /// Label used in logs and errors.
    fn name(&self) -> &str;

    /// Raw body of the list.
    async fn fetch(&self) -> Result<String, RefreshError>;
}

/// Plain HTTP(S) download through `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpListSource {
    url: Url,
    name: String,
    client: reqwest::Client,
}

impl HttpListSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, RefreshError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(concat!("mailverify_lib/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| RefreshError::Client { source })?;
        Ok(Self {
            name: url.to_string(),
            url,
            client,
        })
    }
}

#[async_trait]
impl ListSource for HttpListSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<String, RefreshError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|err| RefreshError::fetch(&self.name, err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(RefreshError::Status {
                source_name: self.name.clone(),
                status: status.as_u16(),
            });
        }
        response
            .text()
            .await
            .map_err(|err| RefreshError::fetch(&self.name, err))
    }
}

/// Accepts either a JSON array of strings or one domain per line (`#`
/// starts a comment). Entries that are not plausible domains are skipped;
/// a list with nothing usable left is an error.
pub fn parse_domain_list(source_name: &str, body: &str) -> Result<HashSet<String>, RefreshError> {
    let trimmed = body.trim_start_matches('\u{feff}').trim();
    let raw: Vec<String> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)
            .map_err(|err| RefreshError::malformed(source_name, err.to_string()))?
    } else {
        trimmed
            .lines()
            .map(|line| line.split('#').next().unwrap_or_default().trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    };
    let domains: HashSet<String> = raw.iter().filter_map(|d| normalize(d)).collect();
    if domains.is_empty() {
        return Err(RefreshError::Empty {
            source_name: source_name.to_string(),
        });
    }
    Ok(domains)
}

/// Owns the background refresh task; dropping it stops the task.
#[derive(Debug)]
pub struct RefreshHandle {
    task: JoinHandle<()>,
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Refreshes `domains` from `source` right away, then every `period`.
/// Failures are logged and the previous set stays in place. Must be called
/// from within a Tokio runtime.
pub fn spawn_refresher(
    domains: DisposableDomains,
    source: Arc<dyn ListSource>,
    period: Duration,
) -> RefreshHandle {
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period.max(MIN_REFRESH_PERIOD));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match domains.refresh_from(source.as_ref()).await {
                Ok(count) => info!(source = source.name(), count, "disposable domain list refreshed"),
                Err(err) => warn!(error = %err, "disposable domain refresh failed, keeping previous list"),
            }
        }
    });
    RefreshHandle { task }
}
