//! Request-time aggregation of metrics sources.
//!
//! Each `/all-metrics` scrape is answered from three sources, each
//! handled differently:
//!
//! 1. the local metric store, serialized in full,
//! 2. the system metrics feed (host-resource exporter), passed through
//!    verbatim,
//! 3. the chain node's own metrics feed, line-filtered so that metric
//!    families already produced by the first two sources are not emitted
//!    twice.
//!
//! Both upstream fetches happen fresh per request; nothing is cached
//! between scrapes. Any fetch may fail independently, in which case that
//! section degrades to an explanatory comment without failing the whole
//! request.

use std::fmt;
use std::time::Duration;

use reqwest::Client;

use crate::config::FeedsConfig;

/// Content type of the merged response (Prometheus text exposition).
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Errors that can occur while fetching an upstream metrics feed.
#[derive(Debug)]
pub enum FeedError {
    /// Transport-level error (e.g. connection refused, timeout).
    Transport(String),
    /// The feed answered with a non-success HTTP status.
    Status(String),
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Transport(msg) => write!(f, "feed transport error: {msg}"),
            FeedError::Status(msg) => write!(f, "feed status error: {msg}"),
        }
    }
}

impl std::error::Error for FeedError {}

/// Client for the two upstream metrics feeds.
///
/// Each feed gets its own reqwest client so its timeout can differ; the
/// merged response latency is bounded by the sum of the two timeouts.
#[derive(Clone)]
pub struct FeedClient {
    system_url: String,
    node_url: String,
    system_client: Client,
    node_client: Client,
    dedup_prefixes: Vec<String>,
}

impl FeedClient {
    /// Builds a feed client from the feeds configuration.
    pub fn new(cfg: &FeedsConfig) -> Result<Self, FeedError> {
        Ok(Self {
            system_url: cfg.system_url.clone(),
            node_url: cfg.node_url.clone(),
            system_client: build_client(cfg.system_timeout)?,
            node_client: build_client(cfg.node_timeout)?,
            dedup_prefixes: cfg.dedup_prefixes.clone(),
        })
    }

    pub fn dedup_prefixes(&self) -> &[String] {
        &self.dedup_prefixes
    }

    /// Fetches the system metrics feed as raw text.
    pub async fn fetch_system(&self) -> Result<String, FeedError> {
        fetch_text(&self.system_client, &self.system_url).await
    }

    /// Fetches the chain-node metrics feed as raw text (unfiltered).
    pub async fn fetch_node(&self) -> Result<String, FeedError> {
        fetch_text(&self.node_client, &self.node_url).await
    }
}

fn build_client(timeout: Duration) -> Result<Client, FeedError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| FeedError::Transport(format!("failed to build HTTP client: {e}")))
}

async fn fetch_text(client: &Client, url: &str) -> Result<String, FeedError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| FeedError::Transport(format!("HTTP GET {url} failed: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(FeedError::Status(format!(
            "GET {url} returned HTTP status {status}"
        )));
    }

    resp.text()
        .await
        .map_err(|e| FeedError::Transport(format!("failed to read body from {url}: {e}")))
}

/// Extracts the metric family name from an exposition data line: the text
/// up to the first `{` or space.
fn family_name(line: &str) -> &str {
    line.split(['{', ' ']).next().unwrap_or(line)
}

/// Filters the chain-node feed for merging.
///
/// Comment lines (`# HELP`, `# TYPE`, plain comments) are always kept.
/// Data lines are kept only if their family name starts with none of the
/// exclusion prefixes, so families already produced by the local store or
/// the system feed are not emitted twice. Blank lines are dropped.
pub fn filter_node_metrics(body: &str, dedup_prefixes: &[String]) -> String {
    let mut out = String::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('#') {
            out.push_str(line);
            out.push('\n');
            continue;
        }
        let name = family_name(line);
        if dedup_prefixes.iter().any(|p| name.starts_with(p.as_str())) {
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Builds the merged `/all-metrics` response body.
///
/// The local section is always present; each upstream section is either
/// its fetched content (the node feed after filtering) or an
/// unavailability comment.
pub fn render_merged(
    local: &str,
    system: Result<String, FeedError>,
    node: Result<String, FeedError>,
    dedup_prefixes: &[String],
) -> String {
    let mut out = String::with_capacity(local.len() + 1024);
    out.push_str(local);

    out.push_str("\n# System metrics (node exporter)\n");
    match system {
        Ok(body) => out.push_str(&body),
        Err(e) => {
            tracing::warn!(error = %e, "failed to fetch system metrics feed");
            out.push_str("# System metrics UNAVAILABLE\n");
            out.push_str(&format!("# error: {e}\n"));
        }
    }

    out.push_str("\n# Chain node metrics\n");
    match node {
        Ok(body) => out.push_str(&filter_node_metrics(&body, dedup_prefixes)),
        Err(e) => {
            tracing::warn!(error = %e, "failed to fetch chain node metrics feed");
            out.push_str("# Chain node metrics UNAVAILABLE\n");
            out.push_str(&format!("# error: {e}\n"));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes() -> Vec<String> {
        vec![
            "beaconwatch_".to_string(),
            "go_".to_string(),
            "process_".to_string(),
        ]
    }

    #[test]
    fn family_name_stops_at_brace_or_space() {
        assert_eq!(family_name(r#"foo_bar{x="1"} 5"#), "foo_bar");
        assert_eq!(family_name("baz_qux 3"), "baz_qux");
        assert_eq!(family_name("lonely"), "lonely");
    }

    #[test]
    fn node_filter_drops_duplicate_families_keeps_comments() {
        let body = "\
# HELP beaconwatch_validator_block_height Latest known block height
# TYPE beaconwatch_validator_block_height gauge
beaconwatch_validator_block_height 9
go_goroutines 12
process_cpu_seconds_total 1.5
consensus_height 42

baz_qux 3
";
        let filtered = filter_node_metrics(body, &prefixes());

        assert!(filtered.contains("# HELP beaconwatch_validator_block_height"));
        assert!(!filtered.contains("beaconwatch_validator_block_height 9"));
        assert!(!filtered.contains("go_goroutines"));
        assert!(!filtered.contains("process_cpu_seconds_total"));
        assert!(filtered.contains("consensus_height 42\n"));
        assert!(filtered.contains("baz_qux 3\n"));
        assert!(!filtered.contains("\n\n"), "blank lines are dropped");
    }

    #[test]
    fn prefix_match_is_on_the_family_name_not_the_whole_line() {
        // A label value containing an excluded prefix must not drop the line.
        let body = r#"consensus_peer{peer="go_away"} 1"#;
        let filtered = filter_node_metrics(body, &prefixes());
        assert!(filtered.contains("consensus_peer"));
    }

    #[test]
    fn merged_output_prefers_local_values_over_node_duplicates() {
        let local = "beaconwatch_foo_bar{x=\"1\"} 5\n";
        let node = "beaconwatch_foo_bar{x=\"1\"} 9\nbaz_qux 3\n".to_string();

        let merged = render_merged(local, Ok(String::new()), Ok(node), &prefixes());

        assert!(merged.contains("beaconwatch_foo_bar{x=\"1\"} 5"));
        assert!(!merged.contains("beaconwatch_foo_bar{x=\"1\"} 9"));
        assert!(merged.contains("baz_qux 3"));
    }

    #[test]
    fn failed_node_fetch_degrades_to_a_marker() {
        let merged = render_merged(
            "beaconwatch_up 1\n",
            Ok("node_cpu_seconds_total 2\n".to_string()),
            Err(FeedError::Transport("connection refused".to_string())),
            &prefixes(),
        );

        assert!(merged.contains("beaconwatch_up 1"));
        assert!(merged.contains("node_cpu_seconds_total 2"));
        assert!(merged.contains("# Chain node metrics UNAVAILABLE"));
        assert!(merged.contains("connection refused"));
    }

    #[test]
    fn failed_system_fetch_keeps_the_other_sections() {
        let merged = render_merged(
            "beaconwatch_up 1\n",
            Err(FeedError::Status("GET http://sys returned HTTP status 503".to_string())),
            Ok("consensus_height 42\n".to_string()),
            &prefixes(),
        );

        assert!(merged.contains("beaconwatch_up 1"));
        assert!(merged.contains("# System metrics UNAVAILABLE"));
        assert!(merged.contains("consensus_height 42"));
    }

    #[test]
    fn system_feed_is_passed_through_verbatim() {
        let system = "anything_at_all{weird=\"yes\"} 1\ngo_goroutines 5\n".to_string();
        let merged = render_merged("", Ok(system), Ok(String::new()), &prefixes());

        // No filtering on the system section, even for excluded prefixes.
        assert!(merged.contains("go_goroutines 5"));
    }
}
