pub mod scopus;
pub mod semantic_scholar;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

pub use crate::error::SourceError;
use crate::filter::Filter;
use crate::reference::Reference;

pub const USER_AGENT: &str = "reference-resolver/0.1";

/// One remote bibliographic index.
#[async_trait]
pub trait PaperSource: Send + Sync {
    fn name(&self) -> &str;

    /// Single lookup, year-restricted to the filter's range where the
    /// remote API supports it.
    async fn search(
        &self,
        query: &str,
        filter: &Filter,
        limit: u32,
    ) -> Result<Vec<Reference>, SourceError>;
}

/// Run one adapter lookup under a timeout and apply the per-candidate
/// filter. Every failure is logged and becomes an empty list.
pub async fn search_or_empty(
    source: &dyn PaperSource,
    query: &str,
    filter: &Filter,
    limit: u32,
    timeout: Duration,
) -> Vec<Reference> {
    let outcome = match tokio::time::timeout(timeout, source.search(query, filter, limit)).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout(timeout)),
    };
    match outcome {
        Ok(results) => {
            let total = results.len();
            let kept: Vec<Reference> = results.into_iter().filter(|r| filter.admits(r)).collect();
            tracing::debug!(
                source = source.name(),
                total,
                kept = kept.len(),
                "source search finished"
            );
            kept
        }
        Err(e) => {
            tracing::warn!("Source {} unavailable: {}", source.name(), e);
            Vec::new()
        }
    }
}

/// Spawn `search_or_empty` on its own task so a panicking adapter cannot
/// take the request down with it.
pub fn spawn_search(
    source: Arc<dyn PaperSource>,
    query: String,
    filter: Filter,
    limit: u32,
    timeout: Duration,
) -> tokio::task::JoinHandle<Vec<Reference>> {
    tokio::spawn(async move { search_or_empty(source.as_ref(), &query, &filter, limit, timeout).await })
}

/// Await a spawned search, treating a panicked task as zero results.
pub async fn join_search(name: &str, handle: tokio::task::JoinHandle<Vec<Reference>>) -> Vec<Reference> {
    match handle.await {
        Ok(results) => results,
        Err(e) => {
            tracing::warn!("Source {} task panicked: {}", name, e);
            Vec::new()
        }
    }
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, SourceError> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?)
}

/// Read the body of a non-success response into a `SourceError`.
pub(crate) async fn status_error(resp: reqwest::Response) -> SourceError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let body: String = body.chars().take(200).collect();
    SourceError::Status { status, body }
}


#[cfg(test)]
mod tests {
    use super::mock::MockSource;
    use super::*;
    use crate::reference::sample;

    fn filter(min_citations: u32, from: u32, to: u32) -> Filter {
        Filter {
            topic: None,
            min_citations,
            year_from: from,
            year_to: to,
        }
    }

    #[tokio::test]
    async fn test_post_filter_applied() {
        let source = MockSource::new(
            "m",
            vec![
                sample("kept", None, 20, Some(2018)),
                sample("too few citations", None, 2, Some(2018)),
                sample("too old", None, 200, Some(1990)),
                sample("no year", None, 20, None),
            ],
        );
        let got = search_or_empty(&source, "q", &filter(10, 2000, 2020), 10, Duration::from_secs(1)).await;
        let titles: Vec<_> = got.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["kept", "no year"]);
    }

    #[tokio::test]
    async fn test_failure_becomes_empty() {
        let source = MockSource::failing("m");
        let got = search_or_empty(&source, "q", &filter(0, 1900, 2025), 10, Duration::from_secs(1)).await;
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_becomes_empty() {
        let mut source = MockSource::new("slow", vec![sample("late", None, 1, None)]);
        source.delay = Some(Duration::from_secs(5));
        let got = search_or_empty(&source, "q", &filter(0, 1900, 2025), 10, Duration::from_millis(20)).await;
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_task_becomes_empty() {
        let mut source = MockSource::new("boom", vec![]);
        source.panic = true;
        let handle = spawn_search(
            Arc::new(source),
            "q".into(),
            filter(0, 1900, 2025),
            10,
            Duration::from_secs(1),
        );
        assert!(join_search("boom", handle).await.is_empty());
    }
}
