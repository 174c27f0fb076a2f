use std::time::Duration;

use super::{http_client, status_error, PaperSource, SourceError};
use crate::filter::Filter;
use crate::reference::{join_authors, make_snippet, or_unknown, Origin, Reference};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

pub const BASE_URL: &str = "https://api.elsevier.com/content/search/scopus";
const MAX_COUNT: u32 = 25;

/// Secondary citation index. Only built when an API key is configured.
pub struct ScopusClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ScopusClient {
    pub fn new(base_url: impl Into<String>, api_key: String, timeout: Duration) -> Result<Self, SourceError> {
        if api_key.trim().is_empty() {
            return Err(SourceError::MissingKey("SCOPUS_API_KEY".into()));
        }
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[derive(Deserialize)]
struct ScopusResponse {
    #[serde(rename = "search-results")]
    search_results: ScopusResults,
}

#[derive(Deserialize)]
struct ScopusResults {
    entry: Option<Vec<ScopusEntry>>,
}

#[derive(Deserialize)]
struct ScopusEntry {
    #[serde(rename = "dc:title")]
    title: Option<String>,
    #[serde(rename = "citedby-count")]
    cited_by: Option<Value>,
    #[serde(rename = "prism:coverDate")]
    cover_date: Option<String>,
    #[serde(rename = "prism:doi")]
    doi: Option<String>,
    #[serde(rename = "dc:creator")]
    creator: Option<String>,
    author: Option<Vec<ScopusAuthor>>,
    #[serde(rename = "dc:description")]
    description: Option<String>,
    #[serde(rename = "prism:publicationName")]
    publication: Option<String>,
    #[serde(rename = "dc:identifier")]
    identifier: Option<String>,
}

#[derive(Deserialize)]
struct ScopusAuthor {
    authname: Option<String>,
}

/// `citedby-count` arrives as a string in most payloads, a number in some.
fn count_from(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Number(n)) => n.as_u64().map(|n| n.min(u32::MAX as u64) as u32).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn year_from(cover_date: Option<&str>) -> Option<u32> {
    cover_date
        .and_then(|d| d.get(..4))
        .and_then(|y| y.parse().ok())
}

/// Entries without a title are Scopus's "empty result" marker.
fn entry_to_reference(e: ScopusEntry) -> Option<Reference> {
    let title = e.title.filter(|t| !t.trim().is_empty())?;
    let authors: Vec<String> = match e.author {
        Some(list) if !list.is_empty() => list.into_iter().filter_map(|a| a.authname).collect(),
        _ => e.creator.into_iter().collect(),
    };
    Some(Reference {
        title: title.trim().to_string(),
        year: year_from(e.cover_date.as_deref()),
        snippet: make_snippet(e.description.as_deref()),
        authors: join_authors(&authors),
        doi: e.doi.filter(|d| !d.trim().is_empty()),
        venue: or_unknown(e.publication),
        citation_count: count_from(e.cited_by.as_ref()),
        source_id: e.identifier,
        source: Origin::SecondaryIndex,
    })
}

fn scopus_query(query: &str) -> String {
    format!("TITLE-ABS-KEY(\"{}\")", query.replace('"', ""))
}

#[async_trait]
impl PaperSource for ScopusClient {
    fn name(&self) -> &str {
        "scopus"
    }

    async fn search(&self, query: &str, filter: &Filter, limit: u32) -> Result<Vec<Reference>, SourceError> {
        let q = scopus_query(query);
        let date = filter.year_range();
        let count = limit.clamp(1, MAX_COUNT).to_string();
        let resp = self
            .client
            .get(&self.base_url)
            .header("X-ELS-APIKey", &self.api_key)
            .header("Accept", "application/json")
            .query(&[
                ("query", q.as_str()),
                ("date", date.as_str()),
                ("count", count.as_str()),
                ("sort", "citedby-count"),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        let body = resp.text().await?;
        let parsed: ScopusResponse = serde_json::from_str(&body)?;
        Ok(parsed
            .search_results
            .entry
            .unwrap_or_default()
            .into_iter()
            .filter_map(entry_to_reference)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn entry(v: Value) -> ScopusEntry {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_missing_key_rejected() {
        assert!(matches!(
            ScopusClient::new(BASE_URL, "  ".into(), Duration::from_secs(1)),
            Err(SourceError::MissingKey(_))
        ));
    }

    #[test]
    fn test_count_forms() {
        assert_eq!(count_from(Some(&json!("1234"))), 1234);
        assert_eq!(count_from(Some(&json!(56))), 56);
        assert_eq!(count_from(Some(&json!("n/a"))), 0);
        assert_eq!(count_from(None), 0);
    }

    #[test]
    fn test_entry_with_author_list() {
        let r = entry_to_reference(entry(json!({
            "dc:identifier": "SCOPUS_ID:84986274465",
            "dc:title": "Deep residual learning for image recognition",
            "dc:creator": "He K.",
            "author": [
                {"authname": "He K."}, {"authname": "Zhang X."},
                {"authname": "Ren S."}, {"authname": "Sun J."}
            ],
            "prism:publicationName": "Proceedings of the IEEE CVPR",
            "prism:coverDate": "2016-12-09",
            "prism:doi": "10.1109/CVPR.2016.90",
            "citedby-count": "150000"
        })))
        .unwrap();
        assert_eq!(r.year, Some(2016));
        assert_eq!(r.authors, "He K., Zhang X., Ren S. et al.");
        assert_eq!(r.citation_count, 150000);
        assert_eq!(r.source, Origin::SecondaryIndex);
        assert_eq!(r.source_id.as_deref(), Some("SCOPUS_ID:84986274465"));
        assert_eq!(r.snippet, "No abstract available");
    }

    #[test]
    fn test_entry_creator_only() {
        let r = entry_to_reference(entry(json!({
            "dc:title": "Some paper",
            "dc:creator": "Doe J.",
            "citedby-count": 3
        })))
        .unwrap();
        assert_eq!(r.authors, "Doe J.");
        assert_eq!(r.year, None);
        assert_eq!(r.venue, "Unknown");
    }

    #[test]
    fn test_empty_result_marker_skipped() {
        assert!(entry_to_reference(entry(json!({"@_fa": "true", "error": "Result set was empty"}))).is_none());
    }

    #[test]
    fn test_query_strips_quotes() {
        assert_eq!(scopus_query("say \"hi\""), "TITLE-ABS-KEY(\"say hi\")");
    }

    #[tokio::test]
    async fn test_search_round() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_header("X-ELS-APIKey", "k")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "TITLE-ABS-KEY(\"transformer\")".into()),
                Matcher::UrlEncoded("date".into(), "2015-2020".into()),
                Matcher::UrlEncoded("count".into(), "6".into()),
                Matcher::UrlEncoded("sort".into(), "citedby-count".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"search-results": {"opensearch:totalResults": "2", "entry": [
                    {"dc:title": "Attention is all you need", "prism:coverDate": "2017-12-01", "citedby-count": "9000"},
                    {"@_fa": "true", "error": "Result set was empty"}
                ]}})
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let client = ScopusClient::new(server.url(), "k".into(), Duration::from_secs(5)).unwrap();
        let f = Filter { topic: None, min_citations: 0, year_from: 2015, year_to: 2020 };
        let refs = client.search("transformer", &f, 6).await.unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].year, Some(2017));
        mock.assert_async().await;
    }
}
