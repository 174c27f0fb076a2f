use std::time::Duration;

use super::{http_client, status_error, PaperSource, SourceError};
use crate::filter::Filter;
use crate::reference::{join_authors, make_snippet, or_unknown, Origin, Reference};
use async_trait::async_trait;
use serde::Deserialize;

pub const BASE_URL: &str = "https://api.semanticscholar.org/graph/v1";
const FIELDS: &str = "title,authors,year,abstract,venue,externalIds,citationCount,paperId";
const MAX_LIMIT: u32 = 100;

/// Primary bibliographic index.
pub struct SemanticScholarClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SemanticScholarClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    fn add_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("x-api-key", key),
            None => req,
        }
    }
}

#[derive(Deserialize)]
struct S2SearchResponse {
    data: Option<Vec<S2Paper>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2Paper {
    paper_id: Option<String>,
    title: Option<String>,
    authors: Option<Vec<S2Author>>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    year: Option<u32>,
    venue: Option<String>,
    external_ids: Option<S2ExternalIds>,
    citation_count: Option<u32>,
}

#[derive(Deserialize)]
struct S2Author {
    name: Option<String>,
}

#[derive(Deserialize)]
struct S2ExternalIds {
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

fn s2_to_reference(p: S2Paper) -> Reference {
    let authors: Vec<String> = p
        .authors
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| a.name)
        .collect();
    Reference {
        title: or_unknown(p.title),
        year: p.year,
        snippet: make_snippet(p.abstract_text.as_deref()),
        authors: join_authors(&authors),
        doi: p.external_ids.and_then(|e| e.doi).filter(|d| !d.trim().is_empty()),
        venue: or_unknown(p.venue),
        citation_count: p.citation_count.unwrap_or(0),
        source_id: p.paper_id,
        source: Origin::PrimaryIndex,
    }
}

#[async_trait]
impl PaperSource for SemanticScholarClient {
    fn name(&self) -> &str {
        "semantic_scholar"
    }

    async fn search(&self, query: &str, filter: &Filter, limit: u32) -> Result<Vec<Reference>, SourceError> {
        let url = format!("{}/paper/search", self.base_url);
        let limit = limit.clamp(1, MAX_LIMIT).to_string();
        let year = filter.year_range();
        let resp = self
            .add_auth(self.client.get(&url).query(&[
                ("query", query),
                ("limit", limit.as_str()),
                ("year", year.as_str()),
                ("fields", FIELDS),
            ]))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        let body = resp.text().await?;
        let parsed: S2SearchResponse = serde_json::from_str(&body)?;
        Ok(parsed
            .data
            .unwrap_or_default()
            .into_iter()
            .map(s2_to_reference)
            .collect())
    }
}
