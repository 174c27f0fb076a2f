use std::sync::Arc;

use crate::filter::Filter;
use crate::merge::MAX_REFERENCES;
use crate::reference::{into_ranked, Origin, Reference, ScoredReference};
use crate::tables::{FallbackEntry, KnowledgeTables};

const TOPIC_KEYWORD_POINTS: f64 = 10.0;
const TOPIC_KEY_POINTS: f64 = 15.0;
const MESSAGE_KEYWORD_POINTS: f64 = 5.0;
const MESSAGE_KEY_POINTS: f64 = 8.0;
const UNSCORED_LIMIT: usize = 3;

/// Offline resolver over the curated landmark-paper table.
#[derive(Clone)]
pub struct FallbackResolver {
    tables: Arc<KnowledgeTables>,
}

impl FallbackResolver {
    pub fn new(tables: Arc<KnowledgeTables>) -> Self {
        Self { tables }
    }

    /// Never fails. Empty only when the filter excludes every curated entry.
    pub fn resolve(&self, message: &str, filter: &Filter) -> Vec<Reference> {
        let message = message.to_lowercase();
        let topics = filter.topic_keywords();

        let eligible: Vec<(&FallbackEntry, Reference)> = self
            .tables
            .fallback_papers
            .iter()
            .map(|entry| (entry, to_reference(entry)))
            .filter(|(_, r)| filter.admits(r))
            .collect();

        let scored: Vec<ScoredReference> = eligible
            .iter()
            .map(|(entry, reference)| ScoredReference {
                score: score_entry(entry, &message, &topics),
                reference: reference.clone(),
            })
            .filter(|s| s.score > 0.0)
            .collect();

        let refs = if scored.is_empty() {
            let mut by_citations: Vec<Reference> = eligible.into_iter().map(|(_, r)| r).collect();
            by_citations.sort_by(|a, b| b.citation_count.cmp(&a.citation_count));
            by_citations.truncate(UNSCORED_LIMIT);
            by_citations
        } else {
            into_ranked(scored, MAX_REFERENCES)
        };
        tracing::info!("Fallback references returned: {}", refs.len());
        refs
    }
}

fn score_entry(entry: &FallbackEntry, message: &str, topics: &[String]) -> f64 {
    let key = entry.key.to_lowercase();
    let keywords: Vec<String> = entry.keywords.iter().map(|k| k.to_lowercase()).collect();
    let mut score = 0.0;

    for topic in topics {
        if keywords.iter().any(|k| k.contains(topic.as_str()) || topic.contains(k.as_str())) {
            score += TOPIC_KEYWORD_POINTS;
        }
    }
    if topics.iter().any(|t| t.contains(key.as_str()) || key.contains(t.as_str())) {
        score += TOPIC_KEY_POINTS;
    }
    for keyword in &keywords {
        if message.contains(keyword.as_str()) {
            score += MESSAGE_KEYWORD_POINTS;
        }
    }
    if message.contains(key.as_str()) {
        score += MESSAGE_KEY_POINTS;
    }
    score
}

fn to_reference(entry: &FallbackEntry) -> Reference {
    Reference {
        title: entry.title.clone(),
        year: Some(entry.year),
        snippet: entry.snippet.clone(),
        authors: entry.authors.clone(),
        doi: entry.doi.clone(),
        venue: entry.venue.clone(),
        citation_count: entry.citation_count,
        source_id: None,
        source: Origin::Fallback,
    }
}
