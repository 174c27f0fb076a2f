use serde::{Deserialize, Serialize};

pub const SNIPPET_CHARS: usize = 150;
pub const NO_ABSTRACT: &str = "No abstract available";
pub const UNKNOWN: &str = "Unknown";
const MAX_LISTED_AUTHORS: usize = 3;

/// Where a reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    PrimaryIndex,
    SecondaryIndex,
    Fallback,
}

/// A normalized citation record handed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub title: String,
    pub year: Option<u32>,
    pub snippet: String,
    pub authors: String,
    pub doi: Option<String>,
    pub venue: String,
    pub citation_count: u32,
    pub source_id: Option<String>,
    pub source: Origin,
}

impl Reference {
    /// Deduplication key: DOI when present, otherwise the normalized title.
    pub fn identity_key(&self) -> String {
        match self.doi.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(doi) => format!("doi:{}", doi.to_lowercase()),
            None => format!("title:{}", normalize_title(&self.title)),
        }
    }
}

/// A reference carrying a transient ranking score.
#[derive(Debug, Clone)]
pub struct ScoredReference {
    pub reference: Reference,
    pub score: f64,
}

/// Stable descending sort by score, then unwrap the references.
pub fn into_ranked(mut scored: Vec<ScoredReference>, limit: usize) -> Vec<Reference> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.into_iter().take(limit).map(|s| s.reference).collect()
}

/// Lowercase and drop every non-alphanumeric character.
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// First 150 characters of the abstract plus an ellipsis, or the sentinel.
pub fn make_snippet(abstract_text: Option<&str>) -> String {
    match abstract_text.map(str::trim).filter(|a| !a.is_empty()) {
        Some(text) => {
            let head: String = text.chars().take(SNIPPET_CHARS).collect();
            format!("{}...", head.trim_end())
        }
        None => NO_ABSTRACT.to_string(),
    }
}

/// "A, B, C et al." style author line.
pub fn join_authors(names: &[String]) -> String {
    let names: Vec<&str> = names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        return UNKNOWN.to_string();
    }
    let mut line = names
        .iter()
        .take(MAX_LISTED_AUTHORS)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    if names.len() > MAX_LISTED_AUTHORS {
        line.push_str(" et al.");
    }
    line
}

/// Treat missing or blank strings as "Unknown".
pub fn or_unknown(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

#[cfg(test)]
pub(crate) fn sample(title: &str, doi: Option<&str>, citations: u32, year: Option<u32>) -> Reference {
    Reference {
        title: title.to_string(),
        year,
        snippet: NO_ABSTRACT.to_string(),
        authors: UNKNOWN.to_string(),
        doi: doi.map(|d| d.to_string()),
        venue: UNKNOWN.to_string(),
        citation_count: citations,
        source_id: None,
        source: Origin::PrimaryIndex,
    }
}
