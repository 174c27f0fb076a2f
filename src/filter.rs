use chrono::Datelike;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::reference::Reference;

pub const DEFAULT_YEAR_FROM: u32 = 1900;
const MAX_YEAR: i64 = 9999;

/// Raw, caller-supplied filter fields.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct FilterParams {
    #[schemars(description = "Topic filter, comma separated (e.g. \"transformer, nlp\")")]
    pub topic: Option<String>,
    #[schemars(description = "Minimum citation count (default 0)")]
    pub min_citations: Option<i64>,
    #[schemars(description = "Earliest publication year (default 1900)")]
    pub year_from: Option<i64>,
    #[schemars(description = "Latest publication year (default current year)")]
    pub year_to: Option<i64>,
}

/// Canonical per-request filter. `year_from <= year_to` always holds; outside
/// this crate a `Filter` can only come from `normalize` or `Default`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub(crate) topic: Option<String>,
    pub(crate) min_citations: u32,
    pub(crate) year_from: u32,
    pub(crate) year_to: u32,
}

impl Filter {
    pub fn normalize(params: FilterParams) -> Result<Self, ResolveError> {
        Self::normalize_at(params, current_year())
    }

    /// Normalize against an explicit "current year".
    pub fn normalize_at(params: FilterParams, current_year: u32) -> Result<Self, ResolveError> {
        let topic = params
            .topic
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let min_citations = params
            .min_citations
            .unwrap_or(0)
            .clamp(0, u32::MAX as i64) as u32;
        let year_from = params
            .year_from
            .map(clamp_year)
            .unwrap_or(DEFAULT_YEAR_FROM);
        let year_to = params.year_to.map(clamp_year).unwrap_or(current_year);

        if year_from > year_to {
            return Err(ResolveError::InvalidFilter { year_from, year_to });
        }
        Ok(Self {
            topic,
            min_citations,
            year_from,
            year_to,
        })
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn min_citations(&self) -> u32 {
        self.min_citations
    }

    pub fn year_from(&self) -> u32 {
        self.year_from
    }

    pub fn year_to(&self) -> u32 {
        self.year_to
    }

    /// Citation floor and year range check. References without a year pass
    /// the range check.
    pub fn admits(&self, reference: &Reference) -> bool {
        if reference.citation_count < self.min_citations {
            return false;
        }
        match reference.year {
            Some(year) => (self.year_from..=self.year_to).contains(&year),
            None => true,
        }
    }

    /// `"<from>-<to>"`, the range syntax both remote indexes accept.
    pub fn year_range(&self) -> String {
        format!("{}-{}", self.year_from, self.year_to)
    }

    /// Lowercased, comma-separated topic keywords.
    pub fn topic_keywords(&self) -> Vec<String> {
        self.topic
            .as_deref()
            .map(split_topic)
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.to_lowercase())
            .collect()
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            topic: None,
            min_citations: 0,
            year_from: DEFAULT_YEAR_FROM,
            year_to: current_year(),
        }
    }
}

pub(crate) fn split_topic(topic: &str) -> Vec<String> {
    topic
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn clamp_year(year: i64) -> u32 {
    year.clamp(0, MAX_YEAR) as u32
}

fn current_year() -> u32 {
    chrono::Utc::now().year().max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::sample;

    #[test]
    fn test_defaults() {
        let f = Filter::normalize_at(FilterParams::default(), 2025).unwrap();
        assert_eq!(f.topic, None);
        assert_eq!(f.min_citations, 0);
        assert_eq!(f.year_from, 1900);
        assert_eq!(f.year_to, 2025);
        assert_eq!(f.year_range(), "1900-2025");
    }

    #[test]
    fn test_inverted_range_rejected() {
        let params = FilterParams {
            year_from: Some(2021),
            year_to: Some(2019),
            ..Default::default()
        };
        assert_eq!(
            Filter::normalize_at(params, 2025),
            Err(ResolveError::InvalidFilter { year_from: 2021, year_to: 2019 })
        );
    }

    #[test]
    fn test_normalized_filter_keeps_range_ordered() {
        let f = Filter::normalize_at(
            FilterParams {
                topic: Some(" nlp ".into()),
                min_citations: Some(3),
                year_from: Some(2010),
                year_to: Some(2010),
            },
            2025,
        )
        .unwrap();
        assert_eq!(f.topic(), Some("nlp"));
        assert_eq!(f.min_citations(), 3);
        assert!(f.year_from() <= f.year_to());

        let d = Filter::default();
        assert_eq!(d.year_from(), DEFAULT_YEAR_FROM);
        assert!(d.year_from() <= d.year_to());
    }

    #[test]
    fn test_clamps_and_trims() {
        let params = FilterParams {
            topic: Some("   ".into()),
            min_citations: Some(-5),
            year_from: Some(-10),
            year_to: Some(2020),
        };
        let f = Filter::normalize_at(params, 2025).unwrap();
        assert_eq!(f.topic, None);
        assert_eq!(f.min_citations, 0);
        assert_eq!(f.year_from, 0);
    }

    #[test]
    fn test_admits() {
        let f = Filter::normalize_at(
            FilterParams {
                min_citations: Some(10),
                year_from: Some(2015),
                year_to: Some(2020),
                ..Default::default()
            },
            2025,
        )
        .unwrap();
        assert!(f.admits(&sample("a", None, 10, Some(2015))));
        assert!(f.admits(&sample("b", None, 50, None)));
        assert!(!f.admits(&sample("c", None, 9, Some(2018))));
        assert!(!f.admits(&sample("d", None, 100, Some(2021))));
    }

    #[test]
    fn test_topic_keywords() {
        let f = Filter::normalize_at(
            FilterParams {
                topic: Some("Transformer, , NLP ".into()),
                ..Default::default()
            },
            2025,
        )
        .unwrap();
        assert_eq!(f.topic_keywords(), vec!["transformer", "nlp"]);
    }
}
