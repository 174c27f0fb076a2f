use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::apis::{self, PaperSource};
use crate::resolver::{ReferenceResolver, ResolverSettings, DEFAULT_REQUEST_BUDGET, DEFAULT_SOURCE_TIMEOUT};
use crate::tables::KnowledgeTables;

/// Resolver configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub semantic_scholar_api_key: Option<String>,
    pub semantic_scholar_url: String,
    pub scopus_api_key: Option<String>,
    pub scopus_url: String,
    pub tables_path: Option<PathBuf>,
    pub source_timeout: Duration,
    pub request_budget: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            semantic_scholar_api_key: None,
            semantic_scholar_url: apis::semantic_scholar::BASE_URL.to_string(),
            scopus_api_key: None,
            scopus_url: apis::scopus::BASE_URL.to_string(),
            tables_path: None,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            request_budget: DEFAULT_REQUEST_BUDGET,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            semantic_scholar_api_key: non_empty("SEMANTIC_SCHOLAR_API_KEY"),
            semantic_scholar_url: non_empty("SEMANTIC_SCHOLAR_BASE_URL").unwrap_or(defaults.semantic_scholar_url),
            scopus_api_key: non_empty("SCOPUS_API_KEY"),
            scopus_url: non_empty("SCOPUS_BASE_URL").unwrap_or(defaults.scopus_url),
            tables_path: non_empty("REFERENCE_TABLES_PATH").map(PathBuf::from),
            source_timeout: seconds(non_empty("REFERENCE_SOURCE_TIMEOUT_SECS"), "REFERENCE_SOURCE_TIMEOUT_SECS")
                .unwrap_or(defaults.source_timeout),
            request_budget: seconds(non_empty("REFERENCE_BUDGET_SECS"), "REFERENCE_BUDGET_SECS")
                .unwrap_or(defaults.request_budget),
        }
    }

    pub fn load_tables(&self) -> Result<KnowledgeTables> {
        match &self.tables_path {
            Some(path) => KnowledgeTables::from_path(path),
            None => Ok(KnowledgeTables::default()),
        }
    }

    /// Build the primary adapter and, when a key is set, the secondary one.
    pub fn build_sources(&self) -> Result<(Arc<dyn PaperSource>, Option<Arc<dyn PaperSource>>)> {
        let primary: Arc<dyn PaperSource> = Arc::new(
            apis::semantic_scholar::SemanticScholarClient::new(
                self.semantic_scholar_url.clone(),
                self.semantic_scholar_api_key.clone(),
                self.source_timeout,
            )
            .context("Failed to build Semantic Scholar client")?,
        );

        let secondary: Option<Arc<dyn PaperSource>> = match &self.scopus_api_key {
            Some(key) => Some(Arc::new(
                apis::scopus::ScopusClient::new(self.scopus_url.clone(), key.clone(), self.source_timeout)
                    .context("Failed to build Scopus client")?,
            )),
            None => {
                tracing::debug!("Scopus not configured, secondary source skipped");
                None
            }
        };
        Ok((primary, secondary))
    }

    pub fn build_resolver(&self) -> Result<ReferenceResolver> {
        let tables = Arc::new(self.load_tables()?);
        let (primary, secondary) = self.build_sources()?;
        Ok(ReferenceResolver::new(
            primary,
            secondary,
            tables,
            ResolverSettings {
                source_timeout: self.source_timeout,
                request_budget: self.request_budget,
            },
        ))
    }

    /// Return a list of source status descriptions.
    pub fn source_status(&self) -> Vec<SourceStatus> {
        vec![
            SourceStatus {
                name: "semantic_scholar".into(),
                role: "primary".into(),
                enabled: true,
                note: if self.semantic_scholar_api_key.is_some() {
                    "API key set".into()
                } else {
                    "No API key (rate limited)".into()
                },
            },
            SourceStatus {
                name: "scopus".into(),
                role: "secondary".into(),
                enabled: self.scopus_api_key.is_some(),
                note: if self.scopus_api_key.is_some() {
                    "API key set".into()
                } else {
                    "Disabled: SCOPUS_API_KEY not set".into()
                },
            },
            SourceStatus {
                name: "fallback".into(),
                role: "offline".into(),
                enabled: true,
                note: match &self.tables_path {
                    Some(path) => format!("Curated table from {}", path.display()),
                    None => "Built-in curated table".into(),
                },
            },
        ]
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SourceStatus {
    pub name: String,
    pub role: String,
    pub enabled: bool,
    pub note: String,
}

fn seconds(raw: Option<String>, key: &str) -> Option<Duration> {
    let raw = raw?;
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            tracing::warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}
