//! Reference resolution pipeline.
//!
//! title match → keyword search across sources → merge → offline fallback.
//! Only an inverted year range is reported to the caller; every other
//! problem degrades to the fallback table.

use std::sync::Arc;
use std::time::Duration;

use crate::apis::{join_search, spawn_search, PaperSource};
use crate::error::ResolveError;
use crate::fallback::FallbackResolver;
use crate::filter::{Filter, FilterParams};
use crate::keywords;
use crate::merge::{merge, MAX_REFERENCES};
use crate::reference::Reference;
use crate::tables::KnowledgeTables;
use crate::title_match::try_title_match;

pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_BUDGET: Duration = Duration::from_secs(60);

/// Results requested from each source during keyword search.
const SEARCH_LIMIT: u32 = MAX_REFERENCES as u32;

#[derive(Debug, Clone, Copy)]
pub struct ResolverSettings {
    pub source_timeout: Duration,
    pub request_budget: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            request_budget: DEFAULT_REQUEST_BUDGET,
        }
    }
}

#[derive(Clone)]
pub struct ReferenceResolver {
    primary: Arc<dyn PaperSource>,
    secondary: Option<Arc<dyn PaperSource>>,
    tables: Arc<KnowledgeTables>,
    fallback: FallbackResolver,
    settings: ResolverSettings,
}

impl ReferenceResolver {
    pub fn new(
        primary: Arc<dyn PaperSource>,
        secondary: Option<Arc<dyn PaperSource>>,
        tables: Arc<KnowledgeTables>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            primary,
            secondary,
            fallback: FallbackResolver::new(Arc::clone(&tables)),
            tables,
            settings,
        }
    }

    pub fn tables(&self) -> &KnowledgeTables {
        &self.tables
    }

    /// Resolve references for a message. Fails only on an invalid filter,
    /// before any source is contacted.
    pub async fn resolve(&self, message: &str, params: FilterParams) -> Result<Vec<Reference>, ResolveError> {
        let filter = Filter::normalize(params)?;
        Ok(self.resolve_with_filter(message, &filter).await)
    }

    /// Run the pipeline with an already-normalized filter, bounded by the
    /// request budget.
    pub async fn resolve_with_filter(&self, message: &str, filter: &Filter) -> Vec<Reference> {
        tracing::info!("Message: {}", message);
        let refs = match tokio::time::timeout(self.settings.request_budget, self.run(message, filter)).await {
            Ok(refs) => refs,
            Err(_) => {
                tracing::warn!(
                    "Reference resolution exceeded {:?}, using fallback",
                    self.settings.request_budget
                );
                self.fallback.resolve(message, filter)
            }
        };
        tracing::info!("References count: {}", refs.len());
        refs
    }

    async fn run(&self, message: &str, filter: &Filter) -> Vec<Reference> {
        let title_hits = try_title_match(
            Arc::clone(&self.primary),
            message,
            filter,
            &self.tables,
            self.settings.source_timeout,
        )
        .await;
        if !title_hits.is_empty() {
            tracing::info!("Title match returned {} references", title_hits.len());
            return title_hits;
        }

        let keywords = keywords::extract(message, filter.topic(), &self.tables);
        if keywords.is_empty() {
            tracing::info!("No keywords extracted, using fallback");
            return self.fallback.resolve(message, filter);
        }
        let query = keywords.query();

        let primary = spawn_search(
            Arc::clone(&self.primary),
            query.clone(),
            filter.clone(),
            SEARCH_LIMIT,
            self.settings.source_timeout,
        );
        let secondary = self.secondary.as_ref().map(|source| {
            (
                source.name().to_string(),
                spawn_search(
                    Arc::clone(source),
                    query.clone(),
                    filter.clone(),
                    SEARCH_LIMIT,
                    self.settings.source_timeout,
                ),
            )
        });

        let primary_name = self.primary.name().to_string();
        let (primary_refs, secondary_refs) = futures::join!(
            join_search(&primary_name, primary),
            async {
                match secondary {
                    Some((name, handle)) => join_search(&name, handle).await,
                    None => Vec::new(),
                }
            }
        );
        tracing::debug!(
            query = %query,
            primary = primary_refs.len(),
            secondary = secondary_refs.len(),
            "keyword search finished"
        );

        let merged = merge(primary_refs, secondary_refs);
        if merged.is_empty() {
            tracing::info!("No references from sources, using fallback");
            return self.fallback.resolve(message, filter);
        }
        merged
    }
}
