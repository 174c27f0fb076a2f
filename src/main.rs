use std::sync::Arc;
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters,
    model::*, tool, tool_handler, tool_router,
    transport::stdio, ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use reference_resolver::{keywords, similarity, Config, FilterParams, ReferenceResolver, ResolveError};

// ── Parameter structs ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
struct ResolveReferencesParams {
    #[schemars(description = "User question or candidate paper title")]
    message: String,
    #[serde(flatten)]
    filter: FilterParams,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ExtractKeywordsParams {
    #[schemars(description = "User question or candidate paper title")]
    message: String,
    #[schemars(description = "Topic filter, comma separated")]
    topic: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct TitleSimilarityParams {
    #[schemars(description = "First title")]
    a: String,
    #[schemars(description = "Second title")]
    b: String,
}

// ── Server ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ReferenceServer {
    tool_router: ToolRouter<Self>,
    config: Arc<Config>,
    resolver: Arc<ReferenceResolver>,
}

#[tool_router]
impl ReferenceServer {
    pub fn create() -> anyhow::Result<Self> {
        let config = Config::from_env();
        let resolver = config.build_resolver()?;

        tracing::info!(
            "Initialized reference resolver, secondary source {}",
            if config.scopus_api_key.is_some() { "enabled" } else { "disabled" }
        );

        Ok(Self {
            tool_router: Self::tool_router(),
            config: Arc::new(config),
            resolver: Arc::new(resolver),
        })
    }

    #[tool(description = "List reference sources and their status")]
    async fn list_sources(&self) -> Result<CallToolResult, McpError> {
        let statuses = self.config.source_status();
        let json = serde_json::to_string_pretty(&statuses)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Resolve up to 6 ranked, deduplicated paper references for a question or paper title. Falls back to a curated table when live sources return nothing.")]
    async fn resolve_references(
        &self,
        Parameters(params): Parameters<ResolveReferencesParams>,
    ) -> Result<CallToolResult, McpError> {
        let refs = self
            .resolver
            .resolve(&params.message, params.filter)
            .await
            .map_err(|e| match e {
                ResolveError::InvalidFilter { .. } => McpError::invalid_params(e.to_string(), None),
            })?;

        let json = serde_json::to_string_pretty(&refs)
            .map_err(|e| McpError::internal_error(format!("{}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Show the search keywords derived from a message and optional topic filter")]
    async fn extract_keywords(
        &self,
        Parameters(params): Parameters<ExtractKeywordsParams>,
    ) -> Result<CallToolResult, McpError> {
        let keywords = keywords::extract(&params.message, params.topic.as_deref(), self.resolver.tables());
        let json = serde_json::to_string_pretty(keywords.as_slice())
            .map_err(|e| McpError::internal_error(format!("{}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Score how close two paper titles are (0-100)")]
    async fn title_similarity(
        &self,
        Parameters(params): Parameters<TitleSimilarityParams>,
    ) -> Result<CallToolResult, McpError> {
        let score = similarity::similarity(&params.a, &params.b, self.resolver.tables());
        Ok(CallToolResult::success(vec![Content::text(format!("{:.2}", score))]))
    }
}

#[tool_handler]
impl ServerHandler for ReferenceServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Resolve academic-paper references for a question or title. \
                 Queries Semantic Scholar and, when configured, Scopus; merges and \
                 ranks by citation count, with an offline curated fallback."
                    .into(),
            ),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting reference-resolver MCP server");

    let server = ReferenceServer::create()?;
    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
