//! Firecrawl-backed web search tool.
//!
//! The only tool in the pipeline. `agents.toml` grants it to the meme
//! crafter role alone; every other role runs tool-less. The API key is
//! resolved lazily at invocation, so a keyless run stays valid until an
//! agent actually searches.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{CrewError, Result};
use crate::tool::{Tool, ToolArguments, ToolHandler, ToolParameters, ToolResult};

/// Name under which the search tool is granted in `agents.toml`.
pub const WEB_SEARCH_TOOL: &str = "web_search";

/// Environment variable holding the Firecrawl API key.
pub const FIRECRAWL_API_KEY_ENV: &str = "FIRECRAWL_API_KEY";

const FIRECRAWL_API_URL: &str = "https://api.firecrawl.dev/v1";

const DEFAULT_LIMIT: i64 = 5;
const MAX_LIMIT: i64 = 10;

/// Handler that forwards search queries to the Firecrawl search endpoint.
///
/// The caller's `query` and `limit` arguments are forwarded verbatim
/// (limit clamped to 1..=10); the handler never substitutes its own query.
pub struct FirecrawlSearchHandler {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl FirecrawlSearchHandler {
    /// Creates a handler that resolves `FIRECRAWL_API_KEY` at invocation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: None,
            base_url: FIRECRAWL_API_URL.to_string(),
        }
    }

    /// Injects an explicit API key, bypassing environment lookup.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Overrides the Firecrawl endpoint (testing).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn resolve_api_key(&self) -> Result<String> {
        self.api_key.clone().or_else(|| env::var(FIRECRAWL_API_KEY_ENV).ok()).ok_or_else(|| {
            CrewError::ToolFailed {
                tool: WEB_SEARCH_TOOL.to_string(),
                message: format!("no API key: set {FIRECRAWL_API_KEY_ENV} or inject one"),
            }
        })
    }
}

impl Default for FirecrawlSearchHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolHandler for FirecrawlSearchHandler {
    async fn execute(&self, args: &ToolArguments) -> Result<ToolResult> {
        let query = args.string("query").ok_or_else(|| CrewError::InvalidToolArguments {
            tool: WEB_SEARCH_TOOL.to_string(),
            reason: "missing required 'query' argument".to_string(),
        })?;

        let limit = args.integer("limit").unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        // Key resolution happens here, not at tool construction.
        let api_key = self.resolve_api_key()?;

        info!(query = %query, limit, "Executing web search");

        let request = SearchRequest { query: &query, limit };
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CrewError::ToolFailed {
                tool: WEB_SEARCH_TOOL.to_string(),
                message: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CrewError::ToolFailed {
                tool: WEB_SEARCH_TOOL.to_string(),
                message: format!("Firecrawl returned {status}: {body}"),
            });
        }

        let search: SearchResponse =
            response.json().await.map_err(|e| CrewError::ToolFailed {
                tool: WEB_SEARCH_TOOL.to_string(),
                message: format!("unreadable response: {e}"),
            })?;

        let records = search.into_records();
        debug!(results = records.len(), "Search complete");

        if records.is_empty() {
            return Ok(
                ToolResult::new(format!("No results for '{query}'")).with_metadata("results", "0")
            );
        }

        let mut output = String::new();
        for (index, record) in records.iter().enumerate() {
            output.push_str(&format!(
                "{}. {}\n",
                index + 1,
                record.title.as_deref().unwrap_or("(untitled)")
            ));
            if let Some(url) = &record.url {
                output.push_str(&format!("   {url}\n"));
            }
            if let Some(description) = &record.description {
                output.push_str(&format!("   {description}\n"));
            }
        }

        Ok(ToolResult::new(output).with_metadata("results", records.len().to_string()))
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    limit: i64,
}

/// Firecrawl search response. Newer API versions nest results under
/// `data.web`; older ones return `data` as a flat array. Both are accepted,
/// and records missing a title, url, or description are kept as-is.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchData {
    Grouped { web: Vec<SearchRecord> },
    Flat(Vec<SearchRecord>),
}

#[derive(Debug, Deserialize)]
struct SearchRecord {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl SearchResponse {
    fn into_records(self) -> Vec<SearchRecord> {
        match self.data {
            Some(SearchData::Grouped { web }) => web,
            Some(SearchData::Flat(records)) => records,
            None => Vec::new(),
        }
    }
}

/// Creates the `web_search` tool backed by the given handler.
#[must_use]
pub fn web_search_tool(handler: FirecrawlSearchHandler) -> Tool {
    let parameters = ToolParameters::new()
        .required("query", "string", "The search query")
        .optional("limit", "number", "Number of results to return (default: 5, max: 10)");

    Tool::new(
        WEB_SEARCH_TOOL,
        "Search the web for current content, trends, and meme formats",
        parameters,
        Arc::new(handler),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: serde_json::Value) -> ToolArguments {
        ToolArguments::new(value)
    }

    #[test]
    fn test_web_search_tool_creation() {
        let tool = web_search_tool(FirecrawlSearchHandler::new());
        assert_eq!(tool.name, WEB_SEARCH_TOOL);
        assert!(tool.parameters.required.contains(&"query".to_string()));
        assert!(!tool.parameters.required.contains(&"limit".to_string()));
    }

    #[tokio::test]
    async fn test_search_forwards_query_and_limit() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/search")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"query": "rust memes", "limit": 3}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "success": true,
                "data": {
                    "web": [
                        {"title": "Borrow checker memes", "url": "https://example.com/1", "description": "The classics"},
                        {"title": "Fearless concurrency", "url": "https://example.com/2"}
                    ]
                }
            }"#,
            )
            .create_async()
            .await;

        let handler = FirecrawlSearchHandler::new()
            .with_api_key("test-key")
            .with_base_url(server.url());

        let result = handler
            .execute(&args(json!({"query": "rust memes", "limit": 3})))
            .await
            .unwrap();

        assert!(result.output.contains("1. Borrow checker memes"));
        assert!(result.output.contains("https://example.com/2"));
        assert_eq!(result.metadata.get("results"), Some(&"2".to_string()));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_default_and_clamped_limit() {
        let mut server = mockito::Server::new_async().await;

        // No limit argument falls back to 5.
        let default_mock = server
            .mock("POST", "/search")
            .match_body(mockito::Matcher::PartialJsonString(r#"{"limit": 5}"#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "data": []}"#)
            .create_async()
            .await;

        let handler = FirecrawlSearchHandler::new()
            .with_api_key("test-key")
            .with_base_url(server.url());

        handler.execute(&args(json!({"query": "anything"}))).await.unwrap();
        default_mock.assert_async().await;

        // Oversized limit is clamped to 10.
        let clamp_mock = server
            .mock("POST", "/search")
            .match_body(mockito::Matcher::PartialJsonString(r#"{"limit": 10}"#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "data": []}"#)
            .create_async()
            .await;

        handler.execute(&args(json!({"query": "anything", "limit": 99}))).await.unwrap();
        clamp_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_accepts_flat_data_array() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/search")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "success": true,
                "data": [
                    {"title": "Flat result", "url": "https://example.com/flat"}
                ]
            }"#,
            )
            .create_async()
            .await;

        let handler = FirecrawlSearchHandler::new()
            .with_api_key("test-key")
            .with_base_url(server.url());

        let result = handler.execute(&args(json!({"query": "flat"}))).await.unwrap();
        assert!(result.output.contains("Flat result"));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_no_results() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/search")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "data": {"web": []}}"#)
            .create_async()
            .await;

        let handler = FirecrawlSearchHandler::new()
            .with_api_key("test-key")
            .with_base_url(server.url());

        let result = handler.execute(&args(json!({"query": "obscure"}))).await.unwrap();
        assert!(result.output.contains("No results for 'obscure'"));
        assert_eq!(result.metadata.get("results"), Some(&"0".to_string()));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_missing_query_argument() {
        let handler = FirecrawlSearchHandler::new().with_api_key("test-key");

        let err = handler.execute(&args(json!({"limit": 3}))).await.unwrap_err();
        assert!(matches!(
            err,
            CrewError::InvalidToolArguments { ref tool, .. } if tool == WEB_SEARCH_TOOL
        ));
    }

    #[tokio::test]
    async fn test_search_api_error_status() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/search")
            .with_status(401)
            .with_body(r#"{"error": "Unauthorized"}"#)
            .create_async()
            .await;

        let handler = FirecrawlSearchHandler::new()
            .with_api_key("bad-key")
            .with_base_url(server.url());

        let err = handler.execute(&args(json!({"query": "anything"}))).await.unwrap_err();
        match err {
            CrewError::ToolFailed { tool, message } => {
                assert_eq!(tool, WEB_SEARCH_TOOL);
                assert!(message.contains("401"));
            }
            other => panic!("Expected ToolFailed, got {other:?}"),
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    #[allow(clippy::disallowed_methods, unsafe_code)]
    async fn test_missing_api_key_fails_only_at_invocation() {
        unsafe {
            std::env::remove_var(FIRECRAWL_API_KEY_ENV);
        }

        // Construction and tool wiring succeed without a key.
        let tool = web_search_tool(FirecrawlSearchHandler::new());
        assert_eq!(tool.name, WEB_SEARCH_TOOL);

        // Invocation is where the key is required.
        let err = tool.execute(&args(json!({"query": "anything"}))).await.unwrap_err();
        assert!(matches!(
            err,
            CrewError::ToolFailed { ref message, .. } if message.contains(FIRECRAWL_API_KEY_ENV)
        ));
    }
}
