//! Blocking HTTP client for the Notion REST API.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::{json, Value};
use tracing::debug;

use super::query_builder::QueryBuilder;
use crate::config;
use crate::error::{AssistantError, Result};
use crate::http::checked;

/// Authenticated access to the Notion databases and pages the assistant uses.
pub struct NotionClient {
    base_url: String,
    secret: String,
    client: Client,
}

impl NotionClient {
    /// Client for the public Notion API.
    pub fn new(secret: &str, timeout: Duration) -> Result<Self> {
        Self::with_base_url(config::NOTION_API_BASE, secret, timeout)
    }

    /// Client for a Notion-compatible API served at `base_url`.
    pub fn with_base_url(base_url: &str, secret: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            secret: secret.to_string(),
            client,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.secret)
            .header("Notion-Version", config::NOTION_VERSION)
    }

    /// Run a database query, following `next_cursor` until every page is read.
    pub fn query_database(&self, database_id: &str, query: &QueryBuilder) -> Result<Vec<Value>> {
        let url = format!("{}/databases/{}/query", self.base_url, database_id);
        let mut query = query.clone();
        let mut results = Vec::new();

        loop {
            let response = self
                .authorized(self.client.post(&url))
                .json(&query.build())
                .send()?;
            let page: Value = checked(response)?.json()?;

            match page.get("results") {
                Some(Value::Array(rows)) => results.extend(rows.iter().cloned()),
                _ => {
                    return Err(AssistantError::UnexpectedResponse(format!(
                        "query of database {} returned no results array",
                        database_id
                    )))
                }
            }

            let has_more = page
                .get("has_more")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let next_cursor = page.get("next_cursor").and_then(Value::as_str);
            match (has_more, next_cursor) {
                (true, Some(cursor)) => {
                    debug!(database_id, cursor, "fetching next page");
                    query.start_cursor(cursor);
                }
                _ => break,
            }
        }

        debug!(database_id, rows = results.len(), "queried database");
        Ok(results)
    }

    /// Overwrite the given properties of a page.
    pub fn update_page(&self, page_id: &str, properties: Value) -> Result<()> {
        let url = format!("{}/pages/{}", self.base_url, page_id);
        let response = self
            .authorized(self.client.patch(&url))
            .json(&json!({ "properties": properties }))
            .send()?;
        checked(response)?;
        debug!(page_id, "updated page");
        Ok(())
    }
}
