//! Book Sources
//!
//! Implementations of the "fetch all book records" collaborator.
//!
//! - **`GraphQlSource`**: queries the upstream GraphQL API over HTTP, retrying transport
//!   failures with exponential backoff.
//! - **`StaticSource`**: a fixed list, optionally loaded from a JSON file. Used for offline
//!   runs and tests.

use super::types::Book;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const BOOKS_QUERY: &str = "query { books { id title author readingLevel coverPhotoURL } }";

/// Anything that can produce the full book record set.
#[async_trait]
pub trait BookSource: Send + Sync {
    async fn fetch_books(&self) -> Result<Vec<Book>>;

    /// Short description used in logs.
    fn describe(&self) -> String;
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<BooksData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct BooksData {
    books: Option<Vec<Book>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

pub struct GraphQlSource {
    endpoint: String,
    http_client: reqwest::Client,
    timeout: Duration,
    attempts: usize,
}

impl GraphQlSource {
    pub fn new(endpoint: &str, timeout: Duration, attempts: usize) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
            timeout,
            attempts: attempts.max(1),
        }
    }

    async fn post_with_retry(&self) -> Result<reqwest::Response> {
        let payload = GraphQlRequest { query: BOOKS_QUERY };
        let mut delay_ms = 150u64;

        for attempt in 0..self.attempts {
            let response = self
                .http_client
                .post(&self.endpoint)
                .json(&payload)
                .timeout(self.timeout)
                .send()
                .await;

            match response {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if attempt + 1 == self.attempts {
                        return Err(anyhow::anyhow!(e));
                    }
                    tracing::warn!(
                        "Books fetch attempt {}/{} failed: {}",
                        attempt + 1,
                        self.attempts,
                        e
                    );
                    let jitter = rand::random::<u64>() % 50;
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                    delay_ms = (delay_ms * 2).min(1200);
                }
            }
        }

        Err(anyhow::anyhow!("Retry attempts exhausted"))
    }
}

#[async_trait]
impl BookSource for GraphQlSource {
    async fn fetch_books(&self) -> Result<Vec<Book>> {
        let resp = self.post_with_retry().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("upstream responded with {}", status));
        }

        let body: GraphQlResponse = resp
            .json()
            .await
            .context("invalid GraphQL response body")?;
        parse_books(body)
    }

    fn describe(&self) -> String {
        format!("graphql {}", self.endpoint)
    }
}

fn parse_books(body: GraphQlResponse) -> Result<Vec<Book>> {
    if !body.errors.is_empty() {
        let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
        return Err(anyhow::anyhow!(messages.join("; ")));
    }

    body.data
        .and_then(|data| data.books)
        .ok_or_else(|| anyhow::anyhow!("response carried no books field"))
}

/// A fixed, in-memory record set.
pub struct StaticSource {
    books: Vec<Book>,
}

impl StaticSource {
    pub fn new(books: Vec<Book>) -> Self {
        Self { books }
    }

    /// Loads a JSON array of books, in the same shape the GraphQL API returns them.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let books: Vec<Book> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Self::new(books))
    }
}

#[async_trait]
impl BookSource for StaticSource {
    async fn fetch_books(&self) -> Result<Vec<Book>> {
        Ok(self.books.clone())
    }

    fn describe(&self) -> String {
        format!("static list of {} books", self.books.len())
    }
}

#[cfg(test)]
pub(crate) fn parse_books_json(raw: &str) -> Result<Vec<Book>> {
    let body: GraphQlResponse = serde_json::from_str(raw)?;
    parse_books(body)
}
