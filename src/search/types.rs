use super::grouping::GroupedOption;
use crate::catalog::types::Book;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    /// `change` (default), `keydown` or `focus`.
    pub event: Option<String>,
    /// Key name for `keydown` events, e.g. `Enter`.
    pub key: Option<String>,
}

/// Filtered results together with the full set, as handed to the rendering surface.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub total_count: usize,
    pub count: usize,
    pub results: Vec<Book>,
    pub unfiltered: Arc<[Book]>,
}

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub count: usize,
    pub options: Arc<[GroupedOption]>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BooksResponse {
    pub count: usize,
    pub books: Arc<[Book]>,
}

/// Body returned while the catalog is loading or after its fetch failed.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OpenSessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub state: String,
    pub query: String,
    pub count: usize,
    pub total_count: usize,
    pub results: Vec<Book>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub books: usize,
}
