//! Catalog Data Types
//!
//! The book record as delivered by the upstream API, and the readiness state of the
//! record set held by the service.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single catalog entry.
///
/// Field names follow the upstream GraphQL schema (`readingLevel`, `coverPhotoURL`).
/// Records are immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub reading_level: String,
    #[serde(rename = "coverPhotoURL", default)]
    pub cover_photo_url: String,
}

impl Book {
    pub fn new(id: &str, title: &str, author: &str, reading_level: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            reading_level: reading_level.to_string(),
            cover_photo_url: String::new(),
        }
    }
}

/// Readiness of the record set.
#[derive(Debug, Clone)]
pub enum FetchState {
    /// The fetch has not resolved yet.
    Pending,
    /// The full record set, shared by reference with every reader.
    Ready(Arc<[Book]>),
    /// The fetch failed; carries the upstream error message.
    Failed(String),
}

impl FetchState {
    pub fn books(&self) -> Option<&Arc<[Book]>> {
        match self {
            FetchState::Ready(books) => Some(books),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, FetchState::Pending)
    }

    /// The text shown in place of results when the fetch failed.
    pub fn error_message(&self) -> Option<String> {
        match self {
            FetchState::Failed(message) => Some(format!(
                "Internal Server Error: {} books data ensure backend server is up",
                message
            )),
            _ => None,
        }
    }
}
