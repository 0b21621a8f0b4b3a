//! Title Filter Engine
//!
//! Pure, synchronous filtering of the record set by a user query, plus the per-client
//! session that tracks the current query and result across input events.

use crate::catalog::types::Book;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// Key that marks a keydown as the finalize (submit) signal.
pub const SUBMIT_KEY: &str = "Enter";

/// An event from the text-entry surface, carrying the current text value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum QueryEvent {
    Change { value: String },
    KeyDown { value: String, key: String },
    Focus { value: String },
}

impl QueryEvent {
    pub fn value(&self) -> &str {
        match self {
            QueryEvent::Change { value }
            | QueryEvent::KeyDown { value, .. }
            | QueryEvent::Focus { value } => value,
        }
    }

    pub fn is_finalize(&self) -> bool {
        matches!(self, QueryEvent::KeyDown { key, .. } if key == SUBMIT_KEY)
    }
}

/// What an empty query shows when the user submits it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// Submitting an empty query clears the results.
    #[default]
    ClearOnSubmit,
    /// Submitting behaves like any other keystroke; an empty query shows everything.
    ShowAll,
}

impl FromStr for ResetPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clear_on_submit" => Ok(ResetPolicy::ClearOnSubmit),
            "show_all" => Ok(ResetPolicy::ShowAll),
            other => Err(anyhow::anyhow!("unknown reset policy: {}", other)),
        }
    }
}

/// Books whose title contains `query`, ignoring case, in their original order.
pub fn filter_by_title(books: &[Book], query: &str) -> Vec<Book> {
    let needle = query.to_lowercase();
    books
        .iter()
        .filter(|book| book.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Same as `filter_by_title`, treating a missing record set as empty.
pub fn filter_optional(books: Option<&[Book]>, query: &str) -> Vec<Book> {
    books.map_or_else(Vec::new, |books| filter_by_title(books, query))
}

/// Filters for one input event, applying the reset policy on an empty submit.
pub fn filter_for_event(books: &[Book], event: &QueryEvent, policy: ResetPolicy) -> Vec<Book> {
    if policy == ResetPolicy::ClearOnSubmit && event.is_finalize() && event.value().is_empty() {
        return Vec::new();
    }
    filter_by_title(books, event.value())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// No event received yet.
    Idle,
    /// The last event's result.
    Filtered { query: String, results: Vec<Book> },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Filtered { .. } => "filtered",
        }
    }
}

/// One client's search box.
///
/// Every event recomputes from the full set; there is no incremental narrowing and no
/// terminal state.
#[derive(Debug, Clone)]
pub struct SearchSession {
    books: Arc<[Book]>,
    policy: ResetPolicy,
    state: SessionState,
}

impl SearchSession {
    pub fn new(books: Arc<[Book]>, policy: ResetPolicy) -> Self {
        Self {
            books,
            policy,
            state: SessionState::Idle,
        }
    }

    /// Filters for `event` and moves to `Filtered`.
    ///
    /// Filtering runs to completion inside this call, so there is no observable
    /// in-between state.
    pub fn apply(&mut self, event: &QueryEvent) -> &[Book] {
        let query = event.value().to_string();
        let results = filter_for_event(&self.books, event, self.policy);
        tracing::debug!("Query {:?} matched {} books", query, results.len());

        self.state = SessionState::Filtered { query, results };
        self.results()
    }

    /// Swaps in a new record set (after a catalog reload). Results are cleared.
    pub fn rebind(&mut self, books: Arc<[Book]>) {
        self.books = books;
        self.state = SessionState::Idle;
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn query(&self) -> &str {
        match &self.state {
            SessionState::Idle => "",
            SessionState::Filtered { query, .. } => query,
        }
    }

    pub fn results(&self) -> &[Book] {
        match &self.state {
            SessionState::Filtered { results, .. } => results,
            _ => &[],
        }
    }

    pub fn books(&self) -> &Arc<[Book]> {
        &self.books
    }
}
