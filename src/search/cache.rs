//! Memoized autocomplete options.
//!
//! Grouping and sorting run once per record set. The cache is keyed on the identity of
//! the shared `Arc<[Book]>`, so a catalog reload (which allocates a new set) invalidates
//! it and repeated requests against the same set are served from memory.

use super::grouping::{group_options, GroupedOption};
use crate::catalog::types::Book;

use std::sync::{Arc, Mutex};

struct Entry {
    books: Arc<[Book]>,
    options: Arc<[GroupedOption]>,
}

#[derive(Default)]
pub struct OptionsCache {
    entry: Mutex<Option<Entry>>,
}

impl OptionsCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn get_or_compute(&self, books: &Arc<[Book]>) -> Arc<[GroupedOption]> {
        let mut entry = self.entry.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(cached) = entry.as_ref() {
            if Arc::ptr_eq(&cached.books, books) {
                return cached.options.clone();
            }
        }

        tracing::debug!("Regrouping {} books", books.len());
        let options: Arc<[GroupedOption]> = Arc::from(group_options(books));
        *entry = Some(Entry {
            books: books.clone(),
            options: options.clone(),
        });
        options
    }
}
