//! Search Module
//!
//! The client-side search over the book catalog.
//!
//! ## Responsibilities
//! - **Grouping**: Deriving each book's reading-level bucket and ordering buckets for the
//!   autocomplete list.
//! - **Filtering**: Case-insensitive title matching, including the empty-submit reset rule.
//! - **Sessions**: Tracking one search box's query and results across input events.
//! - **API**: Exposing all of the above over HTTP.
//!
//! ## Submodules
//! - **`grouping`**: `Bucket`, group-key derivation and collation.
//! - **`engine`**: Title filter, input events, reset policy and `SearchSession`.
//! - **`cache`**: Grouped options memoized per record set.
//! - **`sessions`**: Concurrent store of live sessions.
//! - **`handlers`**: Axum router and request handlers.
//! - **`types`**: Request/response bodies.

pub mod cache;
pub mod engine;
pub mod grouping;
pub mod handlers;
pub mod sessions;
pub mod types;
