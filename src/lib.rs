//! Book Search Library
//!
//! Search over a remote book catalog: title filtering, reading-level grouping for
//! autocomplete, and an HTTP service exposing both to a rendering front end.
//!
//! ## Modules
//! - **`catalog`**: The book record, the tri-state fetch result, and the sources that
//!   fetch the full record set (GraphQL API or static JSON).
//! - **`search`**: Group-key derivation, bucket ordering, the title filter with its
//!   empty-submit reset rule, per-client sessions, and the axum handlers.
//! - **`config`**: Environment-driven service settings.

pub mod catalog;
pub mod config;
pub mod search;
