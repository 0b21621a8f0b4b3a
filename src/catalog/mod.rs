//! Catalog Module
//!
//! Owns the full book record set the search engine works over.
//!
//! ## Workflow
//! 1. **Fetch**: A `BookSource` downloads every book record (GraphQL endpoint or a static list).
//! 2. **Mount**: The `Catalog` stores the outcome as a tri-state `FetchState`
//!    (pending, ready with data, failed with a message).
//! 3. **Serve**: Handlers take cheap `Arc` snapshots of the record set; the set is never
//!    mutated in place, a reload swaps in a new one.
//!
//! Retries, timeouts and backoff live here, in the fetch collaborator. The search engine
//! only ever sees the resulting `FetchState`.

pub mod source;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;
