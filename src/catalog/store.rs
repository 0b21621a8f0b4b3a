use super::source::BookSource;
use super::types::{Book, FetchState};

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Holds the book record set for the lifetime of the service.
///
/// The set is fetched once on `mount` and replaced wholesale on a successful `reload`.
/// Readers get an `Arc` snapshot, so a reload never disturbs a request that is already
/// filtering.
pub struct Catalog {
    source: Arc<dyn BookSource>,
    state: RwLock<FetchState>,
    /// Held across fetch and store so reloads apply in the order they started.
    reload_lock: Mutex<()>,
}

impl Catalog {
    /// Creates a catalog in the `Pending` state. Nothing is fetched until `mount`.
    pub fn new(source: Arc<dyn BookSource>) -> Arc<Self> {
        Arc::new(Self {
            source,
            state: RwLock::new(FetchState::Pending),
            reload_lock: Mutex::new(()),
        })
    }

    /// Creates a catalog and performs the initial fetch.
    ///
    /// A failed initial fetch leaves the catalog `Failed`; it is not fatal.
    pub async fn mount(source: Arc<dyn BookSource>) -> Arc<Self> {
        let catalog = Self::new(source);
        if let Err(err) = catalog.reload().await {
            tracing::warn!("Catalog mounted without books: {:#}", err);
        }
        catalog
    }

    /// Fetches the full record set again and swaps it in.
    ///
    /// On failure a previously loaded set stays in place and the error goes back to the
    /// caller. `Failed` is only stored while no set has loaded yet.
    pub async fn reload(&self) -> Result<Arc<[Book]>> {
        let _guard = self.reload_lock.lock().await;
        tracing::info!("Fetching books from {}", self.source.describe());

        match self.source.fetch_books().await {
            Ok(books) => {
                tracing::info!("Loaded {} books", books.len());
                let books: Arc<[Book]> = Arc::from(books);
                *self.state.write().await = FetchState::Ready(books.clone());
                Ok(books)
            }
            Err(err) => {
                let mut state = self.state.write().await;
                if state.books().is_some() {
                    tracing::error!("Reload failed, keeping previous books: {:#}", err);
                } else {
                    tracing::error!("Failed to fetch books: {:#}", err);
                    *state = FetchState::Failed(format!("{:#}", err));
                }
                Err(err)
            }
        }
    }

    pub async fn state(&self) -> FetchState {
        self.state.read().await.clone()
    }

    pub async fn books(&self) -> Option<Arc<[Book]>> {
        self.state.read().await.books().cloned()
    }
}
