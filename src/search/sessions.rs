use super::engine::{QueryEvent, ResetPolicy, SearchSession};
use crate::catalog::types::Book;

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const DEFAULT_SESSION_CAPACITY: usize = 10_000;
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

struct Entry {
    session: SearchSession,
    last_touched: Instant,
    /// Store-wide sequence number of the last touch; orders evictions.
    stamp: u64,
}

impl Entry {
    fn is_expired(&self, idle_timeout: Duration) -> bool {
        self.last_touched.elapsed() >= idle_timeout
    }
}

/// Live search sessions, one per client search box.
///
/// Bounded two ways: a session idle for longer than `idle_timeout` is dropped, and
/// opening a session at `capacity` evicts the least recently touched one.
pub struct SessionStore {
    sessions: DashMap<Uuid, Entry>,
    policy: ResetPolicy,
    capacity: usize,
    idle_timeout: Duration,
    clock: AtomicU64,
}

/// A copy of a session's state after an event.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: &'static str,
    pub query: String,
    pub results: Vec<Book>,
    pub unfiltered: Arc<[Book]>,
}

impl SessionStore {
    pub fn new(policy: ResetPolicy) -> Arc<Self> {
        Self::with_limits(policy, DEFAULT_SESSION_CAPACITY, DEFAULT_SESSION_IDLE_TIMEOUT)
    }

    pub fn with_limits(policy: ResetPolicy, capacity: usize, idle_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            sessions: DashMap::new(),
            policy,
            capacity: capacity.max(1),
            idle_timeout,
            clock: AtomicU64::new(0),
        })
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    pub fn open(&self, books: Arc<[Book]>) -> Uuid {
        if self.sessions.len() >= self.capacity {
            self.sweep_expired();
        }
        while self.sessions.len() >= self.capacity {
            if !self.evict_oldest() {
                break;
            }
        }

        let id = Uuid::new_v4();
        self.sessions.insert(
            id,
            Entry {
                session: SearchSession::new(books, self.policy),
                last_touched: Instant::now(),
                stamp: self.tick(),
            },
        );
        tracing::debug!("Opened search session {}", id);
        id
    }

    /// Applies an event to a session. Returns `None` for an unknown or expired session.
    ///
    /// If the catalog was reloaded since the last event the session is rebound to
    /// `books` first.
    pub fn apply(
        &self,
        id: &Uuid,
        books: Arc<[Book]>,
        event: &QueryEvent,
    ) -> Option<SessionSnapshot> {
        self.remove_if_expired(id);
        let mut entry = self.sessions.get_mut(id)?;
        entry.last_touched = Instant::now();
        entry.stamp = self.tick();

        if !Arc::ptr_eq(entry.session.books(), &books) {
            tracing::info!("Session {} rebound to reloaded catalog", id);
            entry.session.rebind(books);
        }

        entry.session.apply(event);
        Some(snapshot(&entry.session))
    }

    pub fn get(&self, id: &Uuid) -> Option<SessionSnapshot> {
        self.remove_if_expired(id);
        self.sessions.get(id).map(|entry| snapshot(&entry.session))
    }

    pub fn close(&self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Drops every session idle for longer than the timeout. Returns how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        let before = self.sessions.len();
        let idle_timeout = self.idle_timeout;
        self.sessions.retain(|_, entry| !entry.is_expired(idle_timeout));
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::info!("Expired {} idle search sessions", removed);
        }
        removed
    }

    /// Sweeps expired sessions every `period` for as long as the store is alive.
    pub fn start_sweeper(self: &Arc<Self>, period: Duration) {
        let store = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                match store.upgrade() {
                    Some(store) => {
                        store.sweep_expired();
                    }
                    None => break,
                }
            }
        });
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn remove_if_expired(&self, id: &Uuid) {
        let idle_timeout = self.idle_timeout;
        if self
            .sessions
            .remove_if(id, |_, entry| entry.is_expired(idle_timeout))
            .is_some()
        {
            tracing::debug!("Search session {} expired", id);
        }
    }

    fn evict_oldest(&self) -> bool {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|entry| entry.stamp)
            .map(|entry| *entry.key());

        match oldest {
            Some(id) => {
                tracing::debug!("Session store full, evicting {}", id);
                self.sessions.remove(&id).is_some()
            }
            None => false,
        }
    }
}

fn snapshot(session: &SearchSession) -> SessionSnapshot {
    SessionSnapshot {
        state: session.state().name(),
        query: session.query().to_string(),
        results: session.results().to_vec(),
        unfiltered: session.books().clone(),
    }
}
