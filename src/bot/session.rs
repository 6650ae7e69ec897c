//! Process-local conversation state with idle expiry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

/// Where a user is in the search flow. No entry means idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    /// Waiting for a restaurant name
    Searching,
    /// Search results shown, waiting for a button press
    AwaitingSelection,
}

#[derive(Debug)]
struct SessionEntry {
    state: ConversationState,
    touched: Instant,
}

/// Conversation states keyed by user id. Entries untouched for longer than
/// the idle timeout read as idle and are dropped by [`SessionStore::sweep`].
#[derive(Debug)]
pub struct SessionStore {
    entries: Mutex<HashMap<i64, SessionEntry>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    // A poisoned map is still structurally valid.
    fn lock(&self) -> MutexGuard<'_, HashMap<i64, SessionEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, user_id: i64) -> Option<ConversationState> {
        let mut entries = self.lock();
        let entry = entries.get(&user_id)?;
        if entry.touched.elapsed() <= self.idle_timeout {
            return Some(entry.state);
        }
        entries.remove(&user_id);
        None
    }

    pub fn set(&self, user_id: i64, state: ConversationState) {
        self.lock().insert(
            user_id,
            SessionEntry {
                state,
                touched: Instant::now(),
            },
        );
    }

    pub fn clear(&self, user_id: i64) {
        self.lock().remove(&user_id);
    }

    /// Drops expired entries, returning how many were removed.
    pub fn sweep(&self) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.touched.elapsed() <= self.idle_timeout);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sweeps every `every` until the store is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let Some(store) = weak.upgrade() else {
                    break;
                };
                let removed = store.sweep();
                if removed > 0 {
                    debug!("Expired {} idle conversations", removed);
                }
            }
        })
    }
}
