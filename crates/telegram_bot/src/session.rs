//! Per-chat conversation state.
//!
//! A chat is inside at most one flow at a time. The state of that flow lives in
//! a [`SessionStore`]; [`InMemorySessionStore`] is the default backing and
//! [`ChatLocks`] serializes the events of a single chat.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use engine::{DateRange, Money, Period, TransactionKind};
use serde::{Deserialize, Serialize};
use tokio::{
    sync::{Mutex, OwnedMutexGuard},
    time::Instant,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowState {
    Budget(BudgetState),
    Transaction(TransactionState),
    Summary(SummaryState),
    Search(SearchState),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetState {
    ChooseAction,
    GetAmount { period: Period },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionState {
    GetDescription {
        kind: TransactionKind,
    },
    GetAmount {
        kind: TransactionKind,
        description: String,
    },
    GetCategory {
        kind: TransactionKind,
        description: String,
        amount: Money,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryState {
    ChoosePeriod,
    ChooseOption { range: DateRange },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchState {
    GetQuery,
    Paginate(SearchCursor),
}

/// Position of the search window shown to the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCursor {
    pub query: String,
    pub offset: usize,
    pub page_size: usize,
}

/// Backing storage for conversation sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, chat_id: i64) -> Option<FlowState>;
    async fn save(&self, chat_id: i64, state: FlowState);
    async fn clear(&self, chat_id: i64);
}

#[derive(Clone, Debug)]
struct Entry {
    state: FlowState,
    touched: Instant,
}

/// Sessions kept in process memory. Lost on restart.
///
/// With a TTL, a session not loaded or saved for longer than the TTL is
/// dropped the next time it is loaded.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    inner: Arc<Mutex<HashMap<i64, Entry>>>,
    ttl: Option<Duration>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            inner: Arc::default(),
            ttl: ttl.filter(|ttl| !ttl.is_zero()),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, chat_id: i64) -> Option<FlowState> {
        let mut guard = self.inner.lock().await;
        let entry = guard.get_mut(&chat_id)?;
        if let Some(ttl) = self.ttl
            && entry.touched.elapsed() >= ttl
        {
            tracing::debug!(chat_id, "session expired");
            guard.remove(&chat_id);
            return None;
        }
        // Any event for the chat counts as activity.
        entry.touched = Instant::now();
        Some(entry.state.clone())
    }

    async fn save(&self, chat_id: i64, state: FlowState) {
        let entry = Entry {
            state,
            touched: Instant::now(),
        };
        self.inner.lock().await.insert(chat_id, entry);
    }

    async fn clear(&self, chat_id: i64) {
        self.inner.lock().await.remove(&chat_id);
    }
}

/// One async mutex per chat.
#[derive(Clone, Default)]
pub struct ChatLocks {
    inner: Arc<Mutex<HashMap<i64, Arc<Mutex<()>>>>>,
}

impl ChatLocks {
    /// Waits until no other event of `chat_id` is being handled.
    pub async fn lock(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let chat_lock = {
            let mut guard = self.inner.lock().await;
            // Drop locks nobody holds or waits for.
            guard.retain(|id, lock| *id == chat_id || Arc::strong_count(lock) > 1);
            guard.entry(chat_id).or_default().clone()
        };
        chat_lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget_state() -> FlowState {
        FlowState::Budget(BudgetState::ChooseAction)
    }

    #[tokio::test]
    async fn save_load_clear() {
        let store = InMemorySessionStore::new(None);
        assert_eq!(store.load(1).await, None);

        store.save(1, budget_state()).await;
        assert_eq!(store.load(1).await, Some(budget_state()));
        assert_eq!(store.load(2).await, None);

        store.clear(1).await;
        assert_eq!(store.load(1).await, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn sessions_expire_after_ttl() {
        let store = InMemorySessionStore::new(Some(Duration::from_secs(60)));
        store.save(1, budget_state()).await;

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(store.load(1).await.is_some());

        // Saving again refreshes the deadline.
        store.save(1, budget_state()).await;
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(store.load(1).await, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn loading_counts_as_activity() {
        let store = InMemorySessionStore::new(Some(Duration::from_secs(60)));
        store.save(1, budget_state()).await;

        for _ in 0..3 {
            tokio::time::advance(Duration::from_secs(45)).await;
            assert!(store.load(1).await.is_some());
        }
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(store.load(1).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_ttl_disables_expiry() {
        let store = InMemorySessionStore::new(Some(Duration::ZERO));
        store.save(1, budget_state()).await;
        tokio::time::advance(Duration::from_secs(86_400)).await;
        assert!(store.load(1).await.is_some());
    }

    #[tokio::test]
    async fn chat_locks_serialize_one_chat_only() {
        let locks = ChatLocks::default();
        let first = locks.lock(1).await;

        // Another chat is not blocked.
        let other = locks.lock(2).await;
        drop(other);

        let locks_clone = locks.clone();
        let waiter = tokio::spawn(async move {
            let _guard = locks_clone.lock(1).await;
        });
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(first);
        waiter.await.unwrap();
    }
}
