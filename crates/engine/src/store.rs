//! The persistence port used by the conversation layer.
//!
//! [`Engine`] is the SQLite implementation; tests can plug in their own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Budget, DateRange, Engine, EngineError, Money, NewTransaction, Period, ResultEngine,
    Transaction, TransactionKind, UserSettings,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Filters for listing transactions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub kind: Option<TransactionKind>,
    /// Case-insensitive substring matched against description or category.
    pub text: Option<String>,
    pub order: SortOrder,
    pub offset: u64,
    pub limit: Option<u64>,
}

impl TransactionFilter {
    #[must_use]
    pub fn in_range(range: &DateRange) -> Self {
        Self {
            from: Some(range.from),
            to: Some(range.to),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn matching(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn page(mut self, offset: u64, limit: u64) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from >= to
        {
            return Err(EngineError::InvalidPeriod(
                "invalid range: from must be < to".to_string(),
            ));
        }
        if self.text.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(EngineError::InvalidText(
                "search text must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Creates or overwrites the budget of `period` (last write wins).
    async fn upsert_budget(&self, chat_id: i64, period: Period, amount: Money)
    -> ResultEngine<Budget>;

    async fn budget(&self, chat_id: i64, period: Period) -> ResultEngine<Option<Budget>>;

    async fn insert_transaction(&self, tx: NewTransaction) -> ResultEngine<Transaction>;

    async fn query_transactions(
        &self,
        chat_id: i64,
        filter: &TransactionFilter,
    ) -> ResultEngine<Vec<Transaction>>;

    /// Number of transactions matching `filter`, ignoring its offset/limit.
    async fn count_transactions(&self, chat_id: i64, filter: &TransactionFilter)
    -> ResultEngine<u64>;

    /// Settings of the chat, or the defaults when none were stored.
    async fn user_settings(&self, chat_id: i64) -> ResultEngine<UserSettings>;

    async fn register_chat(&self, chat_id: i64) -> ResultEngine<()>;

    async fn known_chats(&self) -> ResultEngine<Vec<i64>>;
}

#[async_trait]
impl LedgerStore for Engine {
    async fn upsert_budget(
        &self,
        chat_id: i64,
        period: Period,
        amount: Money,
    ) -> ResultEngine<Budget> {
        Engine::upsert_budget(self, chat_id, period, amount).await
    }

    async fn budget(&self, chat_id: i64, period: Period) -> ResultEngine<Option<Budget>> {
        Engine::budget(self, chat_id, period).await
    }

    async fn insert_transaction(&self, tx: NewTransaction) -> ResultEngine<Transaction> {
        Engine::insert_transaction(self, tx).await
    }

    async fn query_transactions(
        &self,
        chat_id: i64,
        filter: &TransactionFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        Engine::query_transactions(self, chat_id, filter).await
    }

    async fn count_transactions(
        &self,
        chat_id: i64,
        filter: &TransactionFilter,
    ) -> ResultEngine<u64> {
        Engine::count_transactions(self, chat_id, filter).await
    }

    async fn user_settings(&self, chat_id: i64) -> ResultEngine<UserSettings> {
        Engine::user_settings(self, chat_id).await
    }

    async fn register_chat(&self, chat_id: i64) -> ResultEngine<()> {
        Engine::register_chat(self, chat_id).await
    }

    async fn known_chats(&self) -> ResultEngine<Vec<i64>> {
        Engine::known_chats(self).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn rejects_inverted_range() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let filter = TransactionFilter {
            from: Some(at),
            to: Some(at),
            ..TransactionFilter::default()
        };
        assert!(filter.validate().is_err());
    }

    #[test]
    fn rejects_blank_search_text() {
        assert!(TransactionFilter::matching("  ").validate().is_err());
        assert!(TransactionFilter::matching("coffee").validate().is_ok());
    }

    #[test]
    fn builders_compose() {
        let filter = TransactionFilter::matching("bar")
            .kind(TransactionKind::Expense)
            .order(SortOrder::OldestFirst)
            .page(10, 5);
        assert_eq!(filter.offset, 10);
        assert_eq!(filter.limit, Some(5));
        assert_eq!(filter.kind, Some(TransactionKind::Expense));
        assert_eq!(filter.order, SortOrder::OldestFirst);
    }
}
