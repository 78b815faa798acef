use sea_orm::{
    Condition, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    prelude::*,
    sea_query::{Expr, LikeExpr},
};

use crate::{
    NewTransaction, ResultEngine, SortOrder, Transaction, TransactionFilter, transactions,
};

use super::Engine;

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, chat_id: i64, filter: &TransactionFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, chat_id: i64, filter: &TransactionFilter) -> Self {
        self = self.filter(transactions::Column::ChatId.eq(chat_id));
        if let Some(from) = filter.from {
            self = self.filter(transactions::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            self = self.filter(transactions::Column::OccurredAt.lt(to));
        }
        if let Some(kind) = filter.kind {
            self = self.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(text) = filter.text.as_deref().map(str::trim) {
            // SQLite LIKE is case-insensitive for ASCII.
            let pattern = format!("%{}%", escape_like(text));
            self = self.filter(
                Condition::any()
                    .add(
                        Expr::col(transactions::Column::Description)
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::col(transactions::Column::Category)
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );
        }
        self
    }
}

/// Makes `%`, `_` and `\` match themselves in a `LIKE .. ESCAPE` pattern.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl Engine {
    pub async fn insert_transaction(&self, new: NewTransaction) -> ResultEngine<Transaction> {
        let tx = Transaction::new(new)?;
        transactions::ActiveModel::from(&tx)
            .insert(&self.database)
            .await?;
        tracing::debug!(
            chat_id = tx.chat_id,
            id = %tx.id,
            kind = tx.kind.as_str(),
            amount = %tx.amount,
            "transaction stored"
        );
        Ok(tx)
    }

    /// Lists transactions of a chat.
    ///
    /// Ordering is `(occurred_at, id)` in the direction given by the filter, so
    /// offsets are stable between pages.
    pub async fn query_transactions(
        &self,
        chat_id: i64,
        filter: &TransactionFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        filter.validate()?;

        let mut query = transactions::Entity::find().apply_tx_filters(chat_id, filter);
        query = match filter.order {
            SortOrder::NewestFirst => query
                .order_by_desc(transactions::Column::OccurredAt)
                .order_by_desc(transactions::Column::Id),
            SortOrder::OldestFirst => query
                .order_by_asc(transactions::Column::OccurredAt)
                .order_by_asc(transactions::Column::Id),
        };
        if filter.offset > 0 {
            query = query.offset(filter.offset);
        }
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        query
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    pub async fn count_transactions(
        &self,
        chat_id: i64,
        filter: &TransactionFilter,
    ) -> ResultEngine<u64> {
        filter.validate()?;
        let count = transactions::Entity::find()
            .apply_tx_filters(chat_id, filter)
            .count(&self.database)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("coffee"), "coffee");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
