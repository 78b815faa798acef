use sea_orm::{ActiveValue, prelude::*, sea_query::OnConflict};

use crate::{Budget, EngineError, Money, Period, ResultEngine, budgets};

use super::Engine;

impl Engine {
    /// Creates or replaces the budget for `(chat_id, period)`.
    ///
    /// Runs as a single `INSERT .. ON CONFLICT DO UPDATE`, so the row is
    /// either fully written or not at all.
    pub async fn upsert_budget(
        &self,
        chat_id: i64,
        period: Period,
        amount: Money,
    ) -> ResultEngine<Budget> {
        if amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "budget must not be negative".to_string(),
            ));
        }

        let model = budgets::ActiveModel {
            chat_id: ActiveValue::Set(chat_id),
            period: ActiveValue::Set(period.to_string()),
            amount_minor: ActiveValue::Set(amount.minor()),
        };
        budgets::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([budgets::Column::ChatId, budgets::Column::Period])
                    .update_column(budgets::Column::AmountMinor)
                    .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await?;

        tracing::debug!(chat_id, %period, %amount, "budget upserted");
        Ok(Budget {
            chat_id,
            period,
            amount,
        })
    }

    pub async fn budget(&self, chat_id: i64, period: Period) -> ResultEngine<Option<Budget>> {
        budgets::Entity::find_by_id((chat_id, period.to_string()))
            .one(&self.database)
            .await?
            .map(Budget::try_from)
            .transpose()
    }
}
