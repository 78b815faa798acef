//! Runs conversation steps: sessions, store effects and replies.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use engine::{
    EngineError, LedgerStore, Money, ResultEngine, SortOrder, TransactionFilter, TransactionKind,
    compute_budget_status, summarize,
};

use crate::{
    conversation::{self, Context, Effect, Next, SummaryOption},
    error::ConversationError,
    event::{Event, Inbound},
    pagination::{self, Direction},
    session::{ChatLocks, FlowState, SearchCursor, SearchState, SessionStore},
    transport::Messenger,
    ui::{self, Reply},
};

/// Expenses shown by `/view_expenses`.
const VIEW_LIMIT: usize = 20;

/// What running an effect adds to a step.
#[derive(Debug, Default)]
struct Outcome {
    reply: Option<Reply>,
    notice: Option<&'static str>,
    /// Replaces the transition chosen by the step.
    next: Option<Next>,
}

impl Outcome {
    fn reply(reply: Reply) -> Self {
        Self {
            reply: Some(reply),
            ..Self::default()
        }
    }
}

pub struct Controller {
    store: Arc<dyn LedgerStore>,
    sessions: Arc<dyn SessionStore>,
    locks: ChatLocks,
    tz: Tz,
    page_size: usize,
}

impl Controller {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        sessions: Arc<dyn SessionStore>,
        tz: Tz,
        page_size: usize,
    ) -> Self {
        Self {
            store,
            sessions,
            locks: ChatLocks::default(),
            tz,
            page_size: page_size.max(1),
        }
    }

    pub async fn handle(
        &self,
        messenger: &dyn Messenger,
        inbound: Inbound,
    ) -> Result<(), ConversationError> {
        self.handle_at(messenger, inbound, Utc::now()).await
    }

    /// Handles one event as if it arrived at `now`.
    ///
    /// Events of the same chat are handled one at a time. When the store
    /// fails the user gets a generic message, the session is left untouched
    /// and the error is returned.
    pub async fn handle_at(
        &self,
        messenger: &dyn Messenger,
        inbound: Inbound,
        now: DateTime<Utc>,
    ) -> Result<(), ConversationError> {
        let chat_id = inbound.chat_id;
        let _guard = self.locks.lock(chat_id).await;

        let event = Event::decode(&inbound.kind);
        let state = self.sessions.load(chat_id).await;
        let ctx = Context {
            chat_id,
            now,
            tz: self.tz,
            page_size: self.page_size,
        };
        let step = conversation::dispatch(state.as_ref(), &event, &ctx);
        tracing::debug!(chat_id, ?event, ?state, next = ?step.next, "dispatched event");

        let outcome = match step.effect {
            Some(effect) => self.execute(effect, &ctx).await,
            None => Ok(Outcome::default()),
        };
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                if let Some(callback_id) = inbound.callback_id() {
                    messenger.answer_button(callback_id, None).await?;
                }
                return self.report(messenger, chat_id, err).await;
            }
        };

        self.apply(chat_id, outcome.next.unwrap_or(step.next)).await;

        if let Some(callback_id) = inbound.callback_id() {
            messenger
                .answer_button(callback_id, step.notice.or(outcome.notice))
                .await?;
        }

        for reply in step.reply.iter().chain(outcome.reply.iter()) {
            messenger.send(chat_id, reply).await?;
        }
        Ok(())
    }

    async fn apply(&self, chat_id: i64, next: Next) {
        match next {
            Next::Keep => {}
            Next::Goto(state) => self.sessions.save(chat_id, state).await,
            Next::End => self.sessions.clear(chat_id).await,
        }
    }

    async fn report(
        &self,
        messenger: &dyn Messenger,
        chat_id: i64,
        err: EngineError,
    ) -> Result<(), ConversationError> {
        if err.is_store_failure() {
            tracing::error!(chat_id, "store failure: {err}");
            messenger.send(chat_id, &ui::store_failure()).await?;
            return Err(ConversationError::Store(err));
        }
        tracing::warn!(chat_id, "input rejected by the engine: {err}");
        messenger
            .send(chat_id, &Reply::text(format!("❌ {err}")))
            .await?;
        Ok(())
    }

    async fn currency(&self, chat_id: i64) -> ResultEngine<String> {
        Ok(self.store.user_settings(chat_id).await?.currency)
    }

    async fn execute(&self, effect: Effect, ctx: &Context) -> ResultEngine<Outcome> {
        let chat_id = ctx.chat_id;
        match effect {
            Effect::RegisterChat => {
                self.store.register_chat(chat_id).await?;
                Ok(Outcome::default())
            }
            Effect::ShowBudget { period, range } => {
                let Some(budget) = self.store.budget(chat_id, period).await? else {
                    return Ok(Outcome::reply(ui::budget_not_set(period)));
                };
                let filter = TransactionFilter::in_range(&range).kind(TransactionKind::Expense);
                let expenses = self.store.query_transactions(chat_id, &filter).await?;
                let status = compute_budget_status(budget.amount, &expenses);
                let currency = self.currency(chat_id).await?;
                Ok(Outcome::reply(ui::budget_status(period, &status, &currency)))
            }
            // Writes go last: a stored write always ends the flow.
            Effect::UpsertBudget { period, amount } => {
                let currency = self.currency(chat_id).await?;
                let budget = self.store.upsert_budget(chat_id, period, amount).await?;
                tracing::info!(chat_id, %period, amount = %budget.amount, "budget set");
                Ok(Outcome::reply(ui::budget_saved(
                    period,
                    budget.amount,
                    &currency,
                )))
            }
            Effect::SaveTransaction(new) => {
                let currency = self.currency(chat_id).await?;
                let tx = self.store.insert_transaction(new).await?;
                tracing::info!(chat_id, id = %tx.id, kind = tx.kind.as_str(), "transaction recorded");
                Ok(Outcome::reply(ui::transaction_saved(&tx, &currency)))
            }
            Effect::Summary { range, option } => {
                let filter = TransactionFilter::in_range(&range).order(SortOrder::OldestFirst);
                let transactions = self.store.query_transactions(chat_id, &filter).await?;
                let currency = self.currency(chat_id).await?;
                let reply = match option {
                    SummaryOption::ByCategory => {
                        ui::summary_by_category(&range, &summarize(&transactions), &currency)
                    }
                    SummaryOption::AllTransactions => {
                        ui::summary_list(&range, &transactions, &currency, self.tz)
                    }
                };
                Ok(Outcome::reply(reply))
            }
            Effect::ListExpenses { range } => {
                let filter = TransactionFilter::in_range(&range).kind(TransactionKind::Expense);
                let expenses = self.store.query_transactions(chat_id, &filter).await?;
                let total: Money = expenses.iter().map(|tx| tx.amount).sum();
                let currency = self.currency(chat_id).await?;
                let recent = &expenses[..expenses.len().min(VIEW_LIMIT)];
                Ok(Outcome::reply(ui::expenses_list(
                    &range,
                    recent,
                    expenses.len(),
                    total,
                    &currency,
                    self.tz,
                )))
            }
            Effect::Search(cursor) => self.search_page(chat_id, cursor, None).await,
            Effect::Page { cursor, direction } => {
                self.search_page(chat_id, cursor, Some(direction)).await
            }
        }
    }

    async fn search_page(
        &self,
        chat_id: i64,
        mut cursor: SearchCursor,
        direction: Option<Direction>,
    ) -> ResultEngine<Outcome> {
        let filter = TransactionFilter::matching(&cursor.query);
        let total = self.store.count_transactions(chat_id, &filter).await?;
        let total = usize::try_from(total).unwrap_or(usize::MAX);
        if total == 0 {
            return Ok(Outcome {
                reply: Some(ui::search_no_results(&cursor.query)),
                next: Some(Next::End),
                ..Outcome::default()
            });
        }

        if let Some(direction) = direction {
            let offset = pagination::step(total, cursor.page_size, cursor.offset, direction);
            if offset == cursor.offset {
                return Ok(Outcome {
                    notice: Some(ui::page_unchanged(direction)),
                    next: Some(Next::Goto(FlowState::Search(SearchState::Paginate(cursor)))),
                    ..Outcome::default()
                });
            }
            cursor.offset = offset;
        }

        let page = self
            .store
            .query_transactions(
                chat_id,
                &filter.page(cursor.offset as u64, cursor.page_size as u64),
            )
            .await?;
        let currency = self.currency(chat_id).await?;
        let reply = ui::search_page(&cursor, total, &page, &currency, self.tz);
        tracing::debug!(chat_id, offset = cursor.offset, total, "search page");
        Ok(Outcome {
            reply: Some(reply),
            notice: None,
            next: Some(Next::Goto(FlowState::Search(SearchState::Paginate(cursor)))),
        })
    }
}
