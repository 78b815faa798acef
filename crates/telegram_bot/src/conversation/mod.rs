//! Conversation flows as pure state machines.
//!
//! [`dispatch`] maps the current [`FlowState`] of a chat and one [`Event`] to a
//! [`Step`]: an optional reply, an optional [`Effect`] to run against the
//! store, and the next state. Nothing here performs I/O; the
//! [`Controller`](crate::Controller) executes the step.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use engine::{DateRange, Money, NewTransaction, Period, TransactionKind};

use crate::{
    commands::Command,
    event::{ButtonAction, Event},
    pagination::Direction,
    session::{FlowState, SearchCursor},
    ui::{self, Reply},
};

mod budget;
mod search;
mod summary;
mod transaction;

pub use summary::SummaryOption;

/// Inputs a step may depend on besides the event.
#[derive(Clone, Debug)]
pub struct Context {
    pub chat_id: i64,
    pub now: DateTime<Utc>,
    pub tz: Tz,
    pub page_size: usize,
}

impl Context {
    pub(crate) fn current_period(&self) -> Period {
        Period::current(self.now, self.tz)
    }
}

/// Where the chat goes after a step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Next {
    /// The session is left exactly as it was.
    Keep,
    Goto(FlowState),
    /// The session is cleared.
    End,
}

/// Store work requested by a step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    RegisterChat,
    ShowBudget { period: Period, range: DateRange },
    UpsertBudget { period: Period, amount: Money },
    SaveTransaction(NewTransaction),
    Summary { range: DateRange, option: SummaryOption },
    ListExpenses { range: DateRange },
    /// First page of a new search.
    Search(SearchCursor),
    /// Move an existing search window.
    Page { cursor: SearchCursor, direction: Direction },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub reply: Option<Reply>,
    /// Short text shown on the pressed button, if any.
    pub notice: Option<&'static str>,
    pub effect: Option<Effect>,
    pub next: Next,
}

impl Step {
    fn new(next: Next) -> Self {
        Self {
            reply: None,
            notice: None,
            effect: None,
            next,
        }
    }

    pub(crate) fn stay(reply: Reply) -> Self {
        Self::new(Next::Keep).with_reply(reply)
    }

    pub(crate) fn goto(state: FlowState, reply: Reply) -> Self {
        Self::new(Next::Goto(state)).with_reply(reply)
    }

    pub(crate) fn end(reply: Reply) -> Self {
        Self::new(Next::End).with_reply(reply)
    }

    pub(crate) fn run(effect: Effect, next: Next) -> Self {
        Self {
            effect: Some(effect),
            ..Self::new(next)
        }
    }

    fn notice(notice: &'static str) -> Self {
        Self {
            notice: Some(notice),
            ..Self::new(Next::Keep)
        }
    }

    #[must_use]
    fn with_reply(mut self, reply: Reply) -> Self {
        self.reply = Some(reply);
        self
    }

    #[must_use]
    fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }
}

/// Decides what one event does to a chat.
#[must_use]
pub fn dispatch(state: Option<&FlowState>, event: &Event, ctx: &Context) -> Step {
    match event {
        Event::Command(command) => on_command(state, *command, ctx),
        Event::Button(ButtonAction::SetCurrentBudget) => budget::set_current(ctx),
        Event::Button(ButtonAction::SearchPage { direction, offset }) => match state {
            Some(FlowState::Search(search)) => search::on_page(search, *direction, *offset),
            _ => Step::notice(ui::BUTTON_EXPIRED),
        },
        Event::UnknownButton => Step::notice(ui::BUTTON_EXPIRED),
        Event::UnknownCommand(_) => Step::stay(ui::unknown_command(state.is_some())),
        Event::Text(text) => match state {
            None => Step::stay(ui::idle_hint()),
            Some(FlowState::Budget(budget)) => budget::on_text(budget, text, ctx),
            Some(FlowState::Transaction(tx)) => transaction::on_text(tx, text, ctx),
            Some(FlowState::Summary(summary)) => summary::on_text(summary, text, ctx),
            Some(FlowState::Search(search)) => search::on_text(search, text, ctx),
        },
    }
}

fn on_command(state: Option<&FlowState>, command: Command, ctx: &Context) -> Step {
    match command {
        Command::Start => Step::stay(ui::welcome()).with_effect(Effect::RegisterChat),
        Command::Help => Step::stay(ui::help()),
        Command::Cancel => match state {
            Some(state) => Step::end(ui::cancelled(state)),
            None => Step::stay(ui::nothing_to_cancel()),
        },
        Command::ViewExpenses => {
            let period = ctx.current_period();
            match DateRange::month(period, ctx.tz) {
                Ok(range) => Step::run(Effect::ListExpenses { range }, Next::Keep),
                Err(err) => Step::stay(Reply::text(err.to_string())),
            }
        }
        Command::Budget => budget::start(),
        Command::AddExpense => transaction::start(TransactionKind::Expense),
        Command::AddIncome => transaction::start(TransactionKind::Income),
        Command::Summary => summary::start(),
        Command::Search => search::start(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::TimeZone;
    use chrono_tz::Europe::Rome;

    use super::*;
    use crate::session::{BudgetState, SearchState, TransactionState};

    pub(crate) fn ctx() -> Context {
        Context {
            chat_id: 7,
            now: Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap(),
            tz: Rome,
            page_size: 10,
        }
    }

    pub(crate) fn text(s: &str) -> Event {
        Event::Text(s.to_string())
    }

    #[test]
    fn idle_text_gets_a_hint_and_no_session() {
        let step = dispatch(None, &text("hello"), &ctx());
        assert_eq!(step.next, Next::Keep);
        assert_eq!(step.effect, None);
        assert_eq!(step.reply, Some(ui::idle_hint()));
    }

    #[test]
    fn cancel_clears_any_flow() {
        let states = [
            FlowState::Budget(BudgetState::ChooseAction),
            FlowState::Transaction(TransactionState::GetAmount {
                kind: TransactionKind::Expense,
                description: "Coffee".to_string(),
            }),
            FlowState::Search(SearchState::GetQuery),
        ];
        for state in states {
            let step = dispatch(Some(&state), &Event::Command(Command::Cancel), &ctx());
            assert_eq!(step.next, Next::End);
            assert_eq!(step.effect, None);
            assert_eq!(step.reply, Some(ui::cancelled(&state)));
        }
    }

    #[test]
    fn unknown_commands_never_feed_a_flow() {
        let state = FlowState::Transaction(TransactionState::GetDescription {
            kind: TransactionKind::Expense,
        });
        let event = Event::UnknownCommand("/stats".to_string());

        let step = dispatch(Some(&state), &event, &ctx());
        assert_eq!(step.next, Next::Keep);
        assert_eq!(step.effect, None);
        assert_eq!(step.reply, Some(ui::unknown_command(true)));

        let step = dispatch(None, &event, &ctx());
        assert_eq!(step.next, Next::Keep);
        assert_eq!(step.reply, Some(ui::unknown_command(false)));
    }

    #[test]
    fn cancel_outside_a_flow() {
        let step = dispatch(None, &Event::Command(Command::Cancel), &ctx());
        assert_eq!(step.next, Next::Keep);
        assert_eq!(step.reply, Some(ui::nothing_to_cancel()));
    }

    #[test]
    fn entry_commands_overwrite_a_stale_session() {
        let stale = FlowState::Transaction(TransactionState::GetDescription {
            kind: TransactionKind::Income,
        });
        let step = dispatch(Some(&stale), &Event::Command(Command::Budget), &ctx());
        assert_eq!(
            step.next,
            Next::Goto(FlowState::Budget(BudgetState::ChooseAction))
        );
    }

    #[test]
    fn informational_commands_keep_the_session() {
        let state = FlowState::Budget(BudgetState::ChooseAction);
        for command in [Command::Start, Command::Help, Command::ViewExpenses] {
            let step = dispatch(Some(&state), &Event::Command(command), &ctx());
            assert_eq!(step.next, Next::Keep, "{command:?}");
        }
    }

    #[test]
    fn start_registers_the_chat() {
        let step = dispatch(None, &Event::Command(Command::Start), &ctx());
        assert_eq!(step.effect, Some(Effect::RegisterChat));
    }

    #[test]
    fn view_expenses_lists_the_local_month() {
        let step = dispatch(None, &Event::Command(Command::ViewExpenses), &ctx());
        let Some(Effect::ListExpenses { range }) = step.effect else {
            panic!("expected ListExpenses");
        };
        assert_eq!(range.label, "2026-03");
        // Midnight in Rome (UTC+1 in winter).
        assert_eq!(range.from, Utc.with_ymd_and_hms(2026, 2, 28, 23, 0, 0).unwrap());
    }

    #[test]
    fn unknown_or_foreign_buttons_expire() {
        let step = dispatch(None, &Event::UnknownButton, &ctx());
        assert_eq!(step.notice, Some(ui::BUTTON_EXPIRED));
        assert_eq!(step.next, Next::Keep);

        let page = Event::Button(ButtonAction::SearchPage {
            direction: Direction::Next,
            offset: 0,
        });
        let state = FlowState::Budget(BudgetState::ChooseAction);
        let step = dispatch(Some(&state), &page, &ctx());
        assert_eq!(step.notice, Some(ui::BUTTON_EXPIRED));
        assert_eq!(step.effect, None);
        assert_eq!(step.next, Next::Keep);
    }
}
