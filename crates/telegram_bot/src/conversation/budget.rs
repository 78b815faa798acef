use engine::{DateRange, validation::parse_amount};

use super::{Context, Effect, Next, Step};
use crate::{
    session::{BudgetState, FlowState},
    ui::{self, Reply},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BudgetChoice {
    Set,
    View,
}

impl BudgetChoice {
    fn parse(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case(ui::SET_BUDGET) {
            Some(Self::Set)
        } else if text.eq_ignore_ascii_case(ui::VIEW_BUDGET) {
            Some(Self::View)
        } else {
            None
        }
    }
}

pub(super) fn start() -> Step {
    Step::goto(FlowState::Budget(BudgetState::ChooseAction), ui::budget_menu())
}

/// Jumps straight to the amount prompt for the current month.
pub(super) fn set_current(ctx: &Context) -> Step {
    let period = ctx.current_period();
    Step::goto(
        FlowState::Budget(BudgetState::GetAmount { period }),
        ui::budget_amount_prompt(period),
    )
}

pub(super) fn on_text(state: &BudgetState, text: &str, ctx: &Context) -> Step {
    match state {
        BudgetState::ChooseAction => match BudgetChoice::parse(text) {
            Some(BudgetChoice::Set) => set_current(ctx),
            Some(BudgetChoice::View) => {
                let period = ctx.current_period();
                match DateRange::month(period, ctx.tz) {
                    Ok(range) => Step::run(Effect::ShowBudget { period, range }, Next::End),
                    Err(err) => Step::stay(Reply::text(err.to_string())),
                }
            }
            None => Step::stay(ui::invalid_budget_choice()),
        },
        BudgetState::GetAmount { period } => match parse_amount(text) {
            Ok(amount) => Step::run(
                Effect::UpsertBudget {
                    period: *period,
                    amount,
                },
                Next::End,
            ),
            Err(_) => Step::stay(ui::invalid_amount()),
        },
    }
}

#[cfg(test)]
mod tests {
    use engine::{Money, Period};

    use super::*;
    use crate::conversation::{
        dispatch,
        tests::{ctx, text},
    };
    use crate::{commands::Command, event::ButtonAction, event::Event};

    fn choose() -> FlowState {
        FlowState::Budget(BudgetState::ChooseAction)
    }

    fn march() -> Period {
        "2026-03".parse().unwrap()
    }

    #[test]
    fn budget_command_offers_set_or_view() {
        let step = dispatch(None, &Event::Command(Command::Budget), &ctx());
        assert_eq!(step.next, Next::Goto(choose()));
        assert_eq!(step.reply, Some(ui::budget_menu()));
    }

    #[test]
    fn set_budget_seeds_current_period() {
        let step = dispatch(Some(&choose()), &text("Set Budget"), &ctx());
        assert_eq!(
            step.next,
            Next::Goto(FlowState::Budget(BudgetState::GetAmount { period: march() }))
        );
        assert_eq!(step.reply, Some(ui::budget_amount_prompt(march())));
    }

    #[test]
    fn view_budget_runs_once_and_ends() {
        let step = dispatch(Some(&choose()), &text("view budget"), &ctx());
        assert_eq!(step.next, Next::End);
        assert!(matches!(
            step.effect,
            Some(Effect::ShowBudget { period, .. }) if period == march()
        ));
    }

    #[test]
    fn unknown_choice_reprompts() {
        let step = dispatch(Some(&choose()), &text("Delete Budget"), &ctx());
        assert_eq!(step.next, Next::Keep);
        assert_eq!(step.effect, None);
        assert_eq!(step.reply, Some(ui::invalid_budget_choice()));
    }

    #[test]
    fn valid_amount_upserts_and_ends() {
        let state = FlowState::Budget(BudgetState::GetAmount { period: march() });
        let step = dispatch(Some(&state), &text("1500.50"), &ctx());
        assert_eq!(step.next, Next::End);
        assert_eq!(
            step.effect,
            Some(Effect::UpsertBudget {
                period: march(),
                amount: Money::new(150_050),
            })
        );
    }

    #[test]
    fn zero_budget_is_allowed() {
        let state = FlowState::Budget(BudgetState::GetAmount { period: march() });
        let step = dispatch(Some(&state), &text("0"), &ctx());
        assert!(matches!(step.effect, Some(Effect::UpsertBudget { amount, .. }) if amount.is_zero()));
    }

    #[test]
    fn invalid_amounts_stay_in_place() {
        let state = FlowState::Budget(BudgetState::GetAmount { period: march() });
        for input in ["abc", "-5", "", "1.234"] {
            let step = dispatch(Some(&state), &text(input), &ctx());
            assert_eq!(step.next, Next::Keep, "{input}");
            assert_eq!(step.effect, None, "{input}");
            assert_eq!(step.reply, Some(ui::invalid_amount()));
        }
    }

    #[test]
    fn reminder_button_enters_amount_prompt_from_anywhere() {
        let event = Event::Button(ButtonAction::SetCurrentBudget);
        let step = dispatch(None, &event, &ctx());
        assert_eq!(
            step.next,
            Next::Goto(FlowState::Budget(BudgetState::GetAmount { period: march() }))
        );
    }
}
