use engine::{
    NewTransaction, TransactionKind,
    validation::{normalize_category, normalize_description, parse_positive_amount},
};

use super::{Context, Effect, Next, Step};
use crate::{
    session::{FlowState, TransactionState},
    ui,
};

pub(super) fn start(kind: TransactionKind) -> Step {
    Step::goto(
        FlowState::Transaction(TransactionState::GetDescription { kind }),
        ui::description_prompt(kind),
    )
}

pub(super) fn on_text(state: &TransactionState, text: &str, ctx: &Context) -> Step {
    match state {
        TransactionState::GetDescription { kind } => match normalize_description(text) {
            Ok(description) => Step::goto(
                FlowState::Transaction(TransactionState::GetAmount {
                    kind: *kind,
                    description,
                }),
                ui::amount_prompt(),
            ),
            Err(_) => Step::stay(ui::input_error(
                "The description can't be empty.",
                ui::description_prompt(*kind),
            )),
        },
        TransactionState::GetAmount { kind, description } => match parse_positive_amount(text) {
            Ok(amount) => Step::goto(
                FlowState::Transaction(TransactionState::GetCategory {
                    kind: *kind,
                    description: description.clone(),
                    amount,
                }),
                ui::category_prompt(*kind),
            ),
            Err(_) => Step::stay(ui::invalid_amount()),
        },
        TransactionState::GetCategory {
            kind,
            description,
            amount,
        } => match normalize_category(text) {
            Ok(category) => Step::run(
                Effect::SaveTransaction(NewTransaction {
                    chat_id: ctx.chat_id,
                    kind: *kind,
                    amount: *amount,
                    category,
                    description: description.clone(),
                    occurred_at: ctx.now,
                }),
                Next::End,
            ),
            Err(err) => Step::stay(ui::input_error(
                &err.to_string(),
                ui::category_prompt(*kind),
            )),
        },
    }
}
