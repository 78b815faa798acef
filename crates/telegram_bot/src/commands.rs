//! Commands understood by the assistant.

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(
    rename_rule = "snake_case",
    description = "Track your spending with these commands:"
)]
pub enum Command {
    #[command(description = "register this chat and show a short introduction.")]
    Start,
    #[command(description = "show this message.")]
    Help,
    #[command(description = "set or view this month's budget.")]
    Budget,
    #[command(description = "record an expense.")]
    AddExpense,
    #[command(description = "record an income.")]
    AddIncome,
    #[command(description = "list this month's expenses.")]
    ViewExpenses,
    #[command(description = "summarize a period.")]
    Summary,
    #[command(description = "search past transactions.")]
    Search,
    #[command(description = "abort the current operation.")]
    Cancel,
}

impl Command {
    /// Commands that start a conversation flow.
    #[must_use]
    pub fn starts_flow(self) -> bool {
        matches!(
            self,
            Self::Budget | Self::AddExpense | Self::AddIncome | Self::Summary | Self::Search
        )
    }
}

/// Decodes `/command` text, accepting an optional `@bot_name` suffix and
/// ignoring trailing arguments. Unknown commands yield `None`.
pub fn parse_command(text: &str) -> Option<Command> {
    let trimmed = text.trim();
    let name = trimmed.strip_prefix('/')?;
    let name = name.split_whitespace().next().unwrap_or("");
    let name = name.split('@').next().unwrap_or("");

    match name.to_ascii_lowercase().as_str() {
        "start" => Some(Command::Start),
        "help" => Some(Command::Help),
        "budget" => Some(Command::Budget),
        "add_expense" => Some(Command::AddExpense),
        "add_income" => Some(Command::AddIncome),
        "view_expenses" => Some(Command::ViewExpenses),
        "summary" => Some(Command::Summary),
        "search" => Some(Command::Search),
        "cancel" => Some(Command::Cancel),
        _ => None,
    }
}
