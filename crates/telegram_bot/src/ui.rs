//! Message texts and keyboards.
//!
//! Everything here returns a transport-neutral [`Reply`]; the messenger turns
//! it into Telegram markup.

use chrono_tz::Tz;
use engine::{
    BudgetStatus, DateRange, Money, Period, PeriodSummary, Transaction, TransactionKind,
};
use teloxide::utils::{command::BotCommands, html};

use crate::{
    commands::Command,
    event::ButtonAction,
    pagination::{self, Direction},
    session::{FlowState, SearchCursor},
};

pub(crate) const SET_BUDGET: &str = "Set Budget";
pub(crate) const VIEW_BUDGET: &str = "View Budget";
pub(crate) const BY_CATEGORY: &str = "By Category";
pub(crate) const ALL_TRANSACTIONS: &str = "All Transactions";
pub(crate) const PERIOD_CHOICES: [&str; 5] =
    ["Today", "This Week", "This Month", "Last Month", "This Year"];

const EXPENSE_CATEGORIES: [&str; 6] = [
    "Food",
    "Transport",
    "Housing",
    "Entertainment",
    "Health",
    "Other",
];
const INCOME_CATEGORIES: [&str; 4] = ["Salary", "Freelance", "Gift", "Other"];

/// Longest list printed in one message.
const MAX_LISTED: usize = 50;
/// Telegram rejects longer messages.
pub(crate) const MAX_MESSAGE_CHARS: usize = 4096;
/// Room left after a list for its tail and totals.
const LIST_RESERVE: usize = 160;
/// Longest search query echoed back.
const MAX_QUERY_SHOWN: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub data: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Keyboard {
    /// Leave whatever keyboard the client shows.
    #[default]
    Unchanged,
    /// Hide a previously shown reply keyboard.
    Remove,
    /// One-time reply keyboard with the given rows of choices.
    Choices(Vec<Vec<String>>),
    Inline(Vec<Vec<InlineButton>>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Keyboard,
    /// Text is HTML formatted.
    pub html: bool,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::Unchanged,
            html: false,
        }
    }

    #[must_use]
    pub fn remove_keyboard(mut self) -> Self {
        self.keyboard = Keyboard::Remove;
        self
    }

    #[must_use]
    pub fn choices<R, S>(mut self, rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        self.keyboard = Keyboard::Choices(rows);
        self
    }

    #[must_use]
    pub fn inline(mut self, rows: Vec<Vec<InlineButton>>) -> Self {
        self.keyboard = Keyboard::Inline(rows);
        self
    }

    #[must_use]
    pub fn html(mut self) -> Self {
        self.html = true;
        self
    }
}

fn button(label: &str, action: ButtonAction) -> InlineButton {
    InlineButton {
        label: label.to_string(),
        data: action.data(),
    }
}

pub(crate) fn welcome() -> Reply {
    Reply::text(format!(
        "👋 Welcome! I help you keep track of your money.\n\n\
         Record spending with /add_expense, income with /add_income and set a \
         monthly limit with /budget.\n\n{}",
        Command::descriptions()
    ))
    .remove_keyboard()
}

pub(crate) fn help() -> Reply {
    Reply::text(Command::descriptions().to_string())
}

pub(crate) fn idle_hint() -> Reply {
    Reply::text("I'm not waiting for anything right now. Send /help to see what I can do.")
}

pub(crate) fn unknown_command(in_flow: bool) -> Reply {
    if in_flow {
        Reply::text("Unknown command. Answer the question above, or send /cancel to stop.")
    } else {
        Reply::text("Unknown command. Send /help to see what I can do.")
    }
}

pub(crate) fn nothing_to_cancel() -> Reply {
    Reply::text("Nothing to cancel.").remove_keyboard()
}

pub(crate) fn cancelled(state: &FlowState) -> Reply {
    let text = match state {
        FlowState::Budget(_) => "Budget operation cancelled.",
        FlowState::Transaction(_) => "Transaction cancelled. Nothing was saved.",
        FlowState::Summary(_) => "Summary cancelled.",
        FlowState::Search(_) => "Search cancelled.",
    };
    Reply::text(text).remove_keyboard()
}

pub(crate) const BUTTON_EXPIRED: &str = "This button has expired.";

pub(crate) fn store_failure() -> Reply {
    Reply::text("⚠️ Something went wrong while saving or loading your data. Please try again.")
}

pub(crate) fn invalid_amount() -> Reply {
    Reply::text("❌ Invalid amount. Please enter a valid number (e.g., 1500.50).")
}

// Budget

pub(crate) fn budget_menu() -> Reply {
    Reply::text("What would you like to do with your budget?")
        .choices([[SET_BUDGET, VIEW_BUDGET]])
}

pub(crate) fn invalid_budget_choice() -> Reply {
    Reply::text(format!(
        "Invalid option. Please choose '{SET_BUDGET}' or '{VIEW_BUDGET}'."
    ))
    .choices([[SET_BUDGET, VIEW_BUDGET]])
}

pub(crate) fn budget_amount_prompt(period: Period) -> Reply {
    Reply::text(format!("What is your budget for {period}?")).remove_keyboard()
}

pub(crate) fn budget_saved(period: Period, amount: Money, currency: &str) -> Reply {
    Reply::text(format!(
        "✅ Budget set successfully for {period} at {}.",
        amount.format_with(currency)
    ))
    .remove_keyboard()
}

pub(crate) fn budget_not_set(period: Period) -> Reply {
    Reply::text(format!(
        "You have not set a budget for {period}.\n\nYou can set one using the /budget command."
    ))
    .remove_keyboard()
}

pub(crate) fn budget_status(period: Period, status: &BudgetStatus, currency: &str) -> Reply {
    let currency = html::escape(currency);
    let mut text = format!(
        "💰 <b>Budget Status for {period}</b>\n\n\
         Budget: {}\n\
         Spent: {}\n\
         Remaining: {}\n\n\
         <b>{} Spent</b>\n\
         <code>{}</code>",
        status.budget.format_with(&currency),
        status.spent.format_with(&currency),
        status.remaining.format_with(&currency),
        status.percent_spent,
        status.progress,
    );
    if status.is_over_budget() {
        text.push_str(&format!(
            "\n⚠️ Over budget by {}",
            (-status.remaining).format_with(&currency)
        ));
    }
    Reply::text(text).html().remove_keyboard()
}

pub(crate) fn budget_reminder(period: Period) -> Reply {
    Reply::text(format!(
        "📅 A new month has started. You have no budget for {period} yet."
    ))
    .inline(vec![vec![button("Set budget", ButtonAction::SetCurrentBudget)]])
}

// Transactions

fn kind_noun(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Expense => "expense",
        TransactionKind::Income => "income",
    }
}

pub(crate) fn description_prompt(kind: TransactionKind) -> Reply {
    Reply::text(format!(
        "Please enter a description for this {}.",
        kind_noun(kind)
    ))
    .remove_keyboard()
}

pub(crate) fn amount_prompt() -> Reply {
    Reply::text("How much? Enter the amount (e.g., 12.50).")
}

pub(crate) fn category_prompt(kind: TransactionKind) -> Reply {
    let suggestions: &[&str] = match kind {
        TransactionKind::Expense => &EXPENSE_CATEGORIES,
        TransactionKind::Income => &INCOME_CATEGORIES,
    };
    Reply::text("Choose a category or type your own.")
        .choices(suggestions.chunks(2).map(|row| row.iter().copied()))
}

pub(crate) fn transaction_saved(tx: &Transaction, currency: &str) -> Reply {
    let label = match tx.kind {
        TransactionKind::Expense => "Expense",
        TransactionKind::Income => "Income",
    };
    Reply::text(format!(
        "✅ {label} recorded: {} {} ({})",
        tx.description,
        tx.amount.format_with(currency),
        tx.category,
    ))
    .remove_keyboard()
}

/// Shows an input error and repeats the question.
pub(crate) fn input_error(message: &str, mut prompt: Reply) -> Reply {
    prompt.text = format!("❌ {message}\n\n{}", prompt.text);
    prompt
}

// Summary

pub(crate) fn period_menu() -> Reply {
    let rows = [
        &PERIOD_CHOICES[0..2],
        &PERIOD_CHOICES[2..4],
        &PERIOD_CHOICES[4..],
    ];
    Reply::text("Which period? Choose one or type a month as YYYY-MM.")
        .choices(rows.map(|row| row.iter().copied()))
}

pub(crate) fn invalid_period() -> Reply {
    input_error("Unrecognized period.", period_menu())
}

pub(crate) fn option_menu() -> Reply {
    Reply::text("What would you like to see?").choices([[BY_CATEGORY, ALL_TRANSACTIONS]])
}

pub(crate) fn invalid_option() -> Reply {
    input_error(
        &format!("Please choose '{BY_CATEGORY}' or '{ALL_TRANSACTIONS}'."),
        option_menu(),
    )
}

pub(crate) fn summary_by_category(
    range: &DateRange,
    summary: &PeriodSummary,
    currency: &str,
) -> Reply {
    let mut text = format!(
        "📊 Summary for {}\n\nIncome: {}\nExpenses: {}\nNet: {}",
        range.label,
        summary.income.format_with(currency),
        summary.expenses.format_with(currency),
        summary.net.format_with(currency),
    );
    if summary.by_category.is_empty() {
        text.push_str("\n\nNo expenses in this period.");
    } else {
        text.push_str("\n\nExpenses by category:");
        let lines = summary.by_category.iter().map(|entry| {
            format!(
                "• {}: {} ({})",
                entry.category,
                entry.total.format_with(currency),
                entry.count
            )
        });
        let shown = push_bounded(&mut text, lines);
        push_more(&mut text, summary.by_category.len() - shown);
    }
    Reply::text(text).remove_keyboard()
}

fn transaction_line(tx: &Transaction, currency: &str, tz: Tz) -> String {
    let sign = match tx.kind {
        TransactionKind::Expense => "-",
        TransactionKind::Income => "+",
    };
    format!(
        "{} {sign}{} • {} • {}",
        tx.occurred_at.with_timezone(&tz).format("%Y-%m-%d"),
        tx.amount.format_with(currency),
        tx.category,
        tx.description
    )
}

/// Appends one line per item while the message stays within
/// [`MAX_MESSAGE_CHARS`] minus [`LIST_RESERVE`]. Returns how many were added.
fn push_bounded(text: &mut String, lines: impl IntoIterator<Item = String>) -> usize {
    let budget = MAX_MESSAGE_CHARS - LIST_RESERVE;
    let mut used = text.chars().count();
    let mut shown = 0;
    for line in lines {
        let len = line.chars().count() + 1;
        if used + len > budget {
            break;
        }
        text.push('\n');
        text.push_str(&line);
        used += len;
        shown += 1;
    }
    shown
}

fn push_more(text: &mut String, hidden: usize) {
    if hidden > 0 {
        text.push_str(&format!("\n… and {hidden} more"));
    }
}

fn push_lines(text: &mut String, transactions: &[Transaction], currency: &str, tz: Tz) -> usize {
    let lines = transactions
        .iter()
        .take(MAX_LISTED)
        .map(|tx| transaction_line(tx, currency, tz));
    push_bounded(text, lines)
}

/// Shortens user text echoed inside a message.
fn elide(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max - 1).collect();
    short.push('…');
    short
}

pub(crate) fn summary_list(
    range: &DateRange,
    transactions: &[Transaction],
    currency: &str,
    tz: Tz,
) -> Reply {
    if transactions.is_empty() {
        return Reply::text(format!("No transactions for {}.", range.label)).remove_keyboard();
    }
    let mut text = format!("🧾 Transactions for {}:\n", range.label);
    let shown = push_lines(&mut text, transactions, currency, tz);
    push_more(&mut text, transactions.len() - shown);
    Reply::text(text).remove_keyboard()
}

pub(crate) fn expenses_list(
    range: &DateRange,
    recent: &[Transaction],
    count: usize,
    total: Money,
    currency: &str,
    tz: Tz,
) -> Reply {
    if count == 0 {
        return Reply::text(format!("No expenses recorded for {}.", range.label));
    }
    let mut text = format!("🧾 Expenses for {}:\n", range.label);
    let shown = push_lines(&mut text, recent, currency, tz);
    if count > shown {
        text.push_str(&format!("\n… {} older not shown", count - shown));
    }
    text.push_str(&format!("\n\nTotal: {}", total.format_with(currency)));
    Reply::text(text)
}

// Search

pub(crate) fn search_prompt() -> Reply {
    Reply::text("What are you looking for? Send a word from the description or category.")
        .remove_keyboard()
}

pub(crate) fn search_no_results(query: &str) -> Reply {
    Reply::text(format!(
        "No transactions match \"{}\".",
        elide(query, MAX_QUERY_SHOWN)
    ))
}

pub(crate) fn search_use_buttons() -> Reply {
    Reply::text("Use the buttons to move between pages, or /cancel to stop searching.")
}

pub(crate) fn search_page(
    cursor: &SearchCursor,
    total: usize,
    page: &[Transaction],
    currency: &str,
    tz: Tz,
) -> Reply {
    let mut text = format!(
        "🔎 Results for \"{}\" (page {}/{}, {total} found):\n",
        elide(&cursor.query, MAX_QUERY_SHOWN),
        pagination::page_number(cursor.offset, cursor.page_size),
        pagination::page_count(total, cursor.page_size),
    );
    let lines = page.iter().enumerate().map(|(idx, tx)| {
        format!(
            "{}. {}",
            cursor.offset + idx + 1,
            transaction_line(tx, currency, tz)
        )
    });
    let shown = push_bounded(&mut text, lines);
    push_more(&mut text, page.len() - shown);

    let mut row = Vec::new();
    if cursor.offset > 0 {
        row.push(button(
            "◀ Prev",
            ButtonAction::SearchPage {
                direction: Direction::Prev,
                offset: cursor.offset,
            },
        ));
    }
    if cursor.offset + cursor.page_size < total {
        row.push(button(
            "Next ▶",
            ButtonAction::SearchPage {
                direction: Direction::Next,
                offset: cursor.offset,
            },
        ));
    }

    let reply = Reply::text(text);
    if row.is_empty() {
        reply
    } else {
        reply.inline(vec![row])
    }
}

pub(crate) fn page_unchanged(direction: Direction) -> &'static str {
    match direction {
        Direction::Next => "You are on the last page.",
        Direction::Prev => "You are on the first page.",
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use chrono_tz::UTC;
    use engine::compute_budget_status;

    use super::*;

    fn expense(minor: i64, category: &str, description: &str) -> Transaction {
        Transaction {
            id: Default::default(),
            chat_id: 1,
            kind: TransactionKind::Expense,
            amount: Money::new(minor),
            category: category.to_string(),
            description: description.to_string(),
            occurred_at: Utc.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap(),
        }
    }

    fn period() -> Period {
        "2026-03".parse().unwrap()
    }

    #[test]
    fn budget_status_shows_bar_and_percent() {
        let status = compute_budget_status(
            Money::new(10_000),
            &[expense(3_000, "a", "x"), expense(2_000, "b", "y")],
        );
        let reply = budget_status(period(), &status, "EUR");
        assert!(reply.html);
        assert!(reply.text.contains("Budget: EUR 100.00"));
        assert!(reply.text.contains("Spent: EUR 50.00"));
        assert!(reply.text.contains("Remaining: EUR 50.00"));
        assert!(reply.text.contains("50.0% Spent"));
        assert!(reply.text.contains("▓▓▓▓▓░░░░░"));
        assert!(!reply.text.contains("Over budget"));
    }

    #[test]
    fn over_budget_is_called_out() {
        let status = compute_budget_status(Money::new(1_000), &[expense(1_550, "a", "x")]);
        let reply = budget_status(period(), &status, "EUR");
        assert!(reply.text.contains("▓▓▓▓▓▓▓▓▓▓"));
        assert!(reply.text.contains("Remaining: EUR -5.50"));
        assert!(reply.text.contains("Over budget by EUR 5.50"));
    }

    #[test]
    fn currency_is_escaped_in_html() {
        let status = compute_budget_status(Money::new(100), &[]);
        let reply = budget_status(period(), &status, "<b>");
        assert!(reply.text.contains("&lt;b&gt; 1.00"));
    }

    #[test]
    fn search_page_buttons_depend_on_position() {
        let page = vec![expense(100, "Food", "Coffee")];
        let cursor = |offset| SearchCursor {
            query: "coffee".to_string(),
            offset,
            page_size: 10,
        };
        let labels = |reply: &Reply| match &reply.keyboard {
            Keyboard::Inline(rows) => rows[0].iter().map(|b| b.label.clone()).collect(),
            _ => Vec::<String>::new(),
        };

        let first = search_page(&cursor(0), 25, &page, "EUR", UTC);
        assert!(first.text.contains("page 1/3"));
        assert_eq!(labels(&first), ["Next ▶"]);

        let middle = search_page(&cursor(10), 25, &page, "EUR", UTC);
        assert_eq!(labels(&middle), ["◀ Prev", "Next ▶"]);
        assert!(middle.text.contains("11. 2026-03-04 -EUR 1.00 • Food • Coffee"));

        let last = search_page(&cursor(20), 25, &page, "EUR", UTC);
        assert!(last.text.contains("page 3/3"));
        assert_eq!(labels(&last), ["◀ Prev"]);

        let single = search_page(&cursor(0), 1, &page, "EUR", UTC);
        assert_eq!(single.keyboard, Keyboard::Unchanged);
    }

    #[test]
    fn long_lists_fit_in_one_message() {
        let range = DateRange::month(period(), UTC).unwrap();
        let description = "x".repeat(150);
        let many: Vec<_> = (0..50).map(|_| expense(100, "Food", &description)).collect();

        let list = summary_list(&range, &many, "EUR", UTC);
        assert!(list.text.chars().count() <= MAX_MESSAGE_CHARS);
        let shown = list.text.matches(&description).count();
        assert!(shown > 0 && shown < 50);
        assert!(list.text.ends_with(&format!("… and {} more", 50 - shown)));

        let total: Money = many.iter().map(|tx| tx.amount).sum();
        let expenses = expenses_list(&range, &many[..20], 80, total, "EUR", UTC);
        assert!(expenses.text.chars().count() <= MAX_MESSAGE_CHARS);
        assert!(expenses.text.ends_with("Total: EUR 50.00"));
    }

    #[test]
    fn short_lists_are_printed_whole() {
        let range = DateRange::month(period(), UTC).unwrap();
        let few = vec![expense(100, "Food", "Coffee"), expense(200, "Food", "Tea")];
        let list = summary_list(&range, &few, "EUR", UTC);
        assert!(list.text.contains("Coffee"));
        assert!(list.text.contains("Tea"));
        assert!(!list.text.contains("more"));
    }

    #[test]
    fn long_queries_are_shortened_when_echoed() {
        let query = "q".repeat(4_000);
        let reply = search_no_results(&query);
        assert!(reply.text.chars().count() < 100);
        assert!(reply.text.contains('…'));
    }

    #[test]
    fn input_error_repeats_the_prompt() {
        let reply = input_error("Bad.", amount_prompt());
        assert!(reply.text.starts_with("❌ Bad."));
        assert!(reply.text.ends_with(&amount_prompt().text));
    }

    #[test]
    fn category_prompt_offers_suggestions() {
        let Keyboard::Choices(rows) = category_prompt(TransactionKind::Income).keyboard else {
            panic!("expected reply keyboard");
        };
        assert_eq!(rows, vec![vec!["Salary", "Freelance"], vec!["Gift", "Other"]]);
    }
}
