//! Ledger engine: the data model, the SQLite-backed store, input validation
//! and the budget/summary arithmetic used by the chat assistant.
//!
//! Money is always handled as integer minor units ([`Money`]).

pub use budget_status::{
    BudgetStatus, PROGRESS_SEGMENTS, Percent, ProgressIndicator, compute_budget_status,
};
pub use budgets::Budget;
pub use error::EngineError;
pub use money::Money;
pub use ops::{DEFAULT_CURRENCY, Engine, EngineBuilder};
pub use period::{DateRange, Period, local_midnight};
pub use store::{LedgerStore, SortOrder, TransactionFilter};
pub use summary::{CategoryTotal, PeriodSummary, summarize};
pub use transactions::{NewTransaction, Transaction, TransactionKind};
pub use user_settings::UserSettings;

mod budget_status;
mod budgets;
mod error;
mod money;
mod ops;
mod period;
mod store;
mod summary;
mod transactions;
mod user_settings;
pub mod validation;

pub type ResultEngine<T> = Result<T, EngineError>;
