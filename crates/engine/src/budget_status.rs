//! Spend-vs-budget analytics.
//!
//! Everything here is integer arithmetic on minor units; percentages are kept
//! in basis points so `12.5%` is exactly `1250`.

use std::fmt;

use crate::{Money, Transaction, TransactionKind};

/// Number of segments of the progress bar.
pub const PROGRESS_SEGMENTS: u8 = 10;

const FILLED: char = '▓';
const EMPTY: char = '░';

/// A percentage stored in basis points (1/100 of a percent), rounded down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Percent(i64);

impl Percent {
    pub const ZERO: Percent = Percent(0);

    #[must_use]
    pub const fn from_basis_points(bp: i64) -> Self {
        Self(bp)
    }

    #[must_use]
    pub const fn basis_points(self) -> i64 {
        self.0
    }

    /// Whole percent, rounded down.
    #[must_use]
    pub const fn whole(self) -> i64 {
        self.0.div_euclid(100)
    }
}

impl fmt::Display for Percent {
    /// One decimal digit, truncated: `1256` renders as `12.5%`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{}%", abs / 100, (abs % 100) / 10)
    }
}

/// A ten-segment progress bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressIndicator {
    filled: u8,
}

impl ProgressIndicator {
    /// Builds the indicator for a percentage; one segment per full 10%.
    ///
    /// Values below zero or above 100% are clamped to `[0, 10]` segments.
    #[must_use]
    pub fn from_percent(percent: Percent) -> Self {
        let segments = percent.basis_points().div_euclid(1_000);
        let filled = segments.clamp(0, i64::from(PROGRESS_SEGMENTS)) as u8;
        Self { filled }
    }

    #[must_use]
    pub const fn filled(self) -> u8 {
        self.filled
    }

    #[must_use]
    pub const fn empty(self) -> u8 {
        PROGRESS_SEGMENTS - self.filled
    }
}

impl fmt::Display for ProgressIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.filled {
            write!(f, "{FILLED}")?;
        }
        for _ in 0..self.empty() {
            write!(f, "{EMPTY}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BudgetStatus {
    pub budget: Money,
    pub spent: Money,
    pub remaining: Money,
    pub percent_spent: Percent,
    pub progress: ProgressIndicator,
}

impl BudgetStatus {
    #[must_use]
    pub fn is_over_budget(&self) -> bool {
        self.remaining.is_negative()
    }
}

/// Computes spent/remaining/percentage for a budget.
///
/// Only expenses count towards `spent`; income is ignored. `remaining` may be
/// negative. With a zero (or negative) budget the percentage is defined as 0.
#[must_use]
pub fn compute_budget_status(budget: Money, transactions: &[Transaction]) -> BudgetStatus {
    let spent_minor: i128 = transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Expense)
        .map(|tx| i128::from(tx.amount.minor()))
        .sum();
    let budget_minor = i128::from(budget.minor());

    let percent_bp = if budget_minor > 0 {
        (spent_minor * 10_000).div_euclid(budget_minor)
    } else {
        0
    };
    let percent_spent = Percent(clamp_i64(percent_bp));

    let spent = Money::new(clamp_i64(spent_minor));
    BudgetStatus {
        budget,
        spent,
        remaining: Money::new(clamp_i64(budget_minor - spent_minor)),
        percent_spent,
        progress: ProgressIndicator::from_percent(percent_spent),
    }
}

fn clamp_i64(value: i128) -> i64 {
    value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn tx(kind: TransactionKind, minor: i64) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            chat_id: 1,
            kind,
            amount: Money::new(minor),
            category: "Misc".to_string(),
            description: "test".to_string(),
            occurred_at: Utc::now(),
        }
    }

    fn expenses(amounts: &[i64]) -> Vec<Transaction> {
        amounts
            .iter()
            .map(|a| tx(TransactionKind::Expense, *a))
            .collect()
    }

    #[test]
    fn half_spent_fills_five_segments() {
        let status = compute_budget_status(Money::new(10_000), &expenses(&[3_000, 2_000]));
        assert_eq!(status.spent, Money::new(5_000));
        assert_eq!(status.remaining, Money::new(5_000));
        assert_eq!(status.percent_spent, Percent::from_basis_points(5_000));
        assert_eq!(status.progress.filled(), 5);
        assert_eq!(status.progress.to_string(), "▓▓▓▓▓░░░░░");
        assert_eq!(status.percent_spent.to_string(), "50.0%");
        assert!(!status.is_over_budget());
    }

    #[test]
    fn zero_budget_reports_zero_percent() {
        let status = compute_budget_status(Money::ZERO, &expenses(&[1_234]));
        assert_eq!(status.percent_spent, Percent::ZERO);
        assert_eq!(status.progress.filled(), 0);
        assert_eq!(status.remaining, Money::new(-1_234));
        assert!(status.is_over_budget());
    }

    #[test]
    fn income_is_not_spending() {
        let mut txs = expenses(&[2_500]);
        txs.push(tx(TransactionKind::Income, 100_000));
        let status = compute_budget_status(Money::new(10_000), &txs);
        assert_eq!(status.spent, Money::new(2_500));
        assert_eq!(status.progress.filled(), 2);
    }

    #[test]
    fn over_budget_clamps_progress() {
        let status = compute_budget_status(Money::new(10_000), &expenses(&[25_000]));
        assert_eq!(status.percent_spent.whole(), 250);
        assert_eq!(status.progress.filled(), 10);
        assert_eq!(status.progress.empty(), 0);
        assert_eq!(status.remaining, Money::new(-15_000));
        assert_eq!(status.progress.to_string().chars().count(), 10);
    }

    #[test]
    fn percent_is_floored() {
        // 1/3 spent: 33.33..% -> 3333 bp -> 3 segments.
        let status = compute_budget_status(Money::new(300), &expenses(&[100]));
        assert_eq!(status.percent_spent.basis_points(), 3_333);
        assert_eq!(status.percent_spent.to_string(), "33.3%");
        assert_eq!(status.progress.filled(), 3);
    }

    #[test]
    fn nothing_spent_is_empty_bar() {
        let status = compute_budget_status(Money::new(10_000), &[]);
        assert_eq!(status.spent, Money::ZERO);
        assert_eq!(status.progress.to_string(), "░░░░░░░░░░");
    }
}
