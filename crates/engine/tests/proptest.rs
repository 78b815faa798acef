//! Property-based tests for amount validation and budget arithmetic.

use chrono::Utc;
use engine::{
    Money, PROGRESS_SEGMENTS, Transaction, TransactionKind, compute_budget_status,
    validation::{is_valid_currency_amount, parse_amount},
};
use proptest::prelude::*;
use uuid::Uuid;

fn expense(minor: i64) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        chat_id: 1,
        kind: TransactionKind::Expense,
        amount: Money::new(minor),
        category: "c".to_string(),
        description: "d".to_string(),
        occurred_at: Utc::now(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Any `units.cc` decimal is accepted and formats back to the same value.
    #[test]
    fn valid_decimals_round_trip(units in 0i64..=1_000_000_000, cents in 0i64..100) {
        let text = format!("{units}.{cents:02}");
        prop_assert!(is_valid_currency_amount(&text));
        let parsed = parse_amount(&text).unwrap();
        prop_assert_eq!(parsed.minor(), units * 100 + cents);
        prop_assert_eq!(parsed.to_string(), text);
    }

    /// One fractional digit means tenths.
    #[test]
    fn single_decimal_is_tenths(units in 0i64..1_000_000, tenth in 0i64..10) {
        let parsed = parse_amount(&format!("{units},{tenth}")).unwrap();
        prop_assert_eq!(parsed.minor(), units * 100 + tenth * 10);
    }

    /// Negative numbers are never valid.
    #[test]
    fn negative_amounts_are_invalid(units in 0i64..1_000_000, cents in 0i64..100) {
        let text = format!("-{units}.{cents:02}");
        prop_assert!(!is_valid_currency_amount(&text));
    }

    /// Text containing a letter is never an amount.
    #[test]
    fn alphabetic_text_is_invalid(text in "[0-9]{0,4}[a-zA-Z]+[0-9]{0,4}") {
        prop_assert!(!is_valid_currency_amount(&text));
    }

    /// The progress bar always has exactly ten segments and is monotonic in spending.
    #[test]
    fn progress_is_bounded_and_monotonic(
        budget in 0i64..10_000_000,
        spent in prop::collection::vec(1i64..1_000_000, 0..8),
        extra in 1i64..1_000_000,
    ) {
        let mut txs: Vec<_> = spent.iter().copied().map(expense).collect();
        let before = compute_budget_status(Money::new(budget), &txs);
        txs.push(expense(extra));
        let after = compute_budget_status(Money::new(budget), &txs);

        prop_assert!(before.progress.filled() <= PROGRESS_SEGMENTS);
        prop_assert_eq!(before.progress.filled() + before.progress.empty(), PROGRESS_SEGMENTS);
        prop_assert!(after.progress.filled() >= before.progress.filled());
        prop_assert_eq!(after.remaining, after.budget - after.spent);
        if budget == 0 {
            prop_assert_eq!(after.percent_spent.basis_points(), 0);
        }
    }
}
