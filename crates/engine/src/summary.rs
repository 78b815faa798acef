//! Aggregations used by the summary reports.

use std::collections::HashMap;

use crate::{Money, Transaction, TransactionKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Money,
    pub count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeriodSummary {
    pub income: Money,
    pub expenses: Money,
    pub net: Money,
    /// Expense totals per category, largest first.
    pub by_category: Vec<CategoryTotal>,
}

pub fn summarize(transactions: &[Transaction]) -> PeriodSummary {
    let mut income = Money::ZERO;
    let mut expenses = Money::ZERO;
    let mut per_category: HashMap<&str, (Money, usize)> = HashMap::new();

    for tx in transactions {
        match tx.kind {
            TransactionKind::Income => income += tx.amount,
            TransactionKind::Expense => {
                expenses += tx.amount;
                let entry = per_category
                    .entry(tx.category.as_str())
                    .or_insert((Money::ZERO, 0));
                entry.0 += tx.amount;
                entry.1 += 1;
            }
        }
    }

    let mut by_category: Vec<CategoryTotal> = per_category
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category: category.to_string(),
            total,
            count,
        })
        .collect();
    by_category.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));

    PeriodSummary {
        income,
        expenses,
        net: income - expenses,
        by_category,
    }
}
