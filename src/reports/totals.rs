//! Income/expense totals and per-category breakdowns

use serde::Serialize;
use std::collections::HashMap;

use crate::error::SpendwiseResult;
use crate::models::{BudgetMonth, CategoryId, Money, Transaction, TransactionType, UserId};
use crate::storage::Storage;

/// Lifetime income, expenses and what is left
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeTotals {
    pub total_income: Money,
    pub total_expenses: Money,
    /// Income minus expenses; negative when overspent
    pub remaining_balance: Money,
}

impl TypeTotals {
    pub fn generate(storage: &Storage, user_id: UserId) -> SpendwiseResult<Self> {
        let transactions = storage.transactions.get_for_user(user_id)?;
        Ok(Self::from_transactions(&transactions))
    }

    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let (income, expenses): (Vec<&Transaction>, Vec<&Transaction>) =
            transactions.iter().partition(|t| !t.is_expense());
        let total_income: Money = income.iter().map(|t| t.amount).sum();
        let total_expenses: Money = expenses.iter().map(|t| t.amount).sum();

        Self {
            total_income,
            total_expenses,
            remaining_balance: total_income - total_expenses,
        }
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("{:<20} {:>14}\n", "Total Income:", self.total_income));
        output.push_str(&format!("{:<20} {:>14}\n", "Total Expenses:", self.total_expenses));
        output.push_str(&"-".repeat(35));
        output.push('\n');
        output.push_str(&format!(
            "{:<20} {:>14}\n",
            "Remaining Balance:", self.remaining_balance
        ));
        output
    }
}

/// One category's share of a breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category_id: CategoryId,
    pub name: String,
    pub color: String,
    pub total: Money,
    pub transaction_count: usize,
    pub percentage: f64,
}

/// Per-category sums for one transaction type
///
/// Categories with nothing recorded are left out. Rows are ordered by total,
/// largest first, then by name.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryTotals {
    pub transaction_type: TransactionType,
    /// Restricts the breakdown to one month when set
    pub period: Option<BudgetMonth>,
    pub rows: Vec<CategoryTotal>,
    pub total: Money,
}

impl CategoryTotals {
    pub fn generate(
        storage: &Storage,
        user_id: UserId,
        transaction_type: TransactionType,
        period: Option<BudgetMonth>,
    ) -> SpendwiseResult<Self> {
        let categories = storage.categories.get_by_type(user_id, transaction_type)?;

        let mut sums: HashMap<CategoryId, (Money, usize)> = HashMap::new();
        for txn in storage.transactions.get_for_user(user_id)? {
            if txn.transaction_type != transaction_type {
                continue;
            }
            if period.map_or(false, |p| !p.contains(txn.date())) {
                continue;
            }
            let entry = sums.entry(txn.category_id).or_insert((Money::zero(), 0));
            entry.0 += txn.amount;
            entry.1 += 1;
        }

        let total: Money = sums.values().map(|(sum, _)| *sum).sum();

        let mut rows: Vec<CategoryTotal> = categories
            .into_iter()
            .filter_map(|category| {
                let (sum, count) = sums.get(&category.id).copied()?;
                if sum.is_zero() {
                    return None;
                }
                Some(CategoryTotal {
                    category_id: category.id,
                    name: category.name,
                    color: category.color,
                    total: sum,
                    transaction_count: count,
                    percentage: percentage(sum, total),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));

        Ok(Self {
            transaction_type,
            period,
            rows,
            total,
        })
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        let title = match self.transaction_type {
            TransactionType::Income => "Income by Category",
            TransactionType::Expense => "Expenses by Category",
        };
        match self.period {
            Some(period) => output.push_str(&format!("{}: {}\n", title, period.long_name())),
            None => output.push_str(&format!("{}\n", title)),
        }
        output.push_str(&"=".repeat(60));
        output.push('\n');

        if self.rows.is_empty() {
            output.push_str("No transactions recorded.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<30} {:>12} {:>6} {:>8}\n",
            "Category", "Amount", "Count", "%"
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for row in &self.rows {
            output.push_str(&format!(
                "{:<30} {:>12} {:>6} {:>7.1}%\n",
                row.name, row.total, row.transaction_count, row.percentage
            ));
        }
        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!("{:<30} {:>12}\n", "TOTAL", self.total));

        output
    }
}

fn percentage(part: Money, whole: Money) -> f64 {
    if whole.is_zero() {
        0.0
    } else {
        part.cents() as f64 * 100.0 / whole.cents() as f64
    }
}
