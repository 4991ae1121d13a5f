//! Monthly budget summary
//!
//! Every budget entry of a month with its category, plus the month's totals.

use serde::Serialize;

use crate::error::SpendwiseResult;
use crate::models::{BudgetId, BudgetMonth, CategoryId, Money, UserId};
use crate::storage::Storage;

/// One budget row of the summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetLine {
    pub budget_id: BudgetId,
    pub category_id: CategoryId,
    pub category_name: String,
    pub color: String,
    pub budget_amount: Money,
    pub consumed: Money,
    pub remaining: Money,
}

impl BudgetLine {
    /// Share of the budget already spent, 0 when the budget is zero
    pub fn percent_used(&self) -> f64 {
        if self.budget_amount.is_zero() {
            0.0
        } else {
            self.consumed.cents() as f64 * 100.0 / self.budget_amount.cents() as f64
        }
    }
}

/// Budget summary for a single month
#[derive(Debug, Clone, Serialize)]
pub struct BudgetSummary {
    pub period: BudgetMonth,
    pub lines: Vec<BudgetLine>,
    pub total_budget: Money,
    pub total_consumed: Money,
    pub total_remaining: Money,
}

impl BudgetSummary {
    pub fn generate(
        storage: &Storage,
        user_id: UserId,
        period: BudgetMonth,
    ) -> SpendwiseResult<Self> {
        let mut lines = Vec::new();
        for entry in storage.budgets.get_for_period(user_id, period)? {
            // Category deletion is refused while budgets reference it
            let Some(category) = storage.categories.get(entry.category_id)? else {
                tracing::warn!(
                    budget_id = %entry.id,
                    category_id = %entry.category_id,
                    "budget references a missing category"
                );
                continue;
            };
            lines.push(BudgetLine {
                budget_id: entry.id,
                category_id: entry.category_id,
                category_name: category.name,
                color: category.color,
                budget_amount: entry.budget_amount,
                consumed: entry.consumed,
                remaining: entry.remaining(),
            });
        }
        lines.sort_by(|a, b| {
            a.category_name
                .to_lowercase()
                .cmp(&b.category_name.to_lowercase())
        });

        let total_budget: Money = lines.iter().map(|l| l.budget_amount).sum();
        let total_consumed: Money = lines.iter().map(|l| l.consumed).sum();

        Ok(Self {
            period,
            lines,
            total_budget,
            total_consumed,
            total_remaining: total_budget - total_consumed,
        })
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Budget Summary: {}\n", self.period.long_name()));
        output.push_str(&"=".repeat(70));
        output.push('\n');

        if self.lines.is_empty() {
            output.push_str("No budgets set for this month.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<25} {:>12} {:>12} {:>12} {:>6}\n",
            "Category", "Budget", "Consumed", "Remaining", "Used"
        ));
        output.push_str(&"-".repeat(70));
        output.push('\n');

        for line in &self.lines {
            output.push_str(&format!(
                "{:<25} {:>12} {:>12} {:>12} {:>5.0}%\n",
                line.category_name,
                line.budget_amount,
                line.consumed,
                line.remaining,
                line.percent_used()
            ));
        }

        output.push_str(&"-".repeat(70));
        output.push('\n');
        output.push_str(&format!(
            "{:<25} {:>12} {:>12} {:>12}\n",
            "TOTAL", self.total_budget, self.total_consumed, self.total_remaining
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::SpendwisePaths;
    use crate::models::TransactionType;
    use crate::services::{BudgetService, CategoryService, TransactionService};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_budget_summary() {
        let (_temp_dir, storage) = create_test_storage();
        let categories = CategoryService::new(&storage);
        let budgets = BudgetService::new(&storage);
        let txns = TransactionService::new(&storage);

        let rent = categories
            .create_category(ALICE, "Rent", None, TransactionType::Expense)
            .unwrap()
            .id;
        let food = categories
            .create_category(ALICE, "food", None, TransactionType::Expense)
            .unwrap()
            .id;
        budgets.create_budget(ALICE, rent, Money::from_units(1000), 7, 2025).unwrap();
        budgets.create_budget(ALICE, food, Money::from_units(500), 7, 2025).unwrap();
        budgets.create_budget(ALICE, food, Money::from_units(500), 8, 2025).unwrap();

        txns.add_transaction(
            ALICE,
            food,
            TransactionType::Expense,
            Money::from_units(200),
            "groceries",
            NaiveDate::from_ymd_opt(2025, 7, 3).unwrap(),
        )
        .unwrap();

        let july = BudgetMonth::new(2025, 7).unwrap();
        let summary = BudgetSummary::generate(&storage, ALICE, july).unwrap();

        let names: Vec<_> = summary.lines.iter().map(|l| l.category_name.as_str()).collect();
        assert_eq!(names, vec!["food", "Rent"]);
        assert_eq!(summary.lines[0].remaining, Money::from_units(300));
        assert!((summary.lines[0].percent_used() - 40.0).abs() < 1e-9);
        assert_eq!(summary.total_budget, Money::from_units(1500));
        assert_eq!(summary.total_consumed, Money::from_units(200));
        assert_eq!(summary.total_remaining, Money::from_units(1300));

        let output = summary.format_terminal();
        assert!(output.contains("July 2025"));
        assert!(output.contains("1300.00"));

        let bob = BudgetSummary::generate(&storage, BOB, july).unwrap();
        assert!(bob.lines.is_empty());
        assert!(bob.total_budget.is_zero());
    }
}
