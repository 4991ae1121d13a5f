//! Budget display formatting

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::config::Settings;
use crate::models::BudgetEntry;
use crate::services::CategoryBudgets;

#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Budget")]
    budget: String,
    #[tabled(rename = "Consumed")]
    consumed: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
}

/// Format budget entries grouped by category as one table
pub fn format_budget_list(groups: &[CategoryBudgets], settings: &Settings) -> String {
    if groups.is_empty() {
        return "No budgets found.\n\nRun 'spendwise budget set' to create one.\n".to_string();
    }

    let rows = groups.iter().flat_map(|group| {
        group.budgets.iter().map(move |entry| BudgetRow {
            id: entry.id.to_string(),
            category: group.category.name.clone(),
            period: entry.period().to_string(),
            budget: settings.format_money(entry.budget_amount),
            consumed: settings.format_money(entry.consumed),
            remaining: settings.format_money(entry.remaining()),
        })
    });

    let mut table = Table::new(rows);
    table
        .with(Style::sharp())
        .modify(Columns::new(3..), Alignment::right());
    format!("{}\n", table)
}

/// Format a single budget entry
pub fn format_budget_details(entry: &BudgetEntry, category_name: &str, settings: &Settings) -> String {
    let mut output = String::new();

    output.push_str(&format!("Budget: {} {}\n", category_name, entry.period().long_name()));
    output.push_str(&format!("  ID:        {}\n", entry.id));
    output.push_str(&format!("  Budget:    {}\n", settings.format_money(entry.budget_amount)));
    output.push_str(&format!("  Consumed:  {}\n", settings.format_money(entry.consumed)));
    output.push_str(&format!("  Remaining: {}\n", settings.format_money(entry.remaining())));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BudgetId, BudgetKey, BudgetMonth, Category, CategoryId, Money, TransactionType, UserId,
    };

    fn food_budget() -> (Category, BudgetEntry) {
        let food = Category::new(
            CategoryId::new(1),
            UserId::new(1),
            "Food",
            "#FF0000",
            TransactionType::Expense,
        );
        let key = BudgetKey::new(food.user_id, food.id, BudgetMonth::new(2025, 7).unwrap());
        let mut entry = BudgetEntry::new(BudgetId::new(4), key, Money::from_units(500));
        entry.consume(Money::from_units(200)).unwrap();
        (food, entry)
    }

    #[test]
    fn test_budget_list() {
        let (category, entry) = food_budget();
        let groups = vec![CategoryBudgets {
            category,
            budgets: vec![entry],
        }];
        let output = format_budget_list(&groups, &Settings::default());
        assert!(output.contains("Food"));
        assert!(output.contains("2025-07"));
        assert!(output.contains("₱300.00"));
    }

    #[test]
    fn test_budget_details() {
        let (_, entry) = food_budget();
        let output = format_budget_details(&entry, "Food", &Settings::default());
        assert!(output.contains("Budget: Food July 2025"));
        assert!(output.contains("Consumed:  ₱200.00"));
    }

    #[test]
    fn test_empty_budget_list() {
        assert!(format_budget_list(&[], &Settings::default()).contains("No budgets found"));
    }
}
