//! Category display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Category;

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Color")]
    color: String,
}

/// Format categories as a table
pub fn format_category_list(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found.\n\nRun 'spendwise category add' to create one.\n"
            .to_string();
    }

    let rows = categories.iter().map(|c| CategoryRow {
        id: c.id.to_string(),
        name: c.name.clone(),
        kind: c.category_type.to_string(),
        color: c.color.clone(),
    });

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    format!("{}\n", table)
}

/// Format category details
pub fn format_category_details(category: &Category, transactions: usize, budgets: usize) -> String {
    let mut output = String::new();

    output.push_str(&format!("Category: {}\n", category.name));
    output.push_str(&format!("  ID:           {}\n", category.id));
    output.push_str(&format!("  Type:         {}\n", category.category_type));
    output.push_str(&format!("  Color:        {}\n", category.color));
    output.push_str(&format!("  Transactions: {}\n", transactions));
    output.push_str(&format!("  Budgets:      {}\n", budgets));

    output
}
