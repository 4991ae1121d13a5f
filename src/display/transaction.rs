//! Transaction display formatting

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use super::truncate;
use crate::config::Settings;
use crate::models::{Category, CategoryId, Transaction};

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn category_name(categories: &[Category], id: CategoryId) -> String {
    categories
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| format!("#{}", id))
}

/// Format transactions as a table, in the order given
pub fn format_transaction_list(
    transactions: &[Transaction],
    categories: &[Category],
    settings: &Settings,
) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows = transactions.iter().map(|txn| TransactionRow {
        id: txn.id.to_string(),
        date: txn.date().format(&settings.date_format).to_string(),
        kind: txn.transaction_type.to_string(),
        category: category_name(categories, txn.category_id),
        amount: settings.format_money(txn.amount),
        description: truncate(&txn.description, 30),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::sharp())
        .modify(Columns::single(4), Alignment::right());
    format!("{}\n", table)
}

/// Format transaction details for display
pub fn format_transaction_details(
    txn: &Transaction,
    category_name: &str,
    settings: &Settings,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!(
        "Date:        {}\n",
        txn.transaction_date.format(&format!("{} %H:%M", settings.date_format))
    ));
    output.push_str(&format!("Type:        {}\n", txn.transaction_type));
    output.push_str(&format!("Amount:      {}\n", settings.format_money(txn.amount)));
    output.push_str(&format!("Category:    {}\n", category_name));
    if !txn.description.is_empty() {
        output.push_str(&format!("Description: {}\n", txn.description));
    }

    output
}
