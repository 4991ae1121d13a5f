//! Budget CLI commands
//!
//! Monthly budgets per expense category. Months are given as YYYY-MM and
//! default to the current month.

use clap::Subcommand;

use super::session::Session;
use super::{parse_amount, parse_month};
use crate::config::Settings;
use crate::display::budget::{format_budget_details, format_budget_list};
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{BudgetId, TransactionType};
use crate::services::{BudgetService, CategoryService};
use crate::storage::Storage;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set a category's budget for a month
    Set {
        /// Expense category name or ID
        category: String,
        /// Budget amount
        amount: String,
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Change an existing budget
    Edit {
        /// Budget ID
        id: BudgetId,
        /// Move the budget to another category
        #[arg(short, long)]
        category: Option<String>,
        /// New amount
        #[arg(short, long)]
        amount: Option<String>,
        /// Move the budget to another month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Delete a budget
    Delete {
        /// Budget ID
        id: BudgetId,
    },

    /// List all budgets by category
    List,

    /// Show one category's budget for a month
    Show {
        /// Expense category name or ID
        category: String,
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    settings: &Settings,
    session: &Session,
    cmd: BudgetCommands,
) -> SpendwiseResult<()> {
    let user = session.login(storage)?;
    let budgets = BudgetService::new(storage);
    let categories = CategoryService::new(storage);

    match cmd {
        BudgetCommands::Set {
            category,
            amount,
            month,
        } => {
            let cat = categories.find_category(user.id, &category, Some(TransactionType::Expense))?;
            let amount = parse_amount(&amount)?;
            let period = parse_month(month.as_deref())?;

            let entry =
                budgets.create_budget(user.id, cat.id, amount, period.month(), period.year())?;
            session.emit(entry, |e| {
                format!(
                    "Set budget for {} in {}: {}\n  ID: {}\n",
                    cat.name,
                    period.long_name(),
                    settings.format_money(e.budget_amount),
                    e.id
                )
            })?;
        }

        BudgetCommands::Edit {
            id,
            category,
            amount,
            month,
        } => {
            let current = budgets.get_budget_by_id(user.id, id)?;
            let category_id = match category {
                Some(c) => {
                    categories
                        .find_category(user.id, &c, Some(TransactionType::Expense))?
                        .id
                }
                None => current.category_id,
            };
            let amount = match amount {
                Some(a) => parse_amount(&a)?,
                None => current.budget_amount,
            };
            let period = match month {
                Some(m) => parse_month(Some(&m))?,
                None => current.period(),
            };

            let updated = budgets.update_budget(
                user.id,
                id,
                category_id,
                amount,
                current.consumed,
                period.month(),
                period.year(),
            )?;
            let name = categories.get_category(user.id, updated.category_id)?.name;
            session.emit(updated, |e| format_budget_details(e, &name, settings))?;
        }

        BudgetCommands::Delete { id } => {
            let deleted = budgets.delete_budget(user.id, id)?;
            session.emit(deleted, |e| format!("Deleted budget {} for {}\n", e.id, e.period()))?;
        }

        BudgetCommands::List => {
            let groups = budgets.list_budgets_by_category(user.id)?;
            session.emit(groups, |g| format_budget_list(g, settings))?;
        }

        BudgetCommands::Show { category, month } => {
            let cat = categories.find_category(user.id, &category, Some(TransactionType::Expense))?;
            let period = parse_month(month.as_deref())?;
            let entry = budgets
                .get_budget(user.id, cat.id, period.month(), period.year())?
                .ok_or_else(|| SpendwiseError::NoBudgetSet {
                    category: cat.name.clone(),
                    month: period.month(),
                    year: period.year(),
                })?;
            session.emit(entry, |e| format_budget_details(e, &cat.name, settings))?;
        }
    }

    Ok(())
}
