//! Transaction CLI commands

use clap::Subcommand;

use super::session::Session;
use super::{parse_amount, parse_date};
use crate::config::Settings;
use crate::display::transaction::{format_transaction_details, format_transaction_list};
use crate::error::SpendwiseResult;
use crate::models::{TransactionId, TransactionType};
use crate::services::{CategoryService, TransactionChanges, TransactionService};
use crate::storage::Storage;

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record income or an expense
    Add {
        /// income or expense
        #[arg(value_name = "TYPE")]
        transaction_type: TransactionType,
        /// Category name or ID
        category: String,
        /// Amount (positive)
        amount: String,
        /// Description
        #[arg(short = 'm', long = "description", default_value = "")]
        description: String,
        /// Transaction date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List transactions, newest first
    List {
        /// Only income or only expenses
        #[arg(short = 't', long = "type")]
        transaction_type: Option<TransactionType>,
        /// Number of transactions to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show transaction details
    Show {
        id: TransactionId,
    },

    /// Change a transaction; its type stays the same
    Edit {
        id: TransactionId,
        /// New category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// New amount
        #[arg(short, long)]
        amount: Option<String>,
        /// New description
        #[arg(short = 'm', long = "description")]
        description: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Delete a transaction
    Delete {
        id: TransactionId,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    session: &Session,
    cmd: TransactionCommands,
) -> SpendwiseResult<()> {
    let user = session.login(storage)?;
    let service = TransactionService::new(storage);
    let categories = CategoryService::new(storage);

    match cmd {
        TransactionCommands::Add {
            transaction_type,
            category,
            amount,
            description,
            date,
        } => {
            let cat = categories.find_category(user.id, &category, Some(transaction_type))?;
            let amount = parse_amount(&amount)?;
            let date = parse_date(date.as_deref())?;

            let txn = service.add_transaction(
                user.id,
                cat.id,
                transaction_type,
                amount,
                &description,
                date,
            )?;
            session.emit(txn, |t| {
                format!(
                    "Added {} of {} to {}\n  ID: {}\n",
                    t.transaction_type,
                    settings.format_money(t.amount),
                    cat.name,
                    t.id
                )
            })?;
        }

        TransactionCommands::List {
            transaction_type,
            limit,
        } => {
            let mut transactions = match transaction_type {
                Some(t) => service.list_by_type(user.id, t)?,
                None => service.list_transactions(user.id)?,
            };
            if let Some(limit) = limit {
                transactions.truncate(limit);
            }
            let all_categories = categories.list_categories(user.id)?;
            session.emit(transactions, |t| {
                format_transaction_list(t, &all_categories, settings)
            })?;
        }

        TransactionCommands::Show { id } => {
            let txn = service.get_transaction(user.id, id)?;
            let name = categories.get_category(user.id, txn.category_id)?.name;
            session.emit(txn, |t| format_transaction_details(t, &name, settings))?;
        }

        TransactionCommands::Edit {
            id,
            category,
            amount,
            description,
            date,
        } => {
            let txn = service.get_transaction(user.id, id)?;
            let mut changes = TransactionChanges::from_existing(&txn);

            if let Some(c) = category {
                changes.category_id = categories
                    .find_category(user.id, &c, Some(txn.transaction_type))?
                    .id;
            }
            if let Some(a) = amount {
                changes.amount = parse_amount(&a)?;
            }
            if let Some(d) = description {
                changes.description = d;
            }
            if let Some(d) = date {
                changes.date = parse_date(Some(&d))?;
            }

            let updated = service.update_transaction(user.id, id, changes)?;
            let name = categories.get_category(user.id, updated.category_id)?.name;
            session.emit(updated, |t| format_transaction_details(t, &name, settings))?;
        }

        TransactionCommands::Delete { id } => {
            let deleted = service.delete_transaction(user.id, id)?;
            session.emit(deleted, |t| {
                format!(
                    "Deleted {} of {} ({})\n",
                    t.transaction_type,
                    settings.format_money(t.amount),
                    t.id
                )
            })?;
        }
    }

    Ok(())
}
