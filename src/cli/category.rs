//! Category CLI commands

use clap::Subcommand;

use super::session::Session;
use crate::display::category::{format_category_details, format_category_list};
use crate::error::SpendwiseResult;
use crate::models::TransactionType;
use crate::services::CategoryService;
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Create a new category
    Add {
        /// Category name
        name: String,
        /// income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        category_type: TransactionType,
        /// Hex color, e.g. "#FF8800"
        #[arg(short, long)]
        color: Option<String>,
    },

    /// List categories
    List {
        /// Only income or only expense categories
        #[arg(short = 't', long = "type")]
        category_type: Option<TransactionType>,
    },

    /// Show category details
    Show {
        /// Category name or ID
        category: String,
    },

    /// Rename or recolor a category
    Edit {
        /// Category name or ID
        category: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New color
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Delete an unused category
    Delete {
        /// Category name or ID
        category: String,
    },
}

/// Handle a category command
pub fn handle_category_command(
    storage: &Storage,
    session: &Session,
    cmd: CategoryCommands,
) -> SpendwiseResult<()> {
    let user = session.login(storage)?;
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::Add {
            name,
            category_type,
            color,
        } => {
            let category =
                service.create_category(user.id, &name, color.as_deref(), category_type)?;
            session.emit(category, |c| {
                format!("Created {} category: {}\n  ID: {}\n", c.category_type, c.name, c.id)
            })?;
        }

        CategoryCommands::List { category_type } => {
            let categories = match category_type {
                Some(t) => service.list_by_type(user.id, t)?,
                None => service.list_categories(user.id)?,
            };
            session.emit(categories, |c| format_category_list(c))?;
        }

        CategoryCommands::Show { category } => {
            let cat = service.find_category(user.id, &category, None)?;
            let transactions = storage.transactions.count_for_category(cat.id)?;
            let budgets = storage.budgets.count_for_category(cat.id)?;
            session.emit(cat, |c| format_category_details(c, transactions, budgets))?;
        }

        CategoryCommands::Edit {
            category,
            name,
            color,
        } => {
            let cat = service.find_category(user.id, &category, None)?;

            if name.is_none() && color.is_none() {
                println!("No changes specified. Use --name or --color.");
                return Ok(());
            }

            let updated =
                service.update_category(user.id, cat.id, name.as_deref(), color.as_deref())?;
            session.emit(updated, |c| format!("Updated category: {}\n", c.name))?;
        }

        CategoryCommands::Delete { category } => {
            let cat = service.find_category(user.id, &category, None)?;
            let deleted = service.delete_category(user.id, cat.id)?;
            session.emit(deleted, |c| format!("Deleted category: {}\n", c.name))?;
        }
    }

    Ok(())
}
