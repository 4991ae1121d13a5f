//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod audit;
pub mod budget;
pub mod category;
pub mod config;
pub mod report;
pub mod session;
pub mod transaction;
pub mod user;

pub use audit::handle_audit_command;
pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use config::handle_config_command;
pub use report::{handle_report_command, ReportCommands};
pub use session::Session;
pub use transaction::{handle_transaction_command, TransactionCommands};
pub use user::{handle_user_command, UserCommands};

use chrono::{Local, NaiveDate};

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{BudgetMonth, Money};

/// Parse an amount such as "500", "1,250.50" or "₱42"
pub(crate) fn parse_amount(input: &str) -> SpendwiseResult<Money> {
    Money::parse(input)
        .map_err(|e| SpendwiseError::Validation(format!("Invalid amount '{}': {}", input, e)))
}

/// Parse a YYYY-MM-DD date, defaulting to today
pub(crate) fn parse_date(input: Option<&str>) -> SpendwiseResult<NaiveDate> {
    match input {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            SpendwiseError::Validation(format!("Invalid date '{}'. Use YYYY-MM-DD", s))
        }),
        None => Ok(Local::now().date_naive()),
    }
}

/// Parse a YYYY-MM month, defaulting to the current one
pub(crate) fn parse_month(input: Option<&str>) -> SpendwiseResult<BudgetMonth> {
    match input {
        Some(s) => s
            .parse()
            .map_err(|e| SpendwiseError::Validation(format!("Invalid month '{}': {}", s, e))),
        None => Ok(BudgetMonth::current()),
    }
}
