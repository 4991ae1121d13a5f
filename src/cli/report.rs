//! CLI commands for reports

use clap::Subcommand;

use super::parse_month;
use super::session::Session;
use crate::config::Settings;
use crate::error::SpendwiseResult;
use crate::models::TransactionType;
use crate::reports::{BudgetSummary, CategoryTotals, DailyTotals, MonthlyTotals, TypeTotals};
use crate::storage::Storage;

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Lifetime income, expenses and remaining balance
    Totals,

    /// Totals per category for one transaction type
    Categories {
        /// income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        transaction_type: TransactionType,
        /// Restrict to one month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Expenses per day
    Daily {
        /// Restrict to one month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Income and expenses per month
    Monthly,

    /// Budget, consumed and remaining for each category in a month
    Budget {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
}

/// Handle a report command
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    session: &Session,
    cmd: ReportCommands,
) -> SpendwiseResult<()> {
    let user = session.login(storage)?;

    match cmd {
        ReportCommands::Totals => {
            let report = TypeTotals::generate(storage, user.id)?;
            session.emit(report, |r| r.format_terminal())?;
        }

        ReportCommands::Categories {
            transaction_type,
            month,
        } => {
            let period = month.as_deref().map(|m| parse_month(Some(m))).transpose()?;
            let report = CategoryTotals::generate(storage, user.id, transaction_type, period)?;
            session.emit(report, |r| r.format_terminal())?;
        }

        ReportCommands::Daily { month } => {
            let period = month.as_deref().map(|m| parse_month(Some(m))).transpose()?;
            let report = DailyTotals::generate(storage, user.id, period)?;
            session.emit(report, |r| r.format_terminal(&settings.date_format))?;
        }

        ReportCommands::Monthly => {
            let report = MonthlyTotals::generate(storage, user.id)?;
            session.emit(report, |r| r.format_terminal())?;
        }

        ReportCommands::Budget { month } => {
            let period = parse_month(month.as_deref())?;
            let report = BudgetSummary::generate(storage, user.id, period)?;
            session.emit(report, |r| r.format_terminal())?;
        }
    }

    Ok(())
}
