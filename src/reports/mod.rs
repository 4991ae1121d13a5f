//! Reports module
//!
//! Read-only views over a user's transactions and budgets.

pub mod budget_summary;
pub mod rollup;
pub mod totals;

pub use budget_summary::{BudgetLine, BudgetSummary};
pub use rollup::{DailyTotal, DailyTotals, MonthlyTotal, MonthlyTotals};
pub use totals::{CategoryTotal, CategoryTotals, TypeTotals};
