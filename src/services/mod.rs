//! Business logic for Spendwise
//!
//! Services borrow the [`Storage`](crate::storage::Storage) and take the
//! acting user's id explicitly on every call.

pub mod budget;
pub mod category;
pub mod transaction;
pub mod user;

pub use budget::{budget_month, BudgetService, CategoryBudgets, Consumption};
pub use category::CategoryService;
pub use transaction::{TransactionChanges, TransactionService};
pub use user::UserService;
