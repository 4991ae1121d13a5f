//! Core data models for Spendwise
//!
//! This module contains the data structures of the budgeting domain: users,
//! categories, transactions and monthly budget entries.

pub mod budget;
pub mod category;
pub mod ids;
pub mod money;
pub mod period;
pub mod transaction;
pub mod user;

pub use budget::{BudgetEntry, BudgetKey};
pub use category::{Category, DEFAULT_COLOR};
pub use ids::{BudgetId, CategoryId, TransactionId, UserId};
pub use money::Money;
pub use period::BudgetMonth;
pub use transaction::{Transaction, TransactionType};
pub use user::{User, UserProfile, UserType};
