//! Custom error types for Spendwise
//!
//! Every failure the ledgers can produce is a variant here, so callers can
//! decide presentation without parsing messages.

use thiserror::Error;

use crate::models::Money;

/// The main error type for Spendwise operations
#[derive(Error, Debug)]
pub enum SpendwiseError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Malformed input: amounts, dates, colors, category type mismatches
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found, or owned by another user
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// A budget already exists for the (user, category, month, year) key
    #[error("A budget for '{category}' already exists for {year}-{month:02}")]
    DuplicateBudget {
        category: String,
        month: u32,
        year: i32,
    },

    /// Budget amount would drop below what has already been consumed
    #[error("Budget amount {budget_amount} is below the consumed amount {consumed}")]
    InvalidAmount { budget_amount: Money, consumed: Money },

    /// Expense attempted for a month with no budget
    #[error("No budget set for '{category}' in {year}-{month:02}")]
    NoBudgetSet {
        category: String,
        month: u32,
        year: i32,
    },

    /// Expense would exceed the monthly budget
    #[error("Insufficient budget in '{category}': need {needed}, have {available}")]
    InsufficientBudget {
        category: String,
        needed: Money,
        available: Money,
    },

    /// Category is still referenced
    #[error(
        "Category '{category}' is in use by {transactions} transaction(s) and {budgets} budget(s)"
    )]
    CategoryInUse {
        category: String,
        transactions: usize,
        budgets: usize,
    },

    /// Unknown user or wrong password
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SpendwiseError {
    /// Create a "not found" error for users
    pub fn user_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "User",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for budgets
    pub fn budget_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error was caused by the caller's identity
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::InvalidCredentials)
    }
}

impl From<std::io::Error> for SpendwiseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SpendwiseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Spendwise operations
pub type SpendwiseResult<T> = Result<T, SpendwiseError>;
