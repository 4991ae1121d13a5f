//! Category model
//!
//! Each category belongs to one user and accepts either income or expense
//! transactions, never both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryId, UserId};
use super::transaction::TransactionType;

/// Color used when none is given
pub const DEFAULT_COLOR: &str = "#9CA3AF";

/// A user-defined income or expense category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    /// Owning user
    pub user_id: UserId,

    pub name: String,

    /// Hex color, "#RRGGBB"
    #[serde(default = "default_color")]
    pub color: String,

    #[serde(rename = "type")]
    pub category_type: TransactionType,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl Category {
    /// Create a new category
    pub fn new(
        id: CategoryId,
        user_id: UserId,
        name: impl Into<String>,
        color: impl Into<String>,
        category_type: TransactionType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            name: name.into(),
            color: color.into(),
            category_type,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_expense(&self) -> bool {
        self.category_type.is_expense()
    }

    /// Check whether this category belongs to the given user
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        if name.len() > 50 {
            return Err(CategoryValidationError::NameTooLong(name.len()));
        }

        if !is_hex_color(&self.color) {
            return Err(CategoryValidationError::InvalidColor(self.color.clone()));
        }

        Ok(())
    }
}

/// Accepts "#RRGGBB"
pub fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
    InvalidColor(String),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Category name too long ({} characters, max 50)", len)
            }
            Self::InvalidColor(color) => {
                write!(f, "Invalid color '{}', expected #RRGGBB", color)
            }
        }
    }
}

impl std::error::Error for CategoryValidationError {}
