//! Budget entry model
//!
//! A monthly spending cap for one user and one expense category, with the
//! running total of expenses committed against it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BudgetId, CategoryId, UserId};
use super::money::Money;
use super::period::BudgetMonth;

/// Unique key of a budget entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BudgetKey {
    pub user_id: UserId,
    pub category_id: CategoryId,
    pub month: BudgetMonth,
}

impl BudgetKey {
    pub fn new(user_id: UserId, category_id: CategoryId, month: BudgetMonth) -> Self {
        Self {
            user_id,
            category_id,
            month,
        }
    }
}

/// A budget for a specific category in a specific month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub id: BudgetId,

    pub user_id: UserId,

    pub category_id: CategoryId,

    /// 1..=12
    pub month: u32,

    pub year: i32,

    /// The cap for the month
    pub budget_amount: Money,

    /// Sum of committed expenses for this key
    pub consumed: Money,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl BudgetEntry {
    /// Create a new entry with nothing consumed
    pub fn new(id: BudgetId, key: BudgetKey, budget_amount: Money) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id: key.user_id,
            category_id: key.category_id,
            month: key.month.month(),
            year: key.month.year(),
            budget_amount,
            consumed: Money::zero(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The month this budget covers
    pub fn period(&self) -> BudgetMonth {
        // Entries are validated on load and built from a BudgetMonth otherwise
        BudgetMonth::new(self.year, self.month)
            .unwrap_or_else(|_| BudgetMonth::of(chrono::NaiveDate::MIN))
    }

    pub fn key(&self) -> BudgetKey {
        BudgetKey::new(self.user_id, self.category_id, self.period())
    }

    /// Amount still available this month
    pub fn remaining(&self) -> Money {
        self.budget_amount - self.consumed
    }

    /// Check whether an expense of `amount` fits
    pub fn can_consume(&self, amount: Money) -> bool {
        match self.consumed.checked_add(amount) {
            Some(total) => total <= self.budget_amount,
            None => false,
        }
    }

    /// Add a committed expense
    pub fn consume(&mut self, amount: Money) -> Result<(), BudgetValidationError> {
        if !self.can_consume(amount) {
            return Err(BudgetValidationError::ExceedsBudget {
                needed: amount,
                available: self.remaining(),
            });
        }
        self.consumed += amount;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remove a previously committed expense
    pub fn release(&mut self, amount: Money) -> Result<(), BudgetValidationError> {
        if amount > self.consumed {
            return Err(BudgetValidationError::ReleaseExceedsConsumed {
                released: amount,
                consumed: self.consumed,
            });
        }
        self.consumed -= amount;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Validate the entry
    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if !(1..=12).contains(&self.month) {
            return Err(BudgetValidationError::InvalidMonth(self.month));
        }

        if self.budget_amount.is_negative() {
            return Err(BudgetValidationError::NegativeBudget);
        }

        if self.budget_amount > Money::MAX_AMOUNT {
            return Err(BudgetValidationError::BudgetTooLarge(self.budget_amount));
        }

        if self.consumed.is_negative() {
            return Err(BudgetValidationError::NegativeConsumed);
        }

        if self.budget_amount < self.consumed {
            return Err(BudgetValidationError::BelowConsumed {
                budget_amount: self.budget_amount,
                consumed: self.consumed,
            });
        }

        Ok(())
    }
}

impl fmt::Display for BudgetEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02} budget: {} (consumed: {})",
            self.year, self.month, self.budget_amount, self.consumed
        )
    }
}

/// Validation errors for budget entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    InvalidMonth(u32),
    NegativeBudget,
    BudgetTooLarge(Money),
    NegativeConsumed,
    BelowConsumed { budget_amount: Money, consumed: Money },
    ExceedsBudget { needed: Money, available: Money },
    ReleaseExceedsConsumed { released: Money, consumed: Money },
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMonth(m) => write!(f, "Month must be between 1 and 12, got {}", m),
            Self::NegativeBudget => write!(f, "Budget amount cannot be negative"),
            Self::BudgetTooLarge(amount) => {
                write!(f, "Budget amount {} exceeds the maximum of {}", amount, Money::MAX_AMOUNT)
            }
            Self::NegativeConsumed => write!(f, "Consumed amount cannot be negative"),
            Self::BelowConsumed {
                budget_amount,
                consumed,
            } => write!(
                f,
                "Budget amount {} is below the consumed amount {}",
                budget_amount, consumed
            ),
            Self::ExceedsBudget { needed, available } => {
                write!(f, "Expense of {} exceeds remaining budget {}", needed, available)
            }
            Self::ReleaseExceedsConsumed { released, consumed } => write!(
                f,
                "Cannot release {} from a budget with {} consumed",
                released, consumed
            ),
        }
    }
}

impl std::error::Error for BudgetValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(amount: i64) -> BudgetEntry {
        let key = BudgetKey::new(
            UserId::new(1),
            CategoryId::new(1),
            BudgetMonth::new(2025, 7).unwrap(),
        );
        BudgetEntry::new(BudgetId::new(1), key, Money::from_cents(amount))
    }

    #[test]
    fn test_new_entry() {
        let budget = entry(50000);
        assert_eq!(budget.month, 7);
        assert_eq!(budget.year, 2025);
        assert!(budget.consumed.is_zero());
        assert_eq!(budget.remaining().cents(), 50000);
        assert_eq!(budget.key().month.to_string(), "2025-07");
    }

    #[test]
    fn test_consume_up_to_cap() {
        let mut budget = entry(10000);
        budget.consume(Money::from_cents(9000)).unwrap();
        assert!(budget.can_consume(Money::from_cents(1000)));
        assert!(!budget.can_consume(Money::from_cents(1001)));

        let err = budget.consume(Money::from_cents(5000)).unwrap_err();
        assert_eq!(
            err,
            BudgetValidationError::ExceedsBudget {
                needed: Money::from_cents(5000),
                available: Money::from_cents(1000),
            }
        );
        assert_eq!(budget.consumed.cents(), 9000);
    }

    #[test]
    fn test_release() {
        let mut budget = entry(10000);
        budget.consume(Money::from_cents(4000)).unwrap();
        budget.release(Money::from_cents(1500)).unwrap();
        assert_eq!(budget.consumed.cents(), 2500);

        assert!(budget.release(Money::from_cents(2501)).is_err());
        assert_eq!(budget.consumed.cents(), 2500);
    }

    #[test]
    fn test_validation() {
        let mut budget = entry(10000);
        assert!(budget.validate().is_ok());

        budget.consumed = Money::from_cents(20000);
        assert!(matches!(
            budget.validate(),
            Err(BudgetValidationError::BelowConsumed { .. })
        ));

        budget.consumed = Money::zero();
        budget.month = 13;
        assert_eq!(budget.validate(), Err(BudgetValidationError::InvalidMonth(13)));
    }
}
