//! Transaction model
//!
//! Income and expense records. Expense amounts count against the monthly
//! budget of their category.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{CategoryId, TransactionId, UserId};
use super::money::Money;
use super::period::BudgetMonth;

/// Direction of money flow. Categories carry one too, and a transaction's
/// type must match its category's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn is_expense(&self) -> bool {
        matches!(self, Self::Expense)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("Unknown transaction type: {}", other)),
        }
    }
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    pub user_id: UserId,

    pub category_id: CategoryId,

    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    /// Always positive; direction comes from `transaction_type`
    pub amount: Money,

    #[serde(default)]
    pub description: String,

    /// Date chosen by the user with the time of day it was recorded
    pub transaction_date: NaiveDateTime,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction stamped with the given time of day
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: TransactionId,
        user_id: UserId,
        category_id: CategoryId,
        transaction_type: TransactionType,
        amount: Money,
        description: impl Into<String>,
        date: NaiveDate,
        time_of_day: NaiveTime,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            category_id,
            transaction_type,
            amount,
            description: description.into(),
            transaction_date: date.and_time(time_of_day),
            created_at: now,
            updated_at: now,
        }
    }

    /// Calendar date of the transaction
    pub fn date(&self) -> NaiveDate {
        self.transaction_date.date()
    }

    /// The budget month this transaction falls into
    pub fn month(&self) -> BudgetMonth {
        BudgetMonth::of(self.date())
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type.is_expense()
    }

    /// Move to a new date, keeping the recorded time of day
    pub fn set_date(&mut self, date: NaiveDate) {
        self.transaction_date = date.and_time(self.transaction_date.time());
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        validate_amount(self.amount)?;
        validate_description(&self.description)
    }
}

/// Descriptions are limited to 255 characters
pub fn validate_description(description: &str) -> Result<(), TransactionValidationError> {
    let len = description.chars().count();
    if len > 255 {
        return Err(TransactionValidationError::DescriptionTooLong(len));
    }
    Ok(())
}

/// Transaction amounts must be strictly positive and at most [`Money::MAX_AMOUNT`]
pub fn validate_amount(amount: Money) -> Result<(), TransactionValidationError> {
    if !amount.is_positive() {
        return Err(TransactionValidationError::NonPositiveAmount(amount));
    }
    if amount > Money::MAX_AMOUNT {
        return Err(TransactionValidationError::AmountTooLarge(amount));
    }
    Ok(())
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.transaction_date.format("%Y-%m-%d"),
            self.transaction_type,
            self.amount
        )?;
        if !self.description.is_empty() {
            write!(f, " ({})", self.description)?;
        }
        Ok(())
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
    DescriptionTooLong(usize),
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Amount must be greater than zero, got {}", amount)
            }
            Self::AmountTooLarge(amount) => {
                write!(f, "Amount {} exceeds the maximum of {}", amount, Money::MAX_AMOUNT)
            }
            Self::DescriptionTooLong(len) => {
                write!(f, "Description too long ({} characters, max 255)", len)
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        Transaction::new(
            TransactionId::new(1),
            UserId::new(1),
            CategoryId::new(2),
            TransactionType::Expense,
            Money::from_cents(2500),
            "Lunch",
            NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(),
            NaiveTime::from_hms_opt(12, 30, 5).unwrap(),
        )
    }

    #[test]
    fn test_new_appends_time_of_day() {
        let txn = sample();
        assert_eq!(
            txn.transaction_date.to_string(),
            "2025-07-31 12:30:05"
        );
        assert_eq!(txn.month(), BudgetMonth::new(2025, 7).unwrap());
    }

    #[test]
    fn test_set_date_keeps_time() {
        let mut txn = sample();
        txn.set_date(NaiveDate::from_ymd_opt(2025, 8, 2).unwrap());
        assert_eq!(txn.transaction_date.to_string(), "2025-08-02 12:30:05");
    }

    #[test]
    fn test_validation() {
        let mut txn = sample();
        assert!(txn.validate().is_ok());

        txn.amount = Money::zero();
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::NonPositiveAmount(Money::zero()))
        );

        txn.amount = Money::MAX_AMOUNT;
        assert!(txn.validate().is_ok());

        let too_large = Money::MAX_AMOUNT + Money::from_cents(1);
        txn.amount = too_large;
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::AmountTooLarge(too_large))
        );
    }

    #[test]
    fn test_type_parse() {
        assert_eq!(" Expense ".parse::<TransactionType>(), Ok(TransactionType::Expense));
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_serialization() {
        let txn = sample();
        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["type"], "expense");
        assert_eq!(json["amount"], 2500);

        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back.transaction_date, txn.transaction_date);
    }
}
