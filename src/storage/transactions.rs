//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions to transactions.json

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::SpendwiseResult;
use crate::models::{BudgetKey, CategoryId, Money, Transaction, TransactionId, UserId};

use super::collection::{Collection, CollectionState, Record};

impl Record for Transaction {
    type Id = TransactionId;
    const COLLECTION: &'static str = "transactions";

    fn id(&self) -> TransactionId {
        self.id
    }

    fn check(&self) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())
    }
}

/// Newest first: transaction date descending, then creation time descending
pub fn newest_first(a: &Transaction, b: &Transaction) -> std::cmp::Ordering {
    b.transaction_date
        .cmp(&a.transaction_date)
        .then(b.created_at.cmp(&a.created_at))
        .then(b.id.cmp(&a.id))
}

/// Repository for transaction persistence
pub struct TransactionRepository {
    collection: Collection<Transaction>,
}

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            collection: Collection::new(path),
        }
    }

    pub fn load(&self) -> SpendwiseResult<()> {
        self.collection.load()
    }

    pub fn save(&self) -> SpendwiseResult<()> {
        self.collection.save()
    }

    pub fn get(&self, id: TransactionId) -> SpendwiseResult<Option<Transaction>> {
        self.collection.get(id)
    }

    /// All transactions of a user, newest first
    pub fn get_for_user(&self, user_id: UserId) -> SpendwiseResult<Vec<Transaction>> {
        let mut list: Vec<_> = self.collection.query(|state| {
            state
                .values()
                .filter(|t| t.user_id == user_id)
                .cloned()
                .collect()
        })?;
        list.sort_by(newest_first);
        Ok(list)
    }

    /// A user's transactions with dates in `[start, end]`, newest first
    pub fn get_by_date_range(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> SpendwiseResult<Vec<Transaction>> {
        let mut list = self.get_for_user(user_id)?;
        list.retain(|t| t.date() >= start && t.date() <= end);
        Ok(list)
    }

    /// Count transactions referencing a category
    pub fn count_for_category(&self, category_id: CategoryId) -> SpendwiseResult<usize> {
        self.collection.query(|state| {
            state
                .values()
                .filter(|t| t.category_id == category_id)
                .count()
        })
    }

    /// Sum of committed expenses for a budget key
    pub fn expense_total(&self, key: &BudgetKey) -> SpendwiseResult<Money> {
        self.collection.query(|state| {
            state
                .values()
                .filter(|t| {
                    t.is_expense()
                        && t.user_id == key.user_id
                        && t.category_id == key.category_id
                        && t.month() == key.month
                })
                .map(|t| t.amount)
                .sum()
        })
    }

    pub fn count(&self) -> SpendwiseResult<usize> {
        self.collection.count()
    }

    /// Apply a mutation as one write of transactions.json
    pub fn commit<R>(
        &self,
        f: impl FnOnce(&mut CollectionState<Transaction>) -> SpendwiseResult<R>,
    ) -> SpendwiseResult<R> {
        self.collection.commit(f)
    }
}
