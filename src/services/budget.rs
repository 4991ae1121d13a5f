//! Budget service
//!
//! Monthly budget entries per (user, category, month, year) and the
//! consumption bookkeeping the transaction ledger drives. `consumed` always
//! equals the sum of committed expenses for the entry's key.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::audit::EntityType;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{
    BudgetEntry, BudgetId, BudgetKey, BudgetMonth, Category, CategoryId, Money, UserId,
};
use crate::storage::{Storage, WriteGuard};

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

/// One expense's claim on a budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Consumption {
    pub category_id: CategoryId,
    pub date: NaiveDate,
    pub amount: Money,
}

impl Consumption {
    pub fn new(category_id: CategoryId, date: NaiveDate, amount: Money) -> Self {
        Self {
            category_id,
            date,
            amount,
        }
    }

    fn key(&self, user_id: UserId) -> BudgetKey {
        BudgetKey::new(user_id, self.category_id, BudgetMonth::of(self.date))
    }
}

/// A category with all of its budget entries, newest first
#[derive(Debug, Clone, Serialize)]
pub struct CategoryBudgets {
    pub category: Category,
    pub budgets: Vec<BudgetEntry>,
}

/// Budget amounts are non-negative and no larger than [`Money::MAX_AMOUNT`]
fn check_budget_amount(amount: Money) -> SpendwiseResult<()> {
    if amount.is_negative() {
        return Err(SpendwiseError::Validation(
            "Budget amount cannot be negative".into(),
        ));
    }
    if amount > Money::MAX_AMOUNT {
        return Err(SpendwiseError::Validation(format!(
            "Budget amount cannot exceed {}",
            Money::MAX_AMOUNT
        )));
    }
    Ok(())
}

/// Validate a (month, year) pair coming from a caller
pub fn budget_month(month: u32, year: i32) -> SpendwiseResult<BudgetMonth> {
    BudgetMonth::new(year, month).map_err(|e| SpendwiseError::Validation(e.to_string()))
}

impl<'a> BudgetService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Look up the entry for a key
    pub fn get_budget(
        &self,
        user_id: UserId,
        category_id: CategoryId,
        month: u32,
        year: i32,
    ) -> SpendwiseResult<Option<BudgetEntry>> {
        let key = BudgetKey::new(user_id, category_id, budget_month(month, year)?);
        self.storage.budgets.get_by_key(&key)
    }

    /// Look up an entry by id, scoped to its owner
    pub fn get_budget_by_id(&self, user_id: UserId, id: BudgetId) -> SpendwiseResult<BudgetEntry> {
        self.storage
            .budgets
            .get(id)?
            .filter(|b| b.user_id == user_id)
            .ok_or_else(|| SpendwiseError::budget_not_found(id.to_string()))
    }

    /// Create a budget for a month
    ///
    /// `consumed` starts at the total of expenses already recorded for the
    /// key, which is zero unless an earlier budget for it was deleted.
    pub fn create_budget(
        &self,
        user_id: UserId,
        category_id: CategoryId,
        amount: Money,
        month: u32,
        year: i32,
    ) -> SpendwiseResult<BudgetEntry> {
        let period = budget_month(month, year)?;
        check_budget_amount(amount)?;

        let _writes = self.storage.lock_writes()?;
        let category = self.expense_category(user_id, category_id)?;
        let key = BudgetKey::new(user_id, category_id, period);
        let consumed = self.storage.transactions.expense_total(&key)?;
        if consumed > amount {
            return Err(SpendwiseError::InvalidAmount {
                budget_amount: amount,
                consumed,
            });
        }

        let entry = self.storage.budgets.commit(|state| {
            if state.find_by_key(&key).is_some() {
                return Err(duplicate(&category, period));
            }

            let id = state.allocate_id();
            let mut entry = BudgetEntry::new(id, key, amount);
            entry.consumed = consumed;
            state.insert(entry.clone());
            Ok(entry)
        })?;

        tracing::info!(
            budget_id = %entry.id,
            category = %category.name,
            period = %period,
            amount = %amount,
            "budget created"
        );
        self.storage.log_create(
            EntityType::Budget,
            entry.id,
            Some(user_id),
            Some(format!("{} {}", category.name, period)),
            &entry,
        );

        Ok(entry)
    }

    /// Replace a budget's category, amount and period
    ///
    /// `consumed` is the caller's view of the entry and must match the
    /// stored value. An entry moved to another category or month picks up
    /// the expenses already recorded under its new key.
    #[allow(clippy::too_many_arguments)]
    pub fn update_budget(
        &self,
        user_id: UserId,
        id: BudgetId,
        category_id: CategoryId,
        amount: Money,
        consumed: Money,
        month: u32,
        year: i32,
    ) -> SpendwiseResult<BudgetEntry> {
        let _writes = self.storage.lock_writes()?;
        let before = self.get_budget_by_id(user_id, id)?;

        if consumed != before.consumed {
            return Err(SpendwiseError::Validation(format!(
                "Budget changed since it was read: consumed is now {}, not {}",
                before.consumed, consumed
            )));
        }
        let period = budget_month(month, year)?;
        check_budget_amount(amount)?;

        let category = self.expense_category(user_id, category_id)?;
        let key = BudgetKey::new(user_id, category_id, period);
        let moved = key != before.key();
        // A moved entry takes over whatever is already spent under its new key
        let carried = if moved {
            self.storage.transactions.expense_total(&key)?
        } else {
            before.consumed
        };
        if amount < carried {
            return Err(SpendwiseError::InvalidAmount {
                budget_amount: amount,
                consumed: carried,
            });
        }

        let after = self.storage.budgets.commit(|state| {
            if let Some(other) = state.find_by_key(&key) {
                if other.id != id {
                    return Err(duplicate(&category, period));
                }
            }
            if moved && before.consumed.is_positive() {
                return Err(SpendwiseError::Validation(format!(
                    "Cannot move a budget with {} already consumed to another category or month",
                    before.consumed
                )));
            }

            let entry = state
                .get_mut(id)
                .ok_or_else(|| SpendwiseError::budget_not_found(id.to_string()))?;
            entry.category_id = category_id;
            entry.month = period.month();
            entry.year = period.year();
            entry.budget_amount = amount;
            entry.consumed = carried;
            entry.updated_at = Utc::now();
            Ok(entry.clone())
        })?;

        tracing::info!(budget_id = %id, amount = %amount, period = %period, "budget updated");
        self.storage.log_update(
            EntityType::Budget,
            id,
            Some(user_id),
            Some(format!("{} {}", category.name, period)),
            &before,
            &after,
        );

        Ok(after)
    }

    /// Delete a budget entry. Transactions are left alone.
    pub fn delete_budget(&self, user_id: UserId, id: BudgetId) -> SpendwiseResult<BudgetEntry> {
        let _writes = self.storage.lock_writes()?;
        self.get_budget_by_id(user_id, id)?;

        let removed = self.storage.budgets.commit(|state| {
            state
                .remove(id)
                .ok_or_else(|| SpendwiseError::budget_not_found(id.to_string()))
        })?;

        tracing::info!(budget_id = %id, "budget deleted");
        self.storage.log_delete(
            EntityType::Budget,
            id,
            Some(user_id),
            Some(removed.period().to_string()),
            &removed,
        );

        Ok(removed)
    }

    /// Count an expense against its month's budget
    pub fn reserve_consumption(
        &self,
        _writes: &WriteGuard<'_>,
        user_id: UserId,
        category_id: CategoryId,
        date: NaiveDate,
        amount: Money,
    ) -> SpendwiseResult<BudgetEntry> {
        let consumption = Consumption::new(category_id, date, amount);
        let (before, after) = self.storage.budgets.commit(|state| {
            let entry = state
                .find_by_key_mut(&consumption.key(user_id))
                .ok_or_else(|| self.no_budget(user_id, &consumption))?;
            let before = entry.clone();
            reserve(entry, amount, || self.category_name(category_id))?;
            Ok((before, entry.clone()))
        })
        .map_err(|e| refused(e, user_id, &consumption))?;

        self.log_consumption(user_id, &before, &after);
        Ok(after)
    }

    /// Take an expense back out of its month's budget
    ///
    /// Returns `None` when the budget no longer exists; there is nothing to
    /// give back in that case.
    pub fn release_consumption(
        &self,
        _writes: &WriteGuard<'_>,
        user_id: UserId,
        category_id: CategoryId,
        date: NaiveDate,
        amount: Money,
    ) -> SpendwiseResult<Option<BudgetEntry>> {
        let consumption = Consumption::new(category_id, date, amount);
        let changed = self.storage.budgets.commit(|state| {
            match state.find_by_key_mut(&consumption.key(user_id)) {
                Some(entry) => {
                    let before = entry.clone();
                    release(entry, amount)?;
                    Ok(Some((before, entry.clone())))
                }
                None => Ok(None),
            }
        })?;

        match changed {
            Some((before, after)) => {
                self.log_consumption(user_id, &before, &after);
                Ok(Some(after))
            }
            None => {
                tracing::warn!(
                    user_id = %user_id,
                    category_id = %category_id,
                    period = %BudgetMonth::of(date),
                    amount = %amount,
                    "no budget to release consumption from"
                );
                Ok(None)
            }
        }
    }

    /// Move an expense's claim from one budget to another in a single write
    ///
    /// If the new budget cannot take the amount nothing changes, including
    /// the release from the old one.
    pub fn transfer_consumption(
        &self,
        _writes: &WriteGuard<'_>,
        user_id: UserId,
        from: Consumption,
        to: Consumption,
    ) -> SpendwiseResult<()> {
        let changes = self.storage.budgets.commit(|state| {
            let mut before = Vec::new();

            match state.find_by_key_mut(&from.key(user_id)) {
                Some(entry) => {
                    before.push(entry.clone());
                    release(entry, from.amount)?;
                }
                None => tracing::warn!(
                    user_id = %user_id,
                    category_id = %from.category_id,
                    period = %BudgetMonth::of(from.date),
                    "no budget to release consumption from"
                ),
            }

            let entry = state
                .find_by_key_mut(&to.key(user_id))
                .ok_or_else(|| self.no_budget(user_id, &to))?;
            if !before.iter().any(|b| b.id == entry.id) {
                before.push(entry.clone());
            }
            reserve(entry, to.amount, || self.category_name(to.category_id))?;

            Ok(before
                .into_iter()
                .filter_map(|b| state.get(b.id).cloned().map(|a| (b, a)))
                .collect::<Vec<_>>())
        })
        .map_err(|e| refused(e, user_id, &to))?;

        for (before, after) in &changes {
            self.log_consumption(user_id, before, after);
        }
        Ok(())
    }

    /// All entries of the user, newest period first
    pub fn list_budgets(&self, user_id: UserId) -> SpendwiseResult<Vec<BudgetEntry>> {
        self.storage.budgets.get_for_user(user_id)
    }

    /// Budget entries grouped by category; categories without budgets are left out
    pub fn list_budgets_by_category(&self, user_id: UserId) -> SpendwiseResult<Vec<CategoryBudgets>> {
        let budgets = self.storage.budgets.get_for_user(user_id)?;
        let mut groups = Vec::new();

        for category in self.storage.categories.get_for_user(user_id)? {
            let entries: Vec<_> = budgets
                .iter()
                .filter(|b| b.category_id == category.id)
                .cloned()
                .collect();
            if !entries.is_empty() {
                groups.push(CategoryBudgets {
                    category,
                    budgets: entries,
                });
            }
        }

        Ok(groups)
    }

    fn expense_category(&self, user_id: UserId, category_id: CategoryId) -> SpendwiseResult<Category> {
        let category = self
            .storage
            .categories
            .get_owned(user_id, category_id)?
            .ok_or_else(|| SpendwiseError::category_not_found(category_id.to_string()))?;
        if !category.is_expense() {
            return Err(SpendwiseError::Validation(format!(
                "Budgets can only be set for expense categories, '{}' is an income category",
                category.name
            )));
        }
        Ok(category)
    }

    fn category_name(&self, category_id: CategoryId) -> String {
        match self.storage.categories.get(category_id) {
            Ok(Some(category)) => category.name,
            _ => category_id.to_string(),
        }
    }

    fn no_budget(&self, user_id: UserId, consumption: &Consumption) -> SpendwiseError {
        let period = consumption.key(user_id).month;
        SpendwiseError::NoBudgetSet {
            category: self.category_name(consumption.category_id),
            month: period.month(),
            year: period.year(),
        }
    }

    fn log_consumption(&self, user_id: UserId, before: &BudgetEntry, after: &BudgetEntry) {
        tracing::debug!(
            budget_id = %after.id,
            consumed = %after.consumed,
            remaining = %after.remaining(),
            "budget consumption changed"
        );
        self.storage.log_update(
            EntityType::Budget,
            after.id,
            Some(user_id),
            Some(after.period().to_string()),
            before,
            after,
        );
    }
}

fn reserve(
    entry: &mut BudgetEntry,
    amount: Money,
    category_name: impl FnOnce() -> String,
) -> SpendwiseResult<()> {
    entry
        .consume(amount)
        .map_err(|_| SpendwiseError::InsufficientBudget {
            category: category_name(),
            needed: amount,
            available: entry.remaining(),
        })
}

fn release(entry: &mut BudgetEntry, amount: Money) -> SpendwiseResult<()> {
    entry.release(amount).map_err(|e| {
        SpendwiseError::Storage(format!(
            "Budget {} is out of step with its transactions: {}",
            entry.id, e
        ))
    })
}

fn duplicate(category: &Category, period: BudgetMonth) -> SpendwiseError {
    SpendwiseError::DuplicateBudget {
        category: category.name.clone(),
        month: period.month(),
        year: period.year(),
    }
}

/// Log a refused expense and pass the error on
fn refused(err: SpendwiseError, user_id: UserId, consumption: &Consumption) -> SpendwiseError {
    if matches!(
        err,
        SpendwiseError::NoBudgetSet { .. } | SpendwiseError::InsufficientBudget { .. }
    ) {
        tracing::warn!(
            user_id = %user_id,
            category_id = %consumption.category_id,
            amount = %consumption.amount,
            reason = %err,
            "expense refused"
        );
    }
    err
}
