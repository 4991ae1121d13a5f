//! Transaction service
//!
//! Income and expense records. Every expense change goes through the budget
//! ledger first; if the transaction write then fails, the budget change is
//! undone before the error is returned.

use chrono::{Local, NaiveDate, NaiveTime, Utc};

use crate::audit::EntityType;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::transaction::{validate_amount, validate_description};
use crate::models::{Category, CategoryId, Money, Transaction, TransactionId, TransactionType, UserId};
use crate::services::budget::{BudgetService, Consumption};
use crate::storage::Storage;

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
    budgets: BudgetService<'a>,
}

/// New values for an existing transaction
#[derive(Debug, Clone)]
pub struct TransactionChanges {
    pub category_id: CategoryId,
    pub amount: Money,
    pub description: String,
    pub date: NaiveDate,
}

impl TransactionChanges {
    /// Start from the transaction's current values
    pub fn from_existing(txn: &Transaction) -> Self {
        Self {
            category_id: txn.category_id,
            amount: txn.amount,
            description: txn.description.clone(),
            date: txn.date(),
        }
    }
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            budgets: BudgetService::new(storage),
        }
    }

    /// Record a transaction, stamped with the current time of day
    pub fn add_transaction(
        &self,
        user_id: UserId,
        category_id: CategoryId,
        transaction_type: TransactionType,
        amount: Money,
        description: &str,
        date: NaiveDate,
    ) -> SpendwiseResult<Transaction> {
        self.add_transaction_at(
            user_id,
            category_id,
            transaction_type,
            amount,
            description,
            date,
            Local::now().time(),
        )
    }

    /// Record a transaction with an explicit time of day
    #[allow(clippy::too_many_arguments)]
    pub fn add_transaction_at(
        &self,
        user_id: UserId,
        category_id: CategoryId,
        transaction_type: TransactionType,
        amount: Money,
        description: &str,
        date: NaiveDate,
        time_of_day: NaiveTime,
    ) -> SpendwiseResult<Transaction> {
        check_amount(amount)?;
        check_description(description)?;

        let writes = self.storage.lock_writes()?;
        let category = self.category_for(user_id, category_id, transaction_type)?;

        if transaction_type.is_expense() {
            self.budgets
                .reserve_consumption(&writes, user_id, category_id, date, amount)?;
        }

        let inserted = self.storage.transactions.commit(|state| {
            let id = state.allocate_id();
            let txn = Transaction::new(
                id,
                user_id,
                category_id,
                transaction_type,
                amount,
                description.trim(),
                date,
                time_of_day,
            );
            txn.validate()
                .map_err(|e| SpendwiseError::Validation(e.to_string()))?;
            state.insert(txn.clone());
            Ok(txn)
        });

        let txn = match inserted {
            Ok(txn) => txn,
            Err(e) => {
                if transaction_type.is_expense() {
                    self.compensate("add", || {
                        self.budgets
                            .release_consumption(&writes, user_id, category_id, date, amount)
                            .map(|_| ())
                    });
                }
                return Err(e);
            }
        };

        tracing::info!(
            transaction_id = %txn.id,
            kind = %txn.transaction_type,
            amount = %txn.amount,
            category = %category.name,
            "transaction added"
        );
        self.storage.log_create(
            EntityType::Transaction,
            txn.id,
            Some(user_id),
            Some(category.name),
            &txn,
        );

        Ok(txn)
    }

    /// Get a transaction owned by the user
    pub fn get_transaction(&self, user_id: UserId, id: TransactionId) -> SpendwiseResult<Transaction> {
        self.storage
            .transactions
            .get(id)?
            .filter(|t| t.user_id == user_id)
            .ok_or_else(|| SpendwiseError::transaction_not_found(id.to_string()))
    }

    /// All of the user's transactions, newest first
    pub fn list_transactions(&self, user_id: UserId) -> SpendwiseResult<Vec<Transaction>> {
        self.storage.transactions.get_for_user(user_id)
    }

    /// The user's transactions of one type, newest first
    pub fn list_by_type(
        &self,
        user_id: UserId,
        transaction_type: TransactionType,
    ) -> SpendwiseResult<Vec<Transaction>> {
        let mut list = self.list_transactions(user_id)?;
        list.retain(|t| t.transaction_type == transaction_type);
        Ok(list)
    }

    /// Change an expense, moving its budget consumption along with it
    pub fn update_expense(
        &self,
        user_id: UserId,
        id: TransactionId,
        changes: TransactionChanges,
    ) -> SpendwiseResult<Transaction> {
        check_amount(changes.amount)?;
        check_description(&changes.description)?;

        let writes = self.storage.lock_writes()?;
        let before = self.owned_of_type(user_id, id, TransactionType::Expense)?;
        let category = self.category_for(user_id, changes.category_id, TransactionType::Expense)?;

        let old = Consumption::new(before.category_id, before.date(), before.amount);
        let new = Consumption::new(changes.category_id, changes.date, changes.amount);
        self.budgets.transfer_consumption(&writes, user_id, old, new)?;

        match self.write_changes(id, &changes) {
            Ok(after) => {
                self.finish_update(user_id, &category, &before, &after);
                Ok(after)
            }
            Err(e) => {
                self.compensate("update", || {
                    self.budgets.transfer_consumption(&writes, user_id, new, old)
                });
                Err(e)
            }
        }
    }

    /// Change an income record
    pub fn update_income(
        &self,
        user_id: UserId,
        id: TransactionId,
        changes: TransactionChanges,
    ) -> SpendwiseResult<Transaction> {
        check_amount(changes.amount)?;
        check_description(&changes.description)?;

        let _writes = self.storage.lock_writes()?;
        let before = self.owned_of_type(user_id, id, TransactionType::Income)?;
        let category = self.category_for(user_id, changes.category_id, TransactionType::Income)?;

        let after = self.write_changes(id, &changes)?;
        self.finish_update(user_id, &category, &before, &after);
        Ok(after)
    }

    /// Change a transaction of either type
    pub fn update_transaction(
        &self,
        user_id: UserId,
        id: TransactionId,
        changes: TransactionChanges,
    ) -> SpendwiseResult<Transaction> {
        if self.get_transaction(user_id, id)?.is_expense() {
            self.update_expense(user_id, id, changes)
        } else {
            self.update_income(user_id, id, changes)
        }
    }

    /// Delete an expense and give its amount back to the budget
    pub fn delete_expense(&self, user_id: UserId, id: TransactionId) -> SpendwiseResult<Transaction> {
        let writes = self.storage.lock_writes()?;
        let txn = self.owned_of_type(user_id, id, TransactionType::Expense)?;

        let released = self.budgets.release_consumption(
            &writes,
            user_id,
            txn.category_id,
            txn.date(),
            txn.amount,
        )?;

        if let Err(e) = self.remove(id) {
            if released.is_some() {
                self.compensate("delete", || {
                    self.budgets
                        .reserve_consumption(&writes, user_id, txn.category_id, txn.date(), txn.amount)
                        .map(|_| ())
                });
            }
            return Err(e);
        }

        self.finish_delete(user_id, &txn);
        Ok(txn)
    }

    /// Delete an income record
    pub fn delete_income(&self, user_id: UserId, id: TransactionId) -> SpendwiseResult<Transaction> {
        let _writes = self.storage.lock_writes()?;
        let txn = self.owned_of_type(user_id, id, TransactionType::Income)?;

        self.remove(id)?;
        self.finish_delete(user_id, &txn);
        Ok(txn)
    }

    /// Delete a transaction of either type
    pub fn delete_transaction(&self, user_id: UserId, id: TransactionId) -> SpendwiseResult<Transaction> {
        if self.get_transaction(user_id, id)?.is_expense() {
            self.delete_expense(user_id, id)
        } else {
            self.delete_income(user_id, id)
        }
    }

    fn category_for(
        &self,
        user_id: UserId,
        category_id: CategoryId,
        transaction_type: TransactionType,
    ) -> SpendwiseResult<Category> {
        let category = self
            .storage
            .categories
            .get_owned(user_id, category_id)?
            .ok_or_else(|| SpendwiseError::category_not_found(category_id.to_string()))?;

        if category.category_type != transaction_type {
            return Err(SpendwiseError::Validation(format!(
                "Category '{}' is for {} transactions, not {}",
                category.name, category.category_type, transaction_type
            )));
        }
        Ok(category)
    }

    fn owned_of_type(
        &self,
        user_id: UserId,
        id: TransactionId,
        transaction_type: TransactionType,
    ) -> SpendwiseResult<Transaction> {
        self.storage
            .transactions
            .get(id)?
            .filter(|t| t.user_id == user_id && t.transaction_type == transaction_type)
            .ok_or_else(|| SpendwiseError::transaction_not_found(id.to_string()))
    }

    fn write_changes(&self, id: TransactionId, changes: &TransactionChanges) -> SpendwiseResult<Transaction> {
        self.storage.transactions.commit(|state| {
            let txn = state
                .get_mut(id)
                .ok_or_else(|| SpendwiseError::transaction_not_found(id.to_string()))?;
            txn.category_id = changes.category_id;
            txn.amount = changes.amount;
            txn.description = changes.description.trim().to_string();
            txn.set_date(changes.date);
            txn.updated_at = Utc::now();
            txn.validate()
                .map_err(|e| SpendwiseError::Validation(e.to_string()))?;
            Ok(txn.clone())
        })
    }

    fn remove(&self, id: TransactionId) -> SpendwiseResult<Transaction> {
        self.storage.transactions.commit(|state| {
            state
                .remove(id)
                .ok_or_else(|| SpendwiseError::transaction_not_found(id.to_string()))
        })
    }

    fn finish_update(&self, user_id: UserId, category: &Category, before: &Transaction, after: &Transaction) {
        tracing::info!(transaction_id = %after.id, amount = %after.amount, "transaction updated");
        self.storage.log_update(
            EntityType::Transaction,
            after.id,
            Some(user_id),
            Some(category.name.clone()),
            before,
            after,
        );
    }

    fn finish_delete(&self, user_id: UserId, txn: &Transaction) {
        tracing::info!(transaction_id = %txn.id, amount = %txn.amount, "transaction deleted");
        self.storage.log_delete(
            EntityType::Transaction,
            txn.id,
            Some(user_id),
            None,
            txn,
        );
    }

    /// Undo a budget change after a failed transaction write
    fn compensate(&self, operation: &str, undo: impl FnOnce() -> SpendwiseResult<()>) {
        if let Err(e) = undo() {
            tracing::error!(
                operation,
                error = %e,
                "failed to undo budget change; consumed totals need repair"
            );
        }
    }
}

fn check_amount(amount: Money) -> SpendwiseResult<()> {
    validate_amount(amount).map_err(|e| SpendwiseError::Validation(e.to_string()))
}

fn check_description(description: &str) -> SpendwiseResult<()> {
    validate_description(description.trim()).map_err(|e| SpendwiseError::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::SpendwisePaths;
    use crate::services::CategoryService;
    use std::fs;
    use tempfile::TempDir;

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    /// Food (expense, 500 budget for July 2025) and Salary (income)
    fn setup_test_data(storage: &Storage) -> (CategoryId, CategoryId) {
        let categories = CategoryService::new(storage);
        let food = categories
            .create_category(ALICE, "Food", None, TransactionType::Expense)
            .unwrap()
            .id;
        let salary = categories
            .create_category(ALICE, "Salary", None, TransactionType::Income)
            .unwrap()
            .id;
        BudgetService::new(storage)
            .create_budget(ALICE, food, units(500), 7, 2025)
            .unwrap();
        (food, salary)
    }

    fn units(n: i64) -> Money {
        Money::from_units(n)
    }

    fn july(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    fn consumed(storage: &Storage, category: CategoryId) -> Money {
        BudgetService::new(storage)
            .get_budget(ALICE, category, 7, 2025)
            .unwrap()
            .unwrap()
            .consumed
    }

    #[test]
    fn test_add_expense_consumes_budget() {
        let (_temp_dir, storage) = create_test_storage();
        let (food, _) = setup_test_data(&storage);
        let service = TransactionService::new(&storage);

        let txn = service
            .add_transaction(ALICE, food, TransactionType::Expense, units(200), " lunch ", july(10))
            .unwrap();

        assert_eq!(txn.description, "lunch");
        assert_eq!(txn.date(), july(10));
        assert_eq!(consumed(&storage, food), units(200));
    }

    #[test]
    fn test_add_income_leaves_budgets_alone() {
        let (_temp_dir, storage) = create_test_storage();
        let (food, salary) = setup_test_data(&storage);
        let service = TransactionService::new(&storage);

        service
            .add_transaction(ALICE, salary, TransactionType::Income, units(3000), "", july(1))
            .unwrap();
        assert!(consumed(&storage, food).is_zero());
    }

    #[test]
    fn test_add_expense_without_budget() {
        let (_temp_dir, storage) = create_test_storage();
        let (food, _) = setup_test_data(&storage);
        let service = TransactionService::new(&storage);

        let aug = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let err = service
            .add_transaction(ALICE, food, TransactionType::Expense, units(10), "", aug)
            .unwrap_err();

        assert!(matches!(err, SpendwiseError::NoBudgetSet { month: 8, .. }));
        assert!(service.list_transactions(ALICE).unwrap().is_empty());
    }

    #[test]
    fn test_add_validation() {
        let (_temp_dir, storage) = create_test_storage();
        let (food, salary) = setup_test_data(&storage);
        let service = TransactionService::new(&storage);

        assert!(service
            .add_transaction(ALICE, food, TransactionType::Expense, Money::zero(), "", july(1))
            .unwrap_err()
            .is_validation());
        assert!(service
            .add_transaction(ALICE, salary, TransactionType::Expense, units(5), "", july(1))
            .unwrap_err()
            .is_validation());
        assert!(service
            .add_transaction(BOB, food, TransactionType::Expense, units(5), "", july(1))
            .unwrap_err()
            .is_not_found());
        assert!(consumed(&storage, food).is_zero());
    }

    #[test]
    fn test_concurrent_expenses_never_overspend() {
        let (_temp_dir, storage) = create_test_storage();
        let (food, _) = setup_test_data(&storage);

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (1..=10)
                .map(|day| {
                    let storage = &storage;
                    scope.spawn(move || {
                        TransactionService::new(storage).add_transaction(
                            ALICE,
                            food,
                            TransactionType::Expense,
                            units(120),
                            "",
                            july(day),
                        )
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
        });

        let (committed, refused): (Vec<_>, Vec<_>) = results.into_iter().partition(|r| r.is_ok());
        assert_eq!(committed.len(), 4);
        for err in refused {
            assert!(matches!(
                err.unwrap_err(),
                SpendwiseError::InsufficientBudget { .. }
            ));
        }

        let recorded: Money = TransactionService::new(&storage)
            .list_transactions(ALICE)
            .unwrap()
            .iter()
            .map(|t| t.amount)
            .sum();
        assert_eq!(consumed(&storage, food), recorded);
        assert_eq!(recorded, units(480));
        assert!(consumed(&storage, food) <= units(500));
    }

    #[test]
    fn test_failed_write_releases_reservation() {
        let (temp_dir, storage) = create_test_storage();
        let (food, _) = setup_test_data(&storage);
        let service = TransactionService::new(&storage);

        // A directory at the temp path makes the transactions write fail
        let blocker = temp_dir.path().join("data").join("transactions.json.tmp");
        fs::create_dir_all(&blocker).unwrap();

        let err = service
            .add_transaction(ALICE, food, TransactionType::Expense, units(100), "", july(2))
            .unwrap_err();
        assert!(matches!(err, SpendwiseError::Storage(_)));
        assert!(consumed(&storage, food).is_zero());
        assert!(service.list_transactions(ALICE).unwrap().is_empty());

        fs::remove_dir(&blocker).unwrap();
        service
            .add_transaction(ALICE, food, TransactionType::Expense, units(100), "", july(2))
            .unwrap();
        assert_eq!(consumed(&storage, food), units(100));
    }

    #[test]
    fn test_update_expense_moves_consumption() {
        let (_temp_dir, storage) = create_test_storage();
        let (food, _) = setup_test_data(&storage);
        let service = TransactionService::new(&storage);
        let txn = service
            .add_transaction_at(
                ALICE,
                food,
                TransactionType::Expense,
                units(200),
                "",
                july(10),
                NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            )
            .unwrap();

        let mut changes = TransactionChanges::from_existing(&txn);
        changes.amount = units(450);
        changes.date = july(20);
        let updated = service.update_expense(ALICE, txn.id, changes).unwrap();

        assert_eq!(consumed(&storage, food), units(450));
        assert_eq!(updated.date(), july(20));
        assert_eq!(updated.transaction_date.time(), NaiveTime::from_hms_opt(8, 30, 0).unwrap());
    }

    #[test]
    fn test_update_expense_over_budget_changes_nothing() {
        let (_temp_dir, storage) = create_test_storage();
        let (food, _) = setup_test_data(&storage);
        let service = TransactionService::new(&storage);
        let txn = service
            .add_transaction(ALICE, food, TransactionType::Expense, units(200), "", july(10))
            .unwrap();

        let mut changes = TransactionChanges::from_existing(&txn);
        changes.amount = units(501);
        let err = service.update_expense(ALICE, txn.id, changes).unwrap_err();

        assert!(matches!(err, SpendwiseError::InsufficientBudget { .. }));
        assert_eq!(consumed(&storage, food), units(200));
        assert_eq!(service.get_transaction(ALICE, txn.id).unwrap().amount, units(200));
    }

    #[test]
    fn test_update_failed_write_transfers_back() {
        let (temp_dir, storage) = create_test_storage();
        let (food, _) = setup_test_data(&storage);
        let service = TransactionService::new(&storage);
        let txn = service
            .add_transaction(ALICE, food, TransactionType::Expense, units(200), "", july(10))
            .unwrap();

        fs::create_dir_all(temp_dir.path().join("data").join("transactions.json.tmp")).unwrap();
        let mut changes = TransactionChanges::from_existing(&txn);
        changes.amount = units(300);

        assert!(service.update_expense(ALICE, txn.id, changes).is_err());
        assert_eq!(consumed(&storage, food), units(200));
    }

    #[test]
    fn test_update_wrong_type_or_owner() {
        let (_temp_dir, storage) = create_test_storage();
        let (food, salary) = setup_test_data(&storage);
        let service = TransactionService::new(&storage);
        let expense = service
            .add_transaction(ALICE, food, TransactionType::Expense, units(10), "", july(1))
            .unwrap();
        let income = service
            .add_transaction(ALICE, salary, TransactionType::Income, units(10), "", july(1))
            .unwrap();

        assert!(service
            .update_income(ALICE, expense.id, TransactionChanges::from_existing(&expense))
            .unwrap_err()
            .is_not_found());
        assert!(service
            .update_expense(ALICE, income.id, TransactionChanges::from_existing(&income))
            .unwrap_err()
            .is_not_found());
        assert!(service
            .update_transaction(BOB, expense.id, TransactionChanges::from_existing(&expense))
            .unwrap_err()
            .is_not_found());

        let mut changes = TransactionChanges::from_existing(&income);
        changes.description = "bonus".into();
        let updated = service.update_transaction(ALICE, income.id, changes).unwrap();
        assert_eq!(updated.description, "bonus");
    }

    #[test]
    fn test_delete_expense_releases_budget() {
        let (_temp_dir, storage) = create_test_storage();
        let (food, _) = setup_test_data(&storage);
        let service = TransactionService::new(&storage);
        let txn = service
            .add_transaction(ALICE, food, TransactionType::Expense, units(120), "", july(5))
            .unwrap();
        service
            .add_transaction(ALICE, food, TransactionType::Expense, units(30), "", july(6))
            .unwrap();

        service.delete_expense(ALICE, txn.id).unwrap();

        assert_eq!(consumed(&storage, food), units(30));
        assert!(service.get_transaction(ALICE, txn.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_expense_after_budget_removed() {
        let (_temp_dir, storage) = create_test_storage();
        let (food, _) = setup_test_data(&storage);
        let service = TransactionService::new(&storage);
        let txn = service
            .add_transaction(ALICE, food, TransactionType::Expense, units(120), "", july(5))
            .unwrap();

        let budgets = BudgetService::new(&storage);
        let entry = budgets.get_budget(ALICE, food, 7, 2025).unwrap().unwrap();
        budgets.delete_budget(ALICE, entry.id).unwrap();

        service.delete_transaction(ALICE, txn.id).unwrap();
        assert!(service.list_transactions(ALICE).unwrap().is_empty());
    }

    #[test]
    fn test_delete_failed_write_restores_consumption() {
        let (temp_dir, storage) = create_test_storage();
        let (food, _) = setup_test_data(&storage);
        let service = TransactionService::new(&storage);
        let txn = service
            .add_transaction(ALICE, food, TransactionType::Expense, units(120), "", july(5))
            .unwrap();

        fs::create_dir_all(temp_dir.path().join("data").join("transactions.json.tmp")).unwrap();
        assert!(service.delete_expense(ALICE, txn.id).is_err());

        assert_eq!(consumed(&storage, food), units(120));
        assert!(service.get_transaction(ALICE, txn.id).is_ok());
    }

    #[test]
    fn test_list_ordering_and_filter() {
        let (_temp_dir, storage) = create_test_storage();
        let (food, salary) = setup_test_data(&storage);
        let service = TransactionService::new(&storage);
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();

        let first = service
            .add_transaction_at(ALICE, food, TransactionType::Expense, units(1), "", july(3), noon)
            .unwrap();
        let second = service
            .add_transaction_at(ALICE, salary, TransactionType::Income, units(1), "", july(3), noon)
            .unwrap();
        let newest = service
            .add_transaction_at(ALICE, food, TransactionType::Expense, units(1), "", july(9), noon)
            .unwrap();

        let ids: Vec<_> = service
            .list_transactions(ALICE)
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![newest.id, second.id, first.id]);

        let expenses = service.list_by_type(ALICE, TransactionType::Expense).unwrap();
        assert_eq!(expenses.len(), 2);
        assert!(service.list_transactions(BOB).unwrap().is_empty());
    }
}
