//! Budget entry repository for JSON storage
//!
//! Manages loading and saving budget entries to budgets.json

use std::path::PathBuf;

use crate::error::SpendwiseResult;
use crate::models::{BudgetEntry, BudgetId, BudgetKey, BudgetMonth, CategoryId, UserId};

use super::collection::{Collection, CollectionState, Record};

impl Record for BudgetEntry {
    type Id = BudgetId;
    const COLLECTION: &'static str = "budgets";

    fn id(&self) -> BudgetId {
        self.id
    }

    fn check(&self) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())
    }
}

impl CollectionState<BudgetEntry> {
    /// Find the entry for a key
    pub fn find_by_key(&self, key: &BudgetKey) -> Option<&BudgetEntry> {
        self.values().find(|b| b.key() == *key)
    }

    /// Find the entry for a key, mutably
    pub fn find_by_key_mut(&mut self, key: &BudgetKey) -> Option<&mut BudgetEntry> {
        self.values_mut().find(|b| b.key() == *key)
    }
}

/// Newest period first, then category id
fn newest_period_first(a: &BudgetEntry, b: &BudgetEntry) -> std::cmp::Ordering {
    b.period()
        .cmp(&a.period())
        .then(a.category_id.cmp(&b.category_id))
}

/// Repository for budget entry persistence
pub struct BudgetRepository {
    collection: Collection<BudgetEntry>,
}

impl BudgetRepository {
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

    pub fn get(&self, id: BudgetId) -> SpendwiseResult<Option<BudgetEntry>> {
        self.collection.get(id)
    }

    pub fn get_by_key(&self, key: &BudgetKey) -> SpendwiseResult<Option<BudgetEntry>> {
        self.collection
            .query(|state| state.find_by_key(key).cloned())
    }

    /// All entries of a user, newest period first
    pub fn get_for_user(&self, user_id: UserId) -> SpendwiseResult<Vec<BudgetEntry>> {
        let mut list: Vec<_> = self.collection.query(|state| {
            state
                .values()
                .filter(|b| b.user_id == user_id)
                .cloned()
                .collect()
        })?;
        list.sort_by(newest_period_first);
        Ok(list)
    }

    /// A user's entries for one category, newest period first
    pub fn get_for_category(
        &self,
        user_id: UserId,
        category_id: CategoryId,
    ) -> SpendwiseResult<Vec<BudgetEntry>> {
        let mut list = self.get_for_user(user_id)?;
        list.retain(|b| b.category_id == category_id);
        Ok(list)
    }

    /// A user's entries for one month, by category id
    pub fn get_for_period(
        &self,
        user_id: UserId,
        period: BudgetMonth,
    ) -> SpendwiseResult<Vec<BudgetEntry>> {
        let mut list = self.get_for_user(user_id)?;
        list.retain(|b| b.period() == period);
        Ok(list)
    }

    /// Count entries referencing a category
    pub fn count_for_category(&self, category_id: CategoryId) -> SpendwiseResult<usize> {
        self.collection.query(|state| {
            state
                .values()
                .filter(|b| b.category_id == category_id)
                .count()
        })
    }

    pub fn count(&self) -> SpendwiseResult<usize> {
        self.collection.count()
    }

    /// Apply a mutation as one write of budgets.json
    pub fn commit<R>(
        &self,
        f: impl FnOnce(&mut CollectionState<BudgetEntry>) -> SpendwiseResult<R>,
    ) -> SpendwiseResult<R> {
        self.collection.commit(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpendwiseError;
    use crate::models::Money;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, BudgetRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = BudgetRepository::new(temp_dir.path().join("budgets.json"));
        repo.load().unwrap();
        (temp_dir, repo)
    }

    fn key(category: u64, year: i32, month: u32) -> BudgetKey {
        BudgetKey::new(
            UserId::new(1),
            CategoryId::new(category),
            BudgetMonth::new(year, month).unwrap(),
        )
    }

    fn add(repo: &BudgetRepository, key: BudgetKey, cents: i64) -> BudgetId {
        repo.commit(|state| {
            let id = state.allocate_id();
            state.insert(BudgetEntry::new(id, key, Money::from_cents(cents)));
            Ok(id)
        })
        .unwrap()
    }

    #[test]
    fn test_find_by_key() {
        let (_temp_dir, repo) = create_test_repo();
        let id = add(&repo, key(1, 2025, 7), 50000);
        add(&repo, key(1, 2025, 8), 50000);

        let found = repo.get_by_key(&key(1, 2025, 7)).unwrap().unwrap();
        assert_eq!(found.id, id);
        assert!(repo.get_by_key(&key(2, 2025, 7)).unwrap().is_none());
    }

    #[test]
    fn test_consume_through_commit() {
        let (_temp_dir, repo) = create_test_repo();
        add(&repo, key(1, 2025, 7), 50000);

        repo.commit(|state| {
            let entry = state.find_by_key_mut(&key(1, 2025, 7)).unwrap();
            entry.consume(Money::from_cents(2000)).unwrap();
            Ok(())
        })
        .unwrap();

        let entry = repo.get_by_key(&key(1, 2025, 7)).unwrap().unwrap();
        assert_eq!(entry.consumed.cents(), 2000);
    }

    #[test]
    fn test_listing_order_and_filters() {
        let (_temp_dir, repo) = create_test_repo();
        add(&repo, key(2, 2025, 6), 100);
        add(&repo, key(1, 2025, 7), 100);
        add(&repo, key(2, 2025, 7), 100);

        let periods: Vec<_> = repo
            .get_for_user(UserId::new(1))
            .unwrap()
            .iter()
            .map(|b| (b.month, b.category_id.value()))
            .collect();
        assert_eq!(periods, vec![(7, 1), (7, 2), (6, 2)]);

        assert_eq!(
            repo.get_for_category(UserId::new(1), CategoryId::new(2))
                .unwrap()
                .len(),
            2
        );
        assert_eq!(
            repo.get_for_period(UserId::new(1), BudgetMonth::new(2025, 6).unwrap())
                .unwrap()
                .len(),
            1
        );
        assert_eq!(repo.count_for_category(CategoryId::new(2)).unwrap(), 2);
    }

    #[test]
    fn test_load_rejects_invalid_month() {
        let (temp_dir, repo) = create_test_repo();
        add(&repo, key(1, 2025, 7), 50000);

        let path = temp_dir.path().join("budgets.json");
        let mut value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        value["budgets"][0]["month"] = serde_json::json!(13);
        std::fs::write(&path, value.to_string()).unwrap();

        let reloaded = BudgetRepository::new(path);
        let err = reloaded.load().unwrap_err();
        assert!(matches!(err, SpendwiseError::Storage(_)));
        assert!(err.to_string().contains("Month must be between 1 and 12"));
        assert_eq!(reloaded.count().unwrap(), 0);
    }
}
