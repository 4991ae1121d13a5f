//! Category repository for JSON storage
//!
//! Manages loading and saving categories to categories.json

use std::path::PathBuf;

use crate::error::SpendwiseResult;
use crate::models::{Category, CategoryId, TransactionType, UserId};

use super::collection::{Collection, CollectionState, Record};

impl Record for Category {
    type Id = CategoryId;
    const COLLECTION: &'static str = "categories";

    fn id(&self) -> CategoryId {
        self.id
    }
}

/// Repository for category persistence
pub struct CategoryRepository {
    collection: Collection<Category>,
}

impl CategoryRepository {
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

    pub fn get(&self, id: CategoryId) -> SpendwiseResult<Option<Category>> {
        self.collection.get(id)
    }

    /// Get a category only if it belongs to the given user
    pub fn get_owned(&self, user_id: UserId, id: CategoryId) -> SpendwiseResult<Option<Category>> {
        Ok(self.get(id)?.filter(|c| c.is_owned_by(user_id)))
    }

    /// All categories of a user, sorted by name
    pub fn get_for_user(&self, user_id: UserId) -> SpendwiseResult<Vec<Category>> {
        let mut list: Vec<_> = self.collection.query(|state| {
            state
                .values()
                .filter(|c| c.is_owned_by(user_id))
                .cloned()
                .collect()
        })?;
        list.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(list)
    }

    /// Categories of a user of one type, sorted by name
    pub fn get_by_type(
        &self,
        user_id: UserId,
        category_type: TransactionType,
    ) -> SpendwiseResult<Vec<Category>> {
        let mut list = self.get_for_user(user_id)?;
        list.retain(|c| c.category_type == category_type);
        Ok(list)
    }

    /// Find a user's category by name and type (case-insensitive)
    pub fn get_by_name(
        &self,
        user_id: UserId,
        name: &str,
        category_type: TransactionType,
    ) -> SpendwiseResult<Option<Category>> {
        let name = name.trim().to_lowercase();
        self.collection.query(|state| {
            state
                .values()
                .find(|c| {
                    c.is_owned_by(user_id)
                        && c.category_type == category_type
                        && c.name.to_lowercase() == name
                })
                .cloned()
        })
    }

    pub fn count(&self) -> SpendwiseResult<usize> {
        self.collection.count()
    }

    /// Apply a mutation as one write of categories.json
    pub fn commit<R>(
        &self,
        f: impl FnOnce(&mut CollectionState<Category>) -> SpendwiseResult<R>,
    ) -> SpendwiseResult<R> {
        self.collection.commit(f)
    }
}
