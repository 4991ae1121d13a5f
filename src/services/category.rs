//! Category service
//!
//! Per-user income and expense categories. A category's type is fixed at
//! creation, and a category cannot be deleted while anything references it.

use chrono::Utc;

use crate::audit::EntityType;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{Category, CategoryId, TransactionType, UserId, DEFAULT_COLOR};
use crate::storage::Storage;

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new category
    pub fn create_category(
        &self,
        user_id: UserId,
        name: &str,
        color: Option<&str>,
        category_type: TransactionType,
    ) -> SpendwiseResult<Category> {
        let name = name.trim();
        let color = color.map(str::trim).unwrap_or(DEFAULT_COLOR).to_uppercase();

        let _writes = self.storage.lock_writes()?;
        let category = self.storage.categories.commit(|state| {
            let duplicate = state.values().any(|c| {
                c.is_owned_by(user_id)
                    && c.category_type == category_type
                    && c.name.to_lowercase() == name.to_lowercase()
            });
            if duplicate {
                return Err(SpendwiseError::Duplicate {
                    entity_type: "Category",
                    identifier: format!("{} ({})", name, category_type),
                });
            }

            let id = state.allocate_id();
            let category = Category::new(id, user_id, name, color, category_type);
            category
                .validate()
                .map_err(|e| SpendwiseError::Validation(e.to_string()))?;
            state.insert(category.clone());
            Ok(category)
        })?;

        tracing::info!(category_id = %category.id, name = %category.name, "category created");
        self.storage.log_create(
            EntityType::Category,
            category.id,
            Some(user_id),
            Some(category.name.clone()),
            &category,
        );

        Ok(category)
    }

    /// Get a category owned by the user
    pub fn get_category(&self, user_id: UserId, id: CategoryId) -> SpendwiseResult<Category> {
        self.storage
            .categories
            .get_owned(user_id, id)?
            .ok_or_else(|| SpendwiseError::category_not_found(id.to_string()))
    }

    /// Find a category by id or name
    ///
    /// A name matching both an income and an expense category is ambiguous
    /// unless `category_type` picks one.
    pub fn find_category(
        &self,
        user_id: UserId,
        identifier: &str,
        category_type: Option<TransactionType>,
    ) -> SpendwiseResult<Category> {
        if let Ok(id) = identifier.parse::<CategoryId>() {
            if let Some(category) = self.storage.categories.get_owned(user_id, id)? {
                return Ok(category);
            }
        }

        let wanted = identifier.trim().to_lowercase();
        let mut matches: Vec<Category> = self
            .storage
            .categories
            .get_for_user(user_id)?
            .into_iter()
            .filter(|c| c.name.to_lowercase() == wanted)
            .filter(|c| category_type.map_or(true, |t| c.category_type == t))
            .collect();

        if matches.len() > 1 {
            return Err(SpendwiseError::Validation(format!(
                "'{}' names both an income and an expense category; pass the id instead",
                identifier
            )));
        }
        matches
            .pop()
            .ok_or_else(|| SpendwiseError::category_not_found(identifier))
    }

    /// All categories of the user, sorted by name
    pub fn list_categories(&self, user_id: UserId) -> SpendwiseResult<Vec<Category>> {
        self.storage.categories.get_for_user(user_id)
    }

    /// Categories of one type, sorted by name
    pub fn list_by_type(
        &self,
        user_id: UserId,
        category_type: TransactionType,
    ) -> SpendwiseResult<Vec<Category>> {
        self.storage.categories.get_by_type(user_id, category_type)
    }

    /// Rename or recolor a category. The type cannot change.
    pub fn update_category(
        &self,
        user_id: UserId,
        id: CategoryId,
        name: Option<&str>,
        color: Option<&str>,
    ) -> SpendwiseResult<Category> {
        let _writes = self.storage.lock_writes()?;
        let (before, after) = self.storage.categories.commit(|state| {
            let before = state
                .get(id)
                .filter(|c| c.is_owned_by(user_id))
                .cloned()
                .ok_or_else(|| SpendwiseError::category_not_found(id.to_string()))?;

            let mut category = before.clone();
            if let Some(name) = name {
                category.name = name.trim().to_string();
            }
            if let Some(color) = color {
                category.color = color.trim().to_uppercase();
            }
            category
                .validate()
                .map_err(|e| SpendwiseError::Validation(e.to_string()))?;

            let lowered = category.name.to_lowercase();
            let duplicate = state.values().any(|c| {
                c.id != id
                    && c.is_owned_by(user_id)
                    && c.category_type == category.category_type
                    && c.name.to_lowercase() == lowered
            });
            if duplicate {
                return Err(SpendwiseError::Duplicate {
                    entity_type: "Category",
                    identifier: format!("{} ({})", category.name, category.category_type),
                });
            }

            category.updated_at = Utc::now();
            state.insert(category.clone());
            Ok((before, category))
        })?;

        tracing::info!(category_id = %id, "category updated");
        self.storage.log_update(
            EntityType::Category,
            id,
            Some(user_id),
            Some(after.name.clone()),
            &before,
            &after,
        );

        Ok(after)
    }

    /// Delete a category that nothing references
    pub fn delete_category(&self, user_id: UserId, id: CategoryId) -> SpendwiseResult<Category> {
        let _writes = self.storage.lock_writes()?;
        let category = self.get_category(user_id, id)?;

        let transactions = self.storage.transactions.count_for_category(id)?;
        let budgets = self.storage.budgets.count_for_category(id)?;
        if transactions > 0 || budgets > 0 {
            return Err(SpendwiseError::CategoryInUse {
                category: category.name,
                transactions,
                budgets,
            });
        }

        self.storage.categories.commit(|state| {
            state
                .remove(id)
                .ok_or_else(|| SpendwiseError::category_not_found(id.to_string()))
        })?;

        tracing::info!(category_id = %id, "category deleted");
        self.storage.log_delete(
            EntityType::Category,
            id,
            Some(user_id),
            Some(category.name.clone()),
            &category,
        );

        Ok(category)
    }
}
