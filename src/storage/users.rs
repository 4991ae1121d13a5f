//! User repository for JSON storage
//!
//! Manages loading and saving users to users.json

use std::path::PathBuf;

use crate::error::SpendwiseResult;
use crate::models::{User, UserId};

use super::collection::{Collection, CollectionState, Record};

impl Record for User {
    type Id = UserId;
    const COLLECTION: &'static str = "users";

    fn id(&self) -> UserId {
        self.id
    }
}

/// Repository for user persistence
pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
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

    pub fn get(&self, id: UserId) -> SpendwiseResult<Option<User>> {
        self.collection.get(id)
    }

    /// Find a user by username (case-insensitive)
    pub fn get_by_username(&self, username: &str) -> SpendwiseResult<Option<User>> {
        self.collection
            .query(|state| state.values().find(|u| u.has_username(username)).cloned())
    }

    pub fn get_all(&self) -> SpendwiseResult<Vec<User>> {
        self.collection.all()
    }

    pub fn count(&self) -> SpendwiseResult<usize> {
        self.collection.count()
    }

    /// Apply a mutation as one write of users.json
    pub fn commit<R>(
        &self,
        f: impl FnOnce(&mut CollectionState<User>) -> SpendwiseResult<R>,
    ) -> SpendwiseResult<R> {
        self.collection.commit(f)
    }
}
