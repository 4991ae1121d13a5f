//! User service
//!
//! Registration, password verification and password changes. Passwords are
//! stored as Argon2id PHC strings.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::audit::EntityType;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::{User, UserId, UserType};
use crate::storage::Storage;

/// Shortest accepted password, in characters
pub const MIN_PASSWORD_LEN: usize = 8;

/// Service for user management
pub struct UserService<'a> {
    storage: &'a Storage,
}

impl<'a> UserService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Register a new user
    pub fn register(
        &self,
        username: &str,
        password: &str,
        user_type: UserType,
    ) -> SpendwiseResult<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(SpendwiseError::Validation("Username cannot be empty".into()));
        }
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let _writes = self.storage.lock_writes()?;
        let user = self.storage.users.commit(|state| {
            if state.values().any(|u| u.has_username(username)) {
                return Err(SpendwiseError::Duplicate {
                    entity_type: "User",
                    identifier: username.to_string(),
                });
            }

            let id = state.allocate_id();
            let user = User::new(id, username, password_hash, user_type);
            state.insert(user.clone());
            Ok(user)
        })?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        self.storage.log_create(
            EntityType::User,
            user.id,
            None,
            Some(user.username.clone()),
            &user.profile(),
        );

        Ok(user)
    }

    /// Check a username and password
    ///
    /// Unknown users and wrong passwords fail the same way.
    pub fn authenticate(&self, username: &str, password: &str) -> SpendwiseResult<User> {
        let user = match self.storage.users.get_by_username(username)? {
            Some(user) => user,
            None => {
                tracing::debug!(username, "authentication failed: unknown user");
                return Err(SpendwiseError::InvalidCredentials);
            }
        };

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "authentication failed: wrong password");
            return Err(SpendwiseError::InvalidCredentials);
        }

        Ok(user)
    }

    pub fn get_user(&self, id: UserId) -> SpendwiseResult<User> {
        self.storage
            .users
            .get(id)?
            .ok_or_else(|| SpendwiseError::user_not_found(id.to_string()))
    }

    /// Look up a user by name (case-insensitive)
    pub fn get_user_by_username(&self, username: &str) -> SpendwiseResult<User> {
        self.storage
            .users
            .get_by_username(username)?
            .ok_or_else(|| SpendwiseError::user_not_found(username.trim()))
    }

    /// Replace a user's password after checking the current one
    pub fn change_password(
        &self,
        user_id: UserId,
        old_password: &str,
        new_password: &str,
    ) -> SpendwiseResult<()> {
        let user = self.get_user(user_id)?;
        if !verify_password(old_password, &user.password_hash)? {
            return Err(SpendwiseError::InvalidCredentials);
        }
        validate_password(new_password)?;
        let new_hash = hash_password(new_password)?;

        let _writes = self.storage.lock_writes()?;
        self.storage.users.commit(|state| {
            let user = state
                .get_mut(user_id)
                .ok_or_else(|| SpendwiseError::user_not_found(user_id.to_string()))?;
            user.password_hash = new_hash;
            Ok(())
        })?;

        tracing::info!(user_id = %user_id, "password changed");
        self.storage.log_update(
            EntityType::User,
            user_id,
            None,
            Some(user.username.clone()),
            &serde_json::json!({ "password": "previous" }),
            &serde_json::json!({ "password": "changed" }),
        );

        Ok(())
    }

    pub fn count(&self) -> SpendwiseResult<usize> {
        self.storage.users.count()
    }
}

fn validate_password(password: &str) -> SpendwiseResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(SpendwiseError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn hash_password(password: &str) -> SpendwiseResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| SpendwiseError::Storage(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, stored: &str) -> SpendwiseResult<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| SpendwiseError::Storage(format!("Stored password hash is invalid: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::SpendwisePaths;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_register_and_authenticate() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);

        let user = service
            .register("  Alice ", "correct horse", UserType::User)
            .unwrap();
        assert_eq!(user.username, "Alice");
        assert!(user.password_hash.starts_with("$argon2"));

        let authed = service.authenticate("alice", "correct horse").unwrap();
        assert_eq!(authed.id, user.id);
    }

    #[test]
    fn test_duplicate_username_is_case_insensitive() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);

        service.register("Alice", "password1", UserType::User).unwrap();
        let err = service
            .register("ALICE", "password2", UserType::User)
            .unwrap_err();

        assert!(matches!(err, SpendwiseError::Duplicate { .. }));
        assert_eq!(service.count().unwrap(), 1);
        assert_eq!(service.get_user_by_username("alice").unwrap().username, "Alice");
    }

    #[test]
    fn test_register_validation() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);

        assert!(service
            .register("   ", "password1", UserType::User)
            .unwrap_err()
            .is_validation());
        assert!(service
            .register("bob", "short", UserType::User)
            .unwrap_err()
            .is_validation());
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_bad_credentials_look_the_same() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);
        service.register("carol", "password1", UserType::User).unwrap();

        let wrong_password = service.authenticate("carol", "password2").unwrap_err();
        let unknown_user = service.authenticate("dave", "password1").unwrap_err();

        assert!(wrong_password.is_auth());
        assert!(unknown_user.is_auth());
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[test]
    fn test_change_password() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);
        let user = service.register("erin", "password1", UserType::User).unwrap();

        assert!(service
            .change_password(user.id, "wrong-old", "password2")
            .unwrap_err()
            .is_auth());
        service.change_password(user.id, "password1", "password2").unwrap();

        assert!(service.authenticate("erin", "password1").is_err());
        assert!(service.authenticate("erin", "password2").is_ok());
    }

    #[test]
    fn test_audit_never_contains_hash() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);
        let user = service.register("frank", "password1", UserType::Admin).unwrap();

        let raw = std::fs::read_to_string(storage.paths().audit_log()).unwrap();
        assert!(raw.contains("frank"));
        assert!(!raw.contains(&user.password_hash));
    }

    #[test]
    fn test_get_user_not_found() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);

        assert!(service.get_user(UserId::new(42)).unwrap_err().is_not_found());
    }
}
