//! Storage layer for Spendwise
//!
//! One JSON file per collection under the data directory, rewritten whole
//! with atomic writes. Ledger mutations are serialized by a single writer
//! lock, see [`Storage::lock_writes`].

pub mod budgets;
pub mod categories;
pub mod collection;
pub mod file_io;
pub mod init;
pub mod transactions;
pub mod users;

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

pub use budgets::BudgetRepository;
pub use categories::CategoryRepository;
pub use collection::{Collection, CollectionState, Record};
pub use file_io::{json_file_status, read_json, write_json_atomic, FileStatus};
pub use init::initialize_storage;
pub use transactions::TransactionRepository;
pub use users::UserRepository;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::SpendwisePaths;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::UserId;

/// Status of each collection file under the data directory
pub fn collection_file_statuses(paths: &SpendwisePaths) -> Vec<(&'static str, FileStatus)> {
    vec![
        ("users.json", json_file_status(paths.users_file())),
        ("categories.json", json_file_status(paths.categories_file())),
        ("transactions.json", json_file_status(paths.transactions_file())),
        ("budgets.json", json_file_status(paths.budgets_file())),
    ]
}

/// Proof that the holder owns the process-wide writer lock
///
/// Operations that must run inside a larger ledger mutation take a
/// `&WriteGuard` instead of locking themselves.
pub struct WriteGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: SpendwisePaths,
    pub users: UserRepository,
    pub categories: CategoryRepository,
    pub transactions: TransactionRepository,
    pub budgets: BudgetRepository,
    audit: AuditLogger,
    writer: Mutex<()>,
}

impl Storage {
    /// Create a new Storage instance with the audit log enabled
    pub fn new(paths: SpendwisePaths) -> SpendwiseResult<Self> {
        Self::with_audit(paths, true)
    }

    /// Create a new Storage instance, choosing whether mutations are audited
    pub fn with_audit(paths: SpendwisePaths, audit_enabled: bool) -> SpendwiseResult<Self> {
        paths.ensure_directories()?;

        let audit = if audit_enabled {
            AuditLogger::new(paths.audit_log())
        } else {
            AuditLogger::disabled(paths.audit_log())
        };

        Ok(Self {
            users: UserRepository::new(paths.users_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            budgets: BudgetRepository::new(paths.budgets_file()),
            audit,
            writer: Mutex::new(()),
            paths,
        })
    }

    pub fn paths(&self) -> &SpendwisePaths {
        &self.paths
    }

    pub fn audit_logger(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&self) -> SpendwiseResult<()> {
        self.users.load()?;
        self.categories.load()?;
        self.transactions.load()?;
        self.budgets.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> SpendwiseResult<()> {
        self.users.save()?;
        self.categories.save()?;
        self.transactions.save()?;
        self.budgets.save()?;
        Ok(())
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    /// Acquire the writer lock. Held for the whole of one ledger mutation.
    pub fn lock_writes(&self) -> SpendwiseResult<WriteGuard<'_>> {
        let guard = self
            .writer
            .lock()
            .map_err(|e| SpendwiseError::Storage(format!("Failed to acquire writer lock: {}", e)))?;
        Ok(WriteGuard { _guard: guard })
    }

    /// Status of each collection file
    pub fn file_statuses(&self) -> Vec<(&'static str, FileStatus)> {
        collection_file_statuses(&self.paths)
    }

    /// Record a created entity in the audit log
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl ToString,
        user_id: Option<UserId>,
        entity_name: Option<String>,
        entity: &T,
    ) {
        let entry = AuditEntry::create(entity_type, entity_id.to_string(), entity_name, entity);
        self.write_audit(entry, user_id);
    }

    /// Record a changed entity in the audit log
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl ToString,
        user_id: Option<UserId>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) {
        let entry =
            AuditEntry::update(entity_type, entity_id.to_string(), entity_name, before, after);
        self.write_audit(entry, user_id);
    }

    /// Record a removed entity in the audit log
    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl ToString,
        user_id: Option<UserId>,
        entity_name: Option<String>,
        entity: &T,
    ) {
        let entry = AuditEntry::delete(entity_type, entity_id.to_string(), entity_name, entity);
        self.write_audit(entry, user_id);
    }

    // The data write has already landed, so an audit failure is reported but
    // does not fail the operation.
    fn write_audit(&self, entry: AuditEntry, user_id: Option<UserId>) {
        let entry = match user_id {
            Some(user_id) => entry.for_user(user_id),
            None => entry,
        };
        if let Err(e) = self.audit.log(&entry) {
            tracing::warn!(
                error = %e,
                operation = %entry.operation,
                entity = %entry.entity_type,
                id = %entry.entity_id,
                "failed to write audit entry"
            );
        }
    }
}
