//! Audit logging for Spendwise
//!
//! Every create, update and delete of a user, category, transaction or budget
//! is appended to `audit.log` with before/after values.
//!
//! - `AuditEntry`: one operation on one entity.
//! - `AuditLogger`: appends entries as JSON lines and reads them back.
//! - `generate_diff`: field-level change summary for updates.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
