//! `spendwise audit`: the signed-in user's recent changes

use super::session::Session;
use crate::error::SpendwiseResult;
use crate::storage::Storage;

/// Show the most recent audit entries for the user, newest last
pub fn handle_audit_command(storage: &Storage, session: &Session, limit: usize) -> SpendwiseResult<()> {
    let user = session.login(storage)?;
    let entries = storage
        .audit_logger()
        .read_recent_for_user(user.id.value(), limit)?;

    session.emit(entries, |entries| {
        if entries.is_empty() {
            return "No audit entries.\n".to_string();
        }
        entries
            .iter()
            .map(|e| format!("{}\n", e.format_human_readable()))
            .collect()
    })
}
