//! Storage initialization
//!
//! First-run setup: directories, empty collection files and config.json.

use crate::config::paths::SpendwisePaths;
use crate::config::settings::Settings;
use crate::error::SpendwiseResult;

use super::Storage;

/// Initialize storage for a fresh installation
///
/// Existing collection files and settings are left untouched, so running this
/// twice is harmless.
pub fn initialize_storage(paths: &SpendwisePaths) -> SpendwiseResult<Settings> {
    paths.ensure_directories()?;

    let settings = Settings::load_or_create(paths)?;
    if !paths.is_initialized() {
        settings.save(paths)?;
    }

    let storage = Storage::with_audit(paths.clone(), settings.audit_enabled)?;
    storage.load_all()?;
    for path in [
        paths.users_file(),
        paths.categories_file(),
        paths.transactions_file(),
        paths.budgets_file(),
    ] {
        if !path.exists() {
            tracing::info!(path = %path.display(), "creating empty collection");
        }
    }
    storage.save_all()?;

    Ok(settings)
}
