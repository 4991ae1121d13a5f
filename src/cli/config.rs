//! `spendwise config`: show paths and settings, or change one setting

use serde::Serialize;

use super::session::Session;
use crate::config::{Settings, SpendwisePaths};
use crate::error::SpendwiseResult;
use crate::storage::collection_file_statuses;

#[derive(Serialize)]
struct ConfigView<'a> {
    base_dir: String,
    data_dir: String,
    audit_log: String,
    files: Vec<(&'static str, String)>,
    settings: &'a Settings,
}

/// Show the configuration, or set `key` to `value` when both are given
pub fn handle_config_command(
    paths: &SpendwisePaths,
    settings: &mut Settings,
    session: &Session,
    key: Option<String>,
    value: Option<String>,
) -> SpendwiseResult<()> {
    if let (Some(key), Some(value)) = (&key, &value) {
        settings.set(key, value)?;
        settings.save(paths)?;
        tracing::info!(key = %key, value = %value, "setting changed");
    }

    let view = ConfigView {
        base_dir: paths.base_dir().display().to_string(),
        data_dir: paths.data_dir().display().to_string(),
        audit_log: paths.audit_log().display().to_string(),
        files: collection_file_statuses(paths)
            .into_iter()
            .map(|(name, status)| (name, status.to_string()))
            .collect(),
        settings: &*settings,
    };

    session.emit(view, |v| {
        let mut output = String::new();
        output.push_str("Spendwise Configuration\n");
        output.push_str("=======================\n");
        output.push_str(&format!("Base directory: {}\n", v.base_dir));
        output.push_str(&format!("Data directory: {}\n", v.data_dir));
        output.push_str(&format!("Audit log:      {}\n", v.audit_log));
        output.push('\n');
        output.push_str("Data files:\n");
        for (name, status) in &v.files {
            output.push_str(&format!("  {:<18} {}\n", name, status));
        }
        output.push('\n');
        output.push_str("Settings:\n");
        output.push_str(&format!("  currency_symbol:   {}\n", v.settings.currency_symbol));
        output.push_str(&format!("  date_format:       {}\n", v.settings.date_format));
        output.push_str(&format!("  default_user_type: {}\n", v.settings.default_user_type));
        output.push_str(&format!("  audit_enabled:     {}\n", v.settings.audit_enabled));
        output
    })
}
