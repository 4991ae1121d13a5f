//! Display formatting for terminal output
//!
//! List views are rendered as tables; detail views as aligned key/value text.
//! Amounts carry the configured currency symbol.

pub mod budget;
pub mod category;
pub mod transaction;

pub use budget::{format_budget_details, format_budget_list};
pub use category::{format_category_details, format_category_list};
pub use transaction::{format_transaction_details, format_transaction_list};

/// Truncate a string to a maximum number of characters
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
