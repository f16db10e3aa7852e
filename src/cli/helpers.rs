//! Shared helper functions for CLI commands

use crate::core::identity::EntityId;

/// Format an EntityId for display, truncating if too long
///
/// IDs longer than 16 characters are truncated to 13 chars with "..."
/// suffix for consistent list/table output.
pub fn format_short_id(id: &EntityId) -> String {
    let s = id.to_string();
    if s.len() > 16 {
        format!("{}...", &s[..13])
    } else {
        s
    }
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}

/// Format a dollar amount
pub fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Format an optional dollar amount; unknown renders as "n/a"
pub fn opt_money(amount: Option<f64>) -> String {
    amount.map(money).unwrap_or_else(|| "n/a".to_string())
}

/// Format a gram amount
pub fn grams(amount: f64) -> String {
    format!("{:.0} g", amount)
}
