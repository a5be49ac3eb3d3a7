//! CLI presentation: text and json formatters per command family.

mod listing;
mod shared;

pub use listing::{format_entries_json, format_entries_text};
pub use shared::{format_init_summary, to_pretty_json};
