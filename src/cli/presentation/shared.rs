//! Shared presentation: headings, json rendering, init summary.

use crate::error::ApiError;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::Path;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(|e| ApiError::BadRequest(e.to_string()))
}

pub fn format_init_summary(user: &str, config_path: &Path, store_path: &Path) -> String {
    format!(
        "{}\n  User: {}\n  Config: {}\n  Store: {}",
        format_section_heading("Initialized"),
        user,
        config_path.display(),
        store_path.display()
    )
}
