//! Directory listing formatters.

use crate::entry::{DirEntry, EntryKind};
use crate::error::ApiError;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde_json::json;

fn kind_label(entry: &DirEntry) -> &'static str {
    match entry.kind {
        EntryKind::Directory => "dir",
        EntryKind::Link { .. } => "link",
        EntryKind::File { .. } => "file",
    }
}

/// Render entries as a table: name, kind, size, modification time.
pub fn format_entries_text(entries: &[DirEntry]) -> String {
    if entries.is_empty() {
        return "(empty)".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Kind", "Size", "Modified"]);
    for entry in entries {
        let name = match entry.link_target() {
            Some(target) => format!("{} -> {}", entry.name, target),
            None if entry.is_dir() => format!("{}/", entry.name.as_str().trim_end_matches('/')),
            None => entry.name.to_string(),
        };
        let size = if entry.is_file() {
            entry.size().to_string()
        } else {
            "-".to_string()
        };
        table.add_row(vec![
            name,
            kind_label(entry).to_string(),
            size,
            entry.modified().format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }
    table.to_string()
}

pub fn format_entries_json(entries: &[DirEntry]) -> Result<String, ApiError> {
    let arr: Vec<serde_json::Value> = entries
        .iter()
        .map(|e| {
            json!({
                "name": e.name,
                "kind": kind_label(e),
                "size": e.size(),
                "link": e.link_target(),
                "writer": e.writer,
                "sequence": e.sequence,
                "modified": e.modified().to_rfc3339(),
            })
        })
        .collect();
    super::to_pretty_json(&arr)
}
