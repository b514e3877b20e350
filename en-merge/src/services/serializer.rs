use std::path::Path;

use chrono::NaiveDate;

use crate::error::Result;
use crate::model::dictionary::{first_field, Dictionary};
use crate::services::storage::write_atomic;

/// Entries ordered by their first field (case-insensitive), then by the full line.
pub fn sorted_lines(words: &Dictionary) -> Vec<&str> {
    let mut lines: Vec<&str> = words.values().map(String::as_str).collect();
    lines.sort_by(|a, b| {
        first_field(a)
            .to_lowercase()
            .cmp(&first_field(b).to_lowercase())
            .then_with(|| a.cmp(b))
    });
    lines
}

/// Renders the merged dictionary as a Rime `.dict.yaml` document.
pub fn render(words: &Dictionary, name: &str, date: NaiveDate) -> String {
    let mut out = String::new();

    out.push_str("# Rime dictionary\n");
    out.push_str("# encoding: utf-8\n");
    out.push_str("# ------- merged English dictionary -------\n");
    out.push_str("# generated by en-merge\n");
    out.push_str("---\n");
    out.push_str(&format!("name: {name}\n"));
    out.push_str(&format!("version: \"{}\"\n", date.format("%Y-%m-%d")));
    out.push_str("sort: original\n");
    out.push_str("use_preset_vocabulary: false\n");
    out.push_str("...\n\n");

    for line in sorted_lines(words) {
        out.push_str(line.trim_end_matches(['\n', '\r']));
        out.push('\n');
    }

    out
}

pub fn save(path: &Path, words: &Dictionary, name: &str, date: NaiveDate) -> Result<()> {
    let text = render(words, name, date);
    write_atomic(path, text.as_bytes())?;
    tracing::info!(path = %path.display(), entries = words.len(), "Merged dictionary written");
    Ok(())
}
