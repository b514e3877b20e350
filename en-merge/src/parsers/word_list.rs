use std::sync::LazyLock;

use regex::Regex;

use crate::model::dictionary::{first_field, Dictionary, KeyPolicy};

static NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]").unwrap());

/// Derives the duplicate-detection key of a dictionary line.
pub fn normalize_key(line: &str, policy: KeyPolicy) -> String {
    match policy {
        KeyPolicy::Fingerprint => NON_ALNUM.replace_all(line, "").into_owned(),
        KeyPolicy::FirstField => first_field(line).to_string(),
    }
}

/// A line takes part in the dictionary only if it has a tab and is not a comment.
fn is_entry_line(line: &str, policy: KeyPolicy) -> bool {
    if !line.contains('\t') {
        return false;
    }

    match policy {
        KeyPolicy::Fingerprint => !line.starts_with('#'),
        KeyPolicy::FirstField => !first_field(line).starts_with('#'),
    }
}

/// Extracts the entries of one source file.
///
/// Within a single file a repeated key keeps the later line.
pub fn extract(content: &str, policy: KeyPolicy) -> Dictionary {
    let mut words = Dictionary::new();

    for line in content.split('\n') {
        // CRLF sources
        let line = line.trim_end_matches('\r');

        if !is_entry_line(line, policy) {
            continue;
        }

        words.insert(normalize_key(line, policy), line.to_string());
    }

    words
}
