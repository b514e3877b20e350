use std::collections::HashMap;

/// Normalization key -> full raw line.
pub type Dictionary = HashMap<String, String>;

/// How a line is reduced to the key used for duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum KeyPolicy {
    /// The whole line with every non-ASCII-alphanumeric character removed.
    Fingerprint,
    /// The literal first tab-separated field.
    FirstField,
}

impl Default for KeyPolicy {
    fn default() -> Self {
        KeyPolicy::Fingerprint
    }
}

/// Text before the first tab, or the whole line when there is none.
pub fn first_field(line: &str) -> &str {
    line.split('\t').next().unwrap_or(line)
}
