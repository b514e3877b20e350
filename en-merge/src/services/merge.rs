use crate::model::dictionary::Dictionary;

/// Folds `new_words` into `existing`. A key already present is never
/// overwritten; the rejected duplicates are counted and, with
/// `report_duplicates`, logged against `from`.
pub fn merge_words(
    existing: &mut Dictionary,
    new_words: Dictionary,
    from: &str,
    report_duplicates: bool,
) -> usize {
    let mut duplicates = 0usize;

    for (key, line) in new_words {
        if existing.contains_key(&key) {
            duplicates += 1;
            if report_duplicates {
                tracing::info!(key = %key, source = from, "Duplicate entry skipped");
            }
            continue;
        }
        existing.insert(key, line);
    }

    duplicates
}
