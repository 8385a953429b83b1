//! Conversion between the comma-separated tag text edited in forms and the
//! tag list carried on the wire.

pub const TAG_DELIMITER: char = ',';
pub const TAG_JOIN_SEPARATOR: &str = ", ";

/// Splits on commas and trims each piece. Empty pieces (`"a,,b"`, a trailing
/// comma, or blank input) are dropped. Duplicates and order are kept.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(TAG_DELIMITER)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_tags<S: AsRef<str>>(tags: &[S]) -> String {
    tags.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(TAG_JOIN_SEPARATOR)
}
