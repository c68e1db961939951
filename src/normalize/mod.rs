use crate::model::Dimension;

/// Trimmed string form of a raw field value. Missing values become "".
pub fn normalize_text<S: AsRef<str>>(value: Option<S>) -> String {
    match value {
        Some(v) => v.as_ref().trim().to_string(),
        None => String::new(),
    }
}

/// Canonical key form used for every facet field: trimmed and lowercased.
pub fn normalize_key<S: AsRef<str>>(value: Option<S>) -> String {
    normalize_text(value).to_lowercase()
}

pub fn key(value: &str) -> String {
    normalize_key(Some(value))
}

/// Stable identifier for the control bound to `value` in `dimension`,
/// e.g. `activity:trail running` -> `activity:trail_running`.
pub fn control_id(dimension: Dimension, value: &str) -> String {
    let value = key(value).split_whitespace().collect::<Vec<_>>().join("_");
    format!("{}:{}", dimension.key(), value)
}
