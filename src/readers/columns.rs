use crate::error::{ProcessingError, Result};

/// Collapse internal whitespace (line breaks included) to single spaces
pub fn normalize_header(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Locate a column by name: an exact match wins, otherwise the first header
/// starting with `name` (sheet headers often carry trailing notes).
pub fn find_column<'a, I>(headers: I, name: &str) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized: Vec<String> = headers.into_iter().map(normalize_header).collect();

    normalized
        .iter()
        .position(|header| header == name)
        .or_else(|| normalized.iter().position(|header| header.starts_with(name)))
}

/// Indices of `required` columns, or `MissingRequiredColumn` listing every absent one
pub fn require_columns<'a, I>(table: &str, headers: I, required: &[&str]) -> Result<Vec<usize>>
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    let mut indices = Vec::with_capacity(required.len());
    let mut missing = Vec::new();

    for name in required {
        match find_column(headers.clone(), name) {
            Some(index) => indices.push(index),
            None => missing.push(name.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(indices)
    } else {
        Err(ProcessingError::missing_columns(table, missing))
    }
}
