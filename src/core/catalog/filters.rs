//! Filter normalization.
//!
//! Filters are forwarded verbatim; the only client-side work is presence
//! normalization. Blank strings and empty lists become `None` so the backend
//! sees `null` rather than an empty constraint. Booleans go through only
//! when explicitly set.

/// `None` for empty or whitespace-only text.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// `None` for an empty list.
pub fn non_empty<T: Clone>(values: &[T]) -> Option<Vec<T>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}
