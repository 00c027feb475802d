//! String normalization shared by every zone and taint comparison.

/// Trim surrounding whitespace and lower-case.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Compare two values after [`normalize`].
pub fn eq_normalized(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// `Some(value)` when the value holds something other than whitespace.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
