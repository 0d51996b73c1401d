//! Column-name normalization.
//!
//! Two rules coexist and are deliberately kept apart:
//!
//! - [`normalize_field_name`] keys attributes inside a [`super::DynamicRecord`]
//!   (`"Email Address"` -> `email_address`, `"2nd Phone"` -> `col_2nd_phone`)
//! - [`engine_name`] keys mapping descriptors and stored employee fields
//!   (`"Email Address"` -> `EMAIL_ADDRESS`)
//!
//! Lookups on a record accept either form because the record rule folds
//! both to the same key.

/// Record-level key: lowercase, non-alphanumerics to `_`, leading digit prefixed with `col_`.
///
/// Idempotent: `normalize_field_name(&normalize_field_name(x)) == normalize_field_name(x)`.
pub fn normalize_field_name(name: &str) -> String {
    let lowered: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();

    match lowered.chars().next() {
        Some(first) if first.is_ascii_digit() => format!("col_{}", lowered),
        _ => lowered,
    }
}

/// Storage key for a column label: uppercase, spaces to `_`.
pub fn engine_name(label: &str) -> String {
    label.to_uppercase().replace(' ', "_")
}
