//! Partition observed columns into required and optional sets.

pub use crate::record::engine_name;

use crate::mapping::{ClassifiedColumns, ColumnDescriptor};
use crate::{Error, Result};
use std::collections::HashSet;

/// Classify `observed_labels` against `required_labels` by engine name.
///
/// Fails with the missing required columns when any is absent. The
/// partition is keyed by engine name, so observation order does not change
/// which bucket a column lands in.
pub fn classify<R, O>(required_labels: &[R], observed_labels: &[O]) -> Result<ClassifiedColumns>
where
    R: AsRef<str>,
    O: AsRef<str>,
{
    let required: Vec<String> =
        required_labels.iter().map(|l| engine_name(l.as_ref())).collect();
    let observed: HashSet<String> =
        observed_labels.iter().map(|l| engine_name(l.as_ref())).collect();

    let mut missing = Vec::new();
    for name in &required {
        if !observed.contains(name) && !missing.contains(name) {
            missing.push(name.clone());
        }
    }
    if !missing.is_empty() {
        return Err(Error::missing_columns(missing));
    }

    let required: HashSet<String> = required.into_iter().collect();
    let mut classified = ClassifiedColumns::default();
    for label in observed_labels {
        let label = label.as_ref();
        let name = engine_name(label);
        let descriptor = ColumnDescriptor::new(label, name.clone());
        if required.contains(&name) {
            classified.required_columns.insert(name, descriptor);
        } else {
            classified.non_required_columns.insert(name, descriptor);
        }
    }
    Ok(classified)
}
