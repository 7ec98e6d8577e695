//! Row combiners: collapse the values of the selected columns in one row into a single cell.
//!
//! Every combiner receives the row's values in source-column order and applies the same
//! notion of presence, see [`CellValue::is_present`].
use crate::merge::MergeStrategy;
use crate::spreadsheet::CellValue;
use anyhow::{bail, Result};

/// Separator used by manual merges and common columns.
pub const MANUAL_SEPARATOR: &str = " | ";

/// Separator used when auto-merging duplicate headers.
pub const AUTO_SEPARATOR: &str = " ";

/// Suffix appended by [`MergeStrategy::MarkDuplicates`].
pub const DUPLICATE_SUFFIX: &str = " (duplicate)";

/// Collapses one row with a row-preserving strategy.
pub fn combine(strategy: MergeStrategy, values: &[&CellValue], separator: &str) -> Result<CellValue> {
    match strategy {
        MergeStrategy::FirstNonEmpty => Ok(first_non_empty(values)),
        MergeStrategy::Sum => coerced_sum(values),
        MergeStrategy::Concatenate => Ok(concatenate(values, separator)),
        MergeStrategy::PrioritizeDuplicates => Ok(prioritize_duplicates(values)),
        MergeStrategy::MarkDuplicates => Ok(mark_duplicates(values)),
        MergeStrategy::StackValues => bail!("{} expands rows and cannot collapse a single row", strategy),
    }
}

/// First present value, or `Empty`.
pub fn first_non_empty(values: &[&CellValue]) -> CellValue {
    values.iter()
        .find(|value| value.is_present())
        .map(|value| (*value).clone())
        .unwrap_or_default()
}

/// Sum of every value coerced to a number, unparseable and blank values counting as 0.
pub fn coerced_sum(values: &[&CellValue]) -> Result<CellValue> {
    finite_sum(values.iter().map(|value| value.coerce_number()))
}

/// Sum of the genuinely numeric values, blanks counting as 0.
pub fn numeric_sum(values: &[&CellValue]) -> Result<CellValue> {
    finite_sum(values.iter().filter_map(|value| value.as_number()))
}

fn finite_sum(numbers: impl Iterator<Item = f64>) -> Result<CellValue> {
    let total: f64 = numbers.sum();
    if !total.is_finite() {
        bail!("numeric overflow while summing");
    }
    Ok(CellValue::Number(total))
}

/// Present values joined by `separator`; `Empty` when nothing is present.
pub fn concatenate(values: &[&CellValue], separator: &str) -> CellValue {
    let parts: Vec<String> = values.iter()
        .filter(|value| value.is_present())
        .map(|value| value.to_string())
        .collect();
    if parts.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(parts.join(separator))
    }
}

/// Most frequent present value; ties go to the earliest value, a row without
/// repeats falls back to [`first_non_empty`].
pub fn prioritize_duplicates(values: &[&CellValue]) -> CellValue {
    let mut best: Option<(&CellValue, usize)> = None;
    for (value, count) in occurrences(values) {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((value, count));
        }
    }
    match best {
        Some((value, count)) if count > 1 => value.clone(),
        _ => first_non_empty(values),
    }
}

/// First present value, suffixed when it occurs more than once in the row.
pub fn mark_duplicates(values: &[&CellValue]) -> CellValue {
    let first = first_non_empty(values);
    if first.is_blank() {
        return first;
    }
    let count = values.iter().filter(|value| **value == &first).count();
    if count > 1 {
        CellValue::Text(format!("{}{}", first, DUPLICATE_SUFFIX))
    } else {
        first
    }
}

/// Present values with their counts, in order of first occurrence.
fn occurrences<'a>(values: &[&'a CellValue]) -> Vec<(&'a CellValue, usize)> {
    let mut counts: Vec<(&CellValue, usize)> = Vec::new();
    for value in values.iter().copied().filter(|value| value.is_present()) {
        match counts.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    counts
}
