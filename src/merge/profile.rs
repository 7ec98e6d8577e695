//! Read-only column statistics shown before choosing a merge.
use crate::merge::MergeError;
use crate::spreadsheet::{CellValue, ColumnKind, Table, Workbook};
use chrono::NaiveDateTime;
use std::collections::HashSet;

/// Number of sample values kept by [`analyze_column`].
pub const SAMPLE_SIZE: usize = 10;

/// Kind-specific statistics over the present values of a column.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnSummary {
    Numeric { min: f64, max: f64, mean: f64, median: f64 },
    Text { min_length: usize, max_length: usize, avg_length: f64 },
    DateTime { earliest: NaiveDateTime, latest: NaiveDateTime },
    /// Mixed columns and columns without present values
    None,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub total_rows: usize,
    pub non_empty_count: usize,
    pub empty_count: usize,
    /// Share of blank cells, 0 to 100
    pub empty_percentage: f64,
    /// Number of distinct present values
    pub unique_count: usize,
    /// First present values in row order
    pub sample_values: Vec<CellValue>,
    pub kind: ColumnKind,
    pub summary: ColumnSummary,
}

/// Profiles one column of `table`.
pub fn analyze_column(table: &Table, sheet: &str, column: &str) -> Result<ColumnProfile, MergeError> {
    let values = &table.column(column)
        .ok_or_else(|| MergeError::ColumnNotFound {
            sheet: sheet.to_owned(),
            column: column.to_owned(),
        })?
        .values;
    let present: Vec<&CellValue> = values.iter().filter(|value| value.is_present()).collect();

    let total_rows = values.len();
    let non_empty_count = present.len();
    let empty_count = total_rows - non_empty_count;
    let empty_percentage = if total_rows == 0 {
        0.0
    } else {
        empty_count as f64 * 100.0 / total_rows as f64
    };
    let unique_count = present.iter().map(|value| unique_key(value)).collect::<HashSet<_>>().len();
    let kind = ColumnKind::detect(present.iter().copied());

    Ok(ColumnProfile {
        name: column.to_owned(),
        total_rows,
        non_empty_count,
        empty_count,
        empty_percentage,
        unique_count,
        sample_values: present.iter().take(SAMPLE_SIZE).map(|value| (*value).clone()).collect(),
        kind,
        summary: summarize(kind, &present),
    })
}

/// Distinguishes values of different variants that display alike, such as 1 and "1".
fn unique_key(value: &CellValue) -> (u8, String) {
    let tag = match value {
        CellValue::Empty => 0,
        CellValue::Boolean(_) => 1,
        CellValue::Number(_) => 2,
        CellValue::Text(_) => 3,
        CellValue::DateTime(_) => 4,
    };
    (tag, value.to_string())
}

fn summarize(kind: ColumnKind, present: &[&CellValue]) -> ColumnSummary {
    if present.is_empty() {
        return ColumnSummary::None;
    }
    match kind {
        ColumnKind::Numeric => {
            let mut numbers: Vec<f64> = present.iter().filter_map(|value| value.as_number()).collect();
            numbers.sort_by(f64::total_cmp);
            let count = numbers.len();
            let median = if count % 2 == 0 {
                (numbers[count / 2 - 1] + numbers[count / 2]) / 2.0
            } else {
                numbers[count / 2]
            };
            ColumnSummary::Numeric {
                min: numbers[0],
                max: numbers[count - 1],
                mean: numbers.iter().sum::<f64>() / count as f64,
                median,
            }
        }
        ColumnKind::Text => {
            let lengths: Vec<usize> = present.iter().map(|value| value.to_string().chars().count()).collect();
            ColumnSummary::Text {
                min_length: lengths.iter().copied().min().unwrap_or_default(),
                max_length: lengths.iter().copied().max().unwrap_or_default(),
                avg_length: lengths.iter().sum::<usize>() as f64 / lengths.len() as f64,
            }
        }
        ColumnKind::DateTime => {
            let datetimes: Vec<NaiveDateTime> = present.iter()
                .filter_map(|value| match value {
                    CellValue::DateTime(datetime) => Some(*datetime),
                    _ => None,
                })
                .collect();
            match (datetimes.iter().min(), datetimes.iter().max()) {
                (Some(earliest), Some(latest)) => ColumnSummary::DateTime {
                    earliest: *earliest,
                    latest: *latest,
                },
                _ => ColumnSummary::None,
            }
        }
        ColumnKind::Mixed => ColumnSummary::None,
    }
}

impl Workbook {
    /// Profiles one column of a sheet without modifying anything.
    pub fn analyze_column(&self, sheet: &str, column: &str) -> Result<ColumnProfile, MergeError> {
        let table = self.sheet(sheet).ok_or_else(|| MergeError::sheet_not_found(sheet))?;
        analyze_column(table, sheet, column)
    }
}
