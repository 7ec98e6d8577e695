//! Row-wise duplicate detection across a set of columns, and the common column built from it.
use crate::merge::combine::{combine, MANUAL_SEPARATOR};
use crate::merge::{resolve_columns, validate_columns, validate_target, MergeError, MergeOutcome, MergeStrategy};
use crate::spreadsheet::{CellValue, Column, Table, TableError, Workbook};
use anyhow::Context;
use tracing::debug;

/// Equality of two columns, row by row. Blank cells never match.
#[derive(Clone, Debug, PartialEq)]
pub struct PairComparison {
    pub left: String,
    pub right: String,
    pub matches: Vec<bool>,
}

impl PairComparison {
    /// Name of the indicator column, `<left>_eq_<right>`.
    pub fn name(&self) -> String {
        format!("{}_eq_{}", self.left, self.right)
    }

    pub fn match_count(&self) -> usize {
        self.matches.iter().filter(|matched| **matched).count()
    }
}

/// Outcome of [`compare_columns`].
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnComparison {
    pub columns: Vec<String>,
    /// Every unordered pair of `columns`, in column order
    pub pairs: Vec<PairComparison>,
    /// True for rows where at least one pair matches
    pub has_duplicates: Vec<bool>,
}

impl ColumnComparison {
    pub fn total_rows(&self) -> usize {
        self.has_duplicates.len()
    }

    /// Zero-based indices of the rows holding a duplicate.
    pub fn duplicate_rows(&self) -> Vec<usize> {
        self.has_duplicates.iter()
            .enumerate()
            .filter(|(_, duplicate)| **duplicate)
            .map(|(row, _)| row)
            .collect()
    }

    pub fn duplicate_count(&self) -> usize {
        self.has_duplicates.iter().filter(|duplicate| **duplicate).count()
    }

    /// The compared columns followed by a `Has_Duplicates` column and one
    /// `<left>_eq_<right>` column per pair, for review.
    pub fn to_table(&self, source: &Table) -> Result<Table, TableError> {
        let mut table = Table::new();
        for name in &self.columns {
            if let Some(column) = source.column(name) {
                table.push_column(column.clone())?;
            }
        }
        table.push_column(indicator_column("Has_Duplicates", &self.has_duplicates))?;
        for pair in &self.pairs {
            table.push_column(indicator_column(&pair.name(), &pair.matches))?;
        }
        Ok(table)
    }
}

fn indicator_column(name: &str, flags: &[bool]) -> Column {
    Column::new(name, flags.iter().map(|flag| CellValue::Boolean(*flag)).collect())
}

/// Compares every pair of `columns` row by row.
pub fn compare_columns(table: &Table, sheet: &str, columns: &[String]) -> Result<ColumnComparison, MergeError> {
    validate_columns(columns)?;
    let indices = resolve_columns(table, sheet, columns)?;
    let cells = table.columns();

    let mut pairs = Vec::new();
    let mut has_duplicates = vec![false; table.row_count()];
    for (position, &left) in indices.iter().enumerate() {
        for &right in &indices[position + 1..] {
            let matches: Vec<bool> = cells[left].values.iter()
                .zip(&cells[right].values)
                .map(|(a, b)| a.is_present() && a == b)
                .collect();
            for (duplicate, matched) in has_duplicates.iter_mut().zip(&matches) {
                *duplicate |= *matched;
            }
            pairs.push(PairComparison {
                left: cells[left].name.to_owned(),
                right: cells[right].name.to_owned(),
                matches,
            });
        }
    }

    Ok(ColumnComparison {
        columns: columns.to_owned(),
        pairs,
        has_duplicates,
    })
}

impl Workbook {
    /// Compares the given columns of a sheet for row-wise duplicates.
    pub fn compare_columns_for_duplicates(&self, sheet: &str, columns: &[String]) -> Result<ColumnComparison, MergeError> {
        let table = self.sheet(sheet).ok_or_else(|| MergeError::sheet_not_found(sheet))?;
        compare_columns(table, sheet, columns)
    }

    /// Adds (or overwrites) `new_name` with the combination of `columns`, keeping the sources.
    ///
    /// Allowed strategies are first_non_empty, prioritize_duplicates, mark_duplicates and
    /// concatenate. With `mark_duplicates`, a Boolean `<new_name>_has_duplicate` column
    /// flags the rows where two of the columns agree.
    pub fn create_common_column(
        &mut self,
        sheet: &str,
        columns: &[String],
        new_name: &str,
        strategy: MergeStrategy,
        mark_duplicates: bool,
    ) -> Result<MergeOutcome, MergeError> {
        let table = self.sheet(sheet).ok_or_else(|| MergeError::sheet_not_found(sheet))?;
        let merged = common_column(table, sheet, columns, new_name, strategy, mark_duplicates)?;
        let outcome = MergeOutcome {
            sheet: sheet.to_owned(),
            sources: columns.to_owned(),
            target: new_name.to_owned(),
            rows_before: table.row_count(),
            rows_after: merged.row_count(),
            removed_empty_columns: Vec::new(),
        };
        self.replace_sheet(sheet, merged)?;
        debug!(sheet, target = new_name, strategy = %strategy, mark_duplicates, "created common column");
        Ok(outcome)
    }
}

fn common_column(
    table: &Table,
    sheet: &str,
    columns: &[String],
    new_name: &str,
    strategy: MergeStrategy,
    mark_duplicates: bool,
) -> Result<Table, MergeError> {
    if !matches!(
        strategy,
        MergeStrategy::FirstNonEmpty
            | MergeStrategy::PrioritizeDuplicates
            | MergeStrategy::MarkDuplicates
            | MergeStrategy::Concatenate
    ) {
        return Err(MergeError::invalid(format!("{} is not available for common columns", strategy)));
    }
    validate_target(new_name)?;
    let comparison = compare_columns(table, sheet, columns)?;
    let indices = resolve_columns(table, sheet, columns)?;

    let mut values = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        let value = combine(strategy, &table.row_values(row, &indices), MANUAL_SEPARATOR)
            .with_context(|| format!("row {}", row + 1))?;
        values.push(value);
    }

    let mut merged = table.clone();
    merged.put_column(new_name, values).context("writing common column")?;
    if mark_duplicates {
        let flags = comparison.has_duplicates.iter().map(|flag| CellValue::Boolean(*flag)).collect();
        merged.put_column(&format!("{}_has_duplicate", new_name), flags)
            .context("writing duplicate flags")?;
    }
    Ok(merged)
}
