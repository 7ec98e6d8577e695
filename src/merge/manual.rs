//! Manual merges: explicit source columns combined into a target column.
use crate::merge::combine::{combine, MANUAL_SEPARATOR};
use crate::merge::{resolve_columns, MergeError, MergeOutcome, MergeSpec, MergeStrategy};
use crate::spreadsheet::{CellValue, Table, Workbook};
use anyhow::Context;
use tracing::debug;

impl Workbook {
    /// Merges the columns named by `spec` into its target column.
    ///
    /// The stored sheet is only replaced once the whole merge succeeded.
    pub fn manual_merge_columns(&mut self, spec: &MergeSpec) -> Result<MergeOutcome, MergeError> {
        let table = self.sheet(&spec.sheet)
            .ok_or_else(|| MergeError::sheet_not_found(&spec.sheet))?;
        let (merged, outcome) = manual_merge(table, spec)?;
        self.replace_sheet(&spec.sheet, merged)?;
        debug!(
            sheet = %spec.sheet,
            target = %spec.target,
            strategy = %spec.strategy,
            sources = spec.sources.len(),
            rows_before = outcome.rows_before,
            rows_after = outcome.rows_after,
            "merged columns"
        );
        Ok(outcome)
    }
}

/// Computes the result of a manual merge without touching `table`.
pub fn manual_merge(table: &Table, spec: &MergeSpec) -> Result<(Table, MergeOutcome), MergeError> {
    spec.validate()?;
    let indices = resolve_columns(table, &spec.sheet, &spec.sources)?;

    let mut merged = match spec.strategy {
        MergeStrategy::StackValues => stack_values(table, &indices, &spec.target)?,
        strategy => collapse_columns(table, &indices, spec, strategy)?,
    };
    let removed_empty_columns = if spec.remove_empty_columns_after {
        merged.remove_empty_columns()
    } else {
        Vec::new()
    };

    let outcome = MergeOutcome {
        sheet: spec.sheet.to_owned(),
        sources: spec.sources.to_owned(),
        target: spec.target.to_owned(),
        rows_before: table.row_count(),
        rows_after: merged.row_count(),
        removed_empty_columns,
    };
    Ok((merged, outcome))
}

/// One merged value per row, written into the target column.
fn collapse_columns(
    table: &Table,
    indices: &[usize],
    spec: &MergeSpec,
    strategy: MergeStrategy,
) -> anyhow::Result<Table> {
    let mut values = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        let cells = table.row_values(row, indices);
        let value = combine(strategy, &cells, MANUAL_SEPARATOR)
            .with_context(|| format!("row {}", row + 1))?;
        values.push(value);
    }

    let mut merged = table.clone();
    merged.put_column(&spec.target, values)?;
    if spec.delete_source_columns {
        let sources: Vec<&String> = spec.sources.iter()
            .filter(|source| **source != spec.target)
            .collect();
        merged.drop_columns(&sources);
    }
    Ok(merged)
}

/// Rebuilds the table with one row per present source value.
///
/// The source columns are left out of the new schema. Every other column is copied into
/// each emitted row, and a row without any present source value is kept once with an
/// empty target. The target takes the position of an existing non-source column of the
/// same name, otherwise it is appended.
fn stack_values(table: &Table, indices: &[usize], target: &str) -> anyhow::Result<Table> {
    let kept: Vec<usize> = (0..table.column_count())
        .filter(|index| !indices.contains(index))
        .collect();
    let mut names: Vec<String> = kept.iter()
        .map(|&index| table.columns()[index].name.to_owned())
        .collect();
    let position = match names.iter().position(|name| name == target) {
        Some(position) => position,
        None => {
            names.push(target.to_owned());
            names.len() - 1
        }
    };

    let mut rows = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        let base = table.row_values(row, &kept);
        let mut emitted: Vec<CellValue> = table.row_values(row, indices)
            .into_iter()
            .filter(|value| value.is_present())
            .cloned()
            .collect();
        if emitted.is_empty() {
            emitted.push(CellValue::Empty);
        }
        for value in emitted {
            let mut record: Vec<CellValue> = base.iter().map(|cell| (*cell).clone()).collect();
            if position < record.len() {
                record[position] = value;
            } else {
                record.push(value);
            }
            rows.push(record);
        }
    }

    Table::from_rows(names, rows).context("rebuilding stacked table")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workbook(table: Table) -> Workbook {
        let mut workbook = Workbook::new();
        workbook.insert_sheet("Data", table).unwrap();
        workbook
    }

    fn values(table: &Table, column: &str) -> Vec<CellValue> {
        table.column(column).unwrap().values.to_owned()
    }

    fn two_columns(a: Vec<CellValue>, b: Vec<CellValue>) -> Table {
        Table::from_columns(vec![("A", a), ("B", b)]).unwrap()
    }

    #[test]
    fn first_non_empty_merge() {
        let table = two_columns(
            vec![1_i64.into(), CellValue::Empty, "".into()],
            vec![CellValue::Empty, 2_i64.into(), 3_i64.into()],
        );
        let spec = MergeSpec::new("Data", ["A", "B"], "AB", MergeStrategy::FirstNonEmpty);
        let (merged, outcome) = manual_merge(&table, &spec).unwrap();
        assert_eq!(merged.column_names(), vec!["AB"]);
        assert_eq!(values(&merged, "AB"), vec![CellValue::from(1_i64), 2_i64.into(), 3_i64.into()]);
        assert_eq!(outcome.rows_before, 3);
        assert_eq!(outcome.rows_after, 3);
    }

    #[test]
    fn sum_merge_coerces() {
        let table = two_columns(
            vec!["2".into(), "x".into(), CellValue::Empty],
            vec![3_i64.into(), 4_i64.into(), 5_i64.into()],
        );
        let spec = MergeSpec::new("Data", ["A", "B"], "Total", MergeStrategy::Sum);
        let (merged, _) = manual_merge(&table, &spec).unwrap();
        assert_eq!(values(&merged, "Total"), vec![CellValue::from(5_i64), 4_i64.into(), 5_i64.into()]);
    }

    #[test]
    fn concatenate_uses_pipe_separator() {
        let table = two_columns(vec!["a".into(), CellValue::Empty], vec!["b".into(), CellValue::Empty]);
        let spec = MergeSpec::new("Data", ["A", "B"], "AB", MergeStrategy::Concatenate);
        let (merged, _) = manual_merge(&table, &spec).unwrap();
        assert_eq!(values(&merged, "AB"), vec![CellValue::text("a | b"), CellValue::Empty]);
    }

    #[test]
    fn stack_values_expands_rows() {
        let table = Table::from_columns(vec![
            ("Id", vec!["r0".into(), "r1".into()]),
            ("A", vec![1_i64.into(), CellValue::Empty]),
            ("B", vec![2_i64.into(), 3_i64.into()]),
        ]).unwrap();
        let spec = MergeSpec::new("Data", ["A", "B"], "V", MergeStrategy::StackValues);
        let (merged, outcome) = manual_merge(&table, &spec).unwrap();

        assert_eq!(merged.column_names(), vec!["Id", "V"]);
        assert_eq!(merged.row_count(), 3);
        assert_eq!(values(&merged, "Id"), vec![CellValue::text("r0"), "r0".into(), "r1".into()]);
        assert_eq!(values(&merged, "V"), vec![CellValue::from(1_i64), 2_i64.into(), 3_i64.into()]);
        assert_eq!(outcome.rows_added(), 1);

        let present_sources = table.columns()[1..].iter()
            .map(|column| column.present_values().count())
            .sum::<usize>();
        assert_eq!(merged.column("V").unwrap().present_values().count(), present_sources);
    }

    #[test]
    fn stack_values_keeps_empty_rows() {
        let table = Table::from_columns(vec![
            ("Id", vec!["r0".into(), "r1".into()]),
            ("A", vec![CellValue::Empty, "a".into()]),
            ("B", vec![" ".into(), CellValue::Empty]),
        ]).unwrap();
        let spec = MergeSpec::new("Data", ["A", "B"], "V", MergeStrategy::StackValues);
        let (merged, _) = manual_merge(&table, &spec).unwrap();
        assert_eq!(merged.row_count(), 2);
        assert_eq!(values(&merged, "Id"), vec![CellValue::text("r0"), "r1".into()]);
        assert_eq!(values(&merged, "V"), vec![CellValue::Empty, "a".into()]);
    }

    #[test]
    fn stack_values_into_source_name() {
        let table = Table::from_columns(vec![
            ("A", vec![1_i64.into()]),
            ("Id", vec!["r0".into()]),
            ("B", vec![2_i64.into()]),
        ]).unwrap();
        let spec = MergeSpec::new("Data", ["A", "B"], "A", MergeStrategy::StackValues).keep_source_columns();
        let (merged, _) = manual_merge(&table, &spec).unwrap();
        assert_eq!(merged.column_names(), vec!["Id", "A"]);
        assert_eq!(values(&merged, "A"), vec![CellValue::from(1_i64), 2_i64.into()]);
    }

    #[test]
    fn collapsing_keeps_column_count_invariant() {
        let strategies = [
            MergeStrategy::FirstNonEmpty,
            MergeStrategy::Sum,
            MergeStrategy::Concatenate,
            MergeStrategy::PrioritizeDuplicates,
            MergeStrategy::MarkDuplicates,
        ];
        let table = Table::from_columns(vec![
            ("Id", vec![1_i64.into(), 2_i64.into()]),
            ("A", vec!["x".into(), CellValue::Empty]),
            ("B", vec!["x".into(), "y".into()]),
            ("C", vec![CellValue::Empty, "z".into()]),
        ]).unwrap();
        for strategy in strategies {
            let spec = MergeSpec::new("Data", ["A", "B", "C"], "Merged", strategy);
            let (merged, _) = manual_merge(&table, &spec).unwrap();
            assert_eq!(merged.column_count(), table.column_count() - 3 + 1, "{}", strategy);
            assert_eq!(merged.row_count(), table.row_count(), "{}", strategy);
        }
    }

    #[test]
    fn mark_duplicates_merge() {
        let table = two_columns(vec!["x".into(), "x".into()], vec!["x".into(), "y".into()]);
        let spec = MergeSpec::new("Data", ["A", "B"], "AB", MergeStrategy::MarkDuplicates);
        let (merged, _) = manual_merge(&table, &spec).unwrap();
        assert_eq!(values(&merged, "AB"), vec![CellValue::text("x (duplicate)"), "x".into()]);
    }

    #[test]
    fn target_may_be_a_source() {
        let table = Table::from_columns(vec![
            ("Id", vec![1_i64.into()]),
            ("A", vec![CellValue::Empty]),
            ("B", vec!["b".into()]),
        ]).unwrap();
        let spec = MergeSpec::new("Data", ["A", "B"], "A", MergeStrategy::FirstNonEmpty);
        let (merged, _) = manual_merge(&table, &spec).unwrap();
        assert_eq!(merged.column_names(), vec!["Id", "A"]);
        assert_eq!(values(&merged, "A"), vec![CellValue::text("b")]);
    }

    #[test]
    fn keep_sources_and_remove_empty_columns() {
        let table = Table::from_columns(vec![
            ("A", vec![CellValue::Empty, CellValue::Empty]),
            ("B", vec!["b".into(), CellValue::Empty]),
            ("Blank", vec![CellValue::Empty, " ".into()]),
        ]).unwrap();
        let spec = MergeSpec::new("Data", ["A", "B"], "AB", MergeStrategy::FirstNonEmpty)
            .keep_source_columns()
            .remove_empty_columns();
        let (merged, outcome) = manual_merge(&table, &spec).unwrap();
        assert_eq!(merged.column_names(), vec!["B", "AB"]);
        assert_eq!(outcome.removed_empty_columns, vec!["A", "Blank"]);
    }

    #[test]
    fn missing_column_leaves_sheet_unchanged() {
        let table = two_columns(vec![1_i64.into()], vec![2_i64.into()]);
        let mut workbook = workbook(table.clone());
        let spec = MergeSpec::new("Data", ["A", "Ghost"], "Target", MergeStrategy::FirstNonEmpty);
        let error = workbook.manual_merge_columns(&spec).unwrap_err();
        assert!(matches!(&error, MergeError::ColumnNotFound { column, .. } if column == "Ghost"));
        assert_eq!(error.to_string(), "Column 'Ghost' not found in sheet 'Data'");
        assert_eq!(workbook.sheet("Data"), Some(&table));
    }

    #[test]
    fn missing_sheet() {
        let mut workbook = workbook(two_columns(vec![1_i64.into()], vec![2_i64.into()]));
        let spec = MergeSpec::new("Other", ["A", "B"], "AB", MergeStrategy::Sum);
        let error = workbook.manual_merge_columns(&spec).unwrap_err();
        assert!(matches!(error, MergeError::SheetNotFound { sheet } if sheet == "Other"));
    }

    #[test]
    fn failed_merge_is_atomic() {
        let table = two_columns(
            vec![1_i64.into(), 1e308.into()],
            vec![2_i64.into(), 1e308.into()],
        );
        let mut workbook = workbook(table.clone());
        let spec = MergeSpec::new("Data", ["A", "B"], "Total", MergeStrategy::Sum);
        let error = workbook.manual_merge_columns(&spec).unwrap_err();
        assert!(matches!(error, MergeError::Failed(_)));
        assert_eq!(error.to_string(), "Merge failed: row 2: numeric overflow while summing");
        assert_eq!(workbook.sheet("Data"), Some(&table));
    }

    #[test]
    fn committed_merge_replaces_sheet() {
        let mut workbook = workbook(two_columns(vec![1_i64.into()], vec![2_i64.into()]));
        let spec = MergeSpec::new("Data", ["A", "B"], "Total", MergeStrategy::Sum);
        let outcome = workbook.manual_merge_columns(&spec).unwrap();
        assert_eq!(outcome.target, "Total");
        let table = workbook.sheet("Data").unwrap();
        assert_eq!(table.column_names(), vec!["Total"]);
        assert_eq!(values(table, "Total"), vec![CellValue::from(3_i64)]);
    }
}
