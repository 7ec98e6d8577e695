//! Automatic merging of columns whose headers differ only in case or surrounding whitespace.
use crate::merge::combine::{concatenate, first_non_empty, numeric_sum, AUTO_SEPARATOR};
use crate::merge::{resolve_columns, MergeError, MergeOutcome, MergeStrategy};
use crate::spreadsheet::{CellValue, Criteria, Table, Workbook};
use anyhow::Context;
use tracing::{debug, trace};

/// Columns of one sheet sharing the same case-insensitive header.
#[derive(Clone, Debug, PartialEq)]
pub struct DuplicateGroup {
    /// Lowercased, trimmed header shared by the columns
    pub key: String,
    /// Column names in table order; the first one names the merged column
    pub columns: Vec<String>,
}

/// Duplicate header groups found in one sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetDuplicates {
    pub sheet: String,
    pub groups: Vec<DuplicateGroup>,
}

/// Result of [`Workbook::analyze_duplicate_columns`], the input of [`Workbook::merge_columns`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DuplicateAnalysis {
    pub sheets: Vec<SheetDuplicates>,
}

impl DuplicateAnalysis {
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Number of groups across all sheets.
    pub fn group_count(&self) -> usize {
        self.sheets.iter().map(|sheet| sheet.groups.len()).sum()
    }
}

/// Groups the columns of `table` by lowercased, trimmed header, in order of first appearance.
/// Only groups with at least two columns are returned.
pub fn duplicate_groups(table: &Table) -> Vec<DuplicateGroup> {
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    for name in table.column_names() {
        let key = name.trim().to_lowercase();
        match groups.iter_mut().find(|group| group.key == key) {
            Some(group) => group.columns.push(name.to_owned()),
            None => groups.push(DuplicateGroup { key, columns: vec![name.to_owned()] }),
        }
    }
    groups.retain(|group| group.columns.len() > 1);
    groups
}

impl Workbook {
    /// Finds duplicate headers in every sheet accepted by `criteria`.
    /// Sheets without duplicates are left out.
    pub fn analyze_duplicate_columns(&self, criteria: &Criteria) -> DuplicateAnalysis {
        let sheets: Vec<SheetDuplicates> = self.sheets(criteria)
            .map(|(sheet, table)| SheetDuplicates {
                sheet: sheet.to_owned(),
                groups: duplicate_groups(table),
            })
            .filter(|duplicates| !duplicates.groups.is_empty())
            .collect();
        trace!(sheets = sheets.len(), "duplicate column analysis");
        DuplicateAnalysis { sheets }
    }

    /// Merges every group of `analysis` with `strategy`.
    ///
    /// Allowed strategies are first_non_empty, sum and concatenate. Each group is
    /// replaced by one column carrying the group's first name, appended at the end of
    /// the sheet. All sheets are computed first and committed together, so an error
    /// leaves the whole workbook unchanged.
    pub fn merge_columns(
        &mut self,
        analysis: &DuplicateAnalysis,
        strategy: MergeStrategy,
    ) -> Result<Vec<MergeOutcome>, MergeError> {
        if !matches!(
            strategy,
            MergeStrategy::FirstNonEmpty | MergeStrategy::Sum | MergeStrategy::Concatenate
        ) {
            return Err(MergeError::invalid(format!(
                "{} is not available for duplicate column merges",
                strategy
            )));
        }

        let mut merged_sheets = Vec::with_capacity(analysis.sheets.len());
        let mut outcomes = Vec::new();
        for duplicates in &analysis.sheets {
            let table = self.sheet(&duplicates.sheet)
                .ok_or_else(|| MergeError::sheet_not_found(&duplicates.sheet))?;
            let mut working = table.clone();
            for group in &duplicates.groups {
                merge_group(&mut working, &duplicates.sheet, group, strategy)?;
                outcomes.push(MergeOutcome {
                    sheet: duplicates.sheet.to_owned(),
                    sources: group.columns.to_owned(),
                    target: group.columns[0].to_owned(),
                    rows_before: table.row_count(),
                    rows_after: working.row_count(),
                    removed_empty_columns: Vec::new(),
                });
            }
            merged_sheets.push((duplicates.sheet.as_str(), working));
        }

        for (sheet, table) in merged_sheets {
            self.replace_sheet(sheet, table)?;
            debug!(sheet, strategy = %strategy, "merged duplicate columns");
        }
        Ok(outcomes)
    }
}

/// Replaces the group's columns of `table` by a single merged column.
fn merge_group(
    table: &mut Table,
    sheet: &str,
    group: &DuplicateGroup,
    strategy: MergeStrategy,
) -> Result<(), MergeError> {
    if group.columns.len() < 2 {
        return Err(MergeError::invalid(format!(
            "duplicate group '{}' needs at least two columns",
            group.key
        )));
    }
    let indices = resolve_columns(table, sheet, &group.columns)?;

    // Sum only adds up numeric columns and behaves like first_non_empty without any
    let numeric: Vec<usize> = indices.iter()
        .copied()
        .filter(|&index| table.columns()[index].kind().is_numeric())
        .collect();

    let mut values: Vec<CellValue> = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        let value = match strategy {
            MergeStrategy::Sum if !numeric.is_empty() => numeric_sum(&table.row_values(row, &numeric))
                .with_context(|| format!("row {} of '{}'", row + 1, group.columns[0]))?,
            MergeStrategy::Concatenate => concatenate(&table.row_values(row, &indices), AUTO_SEPARATOR),
            _ => first_non_empty(&table.row_values(row, &indices)),
        };
        values.push(value);
    }

    table.drop_columns(&group.columns);
    table.put_column(&group.columns[0], values)
        .context("appending merged column")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workbook() -> Workbook {
        let mut workbook = Workbook::new();
        workbook.insert_sheet("Orders", Table::from_columns(vec![
            ("Amount", vec![1_i64.into(), CellValue::Empty]),
            ("Id", vec!["o1".into(), "o2".into()]),
            ("amount ", vec![2_i64.into(), 5_i64.into()]),
            ("Note", vec!["a".into(), CellValue::Empty]),
            ("NOTE", vec!["b".into(), "c".into()]),
        ]).unwrap()).unwrap();
        workbook.insert_sheet("Clean", Table::from_columns(vec![
            ("Id", vec![1_i64.into()]),
        ]).unwrap()).unwrap();
        workbook
    }

    #[test]
    fn analysis_groups_case_insensitive_headers() {
        let analysis = workbook().analyze_duplicate_columns(&Criteria::all());
        assert_eq!(analysis.sheets.len(), 1);
        assert_eq!(analysis.group_count(), 2);
        let groups = &analysis.sheets[0].groups;
        assert_eq!(groups[0], DuplicateGroup {
            key: "amount".to_owned(),
            columns: vec!["Amount".to_owned(), "amount ".to_owned()],
        });
        assert_eq!(groups[1].columns, vec!["Note", "NOTE"]);
    }

    #[test]
    fn analysis_respects_criteria() {
        let criteria = Criteria::matching(&["Clean"]).unwrap();
        assert!(workbook().analyze_duplicate_columns(&criteria).is_empty());
    }

    #[test]
    fn sum_merges_numeric_columns() {
        let mut workbook = workbook();
        let analysis = workbook.analyze_duplicate_columns(&Criteria::all());
        let outcomes = workbook.merge_columns(&analysis, MergeStrategy::Sum).unwrap();
        assert_eq!(outcomes.len(), 2);

        let table = workbook.sheet("Orders").unwrap();
        assert_eq!(table.column_names(), vec!["Id", "Amount", "Note"]);
        assert_eq!(table.column("Amount").unwrap().values, vec![CellValue::from(3_i64), 5_i64.into()]);
        // no numeric column in the group
        assert_eq!(table.column("Note").unwrap().values, vec![CellValue::text("a"), "c".into()]);
    }

    #[test]
    fn concatenate_uses_space() {
        let mut workbook = workbook();
        let analysis = workbook.analyze_duplicate_columns(&Criteria::all());
        workbook.merge_columns(&analysis, MergeStrategy::Concatenate).unwrap();
        let table = workbook.sheet("Orders").unwrap();
        assert_eq!(table.column("Note").unwrap().values, vec![CellValue::text("a b"), "c".into()]);
        assert_eq!(table.column("Amount").unwrap().values, vec![CellValue::text("1 2"), "5".into()]);
    }

    #[test]
    fn rejects_row_strategies() {
        let mut workbook = workbook();
        let analysis = workbook.analyze_duplicate_columns(&Criteria::all());
        for strategy in [MergeStrategy::StackValues, MergeStrategy::MarkDuplicates] {
            let error = workbook.merge_columns(&analysis, strategy).unwrap_err();
            assert!(matches!(error, MergeError::InvalidRequest { .. }));
        }
    }

    #[test]
    fn failure_leaves_workbook_unchanged() {
        let mut workbook = workbook();
        workbook.insert_sheet("Huge", Table::from_columns(vec![
            ("X", vec![1e308.into()]),
            ("x", vec![1e308.into()]),
        ]).unwrap()).unwrap();
        let before = workbook.clone();
        let analysis = workbook.analyze_duplicate_columns(&Criteria::all());
        assert_eq!(analysis.sheets.len(), 2);

        let error = workbook.merge_columns(&analysis, MergeStrategy::Sum).unwrap_err();
        assert!(matches!(error, MergeError::Failed(_)));
        assert_eq!(workbook, before);
    }

    #[test]
    fn stale_analysis_is_rejected() {
        let mut workbook = workbook();
        let analysis = DuplicateAnalysis {
            sheets: vec![SheetDuplicates {
                sheet: "Orders".to_owned(),
                groups: vec![DuplicateGroup {
                    key: "ghost".to_owned(),
                    columns: vec!["Ghost".to_owned(), "ghost".to_owned()],
                }],
            }],
        };
        let error = workbook.merge_columns(&analysis, MergeStrategy::FirstNonEmpty).unwrap_err();
        assert_eq!(error.to_string(), "Column 'Ghost' not found in sheet 'Orders'");
    }
}
