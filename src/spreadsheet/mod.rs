//! # Spreadsheet Model Module
//!
//! The minimal tabular model the merge engine works on: cell values, named columns,
//! tables with aligned rows, and the workbook that owns one table per sheet.
//! Reading and writing real spreadsheet formats happens outside this crate; loaders
//! are expected to hand over blank cells as [`CellValue::Empty`].
use thiserror::Error;

pub mod cell;
pub mod column;
pub mod criteria;
pub mod table;

pub use cell::CellValue;
pub use column::{Column, ColumnKind};
pub use criteria::Criteria;
pub use table::{Table, TableError};

/// Errors related to the sheet store itself.
#[derive(Error, Debug, PartialEq)]
pub enum WorkbookError {
    #[error("Sheet '{0}' already exists")]
    DuplicateSheet(String),

    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),
}

/// The session-owned table store: an ordered mapping from sheet name to table.
///
/// Mutating operations take `&mut Workbook`, so at most one merge can be in flight
/// against a workbook at a time. Sheets keep their insertion order, which is the
/// order a saver writes them back in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<(String, Table)>,
}

impl Workbook {
    pub fn new() -> Self {
        Workbook::default()
    }

    /// Adds a new sheet. Sheet names are unique.
    pub fn insert_sheet(&mut self, name: impl Into<String>, table: Table) -> Result<(), WorkbookError> {
        let name = name.into();
        if self.contains_sheet(&name) {
            return Err(WorkbookError::DuplicateSheet(name));
        }
        self.sheets.push((name, table));
        Ok(())
    }

    /// Installs a new table for an existing sheet and returns the previous one.
    pub fn replace_sheet(&mut self, name: &str, table: Table) -> Result<Table, WorkbookError> {
        let slot = self.sheets.iter_mut()
            .find(|(sheet, _)| sheet == name)
            .ok_or_else(|| WorkbookError::SheetNotFound(name.to_owned()))?;
        Ok(std::mem::replace(&mut slot.1, table))
    }

    pub fn sheet(&self, name: &str) -> Option<&Table> {
        self.sheets.iter()
            .find(|(sheet, _)| sheet == name)
            .map(|(_, table)| table)
    }

    pub fn contains_sheet(&self, name: &str) -> bool {
        self.sheet(name).is_some()
    }

    /// Sheet names in insertion order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Sheets selected by the criteria, in insertion order.
    pub fn sheets<'a>(&'a self, criteria: &'a Criteria) -> impl Iterator<Item = (&'a str, &'a Table)> + 'a {
        self.sheets.iter()
            .filter(|(name, _)| criteria.accept(name))
            .take(criteria.sheet_limit.unwrap_or(usize::MAX))
            .map(|(name, table)| (name.as_str(), table))
    }

    /// Every column header of every sheet, in order. Input for header analysis.
    pub fn headers(&self) -> Vec<String> {
        self.sheets.iter()
            .flat_map(|(_, table)| table.column_names())
            .map(str::to_owned)
            .collect()
    }
}
