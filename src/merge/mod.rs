//! # Column Merge Module
//!
//! Combines several columns of a sheet into one. Every entry point validates its
//! request and the referenced columns first, builds the merged table as a new value,
//! and only then installs it in the [`Workbook`](crate::spreadsheet::Workbook). A failed
//! merge leaves the stored sheet exactly as it was.
//!
//! ## Entry points
//!
//! - [`Workbook::manual_merge_columns`](crate::spreadsheet::Workbook::manual_merge_columns):
//!   explicit source columns, any [`MergeStrategy`]
//! - [`Workbook::analyze_duplicate_columns`](crate::spreadsheet::Workbook::analyze_duplicate_columns)
//!   and [`Workbook::merge_columns`](crate::spreadsheet::Workbook::merge_columns):
//!   case-insensitive duplicate headers merged across the whole workbook
//! - [`Workbook::compare_columns_for_duplicates`](crate::spreadsheet::Workbook::compare_columns_for_duplicates)
//!   and [`Workbook::create_common_column`](crate::spreadsheet::Workbook::create_common_column):
//!   duplicate-aware combination next to the sources
//! - [`Workbook::analyze_column`](crate::spreadsheet::Workbook::analyze_column):
//!   read-only column statistics
use crate::spreadsheet::Table;
use crate::spreadsheet::WorkbookError;
use std::fmt::Display;
use thiserror::Error;

pub mod auto;
pub mod combine;
pub mod compare;
pub mod manual;
pub mod profile;

pub use auto::{DuplicateAnalysis, DuplicateGroup, SheetDuplicates};
pub use compare::{ColumnComparison, PairComparison};
pub use profile::{ColumnProfile, ColumnSummary};

/// Errors returned by merge operations. None of them leaves a sheet half-merged.
#[derive(Error, Debug)]
pub enum MergeError {
    /// A referenced column is absent from the sheet
    #[error("Column '{column}' not found in sheet '{sheet}'")]
    ColumnNotFound { sheet: String, column: String },

    /// A referenced sheet is absent from the workbook
    #[error("Sheet '{sheet}' not found")]
    SheetNotFound { sheet: String },

    /// The request itself is unusable
    #[error("Invalid merge request: {reason}")]
    InvalidRequest { reason: String },

    /// The transformation failed part way; the original table is untouched
    #[error("Merge failed: {0:#}")]
    Failed(#[from] anyhow::Error),
}

impl MergeError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        MergeError::InvalidRequest { reason: reason.into() }
    }

    pub(crate) fn sheet_not_found(sheet: &str) -> Self {
        MergeError::SheetNotFound { sheet: sheet.to_owned() }
    }
}

impl From<WorkbookError> for MergeError {
    fn from(error: WorkbookError) -> Self {
        match error {
            WorkbookError::SheetNotFound(sheet) => MergeError::SheetNotFound { sheet },
            error => MergeError::Failed(error.into()),
        }
    }
}

/// Rule for collapsing the selected columns' values of a row.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MergeStrategy {
    /// First present value in source order
    FirstNonEmpty,
    /// Numeric sum
    Sum,
    /// Present values joined with a separator
    Concatenate,
    /// One output row per present value
    StackValues,
    /// Most frequent value, falling back to the first present value
    PrioritizeDuplicates,
    /// First present value, suffixed with " (duplicate)" if it repeats in the row
    MarkDuplicates,
}

impl MergeStrategy {
    pub const ALL: [MergeStrategy; 6] = [
        MergeStrategy::FirstNonEmpty,
        MergeStrategy::Sum,
        MergeStrategy::Concatenate,
        MergeStrategy::StackValues,
        MergeStrategy::PrioritizeDuplicates,
        MergeStrategy::MarkDuplicates,
    ];

    /// Returns the tag of the strategy.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::FirstNonEmpty => "first_non_empty",
            MergeStrategy::Sum => "sum",
            MergeStrategy::Concatenate => "concatenate",
            MergeStrategy::StackValues => "stack_values",
            MergeStrategy::PrioritizeDuplicates => "prioritize_duplicates",
            MergeStrategy::MarkDuplicates => "mark_duplicates",
        }
    }

    /// Parses a strategy tag, ignoring case.
    pub fn parse(tag: &str) -> Result<Self, MergeError> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "first_non_empty" => Ok(MergeStrategy::FirstNonEmpty),
            "sum" => Ok(MergeStrategy::Sum),
            "concatenate" => Ok(MergeStrategy::Concatenate),
            "stack_values" => Ok(MergeStrategy::StackValues),
            "prioritize_duplicates" => Ok(MergeStrategy::PrioritizeDuplicates),
            "mark_duplicates" => Ok(MergeStrategy::MarkDuplicates),
            _ => Err(MergeError::invalid(format!("unknown merge strategy '{}'", tag))),
        }
    }

    /// True for strategies that change the number of rows.
    pub fn expands_rows(&self) -> bool {
        matches!(self, MergeStrategy::StackValues)
    }
}

impl Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A merge decision: which columns of which sheet, into which column, how.
#[derive(Clone, Debug, PartialEq)]
pub struct MergeSpec {
    /// Sheet to modify
    pub sheet: String,
    /// Source columns in priority order (at least two)
    pub sources: Vec<String>,
    /// Column receiving the merged values; created or overwritten
    pub target: String,
    pub strategy: MergeStrategy,
    /// Drop the source columns afterwards (default: true)
    pub delete_source_columns: bool,
    /// Drop every all-blank column afterwards (default: false)
    pub remove_empty_columns_after: bool,
}

impl MergeSpec {
    pub fn new<I, S>(sheet: impl Into<String>, sources: I, target: impl Into<String>, strategy: MergeStrategy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MergeSpec {
            sheet: sheet.into(),
            sources: sources.into_iter().map(Into::into).collect(),
            target: target.into(),
            strategy,
            delete_source_columns: true,
            remove_empty_columns_after: false,
        }
    }

    /// Keeps the source columns next to the merged column.
    pub fn keep_source_columns(mut self) -> Self {
        self.delete_source_columns = false;
        self
    }

    /// Drops all-blank columns from the result.
    pub fn remove_empty_columns(mut self) -> Self {
        self.remove_empty_columns_after = true;
        self
    }

    /// Checks the request shape: at least two distinct sources and a target name.
    pub fn validate(&self) -> Result<(), MergeError> {
        validate_columns(&self.sources)?;
        validate_target(&self.target)
    }
}

pub(crate) fn validate_columns(columns: &[String]) -> Result<(), MergeError> {
    if columns.len() < 2 {
        return Err(MergeError::invalid(format!(
            "at least two source columns are required, got {}",
            columns.len()
        )));
    }
    for (index, column) in columns.iter().enumerate() {
        if columns[..index].contains(column) {
            return Err(MergeError::invalid(format!("source column '{}' is listed twice", column)));
        }
    }
    Ok(())
}

pub(crate) fn validate_target(target: &str) -> Result<(), MergeError> {
    if target.trim().is_empty() {
        return Err(MergeError::invalid("target column name is empty"));
    }
    Ok(())
}

/// Resolves column names to indices, failing on the first missing one.
pub(crate) fn resolve_columns(table: &Table, sheet: &str, columns: &[String]) -> Result<Vec<usize>, MergeError> {
    columns.iter()
        .map(|column| {
            table.column_index(column).ok_or_else(|| MergeError::ColumnNotFound {
                sheet: sheet.to_owned(),
                column: column.to_owned(),
            })
        })
        .collect()
}

/// What a committed merge did.
#[derive(Clone, Debug, PartialEq)]
pub struct MergeOutcome {
    pub sheet: String,
    pub sources: Vec<String>,
    pub target: String,
    pub rows_before: usize,
    pub rows_after: usize,
    /// All-blank columns dropped after the merge
    pub removed_empty_columns: Vec<String>,
}

impl MergeOutcome {
    /// Rows added by a row-expanding merge.
    pub fn rows_added(&self) -> usize {
        self.rows_after.saturating_sub(self.rows_before)
    }
}
