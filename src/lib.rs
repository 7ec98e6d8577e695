//! # Spreadsheet Column Merge Toolkit
//!
//! Finds column headers that probably name the same thing and merges their columns.
//! File loading and saving are left to the caller, which hands over sheets as
//! [`Table`](spreadsheet::Table)s inside a [`Workbook`](spreadsheet::Workbook).
//!
//! ## Features
//!
//! - **Header normalization**: case, punctuation, whitespace and common prefixes such as `col_`
//!   are ignored when comparing headers
//! - **Three detectors**: exact duplicates after normalization, fuzzy spelling variants, and
//!   headers sharing a significant word
//! - **Abbreviation scoring**: `SIN` matches `Sample Identification Number`
//! - **Merge suggestions**: a canonical name per group and a review text
//! - **Six merge strategies**: first non-empty, sum, concatenate, stack into rows,
//!   prioritize duplicates and mark duplicates
//! - **Duplicate-header auto merge**: case-insensitive duplicates merged across a whole workbook
//! - **Atomic merges**: a failed merge never leaves a sheet half-modified
//! - **Column diagnostics**: duplicate comparison and per-column statistics
//!
//! ## Modules
//!
//! - [`similarity`]: `HeaderSimilarityAnalyzer` and its reports
//! - [`merge`]: the merge engine, exposed as methods on `Workbook`
//! - [`spreadsheet`]: the tabular model
pub mod error;
pub mod merge;
pub mod similarity;
pub mod spreadsheet;

pub use error::RustyMergeError;
pub use merge::{MergeError, MergeOutcome, MergeSpec, MergeStrategy};
pub use similarity::{AnalyzerSettings, HeaderGroup, HeaderSimilarityAnalyzer, SuggestionReport};
pub use spreadsheet::{CellValue, Criteria, Table, Workbook};
