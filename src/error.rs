use thiserror::Error;

/// Main error type for the crate.
/// Aggregates errors from the table model, the merge engine and dependencies.
#[derive(Error, Debug)]
pub enum RustyMergeError {
    // Third-party library errors
    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    // Spreadsheet module errors
    #[error("{0}")]
    TableError(#[from] crate::spreadsheet::table::TableError),

    #[error("{0}")]
    WorkbookError(#[from] crate::spreadsheet::WorkbookError),

    // Merge module errors
    #[error("{0}")]
    MergeError(#[from] crate::merge::MergeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::MergeError;

    #[test]
    fn module_errors_keep_their_message() {
        let error: RustyMergeError = MergeError::SheetNotFound { sheet: "Data".to_owned() }.into();
        assert!(matches!(error, RustyMergeError::MergeError(MergeError::SheetNotFound { .. })));
        assert_eq!(error.to_string(), "Sheet 'Data' not found");
    }
}
