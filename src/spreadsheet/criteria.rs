use crate::error::RustyMergeError;
use glob::Pattern;

/// Criteria for selecting which sheets of a workbook an operation visits.
#[derive(Clone, Debug, Default)]
pub struct Criteria {
    /// Sheet name patterns; None accepts every sheet.
    pub sheet_name_patterns: Option<Vec<Pattern>>,

    /// Maximum number of sheets to visit.
    pub sheet_limit: Option<usize>,
}

impl Criteria {
    /// Accepts every sheet.
    pub fn all() -> Self {
        Criteria::default()
    }

    /// Accepts sheets whose names match any of the given glob patterns.
    pub fn matching<S: AsRef<str>>(patterns: &[S]) -> Result<Self, RustyMergeError> {
        let patterns = patterns.iter()
            .map(|pattern| Pattern::new(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Criteria {
            sheet_name_patterns: Some(patterns),
            sheet_limit: None,
        })
    }

    /// Limits the number of visited sheets.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.sheet_limit = Some(limit);
        self
    }

    /// Checks if a sheet name matches the criteria patterns.
    /// Returns true if no patterns are specified or if name matches any pattern.
    pub fn accept(&self, sheet_name: &str) -> bool {
        if let Some(patterns) = &self.sheet_name_patterns {
            patterns.iter().any(|pattern| pattern.matches(sheet_name))
        } else {
            true
        }
    }
}
