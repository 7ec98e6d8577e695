use crate::spreadsheet::cell::CellValue;

/// Inferred data kind of a column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    /// Numbers and booleans
    Numeric,
    /// Text values
    Text,
    /// Date/time values
    DateTime,
    /// More than one of the above
    Mixed,
}

impl ColumnKind {
    /// Returns the display name of the column kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "Numeric",
            ColumnKind::Text => "Text",
            ColumnKind::DateTime => "Date/Time",
            ColumnKind::Mixed => "Mixed",
        }
    }

    /// Infers the kind of a single cell value. Blank cells carry no kind.
    pub(crate) fn from(value: &CellValue) -> Option<Self> {
        match value {
            _ if value.is_blank() => None,
            CellValue::Number(_) | CellValue::Boolean(_) => Some(ColumnKind::Numeric),
            CellValue::Text(_) => Some(ColumnKind::Text),
            CellValue::DateTime(_) => Some(ColumnKind::DateTime),
            CellValue::Empty => None,
        }
    }

    /// Detects the common kind of a collection of cell values.
    /// Falls back to Text when no value is present and to Mixed when kinds disagree.
    pub(crate) fn detect<'a>(values: impl IntoIterator<Item = &'a CellValue>) -> ColumnKind {
        let kinds: Vec<ColumnKind> = values.into_iter().filter_map(ColumnKind::from).collect();
        if kinds.is_empty() {
            ColumnKind::Text
        } else if kinds.iter().all(|kind| kind.is_numeric()) {
            ColumnKind::Numeric
        } else if kinds.iter().all(|kind| kind.is_text()) {
            ColumnKind::Text
        } else if kinds.iter().all(|kind| kind.is_datetime()) {
            ColumnKind::DateTime
        } else {
            ColumnKind::Mixed
        }
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Numeric)
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, ColumnKind::Text)
    }

    #[inline]
    pub fn is_datetime(&self) -> bool {
        matches!(self, ColumnKind::DateTime)
    }
}

/// A named column of cell values.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// Column name (header)
    pub name: String,
    /// Cell values, one per row
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    /// Infers the column kind from its present values.
    pub fn kind(&self) -> ColumnKind {
        ColumnKind::detect(&self.values)
    }

    /// Returns true if every value in the column is blank.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(CellValue::is_blank)
    }

    /// Iterates over the values that are present (non-blank).
    pub fn present_values(&self) -> impl Iterator<Item = &CellValue> {
        self.values.iter().filter(|value| value.is_present())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn detect_kinds() {
        let numbers = Column::new("a", vec![1_i64.into(), CellValue::Empty, 2.5.into(), true.into()]);
        assert_eq!(numbers.kind(), ColumnKind::Numeric);

        let texts = Column::new("b", vec!["x".into(), " ".into(), "y".into()]);
        assert_eq!(texts.kind(), ColumnKind::Text);

        let datetime = NaiveDate::from_ymd_opt(2020, 5, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap();
        let dates = Column::new("c", vec![datetime.into(), CellValue::Empty]);
        assert_eq!(dates.kind(), ColumnKind::DateTime);

        let mixed = Column::new("d", vec!["x".into(), 1_i64.into()]);
        assert_eq!(mixed.kind(), ColumnKind::Mixed);
    }

    #[test]
    fn empty_column_is_text() {
        let column = Column::new("e", vec![CellValue::Empty, "  ".into()]);
        assert!(column.is_empty());
        assert_eq!(column.kind(), ColumnKind::Text);
        assert_eq!(column.present_values().count(), 0);
    }
}
