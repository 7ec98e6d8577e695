use chrono::NaiveDateTime;
use std::fmt::Display;

/// A single cell value in a table column.
///
/// Loaders map blank cells, empty CSV fields and missing values to [`CellValue::Empty`].
/// Whitespace-only text is still treated as empty by every merge rule, see [`CellValue::is_blank`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Boolean(bool),
    /// Numeric values
    Number(f64),
    /// Text values, stored as read
    Text(String),
    /// Date/time values
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Creates a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Returns true for `Empty` and for text that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(value) => value.trim().is_empty(),
            _ => false,
        }
    }

    /// Returns true if the cell holds a value that merge rules consider present.
    #[inline]
    pub fn is_present(&self) -> bool {
        !self.is_blank()
    }

    /// Returns the numeric value for numbers and booleans, None for everything else.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            CellValue::Boolean(value) => Some(if *value { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Coerces the cell to a number, parsing text and mapping anything unparseable to 0.
    /// Text such as "inf" or "NaN" is not a number here.
    pub fn coerce_number(&self) -> f64 {
        match self {
            CellValue::Text(value) => value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .unwrap_or(0.0),
            _ => self.as_number().unwrap_or(0.0),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(value) => write!(f, "{}", if *value { "true" } else { "false" }),
            CellValue::Number(value) => write!(f, "{}", to_number_string(*value)),
            CellValue::Text(value) => write!(f, "{}", value),
            CellValue::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Formats integral numbers without a fractional part ("3" instead of "3.0").
fn to_number_string(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
