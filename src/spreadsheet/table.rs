use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::column::Column;
use thiserror::Error;

/// Errors raised when a table's shape invariants would be broken.
#[derive(Error, Debug, PartialEq)]
pub enum TableError {
    #[error("Duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("Column '{name}' has {actual} values but the table has {expected} rows")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Row {row} has {actual} values but the table has {expected} columns")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// An ordered set of uniquely named columns with positionally aligned rows.
///
/// All columns always have the same length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Creates a table with no columns and no rows.
    pub fn new() -> Self {
        Table::default()
    }

    /// Builds a table from named columns.
    pub fn from_columns<N: Into<String>>(columns: Vec<(N, Vec<CellValue>)>) -> Result<Self, TableError> {
        let mut table = Table::new();
        for (name, values) in columns {
            table.push_column(Column::new(name, values))?;
        }
        Ok(table)
    }

    /// Builds a table from a header row and data rows.
    pub fn from_rows<N: Into<String>>(names: Vec<N>, rows: Vec<Vec<CellValue>>) -> Result<Self, TableError> {
        let mut columns: Vec<Column> = names.into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();
        let row_count = rows.len();
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(TableError::RowWidthMismatch {
                    row: index,
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.values.push(value);
            }
        }
        let mut table = Table { columns: Vec::with_capacity(columns.len()), row_count };
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// All columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Returns the values of one row restricted to the given column indices, in that order.
    pub(crate) fn row_values(&self, index: usize, columns: &[usize]) -> Vec<&CellValue> {
        columns.iter().map(|&col| &self.columns[col].values[index]).collect()
    }

    /// Appends a column, enforcing a unique name and the table's row count.
    /// The first column pushed into a column-less table sets the row count.
    pub fn push_column(&mut self, column: Column) -> Result<(), TableError> {
        if self.contains_column(&column.name) {
            return Err(TableError::DuplicateColumn(column.name.to_owned()));
        }
        if self.columns.is_empty() && self.row_count == 0 {
            self.row_count = column.values.len();
        }
        self.check_length(&column.name, column.values.len())?;
        self.columns.push(column);
        Ok(())
    }

    /// Replaces the values of an existing column in place, or appends a new column.
    pub fn put_column(&mut self, name: &str, values: Vec<CellValue>) -> Result<(), TableError> {
        match self.column_index(name) {
            Some(index) => {
                self.check_length(name, values.len())?;
                self.columns[index].values = values;
                Ok(())
            }
            None => self.push_column(Column::new(name, values)),
        }
    }

    /// Removes the named columns. Names that do not exist are ignored.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) {
        self.columns.retain(|column| !names.iter().any(|name| name.as_ref() == column.name));
    }

    /// Names of the columns that contain at least one present value.
    pub fn non_empty_columns(&self) -> Vec<String> {
        self.columns.iter()
            .filter(|column| !column.is_empty())
            .map(|column| column.name.to_owned())
            .collect()
    }

    /// Names of the columns where every value is blank.
    pub fn empty_columns(&self) -> Vec<String> {
        self.columns.iter()
            .filter(|column| column.is_empty())
            .map(|column| column.name.to_owned())
            .collect()
    }

    /// Drops every all-blank column and returns the dropped names.
    pub fn remove_empty_columns(&mut self) -> Vec<String> {
        let empty = self.empty_columns();
        self.drop_columns(&empty);
        empty
    }

    fn check_length(&self, name: &str, actual: usize) -> Result<(), TableError> {
        if actual != self.row_count {
            return Err(TableError::LengthMismatch {
                name: name.to_owned(),
                expected: self.row_count,
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns(vec![
            ("A", vec![1_i64.into(), CellValue::Empty]),
            ("B", vec!["x".into(), "y".into()]),
            ("C", vec![CellValue::Empty, " ".into()]),
        ]).unwrap()
    }

    #[test]
    fn table_shape() {
        let table = sample();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.column_names(), vec!["A", "B", "C"]);
        assert_eq!(table.row_values(1, &[2, 1]), vec![&CellValue::text(" "), &"y".into()]);
    }

    #[test]
    fn table_rejects_mismatched_lengths() {
        let result = Table::from_columns(vec![
            ("A", vec![1_i64.into()]),
            ("B", vec![]),
        ]);
        assert_eq!(result, Err(TableError::LengthMismatch { name: "B".to_owned(), expected: 1, actual: 0 }));
    }

    #[test]
    fn table_rejects_duplicate_names() {
        let result = Table::from_columns(vec![
            ("A", vec![CellValue::Empty]),
            ("A", vec![CellValue::Empty]),
        ]);
        assert_eq!(result, Err(TableError::DuplicateColumn("A".to_owned())));
    }

    #[test]
    fn table_from_rows() {
        let table = Table::from_rows(vec!["A", "B"], vec![
            vec![1_i64.into(), "x".into()],
            vec![2_i64.into(), "y".into()],
        ]).unwrap();
        assert_eq!(table.column("B").unwrap().values, vec![CellValue::text("x"), CellValue::text("y")]);

        let result = Table::from_rows(vec!["A", "B"], vec![vec![1_i64.into()]]);
        assert_eq!(result, Err(TableError::RowWidthMismatch { row: 0, expected: 2, actual: 1 }));
    }

    #[test]
    fn table_from_rows_without_rows() {
        let table = Table::from_rows(vec!["A", "B"], Vec::new()).unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn put_and_drop_columns() {
        let mut table = sample();
        table.put_column("B", vec!["p".into(), "q".into()]).unwrap();
        assert_eq!(table.column_names(), vec!["A", "B", "C"]);
        table.put_column("D", vec![CellValue::Empty, CellValue::Empty]).unwrap();
        assert_eq!(table.column_names(), vec!["A", "B", "C", "D"]);
        assert!(table.put_column("E", vec![CellValue::Empty]).is_err());

        table.drop_columns(&["A", "Ghost"]);
        assert_eq!(table.column_names(), vec!["B", "C", "D"]);
    }

    #[test]
    fn empty_columns() {
        let mut table = sample();
        assert_eq!(table.non_empty_columns(), vec!["A", "B"]);
        assert_eq!(table.remove_empty_columns(), vec!["C"]);
        assert_eq!(table.column_names(), vec!["A", "B"]);
    }
}
