use crate::core::{AnalyzerError, Result};
use std::collections::HashMap;

/// A sheet of string cells with a header row.
///
/// Every row has exactly `columns().len()` cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ReviewTable {
    /// Build a table from a raw header row and data rows.
    ///
    /// Blank header cells become `Unnamed: <index>`, repeated names get a `.<n>` suffix,
    /// short rows are padded with empty cells and rows wider than the header extend it.
    pub fn from_rows(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0);

        let mut header = header;
        header.resize(width, String::new());
        let columns = normalize_headers(header);

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Like [`column_index`](Self::column_index), but a missing column is a schema error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| AnalyzerError::MissingColumn {
                column: name.to_string(),
                available: self.columns.clone(),
            })
    }

    pub fn column_values(&self, name: &str) -> Option<impl Iterator<Item = &str> + '_> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[index].as_str()))
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|cells| cells[index].as_str())
    }

    /// Append a column, or overwrite it in place when the name already exists.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(AnalyzerError::ColumnLength {
                column: name.to_string(),
                expected: self.rows.len(),
                actual: values.len(),
            });
        }

        match self.column_index(name) {
            Some(index) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[index] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }
}

fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(index, name)| {
            let name = if name.trim().is_empty() {
                format!("Unnamed: {index}")
            } else {
                name
            };
            let count = seen.entry(name.clone()).or_insert(0);
            let unique = if *count == 0 {
                name
            } else {
                format!("{name}.{count}")
            };
            *count += 1;
            unique
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn blank_and_duplicate_headers_are_renamed() {
        let table = ReviewTable::from_rows(strings(&["Reviews", "", "Reviews"]), vec![]);
        assert_eq!(table.columns(), &["Reviews", "Unnamed: 1", "Reviews.1"]);
    }

    #[test]
    fn ragged_rows_are_padded_to_the_widest() {
        let table = ReviewTable::from_rows(
            strings(&["Reviews"]),
            vec![strings(&["ok"]), strings(&["fine", "extra"])],
        );
        assert_eq!(table.columns(), &["Reviews", "Unnamed: 1"]);
        assert_eq!(table.rows()[0], strings(&["ok", ""]));
    }

    #[test]
    fn set_column_appends_then_overwrites() {
        let mut table = ReviewTable::from_rows(
            strings(&["Reviews"]),
            vec![strings(&["great"]), strings(&["awful"])],
        );
        table
            .set_column("Sentiment", strings(&["POSITIVE", "NEGATIVE"]))
            .unwrap();
        assert_eq!(table.columns(), &["Reviews", "Sentiment"]);

        table
            .set_column("Sentiment", strings(&["NEGATIVE", "NEGATIVE"]))
            .unwrap();
        assert_eq!(table.columns().len(), 2);
        assert_eq!(table.cell(0, "Sentiment"), Some("NEGATIVE"));
    }

    #[test]
    fn set_column_rejects_wrong_length() {
        let mut table = ReviewTable::from_rows(strings(&["Reviews"]), vec![strings(&["great"])]);
        let err = table.set_column("Sentiment", vec![]).unwrap_err();
        assert!(matches!(
            err,
            AnalyzerError::ColumnLength {
                expected: 1,
                actual: 0,
                ..
            }
        ));
    }

    #[test]
    fn require_column_reports_schema_error() {
        let table = ReviewTable::from_rows(strings(&["Text"]), vec![]);
        match table.require_column("Reviews") {
            Err(AnalyzerError::MissingColumn { column, available }) => {
                assert_eq!(column, "Reviews");
                assert_eq!(available, strings(&["Text"]));
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }
}
