use super::table::ReviewTable;
use crate::core::{AnalyzerError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// File formats the reader understands, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Spreadsheet,
    Csv,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "ods") => Ok(InputFormat::Spreadsheet),
            Some("csv") => Ok(InputFormat::Csv),
            _ => Err(AnalyzerError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Read the header row and data rows of `path`.
///
/// Spreadsheets read `sheet` when given, otherwise the first worksheet. Rows with no
/// non-empty cell are dropped.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<ReviewTable> {
    let table = match InputFormat::from_path(path)? {
        InputFormat::Spreadsheet => read_spreadsheet(path, sheet)?,
        InputFormat::Csv => read_csv(path)?,
    };
    tracing::debug!(
        path = %path.display(),
        rows = table.len(),
        columns = ?table.columns(),
        "read review table"
    );
    Ok(table)
}

fn read_spreadsheet(path: &Path, sheet: Option<&str>) -> Result<ReviewTable> {
    let mut workbook = open_workbook_auto(path)?;

    let range = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|sheet_name| sheet_name == name) {
                return Err(AnalyzerError::SheetNotFound(name.to_string()));
            }
            workbook.worksheet_range(name)?
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AnalyzerError::Spreadsheet("workbook has no worksheets".into()))??,
    };

    Ok(table_from_records(
        range
            .rows()
            .map(|row| row.iter().map(cell_text).collect()),
    ))
}

fn read_csv(path: &Path) -> Result<ReviewTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let records = reader
        .records()
        .map(|record| record.map(|record| record.iter().map(str::to_string).collect()))
        .collect::<std::result::Result<Vec<Vec<String>>, csv::Error>>()?;

    Ok(table_from_records(records.into_iter()))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        // dataframe rendering of a timestamp, e.g. `2024-03-15 00:00:00`
        Data::DateTime(date) => match date.as_datetime() {
            Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => date.as_f64().to_string(),
        },
        other => other.to_string(),
    }
}

fn table_from_records(mut records: impl Iterator<Item = Vec<String>>) -> ReviewTable {
    let Some(header) = records.next() else {
        return ReviewTable::default();
    };
    let rows = records
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect();
    ReviewTable::from_rows(header, rows)
}
