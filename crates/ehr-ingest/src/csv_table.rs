use std::collections::BTreeSet;
use std::path::Path;

use csv::ReaderBuilder;
use polars::prelude::{Column, DataFrame};

use crate::error::{IngestError, Result};

/// A raw CSV file: normalised header names and string cells.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Read a CSV file whose first non-blank row is the header.
///
/// Blank rows are skipped; short rows are padded with empty cells and extra
/// cells beyond the header are dropped.
pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    let csv_error = |source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;
    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let Some(header) = headers.as_ref() else {
            headers = Some(record.iter().map(normalize_header).collect());
            continue;
        };
        let mut row = Vec::with_capacity(header.len());
        for idx in 0..header.len() {
            row.push(record.get(idx).map(normalize_cell).unwrap_or_default());
        }
        rows.push(row);
    }
    Ok(CsvTable {
        headers: headers.unwrap_or_default(),
        rows,
    })
}

/// Convert a CSV table into a frame of nullable string columns.
///
/// Empty cells become nulls; other sentinels are left for the consumers
/// that know which columns they care about.
pub fn csv_table_to_frame(table: &CsvTable, path: &Path) -> Result<DataFrame> {
    let mut seen = BTreeSet::new();
    for header in &table.headers {
        if !seen.insert(header.as_str()) {
            return Err(IngestError::DuplicateColumn {
                path: path.to_path_buf(),
                column: header.clone(),
            });
        }
    }
    let mut columns: Vec<Column> = Vec::with_capacity(table.headers.len());
    for (col_idx, header) in table.headers.iter().enumerate() {
        let values: Vec<Option<String>> = table
            .rows
            .iter()
            .map(|row| {
                row.get(col_idx)
                    .filter(|value| !value.is_empty())
                    .cloned()
            })
            .collect();
        columns.push(Column::new(header.as_str().into(), values));
    }
    DataFrame::new(columns).map_err(|source| IngestError::Frame {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_headers() {
        assert_eq!(normalize_header("\u{feff}object_id"), "object_id");
        assert_eq!(normalize_header("  service   Provider "), "service Provider");
    }

    #[test]
    fn empty_cells_become_nulls() {
        let table = CsvTable {
            headers: vec!["identifier".to_string(), "subject".to_string()],
            rows: vec![
                vec!["e1".to_string(), "p1".to_string()],
                vec!["e2".to_string(), String::new()],
            ],
        };
        let df = csv_table_to_frame(&table, Path::new("Encounter.csv")).expect("frame");
        assert_eq!(df.height(), 2);
        let subject = df.column("subject").expect("subject");
        assert_eq!(subject.null_count(), 1);
    }

    #[test]
    fn rejects_duplicate_headers() {
        let table = CsvTable {
            headers: vec!["id".to_string(), "id".to_string()],
            rows: Vec::new(),
        };
        let err = csv_table_to_frame(&table, Path::new("Coding.csv")).unwrap_err();
        assert!(matches!(err, IngestError::DuplicateColumn { column, .. } if column == "id"));
    }
}
