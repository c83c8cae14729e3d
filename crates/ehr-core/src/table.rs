use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::{AnyValue, DataFrame};

use ehr_common::{any_to_string, is_missing_value};
use ehr_model::IDENTIFIER_CANDIDATES;

use crate::datetime::parse_instant;
use crate::error::SchemaError;

/// One flat table of entity instances with its resolved index columns.
#[derive(Debug, Clone)]
pub struct RecordTable {
    pub name: String,
    pub data: DataFrame,
    pub identifier_column: String,
    pub time_index_column: Option<String>,
}

impl RecordTable {
    /// Wrap a frame, resolving the identifier column from the accepted names.
    pub fn new(name: impl Into<String>, data: DataFrame) -> Result<Self, SchemaError> {
        let name = name.into();
        let identifier_column =
            resolve_identifier_column(&data).ok_or_else(|| SchemaError::MissingIdentifier {
                table: name.clone(),
                candidates: IDENTIFIER_CANDIDATES.join(", "),
            })?;
        Self::with_identifier(name, data, identifier_column)
    }

    /// Wrap a frame whose identifier column is already known.
    pub fn with_identifier(
        name: impl Into<String>,
        data: DataFrame,
        identifier_column: impl Into<String>,
    ) -> Result<Self, SchemaError> {
        let table = Self {
            name: name.into(),
            data,
            identifier_column: identifier_column.into(),
            time_index_column: None,
        };
        if !table.has_column(&table.identifier_column) {
            return Err(SchemaError::IdentifierRemoved {
                table: table.name.clone(),
                column: table.identifier_column.clone(),
            });
        }
        if let Some(value) = first_duplicate(&table.data, &table.identifier_column) {
            return Err(SchemaError::DuplicateIdentifier {
                table: table.name.clone(),
                column: table.identifier_column.clone(),
                value,
            });
        }
        Ok(table)
    }

    /// Register `column` as the time index; every present value must parse.
    pub fn with_time_index(mut self, column: &str) -> Result<Self, SchemaError> {
        let Ok(values) = self.data.column(column) else {
            return Err(SchemaError::MissingTimeIndex {
                table: self.name.clone(),
                column: column.to_string(),
            });
        };
        for idx in 0..self.data.height() {
            let value = values.get(idx).unwrap_or(AnyValue::Null);
            if is_missing_value(&value) {
                continue;
            }
            let text = any_to_string(value);
            if parse_instant(&text).is_none() {
                return Err(SchemaError::InvalidTimeIndex {
                    table: self.name.clone(),
                    column: column.to_string(),
                    value: text,
                });
            }
        }
        self.time_index_column = Some(column.to_string());
        Ok(self)
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.data.column(column).is_ok()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect()
    }

    /// Cell as trimmed text, `None` when null, blank or a missing sentinel.
    pub fn value(&self, column: &str, idx: usize) -> Option<String> {
        let value = self.data.column(column).ok()?.get(idx).ok()?;
        if is_missing_value(&value) {
            return None;
        }
        Some(any_to_string(value).trim().to_string())
    }

    /// Raw cell value, `Null` when the column or row is absent.
    pub fn any_value(&self, column: &str, idx: usize) -> AnyValue<'_> {
        self.data
            .column(column)
            .ok()
            .and_then(|values| values.get(idx).ok())
            .unwrap_or(AnyValue::Null)
    }

    pub fn identifier(&self, idx: usize) -> Option<String> {
        self.value(&self.identifier_column, idx)
    }

    pub fn identifiers(&self) -> Vec<Option<String>> {
        (0..self.height()).map(|idx| self.identifier(idx)).collect()
    }

    /// Number of present (non-missing) values in `column`; zero when absent.
    pub fn present_count(&self, column: &str) -> usize {
        if !self.has_column(column) {
            return 0;
        }
        (0..self.height())
            .filter(|idx| self.value(column, *idx).is_some())
            .count()
    }

    /// Whether `column` exists and has no missing values.
    pub fn is_complete(&self, column: &str) -> bool {
        self.has_column(column) && self.present_count(column) == self.height()
    }

    /// Whether the present values of `column` are unique.
    pub fn is_unique(&self, column: &str) -> bool {
        self.has_column(column) && first_duplicate(&self.data, column).is_none()
    }

    /// Row index for every present value of a unique key column.
    pub fn key_index(&self, column: &str) -> BTreeMap<String, usize> {
        let mut index = BTreeMap::new();
        for idx in 0..self.height() {
            if let Some(value) = self.value(column, idx) {
                index.entry(value).or_insert(idx);
            }
        }
        index
    }
}

/// First accepted identifier name present in `data`.
pub fn resolve_identifier_column(data: &DataFrame) -> Option<String> {
    IDENTIFIER_CANDIDATES
        .iter()
        .find(|candidate| data.column(candidate).is_ok())
        .map(|candidate| (*candidate).to_string())
}

fn first_duplicate(data: &DataFrame, column: &str) -> Option<String> {
    let values = data.column(column).ok()?;
    let mut seen = BTreeSet::new();
    for idx in 0..data.height() {
        let value = values.get(idx).unwrap_or(AnyValue::Null);
        if is_missing_value(&value) {
            continue;
        }
        let text = any_to_string(value).trim().to_string();
        if !seen.insert(text.clone()) {
            return Some(text);
        }
    }
    None
}
