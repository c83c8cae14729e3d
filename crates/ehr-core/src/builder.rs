//! Assembly of an [`EntityGraph`] from loaded record frames.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use polars::prelude::DataFrame;
use tracing::{debug, info};

use ehr_model::{RecordTypeRegistry, RelationshipCatalog};

use crate::error::SchemaError;
use crate::graph::{EdgeStatus, EntityGraph, TableMap, check_edge};
use crate::table::RecordTable;

#[derive(Debug, Clone)]
struct PendingTable {
    name: String,
    data: DataFrame,
    time_index: Option<String>,
}

/// Collects record frames and relationship catalogs, then validates them
/// into an [`EntityGraph`] in one step.
#[derive(Debug, Clone, Default)]
pub struct EntityGraphBuilder {
    tables: Vec<PendingTable>,
    catalogs: Vec<RelationshipCatalog>,
}

impl EntityGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(self, name: impl Into<String>, data: DataFrame) -> Self {
        self.push_table(name.into(), data, None)
    }

    /// Adds a table whose `time_index` column must hold parseable instants.
    pub fn add_temporal_table(
        self,
        name: impl Into<String>,
        data: DataFrame,
        time_index: impl Into<String>,
    ) -> Self {
        self.push_table(name.into(), data, Some(time_index.into()))
    }

    pub fn add_relationships(mut self, catalog: RelationshipCatalog) -> Self {
        self.catalogs.push(catalog);
        self
    }

    fn push_table(mut self, name: String, data: DataFrame, time_index: Option<String>) -> Self {
        self.tables.push(PendingTable {
            name,
            data,
            time_index,
        });
        self
    }

    /// Seeds a builder from named frames whose names resolve through `registry`.
    ///
    /// Each frame takes its record type's canonical name, temporal role and
    /// relationship catalog.
    pub fn from_registry<I>(registry: &RecordTypeRegistry, frames: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (String, DataFrame)>,
    {
        let mut builder = Self::new();
        for (name, data) in frames {
            let record_type = registry
                .resolve(&name)
                .ok_or(SchemaError::UnknownRecordType { table: name })?;
            builder = match record_type.temporal_role.time_index() {
                Some(column) => builder.add_temporal_table(&record_type.name, data, column),
                None => builder.add_table(&record_type.name, data),
            };
            builder = builder.add_relationships(record_type.relationships);
        }
        Ok(builder)
    }

    /// Validates every table and edge, then creates the graph.
    ///
    /// Nothing is registered unless the whole batch validates.
    pub fn build(self) -> Result<EntityGraph, SchemaError> {
        let mut tables: TableMap = BTreeMap::new();
        for pending in self.tables {
            if tables.contains_key(&pending.name) {
                return Err(SchemaError::DuplicateTable {
                    table: pending.name,
                });
            }
            let mut table = RecordTable::new(pending.name.clone(), pending.data)?;
            if let Some(column) = pending.time_index {
                table = table.with_time_index(&column)?;
            }
            debug!(
                table = %table.name,
                rows = table.height(),
                identifier = %table.identifier_column,
                "validated table"
            );
            tables.insert(pending.name, Arc::new(table));
        }

        let mut edges = BTreeSet::new();
        for edge in self.catalogs.iter().flat_map(RelationshipCatalog::iter) {
            match check_edge(&tables, edge)? {
                EdgeStatus::Valid => {
                    edges.insert(edge.clone());
                }
                EdgeStatus::Skipped(reason) => {
                    debug!(edge = %edge, reason, "skipping relationship");
                }
            }
        }

        info!(
            tables = tables.len(),
            edges = edges.len(),
            "built entity graph"
        );
        Ok(EntityGraph::from_parts(tables, edges))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    fn frame(columns: Vec<(&str, Vec<Option<&str>>)>) -> DataFrame {
        DataFrame::new(
            columns
                .into_iter()
                .map(|(name, values)| Column::new(name.into(), values))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn duplicate_table_names_fail() {
        let err = EntityGraphBuilder::new()
            .add_table("Patient", frame(vec![("identifier", vec![Some("p1")])]))
            .add_table("Patient", frame(vec![("identifier", vec![Some("p2")])]))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateTable { table } if table == "Patient"));
    }

    #[test]
    fn unknown_record_type_is_rejected() {
        let registry = RecordTypeRegistry::fhir();
        let err = EntityGraphBuilder::from_registry(
            &registry,
            vec![("Ward".to_string(), frame(vec![("id", vec![Some("w1")])]))],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownRecordType { table } if table == "Ward"));
    }

    #[test]
    fn registry_canonicalises_names_and_indexes_periods() {
        let registry = RecordTypeRegistry::fhir();
        let graph = EntityGraphBuilder::from_registry(
            &registry,
            vec![(
                "period".to_string(),
                frame(vec![
                    ("object_id", vec![Some("p1")]),
                    ("start", vec![Some("2018-09-20T00:00")]),
                ]),
            )],
        )
        .unwrap()
        .build()
        .unwrap();
        let period = graph.table("Period").expect("canonical name");
        assert_eq!(period.time_index_column.as_deref(), Some("start"));
    }

    #[test]
    fn non_unique_parent_key_fails() {
        let catalog = RelationshipCatalog::new().with("Site", "code", "Ward", "site");
        let err = EntityGraphBuilder::new()
            .add_table(
                "Site",
                frame(vec![
                    ("identifier", vec![Some("s1"), Some("s2")]),
                    ("code", vec![Some("A"), Some("A")]),
                ]),
            )
            .add_table(
                "Ward",
                frame(vec![("identifier", vec![Some("w1")]), ("site", vec![Some("A")])]),
            )
            .add_relationships(catalog)
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::NonUniqueKey { column, .. } if column == "code"));
    }
}
