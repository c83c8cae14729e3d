//! The assembled entity graph.
//!
//! Tables live behind [`Arc`] so that cloning a graph, or replacing one of its
//! tables, never copies the others. Edges are kept in a [`BTreeSet`] and every
//! endpoint of a stored edge names a table of the graph.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{debug, info, warn};

use ehr_model::RelationshipEdge;

use crate::error::SchemaError;
use crate::table::RecordTable;

pub(crate) type TableMap = BTreeMap<String, Arc<RecordTable>>;

/// Outcome of checking one declared edge against a set of tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeStatus {
    Valid,
    Skipped(&'static str),
}

/// Checks a declared edge the way the builder does.
///
/// Absent tables and an absent or all-null child key skip the edge. A present
/// parent without its key column, or with a repeating key, is an error.
pub(crate) fn check_edge(
    tables: &TableMap,
    edge: &RelationshipEdge,
) -> Result<EdgeStatus, SchemaError> {
    let (Some(parent), Some(child)) = (
        tables.get(&edge.parent_entity),
        tables.get(&edge.child_entity),
    ) else {
        return Ok(EdgeStatus::Skipped("table not loaded"));
    };
    if child.present_count(&edge.child_key) == 0 {
        return Ok(EdgeStatus::Skipped("child key absent or empty"));
    }
    if !parent.has_column(&edge.parent_key) {
        return Err(SchemaError::UnknownColumn {
            table: edge.parent_entity.clone(),
            column: edge.parent_key.clone(),
            edge: edge.to_string(),
        });
    }
    if !parent.is_unique(&edge.parent_key) {
        return Err(SchemaError::NonUniqueKey {
            table: edge.parent_entity.clone(),
            column: edge.parent_key.clone(),
            edge: edge.to_string(),
        });
    }
    Ok(EdgeStatus::Valid)
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    pub identifier: String,
    pub time_index: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphSummary {
    pub tables: Vec<TableSummary>,
    pub edges: Vec<RelationshipEdge>,
}

#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    tables: TableMap,
    edges: BTreeSet<RelationshipEdge>,
}

impl EntityGraph {
    pub(crate) fn from_parts(tables: TableMap, edges: BTreeSet<RelationshipEdge>) -> Self {
        Self { tables, edges }
    }

    pub fn table(&self, name: &str) -> Option<&RecordTable> {
        self.tables.get(name).map(Arc::as_ref)
    }

    /// Like [`EntityGraph::table`], but an absent table is an error.
    pub fn require(&self, name: &str) -> Result<&RecordTable, SchemaError> {
        self.table(name).ok_or_else(|| SchemaError::UnknownTable {
            table: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = &RelationshipEdge> {
        self.edges.iter()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn has_edge(&self, edge: &RelationshipEdge) -> bool {
        self.edges.contains(edge)
    }

    /// Edges touching `name` on either side.
    pub fn edges_for(&self, name: &str) -> Vec<&RelationshipEdge> {
        self.edges.iter().filter(|edge| edge.involves(name)).collect()
    }

    /// First edge joining `a` and `b`, in either direction.
    pub fn linking_edge(&self, a: &str, b: &str) -> Option<&RelationshipEdge> {
        self.edges.iter().find(|edge| edge.connects(a, b))
    }

    /// Replaces (or inserts) the data of table `name`.
    ///
    /// An existing table keeps its identifier column, which the new data must
    /// still carry, and its time index while that column survives. Exactly the
    /// edges whose key column on this table disappeared are removed and
    /// returned. A parent key that stops being unique is an error and leaves
    /// the graph untouched.
    pub fn replace_table(
        &mut self,
        name: &str,
        data: DataFrame,
    ) -> Result<Vec<RelationshipEdge>, SchemaError> {
        let Some(current) = self.tables.get(name) else {
            let table = RecordTable::new(name, data)?;
            info!(table = name, rows = table.height(), "inserted table");
            self.tables.insert(name.to_string(), Arc::new(table));
            return Ok(Vec::new());
        };

        let time_index = current.time_index_column.clone();
        let mut table = RecordTable::with_identifier(name, data, &current.identifier_column)?;
        if let Some(column) = time_index {
            if table.has_column(&column) {
                table = table.with_time_index(&column)?;
            } else {
                warn!(table = name, column = %column, "time index column removed");
            }
        }

        let mut dropped = Vec::new();
        for edge in self.edges.iter().filter(|edge| edge.involves(name)) {
            let parent_side = edge.parent_entity == name;
            let child_side = edge.child_entity == name;
            if (parent_side && !table.has_column(&edge.parent_key))
                || (child_side && !table.has_column(&edge.child_key))
            {
                warn!(edge = %edge, "key column removed, dropping relationship");
                dropped.push(edge.clone());
                continue;
            }
            if parent_side && !table.is_unique(&edge.parent_key) {
                return Err(SchemaError::NonUniqueKey {
                    table: name.to_string(),
                    column: edge.parent_key.clone(),
                    edge: edge.to_string(),
                });
            }
        }
        for edge in &dropped {
            self.edges.remove(edge);
        }
        self.tables.insert(name.to_string(), Arc::new(table));
        debug!(table = name, dropped = dropped.len(), "replaced table");
        Ok(dropped)
    }

    /// Adds a derived edge. Both tables and both key columns must exist.
    pub fn add_relationship(&mut self, edge: RelationshipEdge) -> Result<(), SchemaError> {
        for entity in [&edge.parent_entity, &edge.child_entity] {
            if !self.tables.contains_key(entity) {
                return Err(SchemaError::UnknownTable {
                    table: entity.clone(),
                });
            }
        }
        let child = self.require(&edge.child_entity)?;
        if !child.has_column(&edge.child_key) {
            return Err(SchemaError::UnknownColumn {
                table: edge.child_entity.clone(),
                column: edge.child_key.clone(),
                edge: edge.to_string(),
            });
        }
        check_edge(&self.tables, &edge)?;
        debug!(edge = %edge, "added relationship");
        self.edges.insert(edge);
        Ok(())
    }

    /// For each row of `from`, the rows of `to` it links to.
    ///
    /// `from == to` links every row to itself. Otherwise a direct edge between
    /// the two tables is followed in whichever direction it runs.
    pub fn link_rows(&self, from: &str, to: &str) -> Result<Vec<Vec<usize>>, SchemaError> {
        let source = self.require(from)?;
        if from == to {
            return Ok((0..source.height()).map(|idx| vec![idx]).collect());
        }
        let target = self.require(to)?;
        let edge = self
            .linking_edge(from, to)
            .ok_or_else(|| SchemaError::NoRelationshipPath {
                from: from.to_string(),
                to: to.to_string(),
            })?;
        let (source_key, target_key) = if edge.child_entity == from {
            (&edge.child_key, &edge.parent_key)
        } else {
            (&edge.parent_key, &edge.child_key)
        };

        let mut index: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for idx in 0..target.height() {
            if let Some(value) = target.value(target_key, idx) {
                index.entry(value).or_default().push(idx);
            }
        }
        Ok((0..source.height())
            .map(|idx| {
                source
                    .value(source_key, idx)
                    .and_then(|value| index.get(&value).cloned())
                    .unwrap_or_default()
            })
            .collect())
    }

    /// Identifier of each `from` row mapped to the identifiers it links to in `to`.
    pub fn link(&self, from: &str, to: &str) -> Result<BTreeMap<String, Vec<String>>, SchemaError> {
        let rows = self.link_rows(from, to)?;
        let source = self.require(from)?;
        let target = self.require(to)?;
        let mut links = BTreeMap::new();
        for (idx, targets) in rows.into_iter().enumerate() {
            let Some(id) = source.identifier(idx) else {
                continue;
            };
            let ids = targets
                .into_iter()
                .filter_map(|target_idx| target.identifier(target_idx))
                .collect();
            links.insert(id, ids);
        }
        Ok(links)
    }

    /// Follows `hops` from every row of `from` and collects `value_column`
    /// of the rows reached in the last hop.
    pub fn traverse(
        &self,
        from: &str,
        hops: &[&str],
        value_column: &str,
    ) -> Result<Vec<Vec<String>>, SchemaError> {
        let source = self.require(from)?;
        let mut reached: Vec<BTreeSet<usize>> =
            (0..source.height()).map(|idx| BTreeSet::from([idx])).collect();
        let mut current = from;
        for &hop in hops {
            let links = self.link_rows(current, hop)?;
            for rows in &mut reached {
                *rows = rows
                    .iter()
                    .flat_map(|idx| links[*idx].iter().copied())
                    .collect();
            }
            current = hop;
        }
        let last = self.require(current)?;
        if !last.has_column(value_column) {
            return Err(SchemaError::UnknownColumn {
                table: current.to_string(),
                column: value_column.to_string(),
                edge: format!("{from} -> {}", hops.join(" -> ")),
            });
        }
        Ok(reached
            .into_iter()
            .map(|rows| {
                rows.into_iter()
                    .filter_map(|idx| last.value(value_column, idx))
                    .collect()
            })
            .collect())
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            tables: self
                .tables
                .values()
                .map(|table| TableSummary {
                    name: table.name.clone(),
                    rows: table.height(),
                    columns: table.data.width(),
                    identifier: table.identifier_column.clone(),
                    time_index: table.time_index_column.clone(),
                })
                .collect(),
            edges: self.edges.iter().cloned().collect(),
        }
    }
}
