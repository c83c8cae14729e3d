use std::fmt;

use serde::{Deserialize, Serialize};

/// A foreign-key relationship between two record tables.
///
/// The parent key must identify parent rows uniquely; the child key holds
/// references to it and may repeat.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub parent_entity: String,
    pub parent_key: String,
    pub child_entity: String,
    pub child_key: String,
}

impl RelationshipEdge {
    pub fn new(
        parent_entity: impl Into<String>,
        parent_key: impl Into<String>,
        child_entity: impl Into<String>,
        child_key: impl Into<String>,
    ) -> Self {
        Self {
            parent_entity: parent_entity.into(),
            parent_key: parent_key.into(),
            child_entity: child_entity.into(),
            child_key: child_key.into(),
        }
    }

    /// Whether the edge touches `entity` on either side.
    pub fn involves(&self, entity: &str) -> bool {
        self.parent_entity == entity || self.child_entity == entity
    }

    /// Whether the edge connects `a` and `b`, in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.parent_entity == a && self.child_entity == b)
            || (self.parent_entity == b && self.child_entity == a)
    }
}

impl fmt::Display for RelationshipEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.parent_entity, self.parent_key, self.child_entity, self.child_key
        )
    }
}

/// Ordered relationship declarations supplied by one record type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipCatalog(Vec<RelationshipEdge>);

impl RelationshipCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an edge whose child side is `child_entity.child_key`.
    pub fn with(
        mut self,
        parent_entity: &str,
        parent_key: &str,
        child_entity: &str,
        child_key: &str,
    ) -> Self {
        self.0.push(RelationshipEdge::new(
            parent_entity,
            parent_key,
            child_entity,
            child_key,
        ));
        self
    }

    pub fn push(&mut self, edge: RelationshipEdge) {
        self.0.push(edge);
    }

    pub fn edges(&self) -> &[RelationshipEdge] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RelationshipEdge> {
        self.0.iter()
    }
}

impl From<Vec<RelationshipEdge>> for RelationshipCatalog {
    fn from(edges: Vec<RelationshipEdge>) -> Self {
        Self(edges)
    }
}

impl FromIterator<RelationshipEdge> for RelationshipCatalog {
    fn from_iter<I: IntoIterator<Item = RelationshipEdge>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RelationshipCatalog {
    type Item = &'a RelationshipEdge;
    type IntoIter = std::slice::Iter<'a, RelationshipEdge>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
