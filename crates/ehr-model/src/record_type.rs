//! Record type declarations and the explicit type registry.
//!
//! A record type names one kind of flat table (Encounter, Period, ...), says
//! whether it plays a temporal role, and declares the relationships in which
//! it is the child. The registry maps a declared type name to a factory so
//! that file or table names can be resolved without runtime reflection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::relationship::RelationshipCatalog;

/// Accepted identifier column names, in lookup order.
pub const IDENTIFIER_CANDIDATES: &[&str] = &["identifier", "id", "object_id"];

/// Column used as the time index for [`TemporalRole::Period`] tables.
pub const PERIOD_TIME_INDEX: &str = "start";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemporalRole {
    #[default]
    None,
    /// The table describes time periods and is indexed by its start.
    Period,
}

impl TemporalRole {
    /// Column to register as the time index, if any.
    pub fn time_index(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Period => Some(PERIOD_TIME_INDEX),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordType {
    pub name: String,
    pub temporal_role: TemporalRole,
    pub relationships: RelationshipCatalog,
}

impl RecordType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            temporal_role: TemporalRole::None,
            relationships: RelationshipCatalog::new(),
        }
    }

    pub fn with_temporal_role(mut self, role: TemporalRole) -> Self {
        self.temporal_role = role;
        self
    }

    /// Declare that `self.child_key` references `parent_entity.parent_key`.
    pub fn references(mut self, child_key: &str, parent_entity: &str, parent_key: &str) -> Self {
        let name = self.name.clone();
        self.relationships = self
            .relationships
            .with(parent_entity, parent_key, &name, child_key);
        self
    }
}

/// Builds the declaration of one record type.
pub type RecordTypeFactory = fn() -> RecordType;

/// Explicit mapping from record type name to its factory.
#[derive(Debug, Clone, Default)]
pub struct RecordTypeRegistry {
    factories: BTreeMap<String, RecordTypeFactory>,
}

impl RecordTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, factory: RecordTypeFactory) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ModelError::EmptyRecordTypeName);
        }
        if self.canonical_name(name).is_some() {
            return Err(ModelError::DuplicateRecordType(name.to_string()));
        }
        self.factories.insert(name.to_string(), factory);
        Ok(())
    }

    pub fn with(mut self, name: &str, factory: RecordTypeFactory) -> Result<Self> {
        self.register(name, factory)?;
        Ok(self)
    }

    /// Registered spelling of `name`, matched case-insensitively.
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        if let Some((key, _)) = self.factories.get_key_value(name) {
            return Some(key.as_str());
        }
        self.factories
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.canonical_name(name).is_some()
    }

    /// Construct the declaration registered under `name`.
    pub fn resolve(&self, name: &str) -> Option<RecordType> {
        let key = self.canonical_name(name)?;
        self.factories.get(key).map(|factory| factory())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn record_types(&self) -> Vec<RecordType> {
        self.factories.values().map(|factory| factory()).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
