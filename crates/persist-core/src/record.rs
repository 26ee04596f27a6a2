// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Generic key-value records held in the store arena.
//!
//! Records never point at each other directly. Relationships are ordered
//! lists of [`ObjectId`]s resolved through a [`RecordSource`], so the object
//! graph may contain cycles without ownership concerns.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Stable identifier of a record inside one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One stored object: scalar attributes plus relationship edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id:         ObjectId,
    entity:     String,
    attributes: BTreeMap<String, Value>,
    #[serde(default)]
    relations:  BTreeMap<String, Vec<ObjectId>>
}

impl Record {
    /// Create an empty record of the given entity.
    #[must_use]
    pub fn new(id: ObjectId, entity: impl Into<String>) -> Self {
        Self {
            id,
            entity: entity.into(),
            attributes: BTreeMap::new(),
            relations: BTreeMap::new()
        }
    }

    /// Record identifier.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Entity name the record belongs to.
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Read an attribute by key.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// All attributes in key order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Related object ids for a relationship, empty when unset.
    #[must_use]
    pub fn related(&self, key: &str) -> &[ObjectId] {
        match self.relations.get(key) {
            Some(ids) => ids,
            None => &[]
        }
    }

    /// Check whether any relationship of this record points at `target`.
    #[must_use]
    pub fn references(&self, target: ObjectId) -> bool {
        self.relations.values().any(|ids| ids.contains(&target))
    }

    pub(crate) fn set_value(&mut self, key: &str, value: Option<Value>) {
        match value {
            Some(value) => {
                self.attributes.insert(key.to_owned(), value);
            }
            None => {
                self.attributes.remove(key);
            }
        }
    }

    pub(crate) fn set_related(&mut self, key: &str, ids: Vec<ObjectId>) {
        if ids.is_empty() {
            self.relations.remove(key);
        } else {
            self.relations.insert(key.to_owned(), ids);
        }
    }

    pub(crate) fn detach(&mut self, target: ObjectId) -> bool {
        let mut changed = false;
        self.relations.retain(|_, ids| {
            let before = ids.len();
            ids.retain(|id| *id != target);
            changed |= ids.len() != before;
            !ids.is_empty()
        });
        changed
    }
}

/// Read access to records, used by mappers to follow relationships.
pub trait RecordSource {
    /// Look up a record by identifier.
    fn record(&self, id: ObjectId) -> Option<&Record>;
}

impl RecordSource for BTreeMap<ObjectId, Record> {
    fn record(&self, id: ObjectId) -> Option<&Record> {
        self.get(&id)
    }
}
