// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Normalized entity schema.
//!
//! A [`Schema`] is what `#[persistence_service]` emits as `schema()`: one
//! [`EntityDescriptor`] per entity carrying its attributes, then relationship
//! edges added in a second pass with [`EntityDescriptor::relate`].
//!
//! ```rust
//! use persist_core::{AttributeDescriptor, AttributeType, DeleteRule, EntityDescriptor, Schema};
//!
//! let mut author = EntityDescriptor::new("Author")
//!     .attribute(AttributeDescriptor::new("id", AttributeType::String));
//! let book = EntityDescriptor::new("Book")
//!     .attribute(AttributeDescriptor::new("pages", AttributeType::Integer));
//! author.relate(&book, "books", 0, DeleteRule::Cascade);
//!
//! let schema = Schema::new("Library", vec![author, book]);
//! assert!(schema.entity("Author").unwrap().relationship("books").unwrap().is_to_many());
//! ```

use serde::{Deserialize, Serialize};

use crate::value::{AttributeType, Value};

/// What happens to related records when their owner is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteRule {
    /// Delete the related records too.
    #[default]
    Cascade,

    /// Leave related records alone, only the edge goes away.
    Nullify
}

/// One scalar attribute of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    /// Attribute key, equal to the field name.
    pub name: String,

    /// Storage type.
    pub attribute_type: AttributeType,

    /// Whether the attribute may be absent.
    pub optional: bool,

    /// Value written on insert.
    pub default_value: Option<Value>,

    /// Whether the attribute holds a list of scalars.
    pub is_array: bool
}

impl AttributeDescriptor {
    /// Descriptor with the default optionality and default value for its
    /// type.
    ///
    /// | Type | Optional | Default |
    /// |------|----------|---------|
    /// | Integer | no | `0` |
    /// | String | yes | `""` |
    /// | Float, Double | yes | `0.0` |
    /// | Boolean, Timestamp | yes | none |
    #[must_use]
    pub fn new(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        let default_value = match attribute_type {
            AttributeType::Integer => Some(Value::Integer(0)),
            AttributeType::String => Some(Value::String(String::new())),
            AttributeType::Float => Some(Value::Float(0.0)),
            AttributeType::Double => Some(Value::Double(0.0)),
            AttributeType::Boolean | AttributeType::Timestamp => None
        };
        Self {
            name: name.into(),
            attribute_type,
            optional: attribute_type != AttributeType::Integer,
            default_value,
            is_array: false
        }
    }

    /// Mark the attribute optional even if its type defaults otherwise.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Turn the attribute into a scalar array: optional, no default.
    #[must_use]
    pub fn array(mut self) -> Self {
        self.is_array = true;
        self.optional = true;
        self.default_value = None;
        self
    }
}

/// Relationship edge from one entity to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDescriptor {
    /// Relationship key, equal to the field name.
    pub name: String,

    /// Target entity name.
    pub destination: String,

    /// Maximum member count, `0` means unbounded.
    pub max_count: usize,

    /// Deletion policy applied when the owner is deleted.
    pub delete_rule: DeleteRule
}

impl RelationshipDescriptor {
    /// Whether the edge can hold more than one member.
    #[must_use]
    pub const fn is_to_many(&self) -> bool {
        self.max_count != 1
    }
}

/// Attributes and relationships of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    name:          String,
    attributes:    Vec<AttributeDescriptor>,
    relationships: Vec<RelationshipDescriptor>
}

impl EntityDescriptor {
    /// Empty descriptor for the named entity.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            relationships: Vec::new()
        }
    }

    /// Append an attribute.
    #[must_use]
    pub fn attribute(mut self, attribute: AttributeDescriptor) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add a relationship edge to an already-built descriptor.
    pub fn relate(
        &mut self,
        destination: &EntityDescriptor,
        name: impl Into<String>,
        max_count: usize,
        delete_rule: DeleteRule
    ) {
        self.relationships.push(RelationshipDescriptor {
            name: name.into(),
            destination: destination.name.clone(),
            max_count,
            delete_rule
        });
    }

    /// Entity name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    /// Relationships in declaration order.
    #[must_use]
    pub fn relationships(&self) -> &[RelationshipDescriptor] {
        &self.relationships
    }

    /// Find an attribute by name.
    #[must_use]
    pub fn attribute_named(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    /// Find a relationship by name.
    #[must_use]
    pub fn relationship(&self, name: &str) -> Option<&RelationshipDescriptor> {
        self.relationships.iter().find(|edge| edge.name == name)
    }
}

/// Complete model: every entity of one service group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    model_name: String,
    entities:   Vec<EntityDescriptor>
}

impl Schema {
    /// Assemble a schema from finished descriptors.
    #[must_use]
    pub fn new(model_name: impl Into<String>, entities: Vec<EntityDescriptor>) -> Self {
        Self {
            model_name: model_name.into(),
            entities
        }
    }

    /// Model name, also the snapshot file stem.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// All entity descriptors.
    #[must_use]
    pub fn entities(&self) -> &[EntityDescriptor] {
        &self.entities
    }

    /// Find an entity by name.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityDescriptor> {
        self.entities.iter().find(|entity| entity.name == name)
    }
}
