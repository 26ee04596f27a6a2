// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Traits implemented by `#[derive(Entity)]`.
//!
//! # Generated Implementation
//!
//! ```rust,ignore
//! #[derive(Clone, Debug, PartialEq, Entity)]
//! pub struct BookEntity {
//!     #[id]
//!     pub id: String,
//!     pub title: String,
//!     pub author: Option<AuthorEntity>,
//! }
//!
//! // Generates:
//! impl Entity for BookEntity {
//!     const ENTITY_NAME: &'static str = "Book";
//!     type Predicate = BookEntityPredicateBuilder;
//!     type Sort = BookEntitySortBuilder;
//!
//!     fn from_record(record: &Record, source: &dyn RecordSource) -> Result<Self, MappingError> { ... }
//!     fn update(&self, object: ObjectId, context: &mut Context<'_>) { ... }
//!     fn identity(&self) -> Option<&str> { Some(&self.id) }
//! }
//!
//! impl Identifiable for BookEntity {
//!     const ID_KEY: &'static str = "id";
//!     fn id(&self) -> &str { &self.id }
//! }
//! ```

use tracing::warn;

use crate::{
    error::MappingError,
    predicate::PredicateBuilder,
    record::{ObjectId, Record, RecordSource},
    sort::SortBuilder,
    store::Context
};

/// A domain type stored as records of one entity.
pub trait Entity: Clone + PartialEq + Send + Sync + 'static {
    /// Entity name used in the schema and in records.
    const ENTITY_NAME: &'static str;

    /// Generated predicate builder.
    type Predicate: PredicateBuilder;

    /// Generated sort builder.
    type Sort: SortBuilder;

    /// Map a record to the domain value.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError`] when a stored attribute does not coerce to its
    /// field type or a required to-one relationship is empty.
    fn from_record(record: &Record, source: &dyn RecordSource) -> Result<Self, MappingError>;

    /// Write every field of `self` into the record `object`, reconciling
    /// relationships.
    fn update(&self, object: ObjectId, context: &mut Context<'_>);

    /// Unique identifier when the entity is identifiable.
    fn identity(&self) -> Option<&str> {
        None
    }
}

/// An entity with a unique string identifier.
pub trait Identifiable: Entity {
    /// Attribute key holding the identifier.
    const ID_KEY: &'static str;

    /// The identifier.
    fn id(&self) -> &str;
}

/// Map a required to-one relationship.
///
/// # Errors
///
/// [`MappingError::MissingRelation`] when the relationship is empty,
/// [`MappingError::MissingRecord`] when it dangles, or the nested mapping
/// error.
pub fn map_required<E: Entity>(
    record: &Record,
    source: &dyn RecordSource,
    owner: &'static str,
    field: &'static str
) -> Result<E, MappingError> {
    let id = record
        .related(field)
        .first()
        .copied()
        .ok_or(MappingError::missing_relation(owner, field))?;
    let related = source.record(id).ok_or(MappingError::MissingRecord(id))?;
    E::from_record(related, source)
}

/// Map an optional to-one relationship; a member that fails to map reads as
/// absent.
pub fn map_optional<E: Entity>(record: &Record, source: &dyn RecordSource, field: &str) -> Option<E> {
    let id = record.related(field).first().copied()?;
    map_member(id, source, field)
}

/// Map a to-many relationship, dropping members that fail to map.
pub fn map_many<E: Entity>(record: &Record, source: &dyn RecordSource, field: &str) -> Vec<E> {
    record
        .related(field)
        .iter()
        .filter_map(|id| map_member(*id, source, field))
        .collect()
}

fn map_member<E: Entity>(id: ObjectId, source: &dyn RecordSource, field: &str) -> Option<E> {
    let Some(related) = source.record(id) else {
        warn!(entity = E::ENTITY_NAME, field, %id, "dangling relationship member");
        return None;
    };
    match E::from_record(related, source) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(entity = E::ENTITY_NAME, field, %id, %error, "dropping relationship member");
            None
        }
    }
}
