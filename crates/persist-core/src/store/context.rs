// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Transactional scope over the committed arena.
//!
//! A [`Context`] never touches committed records. The first write to a record
//! copies it into the pending overlay; reads consult the overlay first. When
//! the job that owns the context returns, the store commits the overlay in
//! one step. If the job panics or calls [`Context::rollback`], nothing of it
//! reaches the arena.
//!
//! ```text
//! committed arena ──┐
//!                   ├── Context::record(id)   (overlay wins)
//! pending overlay ──┘
//!        │
//!        └── into_changes() ── StoreState::commit() ── ChangeSet
//! ```

use std::collections::BTreeMap;

use tracing::warn;

use crate::{
    predicate::Predicate,
    record::{ObjectId, Record, RecordSource},
    schema::{DeleteRule, Schema},
    sort::{SortDescriptor, sort_records},
    value::Value
};

/// Record ids touched by one commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Records that did not exist before.
    pub inserted: Vec<ObjectId>,

    /// Records whose attributes or relationships changed.
    pub updated: Vec<ObjectId>,

    /// Records that were removed.
    pub deleted: Vec<ObjectId>
}

impl ChangeSet {
    /// Check whether the commit changed anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Inserted and updated ids, in that order.
    pub fn upserted(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.inserted.iter().chain(&self.updated).copied()
    }
}

/// Overlay extracted from a finished context.
#[derive(Debug)]
pub(crate) struct PendingChanges {
    pub(crate) records: BTreeMap<ObjectId, Option<Record>>,
    pub(crate) next_id: u64
}

/// Unit of work handed to store jobs.
#[derive(Debug)]
pub struct Context<'a> {
    committed: &'a BTreeMap<ObjectId, Record>,
    schema:    &'a Schema,
    pending:   BTreeMap<ObjectId, Option<Record>>,
    next_id:   u64
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        committed: &'a BTreeMap<ObjectId, Record>,
        schema: &'a Schema,
        next_id: u64
    ) -> Self {
        Self {
            committed,
            schema,
            pending: BTreeMap::new(),
            next_id
        }
    }

    /// Schema the store was opened with.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        self.schema
    }

    /// Create a record of `entity` with its schema defaults applied.
    pub fn insert(&mut self, entity: &str) -> ObjectId {
        let id = ObjectId::new(self.next_id);
        self.next_id += 1;

        let mut record = Record::new(id, entity);
        match self.schema.entity(entity) {
            Some(descriptor) => {
                for attribute in descriptor.attributes() {
                    if let Some(default) = &attribute.default_value {
                        record.set_value(&attribute.name, Some(default.clone()));
                    }
                }
            }
            None => warn!(entity, "inserting record of an entity missing from the schema")
        }
        self.pending.insert(id, Some(record));
        id
    }

    /// Read one attribute.
    #[must_use]
    pub fn value(&self, id: ObjectId, key: &str) -> Option<&Value> {
        self.record(id)?.value(key)
    }

    /// Write one attribute; `None` clears it. Writing the current value is
    /// not a change.
    pub fn set_value(&mut self, id: ObjectId, key: &str, value: Option<Value>) {
        if self.record(id).is_some_and(|record| record.value(key) == value.as_ref()) {
            return;
        }
        if let Some(record) = self.record_mut(id) {
            record.set_value(key, value);
        }
    }

    /// Current members of a relationship.
    #[must_use]
    pub fn related(&self, id: ObjectId, key: &str) -> &[ObjectId] {
        match self.record(id) {
            Some(record) => record.related(key),
            None => &[]
        }
    }

    /// Replace the members of a relationship. The same members in another
    /// order are not a change.
    pub fn set_related(&mut self, id: ObjectId, key: &str, ids: Vec<ObjectId>) {
        let mut current = self.related(id, key).to_vec();
        let mut incoming = ids.clone();
        current.sort_unstable();
        incoming.sort_unstable();
        if current == incoming {
            return;
        }
        if let Some(record) = self.record_mut(id) {
            record.set_related(key, ids);
        }
    }

    /// Delete a record, cascading along relationships whose rule says so and
    /// removing every edge that points at it.
    pub fn delete(&mut self, id: ObjectId) {
        let Some(record) = self.record(id).cloned() else {
            return;
        };
        if self.committed.contains_key(&id) {
            self.pending.insert(id, None);
        } else {
            self.pending.remove(&id);
        }

        let cascading: Vec<ObjectId> = self
            .schema
            .entity(record.entity())
            .map(|descriptor| {
                descriptor
                    .relationships()
                    .iter()
                    .filter(|edge| edge.delete_rule == DeleteRule::Cascade)
                    .flat_map(|edge| record.related(&edge.name).iter().copied())
                    .collect()
            })
            .unwrap_or_default();

        let holders: Vec<ObjectId> = self
            .live_records()
            .filter(|holder| holder.references(id))
            .map(Record::id)
            .collect();
        for holder in holders {
            if let Some(record) = self.record_mut(holder) {
                record.detach(id);
            }
        }

        for target in cascading {
            self.delete(target);
        }
    }

    /// Records of `entity` matching `predicate`, ordered by `sort` and then
    /// by creation.
    #[must_use]
    pub fn fetch(&self, entity: &str, predicate: &Predicate, sort: &[SortDescriptor]) -> Vec<&Record> {
        let mut matches: Vec<&Record> = self
            .live_records()
            .filter(|record| record.entity() == entity && predicate.evaluate(record, self))
            .collect();
        matches.sort_by_key(|record| record.id());
        sort_records(&mut matches, sort, self);
        matches
    }

    /// Check whether committing now would change anything.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.pending
            .iter()
            .any(|(id, record)| record.as_ref() != self.committed.get(id))
    }

    /// Discard every pending change.
    pub fn rollback(&mut self) {
        self.pending.clear();
    }

    pub(crate) fn into_changes(self) -> PendingChanges {
        PendingChanges {
            records: self.pending,
            next_id: self.next_id
        }
    }

    fn live_records(&self) -> impl Iterator<Item = &Record> {
        self.committed
            .values()
            .filter(|record| !self.pending.contains_key(&record.id()))
            .chain(self.pending.values().flatten())
    }

    fn record_mut(&mut self, id: ObjectId) -> Option<&mut Record> {
        if !self.pending.contains_key(&id) {
            let record = self.committed.get(&id)?.clone();
            self.pending.insert(id, Some(record));
        }
        self.pending.get_mut(&id)?.as_mut()
    }
}

impl RecordSource for Context<'_> {
    fn record(&self, id: ObjectId) -> Option<&Record> {
        match self.pending.get(&id) {
            Some(pending) => pending.as_ref(),
            None => self.committed.get(&id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        predicate::ObjectPredicate,
        schema::{AttributeDescriptor, EntityDescriptor},
        value::AttributeType
    };

    fn schema() -> Schema {
        let mut author = EntityDescriptor::new("Author")
            .attribute(AttributeDescriptor::new("name", AttributeType::String));
        let mut book = EntityDescriptor::new("Book")
            .attribute(AttributeDescriptor::new("pages", AttributeType::Integer));
        let tag = EntityDescriptor::new("Tag");
        author.relate(&book, "books", 0, DeleteRule::Cascade);
        book.relate(&tag, "tags", 0, DeleteRule::Nullify);
        Schema::new("Library", vec![author, book, tag])
    }

    #[test]
    fn insert_applies_defaults() {
        let schema = schema();
        let committed = BTreeMap::new();
        let mut context = Context::new(&committed, &schema, 1);
        let book = context.insert("Book");
        assert_eq!(context.value(book, "pages"), Some(&Value::Integer(0)));
        assert!(context.has_changes());
    }

    #[test]
    fn unchanged_write_is_not_a_change() {
        let schema = schema();
        let mut committed = BTreeMap::new();
        let mut record = Record::new(ObjectId::new(1), "Book");
        record.set_value("pages", Some(Value::Integer(10)));
        committed.insert(ObjectId::new(1), record);

        let mut context = Context::new(&committed, &schema, 2);
        context.set_value(ObjectId::new(1), "pages", Some(Value::Integer(10)));
        assert!(!context.has_changes());
        context.set_value(ObjectId::new(1), "pages", Some(Value::Integer(11)));
        assert!(context.has_changes());
        context.rollback();
        assert!(!context.has_changes());
    }

    #[test]
    fn rewriting_nan_is_not_a_change() {
        let schema = schema();
        let mut committed = BTreeMap::new();
        let mut record = Record::new(ObjectId::new(1), "Book");
        record.set_value("ratio", Some(Value::Double(f64::NAN)));
        committed.insert(ObjectId::new(1), record);

        let mut context = Context::new(&committed, &schema, 2);
        context.set_value(ObjectId::new(1), "ratio", Some(Value::Double(f64::NAN)));
        assert!(!context.has_changes());
        context.set_value(ObjectId::new(1), "ratio", Some(Value::Double(0.5)));
        assert!(context.has_changes());
    }

    #[test]
    fn delete_cascades_and_nullifies() {
        let schema = schema();
        let committed = BTreeMap::new();
        let mut context = Context::new(&committed, &schema, 1);
        let author = context.insert("Author");
        let book = context.insert("Book");
        let tag = context.insert("Tag");
        context.set_related(author, "books", vec![book]);
        context.set_related(book, "tags", vec![tag]);

        context.delete(author);
        assert!(context.record(author).is_none());
        assert!(context.record(book).is_none());
        assert!(context.record(tag).is_some());
    }

    #[test]
    fn delete_detaches_inbound_edges() {
        let schema = schema();
        let committed = BTreeMap::new();
        let mut context = Context::new(&committed, &schema, 1);
        let author = context.insert("Author");
        let first = context.insert("Book");
        let second = context.insert("Book");
        context.set_related(author, "books", vec![first, second]);

        context.delete(first);
        assert_eq!(context.related(author, "books"), &[second]);
    }

    #[test]
    fn fetch_filters_and_orders() {
        let schema = schema();
        let committed = BTreeMap::new();
        let mut context = Context::new(&committed, &schema, 1);
        for pages in [300, 50, 120] {
            let book = context.insert("Book");
            context.set_value(book, "pages", Some(Value::Integer(pages)));
        }
        let pages = ObjectPredicate::root().value::<i64>("pages", false);
        let sort = [crate::sort::ObjectSorter::root().sort("pages").ascending()];
        let found: Vec<Option<&Value>> = context
            .fetch("Book", &pages.greater_than(100), &sort)
            .into_iter()
            .map(|record| record.value("pages"))
            .collect();
        assert_eq!(
            found,
            vec![Some(&Value::Integer(120)), Some(&Value::Integer(300))]
        );
    }

    #[test]
    fn set_related_ignores_order() {
        let schema = schema();
        let committed = BTreeMap::new();
        let mut context = Context::new(&committed, &schema, 1);
        let author = context.insert("Author");
        let a = context.insert("Book");
        let b = context.insert("Book");
        context.set_related(author, "books", vec![a, b]);
        context.set_related(author, "books", vec![b, a]);
        assert_eq!(context.related(author, "books"), &[a, b]);
    }
}
