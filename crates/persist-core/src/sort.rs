// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Sort keys built from generated sort builders.
//!
//! Paths compose the same way predicate paths do, but without any-of
//! semantics. A key through a to-many relationship orders by the first
//! related value the store yields.

use std::{cmp::Ordering, fmt};

use crate::{
    predicate::resolve,
    record::{Record, RecordSource}
};

/// One sort key with its direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortDescriptor {
    key:       String,
    ascending: bool
}

impl SortDescriptor {
    /// Sort by `key` in the given direction.
    #[must_use]
    pub fn new(key: impl Into<String>, ascending: bool) -> Self {
        Self {
            key: key.into(),
            ascending
        }
    }

    /// Dotted key path.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Direction.
    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        self.ascending
    }

    /// Compare two records by this key. Absent values sort first.
    #[must_use]
    pub fn compare(&self, left: &Record, right: &Record, source: &dyn RecordSource) -> Ordering {
        let left = resolve(left, &self.key, source).into_iter().next().flatten();
        let right = resolve(right, &self.key, source).into_iter().next().flatten();
        let ordering = match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(left), Some(right)) => left.compare(right).unwrap_or(Ordering::Equal)
        };
        if self.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    }
}

impl fmt::Display for SortDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.ascending { "ASC" } else { "DESC" };
        write!(f, "{} {direction}", self.key)
    }
}

/// Order records by a list of descriptors. Ties keep their input order.
pub fn sort_records(records: &mut [&Record], sort: &[SortDescriptor], source: &dyn RecordSource) {
    if sort.is_empty() {
        return;
    }
    records.sort_by(|left, right| {
        sort.iter()
            .map(|descriptor| descriptor.compare(left, right, source))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

/// Sort key helper for one scalar attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSorter {
    key: String
}

impl ValueSorter {
    /// Ascending order.
    #[must_use]
    pub fn ascending(&self) -> SortDescriptor {
        self.make(true)
    }

    /// Descending order.
    #[must_use]
    pub fn descending(&self) -> SortDescriptor {
        self.make(false)
    }

    /// Order in a direction chosen at runtime.
    #[must_use]
    pub fn make(&self, ascending: bool) -> SortDescriptor {
        SortDescriptor::new(self.key.clone(), ascending)
    }
}

/// Accumulated key path of a sort builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectSorter {
    key: String
}

impl ObjectSorter {
    /// Path of the queried entity itself.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Dotted key of this path, empty at the root.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Sort key helper for an attribute under this path.
    #[must_use]
    pub fn sort(&self, name: &str) -> ValueSorter {
        ValueSorter {
            key: self.full_key(name)
        }
    }

    /// Nested builder for a related entity.
    #[must_use]
    pub fn object<B: SortBuilder>(&self, name: &str) -> B {
        B::from_path(Self {
            key: self.full_key(name)
        })
    }

    fn full_key(&self, name: &str) -> String {
        if self.key.is_empty() {
            name.to_owned()
        } else {
            format!("{}.{name}", self.key)
        }
    }
}

/// Implemented by every generated `{Entity}SortBuilder`.
pub trait SortBuilder: Sized {
    /// Builder rooted at `path`.
    fn from_path(path: ObjectSorter) -> Self;

    /// Builder for the queried entity itself.
    #[must_use]
    fn root() -> Self {
        Self::from_path(ObjectSorter::root())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{record::ObjectId, value::Value};

    fn titled(id: u64, title: Option<&str>, pages: i64) -> Record {
        let mut record = Record::new(ObjectId::new(id), "Book");
        record.set_value("title", title.map(|text| Value::String(text.to_owned())));
        record.set_value("pages", Some(Value::Integer(pages)));
        record
    }

    #[test]
    fn nil_first_then_ties_fall_through() {
        let records: BTreeMap<ObjectId, Record> = BTreeMap::new();
        let a = titled(1, Some("B"), 5);
        let b = titled(2, None, 7);
        let c = titled(3, Some("B"), 1);
        let d = titled(4, Some("A"), 9);
        let mut list = vec![&a, &b, &c, &d];

        let root = ObjectSorter::root();
        sort_records(
            &mut list,
            &[root.sort("title").ascending(), root.sort("pages").descending()],
            &records
        );
        let order: Vec<u64> = list.iter().map(|record| record.id().get()).collect();
        assert_eq!(order, vec![2, 4, 1, 3]);
    }

    #[test]
    fn nested_paths_and_display() {
        let author = ObjectSorter::root().object::<Nested>("author");
        let descriptor = author.0.sort("name").make(false);
        assert_eq!(descriptor.key(), "author.name");
        assert_eq!(descriptor.to_string(), "author.name DESC");
    }

    struct Nested(ObjectSorter);

    impl SortBuilder for Nested {
        fn from_path(path: ObjectSorter) -> Self {
            Self(path)
        }
    }
}
