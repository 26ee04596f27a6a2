// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Typed predicate helpers returned by generated builder accessors.
//!
//! ```text
//! BookEntityPredicateBuilder (generated)
//! │  wraps ObjectPredicate { key: "author", any_of: false }
//! │
//! ├── .title()   → ValuePredicate<String>   key "author.title"
//! ├── .read()    → BoolPredicate            key "author.read"
//! └── .tags()    → TagEntityPredicateBuilder
//!                  wraps ObjectPredicate { key: "author.tags", any_of: true }
//! ```
//!
//! The `any_of` flag is sticky: every path derived from an any-of path is
//! any-of too.

use std::marker::PhantomData;

use super::{Comparison, Predicate};
use crate::value::{FieldValue, OrderedValue};

/// Accumulated key path of a predicate builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPredicate {
    key:    String,
    any_of: bool
}

impl ObjectPredicate {
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

    /// Whether this path already crossed a collection.
    #[must_use]
    pub const fn is_any_of(&self) -> bool {
        self.any_of
    }

    /// Extend the path through a relationship.
    #[must_use]
    pub fn key_path(&self, name: &str, array: bool) -> Self {
        Self {
            key:    self.full_key(name),
            any_of: self.any_of || array
        }
    }

    /// Boolean attribute helper.
    #[must_use]
    pub fn boolean(&self, name: &str, array: bool) -> BoolPredicate {
        BoolPredicate {
            key:    self.full_key(name),
            any_of: self.any_of || array
        }
    }

    /// Scalar attribute helper of any non-boolean type.
    #[must_use]
    pub fn value<V: FieldValue>(&self, name: &str, array: bool) -> ValuePredicate<V> {
        ValuePredicate {
            key:     self.full_key(name),
            any_of:  self.any_of || array,
            _marker: PhantomData
        }
    }

    /// Nested builder for a related entity.
    #[must_use]
    pub fn object<B: PredicateBuilder>(&self, name: &str, array: bool) -> B {
        B::from_path(self.key_path(name, array))
    }

    fn full_key(&self, name: &str) -> String {
        if self.key.is_empty() {
            name.to_owned()
        } else {
            format!("{}.{name}", self.key)
        }
    }
}

/// Implemented by every generated `{Entity}PredicateBuilder`.
pub trait PredicateBuilder: Sized {
    /// Builder rooted at `path`.
    fn from_path(path: ObjectPredicate) -> Self;

    /// Builder for the queried entity itself.
    #[must_use]
    fn root() -> Self {
        Self::from_path(ObjectPredicate::root())
    }
}

/// Comparisons available on boolean attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolPredicate {
    key:    String,
    any_of: bool
}

impl BoolPredicate {
    /// Attribute is `true`.
    #[must_use]
    pub fn is_true(&self) -> Predicate {
        self.leaf(Comparison::IsTrue)
    }

    /// Attribute is `false` or absent.
    #[must_use]
    pub fn is_false(&self) -> Predicate {
        self.leaf(Comparison::IsFalse)
    }

    /// Same as [`is_true`](Self::is_true) or [`is_false`](Self::is_false),
    /// so `equals(false)` also matches an absent attribute.
    #[must_use]
    pub fn equals(&self, value: bool) -> Predicate {
        if value { self.is_true() } else { self.is_false() }
    }

    fn leaf(&self, comparison: Comparison) -> Predicate {
        Predicate::compare(self.key.clone(), self.any_of, comparison)
    }
}

/// Comparisons available on a scalar attribute of type `V`.
#[derive(Debug, PartialEq, Eq)]
pub struct ValuePredicate<V> {
    key:     String,
    any_of:  bool,
    _marker: PhantomData<fn() -> V>
}

impl<V> Clone for ValuePredicate<V> {
    fn clone(&self) -> Self {
        Self {
            key:     self.key.clone(),
            any_of:  self.any_of,
            _marker: PhantomData
        }
    }
}

impl<V: FieldValue> ValuePredicate<V> {
    /// Dotted key this helper compares.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// `==`
    #[must_use]
    pub fn equals(&self, value: impl Into<V>) -> Predicate {
        self.leaf(Comparison::Equals(value.into().to_value()))
    }

    /// `!=`, the negation of [`equals`](Self::equals).
    #[must_use]
    pub fn not_equals(&self, value: impl Into<V>) -> Predicate {
        !self.equals(value)
    }

    /// Membership in a set of candidates.
    #[must_use]
    pub fn is_in<I>(&self, values: I) -> Predicate
    where
        I: IntoIterator,
        I::Item: Into<V>
    {
        let values = values
            .into_iter()
            .map(|value| value.into().to_value())
            .collect();
        self.leaf(Comparison::In(values))
    }

    fn leaf(&self, comparison: Comparison) -> Predicate {
        Predicate::compare(self.key.clone(), self.any_of, comparison)
    }
}

impl ValuePredicate<String> {
    /// Case and diacritic insensitive substring match.
    #[must_use]
    pub fn contains(&self, text: impl Into<String>) -> Predicate {
        self.leaf(Comparison::Contains(text.into()))
    }

    /// Attribute is absent.
    #[must_use]
    pub fn is_nil(&self) -> Predicate {
        self.leaf(Comparison::IsNil)
    }
}

impl<V: OrderedValue> ValuePredicate<V> {
    /// `>`
    #[must_use]
    pub fn greater_than(&self, value: impl Into<V>) -> Predicate {
        self.leaf(Comparison::GreaterThan(value.into().to_value()))
    }

    /// `>=`
    #[must_use]
    pub fn greater_than_or_equal(&self, value: impl Into<V>) -> Predicate {
        self.leaf(Comparison::GreaterThanOrEqual(value.into().to_value()))
    }

    /// `<`
    #[must_use]
    pub fn less_than(&self, value: impl Into<V>) -> Predicate {
        self.leaf(Comparison::LessThan(value.into().to_value()))
    }

    /// `<=`
    #[must_use]
    pub fn less_than_or_equal(&self, value: impl Into<V>) -> Predicate {
        self.leaf(Comparison::LessThanOrEqual(value.into().to_value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Author(ObjectPredicate);

    impl PredicateBuilder for Author {
        fn from_path(path: ObjectPredicate) -> Self {
            Self(path)
        }
    }

    #[test]
    fn keys_are_dotted() {
        let root = ObjectPredicate::root();
        let author: Author = root.object("author", false);
        assert_eq!(author.0.key(), "author");
        assert!(!author.0.is_any_of());
        assert_eq!(author.0.value::<String>("name", false).key(), "author.name");
    }

    #[test]
    fn any_of_is_sticky() {
        let books = ObjectPredicate::root().key_path("books", true);
        let author = books.key_path("author", false);
        assert!(author.is_any_of());
        assert_eq!(author.key(), "books.author");
    }

    #[test]
    fn string_literals_convert() {
        let title = ObjectPredicate::root().value::<String>("title", false);
        assert_eq!(title.equals("A").to_string(), "title == \"A\"");
        assert_eq!(
            title.is_in(["A", "B"]).to_string(),
            "title IN {\"A\", \"B\"}"
        );
    }

    #[test]
    fn array_attribute_is_any_of() {
        let ratings = ObjectPredicate::root().value::<i32>("ratings", true);
        assert_eq!(ratings.equals(5).to_string(), "ANY ratings == 5");
    }
}
