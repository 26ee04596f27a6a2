// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Filter expressions and their interpreter.
//!
//! A [`Predicate`] is a plain tagged tree. Generated predicate builders
//! construct the leaves, and the logical operators combine them:
//!
//! ```rust
//! use persist_core::ObjectPredicate;
//!
//! let root = ObjectPredicate::root();
//! let long = root.value::<i32>("pages", false).greater_than(100);
//! let read = root.boolean("read", false).is_true();
//! let filter = long & !read;
//!
//! assert_eq!(filter.to_string(), "(pages > 100 AND NOT read == true)");
//! ```
//!
//! # Any-of paths
//!
//! Once a key path crosses a to-many relationship or a scalar array, the
//! comparison is existential: it matches when at least one reachable value
//! satisfies it. Such leaves render with an `ANY` prefix.
//!
//! | Path | Matches a parent when |
//! |------|-----------------------|
//! | `pages > 100` | its own `pages` exceeds 100 |
//! | `ANY books.pages > 100` | some related book exceeds 100 |
//! | `ANY books.pages == nil` | some related book has no `pages` |

mod builder;
mod fold;

use std::{
    fmt,
    ops::{BitAnd, BitOr, Not}
};

pub use builder::{BoolPredicate, ObjectPredicate, PredicateBuilder, ValuePredicate};

use crate::{
    record::{Record, RecordSource},
    value::Value
};

/// Leaf comparison applied to the values reached by a key path.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    /// `==`
    Equals(Value),
    /// `IN {..}`
    In(Vec<Value>),
    /// Case and diacritic insensitive substring test.
    Contains(String),
    /// Attribute is absent.
    IsNil,
    /// Attribute is `true`.
    IsTrue,
    /// Attribute is `false` or absent.
    IsFalse,
    /// `>`
    GreaterThan(Value),
    /// `>=`
    GreaterThanOrEqual(Value),
    /// `<`
    LessThan(Value),
    /// `<=`
    LessThanOrEqual(Value)
}

impl Comparison {
    /// Test one attribute slot.
    #[must_use]
    pub fn test(&self, value: Option<&Value>) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};

        match (self, value) {
            (Self::IsNil, value) => value.is_none(),
            (Self::IsFalse, None) => true,
            (Self::IsFalse, Some(value)) => *value == Value::Bool(false),
            (_, None) => false,
            (Self::IsTrue, Some(value)) => *value == Value::Bool(true),
            (Self::Equals(expected), Some(value)) => value.loosely_equals(expected),
            (Self::In(candidates), Some(value)) => {
                candidates.iter().any(|candidate| value.loosely_equals(candidate))
            }
            (Self::Contains(needle), Some(value)) => value
                .as_str()
                .is_some_and(|haystack| fold::fold(haystack).contains(&fold::fold(needle))),
            (Self::GreaterThan(bound), Some(value)) => value.compare(bound) == Some(Greater),
            (Self::GreaterThanOrEqual(bound), Some(value)) => {
                matches!(value.compare(bound), Some(Greater | Equal))
            }
            (Self::LessThan(bound), Some(value)) => value.compare(bound) == Some(Less),
            (Self::LessThanOrEqual(bound), Some(value)) => {
                matches!(value.compare(bound), Some(Less | Equal))
            }
        }
    }
}

/// Filter expression over records of one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches everything.
    True,

    /// Matches nothing.
    False,

    /// Leaf comparison at a dotted key path.
    Compare {
        /// Dotted key path, relationships first, attribute last.
        key:        String,
        /// Existential over every reachable value.
        any_of:     bool,
        /// Test applied to the reached values.
        comparison: Comparison
    },

    /// Every term matches.
    And(Vec<Predicate>),

    /// At least one term matches.
    Or(Vec<Predicate>),

    /// Negation.
    Not(Box<Predicate>)
}

/// Conjunction of a sequence; the empty conjunction is [`Predicate::True`].
pub fn and(terms: impl IntoIterator<Item = Predicate>) -> Predicate {
    let mut terms: Vec<Predicate> = terms
        .into_iter()
        .filter(|term| *term != Predicate::True)
        .collect();
    match terms.len() {
        0 => Predicate::True,
        1 => terms.remove(0),
        _ => Predicate::And(terms)
    }
}

/// Disjunction of a sequence; the empty disjunction is [`Predicate::False`].
pub fn or(terms: impl IntoIterator<Item = Predicate>) -> Predicate {
    let mut terms: Vec<Predicate> = terms
        .into_iter()
        .filter(|term| *term != Predicate::False)
        .collect();
    match terms.len() {
        0 => Predicate::False,
        1 => terms.remove(0),
        _ => Predicate::Or(terms)
    }
}

impl Predicate {
    /// Build a leaf comparison.
    #[must_use]
    pub fn compare(key: impl Into<String>, any_of: bool, comparison: Comparison) -> Self {
        Self::Compare {
            key: key.into(),
            any_of,
            comparison
        }
    }

    /// Evaluate against a record, following relationships through `source`.
    #[must_use]
    pub fn evaluate(&self, record: &Record, source: &dyn RecordSource) -> bool {
        match self {
            Self::True => true,
            Self::False => false,
            Self::Compare {
                key,
                any_of,
                comparison
            } => {
                let reached = resolve(record, key, source);
                if *any_of {
                    reached.into_iter().any(|value| comparison.test(value))
                } else {
                    comparison.test(reached.into_iter().next().flatten())
                }
            }
            Self::And(terms) => terms.iter().all(|term| term.evaluate(record, source)),
            Self::Or(terms) => terms.iter().any(|term| term.evaluate(record, source)),
            Self::Not(term) => !term.evaluate(record, source)
        }
    }
}

/// Values reached from `record` by a dotted key path.
///
/// Every segment but the last is a relationship. List attributes contribute
/// each element; a missing attribute contributes one empty slot.
pub(crate) fn resolve<'a>(
    record: &'a Record,
    key: &str,
    source: &'a dyn RecordSource
) -> Vec<Option<&'a Value>> {
    let (relations, leaf) = match key.rsplit_once('.') {
        Some((relations, leaf)) => (Some(relations), leaf),
        None => (None, key)
    };

    let mut reached = vec![record];
    for segment in relations.into_iter().flat_map(|path| path.split('.')) {
        reached = reached
            .into_iter()
            .flat_map(|current| current.related(segment).iter())
            .filter_map(|id| source.record(*id))
            .collect();
    }

    let mut values = Vec::with_capacity(reached.len());
    for current in reached {
        match current.value(leaf) {
            Some(Value::List(items)) => values.extend(items.iter().map(Some)),
            slot => values.push(slot)
        }
    }
    values
}

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Self) -> Self::Output {
        let mut terms = Vec::new();
        for side in [self, rhs] {
            match side {
                Self::And(inner) => terms.extend(inner),
                other => terms.push(other)
            }
        }
        and(terms)
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Self) -> Self::Output {
        let mut terms = Vec::new();
        for side in [self, rhs] {
            match side {
                Self::Or(inner) => terms.extend(inner),
                other => terms.push(other)
            }
        }
        or(terms)
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Self::Output {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other))
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => f.write_str("TRUEPREDICATE"),
            Self::False => f.write_str("FALSEPREDICATE"),
            Self::Compare {
                key,
                any_of,
                comparison
            } => {
                let key = if *any_of {
                    format!("ANY {key}")
                } else {
                    key.clone()
                };
                match comparison {
                    Comparison::Equals(value) => write!(f, "{key} == {value}"),
                    Comparison::In(values) => {
                        write!(f, "{key} IN {}", Value::List(values.clone()))
                    }
                    Comparison::Contains(text) => write!(f, "{key} CONTAINS[cd] {text:?}"),
                    Comparison::IsNil => write!(f, "{key} == nil"),
                    Comparison::IsTrue => write!(f, "{key} == true"),
                    Comparison::IsFalse => write!(f, "({key} == false OR {key} == nil)"),
                    Comparison::GreaterThan(value) => write!(f, "{key} > {value}"),
                    Comparison::GreaterThanOrEqual(value) => write!(f, "{key} >= {value}"),
                    Comparison::LessThan(value) => write!(f, "{key} < {value}"),
                    Comparison::LessThanOrEqual(value) => write!(f, "{key} <= {value}")
                }
            }
            Self::And(terms) => write_joined(f, terms, " AND "),
            Self::Or(terms) => write_joined(f, terms, " OR "),
            Self::Not(term) => write!(f, "NOT {term}")
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, terms: &[Predicate], separator: &str) -> fmt::Result {
    f.write_str("(")?;
    for (index, term) in terms.iter().enumerate() {
        if index > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{term}")?;
    }
    f.write_str(")")
}
