// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Flexible return types for filter and sort closures.
//!
//! Query closures may return a single term, several, none, or an optional
//! one. The terms are collected into a list; filters are then conjoined.
//!
//! ```rust,ignore
//! client.query_book(|b| b.title().equals("A"), |_| ());
//! client.query_book(|b| [b.pages().greater_than(10), b.read().is_true()], |s| s.title().ascending());
//! client.query_book(|b| search.map(|text| b.title().contains(text)), |s| vec![s.pages().descending()]);
//! ```

use crate::{predicate::Predicate, sort::SortDescriptor};

/// Anything a filter closure may return.
pub trait IntoPredicates {
    /// Collect into a list of terms.
    fn into_predicates(self) -> Vec<Predicate>;
}

/// Anything a sort closure may return.
pub trait IntoSortDescriptors {
    /// Collect into a list of sort keys, most significant first.
    fn into_sort_descriptors(self) -> Vec<SortDescriptor>;
}

macro_rules! collect_impls {
    ($trait:ident, $method:ident, $item:ty) => {
        impl $trait for $item {
            fn $method(self) -> Vec<$item> {
                vec![self]
            }
        }

        impl $trait for Vec<$item> {
            fn $method(self) -> Vec<$item> {
                self
            }
        }

        impl<const N: usize> $trait for [$item; N] {
            fn $method(self) -> Vec<$item> {
                self.into()
            }
        }

        impl $trait for Option<$item> {
            fn $method(self) -> Vec<$item> {
                self.into_iter().collect()
            }
        }

        impl $trait for () {
            fn $method(self) -> Vec<$item> {
                Vec::new()
            }
        }
    };
}

collect_impls!(IntoPredicates, into_predicates, Predicate);
collect_impls!(IntoSortDescriptors, into_sort_descriptors, SortDescriptor);
