// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Runtime for persist-derive.
//!
//! This crate holds everything generated code talks to: the record store,
//! the predicate and sort vocabulary, schema descriptors and the
//! relationship reconciler. It can also be used standalone with manual
//! [`Entity`] implementations.
//!
//! # Overview
//!
//! ```text
//! persist_core
//! ├── Value, FieldValue, AttributeValue   attribute values and conversions
//! ├── Record, ObjectId, RecordSource      stored objects
//! ├── Schema, EntityDescriptor, ...       persistence model
//! ├── Predicate, ObjectPredicate, ...     filters and typed builders
//! ├── SortDescriptor, ObjectSorter, ...   ordering and typed builders
//! ├── Entity, Identifiable                mapping contract
//! ├── Store, Context, Subscription        serialized worker and unit of work
//! ├── store_one, store_many               relationship reconciliation
//! └── QueryExecutor, QuerySpec, ...       reusable queries and subscriptions
//! ```
//!
//! # Usage
//!
//! Most users should depend on `persist-derive`, which re-exports this crate
//! and generates the [`Entity`] implementations. For manual use:
//!
//! ```rust,ignore
//! use persist_core::prelude::*;
//!
//! let store = Store::in_memory(schema)?;
//! let long_books = store.query::<Book, _, _>(|b| b.pages().greater_than(100), |_| ());
//! for book in long_books.execute() {
//!     println!("{}", book.title);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod collect;
mod entity;
mod error;
mod predicate;
mod query;
mod reconcile;
mod record;
mod schema;
mod sort;
mod store;
mod value;

pub mod prelude;

/// Re-export async_trait for generated code.
pub use async_trait::async_trait;
pub use collect::{IntoPredicates, IntoSortDescriptors};
pub use entity::{Entity, Identifiable, map_many, map_optional, map_required};
pub use error::{MappingError, StoreError};
pub use predicate::{
    BoolPredicate, Comparison, ObjectPredicate, Predicate, PredicateBuilder, ValuePredicate, and,
    or
};
pub use query::{QueryExecutor, QuerySpec, QueryStream};
pub use reconcile::{store_many, store_one};
pub use record::{ObjectId, Record, RecordSource};
pub use schema::{
    AttributeDescriptor, DeleteRule, EntityDescriptor, RelationshipDescriptor, Schema
};
pub use sort::{ObjectSorter, SortBuilder, SortDescriptor, ValueSorter, sort_records};
pub use store::{ChangeSet, Context, Store, StoreConfig, StoreLocation, Subscription};
pub use value::{AttributeType, AttributeValue, FieldValue, OrderedValue, Value, opaque};
