// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Procedural macros for persist-derive.
//!
//! This is an internal crate; depend on `persist-derive`, which re-exports
//! these macros together with the runtime.
//!
//! # Quick Navigation
//!
//! - [`Entity`](macro@Entity): predicate/sort builders, mapper and updater
//! - [`persistence_service`](macro@persistence_service): schema, protocol
//!   trait and client for a module of entities
//! - [`query`](macro@query): marks a custom query inside a service module
//!
//! # Attribute Quick Reference
//!
//! ## Entity-Level `#[entity(...)]`
//!
//! ```rust,ignore
//! #[derive(Clone, Debug, PartialEq, Entity)]
//! #[entity(name = "Book")] // Optional: defaults to the struct name without `Entity`
//! pub struct BookEntity { /* ... */ }
//! ```
//!
//! ## Field-Level Attributes
//!
//! ```rust,ignore
//! pub struct AuthorEntity {
//!     #[id]                                   // Identifier, makes the entity Identifiable
//!     pub id: String,
//!
//!     pub name: String,                       // Scalar attribute
//!
//!     pub born: Option<DateTime<Utc>>,        // Optional scalar attribute
//!
//!     pub genre: Genre,                       // Opaque: stored through Display/FromStr
//!
//!     pub books: Vec<BookEntity>,             // To-many relationship, cascade
//!
//!     #[relation(delete_rule = "nullify", keep_orphans)]
//!     pub agent: Option<AgentEntity>,         // To-one relationship
//!
//!     #[field(skip)]                          // Not stored, mapped as Default::default()
//!     pub cached_rank: u32,
//! }
//! ```
//!
//! # Type Classification
//!
//! | Declared type | Kind | Schema | Builders |
//! |---------------|------|--------|----------|
//! | `bool` | Boolean | attribute | `BoolPredicate`, `ValueSorter` |
//! | `i8`..`i64`, `u8`..`u32` | Integer | attribute, required, default `0` | `ValuePredicate<T>` |
//! | `f32` / `f64` | Float / Double | attribute | `ValuePredicate<T>` |
//! | `String` | String | attribute | `ValuePredicate<String>` |
//! | `DateTime<Utc>` | Timestamp | attribute | `ValuePredicate<DateTime<Utc>>` |
//! | `XEntity` | Reference | relationship | target's builders |
//! | anything else | Opaque | not stored in schema | none |
//!
//! `Option<T>`, `Vec<T>` and `Option<Vec<T>>` wrap any of the above. A path
//! through a `Vec` makes every comparison below it existential: it matches
//! when any member matches.
//!
//! # Generated Code Overview
//!
//! For a `BookEntity` entity:
//!
//! | Generated Item | Description |
//! |----------------|-------------|
//! | `BookEntityPredicateBuilder` | Typed filter accessors |
//! | `BookEntitySortBuilder` | Typed sort key accessors |
//! | `impl Entity for BookEntity` | Mapper, updater, entity name |
//! | `impl Identifiable for BookEntity` | With `#[id]` only |
//!
//! For a `#[persistence_service]` module `library`:
//!
//! | Generated Item | Description |
//! |----------------|-------------|
//! | `MODEL_NAME` | Model name, `"Library"` by default |
//! | `schema()` | Entities and relationship edges |
//! | `LibraryService` | Protocol trait |
//! | `LibraryServiceClient` | Store-backed implementation |
//! | `open(config)` | Opens the store and returns the client |

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rust_2018_idioms
)]
#![deny(unsafe_code)]

mod entity;
mod service;
mod utils;

use proc_macro::TokenStream;

/// Derive the persistence mapping for a struct.
///
/// Generates a predicate builder, a sort builder and `impl Entity` (plus
/// `impl Identifiable` when a field carries `#[id]`).
///
/// # Example
///
/// ```rust,ignore
/// use persist_derive::Entity;
///
/// #[derive(Clone, Debug, PartialEq, Entity)]
/// pub struct BookEntity {
///     #[id]
///     pub id: String,
///     pub title: String,
///     pub pages: i32,
///     pub chapters: Vec<ChapterEntity>,
/// }
///
/// let long = QuerySpec::<BookEntity>::new().filter(|b| b.pages().greater_than(100));
/// ```
///
/// # Errors
///
/// Compile errors for enums, tuple structs, generic structs, more than one
/// `#[id]`, `#[id]` on anything but `String`, `#[id]` with `#[field(skip)]`,
/// `#[relation]` on a non-reference field and unknown attribute keys.
#[proc_macro_derive(Entity, attributes(entity, id, field, relation))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    entity::derive(input)
}

/// Generate the schema, protocol and client for a module of entities.
///
/// # Example
///
/// ```rust,ignore
/// use persist_derive::persistence_service;
///
/// #[persistence_service]
/// pub mod library {
///     use persist_derive::{Entity, QuerySpec, query};
///
///     #[derive(Clone, Debug, PartialEq, Entity)]
///     pub struct BookEntity {
///         #[id]
///         pub id: String,
///         pub pages: i32,
///     }
///
///     /// Books with more than `pages` pages.
///     #[query]
///     pub fn long_books(pages: i32) -> QuerySpec<BookEntity> {
///         QuerySpec::<BookEntity>::new().filter(|b| b.pages().greater_than(pages))
///     }
/// }
///
/// use library::LibraryService;
///
/// let client = library::open(StoreConfig::in_memory())?;
/// client.add_or_update_book(books).await;
/// let long = client.long_books(300).execute();
/// ```
///
/// # Arguments
///
/// - `model = "..."` overrides the model name (default: module name in
///   PascalCase)
#[proc_macro_attribute]
pub fn persistence_service(attr: TokenStream, item: TokenStream) -> TokenStream {
    service::expand(attr, item)
}

/// Mark a function inside a `#[persistence_service]` module as a custom
/// query.
///
/// The function must take plain named parameters and return
/// `QuerySpec<E>` for an entity `E` of the same module. The generated
/// protocol gets a method with the same name and parameters returning
/// `QueryExecutor<E>`. On its own the attribute leaves the function as is.
#[proc_macro_attribute]
pub fn query(_attr: TokenStream, item: TokenStream) -> TokenStream {
    item
}
