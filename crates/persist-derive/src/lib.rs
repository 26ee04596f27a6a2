// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

//! # persist-derive
//!
//! Typed persistence for plain Rust structs over an embedded object store.
//! Re-exports:
//! - [`Entity`] derive macro, [`persistence_service`] and [`query`]
//!   attributes from `persist-derive-impl`
//! - All types from `persist-core` ([`Store`], [`QueryExecutor`],
//!   [`QuerySpec`], [`Predicate`], ...)
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use persist_derive::persistence_service;
//!
//! #[persistence_service]
//! pub mod library {
//!     use persist_derive::{Entity, QuerySpec, query};
//!
//!     #[derive(Clone, Debug, PartialEq, Entity)]
//!     pub struct AuthorEntity {
//!         #[id]
//!         pub id: String,
//!         pub name: String,
//!         pub books: Vec<BookEntity>,
//!     }
//!
//!     #[derive(Clone, Debug, PartialEq, Entity)]
//!     pub struct BookEntity {
//!         #[id]
//!         pub id: String,
//!         pub title: String,
//!         pub pages: i32,
//!     }
//!
//!     #[query]
//!     pub fn prolific(min_pages: i32) -> QuerySpec<AuthorEntity> {
//!         QuerySpec::<AuthorEntity>::new()
//!             .filter(|a| a.books().pages().greater_than(min_pages))
//!             .sort(|s| s.name().ascending())
//!     }
//! }
//!
//! use library::LibraryService;
//!
//! let client = library::open(StoreConfig::on_disk("./data"))?;
//! client.add_or_update_author(authors).await;
//!
//! let authors = client.prolific(300).execute();
//! let _subscription = client
//!     .query_book(|b| b.title().contains("Rust"), |s| s.pages().descending())
//!     .subscribe_to_results(|books| println!("{} books", books.len()));
//! ```

pub use persist_core::*;
pub use persist_derive_impl::{Entity, persistence_service, query};
