// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Entity derive macro implementation.
//!
//! # Architecture
//!
//! ```text
//! entity.rs (orchestrator)
//! │
//! ├── parse/             → EntityDef, FieldDef, type classifier
//! │
//! ├── predicate.rs       → {Entity}PredicateBuilder
//! ├── sort.rs            → {Entity}SortBuilder
//! ├── implementation.rs  → impl Entity / impl Identifiable
//! │   ├── mapper.rs      → from_record body
//! │   └── updater.rs     → update body
//! ```
//!
//! Schema descriptors are not emitted here: relationship edges need the
//! sibling entities, so `#[persistence_service]` emits the schema for the
//! whole module.
//!
//! # Generated Code
//!
//! | Item | Purpose |
//! |------|---------|
//! | `BookEntityPredicateBuilder` | typed filter construction |
//! | `BookEntitySortBuilder` | typed sort keys |
//! | `impl Entity for BookEntity` | mapper, updater, entity name |
//! | `impl Identifiable for BookEntity` | only with `#[id]` |

mod implementation;
mod mapper;
pub mod parse;
mod predicate;
mod sort;
mod updater;

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

use self::parse::EntityDef;

/// Main entry point for the Entity derive macro.
pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match EntityDef::from_derive_input(&input) {
        Ok(entity) => generate(&entity),
        Err(err) => err.write_errors().into()
    }
}

fn generate(entity: &EntityDef) -> TokenStream {
    let predicate = predicate::generate(entity);
    let sort = sort::generate(entity);
    let implementation = implementation::generate(entity);

    let expanded = quote! {
        #predicate
        #sort
        #implementation
    };

    expanded.into()
}
