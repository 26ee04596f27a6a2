// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `#[persistence_service]` implementation.
//!
//! # Architecture
//!
//! ```text
//! service.rs (orchestrator)
//! │
//! ├── parse.rs     → ServiceDef: entities, #[query] functions, model name
//! │
//! ├── schema.rs    → MODEL_NAME, schema()
//! ├── protocol.rs  → {Module}Service trait
//! └── client.rs    → {Module}ServiceClient, open()
//! ```
//!
//! The module is emitted unchanged with the generated items appended, so
//! the entity derives and `#[query]` markers inside it still expand. When
//! parsing fails the errors are emitted next to the untouched module to keep
//! follow-up errors down.

mod client;
mod parse;
mod protocol;
mod schema;

use proc_macro::TokenStream;
use quote::quote;
use syn::{Item, ItemMod, parse_macro_input};

use self::parse::{Parsed, ServiceArgs, ServiceDef};

/// Main entry point for the `persistence_service` attribute.
pub fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut module = parse_macro_input!(item as ItemMod);

    let parsed = ServiceArgs::parse(attr.into())
        .and_then(|args| ServiceDef::from_module(args, &module));

    match parsed {
        Ok(Parsed::Service(service)) => {
            if let Some((_, items)) = &mut module.content {
                items.extend(generate(&service));
            }
            quote!(#module).into()
        }
        Ok(Parsed::EntityErrors) => quote!(#module).into(),
        Err(err) => {
            let errors = err.write_errors();
            quote! {
                #errors
                #module
            }
            .into()
        }
    }
}

fn generate(service: &ServiceDef) -> Vec<Item> {
    let schema = schema::generate(service);
    let protocol = protocol::generate(service);
    let client = client::generate(service);

    let generated = quote! {
        #schema
        #protocol
        #client
    };

    match syn::parse2::<syn::File>(generated) {
        Ok(file) => file.items,
        Err(err) => vec![Item::Verbatim(err.to_compile_error())]
    }
}
