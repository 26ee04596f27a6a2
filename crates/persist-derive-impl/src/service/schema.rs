// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Schema generation.
//!
//! Emits `MODEL_NAME` and `schema()`. Descriptors are built in two passes:
//! every entity with its attributes first, then every relationship edge,
//! since `relate` needs the destination descriptor to exist.
//!
//! ```rust,ignore
//! pub fn schema() -> ::persist_core::Schema {
//!     let mut author_entity = EntityDescriptor::new("Author")
//!         .attribute(AttributeDescriptor::new("id", AttributeType::String));
//!     let book_entity = EntityDescriptor::new("Book")
//!         .attribute(AttributeDescriptor::new("pages", AttributeType::Integer));
//!     author_entity.relate(&book_entity, "books", 0, DeleteRule::Cascade);
//!     Schema::new(MODEL_NAME, vec![author_entity, book_entity])
//! }
//! ```

use convert_case::{Case, Casing};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;

use super::parse::ServiceDef;
use crate::entity::parse::{EntityDef, FieldDef};

/// Generate `MODEL_NAME` and `schema()`.
pub fn generate(service: &ServiceDef) -> TokenStream {
    let model = &service.model;
    let descriptors = service.entities.iter().map(descriptor);
    let edges = service.entities.iter().flat_map(|entity| {
        entity
            .relationships()
            .filter_map(move |field| edge(service, entity, field))
    });
    let variables = service.entities.iter().map(|entity| variable(&entity.ident));

    quote! {
        /// Model name of this service group.
        pub const MODEL_NAME: &str = #model;

        /// Persistence schema of every entity in this module.
        #[must_use]
        pub fn schema() -> ::persist_core::Schema {
            #(#descriptors)*
            #(#edges)*
            ::persist_core::Schema::new(MODEL_NAME, ::std::vec![#(#variables),*])
        }
    }
}

fn variable(ident: &Ident) -> Ident {
    format_ident!("{}", ident.to_string().to_case(Case::Snake))
}

fn descriptor(entity: &EntityDef) -> TokenStream {
    let variable = variable(&entity.ident);
    let name = entity.name_lit();
    let mutability = entity
        .relationships()
        .next()
        .map(|_| quote! { mut });
    let attributes = entity.attributes().filter_map(|field| {
        let scalar = field.field_type.scalar()?;
        let key = field.key();
        let attribute_type = scalar.attribute_type();
        let optional = (field.field_type.optional && !field.field_type.array)
            .then(|| quote! { .optional() });
        let array = field.field_type.array.then(|| quote! { .array() });
        Some(quote! {
            .attribute(
                ::persist_core::AttributeDescriptor::new(#key, #attribute_type)
                    #optional
                    #array
            )
        })
    });

    quote! {
        let #mutability #variable = ::persist_core::EntityDescriptor::new(#name)
            #(#attributes)*;
    }
}

fn edge(service: &ServiceDef, entity: &EntityDef, field: &FieldDef) -> Option<TokenStream> {
    let target = service.entity(field.field_type.target()?)?;
    let source = variable(&entity.ident);
    let destination = variable(&target.ident);
    let destination = if target.ident == entity.ident {
        quote! { &#destination.clone() }
    } else {
        quote! { &#destination }
    };
    let key = field.key();
    let max_count: usize = if field.field_type.array { 0 } else { 1 };
    let delete_rule = field.relation.delete_rule.tokens();

    Some(quote! {
        #source.relate(#destination, #key, #max_count, #delete_rule);
    })
}
