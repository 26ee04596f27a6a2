// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Predicate builder generation.
//!
//! For `BookEntity` this emits `BookEntityPredicateBuilder`, a thin wrapper
//! over `::persist_core::ObjectPredicate` with one accessor per stored field:
//!
//! | Field | Accessor returns |
//! |-------|------------------|
//! | `bool`, `Vec<bool>` | `BoolPredicate` |
//! | other scalar `T`, `Vec<T>` | `ValuePredicate<T>` |
//! | `XEntity`, `Vec<XEntity>` | `<XEntity as Entity>::Predicate` |
//!
//! The accessor passes `array = true` for `Vec` fields, which makes every
//! comparison below it existential. Opaque and skipped fields get no
//! accessor.

use proc_macro2::TokenStream;
use quote::quote;

use super::parse::{EntityDef, FieldDef, FieldKind, ScalarKind};

/// Generate the predicate builder and its `PredicateBuilder` impl.
pub fn generate(entity: &EntityDef) -> TokenStream {
    let vis = &entity.vis;
    let entity_ident = &entity.ident;
    let builder = entity.predicate_ident();
    let accessors: Vec<TokenStream> = entity
        .fields
        .iter()
        .filter(|field| !field.skip)
        .filter_map(accessor)
        .collect();

    let doc = format!("Filter builder for [`{entity_ident}`].");

    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone)]
        #vis struct #builder {
            path: ::persist_core::ObjectPredicate
        }

        impl ::persist_core::PredicateBuilder for #builder {
            fn from_path(path: ::persist_core::ObjectPredicate) -> Self {
                Self { path }
            }
        }

        impl #builder {
            #(#accessors)*
        }
    }
}

fn accessor(field: &FieldDef) -> Option<TokenStream> {
    let name = &field.ident;
    let key = field.key();
    let array = field.field_type.array;
    let element = &field.field_type.element;

    let (output, body) = match &field.field_type.kind {
        FieldKind::Scalar(ScalarKind::Boolean) => (
            quote! { ::persist_core::BoolPredicate },
            quote! { self.path.boolean(#key, #array) }
        ),
        FieldKind::Scalar(_) => (
            quote! { ::persist_core::ValuePredicate<#element> },
            quote! { self.path.value::<#element>(#key, #array) }
        ),
        FieldKind::Reference(_) => (
            quote! { <#element as ::persist_core::Entity>::Predicate },
            quote! { self.path.object::<<#element as ::persist_core::Entity>::Predicate>(#key, #array) }
        ),
        FieldKind::Opaque => return None
    };

    let doc = format!("Filter on `{name}`.");
    Some(quote! {
        #[doc = #doc]
        #[must_use]
        pub fn #name(&self) -> #output {
            #body
        }
    })
}
