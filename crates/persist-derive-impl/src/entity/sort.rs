// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Sort builder generation.
//!
//! Mirrors [`predicate`](super::predicate) without the any-of flag: scalar
//! accessors return `::persist_core::ValueSorter`, reference accessors return
//! the target's own sort builder with the key path extended.

use proc_macro2::TokenStream;
use quote::quote;

use super::parse::{EntityDef, FieldDef, FieldKind};

/// Generate the sort builder and its `SortBuilder` impl.
pub fn generate(entity: &EntityDef) -> TokenStream {
    let vis = &entity.vis;
    let builder = entity.sort_ident();
    let accessors: Vec<TokenStream> = entity
        .fields
        .iter()
        .filter(|field| !field.skip)
        .filter_map(accessor)
        .collect();

    let doc = format!("Sort key builder for [`{}`].", entity.ident);

    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone)]
        #vis struct #builder {
            path: ::persist_core::ObjectSorter
        }

        impl ::persist_core::SortBuilder for #builder {
            fn from_path(path: ::persist_core::ObjectSorter) -> Self {
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
    let element = &field.field_type.element;

    let (output, body) = match &field.field_type.kind {
        FieldKind::Scalar(_) => (
            quote! { ::persist_core::ValueSorter },
            quote! { self.path.sort(#key) }
        ),
        FieldKind::Reference(_) => (
            quote! { <#element as ::persist_core::Entity>::Sort },
            quote! { self.path.object::<<#element as ::persist_core::Entity>::Sort>(#key) }
        ),
        FieldKind::Opaque => return None
    };

    Some(quote! {
        #[must_use]
        pub fn #name(&self) -> #output {
            #body
        }
    })
}
