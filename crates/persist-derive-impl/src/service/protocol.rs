// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Protocol trait generation.
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait LibraryService: Send + Sync {
//!     /// Books longer than `pages`.
//!     fn long_books(&self, pages: i32) -> QueryExecutor<BookEntity>;
//!
//!     fn query_book<F, P, S, K>(&self, filter: F, sort: S) -> QueryExecutor<BookEntity>
//!     where
//!         F: FnOnce(&BookEntityPredicateBuilder) -> P,
//!         P: IntoPredicates,
//!         S: FnOnce(&BookEntitySortBuilder) -> K,
//!         K: IntoSortDescriptors;
//!
//!     async fn add_or_update_book(&self, entities: Vec<BookEntity>);
//! }
//! ```

use convert_case::{Case, Casing};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::parse::{QueryDef, ServiceDef};
use crate::entity::parse::EntityDef;

/// Generate the protocol trait.
pub fn generate(service: &ServiceDef) -> TokenStream {
    let protocol = service.protocol_ident();
    let custom = service.queries.iter().map(custom_method);
    let generic = service.identifiable().map(|entity| {
        let doc = format!("Query `{}` records.", entity.name);
        let signature = query_signature(entity);
        quote! {
            #[doc = #doc]
            #signature;
        }
    });
    let bulk = service.identifiable().map(|entity| {
        let doc = format!(
            "Insert or update `{}` records by identifier in one unit of work.",
            entity.name
        );
        let signature = add_or_update_signature(entity);
        quote! {
            #[doc = #doc]
            #signature;
        }
    });

    let doc = format!("Operations of the `{}` model.", service.model);

    quote! {
        #[doc = #doc]
        #[::persist_core::async_trait]
        pub trait #protocol: ::core::marker::Send + ::core::marker::Sync {
            #(#custom)*
            #(#generic)*
            #(#bulk)*
        }
    }
}

/// `fn name(&self, params..) -> QueryExecutor<E>`.
pub fn custom_query_signature(query: &QueryDef) -> TokenStream {
    let ident = &query.ident;
    let entity = &query.entity;
    let params = query.params.iter().map(|(name, ty)| quote! { #name: #ty });
    quote! {
        fn #ident(&self, #(#params),*) -> ::persist_core::QueryExecutor<#entity>
    }
}

fn custom_method(query: &QueryDef) -> TokenStream {
    let signature = custom_query_signature(query);
    let doc = query.doc.as_ref().map(|doc| quote! { #[doc = #doc] });
    quote! {
        #doc
        #signature;
    }
}

/// Name of the generic query method (e.g., `query_book`).
pub fn query_ident(entity: &EntityDef) -> syn::Ident {
    format_ident!("query_{}", entity.name.to_case(Case::Snake))
}

/// Name of the bulk method (e.g., `add_or_update_book`).
pub fn add_or_update_ident(entity: &EntityDef) -> syn::Ident {
    format_ident!("add_or_update_{}", entity.name.to_case(Case::Snake))
}

/// Signature of the generic query method.
pub fn query_signature(entity: &EntityDef) -> TokenStream {
    let ident = query_ident(entity);
    let entity_ident = &entity.ident;
    quote! {
        fn #ident<F, P, S, K>(&self, filter: F, sort: S) -> ::persist_core::QueryExecutor<#entity_ident>
        where
            F: ::core::ops::FnOnce(&<#entity_ident as ::persist_core::Entity>::Predicate) -> P,
            P: ::persist_core::IntoPredicates,
            S: ::core::ops::FnOnce(&<#entity_ident as ::persist_core::Entity>::Sort) -> K,
            K: ::persist_core::IntoSortDescriptors
    }
}

/// Signature of the bulk method.
pub fn add_or_update_signature(entity: &EntityDef) -> TokenStream {
    let ident = add_or_update_ident(entity);
    let entity_ident = &entity.ident;
    quote! {
        async fn #ident(&self, entities: ::std::vec::Vec<#entity_ident>)
    }
}
