// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Client generation: the store-backed implementation of the protocol, plus
//! `open(config)`.
//!
//! Custom query methods call the declared function with their arguments and
//! build the handle from the returned `QuerySpec`. Generic query and bulk
//! methods forward to `Store::query` and `Store::add_or_update`.

use proc_macro2::TokenStream;
use quote::quote;

use super::{
    parse::ServiceDef,
    protocol::{add_or_update_signature, custom_query_signature, query_signature}
};

/// Generate the client struct, its protocol impl and `open`.
pub fn generate(service: &ServiceDef) -> TokenStream {
    let protocol = service.protocol_ident();
    let client = service.client_ident();

    let custom = service.queries.iter().map(|query| {
        let signature = custom_query_signature(query);
        let function = &query.ident;
        let entity = &query.entity;
        let arguments = query.params.iter().map(|(name, _)| name);
        quote! {
            #signature {
                let spec = #function(#(#arguments),*);
                self.store.make_query::<#entity>(spec.make_filter(), spec.make_sorter())
            }
        }
    });
    let generic = service.identifiable().map(|entity| {
        let signature = query_signature(entity);
        let entity_ident = &entity.ident;
        quote! {
            #signature {
                self.store.query::<#entity_ident, P, K>(filter, sort)
            }
        }
    });
    let bulk = service.identifiable().map(|entity| {
        let signature = add_or_update_signature(entity);
        quote! {
            #signature {
                self.store.add_or_update(entities).await;
            }
        }
    });

    let doc = format!("[`{protocol}`] backed by a [`Store`](::persist_core::Store).");

    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone)]
        pub struct #client {
            store: ::persist_core::Store
        }

        impl #client {
            /// Wrap an already opened store.
            #[must_use]
            pub fn new(store: ::persist_core::Store) -> Self {
                Self { store }
            }

            /// Underlying store.
            #[must_use]
            pub fn store(&self) -> &::persist_core::Store {
                &self.store
            }
        }

        #[::persist_core::async_trait]
        impl #protocol for #client {
            #(#custom)*
            #(#generic)*
            #(#bulk)*
        }

        /// Open a store for [`schema`] and wrap it in a client.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError`](::persist_core::StoreError) when the snapshot
        /// cannot be read or the worker cannot start.
        pub fn open(
            config: ::persist_core::StoreConfig
        ) -> ::core::result::Result<#client, ::persist_core::StoreError> {
            ::persist_core::Store::open(schema(), config).map(#client::new)
        }
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;
    use crate::service::parse::{Parsed, ServiceArgs};

    #[test]
    fn client_forwards_to_store() {
        let module: syn::ItemMod = parse_quote! {
            mod library {
                #[derive(Entity)]
                pub struct BookEntity {
                    #[id]
                    pub id: String,
                    pub title: String,
                }

                #[query]
                pub fn titled(title: String, limit_to_drafts: bool) -> QuerySpec<BookEntity> {
                    QuerySpec::new()
                }
            }
        };
        let Parsed::Service(service) =
            ServiceDef::from_module(ServiceArgs::default(), &module).unwrap()
        else {
            panic!("entity errors");
        };
        let output = generate(&service).to_string();

        assert!(output.contains("pub struct LibraryServiceClient"));
        assert!(output.contains("impl LibraryService for LibraryServiceClient"));
        assert!(output.contains("let spec = titled (title , limit_to_drafts)"));
        assert!(output.contains("make_query :: < BookEntity > (spec . make_filter () , spec . make_sorter ())"));
        assert!(output.contains("self . store . query :: < BookEntity , P , K > (filter , sort)"));
        assert!(output.contains("self . store . add_or_update (entities) . await"));
        assert!(output.contains("pub fn open"));
    }
}
