// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `impl Entity` and, for entities with `#[id]`, `impl Identifiable`.

use proc_macro2::TokenStream;
use quote::quote;

use super::{mapper, parse::EntityDef, updater};

/// Generate the trait implementations tying the entity to the runtime.
pub fn generate(entity: &EntityDef) -> TokenStream {
    let ident = &entity.ident;
    let name = entity.name_lit();
    let predicate = entity.predicate_ident();
    let sort = entity.sort_ident();
    let mapper = mapper::generate(entity);
    let updater = updater::generate(entity);

    let (identity, identifiable) = match entity.id_field() {
        Some(field) => {
            let id = &field.ident;
            let key = field.key();
            (
                quote! {
                    fn identity(&self) -> ::core::option::Option<&str> {
                        ::core::option::Option::Some(&self.#id)
                    }
                },
                quote! {
                    impl ::persist_core::Identifiable for #ident {
                        const ID_KEY: &'static str = #key;

                        fn id(&self) -> &str {
                            &self.#id
                        }
                    }
                }
            )
        }
        None => (TokenStream::new(), TokenStream::new())
    };

    quote! {
        impl ::persist_core::Entity for #ident {
            const ENTITY_NAME: &'static str = #name;
            type Predicate = #predicate;
            type Sort = #sort;

            #[allow(unused_variables)]
            fn from_record(
                record: &::persist_core::Record,
                source: &dyn ::persist_core::RecordSource
            ) -> ::core::result::Result<Self, ::persist_core::MappingError> {
                #mapper
            }

            #[allow(unused_variables)]
            fn update(
                &self,
                object: ::persist_core::ObjectId,
                context: &mut ::persist_core::Context<'_>
            ) {
                #updater
            }

            #identity
        }

        #identifiable
    }
}
