// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Updater generation: the body of `Entity::update`.
//!
//! Scalars and opaque fields are written with `Context::set_value`, which
//! ignores writes of an equal value. Relationships are handed to
//! `store_one`/`store_many`, which diff against the current members and do
//! nothing when they map back equal. `delete_old` is `true` unless the field
//! carries `#[relation(keep_orphans)]`.

use proc_macro2::TokenStream;
use quote::quote;

use super::parse::{EntityDef, FieldDef, FieldKind};

/// Generate the statements run by `update`.
pub fn generate(entity: &EntityDef) -> TokenStream {
    let statements = entity
        .fields
        .iter()
        .filter(|field| !field.skip)
        .map(statement);

    quote! {
        #(#statements)*
    }
}

fn statement(field: &FieldDef) -> TokenStream {
    let name = &field.ident;
    let key = field.key();
    let shape = &field.field_type;
    let delete_old = !field.relation.keep_orphans;

    match &shape.kind {
        FieldKind::Scalar(_) => quote! {
            context.set_value(
                object,
                #key,
                ::persist_core::AttributeValue::to_attribute(&self.#name)
            );
        },
        FieldKind::Opaque => {
            let encoded = match (shape.optional, shape.array) {
                (false, false) => quote! { ::persist_core::opaque::encode(&self.#name) },
                (true, false) => quote! { ::persist_core::opaque::encode_optional(&self.#name) },
                (false, true) => quote! { ::persist_core::opaque::encode_list(&self.#name) },
                (true, true) => quote! {
                    self.#name.as_deref().and_then(::persist_core::opaque::encode_list)
                }
            };
            quote! {
                context.set_value(object, #key, #encoded);
            }
        }
        FieldKind::Reference(_) => match (shape.optional, shape.array) {
            (false, false) => quote! {
                ::persist_core::store_one(
                    context,
                    object,
                    #key,
                    ::core::option::Option::Some(&self.#name),
                    #delete_old
                );
            },
            (true, false) => quote! {
                ::persist_core::store_one(context, object, #key, self.#name.as_ref(), #delete_old);
            },
            (false, true) => quote! {
                ::persist_core::store_many(context, object, #key, &self.#name, #delete_old);
            },
            (true, true) => quote! {
                ::persist_core::store_many(
                    context,
                    object,
                    #key,
                    self.#name.as_deref().unwrap_or(&[]),
                    #delete_old
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use syn::{DeriveInput, parse_quote};

    use super::*;

    fn generate_for(input: DeriveInput) -> String {
        let entity = EntityDef::from_derive_input(&input).unwrap();
        generate(&entity).to_string()
    }

    #[test]
    fn scalars_write_directly() {
        let output = generate_for(parse_quote! {
            pub struct BookEntity {
                pub pages: i32,
            }
        });
        assert!(output.contains("context . set_value (object , \"pages\""));
        assert!(output.contains("to_attribute (& self . pages)"));
    }

    #[test]
    fn relations_reconcile() {
        let output = generate_for(parse_quote! {
            pub struct AuthorEntity {
                pub books: Vec<BookEntity>,
                #[relation(keep_orphans)]
                pub mentor: Option<AuthorEntity>,
            }
        });
        assert!(output.contains("store_many (context , object , \"books\" , & self . books , true)"));
        assert!(output.contains("store_one (context , object , \"mentor\" , self . mentor . as_ref () , false)"));
    }

    #[test]
    fn skipped_field_is_not_written() {
        let output = generate_for(parse_quote! {
            pub struct BookEntity {
                #[field(skip)]
                pub cached: String,
            }
        });
        assert!(!output.contains("cached"));
    }

    #[test]
    fn opaque_encodes_as_text() {
        let output = generate_for(parse_quote! {
            pub struct BookEntity {
                pub genre: Option<Genre>,
            }
        });
        assert!(output.contains("opaque :: encode_optional (& self . genre)"));
    }
}
