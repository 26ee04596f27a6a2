// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Mapper generation: the body of `Entity::from_record`.
//!
//! One initializer per field, chosen by kind and shape:
//!
//! | Field | Initializer |
//! |-------|-------------|
//! | scalar, any shape | `AttributeValue::from_attribute(..)`, coercion error on mismatch |
//! | opaque `T` | `opaque::decode` and friends |
//! | `XEntity` | `map_required(..)?` |
//! | `Option<XEntity>` | `map_optional(..)` |
//! | `Vec<XEntity>` | `map_many(..)` |
//! | `Option<Vec<XEntity>>` | `Some(map_many(..))` |
//! | `#[field(skip)]` | `Default::default()` |

use proc_macro2::TokenStream;
use quote::quote;

use super::parse::{EntityDef, FieldDef, FieldKind};

/// Generate the struct literal built by `from_record`.
pub fn generate(entity: &EntityDef) -> TokenStream {
    let initializers = entity.fields.iter().map(|field| {
        let name = &field.ident;
        let value = initializer(field);
        quote! { #name: #value }
    });

    quote! {
        ::core::result::Result::Ok(Self {
            #(#initializers),*
        })
    }
}

fn initializer(field: &FieldDef) -> TokenStream {
    if field.skip {
        return quote! { ::core::default::Default::default() };
    }

    let key = field.key();
    let shape = &field.field_type;
    let coercion = quote! {
        ::persist_core::MappingError::coercion(Self::ENTITY_NAME, #key)
    };

    match &shape.kind {
        FieldKind::Scalar(_) => quote! {
            ::persist_core::AttributeValue::from_attribute(record.value(#key))
                .ok_or(#coercion)?
        },
        FieldKind::Opaque => match (shape.optional, shape.array) {
            (false, false) => quote! {
                ::persist_core::opaque::decode(record.value(#key)).ok_or(#coercion)?
            },
            (true, false) => quote! {
                ::persist_core::opaque::decode_optional(record.value(#key)).ok_or(#coercion)?
            },
            (false, true) => quote! {
                ::persist_core::opaque::decode_list(record.value(#key)).ok_or(#coercion)?
            },
            (true, true) => quote! {
                match record.value(#key) {
                    ::core::option::Option::None => ::core::option::Option::None,
                    stored => ::core::option::Option::Some(
                        ::persist_core::opaque::decode_list(stored).ok_or(#coercion)?
                    )
                }
            }
        },
        FieldKind::Reference(_) => match (shape.optional, shape.array) {
            (false, false) => quote! {
                ::persist_core::map_required(record, source, Self::ENTITY_NAME, #key)?
            },
            (true, false) => quote! {
                ::persist_core::map_optional(record, source, #key)
            },
            (false, true) => quote! {
                ::persist_core::map_many(record, source, #key)
            },
            (true, true) => quote! {
                ::core::option::Option::Some(::persist_core::map_many(record, source, #key))
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
    fn scalars_coerce_or_fail() {
        let output = generate_for(parse_quote! {
            pub struct BookEntity {
                pub title: Option<String>,
            }
        });
        assert!(output.contains("from_attribute (record . value (\"title\"))"));
        assert!(output.contains("MappingError :: coercion (Self :: ENTITY_NAME , \"title\")"));
    }

    #[test]
    fn references_by_shape() {
        let output = generate_for(parse_quote! {
            pub struct BookEntity {
                pub author: AuthorEntity,
                pub editor: Option<AuthorEntity>,
                pub chapters: Vec<ChapterEntity>,
            }
        });
        assert!(output.contains("map_required (record , source , Self :: ENTITY_NAME , \"author\") ?"));
        assert!(output.contains("map_optional (record , source , \"editor\")"));
        assert!(output.contains("map_many (record , source , \"chapters\")"));
    }

    #[test]
    fn opaque_goes_through_text() {
        let output = generate_for(parse_quote! {
            pub struct BookEntity {
                pub genre: Genre,
                pub formats: Vec<Format>,
            }
        });
        assert!(output.contains("opaque :: decode (record . value (\"genre\"))"));
        assert!(output.contains("opaque :: decode_list (record . value (\"formats\"))"));
    }

    #[test]
    fn skipped_field_defaults() {
        let output = generate_for(parse_quote! {
            pub struct BookEntity {
                #[field(skip)]
                pub cached: String,
            }
        });
        assert!(output.contains("cached : :: core :: default :: Default :: default ()"));
    }
}
