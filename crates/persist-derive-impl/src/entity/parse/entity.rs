// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Entity definition.
//!
//! [`EntityDef`] is what every emitter receives. It is built once from a
//! `DeriveInput`, either by the derive itself or by `#[persistence_service]`
//! while collecting the entities of a module.
//!
//! # Supported Attributes
//!
//! | Attribute | Required | Default | Description |
//! |-----------|----------|---------|-------------|
//! | `name` | No | struct name without `Entity` | Entity name in the schema |

use darling::FromDeriveInput;
use proc_macro2::Span;
use quote::format_ident;
use syn::{DeriveInput, Ident, LitStr, Visibility};

use super::{field::FieldDef, kind::RELATION_SUFFIX};

/// Entity-level attributes parsed from `#[entity(...)]`.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(entity), supports(struct_named))]
struct EntityAttrs {
    ident: Ident,

    vis: Visibility,

    generics: syn::Generics,

    /// Entity name override.
    #[darling(default)]
    name: Option<String>
}

/// Complete parsed entity definition.
#[derive(Debug)]
pub struct EntityDef {
    /// Struct identifier (e.g., `BookEntity`).
    pub ident: Ident,

    /// Struct visibility, propagated to the generated builders.
    pub vis: Visibility,

    /// Entity name in the schema (e.g., `Book`).
    pub name: String,

    /// All fields in declaration order.
    pub fields: Vec<FieldDef>
}

impl EntityDef {
    /// Parse entity definition from syn's `DeriveInput`.
    ///
    /// # Errors
    ///
    /// - Applied to anything but a struct with named fields
    /// - Generic struct
    /// - More than one `#[id]`
    /// - Field attribute errors, all reported together
    pub fn from_derive_input(input: &DeriveInput) -> darling::Result<Self> {
        let attrs = EntityAttrs::from_derive_input(input)?;
        if !attrs.generics.params.is_empty() {
            return Err(
                darling::Error::custom("Entity cannot be derived for generic structs")
                    .with_span(&attrs.generics)
            );
        }

        let syn::Data::Struct(data) = &input.data else {
            return Err(darling::Error::custom("Entity can only be derived for structs")
                .with_span(&input.ident));
        };

        let mut errors = darling::Error::accumulator();
        let fields: Vec<FieldDef> = data
            .fields
            .iter()
            .filter_map(|field| errors.handle(FieldDef::from_field(field)))
            .collect();

        for extra in fields.iter().filter(|field| field.is_id).skip(1) {
            errors.push(
                darling::Error::custom("Entity can have at most one #[id] field")
                    .with_span(&extra.ident)
            );
        }

        let name = attrs
            .name
            .unwrap_or_else(|| default_name(&attrs.ident.to_string()));

        errors.finish_with(Self {
            ident: attrs.ident,
            vis: attrs.vis,
            name,
            fields
        })
    }

    /// Entity name as a string literal.
    #[must_use]
    pub fn name_lit(&self) -> LitStr {
        LitStr::new(&self.name, Span::call_site())
    }

    /// The `#[id]` field, if any.
    #[must_use]
    pub fn id_field(&self) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.is_id)
    }

    /// Check if instances carry a unique identifier.
    #[must_use]
    pub fn is_identifiable(&self) -> bool {
        self.id_field().is_some()
    }

    /// Fields stored as schema attributes.
    pub fn attributes(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|field| field.is_attribute())
    }

    /// Fields stored as relationship edges.
    pub fn relationships(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|field| field.is_relationship())
    }

    /// Generated predicate builder name (e.g., `BookEntityPredicateBuilder`).
    #[must_use]
    pub fn predicate_ident(&self) -> Ident {
        format_ident!("{}PredicateBuilder", self.ident)
    }

    /// Generated sort builder name (e.g., `BookEntitySortBuilder`).
    #[must_use]
    pub fn sort_ident(&self) -> Ident {
        format_ident!("{}SortBuilder", self.ident)
    }
}

/// Struct name with a trailing `Entity` removed, unless nothing would remain.
fn default_name(ident: &str) -> String {
    match ident.strip_suffix(RELATION_SUFFIX) {
        Some(stem) if !stem.is_empty() => stem.to_owned(),
        _ => ident.to_owned()
    }
}
