// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Service group parsing.
//!
//! A service group is an inline module. Its entities are the structs that
//! derive `Entity`; its custom queries are the functions marked `#[query]`.
//!
//! ```rust,ignore
//! #[persistence_service(model = "Library")]
//! pub mod library {
//!     #[derive(Clone, Debug, PartialEq, Entity)]
//!     pub struct BookEntity { #[id] pub id: String, pub pages: i32 }
//!
//!     /// Books longer than `pages`.
//!     #[query]
//!     pub fn long_books(pages: i32) -> QuerySpec<BookEntity> {
//!         QuerySpec::<BookEntity>::new().filter(|b| b.pages().greater_than(pages))
//!     }
//! }
//! ```

use std::collections::HashSet;

use convert_case::{Case, Casing};
use darling::{FromMeta, ast::NestedMeta};
use proc_macro2::TokenStream;
use syn::{
    Attribute, DeriveInput, FnArg, GenericArgument, Ident, Item, ItemFn, ItemMod, Pat, PathArguments,
    ReturnType, Token, Type, punctuated::Punctuated
};

use crate::{entity::parse::EntityDef, utils::docs::extract_doc_comments};

/// Arguments of `#[persistence_service(...)]`.
#[derive(Debug, Default, FromMeta)]
#[darling(default)]
pub struct ServiceArgs {
    /// Model name, defaults to the module name in PascalCase.
    pub model: Option<String>
}

impl ServiceArgs {
    /// Parse the attribute arguments.
    ///
    /// # Errors
    ///
    /// Malformed list or unknown keys.
    pub fn parse(tokens: TokenStream) -> darling::Result<Self> {
        let items = NestedMeta::parse_meta_list(tokens).map_err(darling::Error::from)?;
        Self::from_list(&items)
    }
}

/// One `#[query]` function.
#[derive(Debug)]
pub struct QueryDef {
    /// Function name, reused for the trait method.
    pub ident: Ident,

    /// Parameter names and types, in order.
    pub params: Vec<(Ident, Type)>,

    /// Entity type of the returned `QuerySpec<E>`.
    pub entity: Type,

    /// Doc comment of the function.
    pub doc: Option<String>
}

/// Parsed service group.
#[derive(Debug)]
pub struct ServiceDef {
    /// Module name.
    pub module: Ident,

    /// Model name used by the schema and the snapshot file.
    pub model: String,

    /// Entities in declaration order.
    pub entities: Vec<EntityDef>,

    /// Custom queries in declaration order.
    pub queries: Vec<QueryDef>
}

/// Outcome of parsing a module.
pub enum Parsed {
    /// Everything checked out.
    Service(ServiceDef),

    /// An entity failed to parse; its derive reports the error.
    EntityErrors
}

impl ServiceDef {
    /// Parse a module annotated with `#[persistence_service]`.
    ///
    /// # Errors
    ///
    /// - Module without a body
    /// - `#[query]` function with an unsupported signature
    /// - Query or relationship naming a type that is not an entity here
    pub fn from_module(args: ServiceArgs, module: &ItemMod) -> darling::Result<Parsed> {
        let Some((_, items)) = &module.content else {
            return Err(darling::Error::custom(
                "#[persistence_service] requires an inline module body"
            )
            .with_span(&module.ident));
        };

        let mut entities = Vec::new();
        let mut failed = false;
        for item in items {
            let input: DeriveInput = match item {
                Item::Struct(item) if derives_entity(&item.attrs) => item.clone().into(),
                Item::Enum(item) if derives_entity(&item.attrs) => item.clone().into(),
                _ => continue
            };
            match EntityDef::from_derive_input(&input) {
                Ok(entity) => entities.push(entity),
                Err(_) => failed = true
            }
        }
        if failed {
            return Ok(Parsed::EntityErrors);
        }

        let known: HashSet<String> = entities
            .iter()
            .map(|entity| entity.ident.to_string())
            .collect();
        let mut errors = darling::Error::accumulator();

        for entity in &entities {
            for field in entity.relationships() {
                if let Some(target) = field.field_type.target()
                    && !known.contains(target)
                {
                    errors.push(
                        darling::Error::custom(format!(
                            "`{target}` is not an entity of module `{}`",
                            module.ident
                        ))
                        .with_span(&field.ty)
                    );
                }
            }
        }

        let queries: Vec<QueryDef> = items
            .iter()
            .filter_map(|item| match item {
                Item::Fn(function) if is_query(&function.attrs) => Some(function),
                _ => None
            })
            .filter_map(|function| errors.handle(QueryDef::from_fn(function, &known)))
            .collect();

        let model = args
            .model
            .unwrap_or_else(|| module.ident.to_string().to_case(Case::Pascal));

        errors.finish_with(Parsed::Service(Self {
            module: module.ident.clone(),
            model,
            entities,
            queries
        }))
    }

    /// Entities that carry `#[id]`.
    pub fn identifiable(&self) -> impl Iterator<Item = &EntityDef> {
        self.entities.iter().filter(|entity| entity.is_identifiable())
    }

    /// Find an entity by struct name.
    #[must_use]
    pub fn entity(&self, ident: &str) -> Option<&EntityDef> {
        self.entities.iter().find(|entity| entity.ident == ident)
    }

    /// Protocol trait name (e.g., `LibraryService`).
    #[must_use]
    pub fn protocol_ident(&self) -> Ident {
        quote::format_ident!("{}Service", self.module.to_string().to_case(Case::Pascal))
    }

    /// Client struct name (e.g., `LibraryServiceClient`).
    #[must_use]
    pub fn client_ident(&self) -> Ident {
        quote::format_ident!("{}Client", self.protocol_ident())
    }
}

impl QueryDef {
    fn from_fn(function: &ItemFn, known: &HashSet<String>) -> darling::Result<Self> {
        let signature = &function.sig;
        if signature.asyncness.is_some() || !signature.generics.params.is_empty() {
            return Err(darling::Error::custom(
                "#[query] functions must be plain, non-async and non-generic"
            )
            .with_span(&signature.ident));
        }

        let mut params = Vec::new();
        for input in &signature.inputs {
            let FnArg::Typed(typed) = input else {
                return Err(darling::Error::custom("#[query] functions take no receiver")
                    .with_span(input));
            };
            let Pat::Ident(pattern) = typed.pat.as_ref() else {
                return Err(darling::Error::custom("#[query] parameters must be plain names")
                    .with_span(&typed.pat));
            };
            params.push((pattern.ident.clone(), typed.ty.as_ref().clone()));
        }

        let entity = query_entity(&signature.output).ok_or_else(|| {
            darling::Error::custom("#[query] functions must return `QuerySpec<E>`")
                .with_span(&signature.ident)
        })?;
        let entity_name = match &entity {
            Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
            _ => None
        };
        if !entity_name.is_some_and(|name| known.contains(&name)) {
            return Err(darling::Error::custom(
                "the queried type is not an entity of this module"
            )
            .with_span(&entity));
        }

        Ok(Self {
            ident: signature.ident.clone(),
            params,
            entity,
            doc: extract_doc_comments(&function.attrs)
        })
    }
}

fn query_entity(output: &ReturnType) -> Option<Type> {
    let ReturnType::Type(_, ty) = output else {
        return None;
    };
    let Type::Path(path) = ty.as_ref() else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "QuerySpec" {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    match arguments.args.first() {
        Some(GenericArgument::Type(entity)) if arguments.args.len() == 1 => Some(entity.clone()),
        _ => None
    }
}

/// Check for `Entity` among the derives.
fn derives_entity(attrs: &[Attribute]) -> bool {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .filter_map(|attr| {
            attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
                .ok()
        })
        .flatten()
        .any(|path| path.segments.last().is_some_and(|s| s.ident == "Entity"))
}

/// Check for `#[query]`, possibly path-qualified.
fn is_query(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path()
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "query")
    })
}
