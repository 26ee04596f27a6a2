// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Field-level attribute parsing.
//!
//! # Attributes
//!
//! | Attribute | Applies to | Effect |
//! |-----------|------------|--------|
//! | `#[id]` | `String` | Marks the entity identifiable |
//! | `#[field(skip)]` | any | Excluded everywhere, mapped as `Default::default()` |
//! | `#[relation(...)]` | references | Delete rule and orphan handling, see [`relation`] |

pub mod relation;

pub use relation::RelationConfig;
use syn::{Attribute, Field, Ident, LitStr, Type};

use super::kind::{FieldType, ScalarKind};

/// Parse `#[field(skip)]`.
fn parse_skip(attr: &Attribute) -> darling::Result<bool> {
    let mut skip = false;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("skip") {
            skip = true;
            Ok(())
        } else {
            Err(meta.error("unknown field option, expected `skip`"))
        }
    })?;
    Ok(skip)
}

/// Field definition with all parsed attributes.
#[derive(Debug)]
pub struct FieldDef {
    /// Field identifier.
    pub ident: Ident,

    /// Declared type.
    pub ty: Type,

    /// Classification of `ty`.
    pub field_type: FieldType,

    /// Carries `#[id]`.
    pub is_id: bool,

    /// Carries `#[field(skip)]`.
    pub skip: bool,

    /// Relationship options, defaulted for non-references.
    pub relation: RelationConfig
}

impl FieldDef {
    /// Parse a named struct field.
    ///
    /// # Errors
    ///
    /// - Unnamed field
    /// - `#[id]` on anything but a required `String`
    /// - `#[id]` together with `#[field(skip)]`
    /// - `#[relation]` on a field that is not a reference
    /// - Malformed `#[field]` or `#[relation]`
    pub fn from_field(field: &Field) -> darling::Result<Self> {
        let ident = field.ident.clone().ok_or_else(|| {
            darling::Error::custom("Entity fields must be named").with_span(field)
        })?;
        let field_type = FieldType::classify(&field.ty);

        let mut errors = darling::Error::accumulator();
        let mut is_id = false;
        let mut skip = false;
        let mut relation = RelationConfig::default();

        for attr in &field.attrs {
            if attr.path().is_ident("id") {
                let plain_string = field_type.scalar() == Some(ScalarKind::String)
                    && !field_type.optional
                    && !field_type.array;
                if !plain_string {
                    errors.push(
                        darling::Error::custom("#[id] requires a `String` field").with_span(attr)
                    );
                }
                is_id = true;
            } else if attr.path().is_ident("field") {
                if let Some(value) = errors.handle(parse_skip(attr)) {
                    skip |= value;
                }
            } else if attr.path().is_ident("relation") {
                if !field_type.is_reference() {
                    errors.push(
                        darling::Error::custom(
                            "#[relation] is only valid on fields whose type ends in `Entity`"
                        )
                        .with_span(attr)
                    );
                } else if let Some(config) = errors.handle(RelationConfig::from_attr(attr)) {
                    relation = config;
                }
            }
        }

        if is_id && skip {
            errors.push(
                darling::Error::custom("#[id] field cannot be `#[field(skip)]`").with_span(&ident)
            );
        }

        errors.finish_with(Self {
            ident,
            ty: field.ty.clone(),
            field_type,
            is_id,
            skip,
            relation
        })
    }

    /// Field name as it appears in records.
    #[must_use]
    pub fn key(&self) -> LitStr {
        LitStr::new(&self.ident.to_string(), self.ident.span())
    }

    /// Check if the field is stored as a schema attribute.
    #[must_use]
    pub fn is_attribute(&self) -> bool {
        !self.skip && self.field_type.scalar().is_some()
    }

    /// Check if the field is stored as a relationship edge.
    #[must_use]
    pub fn is_relationship(&self) -> bool {
        !self.skip && self.field_type.is_reference()
    }
}
