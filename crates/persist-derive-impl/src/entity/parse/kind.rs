// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Field type classifier.
//!
//! Every field type is reduced to a [`FieldType`]: the element type left
//! after unwrapping, two shape flags and a [`FieldKind`]. Classification is
//! purely syntactic and depends only on the type tokens.
//!
//! # Rules
//!
//! Applied in order:
//!
//! 1. `Option<T>` sets `optional` and continues with `T`
//! 2. `Vec<T>` sets `array` and continues with `T`
//! 3. a last path segment ending in `Entity` is a [`FieldKind::Reference`]
//! 4. the scalar vocabulary below
//! 5. anything else is [`FieldKind::Opaque`]
//!
//! | Kind | Types |
//! |------|-------|
//! | Boolean | `bool` |
//! | Integer | `i8` `i16` `i32` `i64` `u8` `u16` `u32` |
//! | Float | `f32` |
//! | Double | `f64` |
//! | String | `String` |
//! | Timestamp | `DateTime<..>` |

use proc_macro2::TokenStream;
use quote::quote;
use syn::{GenericArgument, PathArguments, Type};

/// Suffix marking a type as another entity.
pub const RELATION_SUFFIX: &str = "Entity";

/// Storage kind of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// `bool`.
    Boolean,
    /// Signed or narrow unsigned integers.
    Integer,
    /// `f32`.
    Float,
    /// `f64`.
    Double,
    /// `String`.
    String,
    /// `DateTime<Utc>`.
    Timestamp
}

impl ScalarKind {
    /// Matching `::persist_core::AttributeType` variant.
    #[must_use]
    pub fn attribute_type(self) -> TokenStream {
        match self {
            Self::Boolean => quote! { ::persist_core::AttributeType::Boolean },
            Self::Integer => quote! { ::persist_core::AttributeType::Integer },
            Self::Float => quote! { ::persist_core::AttributeType::Float },
            Self::Double => quote! { ::persist_core::AttributeType::Double },
            Self::String => quote! { ::persist_core::AttributeType::String },
            Self::Timestamp => quote! { ::persist_core::AttributeType::Timestamp }
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(Self::Boolean),
            "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" => Some(Self::Integer),
            "f32" => Some(Self::Float),
            "f64" => Some(Self::Double),
            "String" => Some(Self::String),
            "DateTime" => Some(Self::Timestamp),
            _ => None
        }
    }
}

/// Classified kind of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Stored as an attribute.
    Scalar(ScalarKind),

    /// Relationship to another entity; holds the target's type name.
    Reference(String),

    /// Outside the vocabulary: mapped through `Display`/`FromStr` only.
    Opaque
}

/// Result of classifying a field type.
#[derive(Debug, Clone)]
pub struct FieldType {
    /// Type left after unwrapping `Option` and `Vec`.
    pub element: Type,

    /// Wrapped in `Option`.
    pub optional: bool,

    /// Wrapped in `Vec`.
    pub array: bool,

    /// Classified kind of `element`.
    pub kind: FieldKind
}

impl FieldType {
    /// Classify a declared field type.
    #[must_use]
    pub fn classify(ty: &Type) -> Self {
        let (optional, rest) = match unwrap_generic(ty, "Option") {
            Some(inner) => (true, inner),
            None => (false, ty)
        };
        let (array, element) = match unwrap_generic(rest, "Vec") {
            Some(inner) => (true, inner),
            None => (false, rest)
        };

        let kind = match last_segment_name(element) {
            Some(name) if name.ends_with(RELATION_SUFFIX) => FieldKind::Reference(name),
            Some(name) => {
                ScalarKind::from_name(&name).map_or(FieldKind::Opaque, FieldKind::Scalar)
            }
            None => FieldKind::Opaque
        };

        Self {
            element: element.clone(),
            optional,
            array,
            kind
        }
    }

    /// Scalar kind, `None` for references and opaque types.
    #[must_use]
    pub fn scalar(&self) -> Option<ScalarKind> {
        match self.kind {
            FieldKind::Scalar(kind) => Some(kind),
            _ => None
        }
    }

    /// Target type name of a relationship.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Reference(name) => Some(name),
            _ => None
        }
    }

    /// Check if the field is a relationship.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self.kind, FieldKind::Reference(_))
    }

    /// Check if the field is outside the vocabulary.
    #[cfg(test)]
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.kind == FieldKind::Opaque
    }
}

fn unwrap_generic<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    match arguments.args.first() {
        Some(GenericArgument::Type(inner)) if arguments.args.len() == 1 => Some(inner),
        _ => None
    }
}

fn last_segment_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        _ => None
    }
}
