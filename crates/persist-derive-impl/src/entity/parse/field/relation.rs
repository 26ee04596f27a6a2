// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Relationship configuration for reference fields.
//!
//! ```rust,ignore
//! #[relation(delete_rule = "nullify")]
//! pub shelf: Option<ShelfEntity>,
//!
//! #[relation(keep_orphans)]
//! pub tags: Vec<TagEntity>,
//! ```

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, LitStr};

/// Deletion policy of an edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteRule {
    /// Deleting the owner deletes the members.
    #[default]
    Cascade,

    /// Deleting the owner only drops the edge.
    Nullify
}

impl DeleteRule {
    /// Parse a rule name.
    ///
    /// Returns `None` for unrecognized values.
    #[must_use]
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "cascade" => Some(Self::Cascade),
            "nullify" => Some(Self::Nullify),
            _ => None
        }
    }

    /// Matching `::persist_core::DeleteRule` variant.
    #[must_use]
    pub fn tokens(self) -> TokenStream {
        match self {
            Self::Cascade => quote! { ::persist_core::DeleteRule::Cascade },
            Self::Nullify => quote! { ::persist_core::DeleteRule::Nullify }
        }
    }
}

/// Parsed `#[relation(...)]`.
#[derive(Debug, Default, Clone)]
pub struct RelationConfig {
    /// Edge deletion policy.
    pub delete_rule: DeleteRule,

    /// Keep detached members instead of deleting them on update.
    pub keep_orphans: bool
}

impl RelationConfig {
    /// Parse from a `#[relation(...)]` attribute.
    ///
    /// # Errors
    ///
    /// Unknown or repeated keys and unknown rule names, spanned on the
    /// offending tokens.
    pub fn from_attr(attr: &Attribute) -> darling::Result<Self> {
        let mut config = Self::default();
        let mut seen_rule = false;
        let mut seen_keep = false;

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("delete_rule") {
                if seen_rule {
                    return Err(meta.error("duplicate `delete_rule`"));
                }
                seen_rule = true;
                let value: LitStr = meta.value()?.parse()?;
                config.delete_rule = DeleteRule::from_str(&value.value()).ok_or_else(|| {
                    syn::Error::new(
                        value.span(),
                        "expected `delete_rule = \"cascade\"` or `\"nullify\"`"
                    )
                })?;
            } else if meta.path.is_ident("keep_orphans") {
                if seen_keep {
                    return Err(meta.error("duplicate `keep_orphans`"));
                }
                seen_keep = true;
                config.keep_orphans = true;
            } else {
                return Err(meta.error("unknown relation option"));
            }
            Ok(())
        })?;

        Ok(config)
    }
}
