// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Documentation extraction utilities.
//!
//! Doc comments (`///` and `/** */`) reach the macro as `#[doc = "..."]`
//! attributes. The service emitter uses this to carry the docs of `#[query]`
//! functions over to the generated trait methods.

use syn::Attribute;

/// Extract doc comments from attributes.
///
/// Combines all `#[doc = "..."]` attributes into a single string,
/// trimming each line.
///
/// Returns `None` when there are no doc comments or they are blank.
pub fn extract_doc_comments(attrs: &[Attribute]) -> Option<String> {
    let doc_lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| {
            if let syn::Meta::NameValue(meta) = &attr.meta
                && let syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(lit_str),
                    ..
                }) = &meta.value
            {
                return Some(lit_str.value());
            }
            None
        })
        .collect();

    let combined = doc_lines
        .iter()
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join("\n");

    let trimmed = combined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_attrs(input: &str) -> Vec<Attribute> {
        let item: syn::ItemFn = syn::parse_str(input).unwrap();
        item.attrs
    }

    #[test]
    fn joins_lines() {
        let attrs = parse_attrs(
            r#"
            /// Books by title.
            ///
            /// Sorted by page count.
            fn titled() {}
        "#
        );
        assert_eq!(
            extract_doc_comments(&attrs),
            Some("Books by title.\n\nSorted by page count.".to_string())
        );
    }

    #[test]
    fn ignores_other_attributes() {
        let attrs = parse_attrs(
            r#"
            #[query]
            fn titled() {}
        "#
        );
        assert_eq!(extract_doc_comments(&attrs), None);
    }

    #[test]
    fn blank_docs_are_none() {
        let attrs = parse_attrs(
            r#"
            ///
            fn titled() {}
        "#
        );
        assert_eq!(extract_doc_comments(&attrs), None);
    }
}
