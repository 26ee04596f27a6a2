// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Declaration model for the Entity derive macro.
//!
//! Entity-level attributes use [`darling`]; field-level attributes are
//! parsed by hand since they are markers or short option lists.
//!
//! # Architecture
//!
//! ```text
//! parse.rs (coordinator)
//! ├── entity.rs       - EntityDef, #[entity(name = "...")]
//! ├── field.rs        - FieldDef, #[id], #[field(skip)]
//! │   └── relation.rs - #[relation(delete_rule = "...", keep_orphans)]
//! └── kind.rs         - type classifier
//! ```
//!
//! # Data Structures
//!
//! ```text
//! EntityDef
//! ├── ident: Ident            (struct name, e.g., "BookEntity")
//! ├── vis: Visibility
//! ├── name: String            (schema name, e.g., "Book")
//! └── fields: Vec<FieldDef>
//!     └── FieldDef
//!         ├── ident, ty
//!         ├── field_type: FieldType
//!         │   ├── element: Type      (after Option / Vec)
//!         │   ├── optional, array
//!         │   └── kind: Scalar | Reference | Opaque
//!         ├── is_id, skip
//!         └── relation: RelationConfig
//! ```

mod entity;
mod field;
mod kind;

pub use entity::EntityDef;
pub use field::FieldDef;
pub use kind::{FieldKind, ScalarKind};
