// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Convenient re-exports for common usage.
//!
//! # Usage
//!
//! ```rust,ignore
//! use persist_core::prelude::*;
//! ```

pub use crate::{
    Entity, Identifiable, IntoPredicates, IntoSortDescriptors, MappingError, PredicateBuilder,
    QueryExecutor, QuerySpec, SortBuilder, Store, StoreConfig, StoreError, Subscription,
    async_trait
};
