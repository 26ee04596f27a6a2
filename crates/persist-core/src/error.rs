// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Error types for the store and for record mapping.
//!
//! # Error Hierarchy
//!
//! ```text
//! StoreError
//! ├── Io          ← snapshot file could not be read or written
//! ├── Snapshot    ← snapshot file is not valid JSON
//! ├── Closed      ← the worker thread is gone
//! ├── Panicked    ← a job panicked, its changes were discarded
//! └── Spawn       ← the worker thread could not be started
//!
//! MappingError
//! ├── Coercion        ← stored value does not fit the field type
//! ├── MissingRelation ← required to-one relationship is empty
//! └── MissingRecord   ← relationship points at a deleted record
//! ```

use std::io;

use thiserror::Error;

use crate::record::ObjectId;

/// Failure at the store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Snapshot file I/O failed.
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] io::Error),

    /// Snapshot file could not be encoded or decoded.
    #[error("snapshot is not valid: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// The store worker has shut down.
    #[error("store worker is closed")]
    Closed,

    /// A job panicked; its pending changes were discarded.
    #[error("store job panicked: {0}")]
    Panicked(String),

    /// The worker thread could not be spawned.
    #[error("failed to start store worker: {0}")]
    Spawn(io::Error)
}

impl StoreError {
    /// Check if the worker is gone.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Check if a job panicked.
    #[must_use]
    pub const fn is_panicked(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }

    /// Check if the error came from the snapshot file.
    #[must_use]
    pub const fn is_snapshot(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Snapshot(_))
    }
}

/// Failure converting a record into a domain value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// A stored attribute does not coerce to the field type.
    #[error("{entity}.{field}: stored value does not match the field type")]
    Coercion {
        /// Entity name.
        entity: &'static str,
        /// Field name.
        field:  &'static str
    },

    /// A required to-one relationship has no member.
    #[error("{entity}.{field}: required relationship is empty")]
    MissingRelation {
        /// Entity name.
        entity: &'static str,
        /// Field name.
        field:  &'static str
    },

    /// A relationship references a record that no longer exists.
    #[error("record {0} referenced by a relationship does not exist")]
    MissingRecord(ObjectId)
}

impl MappingError {
    /// Coercion failure for `entity.field`.
    #[must_use]
    pub const fn coercion(entity: &'static str, field: &'static str) -> Self {
        Self::Coercion { entity, field }
    }

    /// Missing required relationship for `entity.field`.
    #[must_use]
    pub const fn missing_relation(entity: &'static str, field: &'static str) -> Self {
        Self::MissingRelation { entity, field }
    }

    /// Check if a stored value had the wrong type.
    #[must_use]
    pub const fn is_coercion(&self) -> bool {
        matches!(self, Self::Coercion { .. })
    }

    /// Check if a required relationship was empty.
    #[must_use]
    pub const fn is_missing_relation(&self) -> bool {
        matches!(self, Self::MissingRelation { .. })
    }
}
