// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Store configuration.
//!
//! ```rust
//! use persist_core::{StoreConfig, StoreLocation};
//!
//! let memory = StoreConfig::default();
//! assert_eq!(memory.location, StoreLocation::InMemory);
//!
//! let disk = StoreConfig::on_disk("/var/lib/app").with_worker_name("library-store");
//! assert_eq!(
//!     disk.location.snapshot_path("Library").unwrap(),
//!     std::path::Path::new("/var/lib/app/Library.json")
//! );
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Where committed records live between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreLocation {
    /// Records are lost when the store shuts down.
    #[default]
    InMemory,

    /// Records are persisted to `{directory}/{model}.json`.
    Disk {
        /// Directory holding the snapshot file.
        directory: PathBuf
    }
}

impl StoreLocation {
    /// Snapshot file for a model, `None` in memory.
    #[must_use]
    pub fn snapshot_path(&self, model_name: &str) -> Option<PathBuf> {
        match self {
            Self::InMemory => None,
            Self::Disk { directory } => Some(directory.join(format!("{model_name}.json")))
        }
    }
}

/// Options for [`Store::open`](crate::Store::open).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Persistence location.
    pub location: StoreLocation,

    /// Name of the worker thread, defaults to `persist-{model}`.
    pub worker_name: Option<String>
}

impl StoreConfig {
    /// Volatile store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Store persisted under `directory`.
    #[must_use]
    pub fn on_disk(directory: impl AsRef<Path>) -> Self {
        Self {
            location: StoreLocation::Disk {
                directory: directory.as_ref().to_path_buf()
            },
            worker_name: None
        }
    }

    /// Override the worker thread name.
    #[must_use]
    pub fn with_worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = Some(name.into());
        self
    }

    pub(crate) fn worker_name(&self, model_name: &str) -> String {
        self.worker_name
            .clone()
            .unwrap_or_else(|| format!("persist-{}", model_name.to_lowercase()))
    }
}
