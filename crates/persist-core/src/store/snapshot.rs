// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! JSON snapshot of the committed arena.

use std::{
    collections::BTreeMap,
    fs,
    path::Path
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::StoreError,
    record::{ObjectId, Record}
};

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    next_id: u64,
    records: Vec<Record>
}

/// Load the arena and the next free id; a missing file is an empty store.
pub(crate) fn load(path: &Path) -> Result<(BTreeMap<ObjectId, Record>, u64), StoreError> {
    if !path.exists() {
        debug!(path = %path.display(), "no snapshot, starting empty");
        return Ok((BTreeMap::new(), 1));
    }
    let bytes = fs::read(path)?;
    let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
    debug!(path = %path.display(), records = snapshot.records.len(), "snapshot loaded");
    let records = snapshot
        .records
        .into_iter()
        .map(|record| (record.id(), record))
        .collect();
    Ok((records, snapshot.next_id))
}

/// Write the arena through a temporary file and rename it into place.
pub(crate) fn save(
    path: &Path,
    records: &BTreeMap<ObjectId, Record>,
    next_id: u64
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let snapshot = Snapshot {
        next_id,
        records: records.values().cloned().collect()
    };
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, serde_json::to_vec(&snapshot)?)?;
    fs::rename(&staging, path)?;
    debug!(path = %path.display(), records = records.len(), "snapshot saved");
    Ok(())
}
