// Copyright 2024 Memris Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Hash and ordered indexes maintained alongside table inserts/updates.
//!
//! Both index kinds are keyed on the engine's own [`Value`] rather than a
//! generic `K: Ord` type parameter: since every key that ever reaches an
//! index came out of a single column, all keys stored in one index share a
//! `TypeCode`, and `Value`'s hand-rolled `Eq`/`Hash`/`Ord` (see
//! `memris-common::type_system`) already total-order and hash it. This
//! keeps `Arena` able to hold indexes of differing column types in one
//! homogeneous map instead of needing a type-erased `K` per entry.

use std::collections::BTreeMap;

use ahash::AHashMap;
use memris_common::{RowId, Value};
use parking_lot::RwLock;

/// Equality index: key -> row ids in insertion order (the spec's
/// "insertion-order tie-break" for multi-match lookups).
#[derive(Debug, Default)]
pub struct HashIndex {
    map: RwLock<AHashMap<Value, Vec<RowId>>>,
}

impl HashIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, key: Value, row: RowId) {
        self.map.write().entry(key).or_default().push(row);
    }

    pub fn remove_all(&self, key: &Value) {
        self.map.write().remove(key);
    }

    /// Removes a single row id from a key's bucket (used when updating a
    /// row whose indexed column value didn't change but whose row id is
    /// being refreshed is not needed; primarily used during delete).
    pub fn remove_row(&self, key: &Value, row: RowId) {
        let mut guard = self.map.write();
        if let Some(rows) = guard.get_mut(key) {
            rows.retain(|r| *r != row);
            if rows.is_empty() {
                guard.remove(key);
            }
        }
    }

    pub fn clear(&self) {
        self.map.write().clear();
    }

    pub fn lookup(&self, key: &Value) -> Vec<RowId> {
        self.map.read().get(key).cloned().unwrap_or_default()
    }

    /// Total number of indexed row ids across every key.
    pub fn size(&self) -> usize {
        self.map.read().values().map(Vec::len).sum()
    }
}

/// Range index: an ordered key -> row-ids map supporting the four bound
/// probes plus an inclusive `between`.
#[derive(Debug, Default)]
pub struct RangeIndex {
    map: RwLock<BTreeMap<Value, Vec<RowId>>>,
}

impl RangeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, key: Value, row: RowId) {
        self.map.write().entry(key).or_default().push(row);
    }

    pub fn remove_all(&self, key: &Value) {
        self.map.write().remove(key);
    }

    pub fn remove_row(&self, key: &Value, row: RowId) {
        let mut guard = self.map.write();
        if let Some(rows) = guard.get_mut(key) {
            rows.retain(|r| *r != row);
            if rows.is_empty() {
                guard.remove(key);
            }
        }
    }

    pub fn clear(&self) {
        self.map.write().clear();
    }

    pub fn lookup(&self, key: &Value) -> Vec<RowId> {
        self.map.read().get(key).cloned().unwrap_or_default()
    }

    pub fn size(&self) -> usize {
        self.map.read().values().map(Vec::len).sum()
    }

    fn collect<'a>(iter: impl Iterator<Item = (&'a Value, &'a Vec<RowId>)>) -> Vec<RowId> {
        iter.flat_map(|(_, rows)| rows.iter().copied()).collect()
    }

    pub fn greater_than(&self, key: &Value) -> Vec<RowId> {
        let guard = self.map.read();
        Self::collect(guard.range((std::ops::Bound::Excluded(key.clone()), std::ops::Bound::Unbounded)))
    }

    pub fn greater_than_or_equal(&self, key: &Value) -> Vec<RowId> {
        let guard = self.map.read();
        Self::collect(guard.range(key.clone()..))
    }

    pub fn less_than(&self, key: &Value) -> Vec<RowId> {
        let guard = self.map.read();
        Self::collect(guard.range(..key.clone()))
    }

    pub fn less_than_or_equal(&self, key: &Value) -> Vec<RowId> {
        let guard = self.map.read();
        Self::collect(guard.range((std::ops::Bound::Unbounded, std::ops::Bound::Included(key.clone()))))
    }

    /// Inclusive on both bounds, per `spec.md` §4.3's `Between` semantics.
    pub fn between(&self, lower: &Value, upper: &Value) -> Vec<RowId> {
        let guard = self.map.read();
        Self::collect(guard.range(lower.clone()..=upper.clone()))
    }
}

/// A named index on a (table, column) pair, either hash or range-ordered.
#[derive(Debug)]
pub enum IndexHandle {
    Hash(HashIndex),
    Range(RangeIndex),
}

impl IndexHandle {
    pub fn add(&self, key: Value, row: RowId) {
        match self {
            IndexHandle::Hash(h) => h.add(key, row),
            IndexHandle::Range(r) => r.add(key, row),
        }
    }

    pub fn remove_row(&self, key: &Value, row: RowId) {
        match self {
            IndexHandle::Hash(h) => h.remove_row(key, row),
            IndexHandle::Range(r) => r.remove_row(key, row),
        }
    }

    pub fn lookup(&self, key: &Value) -> Vec<RowId> {
        match self {
            IndexHandle::Hash(h) => h.lookup(key),
            IndexHandle::Range(r) => r.lookup(key),
        }
    }

    pub fn size(&self) -> usize {
        match self {
            IndexHandle::Hash(h) => h.size(),
            IndexHandle::Range(r) => r.size(),
        }
    }

    pub fn as_hash(&self) -> Option<&HashIndex> {
        match self {
            IndexHandle::Hash(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<&RangeIndex> {
        match self {
            IndexHandle::Range(r) => Some(r),
            _ => None,
        }
    }
}
