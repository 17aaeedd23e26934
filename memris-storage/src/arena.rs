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

//! The ownership boundary for a set of tables, their indexes, id counters,
//! and cached repository handles. Closing an arena releases everything it
//! owns and makes every further operation fail fast.

use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use ahash::AHashMap;
use memris_common::{EngineError, EngineResult, TypeCode};
use parking_lot::RwLock;

use crate::config::EngineConfig;
use crate::index::IndexHandle;
use crate::table::Table;

pub struct Arena {
    id: u64,
    config: EngineConfig,
    tables: RwLock<AHashMap<&'static str, Arc<RwLock<Table>>>>,
    indexes: RwLock<AHashMap<(&'static str, &'static str), Arc<IndexHandle>>>,
    id_counters: RwLock<AHashMap<&'static str, Arc<AtomicI64>>>,
    repo_cache: RwLock<AHashMap<&'static str, Arc<dyn Any + Send + Sync>>>,
    closed: AtomicBool,
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("id", &self.id)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}

impl Arena {
    pub(crate) fn new(id: u64, config: EngineConfig) -> Arc<Self> {
        Arc::new(Self {
            id,
            config,
            tables: RwLock::new(AHashMap::new()),
            indexes: RwLock::new(AHashMap::new()),
            id_counters: RwLock::new(AHashMap::new()),
            repo_cache: RwLock::new(AHashMap::new()),
            closed: AtomicBool::new(false),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn check_open(&self) -> EngineResult<()> {
        if self.is_closed() {
            Err(EngineError::ArenaClosed)
        } else {
            Ok(())
        }
    }

    /// Releases every table, index, counter, and repository handle this
    /// arena owns. Idempotent.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.tables.write().clear();
        self.indexes.write().clear();
        self.id_counters.write().clear();
        self.repo_cache.write().clear();
    }

    /// Returns the table for `name`, creating it with the given column
    /// schema on first use. Concurrent callers racing the first creation
    /// collapse to a single `Table`; losers observe the winner's instance.
    #[tracing::instrument(level = "debug", skip(self, columns))]
    pub fn get_or_create_table(
        &self,
        name: &'static str,
        columns: Vec<(String, TypeCode)>,
    ) -> EngineResult<Arc<RwLock<Table>>> {
        self.check_open()?;
        if let Some(t) = self.tables.read().get(name) {
            return Ok(t.clone());
        }
        let mut guard = self.tables.write();
        if let Some(t) = guard.get(name) {
            return Ok(t.clone());
        }
        let table = Arc::new(RwLock::new(Table::new(name, columns, self.config.page_size)));
        guard.insert(name, table.clone());
        Ok(table)
    }

    pub fn table(&self, name: &str) -> Option<Arc<RwLock<Table>>> {
        self.tables.read().get(name).cloned()
    }

    fn get_or_create_index(
        &self,
        table: &'static str,
        column: &'static str,
        make: impl FnOnce() -> IndexHandle,
    ) -> EngineResult<Arc<IndexHandle>> {
        self.check_open()?;
        let key = (table, column);
        if let Some(idx) = self.indexes.read().get(&key) {
            return Ok(idx.clone());
        }
        let mut guard = self.indexes.write();
        if let Some(idx) = guard.get(&key) {
            return Ok(idx.clone());
        }
        let handle = Arc::new(make());
        guard.insert(key, handle.clone());
        Ok(handle)
    }

    pub fn get_or_create_hash_index(
        &self,
        table: &'static str,
        column: &'static str,
    ) -> EngineResult<Arc<IndexHandle>> {
        self.get_or_create_index(table, column, || IndexHandle::Hash(Default::default()))
    }

    pub fn get_or_create_range_index(
        &self,
        table: &'static str,
        column: &'static str,
    ) -> EngineResult<Arc<IndexHandle>> {
        self.get_or_create_index(table, column, || IndexHandle::Range(Default::default()))
    }

    pub fn index(&self, table: &str, column: &str) -> Option<Arc<IndexHandle>> {
        self.indexes.read().get(&(table, column) as &dyn IndexKeyLookup).cloned()
    }

    /// A lock-free, strictly-increasing per-record-type counter used by
    /// the `IDENTITY` id strategy.
    pub fn get_or_create_id_counter(&self, record: &'static str) -> EngineResult<Arc<AtomicI64>> {
        self.check_open()?;
        if let Some(c) = self.id_counters.read().get(record) {
            return Ok(c.clone());
        }
        let mut guard = self.id_counters.write();
        if let Some(c) = guard.get(record) {
            return Ok(c.clone());
        }
        let counter = Arc::new(AtomicI64::new(0));
        guard.insert(record, counter.clone());
        Ok(counter)
    }

    /// Returns the cached repository for `key`, constructing it with
    /// `make` on first use. `createRepository` is idempotent per interface
    /// per `spec.md` §4.5.
    pub fn get_or_create_repository<T: Any + Send + Sync>(
        &self,
        key: &'static str,
        make: impl FnOnce() -> Arc<T>,
    ) -> EngineResult<Arc<T>> {
        self.check_open()?;
        if let Some(r) = self.repo_cache.read().get(key) {
            return Ok(r.clone().downcast::<T>().expect("repository cache type mismatch"));
        }
        let mut guard = self.repo_cache.write();
        if let Some(r) = guard.get(key) {
            return Ok(r.clone().downcast::<T>().expect("repository cache type mismatch"));
        }
        let repo = make();
        guard.insert(key, repo.clone());
        Ok(repo)
    }
}

// Lets `AHashMap<(&'static str, &'static str), _>` be probed with borrowed
// `(&str, &str)` keys without allocating owned strings on every lookup.
trait IndexKeyLookup {
    fn table(&self) -> &str;
    fn column(&self) -> &str;
}

impl IndexKeyLookup for (&str, &str) {
    fn table(&self) -> &str {
        self.0
    }
    fn column(&self) -> &str {
        self.1
    }
}

impl<'a> std::borrow::Borrow<dyn IndexKeyLookup + 'a> for (&'static str, &'static str) {
    fn borrow(&self) -> &(dyn IndexKeyLookup + 'a) {
        self
    }
}

impl std::hash::Hash for dyn IndexKeyLookup + '_ {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.table().hash(state);
        self.column().hash(state);
    }
}

impl PartialEq for dyn IndexKeyLookup + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.table() == other.table() && self.column() == other.column()
    }
}

impl Eq for dyn IndexKeyLookup + '_ {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_table_is_idempotent() {
        let arena = Arena::new(1, EngineConfig::default());
        let a = arena
            .get_or_create_table("customer", vec![("id".into(), TypeCode::I64)])
            .unwrap();
        let b = arena
            .get_or_create_table("customer", vec![("id".into(), TypeCode::I64)])
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn closed_arena_rejects_further_operations() {
        let arena = Arena::new(1, EngineConfig::default());
        arena.close();
        assert!(arena
            .get_or_create_table("customer", vec![("id".into(), TypeCode::I64)])
            .is_err());
        assert!(arena.get_or_create_hash_index("customer", "id").is_err());
    }

    #[test]
    fn id_counter_increments_are_shared_across_lookups() {
        let arena = Arena::new(1, EngineConfig::default());
        let c1 = arena.get_or_create_id_counter("customer").unwrap();
        c1.fetch_add(1, Ordering::SeqCst);
        let c2 = arena.get_or_create_id_counter("customer").unwrap();
        assert_eq!(c2.load(Ordering::SeqCst), 1);
    }
}
