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

//! The top-level entry point that mints [`Arena`]s and owns the registry
//! of named id generators they draw on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ahash::AHashMap;
use memris_common::{EngineError, EngineResult, Value};
use parking_lot::{Mutex, RwLock};

use crate::arena::Arena;
use crate::config::EngineConfig;

/// Produces the next id for a record type. Implementations must be safe to
/// call concurrently; the built-in generators below wrap an atomic counter
/// or a fresh random value per call.
pub trait IdGenerator: Send + Sync {
    fn next(&self) -> Value;
}

/// A strictly-increasing `i64` counter, the default generator behind the
/// `IDENTITY` id strategy.
pub struct SequentialIdGenerator {
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self { counter: AtomicU64::new(0) }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next(&self) -> Value {
        Value::I64(self.counter.fetch_add(1, Ordering::Relaxed) as i64 + 1)
    }
}

/// A fresh random UUID per call, backing the `UUID` id strategy.
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next(&self) -> Value {
        Value::Str(uuid::Uuid::new_v4().to_string())
    }
}

/// Owns every [`Arena`] created under one [`EngineConfig`] plus the named
/// id-generator registry arenas' repositories look up by name.
pub struct Factory {
    config: EngineConfig,
    next_arena_id: AtomicU64,
    arenas: Mutex<Vec<Arc<Arena>>>,
    generators: RwLock<AHashMap<String, Arc<dyn IdGenerator>>>,
}

impl Factory {
    pub fn new(config: EngineConfig) -> Self {
        let generators: AHashMap<String, Arc<dyn IdGenerator>> = [
            ("IDENTITY".to_string(), Arc::new(SequentialIdGenerator::new()) as Arc<dyn IdGenerator>),
            ("UUID".to_string(), Arc::new(UuidIdGenerator) as Arc<dyn IdGenerator>),
        ]
        .into_iter()
        .collect();
        Self {
            config,
            next_arena_id: AtomicU64::new(1),
            arenas: Mutex::new(Vec::new()),
            generators: RwLock::new(generators),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Creates a new, independent arena. Arenas never share tables or
    /// indexes with one another even when record types collide by name.
    pub fn create_arena(&self) -> Arc<Arena> {
        let id = self.next_arena_id.fetch_add(1, Ordering::Relaxed);
        let arena = Arena::new(id, self.config);
        self.arenas.lock().push(arena.clone());
        arena
    }

    /// Closes and drops every arena this factory has created.
    pub fn close_all(&self) {
        let mut guard = self.arenas.lock();
        for arena in guard.iter() {
            arena.close();
        }
        guard.clear();
    }

    pub fn register_id_generator(&self, name: impl Into<String>, generator: Arc<dyn IdGenerator>) {
        self.generators.write().insert(name.into(), generator);
    }

    pub fn id_generator(&self, name: &str) -> EngineResult<Arc<dyn IdGenerator>> {
        self.generators
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::GeneratorNotFound(name.to_string()))
    }
}

impl Default for Factory {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arenas_from_the_same_factory_are_independent() {
        let factory = Factory::default();
        let a = factory.create_arena();
        let b = factory.create_arena();
        assert_ne!(a.id(), b.id());
        a.get_or_create_table("customer", vec![]).unwrap();
        assert!(b.table("customer").is_none());
    }

    #[test]
    fn built_in_generators_are_preregistered() {
        let factory = Factory::default();
        assert!(factory.id_generator("IDENTITY").is_ok());
        assert!(factory.id_generator("UUID").is_ok());
        assert!(factory.id_generator("missing").is_err());
    }

    #[test]
    fn sequential_generator_is_strictly_increasing() {
        let gen = SequentialIdGenerator::new();
        let a = gen.next();
        let b = gen.next();
        assert_ne!(a, b);
    }
}
