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

//! The compiled description of a user record type: which properties exist,
//! which storage column backs each, and how relationship fields are
//! loaded and cascaded.
//!
//! Rust has no runtime reflection, so where the source model walks a
//! class's fields dynamically, a `RecordDescriptor<R>` is built once, ahead
//! of time, out of plain closures — the same shape a `#[derive(Record)]`
//! macro would emit. The engine itself never inspects `R`; it only calls
//! the closures it's handed.

use std::sync::Arc;

use ahash::AHashMap;
use memris_common::{EngineResult, TypeCode, Value};
use memris_storage::Arena;

/// Tracks `(record_type, id)` pairs currently being materialized, so that a
/// relationship cycle (a self-referencing `ToOne`, or the same far-end row
/// reached twice while one reference is still being built) is detected by
/// the engine itself rather than left to however a `load` closure happens
/// to be written. Threaded through every `ToOne`/`ToMany` load call.
pub type InProgress = AHashMap<(&'static str, Value), ()>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationshipKind {
    None,
    OneToOne,
    ManyToOne,
    OneToMany,
    ManyToMany,
}

/// How a record's id is produced on first `save`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdStrategy {
    /// Picks `Identity` for numeric id columns, `Uuid` for string ones.
    Auto,
    Identity,
    Uuid,
    Custom(String),
}

/// Per-field behavior, keyed by [`RelationshipKind`]. Scalar fields read
/// and write a single storage value directly; `ToOne`/`ToMany` fields
/// carry closures that know how to cascade-save and load the *other* side
/// of the relationship, so `RepositoryCore<R>` never needs to know the
/// concrete type on the far end.
pub enum FieldAccess<R> {
    Scalar {
        get: Box<dyn Fn(&R) -> Value + Send + Sync>,
        set: Box<dyn Fn(&mut R, Value) + Send + Sync>,
    },
    /// `ONE_TO_ONE` / `MANY_TO_ONE`: the field mapping's `column_name` is the
    /// foreign-key column. `cascade_save` is called before the owning row
    /// is written, and must itself write the resulting child id into the
    /// record's foreign-key scalar field. `load` is handed the stored
    /// foreign-key value and hydrates the referenced record into place.
    ToOne {
        cascade_save: Box<dyn Fn(&Arc<Arena>, &mut R) -> EngineResult<()> + Send + Sync>,
        /// `in_progress` must be passed on to any nested `materialize_row`
        /// (typically via `RepositoryCore::find_by_id_tracking`) so cycles
        /// spanning more than one record type are still caught.
        load: Box<dyn Fn(&Arc<Arena>, &Value, &mut R, &mut InProgress) -> EngineResult<()> + Send + Sync>,
    },
    /// `ONE_TO_MANY` / `MANY_TO_MANY`: driven by the owning record's id
    /// rather than a column on this table. `cascade_save` persists the
    /// collection's current contents (inserting join-table rows or
    /// recursively saving children); `load` hydrates the collection given
    /// the parent id.
    ToMany {
        cascade_save: Box<dyn Fn(&Arc<Arena>, &Value, &R) -> EngineResult<()> + Send + Sync>,
        load: Box<dyn Fn(&Arc<Arena>, &Value, &mut R, &mut InProgress) -> EngineResult<()> + Send + Sync>,
    },
}

/// One field of a [`RecordDescriptor`]. `column_position < 0` means the
/// field is not persisted as its own column (relationship fields driven by
/// another column, or transient fields) — see `spec.md` §3.
pub struct FieldMapping<R> {
    pub property_path: String,
    pub column_name: String,
    pub storage_type: TypeCode,
    pub column_position: i32,
    pub relationship: RelationshipKind,
    pub access: FieldAccess<R>,
}

impl<R> FieldMapping<R> {
    pub fn is_persisted(&self) -> bool {
        self.column_position >= 0
    }
}

/// The compiled, immutable description of record type `R`.
pub struct RecordDescriptor<R> {
    pub record_name: &'static str,
    pub fields: Vec<FieldMapping<R>>,
    pub id_field_index: usize,
    pub id_strategy: IdStrategy,
    pub new_instance: fn() -> R,
    pub pre_persist: Option<fn(&mut R)>,
    pub pre_update: Option<fn(&mut R)>,
    pub post_load: Option<fn(&mut R)>,
}

impl<R> RecordDescriptor<R> {
    pub fn id_mapping(&self) -> &FieldMapping<R> {
        &self.fields[self.id_field_index]
    }

    /// The table's column schema, in declared column-position order.
    pub fn columns(&self) -> Vec<(String, TypeCode)> {
        let mut persisted: Vec<&FieldMapping<R>> = self.fields.iter().filter(|f| f.is_persisted()).collect();
        persisted.sort_by_key(|f| f.column_position);
        persisted
            .into_iter()
            .map(|f| (f.column_name.clone(), f.storage_type))
            .collect()
    }

    pub fn id_value(&self, record: &R) -> Value {
        match &self.id_mapping().access {
            FieldAccess::Scalar { get, .. } => get(record),
            _ => Value::Null,
        }
    }

    pub fn set_id_value(&self, record: &mut R, value: Value) {
        if let FieldAccess::Scalar { set, .. } = &self.id_mapping().access {
            set(record, value);
        }
    }
}
