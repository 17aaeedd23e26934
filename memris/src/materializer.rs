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

//! Bidirectional mapping between a storage row and a user record, driven
//! entirely by a [`RecordDescriptor`]'s precompiled field accessors.
//!
//! Cycle-breaking for relationship graphs (a self-referencing `ToOne`, or
//! the same far-end row reached twice while one reference is still being
//! built) is enforced by `materialize_row` itself via the `in_progress`
//! map: before following any `ToOne`/`ToMany` field it registers
//! `(record_type, id)` as in progress, and a nested `materialize_row` call
//! that encounters the same pair again (through `load` closures threading
//! `in_progress` on to `RepositoryCore::find_by_id_tracking`) returns early
//! with whatever scalar fields it already has rather than recursing.

use std::sync::Arc;

use memris_common::{EngineResult, Value};
use memris_storage::{Arena, Table};

use crate::descriptor::{FieldAccess, InProgress, RecordDescriptor};

/// Constructs a record from row `row` of `table`, following relationship
/// fields through `arena`. `in_progress` is the cycle guard described
/// above; callers that aren't themselves inside a relationship load should
/// pass a fresh, empty map.
#[tracing::instrument(level = "trace", skip(descriptor, table, arena, in_progress))]
pub fn materialize_row<R>(
    descriptor: &RecordDescriptor<R>,
    table: &Table,
    row: usize,
    arena: &Arc<Arena>,
    in_progress: &mut InProgress,
) -> EngineResult<R> {
    let mut record = (descriptor.new_instance)();

    for field in &descriptor.fields {
        if let FieldAccess::Scalar { set, .. } = &field.access {
            if field.is_persisted() {
                let raw = table.get_value(&field.column_name, row)?;
                set(&mut record, raw);
            }
        }
    }

    let id_value = descriptor.id_value(&record);
    let key = (descriptor.record_name, id_value.clone());
    if in_progress.contains_key(&key) {
        return Ok(record);
    }
    in_progress.insert(key.clone(), ());

    for field in &descriptor.fields {
        match &field.access {
            FieldAccess::ToOne { load, .. } => {
                let fk_value = table.get_value(&field.column_name, row)?;
                load(arena, &fk_value, &mut record, in_progress)?;
            }
            FieldAccess::ToMany { load, .. } => {
                load(arena, &id_value, &mut record, in_progress)?;
            }
            FieldAccess::Scalar { .. } => {}
        }
    }

    in_progress.remove(&key);

    if let Some(post_load) = descriptor.post_load {
        post_load(&mut record);
    }

    Ok(record)
}

/// The type-appropriate zero substituted for a non-nullable storage type
/// when the record's scalar getter returned `Value::Null`.
fn substitute_null(value: Value, storage_type: memris_common::TypeCode) -> Value {
    if value.is_null() && storage_type != memris_common::TypeCode::Str {
        Value::zero_for(storage_type)
    } else {
        value
    }
}

/// Converts a record into the ordered row of storage values `Table::insert`
/// / `Table::update_row` expect. Relationship cascades must already have
/// run (see `RepositoryCore::save`) so that foreign-key scalar fields hold
/// their final value by the time this is called.
pub fn extract_row<R>(descriptor: &RecordDescriptor<R>, record: &R) -> Vec<Value> {
    let mut persisted: Vec<(i32, Value)> = descriptor
        .fields
        .iter()
        .filter(|f| f.is_persisted())
        .filter_map(|f| match &f.access {
            FieldAccess::Scalar { get, .. } => Some((f.column_position, substitute_null(get(record), f.storage_type))),
            _ => None,
        })
        .collect();
    persisted.sort_by_key(|(pos, _)| *pos);
    persisted.into_iter().map(|(_, v)| v).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{IdStrategy, RelationshipKind};
    use memris_common::TypeCode;
    use memris_storage::Table;

    struct Customer {
        id: i64,
        email: String,
    }

    fn descriptor() -> RecordDescriptor<Customer> {
        RecordDescriptor {
            record_name: "customer",
            fields: vec![
                crate::descriptor::FieldMapping {
                    property_path: "id".to_string(),
                    column_name: "id".to_string(),
                    storage_type: TypeCode::I64,
                    column_position: 0,
                    relationship: RelationshipKind::None,
                    access: FieldAccess::Scalar {
                        get: Box::new(|r: &Customer| Value::I64(r.id)),
                        set: Box::new(|r: &mut Customer, v: Value| r.id = v.as_i64().unwrap_or(0)),
                    },
                },
                crate::descriptor::FieldMapping {
                    property_path: "email".to_string(),
                    column_name: "email".to_string(),
                    storage_type: TypeCode::Str,
                    column_position: 1,
                    relationship: RelationshipKind::None,
                    access: FieldAccess::Scalar {
                        get: Box::new(|r: &Customer| Value::Str(r.email.clone())),
                        set: Box::new(|r: &mut Customer, v: Value| r.email = v.as_str().unwrap_or_default().to_string()),
                    },
                },
            ],
            id_field_index: 0,
            id_strategy: IdStrategy::Identity,
            new_instance: || Customer { id: 0, email: String::new() },
            pre_persist: None,
            pre_update: None,
            post_load: None,
        }
    }

    #[test]
    fn extract_then_materialize_round_trips_scalar_fields() {
        let d = descriptor();
        let customer = Customer { id: 7, email: "a@x.com".to_string() };
        let row = extract_row(&d, &customer);
        assert_eq!(row, vec![Value::I64(7), Value::Str("a@x.com".to_string())]);

        let mut table = Table::new("customer", d.columns(), 1024);
        table.insert(&row).unwrap();
        let arena = memris_storage::Factory::default().create_arena();
        let mut in_progress = InProgress::default();
        let hydrated = materialize_row(&d, &table, 0, &arena, &mut in_progress).unwrap();
        assert_eq!(hydrated.id, 7);
        assert_eq!(hydrated.email, "a@x.com");
    }
}
