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

//! Executes compiled queries over one record type's table and indexes:
//! parameter binding is the caller's job (a [`CompiledQuery`] already
//! carries bound values), this module does index-vs-scan selection, sort,
//! limit, distinct, save/update, delete, and joins.

use std::sync::Arc;

use memris_common::{EngineResult, RowId, Value};
use memris_storage::{Arena, IdGenerator, IndexHandle, Selection, Table};
use memris_query::{hash_join, CompiledQuery, Predicate, Scanner, Sorter};
use parking_lot::RwLock;

use crate::descriptor::{FieldAccess, InProgress, RecordDescriptor};
use crate::materializer::{extract_row, materialize_row};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKind {
    Hash,
    Range,
}

#[derive(Debug)]
pub struct IndexSpec {
    pub column: String,
    pub kind: IndexKind,
}

impl IndexSpec {
    pub fn hash(column: impl Into<String>) -> Self {
        Self { column: column.into(), kind: IndexKind::Hash }
    }

    pub fn range(column: impl Into<String>) -> Self {
        Self { column: column.into(), kind: IndexKind::Range }
    }
}

/// A record name and column name interned for the lifetime of the process.
/// `RepositoryCore`s are expected to be built once at startup and held for
/// the program's duration, so leaking here is a one-time cost rather than a
/// per-operation one — `Arena`'s maps key on `&'static str` the same way
/// the teacher's catalog keys key on an interned `TableId`.
fn intern(s: &str) -> &'static str {
    Box::leak(s.to_string().into_boxed_str())
}

/// Whether a record's id field is unset and therefore needs generating.
fn needs_generated_id(value: &Value) -> bool {
    matches!(
        value,
        Value::Null
            | Value::I8(0)
            | Value::I16(0)
            | Value::I32(0)
            | Value::I64(0)
    ) || matches!(value, Value::Str(s) if s.is_empty())
}

pub struct RepositoryCore<R> {
    arena: Arc<Arena>,
    descriptor: RecordDescriptor<R>,
    table: Arc<RwLock<Table>>,
    id_index: Arc<IndexHandle>,
    secondary: Vec<(String, Arc<IndexHandle>)>,
    id_generator: Arc<dyn IdGenerator>,
}

impl<R> RepositoryCore<R> {
    #[tracing::instrument(level = "debug", skip(arena, descriptor, id_generator))]
    pub fn new(
        arena: Arc<Arena>,
        descriptor: RecordDescriptor<R>,
        table_name: &'static str,
        indexes: Vec<IndexSpec>,
        id_generator: Arc<dyn IdGenerator>,
    ) -> EngineResult<Self> {
        let columns = descriptor.columns();
        let table = arena.get_or_create_table(table_name, columns)?;
        let id_column = descriptor.id_mapping().column_name.clone();
        let id_index = arena.get_or_create_hash_index(table_name, intern(&id_column))?;

        let mut secondary = Vec::with_capacity(indexes.len());
        for spec in indexes {
            let handle = match spec.kind {
                IndexKind::Hash => arena.get_or_create_hash_index(table_name, intern(&spec.column))?,
                IndexKind::Range => arena.get_or_create_range_index(table_name, intern(&spec.column))?,
            };
            secondary.push((spec.column, handle));
        }

        Ok(Self {
            arena,
            descriptor,
            table,
            id_index,
            secondary,
            id_generator,
        })
    }

    fn index_for(&self, column: &str) -> Option<&Arc<IndexHandle>> {
        if column == self.descriptor.id_mapping().column_name {
            Some(&self.id_index)
        } else {
            self.secondary.iter().find(|(c, _)| c == column).map(|(_, h)| h)
        }
    }

    fn maintain_add(&self, values: &[Value], row_id: RowId) {
        for ((name, _), value) in self.descriptor.columns().iter().zip(values.iter()) {
            if let Some(idx) = self.index_for(name) {
                idx.add(value.clone(), row_id);
            }
        }
    }

    fn maintain_remove(&self, values: &[Value], row_id: RowId) {
        for ((name, _), value) in self.descriptor.columns().iter().zip(values.iter()) {
            if let Some(idx) = self.index_for(name) {
                idx.remove_row(value, row_id);
            }
        }
    }

    fn scalar_value(&self, record: &R, property_path: &str) -> Value {
        self.descriptor
            .fields
            .iter()
            .find(|f| f.property_path == property_path)
            .and_then(|f| match &f.access {
                FieldAccess::Scalar { get, .. } => Some(get(record)),
                _ => None,
            })
            .unwrap_or(Value::Null)
    }

    /// Inserts a new record or, if its id already exists, updates the
    /// existing row in place. Relationship children are cascade-saved
    /// first; the foreign-key/collection fields they write are then
    /// persisted as part of this record's own row.
    #[tracing::instrument(level = "debug", skip(self, record))]
    pub fn save(&self, mut record: R) -> EngineResult<R> {
        for field in &self.descriptor.fields {
            if let FieldAccess::ToOne { cascade_save, .. } = &field.access {
                cascade_save(&self.arena, &mut record)?;
            }
        }

        let id_value = self.descriptor.id_value(&record);
        let existing_row = if needs_generated_id(&id_value) {
            None
        } else {
            self.id_index.lookup(&id_value).into_iter().next()
        };

        if let Some(row_id) = existing_row {
            if let Some(pre_update) = self.descriptor.pre_update {
                pre_update(&mut record);
            }
            let page_size = self.table.read().page_size();
            let row = row_id.to_row_index(page_size);
            let old_values = self.table.read().row_values(row)?;
            let new_values = extract_row(&self.descriptor, &record);
            self.table.write().update_row(row, &new_values)?;
            self.maintain_remove(&old_values, row_id);
            self.maintain_add(&new_values, row_id);
        } else {
            if needs_generated_id(&id_value) {
                let generated = self.id_generator.next();
                self.descriptor.set_id_value(&mut record, generated);
            }
            if let Some(pre_persist) = self.descriptor.pre_persist {
                pre_persist(&mut record);
            }
            let values = extract_row(&self.descriptor, &record);
            let row_id = self.table.write().insert(&values)?;
            self.maintain_add(&values, row_id);
        }

        let id_value = self.descriptor.id_value(&record);
        for field in &self.descriptor.fields {
            if let FieldAccess::ToMany { cascade_save, .. } = &field.access {
                cascade_save(&self.arena, &id_value, &record)?;
            }
        }

        Ok(record)
    }

    pub fn save_all(&self, records: Vec<R>) -> EngineResult<Vec<R>> {
        records.into_iter().map(|r| self.save(r)).collect()
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn find_by_id(&self, id: &Value) -> EngineResult<Option<R>> {
        self.find_by_id_tracking(id, &mut InProgress::default())
    }

    /// Same as [`Self::find_by_id`], but threads the caller's relationship
    /// cycle guard through instead of starting a fresh one. A `ToOne`/
    /// `ToMany` `load` closure that calls into another repository to
    /// hydrate the far end of a relationship must use this instead of
    /// `find_by_id`, passing on the `in_progress` map it was itself handed,
    /// so a cycle spanning more than one record type is still caught.
    pub fn find_by_id_tracking(&self, id: &Value, in_progress: &mut InProgress) -> EngineResult<Option<R>> {
        let table = self.table.read();
        for row_id in self.id_index.lookup(id) {
            let row = row_id.to_row_index(table.page_size());
            if table.is_live(row) {
                return materialize_row(&self.descriptor, &table, row, &self.arena, in_progress).map(Some);
            }
        }
        Ok(None)
    }

    /// Returns records for `ids` in input order; an id with no live row is
    /// silently skipped.
    pub fn find_all_by_id(&self, ids: &[Value]) -> EngineResult<Vec<R>> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = self.find_by_id(id)? {
                out.push(record);
            }
        }
        Ok(out)
    }

    pub fn find_all(&self) -> EngineResult<Vec<R>> {
        let table = self.table.read();
        table
            .scan_all()
            .ids()
            .iter()
            .map(|id| {
                let mut in_progress = InProgress::default();
                materialize_row(&self.descriptor, &table, id.to_row_index(table.page_size()), &self.arena, &mut in_progress)
            })
            .collect()
    }

    pub fn exists_by_id(&self, id: &Value) -> bool {
        let table = self.table.read();
        self.id_index
            .lookup(id)
            .into_iter()
            .any(|row_id| table.is_live(row_id.to_row_index(table.page_size())))
    }

    /// Answered from the id index alone, without materializing any row.
    pub fn count(&self) -> usize {
        self.id_index.size()
    }

    fn delete_row(&self, row_id: RowId) -> EngineResult<()> {
        let page_size = self.table.read().page_size();
        let row = row_id.to_row_index(page_size);
        let mut table = self.table.write();
        if !table.is_live(row) {
            return Ok(());
        }
        let values = table.row_values(row)?;
        table.tombstone(row);
        drop(table);
        self.maintain_remove(&values, row_id);
        Ok(())
    }

    /// A no-op if `id` names no live row.
    pub fn delete_by_id(&self, id: &Value) -> EngineResult<()> {
        if let Some(row_id) = self.id_index.lookup(id).into_iter().next() {
            self.delete_row(row_id)?;
        }
        Ok(())
    }

    pub fn delete(&self, record: &R) -> EngineResult<()> {
        self.delete_by_id(&self.descriptor.id_value(record))
    }

    pub fn delete_all_by_id(&self, ids: &[Value]) -> EngineResult<()> {
        for id in ids {
            self.delete_by_id(id)?;
        }
        Ok(())
    }

    pub fn delete_all(&self) -> EngineResult<()> {
        let row_ids = self.table.read().scan_all().into_ids();
        for row_id in row_ids {
            self.delete_row(row_id)?;
        }
        Ok(())
    }

    /// Index-vs-scan selection for a single top-level predicate. Only the
    /// top-level term is probed for an index match; `And`/`Or`
    /// compositions fall back to a full scan rather than the
    /// most-selective-term probe `spec.md` describes as an optimization —
    /// recorded as a scope simplification in `DESIGN.md`.
    fn select(&self, table: &Table, query: &CompiledQuery) -> EngineResult<Selection> {
        let mut selection = match &query.predicate {
            None => table.scan_all(),
            Some(predicate) => self.select_with_predicate(table, predicate)?,
        };
        if query.distinct {
            selection.dedup();
        }
        Ok(selection)
    }

    fn select_with_predicate(&self, table: &Table, predicate: &Predicate) -> EngineResult<Selection> {
        let live_only = |ids: Vec<RowId>, table: &Table| -> Selection {
            ids.into_iter().filter(|id| table.is_live(id.to_row_index(table.page_size()))).collect()
        };

        if let Some(column) = predicate.anchor_column() {
            if let Some(index) = self.index_for(column) {
                match predicate {
                    Predicate::Comparison { op: memris_query::Operator::Eq, value: Some(v), .. } => {
                        return Ok(live_only(index.lookup(v), table));
                    }
                    Predicate::Between { lower, upper, .. } => {
                        if let Some(range) = index.as_range() {
                            return Ok(live_only(range.between(lower, upper), table));
                        }
                    }
                    _ => {}
                }
            }
        }
        Scanner::scan(table, predicate)
    }

    #[tracing::instrument(level = "debug", skip(self, query))]
    pub fn find_by(&self, query: &CompiledQuery) -> EngineResult<Vec<R>> {
        let table = self.table.read();
        let selection = self.select(&table, query)?;
        let selection = if query.wants_top_k() {
            Sorter::top_k(&table, &query.order_by, &selection, query.limit.unwrap())?
        } else {
            let mut selection = selection;
            Sorter::sort(&table, &query.order_by, &mut selection)?;
            if let Some(limit) = query.limit {
                selection.truncate(limit);
            }
            selection
        };
        selection
            .ids()
            .iter()
            .map(|id| {
                let mut in_progress = InProgress::default();
                materialize_row(&self.descriptor, &table, id.to_row_index(table.page_size()), &self.arena, &mut in_progress)
            })
            .collect()
    }

    pub fn count_by(&self, query: &CompiledQuery) -> EngineResult<usize> {
        let table = self.table.read();
        Ok(self.select(&table, query)?.len())
    }

    pub fn exists_by(&self, query: &CompiledQuery) -> EngineResult<bool> {
        let table = self.table.read();
        Ok(!self.select(&table, query)?.is_empty())
    }

    pub fn delete_by(&self, query: &CompiledQuery) -> EngineResult<usize> {
        let row_ids = {
            let table = self.table.read();
            self.select(&table, query)?.into_ids()
        };
        let deleted = row_ids.len();
        for row_id in row_ids {
            self.delete_row(row_id)?;
        }
        Ok(deleted)
    }

    /// A hash join against another record type's repository, keyed by a
    /// scalar property on each side. Emits pairs in left-insertion-order
    /// within each key, then right-insertion-order across keys, per
    /// `spec.md` §4.7.
    pub fn join<R2: Clone>(
        &self,
        left_key: &str,
        other: &RepositoryCore<R2>,
        right_key: &str,
    ) -> EngineResult<Vec<(R, R2)>>
    where
        R: Clone,
    {
        let lefts = self.find_all()?;
        let rights = other.find_all()?;
        let pairs = hash_join(
            &lefts,
            |l| self.scalar_value(l, left_key),
            &rights,
            |r| other.scalar_value(r, right_key),
        );
        Ok(pairs.into_iter().map(|(l, r)| (l.clone(), r.clone())).collect())
    }
}
