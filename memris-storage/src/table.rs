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

//! Binds a named, ordered list of columns into a row-oriented surface that
//! all grow together.

use fixedbitset::FixedBitSet;
use memris_common::{EngineError, EngineResult, RowId, TypeCode, Value};

use crate::column::{Column, DEFAULT_PAGE_SIZE};
use crate::selection::Selection;

#[derive(Debug)]
pub struct Table {
    name: String,
    page_size: usize,
    columns: Vec<(String, Column)>,
    row_count: usize,
    /// Resolves the soft-delete open question: a cleared bit means the row
    /// was deleted and scans must skip it even though its cells remain.
    live: FixedBitSet,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<(String, TypeCode)>, page_size: usize) -> Self {
        let page_size = if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size };
        Self {
            name: name.into(),
            page_size,
            columns: columns
                .into_iter()
                .map(|(n, t)| (n, Column::new(t, page_size)))
                .collect(),
            row_count: 0,
            live: FixedBitSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|(n, _)| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index).map(|(_, c)| c)
    }

    pub fn is_live(&self, row: usize) -> bool {
        row < self.row_count && self.live.contains(row)
    }

    fn unknown_column(&self, name: &str) -> EngineError {
        EngineError::UnknownColumn(format!("{}.{}", self.name, name))
    }

    /// Validates arity and per-column type compatibility without mutating
    /// anything, so a caller can distinguish "about to fail" from "already
    /// half-written".
    fn validate_row(&self, values: &[Value]) -> EngineResult<()> {
        if values.len() != self.columns.len() {
            return Err(EngineError::InsertFailure {
                record: self.name.clone(),
                column: "<row>".to_string(),
                source: Box::new(EngineError::UnknownColumn(format!(
                    "expected {} values, got {}",
                    self.columns.len(),
                    values.len()
                ))),
            });
        }
        for ((col_name, col), value) in self.columns.iter().zip(values.iter()) {
            let compatible = value.type_code() == Some(col.type_code())
                || (value.is_null() && col.type_code() == TypeCode::Str);
            if !compatible {
                return Err(EngineError::InsertFailure {
                    record: self.name.clone(),
                    column: col_name.clone(),
                    source: Box::new(EngineError::TypeMismatch {
                        column: col_name.clone(),
                        expected: col.type_code(),
                        found: value.type_code().unwrap_or(col.type_code()),
                    }),
                });
            }
        }
        Ok(())
    }

    /// Appends one row. All columns grow together or none do: values are
    /// validated up front, so a failure never leaves a column ahead of the
    /// others.
    pub fn insert(&mut self, values: &[Value]) -> EngineResult<RowId> {
        self.validate_row(values)?;
        for ((name, col), value) in self.columns.iter_mut().zip(values.iter()) {
            col.push_value(name, value)?;
        }
        let row = self.row_count;
        self.row_count += 1;
        if self.live.len() <= row {
            self.live.grow(row + 1);
        }
        self.live.insert(row);
        Ok(RowId::from_row_index(row, self.page_size))
    }

    /// Overwrites every column of an already-live row. Callers are
    /// responsible for updating indexes around this call.
    pub fn update_row(&mut self, row: usize, values: &[Value]) -> EngineResult<()> {
        self.validate_row(values)?;
        for ((name, col), value) in self.columns.iter_mut().zip(values.iter()) {
            col.set_value(name, row, value)?;
        }
        Ok(())
    }

    /// Clears the liveness bit without compacting storage: scans stop
    /// visiting the row, but its cells remain addressable by row index.
    pub fn tombstone(&mut self, row: usize) {
        if row < self.live.len() {
            self.live.set(row, false);
        }
    }

    pub fn get_value(&self, column: &str, row: usize) -> EngineResult<Value> {
        let col = self.column(column).ok_or_else(|| self.unknown_column(column))?;
        col.get_value(column, row)
    }

    pub fn row_values(&self, row: usize) -> EngineResult<Vec<Value>> {
        self.columns
            .iter()
            .map(|(name, col)| col.get_value(name, row))
            .collect()
    }

    /// Every live row, in ascending row order.
    pub fn scan_all(&self) -> Selection {
        let mut ids = Vec::with_capacity(self.row_count);
        for row in 0..self.row_count {
            if self.is_live(row) {
                ids.push(RowId::from_row_index(row, self.page_size));
            }
        }
        Selection::new(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customers() -> Table {
        Table::new(
            "customer",
            vec![
                ("id".to_string(), TypeCode::I64),
                ("email".to_string(), TypeCode::Str),
            ],
            4,
        )
    }

    #[test]
    fn insert_grows_every_column_together() {
        let mut t = customers();
        t.insert(&[Value::I64(1), Value::Str("a@x".into())]).unwrap();
        t.insert(&[Value::I64(2), Value::Str("b@x".into())]).unwrap();
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.column("id").unwrap().len(), 2);
        assert_eq!(t.column("email").unwrap().len(), 2);
    }

    #[test]
    fn insert_failure_leaves_table_unchanged() {
        let mut t = customers();
        let err = t.insert(&[Value::I64(1), Value::I32(5)]);
        assert!(err.is_err());
        assert_eq!(t.row_count(), 0);
        assert_eq!(t.column("id").unwrap().len(), 0);
    }

    #[test]
    fn tombstoned_rows_are_excluded_from_scan_all_but_cells_remain() {
        let mut t = customers();
        t.insert(&[Value::I64(1), Value::Str("a@x".into())]).unwrap();
        t.insert(&[Value::I64(2), Value::Str("b@x".into())]).unwrap();
        t.tombstone(0);
        let sel = t.scan_all();
        assert_eq!(sel.len(), 1);
        // the cell is still addressable; only the liveness bit is cleared.
        assert_eq!(t.get_value("email", 0).unwrap(), Value::Str("a@x".into()));
    }

    #[test]
    fn update_row_overwrites_in_place() {
        let mut t = customers();
        t.insert(&[Value::I64(1), Value::Str("old@x".into())]).unwrap();
        t.update_row(0, &[Value::I64(1), Value::Str("new@x".into())]).unwrap();
        assert_eq!(t.get_value("email", 0).unwrap(), Value::Str("new@x".into()));
        assert_eq!(t.row_count(), 1);
    }
}
