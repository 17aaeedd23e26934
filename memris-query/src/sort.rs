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

//! Ordering a [`Selection`] by a declared `ORDER BY` list, with an
//! insertion-sort fast path for small selections and a bounded top-K heap
//! for the common `limit` + `order_by` combination.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use memris_common::{EngineResult, RowId, Value};
use memris_storage::{Selection, Table};

use crate::compiled_query::OrderBy;

/// Below this row count, a hand-rolled insertion sort outperforms the
/// general-purpose comparison sort on the small, mostly-ordered selections
/// scans tend to produce; at or above it, `slice::sort_by` (a stable
/// merge sort) takes over.
const INSERTION_SORT_CUTOFF: usize = 100;

fn row_keys(table: &Table, order_by: &[OrderBy], row: usize) -> EngineResult<Vec<Value>> {
    order_by.iter().map(|o| table.get_value(&o.column, row)).collect()
}

/// Ordering for one column's key, honoring the spec's null placement rule:
/// ascending puts nulls first, descending puts nulls last.
fn compare_key(a: &Value, b: &Value, ascending: bool) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => if ascending { Ordering::Less } else { Ordering::Greater },
        (false, true) => if ascending { Ordering::Greater } else { Ordering::Less },
        (false, false) => {
            let ord = a.cmp(b);
            if ascending { ord } else { ord.reverse() }
        }
    }
}

fn compare_rows(order_by: &[OrderBy], a_keys: &[Value], a_row: RowId, b_keys: &[Value], b_row: RowId) -> Ordering {
    for (i, ob) in order_by.iter().enumerate() {
        let ord = compare_key(&a_keys[i], &b_keys[i], ob.ascending);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    // Final tie-break: original row id, ascending, so sort algorithm choice
    // never changes observable order between otherwise-equal rows.
    a_row.cmp(&b_row)
}

pub struct Sorter;

impl Sorter {
    /// Sorts `selection` in place by `order_by`. A no-op if `order_by` is
    /// empty.
    #[tracing::instrument(level = "debug", skip(table, selection))]
    pub fn sort(table: &Table, order_by: &[OrderBy], selection: &mut Selection) -> EngineResult<()> {
        if order_by.is_empty() {
            return Ok(());
        }
        let mut keyed: Vec<(Vec<Value>, RowId)> = selection
            .ids()
            .iter()
            .map(|&id| row_keys(table, order_by, id.to_row_index(table.page_size())).map(|k| (k, id)))
            .collect::<EngineResult<_>>()?;

        if keyed.len() < INSERTION_SORT_CUTOFF {
            insertion_sort(order_by, &mut keyed);
        } else {
            keyed.sort_by(|(ka, ra), (kb, rb)| compare_rows(order_by, ka, *ra, kb, *rb));
        }

        *selection = keyed.into_iter().map(|(_, id)| id).collect();
        Ok(())
    }

    /// Returns the first `limit` rows of `selection` in `order_by` order,
    /// without fully sorting the candidate set.
    #[tracing::instrument(level = "debug", skip(table, selection))]
    pub fn top_k(table: &Table, order_by: &[OrderBy], selection: &Selection, limit: usize) -> EngineResult<Selection> {
        if limit == 0 {
            return Ok(Selection::empty());
        }
        let mut heap: BinaryHeap<HeapElem> = BinaryHeap::with_capacity(limit + 1);
        for &id in selection.ids() {
            let keys = row_keys(table, order_by, id.to_row_index(table.page_size()))?;
            let elem = HeapElem { keys, row: id, order_by };
            if heap.len() < limit {
                heap.push(elem);
            } else if let Some(worst) = heap.peek() {
                if elem < *worst {
                    heap.pop();
                    heap.push(elem);
                }
            }
        }
        let mut items: Vec<HeapElem> = heap.into_vec();
        items.sort();
        Ok(items.into_iter().map(|e| e.row).collect())
    }
}

/// A single candidate in the top-K heap; natural `Ord` matches the declared
/// `order_by` direction, so the heap's max is always the current worst kept
/// row and `BinaryHeap::peek`/`pop` evict it in O(log K).
struct HeapElem<'a> {
    keys: Vec<Value>,
    row: RowId,
    order_by: &'a [OrderBy],
}

impl PartialEq for HeapElem<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapElem<'_> {}

impl PartialOrd for HeapElem<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapElem<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_rows(self.order_by, &self.keys, self.row, &other.keys, other.row)
    }
}

fn insertion_sort(order_by: &[OrderBy], keyed: &mut [(Vec<Value>, RowId)]) {
    for i in 1..keyed.len() {
        let mut j = i;
        while j > 0
            && compare_rows(order_by, &keyed[j - 1].0, keyed[j - 1].1, &keyed[j].0, keyed[j].1) == Ordering::Greater
        {
            keyed.swap(j - 1, j);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memris_common::TypeCode;

    fn prices(values: &[i64]) -> Table {
        let mut t = Table::new("item", vec![("price".to_string(), TypeCode::I64)], 1024);
        for v in values {
            t.insert(&[Value::I64(*v)]).unwrap();
        }
        t
    }

    #[test]
    fn sort_descending_orders_highest_first() {
        let t = prices(&[10, 50, 20, 40, 30]);
        let mut sel = t.scan_all();
        Sorter::sort(&t, &[OrderBy::desc("price")], &mut sel).unwrap();
        let got: Vec<i64> = sel
            .ids()
            .iter()
            .map(|id| t.get_value("price", id.to_row_index(t.page_size())).unwrap().as_i64().unwrap())
            .collect();
        assert_eq!(got, vec![50, 40, 30, 20, 10]);
    }

    #[test]
    fn top_k_matches_full_sort_prefix() {
        let t = prices(&[10, 50, 20, 40, 30, 5, 90, 15]);
        let sel = t.scan_all();
        let order_by = vec![OrderBy::desc("price")];
        let mut full = sel.clone();
        Sorter::sort(&t, &order_by, &mut full).unwrap();
        full.truncate(3);

        let topk = Sorter::top_k(&t, &order_by, &sel, 3).unwrap();
        assert_eq!(full.into_ids(), topk.into_ids());
    }

    #[test]
    fn nulls_sort_first_ascending_last_descending() {
        let mut t = Table::new("item", vec![("name".to_string(), TypeCode::Str)], 1024);
        for v in [Some("b"), None, Some("a")] {
            t.insert(&[v.map(|s| Value::Str(s.to_string())).unwrap_or(Value::Null)]).unwrap();
        }
        let mut sel = t.scan_all();
        Sorter::sort(&t, &[OrderBy::asc("name")], &mut sel).unwrap();
        let first = sel.ids()[0];
        assert_eq!(t.get_value("name", first.to_row_index(t.page_size())).unwrap(), Value::Null);
    }
}
