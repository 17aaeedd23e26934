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

//! An ordered, single-use sequence of [`RowId`]s produced by a scan or
//! index probe.

use std::collections::HashSet;

use memris_common::RowId;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection(Vec<RowId>);

impl Selection {
    pub fn new(ids: Vec<RowId>) -> Self {
        Self(ids)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn ids(&self) -> &[RowId] {
        &self.0
    }

    pub fn into_ids(self) -> Vec<RowId> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, id: RowId) {
        self.0.push(id);
    }

    pub fn extend(&mut self, other: Selection) {
        self.0.extend(other.0);
    }

    pub fn truncate(&mut self, limit: usize) {
        self.0.truncate(limit);
    }

    /// Converts to flat row indices for a table configured with the given
    /// page size.
    pub fn row_indices(&self, page_size: usize) -> Vec<usize> {
        self.0.iter().map(|id| id.to_row_index(page_size)).collect()
    }

    /// Removes duplicate `RowId`s, keeping the first occurrence — the
    /// "distinct by row-index identity" semantics `spec.md` calls for after
    /// index fan-out.
    pub fn dedup(&mut self) {
        let mut seen = HashSet::with_capacity(self.0.len());
        self.0.retain(|id| seen.insert(*id));
    }

    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&RowId, &RowId) -> std::cmp::Ordering,
    {
        self.0.sort_by(compare);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RowId> {
        self.0.iter()
    }
}

impl FromIterator<RowId> for Selection {
    fn from_iter<T: IntoIterator<Item = RowId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Selection {
    type Item = RowId;
    type IntoIter = std::vec::IntoIter<RowId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a RowId;
    type IntoIter = std::slice::Iter<'a, RowId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
