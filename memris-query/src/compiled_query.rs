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

//! The immutable plan `RepositoryCore::find_by` executes: what to select,
//! how to order and trim it, and whether to shape it into a projection.

use crate::predicate::Predicate;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryKind {
    Find,
    Count,
    Exists,
    Delete,
}

#[derive(Clone, Debug)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// A subset of columns to hydrate, for callers that don't need a full
/// record materialized. Columns are addressed by position in the owning
/// `RecordDescriptor`'s column order.
#[derive(Clone, Debug)]
pub struct Projection {
    pub columns: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct CompiledQuery {
    pub kind: QueryKind,
    pub predicate: Option<Predicate>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<usize>,
    pub distinct: bool,
    pub projection: Option<Projection>,
}

impl CompiledQuery {
    pub fn find() -> Self {
        Self {
            kind: QueryKind::Find,
            predicate: None,
            order_by: Vec::new(),
            limit: None,
            distinct: false,
            projection: None,
        }
    }

    pub fn count() -> Self {
        Self {
            kind: QueryKind::Count,
            ..Self::find()
        }
    }

    pub fn exists() -> Self {
        Self {
            kind: QueryKind::Exists,
            ..Self::find()
        }
    }

    pub fn delete() -> Self {
        Self {
            kind: QueryKind::Delete,
            ..Self::find()
        }
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn with_order_by(mut self, order_by: Vec<OrderBy>) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Whether `find_by`'s top-K heap shortcut applies: an order-by plus a
    /// limit, skipping a full sort of the candidate selection.
    pub fn wants_top_k(&self) -> bool {
        self.limit.is_some() && !self.order_by.is_empty()
    }
}
