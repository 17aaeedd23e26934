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

//! Memris: an in-process, in-memory, columnar storage engine exposing a
//! repository-style query surface over user-declared record types.
//!
//! A typical caller builds a [`descriptor::RecordDescriptor`] for each
//! record type once, creates an [`Arena`] from a [`Factory`], and wraps
//! each table in a [`repository::RepositoryCore`].

pub mod descriptor;
pub mod id_generator;
pub mod materializer;
pub mod repository;

pub use descriptor::{FieldAccess, FieldMapping, IdStrategy, InProgress, RecordDescriptor, RelationshipKind};
pub use id_generator::resolve_generator;
pub use materializer::{extract_row, materialize_row};
pub use repository::{IndexKind, IndexSpec, RepositoryCore};

pub use memris_common::{init_tracing, EngineError, EngineResult, RowId, TypeCode, TypeConverter, Value};
pub use memris_query::{CompiledQuery, Operator, OrderBy, Predicate, Projection, QueryKind};
pub use memris_storage::{Arena, EngineConfig, Factory, HashIndex, IdGenerator, RangeIndex, SortAlgorithm};
