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

//! Columnar, in-memory storage primitives: typed growable columns, the
//! tables built on top of them, hash/range indexes, and the arena that
//! owns a consistent set of both.

pub mod arena;
pub mod column;
pub mod config;
pub mod factory;
pub mod index;
pub mod selection;
pub mod table;

pub use arena::Arena;
pub use column::Column;
pub use config::{EngineConfig, SortAlgorithm};
pub use factory::{Factory, IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use index::{HashIndex, IndexHandle, RangeIndex};
pub use selection::Selection;
pub use table::Table;
