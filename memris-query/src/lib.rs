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

//! Predicate evaluation, scanning, sorting, and joins over
//! `memris-storage` tables.

pub mod compiled_query;
pub mod join;
pub mod predicate;
pub mod scanner;
pub mod sort;

pub use compiled_query::{CompiledQuery, OrderBy, Projection, QueryKind};
pub use join::hash_join;
pub use predicate::{Operator, Predicate};
pub use scanner::Scanner;
pub use sort::Sorter;
